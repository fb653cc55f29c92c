//! Final selection collection.

use crate::{ResolutionSession, ResolveError, Result};

/// Extract the confirmed track ids from a session, in entry order.
///
/// Every entry with a selection contributes its track id; entries still
/// missing, or ambiguous with no pick made, are silently skipped; the
/// caller is responsible for warning when the result is shorter than the
/// session. Fails with [`ResolveError::EmptySelection`] when no entry is
/// confirmed, since a playlist with no tracks is meaningless.
pub fn confirmed_track_ids(session: &ResolutionSession) -> Result<Vec<u64>> {
    let ids: Vec<u64> = session
        .entries()
        .iter()
        .filter_map(|entry| entry.selected_candidate_id())
        .collect();

    if ids.is_empty() {
        return Err(ResolveError::EmptySelection);
    }

    log::debug!(
        "collected {} confirmed track(s) out of {} entry(ies)",
        ids.len(),
        session.len()
    );
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BulkMatchItem, MatchCandidate, ResolutionSession, SongRequest};

    fn candidate(id: u64) -> MatchCandidate {
        MatchCandidate {
            id,
            title: "t".to_string(),
            artist: "a".to_string(),
            album: String::new(),
        }
    }

    #[test]
    fn test_collects_in_entry_order_skipping_unset() {
        let requests = vec![
            SongRequest::new("A", "one"),
            SongRequest::new("B", "two"),
            SongRequest::new("C", "three"),
            SongRequest::new("D", "four"),
        ];
        let items = vec![
            BulkMatchItem::found(10, "A", "one"),
            BulkMatchItem::missing("B", "two"),
            BulkMatchItem::ambiguous("C", "three", vec![candidate(30), candidate(31)]),
            BulkMatchItem::found(40, "D", "four"),
        ];
        let mut session = ResolutionSession::from_bulk_match(1, requests, items).unwrap();

        // The unpicked ambiguous entry is skipped...
        assert_eq!(confirmed_track_ids(&session).unwrap(), vec![10, 40]);

        // ...and contributes in order once picked.
        session.select(2, 31).unwrap();
        assert_eq!(confirmed_track_ids(&session).unwrap(), vec![10, 31, 40]);
    }

    #[test]
    fn test_empty_selection_fails() {
        let session = ResolutionSession::from_bulk_match(
            1,
            vec![SongRequest::new("A", "one")],
            vec![BulkMatchItem::missing("A", "one")],
        )
        .unwrap();

        assert!(matches!(
            confirmed_track_ids(&session).unwrap_err(),
            ResolveError::EmptySelection
        ));
    }
}
