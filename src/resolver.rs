//! Resolution workflow orchestration.
//!
//! [`Resolver`] drives the reconciliation state machine against a
//! [`CatalogClient`]: one bulk match builds a fresh [`ResolutionSession`],
//! per-entry refine calls re-search single entries, picks confirm
//! candidates, and playlist creation consumes the session.
//!
//! The resolver owns the single mutable session behind a mutex that is
//! never held across an await point. Every refine call is tagged with the
//! generation of the session it was issued against; a superseding bulk
//! match bumps the generation, so a stale refine result arriving later is
//! recognized and discarded instead of mutating the new session. At most
//! one refine may be outstanding per entry index; a second one for the
//! same index is rejected while the first is in flight. Refines on
//! different indices are independent.

use crate::session::{RefineOutcome, ResolutionSession, SessionSummary};
use crate::{collect, CatalogClient, PlaylistReceipt, ResolveError, Result, SongRequest};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// The original workflow offers more candidates on a manual re-search than
// on bulk classification.
const REFINE_CANDIDATE_LIMIT: usize = 10;

#[derive(Default)]
struct ResolverState {
    session: Option<ResolutionSession>,
    next_generation: u64,
    // (generation, entry index) of refine calls currently in flight
    pending: HashSet<(u64, usize)>,
}

/// Orchestrates bulk matching, per-entry refinement, candidate picks, and
/// the final playlist hand-off.
///
/// # Examples
///
/// ```rust,no_run
/// use deezer_resolve::{parser, DeezerGwClient, Resolver};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> deezer_resolve::Result<()> {
///     let http = http_client::native::NativeClient::new();
///     let client = DeezerGwClient::connect(Box::new(http), "arl-cookie").await?;
///     let resolver = Resolver::new(Arc::new(client));
///
///     let songs = parser::parse_description("The Weeknd - Blinding Lights");
///     let summary = resolver.bulk_match(songs).await?;
///     println!("{} found, {} to review", summary.found, summary.ambiguous);
///
///     let receipt = resolver.create_playlist("My Mix").await?;
///     println!("{}", receipt.message);
///     Ok(())
/// }
/// ```
pub struct Resolver {
    client: Arc<dyn CatalogClient>,
    state: Mutex<ResolverState>,
}

impl Resolver {
    /// Create a resolver on top of a connected catalog client.
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self {
            client,
            state: Mutex::new(ResolverState::default()),
        }
    }

    /// Whether a resolution session is currently live.
    pub fn has_session(&self) -> bool {
        self.state.lock().unwrap().session.is_some()
    }

    /// Snapshot of the current session, if any.
    pub fn session(&self) -> Option<ResolutionSession> {
        self.state.lock().unwrap().session.clone()
    }

    /// Derived counts of the current session, if any.
    pub fn summary(&self) -> Option<SessionSummary> {
        self.state
            .lock()
            .unwrap()
            .session
            .as_ref()
            .map(|s| s.summary())
    }

    /// Match every request in one external call and replace the session.
    ///
    /// All-or-nothing: on any failure the previous session (if one exists)
    /// stays live and untouched. On success the new session supersedes the
    /// old one entirely; refine calls still in flight against the old
    /// session will have their results discarded on arrival.
    pub async fn bulk_match(&self, requests: Vec<SongRequest>) -> Result<SessionSummary> {
        if requests.is_empty() {
            return Err(ResolveError::Parse(
                "no songs to match".to_string(),
            ));
        }

        log::info!("bulk matching {} song(s)", requests.len());
        let items = self.client.bulk_search(&requests).await?;

        let mut st = self.state.lock().unwrap();
        let generation = st.next_generation + 1;
        let session = ResolutionSession::from_bulk_match(generation, requests, items)?;
        let summary = session.summary();

        st.next_generation = generation;
        st.session = Some(session);
        // In-flight refines against older generations can no longer apply;
        // their completion handshake tolerates the missing marks.
        st.pending.retain(|(gen, _)| *gen == generation);

        log::info!(
            "session generation {generation}: {} found, {} ambiguous, {} missing",
            summary.found,
            summary.ambiguous,
            summary.missing
        );
        Ok(summary)
    }

    /// Re-search one entry with a user-supplied query.
    ///
    /// On a non-empty result the entry's candidates are replaced and it
    /// becomes ambiguous; on an empty result the entry is untouched and
    /// [`RefineOutcome::NoCandidates`] is reported; on transport failure
    /// the entry is untouched and the error propagates. If the session was
    /// superseded while the search was in flight, the result is discarded
    /// and [`RefineOutcome::Superseded`] is reported. No other entry is
    /// ever affected.
    pub async fn refine(&self, index: usize, query: &str) -> Result<RefineOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::Session(
                "refine query must not be empty".to_string(),
            ));
        }

        let generation = {
            let mut st = self.state.lock().unwrap();
            let generation = {
                let session = st.session.as_ref().ok_or_else(|| {
                    ResolveError::Session("no resolution session is live".to_string())
                })?;
                session.entry(index)?;
                session.generation()
            };
            if !st.pending.insert((generation, index)) {
                return Err(ResolveError::Session(format!(
                    "a refine is already pending for entry {index}"
                )));
            }
            generation
        };

        log::debug!("refining entry {index} (generation {generation}) with '{query}'");
        let result = self.client.search(query, REFINE_CANDIDATE_LIMIT).await;

        let mut st = self.state.lock().unwrap();
        st.pending.remove(&(generation, index));

        // Whatever came back, candidates or a transport error, belongs
        // to the generation it was issued against.
        let session = st
            .session
            .as_mut()
            .filter(|session| session.generation() == generation);
        let Some(session) = session else {
            log::debug!(
                "discarding refine result for entry {index}: generation {generation} superseded"
            );
            return Ok(RefineOutcome::Superseded);
        };

        session.apply_refine(index, query, result?)
    }

    /// Confirm one candidate for an ambiguous entry.
    pub fn select(&self, index: usize, candidate_id: u64) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        let session = st
            .session
            .as_mut()
            .ok_or_else(|| ResolveError::Session("no resolution session is live".to_string()))?;
        session.select(index, candidate_id)
    }

    /// The confirmed track ids of the current session, in entry order.
    pub fn confirmed_track_ids(&self) -> Result<Vec<u64>> {
        let st = self.state.lock().unwrap();
        let session = st
            .session
            .as_ref()
            .ok_or_else(|| ResolveError::Session("no resolution session is live".to_string()))?;
        collect::confirmed_track_ids(session)
    }

    /// Create the playlist from the confirmed tracks and retire the session.
    ///
    /// With nothing confirmed this fails with
    /// [`ResolveError::EmptySelection`] before any external call, and the
    /// session stays live for further picking. Once creation is actually
    /// attempted the session is discarded whether the gateway call
    /// succeeded or not; a new parse/match starts the next one.
    pub async fn create_playlist(&self, name: &str) -> Result<PlaylistReceipt> {
        let track_ids = {
            let st = self.state.lock().unwrap();
            let session = st
                .session
                .as_ref()
                .ok_or_else(|| ResolveError::Session("no resolution session is live".to_string()))?;
            collect::confirmed_track_ids(session)?
        };

        log::info!("creating playlist '{name}' with {} track(s)", track_ids.len());
        let result = self.client.create_playlist(name, &track_ids).await;

        let mut st = self.state.lock().unwrap();
        st.session = None;
        st.pending.clear();

        result
    }
}
