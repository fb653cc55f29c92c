//! Data types for song resolution and playlist creation.
//!
//! This module contains the value types exchanged with the catalog gateway:
//! parsed song requests, proposed track candidates, bulk-match classification
//! results, and the playlist creation receipt.

use serde::{Deserialize, Serialize};

/// One parsed song mention from a free-text description.
///
/// Produced once by the description parser and never mutated afterwards.
/// A request is identified by its position in the parsed sequence; that
/// index is the stable key for the whole resolution session.
///
/// # Examples
///
/// ```rust
/// use deezer_resolve::SongRequest;
///
/// let request = SongRequest {
///     title: "Blinding Lights".to_string(),
///     artist: "The Weeknd".to_string(),
/// };
///
/// assert_eq!(request.display(), "The Weeknd - Blinding Lights");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongRequest {
    /// The song title
    pub title: String,
    /// The artist name; empty when the description line carried no artist
    #[serde(default)]
    pub artist: String,
}

impl SongRequest {
    /// Create a request with both artist and title.
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Create a title-only request (no artist in the source line).
    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: String::new(),
        }
    }

    /// Whether the source line carried an artist.
    pub fn has_artist(&self) -> bool {
        !self.artist.is_empty()
    }

    /// Human-readable `Artist - Title` form (title alone when artist-less).
    pub fn display(&self) -> String {
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.artist, self.title)
        }
    }

    /// The loose search query for this request: `"<artist> <title>"`,
    /// trimmed when the artist is empty.
    pub fn loose_query(&self) -> String {
        format!("{} {}", self.artist, self.title)
            .trim()
            .to_string()
    }
}

/// One track proposed by the catalog gateway.
///
/// Immutable value produced only by search calls; equality of interest is
/// the track id.
///
/// # Examples
///
/// ```rust
/// use deezer_resolve::MatchCandidate;
///
/// let candidate = MatchCandidate {
///     id: 3135556,
///     title: "Harder, Better, Faster, Stronger".to_string(),
///     artist: "Daft Punk".to_string(),
///     album: "Discovery".to_string(),
/// };
///
/// println!("{}", candidate.display());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Catalog track identifier
    pub id: u64,
    /// Track title
    pub title: String,
    /// Artist name
    pub artist: String,
    /// Album title; empty when the gateway omitted it
    #[serde(default)]
    pub album: String,
}

impl MatchCandidate {
    /// Human-readable `Artist - Title (Album)` form, as shown in choosers.
    pub fn display(&self) -> String {
        if self.album.is_empty() {
            format!("{} - {}", self.artist, self.title)
        } else {
            format!("{} - {} ({})", self.artist, self.title, self.album)
        }
    }
}

/// Classification assigned to one bulk-match response item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkMatchStatus {
    /// A single confident match; the track id is final unless the user
    /// intervenes.
    Found,
    /// Multiple plausible matches; the user must choose one.
    Ambiguous,
    /// No match at all; only a manual re-search can recover the entry.
    Missing,
}

/// One item of a bulk-search response, in input order.
///
/// The gateway returns exactly one item per input [`SongRequest`], carrying
/// the classification and whatever matching data that classification
/// implies: a confirmed track id for [`BulkMatchStatus::Found`], a candidate
/// list for [`BulkMatchStatus::Ambiguous`], neither for
/// [`BulkMatchStatus::Missing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkMatchItem {
    /// Classification of this song
    pub status: BulkMatchStatus,
    /// Title as resolved (found) or as requested (ambiguous/missing)
    pub title: String,
    /// Artist as resolved (found) or as requested (ambiguous/missing)
    #[serde(default)]
    pub artist: String,
    /// Confirmed track id; present only for found items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Proposed candidates; non-empty only for ambiguous items
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<MatchCandidate>,
}

impl BulkMatchItem {
    /// A found item with its confirmed track id.
    pub fn found(id: u64, artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            status: BulkMatchStatus::Found,
            title: title.into(),
            artist: artist.into(),
            id: Some(id),
            candidates: Vec::new(),
        }
    }

    /// An ambiguous item with its candidate list.
    pub fn ambiguous(
        artist: impl Into<String>,
        title: impl Into<String>,
        candidates: Vec<MatchCandidate>,
    ) -> Self {
        Self {
            status: BulkMatchStatus::Ambiguous,
            title: title.into(),
            artist: artist.into(),
            id: None,
            candidates,
        }
    }

    /// A missing item.
    pub fn missing(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            status: BulkMatchStatus::Missing,
            title: title.into(),
            artist: artist.into(),
            id: None,
            candidates: Vec::new(),
        }
    }
}

/// Result of a successful playlist creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistReceipt {
    /// Identifier of the created playlist
    pub playlist_id: u64,
    /// Human-readable outcome message
    pub message: String,
    /// Number of tracks handed to the gateway
    pub track_count: usize,
}
