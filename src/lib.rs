//! Resolve free-text song lists against the Deezer catalog and collect the
//! confirmed tracks into a new playlist.
//!
//! The crate is organized around a reconciliation workflow: a pasted
//! description is parsed into [`SongRequest`] values, one bulk match
//! classifies every request as found, ambiguous, or missing, individual
//! entries can be re-searched and picked until the user is satisfied, and
//! the confirmed track ids are handed to playlist creation.
//!
//! - [`parser`] turns description text into song requests.
//! - [`CatalogClient`] is the seam to the catalog provider;
//!   [`DeezerGwClient`] is the concrete gateway implementation.
//! - [`ResolutionSession`] holds the per-song reconciliation state;
//!   [`Resolver`] orchestrates matching, refinement, and creation.
//! - [`CredentialStore`] persists the provider credential between runs.

pub mod catalog;
pub mod client;
pub mod collect;
pub mod credential;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod session;
pub mod types;

pub use catalog::CatalogClient;
#[cfg(feature = "mock")]
pub use catalog::MockCatalogClient;
pub use client::DeezerGwClient;
pub use credential::{CredentialStore, StoredCredential};
pub use error::ResolveError;
pub use resolver::Resolver;
pub use session::{
    Classification, RefineOutcome, ResolutionEntry, ResolutionSession, SessionSummary,
};
pub use types::{BulkMatchItem, BulkMatchStatus, MatchCandidate, PlaylistReceipt, SongRequest};

pub type Result<T> = std::result::Result<T, ResolveError>;
