use crate::{BulkMatchItem, MatchCandidate, PlaylistReceipt, Result, SongRequest};
use async_trait::async_trait;

/// Trait for catalog gateway operations that can be mocked for testing.
///
/// This trait abstracts everything the resolution workflow needs from the
/// catalog provider: classified bulk matching, free-query candidate search,
/// and playlist creation. Implementations own the provider credential (they
/// are constructed from it), so the workflow never handles the token itself.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides
/// `MockCatalogClient` implementing this trait via the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait CatalogClient {
    /// Match every request in one call, returning exactly one classified
    /// item per input request, in input order.
    async fn bulk_search(&self, songs: &[SongRequest]) -> Result<Vec<BulkMatchItem>>;

    /// Search the catalog with a free-text query, returning up to `limit`
    /// candidates in the gateway's ranking order.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MatchCandidate>>;

    /// Create a playlist containing the given tracks, in order.
    async fn create_playlist(&self, name: &str, track_ids: &[u64]) -> Result<PlaylistReceipt>;

    /// The authenticated catalog user id.
    fn user_id(&self) -> u64;
}
