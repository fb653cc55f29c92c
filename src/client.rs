//! Deezer gateway client.
//!
//! Talks to the unofficial `gw-light.php` endpoint using an `arl` session
//! cookie, which sidesteps the need for a registered application. The
//! client validates the cookie at connect time, then serves classified bulk
//! matching, free-query candidate search, and playlist creation.

use crate::{
    BulkMatchItem, CatalogClient, MatchCandidate, PlaylistReceipt, ResolveError, Result,
    SongRequest,
};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://www.deezer.com";

// Candidate list sizes the workflow shows: a short list for bulk
// classification, a longer one for manual re-searches.
const BULK_CANDIDATE_LIMIT: usize = 5;

// playlist.addSongs rejects very large payloads; the fallback path adds
// tracks in chunks with a pause between them.
const ADD_TRACKS_CHUNK_SIZE: usize = 20;
const ADD_TRACKS_CHUNK_PAUSE_SECS: u64 = 1;

/// Client for the Deezer `gw-light.php` gateway.
///
/// Constructed by [`DeezerGwClient::connect`], which performs the
/// credential validation handshake: the `arl` cookie is exchanged for the
/// per-session api token (`checkForm`) and the user id, and a guest
/// session is rejected outright.
///
/// # Examples
///
/// ```rust,no_run
/// use deezer_resolve::DeezerGwClient;
///
/// #[tokio::main]
/// async fn main() -> deezer_resolve::Result<()> {
///     let http = http_client::native::NativeClient::new();
///     let client = DeezerGwClient::connect(Box::new(http), "arl-cookie-value").await?;
///     println!("connected as user {}", client.user_id());
///     Ok(())
/// }
/// ```
pub struct DeezerGwClient {
    client: Box<dyn HttpClient>,
    arl: String,
    api_token: String,
    user_id: u64,
    base_url: String,
}

impl DeezerGwClient {
    /// Connect with the default Deezer base URL.
    pub async fn connect(client: Box<dyn HttpClient>, arl: &str) -> Result<Self> {
        Self::connect_with_base_url(client, arl, DEFAULT_BASE_URL.to_string()).await
    }

    /// Connect against a custom base URL (useful for tests).
    pub async fn connect_with_base_url(
        client: Box<dyn HttpClient>,
        arl: &str,
        base_url: String,
    ) -> Result<Self> {
        let mut gw = Self {
            client,
            arl: arl.trim().to_string(),
            // The handshake itself is made with the placeholder token.
            api_token: "null".to_string(),
            user_id: 0,
            base_url,
        };

        log::debug!("connecting to Deezer gateway");
        let user_data = gw.gw_call("deezer.getUserData", json!({})).await?;

        let api_token = user_data
            .get("checkForm")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ResolveError::Auth("gateway returned no api token for this ARL".to_string())
            })?
            .to_string();

        let user_id = user_data
            .get("USER")
            .and_then(|u| u.get("USER_ID"))
            .and_then(value_as_u64)
            .ok_or_else(|| ResolveError::Auth("gateway returned no user id".to_string()))?;

        // User id 0 is Deezer's guest session: the cookie was accepted as a
        // cookie but not as a credential. Playlist creation would fail.
        if user_id == 0 {
            return Err(ResolveError::Auth(
                "ARL cookie resolved to a guest session (invalid or expired)".to_string(),
            ));
        }

        gw.api_token = api_token;
        gw.user_id = user_id;
        log::info!("connected to Deezer as user {user_id}");
        Ok(gw)
    }

    /// The authenticated user id.
    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    async fn gw_call(&self, method: &str, params: Value) -> Result<Value> {
        let url = format!(
            "{}/ajax/gw-light.php?method={}&api_version=1.0&api_token={}&input=3",
            self.base_url,
            urlencoding::encode(method),
            urlencoding::encode(&self.api_token),
        );
        let url = url
            .parse::<Url>()
            .map_err(|e| ResolveError::Service(format!("invalid gateway URL: {e}")))?;

        let mut request = Request::new(Method::Post, url);
        request.insert_header(
            "User-Agent",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        );
        let referer = format!("{}/en/", self.base_url);
        let cookie = format!("arl={}", self.arl);
        request.insert_header("Origin", self.base_url.as_str());
        request.insert_header("Referer", referer.as_str());
        request.insert_header("Accept-Language", "en-US,en;q=0.9");
        request.insert_header("X-Requested-With", "XMLHttpRequest");
        request.insert_header("Content-Type", "application/json");
        request.insert_header("Cookie", cookie.as_str());
        request.set_body(params.to_string());

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| ResolveError::Service(format!("{method}: {e}")))?;

        let body = response
            .body_string()
            .await
            .map_err(|e| ResolveError::Service(format!("{method}: {e}")))?;

        let mut envelope: Value = serde_json::from_str(&body).map_err(|e| {
            let snippet: String = body.chars().take(500).collect();
            log::debug!("unparseable gateway response for {method}: {snippet}");
            ResolveError::Service(format!("unparseable response from {method}: {e}"))
        })?;

        if let Some(message) = gateway_error_message(&envelope) {
            return Err(ResolveError::Service(format!("{method}: {message}")));
        }

        Ok(envelope.get_mut("results").map(Value::take).unwrap_or(Value::Null))
    }

    async fn search_candidates(&self, query: &str, limit: usize) -> Result<Vec<MatchCandidate>> {
        let results = self
            .gw_call(
                "search.music",
                json!({
                    "query": query,
                    "filter": "ALL",
                    "output": "TRACK",
                    "start": 0,
                    "nb": limit,
                }),
            )
            .await?;
        Ok(parse_search_results(&results))
    }

    // Strict metadata query first, loose text query second; the first hit
    // wins. None means both strategies came up empty.
    async fn search_track(&self, song: &SongRequest) -> Result<Option<MatchCandidate>> {
        if song.has_artist() {
            let strict = format!(r#"artist:"{}" track:"{}""#, song.artist, song.title);
            let hits = self.search_candidates(&strict, 1).await?;
            if let Some(hit) = hits.into_iter().next() {
                log::debug!("strict search hit for '{}'", song.display());
                return Ok(Some(hit));
            }
        }

        let loose = song.loose_query();
        log::debug!("loose search for '{loose}'");
        let hits = self.search_candidates(&loose, 1).await?;
        Ok(hits.into_iter().next())
    }

    // Classify one request the way the original prepare step did: candidates
    // on the bare title when the single-hit path is unusable or untrusted.
    async fn classify(&self, song: &SongRequest) -> Result<BulkMatchItem> {
        if song.has_artist() {
            if let Some(hit) = self.search_track(song).await? {
                if !artist_match_is_suspicious(&song.artist, &hit.artist) {
                    return Ok(BulkMatchItem::found(hit.id, hit.artist, hit.title));
                }
                log::debug!(
                    "demoting '{}' to ambiguous: hit artist '{}' does not look like '{}'",
                    song.display(),
                    hit.artist,
                    song.artist
                );
            }
        }

        let candidates = self
            .search_candidates(&song.title, BULK_CANDIDATE_LIMIT)
            .await?;
        if candidates.is_empty() {
            Ok(BulkMatchItem::missing(&*song.artist, &*song.title))
        } else {
            Ok(BulkMatchItem::ambiguous(
                &*song.artist,
                &*song.title,
                candidates,
            ))
        }
    }

    async fn add_tracks_chunked(&self, playlist_id: u64, track_ids: &[u64]) -> usize {
        let mut added = 0;
        for (i, chunk) in track_ids.chunks(ADD_TRACKS_CHUNK_SIZE).enumerate() {
            if i > 0 {
                tokio::time::sleep(std::time::Duration::from_secs(ADD_TRACKS_CHUNK_PAUSE_SECS))
                    .await;
            }
            let songs: Vec<Value> = chunk.iter().map(|id| json!([id, 0])).collect();
            let result = self
                .gw_call(
                    "playlist.addSongs",
                    json!({
                        "playlist_id": playlist_id,
                        "songs": songs,
                        "offset": -1,
                    }),
                )
                .await;
            match result {
                Ok(_) => added += chunk.len(),
                Err(e) => {
                    log::warn!(
                        "failed to add chunk of {} track(s) to playlist {playlist_id}: {e}",
                        chunk.len()
                    );
                }
            }
        }
        added
    }
}

#[async_trait(?Send)]
impl CatalogClient for DeezerGwClient {
    async fn bulk_search(&self, songs: &[SongRequest]) -> Result<Vec<BulkMatchItem>> {
        let mut items = Vec::with_capacity(songs.len());
        for song in songs {
            items.push(self.classify(song).await?);
        }
        Ok(items)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MatchCandidate>> {
        self.search_candidates(query, limit).await
    }

    async fn create_playlist(&self, name: &str, track_ids: &[u64]) -> Result<PlaylistReceipt> {
        let songs: Vec<Value> = track_ids.iter().map(|id| json!([id, 0])).collect();

        // Creating with the whole tracklist in one call is the fast path;
        // the gateway sometimes rejects it for long lists.
        let created = self
            .gw_call(
                "playlist.create",
                json!({
                    "title": name,
                    "status": 0,
                    "description": "Created with deezer-resolve",
                    "songs": songs,
                }),
            )
            .await;

        match created.as_ref().ok().and_then(value_as_u64) {
            Some(playlist_id) => Ok(PlaylistReceipt {
                playlist_id,
                message: format!(
                    "Playlist '{name}' created with {} song(s).",
                    track_ids.len()
                ),
                track_count: track_ids.len(),
            }),
            None => {
                log::info!(
                    "creating playlist with tracks failed ({created:?}); falling back to chunked adds"
                );
                let empty = self
                    .gw_call(
                        "playlist.create",
                        json!({
                            "title": name,
                            "status": 0,
                            "description": "Created with deezer-resolve",
                            "songs": [],
                        }),
                    )
                    .await?;
                let playlist_id = value_as_u64(&empty).ok_or_else(|| {
                    ResolveError::Service("playlist.create returned no playlist id".to_string())
                })?;

                let added = self.add_tracks_chunked(playlist_id, track_ids).await;
                Ok(PlaylistReceipt {
                    playlist_id,
                    message: format!(
                        "Playlist '{name}' created (chunked mode) with {added} of {} song(s).",
                        track_ids.len()
                    ),
                    track_count: added,
                })
            }
        }
    }

    fn user_id(&self) -> u64 {
        self.user_id
    }
}

// The gateway reports errors inside a 200 response. An empty list or empty
// object in the error slot is the "no error" sentinel.
fn gateway_error_message(envelope: &Value) -> Option<String> {
    match envelope.get("error") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) if items.is_empty() => None,
        Some(Value::Object(map)) if map.is_empty() => None,
        Some(other) => Some(other.to_string()),
    }
}

// Gateway ids arrive as numbers or as strings depending on the endpoint.
fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Extract track metadata from one search result item.
///
/// The gateway mixes two key vocabularies (`SNG_ID`/`ART_NAME`/`SNG_TITLE`
/// and the public-API style `id`/`artist.name`/`title`); items with no
/// usable id are dropped.
fn extract_candidate(item: &Value) -> Option<MatchCandidate> {
    let id = ["id", "SNG_ID", "TRACK_ID", "ID"]
        .iter()
        .find_map(|key| item.get(*key).and_then(value_as_u64))
        .filter(|id| *id > 0)?;

    let title = item
        .get("SNG_TITLE")
        .or_else(|| item.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();

    let artist = item
        .get("ART_NAME")
        .and_then(Value::as_str)
        .or_else(|| {
            item.get("artist")
                .and_then(|a| a.get("name"))
                .and_then(Value::as_str)
        })
        .unwrap_or("Unknown")
        .to_string();

    let album = item
        .get("ALB_TITLE")
        .and_then(Value::as_str)
        .or_else(|| {
            item.get("album")
                .and_then(|a| a.get("title"))
                .and_then(Value::as_str)
        })
        .unwrap_or("")
        .to_string();

    Some(MatchCandidate {
        id,
        title,
        artist,
        album,
    })
}

fn parse_search_results(results: &Value) -> Vec<MatchCandidate> {
    results
        .get("data")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(extract_candidate).collect())
        .unwrap_or_default()
}

// The strict search trusts the gateway, but a hit whose artist shares
// nothing with the requested artist is usually a keyword accident
// (requesting "8" and getting "Ludwig"). Substring overlap in either
// direction passes; very short inputs must match exactly.
fn artist_match_is_suspicious(requested: &str, found: &str) -> bool {
    let requested = requested.trim().to_lowercase();
    let found = found.trim().to_lowercase();

    if requested.chars().count() < 3 {
        return requested != found;
    }
    !found.contains(&requested) && !requested.contains(&found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gw_style_results() {
        let results: Value = serde_json::from_str(
            r#"{
                "data": [
                    {
                        "SNG_ID": "3135556",
                        "SNG_TITLE": "Harder, Better, Faster, Stronger",
                        "ART_NAME": "Daft Punk",
                        "ALB_TITLE": "Discovery"
                    },
                    {
                        "SNG_ID": "0",
                        "SNG_TITLE": "Ghost entry",
                        "ART_NAME": "Nobody"
                    }
                ]
            }"#,
        )
        .unwrap();

        let candidates = parse_search_results(&results);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, 3135556);
        assert_eq!(candidates[0].artist, "Daft Punk");
        assert_eq!(candidates[0].album, "Discovery");
    }

    #[test]
    fn test_parse_public_api_style_results() {
        let results: Value = serde_json::from_str(
            r#"{
                "data": [
                    {
                        "id": 916424,
                        "title": "One More Time",
                        "artist": {"name": "Daft Punk"},
                        "album": {"title": "Discovery"}
                    }
                ]
            }"#,
        )
        .unwrap();

        let candidates = parse_search_results(&results);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, 916424);
        assert_eq!(candidates[0].title, "One More Time");
        assert_eq!(candidates[0].artist, "Daft Punk");
    }

    #[test]
    fn test_parse_results_without_data() {
        assert!(parse_search_results(&Value::Null).is_empty());
        assert!(parse_search_results(&json!({"data": []})).is_empty());
    }

    #[test]
    fn test_candidate_defaults_for_missing_metadata() {
        let candidates = parse_search_results(&json!({"data": [{"SNG_ID": 7}]}));
        assert_eq!(candidates[0].title, "Unknown");
        assert_eq!(candidates[0].artist, "Unknown");
        assert_eq!(candidates[0].album, "");
    }

    #[test]
    fn test_gateway_error_sentinels() {
        assert_eq!(gateway_error_message(&json!({"results": {}})), None);
        assert_eq!(gateway_error_message(&json!({"error": []})), None);
        assert_eq!(gateway_error_message(&json!({"error": {}})), None);
        assert_eq!(gateway_error_message(&json!({"error": null})), None);
        assert!(
            gateway_error_message(&json!({"error": {"VALID_TOKEN_REQUIRED": "Invalid CSRF token"}}))
                .is_some()
        );
        assert!(gateway_error_message(&json!({"error": ["GATEWAY_ERROR"]})).is_some());
    }

    #[test]
    fn test_suspicious_artist_heuristic() {
        // Substring overlap in either direction is trusted.
        assert!(!artist_match_is_suspicious("Pop", "Pop Mage"));
        assert!(!artist_match_is_suspicious("The Beatles", "Beatles"));
        assert!(!artist_match_is_suspicious("Queen", "queen"));
        // Keyword accidents are not.
        assert!(artist_match_is_suspicious("8", "Ludwig"));
        assert!(artist_match_is_suspicious("Adele", "Rick Astley"));
        // Very short inputs must match exactly.
        assert!(artist_match_is_suspicious("AC", "AC/DC"));
        assert!(!artist_match_is_suspicious("M83", "M83"));
    }

    #[test]
    fn test_value_as_u64_variants() {
        assert_eq!(value_as_u64(&json!(42)), Some(42));
        assert_eq!(value_as_u64(&json!("42")), Some(42));
        assert_eq!(value_as_u64(&json!("not a number")), None);
        assert_eq!(value_as_u64(&json!(null)), None);
    }
}
