use thiserror::Error;

/// Error types for playlist resolution operations.
///
/// This enum covers all failures that can occur while resolving a free-text
/// song list against the catalog: credential problems, unusable input text,
/// gateway/network failures, and workflow validation failures.
///
/// Every variant is recoverable by retrying the action that triggered it;
/// nothing here is fatal to the process.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use deezer_resolve::{DeezerGwClient, ResolveError};
///
/// #[tokio::main]
/// async fn main() {
///     let http = http_client::native::NativeClient::new();
///     match DeezerGwClient::connect(Box::new(http), "arl-cookie-value").await {
///         Ok(client) => println!("Connected as user {}", client.user_id()),
///         Err(ResolveError::Auth(msg)) => eprintln!("Credential rejected: {msg}"),
///         Err(ResolveError::Service(msg)) => eprintln!("Gateway error: {msg}"),
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Credential invalid or expired.
    ///
    /// The ARL cookie was rejected by the gateway, or it resolved to a guest
    /// session. Surfaced by forcing re-authentication.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The description text produced no usable song requests.
    ///
    /// No session is created when this is raised.
    #[error("Failed to parse description: {0}")]
    Parse(String),

    /// Transport or gateway failure during bulk match, refine, or playlist
    /// creation.
    ///
    /// Session state is preserved (bulk match does not build a session on
    /// failure); the triggering action can simply be retried.
    #[error("Service error: {0}")]
    Service(String),

    /// Playlist creation was attempted with no confirmed tracks.
    ///
    /// Raised before any external call is made.
    #[error("No confirmed tracks to add")]
    EmptySelection,

    /// Local workflow misuse: no active session, entry index out of range,
    /// a candidate id that was never offered, or a refine already pending
    /// for the entry.
    ///
    /// No external call is made and no state is mutated.
    #[error("Session error: {0}")]
    Session(String),

    /// File system I/O errors.
    ///
    /// This can occur when reading a description file or persisting the
    /// credential slot.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
