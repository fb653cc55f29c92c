pub mod check;
pub mod resolve;
pub mod search;
pub mod utils;

use clap::Subcommand;
use deezer_resolve::CredentialStore;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a Deezer ARL cookie and store it for later runs
    ///
    /// The ARL is taken from --arl, then the DEEZER_ARL environment
    /// variable, then the stored credential. On success it is saved to the
    /// credential slot so the other commands can run without flags.
    ///
    /// Usage examples:
    /// # Validate and store a fresh cookie
    /// deezer-resolve check --arl "paste-192-char-cookie-here"
    ///
    /// # Re-validate whatever is stored
    /// deezer-resolve check
    Check,

    /// Resolve a description into a new playlist (interactive)
    ///
    /// Reads a free-text description (file argument or stdin), parses it
    /// into songs, matches them against the catalog, then drops into an
    /// interactive loop where uncertain matches can be re-searched and
    /// picked before the playlist is created.
    ///
    /// Usage examples:
    /// # Resolve a saved tracklist into a playlist named "Mix"
    /// deezer-resolve resolve tracklist.txt --name "Mix"
    ///
    /// # Paste interactively, finish input with END or Ctrl-D
    /// deezer-resolve resolve
    Resolve {
        /// Read the description from this file instead of stdin
        file: Option<PathBuf>,

        /// Playlist name (prompted for when omitted)
        #[arg(long)]
        name: Option<String>,

        /// Skip the parsed-songs confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Search catalog candidates for a free-text query
    ///
    /// Usage examples:
    /// deezer-resolve search "daft punk around the world"
    /// deezer-resolve search "levitating" --limit 5
    Search {
        /// Search query
        query: String,

        /// Maximum number of candidates to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Forget the stored credential
    Forget,
}

/// Execute the appropriate command handler based on the parsed command
pub async fn execute_command(
    command: Commands,
    arl: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Check => check::handle_check(arl).await,

        Commands::Resolve { file, name, yes } => {
            let client = utils::connect_client(arl).await?;
            resolve::handle_resolve(client, file.as_deref(), name, yes).await
        }

        Commands::Search { query, limit } => {
            let client = utils::connect_client(arl).await?;
            search::handle_search(client, &query, limit).await
        }

        Commands::Forget => {
            CredentialStore::clear()?;
            println!("🗑️  Stored credential removed");
            Ok(())
        }
    }
}
