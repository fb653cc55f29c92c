mod commands;

use clap::Parser;
use commands::Commands;

/// Free-text song list to Deezer playlist resolver
#[derive(Parser)]
#[command(
    name = "deezer-resolve",
    about = "Resolve a pasted song list against Deezer and create a playlist",
    long_about = None
)]
struct Cli {
    /// ARL session cookie (falls back to DEEZER_ARL, then the stored credential)
    #[arg(long, global = true)]
    arl: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Cli::parse();

    if let Err(e) = commands::execute_command(args.command, args.arl).await {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }

    Ok(())
}
