use super::utils::resolve_arl;
use deezer_resolve::{CredentialStore, DeezerGwClient};

/// Validate the credential and persist it on success.
pub async fn handle_check(arl: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let arl = resolve_arl(arl)?;

    println!("🔍 Validating ARL cookie...");
    let http_client = http_client::native::NativeClient::new();
    let client = DeezerGwClient::connect(Box::new(http_client), &arl).await?;

    println!("✅ Connected as user {}", client.user_id());

    if let Err(e) = CredentialStore::save(&arl) {
        println!("⚠️  Warning: failed to store the credential: {e}");
        println!("   (You'll need to pass --arl or set DEEZER_ARL next time)");
    } else {
        println!("💾 Credential stored");
    }

    Ok(())
}
