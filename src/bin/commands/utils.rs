use deezer_resolve::{CredentialStore, DeezerGwClient};
use std::env;
use std::io::{self, BufRead, Write};

/// Resolve the ARL cookie: explicit flag, then environment, then the
/// stored credential slot.
pub fn resolve_arl(flag: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(arl) = flag {
        return Ok(arl);
    }
    if let Ok(arl) = env::var("DEEZER_ARL") {
        if !arl.trim().is_empty() {
            return Ok(arl);
        }
    }
    if CredentialStore::exists() {
        return Ok(CredentialStore::load()?);
    }
    Err("No ARL cookie available. Pass --arl, set DEEZER_ARL, \
         or store one with `deezer-resolve check --arl <ARL>`"
        .into())
}

/// Connect a gateway client from whatever credential source is available.
pub async fn connect_client(
    flag: Option<String>,
) -> Result<DeezerGwClient, Box<dyn std::error::Error>> {
    let arl = resolve_arl(flag)?;
    let http_client = http_client::native::NativeClient::new();
    let client = DeezerGwClient::connect(Box::new(http_client), &arl).await?;
    Ok(client)
}

/// Print a prompt and read one line; `None` on end of input.
pub fn prompt_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask a yes/no question; end of input counts as "no".
pub fn confirm(question: &str) -> io::Result<bool> {
    match prompt_line(&format!("{question} (y/n): "))? {
        Some(answer) => Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")),
        None => Ok(false),
    }
}
