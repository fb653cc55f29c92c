use crate::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// The persisted provider credential.
///
/// The ARL cookie is the only thing the tool keeps across runs. It is
/// opaque: no format contract beyond "string".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    /// The Deezer ARL session cookie value
    pub arl: String,
}

/// Credential persistence in one well-known XDG slot.
///
/// The token is stored as JSON at
/// `~/.local/share/deezer-resolve/credential.json` (per the XDG Base
/// Directory Specification). There is exactly one slot; saving replaces
/// whatever was there.
pub struct CredentialStore;

impl CredentialStore {
    /// Path of the credential slot, or an error if the XDG data directory
    /// cannot be determined.
    pub fn credential_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            ResolveError::Service("Cannot determine XDG data directory".to_string())
        })?;
        Ok(data_dir.join("deezer-resolve").join("credential.json"))
    }

    /// Save a credential, creating the directory structure as needed.
    pub fn save(arl: &str) -> Result<()> {
        let path = Self::credential_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(&StoredCredential {
            arl: arl.to_string(),
        })
        .map_err(|e| ResolveError::Service(format!("Failed to serialize credential: {e}")))?;
        fs::write(&path, json)?;

        log::debug!("credential saved to: {}", path.display());
        Ok(())
    }

    /// Load the stored credential, failing if the slot is empty or
    /// unparseable.
    pub fn load() -> Result<String> {
        let path = Self::credential_path()?;

        if !path.exists() {
            return Err(ResolveError::Auth(
                "No stored credential; run `deezer-resolve check --arl <ARL>` first".to_string(),
            ));
        }

        let json = fs::read_to_string(&path)?;
        let credential: StoredCredential = serde_json::from_str(&json)
            .map_err(|e| ResolveError::Service(format!("Failed to parse credential slot: {e}")))?;

        log::debug!("credential loaded from: {}", path.display());
        Ok(credential.arl)
    }

    /// Whether the slot currently holds a credential.
    pub fn exists() -> bool {
        Self::credential_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Remove the stored credential, if any.
    pub fn clear() -> Result<()> {
        let path = Self::credential_path()?;
        if path.exists() {
            fs::remove_file(&path)?;
            log::debug!("credential removed from: {}", path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_path_shape() {
        let path = CredentialStore::credential_path().unwrap();
        assert!(path
            .to_string_lossy()
            .contains("deezer-resolve/credential.json"));
    }

    #[test]
    fn test_credential_roundtrip_json() {
        let stored = StoredCredential {
            arl: "a".repeat(192),
        };
        let json = serde_json::to_string(&stored).unwrap();
        let restored: StoredCredential = serde_json::from_str(&json).unwrap();
        assert_eq!(stored.arl, restored.arl);
    }
}
