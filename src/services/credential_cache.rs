// Startpage credential cache
// Keeps the single access token handed out on sign-in, on disk as
// `credential.json` in the data dir and in memory until sign-out.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::platform;
use crate::types::errors::AuthError;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedCredential {
    access_token: String,
}

/// File-backed cache of one access token. The in-memory copy is wiped when
/// cleared or dropped.
pub struct CredentialCache {
    path: PathBuf,
    token: Option<String>,
}

impl CredentialCache {
    /// Opens the cache at `path_override`, or `credential.json` in the
    /// platform data dir. An existing file is read eagerly; an unreadable one
    /// is treated as empty.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let path = path_override.unwrap_or_else(|| platform::get_data_dir().join("credential.json"));
        let token = match Self::read_file(&path) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "[CredentialCache] ignoring unreadable credential file");
                None
            }
        };
        Self { path, token }
    }

    fn read_file(path: &Path) -> Result<Option<String>, AuthError> {
        if !path.exists() {
            return Ok(None);
        }
        let mut content = fs::read_to_string(path)
            .map_err(|e| AuthError::CredentialCache(format!("Failed to read credential: {}", e)))?;
        let parsed: Result<CachedCredential, _> = serde_json::from_str(&content);
        content.zeroize();
        let cached = parsed
            .map_err(|e| AuthError::CredentialCache(format!("Failed to parse credential: {}", e)))?;
        Ok(Some(cached.access_token))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.token.is_some()
    }

    /// Replaces the cached token and writes it to disk.
    pub fn store(&mut self, token: &str) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::CredentialCache(format!("Failed to create data directory: {}", e))
            })?;
        }
        let mut json = serde_json::to_string(&CachedCredential {
            access_token: token.to_string(),
        })
        .map_err(|e| AuthError::CredentialCache(format!("Failed to serialize credential: {}", e)))?;
        let written = fs::write(&self.path, &json);
        json.zeroize();
        written
            .map_err(|e| AuthError::CredentialCache(format!("Failed to write credential: {}", e)))?;

        self.wipe_memory();
        self.token = Some(token.to_string());
        debug!(path = %self.path.display(), "[CredentialCache] token stored");
        Ok(())
    }

    /// Erases the token from memory and removes the file.
    pub fn clear(&mut self) -> Result<(), AuthError> {
        self.wipe_memory();
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                AuthError::CredentialCache(format!("Failed to remove credential: {}", e))
            })?;
        }
        debug!("[CredentialCache] token cleared");
        Ok(())
    }

    fn wipe_memory(&mut self) {
        if let Some(mut token) = self.token.take() {
            token.zeroize();
        }
    }
}

impl Drop for CredentialCache {
    fn drop(&mut self) {
        self.wipe_memory();
    }
}
