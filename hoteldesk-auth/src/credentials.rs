//! Credential persistence
//!
//! A single bearer token stored under a fixed key. Read at startup, written
//! on login, removed on logout.

use hoteldesk_core::{storage_error, ErrorContext, HotelDeskError, HotelDeskResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Fixed key the token is stored under
pub const CREDENTIAL_KEY: &str = "hoteldesk.token";

/// Persistent storage for the bearer token
pub trait CredentialStore: Send + Sync {
    /// Read the stored token, `None` when nothing is persisted
    fn load(&self) -> HotelDeskResult<Option<String>>;

    /// Replace the stored token
    fn save(&self, token: &str) -> HotelDeskResult<()>;

    /// Remove the stored token; a missing token is not an error
    fn clear(&self) -> HotelDeskResult<()>;
}

/// JSON file holding `{ "hoteldesk.token": "<token>" }`
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> HotelDeskResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| storage_failure(e, "read"))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content).map_err(|e| HotelDeskError::Storage {
            message: format!("Credential file is corrupt: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("credentials")
                .with_operation("parse")
                .with_metadata("path", &self.path.display().to_string())
                .with_suggestion("Run 'hoteldesk logout' to discard the stored credential"),
        })
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> HotelDeskResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_failure(e, "create_dir"))?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json).map_err(|e| storage_failure(e, "write"))?;
        Ok(())
    }
}

fn storage_failure(error: std::io::Error, operation: &str) -> HotelDeskError {
    storage_error!(
        format!("Credential file {} failed: {}", operation, error),
        "credentials",
        error
    )
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> HotelDeskResult<Option<String>> {
        let token = self.read_entries()?.remove(CREDENTIAL_KEY);
        debug!(
            path = %self.path.display(),
            found = token.is_some(),
            "Loaded persisted credential"
        );
        Ok(token.filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> HotelDeskResult<()> {
        // Corrupt files are overwritten rather than blocking a fresh login
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(CREDENTIAL_KEY.to_string(), token.to_string());
        self.write_entries(&entries)?;
        info!(path = %self.path.display(), "Persisted credential");
        Ok(())
    }

    fn clear(&self) -> HotelDeskResult<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let mut entries = self.read_entries().unwrap_or_default();
        entries.remove(CREDENTIAL_KEY);

        if entries.is_empty() {
            std::fs::remove_file(&self.path).map_err(|e| storage_failure(e, "remove"))?;
        } else {
            self.write_entries(&entries)?;
        }

        debug!(path = %self.path.display(), "Cleared persisted credential");
        Ok(())
    }
}

/// In-process credential store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token<S: Into<String>>(token: S) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> HotelDeskResult<Option<String>> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, token: &str) -> HotelDeskResult<()> {
        *self
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> HotelDeskResult<()> {
        self.token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("sub").join("credentials.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save("abc").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc".to_string()));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(CREDENTIAL_KEY));

        store.save("def").unwrap();
        assert_eq!(store.load().unwrap(), Some("def".to_string()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_clear_without_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("missing.json"));
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_corrupt_file_is_reported_and_overwritten_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(matches!(store.load(), Err(HotelDeskError::Storage { .. })));

        store.save("fresh").unwrap();
        assert_eq!(store.load().unwrap(), Some("fresh".to_string()));
    }

    #[test]
    fn test_unrelated_keys_survive_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"hoteldesk.token": "t", "theme": "dark"}"#).unwrap();

        let store = FileCredentialStore::new(&path);
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(std::fs::read_to_string(&path).unwrap().contains("theme"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::with_token("xyz");
        assert_eq!(store.load().unwrap(), Some("xyz".to_string()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
