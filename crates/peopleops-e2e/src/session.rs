//! Session snapshots.
//!
//! The auth setup project logs in once and persists the browser's cookies
//! and storage; every dependent project installs that snapshot into each
//! fresh page so tests start already authenticated.
//!
//! The file uses the automation driver's storage-state JSON layout
//! (`cookies[]`, `origins[].localStorage[]`), with an optional
//! `sessionStorage` list per origin.

use crate::driver::PageDriver;
use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Same site cookie setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SameSite {
    /// Strict same site
    Strict,
    /// Lax same site
    #[default]
    Lax,
    /// No same site restriction
    None,
}

/// A browser cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain
    pub domain: String,
    /// Path
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiration, seconds since epoch; `-1` for session cookies
    #[serde(default = "session_expiry")]
    pub expires: f64,
    /// HTTP only flag
    #[serde(default)]
    pub http_only: bool,
    /// Secure flag
    #[serde(default)]
    pub secure: bool,
    /// Same site setting
    #[serde(default)]
    pub same_site: SameSite,
}

fn default_path() -> String {
    "/".to_string()
}

const fn session_expiry() -> f64 {
    -1.0
}

impl Cookie {
    /// Create a session cookie for `domain` at path `/`
    #[must_use]
    pub fn new(name: &str, value: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: default_path(),
            expires: session_expiry(),
            http_only: false,
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Set expiration
    #[must_use]
    pub const fn with_expires(mut self, expires: f64) -> Self {
        self.expires = expires;
        self
    }

    /// Set HTTP only
    #[must_use]
    pub const fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    /// Set secure
    #[must_use]
    pub const fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Whether the cookie has expired at `now` (seconds since epoch)
    #[must_use]
    pub fn is_expired_at(&self, now: f64) -> bool {
        self.expires >= 0.0 && self.expires < now
    }
}

/// A storage key/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    /// Key
    pub name: String,
    /// Value
    pub value: String,
}

/// Web storage captured for one origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginState {
    /// Origin, e.g. `http://localhost:3000`
    pub origin: String,
    /// `localStorage` entries
    #[serde(default)]
    pub local_storage: Vec<StorageEntry>,
    /// `sessionStorage` entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_storage: Vec<StorageEntry>,
}

impl OriginState {
    /// Empty state for an origin
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            local_storage: Vec::new(),
            session_storage: Vec::new(),
        }
    }

    /// Look up a `localStorage` value
    #[must_use]
    pub fn local(&self, name: &str) -> Option<&str> {
        self.local_storage
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }
}

/// Serialized authentication snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageState {
    /// Cookies
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    /// Per-origin web storage
    #[serde(default)]
    pub origins: Vec<OriginState>,
}

impl StorageState {
    /// Create empty storage state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie
    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    fn origin_mut(&mut self, origin: &str) -> &mut OriginState {
        if let Some(i) = self.origins.iter().position(|o| o.origin == origin) {
            &mut self.origins[i]
        } else {
            self.origins.push(OriginState::new(origin));
            let last = self.origins.len() - 1;
            &mut self.origins[last]
        }
    }

    /// Add local storage item
    #[must_use]
    pub fn with_local_storage(mut self, origin: &str, name: &str, value: &str) -> Self {
        self.origin_mut(origin).local_storage.push(StorageEntry {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Add session storage item
    #[must_use]
    pub fn with_session_storage(mut self, origin: &str, name: &str, value: &str) -> Self {
        self.origin_mut(origin).session_storage.push(StorageEntry {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Storage captured for `origin`
    #[must_use]
    pub fn origin(&self, origin: &str) -> Option<&OriginState> {
        self.origins.iter().find(|o| o.origin == origin)
    }

    /// Check if storage is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
            && self
                .origins
                .iter()
                .all(|o| o.local_storage.is_empty() && o.session_storage.is_empty())
    }

    /// Merge origins captured from another page into this snapshot
    pub fn merge_origins(&mut self, other: Vec<OriginState>) {
        for incoming in other {
            let slot = self.origin_mut(&incoming.origin);
            slot.local_storage = incoming.local_storage;
            slot.session_storage = incoming.session_storage;
        }
    }
}

/// The on-disk location of the shared session snapshot.
///
/// Written once by the setup project, read by every dependent project.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a snapshot has been written
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the snapshot
    pub fn load(&self) -> E2eResult<StorageState> {
        if !self.exists() {
            return Err(E2eError::SessionError {
                message: format!(
                    "no session snapshot at {}; run the setup project first",
                    self.path.display()
                ),
            });
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&raw).map_err(|e| E2eError::SessionError {
            message: format!("{} is not a valid snapshot: {e}", self.path.display()),
        })?;
        debug!(path = %self.path.display(), "loaded session snapshot");
        Ok(state)
    }

    /// Write the snapshot atomically (temp file in the same directory, then rename)
    pub fn save(&self, state: &StorageState) -> E2eResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(serde_json::to_string_pretty(state)?.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| E2eError::Io(e.error))?;
        info!(
            path = %self.path.display(),
            cookies = state.cookies.len(),
            "saved session snapshot"
        );
        Ok(())
    }

    /// Capture the page's storage and save it
    pub async fn capture(&self, driver: &dyn PageDriver) -> E2eResult<StorageState> {
        let state = driver.storage_state().await?;
        if state.is_empty() {
            return Err(E2eError::SessionError {
                message: "page has no cookies or storage to persist; did login succeed?".into(),
            });
        }
        self.save(&state)?;
        Ok(state)
    }

    /// Delete the snapshot, forcing the next run to log in again
    pub fn invalidate(&self) -> E2eResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;

    fn sample() -> StorageState {
        StorageState::new()
            .with_cookie(Cookie::new("orangehrm", "abc123", "opensource-demo.orangehrmlive.com").http_only())
            .with_local_storage("http://localhost:3000", "token", "jwt")
            .with_session_storage("http://localhost:3000", "tab", "1")
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_driver_format_field_names() {
            let json = serde_json::to_value(sample()).unwrap();
            let cookie = &json["cookies"][0];
            assert_eq!(cookie["httpOnly"], true);
            assert_eq!(cookie["sameSite"], "Lax");
            assert_eq!(cookie["expires"], -1.0);
            assert_eq!(json["origins"][0]["localStorage"][0]["name"], "token");
            assert_eq!(json["origins"][0]["sessionStorage"][0]["value"], "1");
        }

        #[test]
        fn test_reads_minimal_driver_file() {
            let raw = r#"{"cookies":[{"name":"sid","value":"v","domain":"localhost"}],
                          "origins":[{"origin":"http://localhost:3000","localStorage":[]}]}"#;
            let state: StorageState = serde_json::from_str(raw).unwrap();
            assert_eq!(state.cookies[0].path, "/");
            assert!(state.origins[0].session_storage.is_empty());
            assert!(!state.is_empty());
        }

        #[test]
        fn test_session_storage_omitted_when_empty() {
            let state = StorageState::new().with_local_storage("http://a", "k", "v");
            let json = serde_json::to_string(&state).unwrap();
            assert!(!json.contains("sessionStorage"));
        }

        #[test]
        fn test_origin_lookup_and_merge() {
            let mut state = sample();
            assert_eq!(
                state.origin("http://localhost:3000").and_then(|o| o.local("token")),
                Some("jwt")
            );
            let mut fresh = OriginState::new("http://localhost:3000");
            fresh.local_storage.push(StorageEntry {
                name: "token".into(),
                value: "jwt2".into(),
            });
            state.merge_origins(vec![fresh]);
            assert_eq!(state.origins.len(), 1);
            assert_eq!(state.origins[0].local("token"), Some("jwt2"));
        }

        #[test]
        fn test_cookie_expiry() {
            assert!(!Cookie::new("a", "b", "c").is_expired_at(1e12));
            assert!(Cookie::new("a", "b", "c").with_expires(10.0).is_expired_at(11.0));
        }
    }

    mod store_tests {
        use super::*;

        #[test]
        fn test_save_then_load() {
            let dir = tempfile::tempdir().unwrap();
            let store = SessionStore::new(dir.path().join("playwright/.auth/user.json"));
            assert!(!store.exists());
            store.save(&sample()).unwrap();
            assert!(store.exists());
            assert_eq!(store.load().unwrap(), sample());
        }

        #[test]
        fn test_missing_snapshot_is_session_error() {
            let dir = tempfile::tempdir().unwrap();
            let store = SessionStore::new(dir.path().join("user.json"));
            let err = store.load().unwrap_err();
            assert!(matches!(err, E2eError::SessionError { .. }));
            assert!(err.to_string().contains("setup project"));
        }

        #[test]
        fn test_corrupt_snapshot() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("user.json");
            std::fs::write(&path, "{not json").unwrap();
            let err = SessionStore::new(&path).load().unwrap_err();
            assert!(matches!(err, E2eError::SessionError { .. }));
        }

        #[test]
        fn test_invalidate_is_idempotent() {
            let dir = tempfile::tempdir().unwrap();
            let store = SessionStore::new(dir.path().join("user.json"));
            store.save(&sample()).unwrap();
            store.invalidate().unwrap();
            store.invalidate().unwrap();
            assert!(!store.exists());
        }

        #[tokio::test]
        async fn test_capture_from_page() {
            let dir = tempfile::tempdir().unwrap();
            let store = SessionStore::new(dir.path().join("user.json"));
            let driver = MockDriver::new();
            driver.set_storage_state(sample());
            let captured = store.capture(&driver).await.unwrap();
            assert_eq!(captured.cookies.len(), 1);
            assert_eq!(store.load().unwrap(), sample());
        }

        #[tokio::test]
        async fn test_capture_rejects_empty_session() {
            let dir = tempfile::tempdir().unwrap();
            let store = SessionStore::new(dir.path().join("user.json"));
            let err = store.capture(&MockDriver::new()).await.unwrap_err();
            assert!(matches!(err, E2eError::SessionError { .. }));
            assert!(!store.exists());
        }
    }
}
