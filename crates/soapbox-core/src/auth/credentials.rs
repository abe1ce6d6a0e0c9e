//! Persistent storage for the bearer token.
//!
//! One file, one raw string. The web build of this client kept the token in
//! browser local storage, which is how literal `"null"` / `"undefined"`
//! strings ended up persisted; those sentinels are normalized to "no token"
//! on load and never treated as credentials.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

/// Token file name inside the data directory
const TOKEN_FILE: &str = "token";

/// Stored literals that mean "no session"
const ABSENT_SENTINELS: &[&str] = &["", "null", "undefined"];

/// Stores the opaque bearer token, mirrored in memory.
///
/// Storage failures degrade to an in-memory-only credential - the session
/// just won't survive a restart. Neither `load` nor `save` can fail.
pub struct TokenStore {
    path: Option<PathBuf>,
    cached: Option<String>,
}

impl TokenStore {
    /// Create a store backed by `data_dir`, or purely in-memory when `None`.
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        let path = data_dir.and_then(|dir| match fs::create_dir_all(&dir) {
            Ok(()) => Some(dir.join(TOKEN_FILE)),
            Err(e) => {
                warn!(error = %e, "token storage unavailable, keeping credential in memory only");
                None
            }
        });

        let cached = path.as_deref().and_then(|p| match fs::read_to_string(p) {
            Ok(contents) => normalize(&contents),
            Err(_) => None,
        });

        Self { path, cached }
    }

    /// An in-memory-only store. Used directly by tests; production code gets
    /// here when the data directory cannot be created.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cached: None,
        }
    }

    /// The current token, or `None` when no session is persisted.
    pub fn load(&self) -> Option<String> {
        self.cached.clone()
    }

    /// Replace the stored token. `None` clears the entry; the in-memory and
    /// persisted copies are identical when this returns.
    pub fn save(&mut self, token: Option<&str>) {
        self.cached = token.and_then(normalize);

        let Some(ref path) = self.path else { return };
        let result = match self.cached {
            Some(ref token) => fs::write(path, token),
            None => match fs::remove_file(path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to persist token, session will not survive restart");
        }
    }
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if ABSENT_SENTINELS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &std::path::Path) -> TokenStore {
        TokenStore::new(Some(dir.to_path_buf()))
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(dir.path());

        store.save(Some("tok-123"));
        assert_eq!(store.load().as_deref(), Some("tok-123"));

        // A fresh store over the same directory sees the persisted value
        let reopened = store_in(dir.path());
        assert_eq!(reopened.load().as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_save_none_clears_persisted_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(dir.path());

        store.save(Some("tok-123"));
        store.save(None);
        assert_eq!(store.load(), None);
        assert!(!dir.path().join(TOKEN_FILE).exists());

        // Clearing when nothing is stored is a no-op, not an error
        store.save(None);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_sentinel_values_mean_no_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        for sentinel in ["null", "undefined", "", "  \n"] {
            std::fs::write(dir.path().join(TOKEN_FILE), sentinel).expect("write");
            let store = store_in(dir.path());
            assert_eq!(store.load(), None, "sentinel {:?} must read as absent", sentinel);
        }
    }

    #[test]
    fn test_saving_a_sentinel_clears_instead() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = store_in(dir.path());
        store.save(Some("null"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_in_memory_store_does_not_persist() {
        let mut store = TokenStore::in_memory();
        store.save(Some("tok-123"));
        assert_eq!(store.load().as_deref(), Some("tok-123"));

        let fresh = TokenStore::in_memory();
        assert_eq!(fresh.load(), None);
    }
}
