//! Last score persistence
//!
//! The only value that outlives a page load is the most recent score. On the
//! web it lives in LocalStorage under `lastScore` as a decimal string; native
//! builds and tests keep it in memory.

use std::fmt;

/// LocalStorage key for the last score
pub const LAST_SCORE_KEY: &str = "lastScore";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No storage backend (private mode, sandboxed iframe, ...)
    Unavailable,
    /// The backend refused the write (quota, permissions)
    Rejected(String),
    /// The stored value is not a score
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Rejected(reason) => write!(f, "storage rejected write: {reason}"),
            Self::Corrupt(value) => write!(f, "stored score is not a number: {value:?}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Parse a stored score string
pub fn parse_score(raw: &str) -> Result<u64, StorageError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| StorageError::Corrupt(raw.to_string()))
}

/// Storage for the last score
pub trait ScoreStore {
    fn load_last_score(&self) -> Result<Option<u64>, StorageError>;
    fn save_last_score(&mut self, score: u64) -> Result<(), StorageError>;
}

/// In-memory store (native builds, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    raw: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a raw value, as if written by an older build
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }
}

impl ScoreStore for MemoryStore {
    fn load_last_score(&self) -> Result<Option<u64>, StorageError> {
        self.raw.as_deref().map(parse_score).transpose()
    }

    fn save_last_score(&mut self, score: u64) -> Result<(), StorageError> {
        self.raw = Some(score.to_string());
        Ok(())
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageStore {
    fn load_last_score(&self) -> Result<Option<u64>, StorageError> {
        let storage = Self::storage()?;
        let raw = storage
            .get_item(LAST_SCORE_KEY)
            .map_err(|_| StorageError::Unavailable)?;
        raw.as_deref().map(parse_score).transpose()
    }

    fn save_last_score(&mut self, score: u64) -> Result<(), StorageError> {
        let storage = Self::storage()?;
        storage
            .set_item(LAST_SCORE_KEY, &score.to_string())
            .map_err(|e| StorageError::Rejected(format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = MemoryStore::new();
        assert_eq!(store.load_last_score(), Ok(None));
    }

    #[test]
    fn test_save_overwrites() {
        let mut store = MemoryStore::new();
        store.save_last_score(12).unwrap();
        store.save_last_score(7).unwrap();
        assert_eq!(store.load_last_score(), Ok(Some(7)));
    }

    #[test]
    fn test_reads_legacy_string() {
        let store = MemoryStore::with_raw(" 42\n");
        assert_eq!(store.load_last_score(), Ok(Some(42)));
    }

    #[test]
    fn test_corrupt_value_is_reported() {
        let store = MemoryStore::with_raw("NaN");
        let err = store.load_last_score().unwrap_err();
        assert_eq!(err, StorageError::Corrupt("NaN".into()));
        assert!(err.to_string().contains("NaN"));
    }
}
