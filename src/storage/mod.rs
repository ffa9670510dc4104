//! Persisted key-value storage.
//!
//! Settings, statistics and the vocabulary notebook are each stored wholesale
//! as a JSON blob under a fixed key. There are no partial or cross-key
//! transactional updates.
//!
//! - [`KeyValueStore`]: the injected storage dependency
//! - [`FileStore`]: one `<key>.json` file per key, written atomically
//! - [`MemoryStore`]: in-process store for tests and ephemeral sessions
//! - [`Slot`]: typed `load()` / `save()` access to one key

pub mod file_store;
pub mod memory;

pub use file_store::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// Key for [`GlobalSettings`](crate::models::GlobalSettings)
pub const SETTINGS_KEY: &str = "settings";

/// Key for [`LearningStats`](crate::models::LearningStats)
pub const STATS_KEY: &str = "stats";

/// Key for the vocabulary list
pub const VOCABULARY_KEY: &str = "vocabulary";

/// Errors that can occur while reading or writing blobs
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored value for {key} is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed blob storage.
///
/// Implementations must make `set` atomic per key: a reader sees either the
/// previous blob or the new one, never a partial write.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed view of a single key in a [`KeyValueStore`]
pub struct Slot<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            _value: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Slot<T> {
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Read and deserialize the stored value; `Ok(None)` when nothing is stored
    pub fn load(&self) -> Result<Option<T>, StorageError> {
        let Some(blob) = self.store.get(self.key)? else {
            return Ok(None);
        };
        serde_json::from_str(&blob)
            .map(Some)
            .map_err(|source| StorageError::Malformed {
                key: self.key.to_string(),
                source,
            })
    }

    /// Load the stored value, falling back to `T::default()` on absence or error.
    ///
    /// Errors are logged and swallowed; the caller keeps working in memory.
    pub fn load_or_default(&self) -> T
    where
        T: Default,
    {
        match self.load() {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::debug!("No stored value for {}, using defaults", self.key);
                T::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}; using defaults", self.key, e);
                T::default()
            }
        }
    }

    pub fn save(&self, value: &T) -> Result<(), StorageError> {
        let blob = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: self.key.to_string(),
            source,
        })?;
        self.store.set(self.key, &blob)
    }

    /// Save, logging instead of returning a failure
    pub fn save_or_warn(&self, value: &T) -> bool {
        match self.save(value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist {}: {}; changes are not durable", self.key, e);
                false
            }
        }
    }
}
