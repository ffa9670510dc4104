use super::{KeyValueStore, StorageError};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;

/// Directory-backed key-value store.
///
/// Each key maps to `<dir>/<key>.json`. Writes go to a temporary sibling file
/// that is renamed over the target, so a crash mid-write leaves the previous
/// blob intact.
#[derive(Debug)]
pub struct FileStore {
    dir: Utf8PathBuf,
    key_pattern: Regex,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn new<P: AsRef<Utf8Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create data directory: {}", dir))?;
        }

        Ok(Self {
            dir,
            key_pattern: Regex::new(r"^[A-Za-z0-9_.-]+$").context("Invalid key pattern")?,
        })
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<Utf8PathBuf, StorageError> {
        if !self.key_pattern.is_match(key) || key.starts_with('.') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));

        fs::write(&tmp_path, value).map_err(io_error(key))?;
        fs::rename(&tmp_path, &path).map_err(io_error(key))?;

        tracing::debug!("Stored {} ({} bytes) at {}", key, value.len(), path);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let store = FileStore::new(dir.join("data")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_creates_directory() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.dir().exists());
    }

    #[test]
    fn test_get_missing_key() {
        let (store, _temp_dir) = create_test_store();
        assert_eq!(store.get("settings").unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let (store, _temp_dir) = create_test_store();

        store.set("stats", r#"{"totalAttempts":1}"#).unwrap();
        assert_eq!(store.get("stats").unwrap().as_deref(), Some(r#"{"totalAttempts":1}"#));
        assert!(store.dir().join("stats.json").exists());
        assert!(!store.dir().join(".stats.json.tmp").exists());

        store.set("stats", "{}").unwrap();
        assert_eq!(store.get("stats").unwrap().as_deref(), Some("{}"));

        store.remove("stats").unwrap();
        assert_eq!(store.get("stats").unwrap(), None);
        store.remove("stats").unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let (store, _temp_dir) = create_test_store();
        assert!(matches!(store.set("../escape", "x"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(store.get("a/b"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(store.get(".hidden"), Err(StorageError::InvalidKey(_))));
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
    }
}
