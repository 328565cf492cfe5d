//! Client-local persistence of the last edited code, language and theme.
//!
//! Keys are fixed so that every front end reading the same store agrees on
//! where a preference lives. A missing key means "no preference". Write
//! failures are logged and otherwise ignored; losing a preference must never
//! interrupt a run.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::StorageError;

pub const CODE_KEY: &str = "code-editor-content";
pub const LANGUAGE_KEY: &str = "code-editor-language";
pub const THEME_KEY: &str = "code-editor-theme";

pub type StorageResult<T> = Result<T, StorageError>;

/// Minimal key/value surface, the same one browser local storage offers.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// JSON object on disk. Every write rewrites the whole file through a
/// temporary sibling and a rename, so a crash never leaves half a file.
///
/// Concurrent writers are not coordinated: the last write wins.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// The file does not need to exist; it is created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        tmp
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let file = File::open(&self.path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| StorageError::Corruption(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, entries)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), entries = entries.len(), "Preferences saved");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> StorageResult<()> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StorageError::Corruption(reason)) => {
                warn!(%reason, "Discarding unreadable preferences file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        apply(&mut entries);
        self.save(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// Typed view over a store. Reads that fail are treated as missing and
/// writes that fail are logged, matching how a browser treats a full or
/// disabled local storage.
pub struct Preferences {
    store: Box<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn code(&self) -> Option<String> {
        self.read(CODE_KEY)
    }

    pub fn save_code(&self, code: &str) {
        self.write(CODE_KEY, code);
    }

    pub fn clear_code(&self) {
        if let Err(e) = self.store.remove(CODE_KEY) {
            warn!(key = CODE_KEY, error = %e, "Could not clear saved code");
        }
    }

    pub fn language(&self) -> Option<String> {
        self.read(LANGUAGE_KEY)
    }

    pub fn save_language(&self, language: &str) {
        self.write(LANGUAGE_KEY, language);
    }

    pub fn theme(&self) -> Option<String> {
        self.read(THEME_KEY)
    }

    pub fn save_theme(&self, theme: &str) {
        self.write(THEME_KEY, theme);
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Could not load preference");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "Could not save preference");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_keys_are_stable() {
        assert_eq!(CODE_KEY, "code-editor-content");
        assert_eq!(LANGUAGE_KEY, "code-editor-language");
        assert_eq!(THEME_KEY, "code-editor-theme");
    }

    #[test]
    fn test_memory_store_basic_operations() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("state.json");

        let store = FileStore::new(&path);
        store.set(LANGUAGE_KEY, "rust").unwrap();
        store.set(CODE_KEY, "fn main() {}").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(LANGUAGE_KEY).unwrap().as_deref(), Some("rust"));
        assert_eq!(reopened.get(CODE_KEY).unwrap().as_deref(), Some("fn main() {}"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("absent.json"));
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_no_preference() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get(THEME_KEY), Err(StorageError::Corruption(_))));

        let prefs = Preferences::new(FileStore::new(&path));
        assert_eq!(prefs.theme(), None);

        prefs.save_theme("dark-theme");
        assert_eq!(prefs.theme().as_deref(), Some("dark-theme"));
    }

    #[test]
    fn test_preferences_round_trip() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.code(), None);

        prefs.save_code("print(1)");
        prefs.save_language("python");
        prefs.save_theme("light-theme");
        assert_eq!(prefs.code().as_deref(), Some("print(1)"));
        assert_eq!(prefs.language().as_deref(), Some("python"));
        assert_eq!(prefs.theme().as_deref(), Some("light-theme"));

        prefs.clear_code();
        assert_eq!(prefs.code(), None);
    }
}
