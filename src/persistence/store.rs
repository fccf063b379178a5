//! Key-value stores for persisted snapshots

use crate::core::error::Result;
use ahash::AHashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub trait SnapshotStore {
    /// Stored text under `key`, `None` if nothing was saved
    fn load(&self, key: &str) -> Result<Option<String>>;

    fn save(&mut self, key: &str, contents: &str) -> Result<()>;
}

impl<T: SnapshotStore> SnapshotStore for Arc<Mutex<T>> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        self.lock().unwrap_or_else(|e| e.into_inner()).load(key)
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<()> {
        self.lock().unwrap_or_else(|e| e.into_inner()).save(key, contents)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: AHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<()> {
        self.entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.file_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn save(&mut self, key: &str, contents: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.file_for(key);
        // Rename over the old file so readers never see a partial record
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}
