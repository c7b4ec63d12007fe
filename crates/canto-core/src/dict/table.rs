//! Key-value table abstraction backing both dictionaries.
//!
//! The on-disk container (CBDX) is magic + version + bincode records, so a
//! table can be snapshotted and reloaded without an embedded database.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::RwLock;

use super::DictError;

const MAGIC: &[u8; 4] = b"CBDX";
const VERSION: u8 = 1;

/// Per-key atomic string table. `update` must apply its closure atomically
/// with respect to other operations on the same key; dictionaries rely on
/// that instead of any cross-key locking.
pub trait KeyValueTable: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str);
    /// Returns `true` if the key existed.
    fn delete(&self, key: &str) -> bool;

    /// Atomic read-modify-write of one key. `f` receives the current value
    /// and returns the new one (`None` deletes the key).
    fn update(&self, key: &str, f: &mut dyn FnMut(Option<&str>) -> Option<String>) {
        let current = self.get(key);
        match f(current.as_deref()) {
            Some(value) => self.put(key, &value),
            None => {
                self.delete(key);
            }
        }
    }
}

pub struct MemoryTable {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Snapshot of all entries, sorted by key. For tooling.
    pub fn entries(&self) -> Vec<(String, String)> {
        let map = self.entries.read().unwrap();
        let mut all: Vec<(String, String)> =
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        all.sort();
        all
    }

    /// Serialize to the CBDX container.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let map = self.entries.read().unwrap();
        let mut records: Vec<(&String, &String)> = map.iter().collect();
        records.sort();
        let body = bincode::serialize(&records).map_err(DictError::Serialize)?;
        let mut buf = Vec::with_capacity(5 + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DictError> {
        if bytes.len() < 5 {
            return Err(DictError::InvalidHeader);
        }
        if &bytes[0..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        if bytes[4] != VERSION {
            return Err(DictError::UnsupportedVersion(bytes[4]));
        }
        let records: Vec<(String, String)> =
            bincode::deserialize(&bytes[5..]).map_err(DictError::Deserialize)?;
        Ok(Self::from_entries(records))
    }

    pub fn load(path: &Path) -> Result<Self, DictError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = self.to_bytes()?;
        // Write-then-rename so a crash never leaves a torn table.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path).map_err(io::Error::from)?;
        Ok(())
    }
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueTable for MemoryTable {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.write().unwrap().remove(key).is_some()
    }

    // Holds the write lock across the closure, so the read-modify-write is
    // atomic rather than best-effort like the default implementation.
    fn update(&self, key: &str, f: &mut dyn FnMut(Option<&str>) -> Option<String>) {
        let mut map = self.entries.write().unwrap();
        match f(map.get(key).map(String::as_str)) {
            Some(value) => {
                map.insert(key.to_string(), value);
            }
            None => {
                map.remove(key);
            }
        }
    }
}
