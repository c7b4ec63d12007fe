//! Built-in per-locale word list, background-warmed at startup.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;

use tracing::{debug, error};

use super::table::{KeyValueTable, MemoryTable};
use super::{DictError, Dictionary};

/// Read-only word list keyed by lowercased word, values comma-joined case
/// variants. Lookups before the warm-up thread finishes return empty; that
/// cold-start race is expected behavior, not an error.
pub struct DefaultDictionary {
    table: RwLock<MemoryTable>,
    ready: AtomicBool,
}

impl DefaultDictionary {
    /// Empty dictionary (nothing is ever a word). Used when no data file is
    /// configured and by tests.
    pub fn empty() -> Self {
        Self {
            table: RwLock::new(MemoryTable::new()),
            ready: AtomicBool::new(true),
        }
    }

    pub fn from_table(table: MemoryTable) -> Self {
        Self {
            table: RwLock::new(table),
            ready: AtomicBool::new(true),
        }
    }

    /// Synchronous load. A missing or corrupt data file is a hard error:
    /// startup callers treat it as fatal since the keyboard cannot spell
    /// without its bundled word list.
    pub fn load(path: &Path) -> Result<Self, DictError> {
        Ok(Self::from_table(MemoryTable::load(path)?))
    }

    /// Fire-and-forget warm-up: returns immediately with an empty, not-ready
    /// dictionary and fills it on a background thread. No consumer blocks on
    /// completion; consumers that race ahead get empty candidate lists.
    pub fn preload(path: PathBuf) -> Arc<Self> {
        let dict = Arc::new(Self {
            table: RwLock::new(MemoryTable::new()),
            ready: AtomicBool::new(false),
        });
        let warm = Arc::downgrade(&dict);
        let spawned = thread::Builder::new()
            .name("canto-dict-warmup".into())
            .spawn(move || match MemoryTable::load(&path) {
                Ok(table) => {
                    let Some(dict) = warm.upgrade() else { return };
                    debug!(entries = table.len(), ?path, "default dictionary warmed");
                    *dict.table.write().unwrap() = table;
                    dict.ready.store(true, Ordering::Release);
                }
                Err(e) => {
                    error!(?path, error = %e, "default dictionary warm-up failed");
                }
            });
        if let Err(e) = spawned {
            error!(error = %e, "failed to spawn dictionary warm-up thread");
        }
        dict
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl Dictionary for DefaultDictionary {
    fn get_words(&self, word_lowercased: &str) -> Vec<String> {
        if !self.is_ready() {
            return Vec::new();
        }
        self.table
            .read()
            .unwrap()
            .get(word_lowercased)
            .map(|row| row.split(',').map(str::to_string).collect())
            .unwrap_or_default()
    }
}
