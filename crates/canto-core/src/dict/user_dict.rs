//! User dictionary with runtime word learning.
//!
//! Each key (lowercased word) stores `"<frequency>,<comma-joined case
//! variants>"`. Words learned fewer than three times are suppressed on
//! recall so a one-off typo never becomes a suggestion.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::table::{KeyValueTable, MemoryTable};
use super::{DictError, Dictionary};

/// Minimum learn count before a word is recalled.
const MIN_LEARN_COUNT: i64 = 3;
/// Words this short are never learned.
const MIN_WORD_LENGTH: usize = 3;

pub struct UserDictionary {
    table: Arc<dyn KeyValueTable>,
}

impl UserDictionary {
    pub fn new(table: Arc<dyn KeyValueTable>) -> Self {
        Self { table }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTable::new()))
    }

    pub fn open(path: &Path) -> Result<Self, DictError> {
        Ok(Self::new(Arc::new(MemoryTable::load(path)?)))
    }

    /// Record one use of `word`, merging its exact casing into the stored
    /// variant set. Words shorter than three characters are ignored.
    pub fn learn_word(&self, word: &str) {
        if word.chars().count() < MIN_WORD_LENGTH {
            return;
        }
        let key = word.to_lowercase();
        self.table.update(&key, &mut |row| {
            let (freq, mut variants) = parse_row(row);
            if !variants.iter().any(|v| v == word) {
                variants.push(word.to_string());
            }
            Some(format!("{},{}", freq + 1, variants.join(",")))
        });
        debug!(word, "learned word");
    }

    /// Forget `word` entirely. Returns `true` if it was known.
    pub fn unlearn_word(&self, word: &str) -> bool {
        let removed = self.table.delete(&word.to_lowercase());
        if removed {
            debug!(word, "unlearned word");
        }
        removed
    }

    /// Learn count of `word`, ignoring the recall threshold. For
    /// maintenance tooling.
    pub fn entry_frequency(&self, word: &str) -> i64 {
        self.table
            .get(&word.to_lowercase())
            .map(|row| parse_row(Some(&row)).0)
            .unwrap_or(0)
    }
}

impl Dictionary for UserDictionary {
    fn get_words(&self, word_lowercased: &str) -> Vec<String> {
        let Some(row) = self.table.get(word_lowercased) else {
            return Vec::new();
        };
        let (freq, variants) = parse_row(Some(&row));
        if freq < MIN_LEARN_COUNT {
            return Vec::new();
        }
        variants
    }
}

fn parse_row(row: Option<&str>) -> (i64, Vec<String>) {
    let Some(row) = row else {
        return (0, Vec::new());
    };
    let mut parts = row.split(',');
    let freq = parts
        .next()
        .and_then(|f| f.parse::<i64>().ok())
        .unwrap_or(0);
    (freq, parts.map(str::to_string).collect())
}
