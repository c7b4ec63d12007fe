//! English dictionary storage.
//!
//! Word lists live in a key-value table keyed by lowercased word. Two
//! dictionaries implement the lookup interface: a read-only default
//! dictionary (per locale, background-warmed at startup) and a mutable
//! user dictionary that learns committed words with a frequency threshold.
//! `DictionaryProvider` owns both and is the single injection point for
//! engines, re-pointed on locale change instead of mutating global state.

mod default_dict;
mod table;
mod user_dict;

pub use default_dict::DefaultDictionary;
pub use table::{KeyValueTable, MemoryTable};
pub use user_dict::UserDictionary;

use std::io;
use std::sync::{Arc, RwLock};

/// Unified error type for dictionary file I/O (the CBDX container).
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected CBDX)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),
}

pub trait Dictionary: Send + Sync {
    /// Case variants stored under `word_lowercased`. Empty if unknown.
    fn get_words(&self, word_lowercased: &str) -> Vec<String>;
}

/// Owns the default and user dictionaries consulted by the English engine.
pub struct DictionaryProvider {
    default_dict: RwLock<Arc<DefaultDictionary>>,
    user_dict: Arc<UserDictionary>,
}

impl DictionaryProvider {
    pub fn new(default_dict: Arc<DefaultDictionary>, user_dict: Arc<UserDictionary>) -> Self {
        Self {
            default_dict: RwLock::new(default_dict),
            user_dict,
        }
    }

    /// Swap in a different default dictionary (locale change).
    pub fn set_default_dictionary(&self, dict: Arc<DefaultDictionary>) {
        *self.default_dict.write().unwrap() = dict;
    }

    /// Default-dictionary matches followed by user-dictionary matches.
    pub fn get_words(&self, word_lowercased: &str) -> Vec<String> {
        let mut words = self
            .default_dict
            .read()
            .unwrap()
            .get_words(word_lowercased);
        words.extend(self.user_dict.get_words(word_lowercased));
        words
    }

    pub fn user(&self) -> &Arc<UserDictionary> {
        &self.user_dict
    }
}
