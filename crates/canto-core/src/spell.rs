//! Spell/completion oracle interface.
//!
//! The platform spell checker is an opaque collaborator: given a word range
//! inside a larger context string and a language tag, it reports whether the
//! word is misspelled and supplies ranked corrections and completions. The
//! engine only consumes this trait; it never reimplements the checker.

use std::ops::Range;

pub trait SpellChecker: Send + Sync {
    /// Whether the word at `word_range` (byte range within `context`) is
    /// misspelled for the given language.
    fn is_misspelled(&self, context: &str, word_range: Range<usize>, language: &str) -> bool;

    /// Ranked spelling-correction guesses for the word at `word_range`.
    fn guesses(&self, context: &str, word_range: Range<usize>, language: &str) -> Vec<String>;

    /// Ranked autocomplete continuations of the partial word at `word_range`.
    fn completions(&self, context: &str, word_range: Range<usize>, language: &str) -> Vec<String>;
}

/// Oracle that knows no words. Lets the engine run without a platform
/// checker: every input is treated as misspelled with no suggestions, so
/// only dictionary-backed candidates surface.
pub struct NoopSpellChecker;

impl SpellChecker for NoopSpellChecker {
    fn is_misspelled(&self, _context: &str, _word_range: Range<usize>, _language: &str) -> bool {
        true
    }

    fn guesses(&self, _context: &str, _word_range: Range<usize>, _language: &str) -> Vec<String> {
        Vec::new()
    }

    fn completions(
        &self,
        _context: &str,
        _word_range: Range<usize>,
        _language: &str,
    ) -> Vec<String> {
        Vec::new()
    }
}
