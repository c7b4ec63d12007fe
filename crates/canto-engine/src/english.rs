//! English autocomplete/autocorrect engine.
//!
//! Wraps an [`InputTextBuffer`] and recomputes the full candidate list from
//! scratch on every accepted character or backspace, combining dictionary
//! lookups with the platform spell oracle under a strict ranking policy.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use canto_core::dict::DictionaryProvider;
use canto_core::spell::SpellChecker;
use canto_core::unicode::{is_english_letter, letters_only};

use crate::text_buffer::InputTextBuffer;
use crate::types::Composition;

/// Words this long stop being treated as words at all.
const MAX_WORD_LENGTH: usize = 25;

pub struct EnglishInputEngine {
    buffer: InputTextBuffer,
    dicts: Arc<DictionaryProvider>,
    spell: Arc<dyn SpellChecker>,
    language: String,
    text_before_input: Option<String>,

    candidates: Vec<String>,
    /// Candidates below this index are exact/promoted matches.
    perfect_start: usize,
    /// Candidates from this index on are the low-confidence tail.
    worst_start: usize,
    is_word: bool,
    first_load: bool,
}

impl EnglishInputEngine {
    pub fn new(
        dicts: Arc<DictionaryProvider>,
        spell: Arc<dyn SpellChecker>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            buffer: InputTextBuffer::new(),
            dicts,
            spell,
            language: language.into(),
            text_before_input: None,
            candidates: Vec::new(),
            perfect_start: 0,
            worst_start: 0,
            is_word: false,
            first_load: false,
        }
    }

    /// Document context preceding the insertion point, fed by the caller
    /// before each keystroke. Drives autocomplete and oracle context.
    pub fn set_context(&mut self, text_before_input: Option<String>) {
        self.text_before_input = text_before_input;
    }

    /// Only ASCII characters belong to the English buffer; anything else is
    /// rejected without a state change.
    pub fn process_char(&mut self, ch: char) -> bool {
        if !ch.is_ascii() {
            return false;
        }
        self.buffer.insert(ch);
        self.update_candidates();
        true
    }

    pub fn process_backspace(&mut self) -> bool {
        if !self.buffer.backspace() {
            return false;
        }
        self.update_candidates();
        true
    }

    pub fn move_caret(&mut self, offset: isize) -> bool {
        self.buffer.move_caret(offset)
    }

    pub fn set_caret(&mut self, position: usize) -> bool {
        self.buffer.set_caret(position)
    }

    pub fn clear_input(&mut self) {
        self.buffer.clear();
        self.update_candidates();
    }

    pub fn composition(&self) -> Composition {
        Composition::new(self.buffer.text().to_string(), self.buffer.caret_position())
    }

    pub fn is_word(&self) -> bool {
        self.is_word
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn perfect_candidates_start_index(&self) -> usize {
        self.perfect_start
    }

    pub fn worst_candidates_start_index(&self) -> usize {
        self.worst_start
    }

    /// Returns the candidate text without touching the buffer; committing
    /// and clearing are the caller's responsibility.
    pub fn select_candidate(&self, index: usize) -> Option<String> {
        let candidate = self.candidates.get(index).cloned();
        if candidate.is_none() {
            warn!(index, count = self.candidates.len(), "bad candidate index");
        }
        candidate
    }

    /// The full list is computed in one pass, so this reports true exactly
    /// once after each recompute.
    pub fn load_more_candidates(&mut self) -> bool {
        std::mem::take(&mut self.first_load)
    }

    fn update_candidates(&mut self) {
        self.candidates.clear();
        self.perfect_start = 0;
        self.worst_start = 0;
        self.is_word = false;
        self.first_load = true;

        let text = self.buffer.text().to_string();
        if text.is_empty() {
            return;
        }
        if text.chars().count() >= MAX_WORD_LENGTH {
            // Not a word; show the raw text back.
            self.candidates.push(text);
            self.worst_start = 1;
            return;
        }

        let before = self.text_before_input.clone().unwrap_or_default();
        let combined = format!("{before}{text}");
        let word_range = before.len()..combined.len();

        let oracle_knows = !self
            .spell
            .is_misspelled(&combined, word_range.clone(), &self.language);
        let corrections = self
            .spell
            .guesses(&combined, word_range.clone(), &self.language);
        // Autocomplete only while continuing after an English word.
        let completions = if before.chars().last().is_some_and(is_english_letter) {
            self.spell.completions(&combined, word_range, &self.language)
        } else {
            Vec::new()
        };

        let dict_words: Vec<String> = self
            .dicts
            .get_words(&text.to_lowercase())
            .into_iter()
            .filter(|w| w.chars().count() > 1)
            .collect();
        let dict_is_word = !dict_words.is_empty();
        let all_uppercase =
            text.chars().count() > 1 && text.chars().all(|c| c.is_ascii_uppercase());
        self.is_word = dict_is_word || all_uppercase;

        let starts_uppercase = text.chars().next().is_some_and(|c| c.is_ascii_uppercase());

        let mut front: Vec<String> = Vec::new();
        let mut main: Vec<String> = Vec::new();
        let mut worst: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        // All-caps input is shown verbatim, ahead of everything else.
        if all_uppercase && seen.insert(text.clone()) {
            front.push(text.clone());
        }
        // Promotions never displace the verbatim all-caps slot.
        let promote_at = front.len();

        if text == "i" && seen.insert("I".to_string()) {
            front.push("I".to_string());
        }

        for word in &dict_words {
            let adapted = case_adapt(word, starts_uppercase);
            if !seen.insert(adapted.clone()) {
                continue;
            }
            if adapted == text {
                front.insert(promote_at, adapted);
            } else {
                main.push(adapted);
            }
        }

        // The raw input, when the oracle recognizes it but no dictionary
        // slot surfaced it: keep it, demoted to the tail unless
        // dictionary-backed.
        if oracle_knows && seen.insert(text.clone()) {
            if dict_is_word {
                main.push(text.clone());
            } else {
                worst.push(text.clone());
            }
        }

        let typed_letters = letters_only(&text);
        for suggestion in corrections.iter().chain(completions.iter()) {
            if *suggestion == text {
                continue;
            }
            // Only word-for-word corrections belong in the main list.
            if suggestion.contains(' ') || suggestion.contains('-') {
                if seen.insert(suggestion.clone()) {
                    worst.push(suggestion.clone());
                }
                continue;
            }
            // Suffix contractions ("can't", "let's") match the raw input by
            // their letters alone; they are what the user meant to type.
            if !typed_letters.is_empty() && letters_only(suggestion) == typed_letters {
                if seen.insert(suggestion.clone()) {
                    front.insert(promote_at, suggestion.clone());
                    self.is_word = true;
                }
                continue;
            }
            let adapted = case_adapt(suggestion, starts_uppercase);
            if !seen.insert(adapted.clone()) {
                continue;
            }
            if self.dicts.get_words(&adapted.to_lowercase()).is_empty() {
                worst.push(adapted);
            } else {
                main.push(adapted);
            }
        }

        self.perfect_start = front.len();
        self.worst_start = front.len() + main.len();
        self.candidates = front;
        self.candidates.append(&mut main);
        self.candidates.append(&mut worst);
    }
}

/// Match the input's capitalization pattern: capitalize an all-lowercase
/// suggestion when the input starts uppercase.
fn case_adapt(word: &str, input_starts_uppercase: bool) -> String {
    if input_starts_uppercase && !word.chars().any(|c| c.is_uppercase()) {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        word.to_string()
    }
}
