//! Merged candidate list.
//!
//! Drains the English and Rime candidate streams into one deduplicated,
//! ordered list. Population is lazy and resumable: cursors record how far
//! each source has been consumed, and at most one Rime page is requested
//! per population cycle so a single query never triggers a burst of
//! session paging calls.

use std::collections::HashSet;

use canto_core::unicode::{is_vowel, letters_only};

use crate::english::EnglishInputEngine;
use crate::rime::RimeInputEngine;
use crate::types::{CandidateEntry, CandidateSource};

#[derive(Default)]
pub(crate) struct MergedCandidates {
    entries: Vec<CandidateEntry>,
    seen: HashSet<String>,
    next_english_index: usize,
    next_rime_index: usize,
    perfect_english_drained: bool,
    all_best_rime_loaded: bool,
    demoted_drained: bool,
    /// English source indices equal to the raw typed text, held until the
    /// best Rime candidates are in.
    demoted_english: Vec<usize>,
    /// Consonant-only English source indices, held until the worst tier.
    held_back_english: Vec<usize>,
    first_rime_candidate_chars: Option<usize>,
}

impl MergedCandidates {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&CandidateEntry> {
        self.entries.get(index)
    }

    /// Repopulate until the list is non-empty or no further progress can be
    /// made. Each iteration may page in at most one batch from Rime.
    pub(crate) fn ensure_populated(
        &mut self,
        english: &EnglishInputEngine,
        rime: &mut RimeInputEngine,
        forcing_rime: bool,
        mixed_mode: bool,
    ) {
        while self.populate(english, rime, forcing_rime, mixed_mode) && self.entries.is_empty() {}
    }

    /// One population cycle. Returns `true` if it made progress (added
    /// entries or requested a Rime page), so callers know whether another
    /// cycle could yield more.
    pub(crate) fn populate(
        &mut self,
        english: &EnglishInputEngine,
        rime: &mut RimeInputEngine,
        forcing_rime: bool,
        mixed_mode: bool,
    ) -> bool {
        let english_active = mixed_mode && !forcing_rime;
        let count_before = self.entries.len();

        if english_active && english.is_word() && !self.perfect_english_drained {
            self.drain_perfect_english(english);
        }
        self.perfect_english_drained = true;

        if !self.all_best_rime_loaded {
            self.drain_best_rime(english, rime);
        }
        if !self.all_best_rime_loaded {
            if rime.has_loaded_all_candidates() {
                self.all_best_rime_loaded = true;
            } else {
                // Throttle: one page per cycle, finish on the next call.
                rime.load_more_candidates();
                return true;
            }
        }

        if english_active && !self.demoted_drained {
            for index in std::mem::take(&mut self.demoted_english) {
                self.push_english(english, index);
            }
        }
        self.demoted_drained = true;

        if english_active {
            self.drain_good_english(english);
        }

        while self.next_rime_index < rime.loaded_candidates_count() {
            self.push_rime(rime, self.next_rime_index);
            self.next_rime_index += 1;
        }

        if english_active && rime.has_loaded_all_candidates() {
            for index in std::mem::take(&mut self.held_back_english) {
                self.push_english(english, index);
            }
            while self.next_english_index < english.candidates().len() {
                self.push_english(english, self.next_english_index);
                self.next_english_index += 1;
            }
        }

        self.entries.len() != count_before
    }

    /// Tier 1: exact and auto-correct suggestions for a recognized word.
    /// Candidates spelled exactly like the raw input are demoted below the
    /// best Rime candidates so the Cantonese reading keeps the top slot.
    fn drain_perfect_english(&mut self, english: &EnglishInputEngine) {
        let typed_lower = english.composition().text.to_lowercase();
        let perfect_end = english.perfect_candidates_start_index();
        while self.next_english_index < perfect_end {
            let index = self.next_english_index;
            self.next_english_index += 1;
            let candidate = &english.candidates()[index];
            if candidate.to_lowercase() == typed_lower {
                self.demoted_english.push(index);
            } else {
                self.push_english(english, index);
            }
        }
    }

    /// Tier 2: Rime candidates whose letters-only annotation is empty or a
    /// prefix of the letters-only typed input. Candidates shorter than the
    /// first candidate also end the run; that keeps initial-consonant input
    /// like "nh" from flooding the top of the list with single characters.
    fn drain_best_rime(&mut self, english: &EnglishInputEngine, rime: &mut RimeInputEngine) {
        let typed_letters = letters_only(&english.composition().text);
        while self.next_rime_index < rime.loaded_candidates_count() {
            let index = self.next_rime_index;
            let candidate_chars = rime
                .get_candidate(index)
                .map_or(0, |c| c.chars().count());
            if index == 0 {
                self.first_rime_candidate_chars = Some(candidate_chars);
            }
            let code = rime.get_comment(index).map(letters_only).unwrap_or_default();
            let annotation_matches = code.is_empty() || typed_letters.starts_with(&code);
            let shorter_than_first = self
                .first_rime_candidate_chars
                .is_some_and(|first| first > candidate_chars);
            if !annotation_matches || shorter_than_first {
                self.all_best_rime_loaded = true;
                return;
            }
            self.push_rime(rime, index);
            self.next_rime_index += 1;
        }
    }

    /// Tier 4: remaining English candidates containing a vowel or a symbol.
    /// Pure-consonant runs are almost never intended English while a
    /// jyutping composition is active, so they wait for the worst tier.
    fn drain_good_english(&mut self, english: &EnglishInputEngine) {
        let worst_start = english.worst_candidates_start_index();
        while self.next_english_index < worst_start {
            let index = self.next_english_index;
            self.next_english_index += 1;
            let candidate = &english.candidates()[index];
            let keep = candidate
                .chars()
                .any(|c| is_vowel(c) || !c.is_alphanumeric());
            if keep {
                self.push_english(english, index);
            } else {
                self.held_back_english.push(index);
            }
        }
    }

    fn push_english(&mut self, english: &EnglishInputEngine, index: usize) {
        let Some(text) = english.candidates().get(index) else {
            return;
        };
        self.push(text.clone(), CandidateSource::English, index);
    }

    fn push_rime(&mut self, rime: &RimeInputEngine, index: usize) {
        let Some(text) = rime.get_candidate(index) else {
            return;
        };
        self.push(text.to_owned(), CandidateSource::Rime, index);
    }

    fn push(&mut self, text: String, source: CandidateSource, source_index: usize) {
        if !self.seen.insert(text.clone()) {
            return;
        }
        self.entries.push(CandidateEntry {
            text,
            source,
            source_index,
        });
    }
}
