//! The bilingual engine: one keystroke stream, two sub-engines, one answer.

use std::sync::Arc;
use std::thread;

use tracing::{debug, debug_span, warn};

use canto_core::dict::DictionaryProvider;
use canto_core::schema::RimeSchema;
use canto_core::settings::{CharForm, Settings};
use canto_core::spell::SpellChecker;
use canto_core::unicode::{case_morph, is_rime_special_char};

use crate::candidates::MergedCandidates;
use crate::english::EnglishInputEngine;
use crate::rime::{RimeInputEngine, SessionProvider};
use crate::types::{CandidateSource, Composition, TextDocumentProxy};

pub struct BilingualEngine {
    english: EnglishInputEngine,
    rime: RimeInputEngine,
    proxy: Arc<dyn TextDocumentProxy>,
    dicts: Arc<DictionaryProvider>,
    settings: Settings,
    candidates: MergedCandidates,
    /// Set when a partial Rime selection or a reserved delimiter makes the
    /// English reading of the buffer meaningless.
    forcing_rime_mode: bool,
}

impl BilingualEngine {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        dicts: Arc<DictionaryProvider>,
        spell: Arc<dyn SpellChecker>,
        proxy: Arc<dyn TextDocumentProxy>,
        settings: Settings,
    ) -> Self {
        let english = EnglishInputEngine::new(
            Arc::clone(&dicts),
            spell,
            settings.english_locale.clone(),
        );
        let rime = RimeInputEngine::new(
            provider,
            settings.rime_schema,
            settings.tone_input_mode,
            settings.char_form,
        );
        Self {
            english,
            rime,
            proxy,
            dicts,
            settings,
            candidates: MergedCandidates::new(),
            forcing_rime_mode: false,
        }
    }

    /// Warm up the Rime session ahead of the first keystroke.
    pub fn prepare(&self) {
        self.rime.prepare();
    }

    pub fn is_composing(&self) -> bool {
        self.composition().is_some()
    }

    /// Dispatch one character to both sub-engines. The two updates have no
    /// data dependency, so they run on separate threads and join before the
    /// merged state is touched.
    pub fn process_char(&mut self, ch: char) -> bool {
        if !ch.is_ascii() {
            return false;
        }
        let _span = debug_span!("process_char", %ch).entered();
        self.english.set_context(self.proxy.text_before_input());
        if is_rime_special_char(ch, self.settings.tone_input_mode) {
            self.forcing_rime_mode = true;
        }

        let english = &mut self.english;
        let rime = &mut self.rime;
        let (english_changed, rime_changed) = thread::scope(|scope| {
            let rime_task = scope.spawn(move || rime.process_char(ch));
            let english_changed = english.process_char(ch);
            (english_changed, rime_task.join().unwrap_or(false))
        });

        self.candidates.reset();
        english_changed || rime_changed
    }

    /// Backspace is delimiter-aware: the character Rime is about to delete
    /// decides whether the English buffer sees the backspace at all, and a
    /// Rime no-op must not desynchronize the two buffers.
    pub fn process_backspace(&mut self) -> bool {
        let Some(raw_before) = self.rime.raw_input() else {
            // No Rime input to mirror: with no session attached, an
            // English-only composition takes the backspace; an idle engine
            // touches the document.
            if !self.rime.is_session_attached() && !self.english.composition().text.is_empty() {
                let changed = self.english.process_backspace();
                self.candidates.reset();
                return changed;
            }
            self.proxy.delete_backward();
            return false;
        };
        if raw_before.caret_index == 0 {
            return false;
        }
        let deleted = raw_before.text.chars().nth(raw_before.caret_index - 1);
        let Some(deleted) = deleted else {
            warn!(
                caret = raw_before.caret_index,
                "raw input caret out of range"
            );
            return false;
        };

        let rime_changed = self.rime.process_backspace();
        let caret_after = self.rime.raw_input().map_or(0, |c| c.caret_index);
        let rime_caret_moved = caret_after < raw_before.caret_index;

        let english_changed = if !is_rime_special_char(deleted, self.settings.tone_input_mode)
            && rime_caret_moved
        {
            self.english.process_backspace()
        } else {
            false
        };

        self.recompute_forcing_rime_mode();
        self.candidates.reset();
        rime_changed || english_changed
    }

    pub fn move_caret(&mut self, offset: isize) -> bool {
        if self.is_composing() {
            let moved = self.rime.move_caret(offset);
            if moved {
                self.sync_english_caret_from_rime();
                self.candidates.reset();
            }
            moved
        } else {
            self.proxy.adjust_text_position(offset);
            false
        }
    }

    pub fn clear_input(&mut self) {
        self.rime.clear_input();
        self.english.clear_input();
        self.forcing_rime_mode = false;
        self.candidates.reset();
    }

    /// The single user-facing composition. English verbatim when it reads
    /// as a recognized word, otherwise the Rime text case-morphed against
    /// the English shift-state template.
    pub fn composition(&self) -> Option<Composition> {
        let english = self.english.composition();
        if !self.forcing_rime_mode
            && self.english.is_word()
            && self.mixed_mode_active()
            && !english.text.is_empty()
        {
            return Some(english);
        }
        let Some(rime) = self.rime.composition() else {
            // No session attached yet: the English buffer is the whole
            // composition.
            if self.rime.is_session_attached() || english.text.is_empty() {
                return None;
            }
            return Some(english);
        };
        if english.text.is_empty() {
            return Some(rime);
        }
        let morphed = case_morph(&rime.text, &english.text);
        Some(Composition::new(morphed, rime.caret_index))
    }

    /// Whether Rime's top candidate spells out the entire input. Frontends
    /// use this to decide between inserting the composition verbatim and
    /// committing the candidate on a word-ending keystroke.
    pub fn is_rime_first_candidate_complete_match(&self) -> bool {
        self.rime.is_first_candidate_complete_match()
    }

    pub fn candidate_count(&mut self) -> usize {
        self.ensure_candidates();
        self.candidates.len()
    }

    pub fn get_candidate(&mut self, index: usize) -> Option<String> {
        self.ensure_candidates();
        self.candidates.get(index).map(|e| e.text.clone())
    }

    pub fn get_candidate_source(&mut self, index: usize) -> Option<CandidateSource> {
        self.ensure_candidates();
        self.candidates.get(index).map(|e| e.source)
    }

    /// Commit a merged candidate. Returns the committed text, or `None`
    /// when the selection only consumed part of the composition (this
    /// engages forced-Rime-mode for the remainder).
    pub fn select_candidate(&mut self, index: usize) -> Option<String> {
        self.ensure_candidates();
        let Some(entry) = self.candidates.get(index) else {
            warn!(index, count = self.candidates.len(), "bad candidate index");
            return None;
        };
        let (source, source_index) = (entry.source, entry.source_index);

        let committed = match source {
            CandidateSource::English => {
                let committed = self.english.select_candidate(source_index);
                if let Some(word) = &committed {
                    self.dicts.user().learn_word(word);
                    self.rime.clear_input();
                    self.english.clear_input();
                    self.forcing_rime_mode = false;
                } else {
                    self.rime.clear_input();
                }
                committed
            }
            CandidateSource::Rime => {
                let committed = self.rime.select_candidate(source_index);
                if committed.is_some() {
                    self.english.clear_input();
                    self.forcing_rime_mode = false;
                } else {
                    debug!("partial selection, staying in rime mode");
                    self.forcing_rime_mode = true;
                    self.sync_english_caret_from_rime();
                }
                committed
            }
        };

        self.candidates.reset();
        committed
    }

    pub fn unlearn_candidate(&mut self, index: usize) -> bool {
        self.ensure_candidates();
        let Some(entry) = self.candidates.get(index) else {
            return false;
        };
        let (source, source_index) = (entry.source, entry.source_index);
        let unlearned = match source {
            CandidateSource::English => self
                .english
                .select_candidate(source_index)
                .is_some_and(|word| self.dicts.user().unlearn_word(&word)),
            CandidateSource::Rime => self.rime.unlearn_candidate(source_index),
        };
        if unlearned {
            self.candidates.reset();
        }
        unlearned
    }

    pub fn load_more_candidates(&mut self) -> bool {
        let rime_loaded = self.rime.load_more_candidates();
        let english_loaded = self.english.load_more_candidates();
        if rime_loaded || english_loaded {
            self.populate_candidates();
            return true;
        }
        false
    }

    pub fn set_schema(&mut self, schema: RimeSchema) {
        self.settings.rime_schema = schema;
        self.rime.set_schema(schema);
        self.candidates.reset();
    }

    pub fn set_char_form(&mut self, char_form: CharForm) {
        self.settings.char_form = char_form;
        self.refresh_chinese_script();
    }

    pub fn refresh_chinese_script(&mut self) {
        self.rime.set_char_form(self.settings.char_form);
        self.candidates.reset();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn mixed_mode_active(&self) -> bool {
        self.settings.mixed_mode_enabled && self.settings.rime_schema.supports_mixed_mode()
    }

    fn ensure_candidates(&mut self) {
        if self.candidates.len() > 0 {
            return;
        }
        self.populate_candidates();
    }

    fn populate_candidates(&mut self) {
        if self.rime.raw_input().is_none() && self.english.composition().text.is_empty() {
            return;
        }
        let _span = debug_span!("populate_candidates", forcing = self.forcing_rime_mode).entered();
        let mixed_mode = self.mixed_mode_active();
        self.candidates.ensure_populated(
            &self.english,
            &mut self.rime,
            self.forcing_rime_mode,
            mixed_mode,
        );
    }

    /// English caret follows Rime: strip reserved and space characters from
    /// the raw input before the Rime caret and count what remains.
    fn sync_english_caret_from_rime(&mut self) {
        let Some(raw) = self.rime.raw_input() else {
            return;
        };
        let tone_mode = self.settings.tone_input_mode;
        let english_caret = raw
            .text
            .chars()
            .take(raw.caret_index)
            .filter(|&c| c != ' ' && !is_rime_special_char(c, tone_mode))
            .count();
        self.english.set_caret(english_caret);
    }

    fn recompute_forcing_rime_mode(&mut self) {
        // A partial selection keeps forcing until the composition clears.
        if self.rime.user_selected_text_length() > 0 {
            self.forcing_rime_mode = true;
            return;
        }
        let tone_mode = self.settings.tone_input_mode;
        self.forcing_rime_mode = self
            .rime
            .composition()
            .map(|composition| {
                composition
                    .text
                    .chars()
                    .any(|c| is_rime_special_char(c, tone_mode))
            })
            .unwrap_or(false);
    }
}
