mod proptest_fsm;

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use canto_core::dict::{DefaultDictionary, DictionaryProvider, MemoryTable, UserDictionary};
use canto_core::settings::Settings;
use canto_core::spell::SpellChecker;

use super::rime::{key, DeployState, RimeSession, SessionProvider};
use super::types::TextDocumentProxy;
use super::BilingualEngine;

// ---------------------------------------------------------------------------
// Shared builders
// ---------------------------------------------------------------------------

/// Dictionary provider over `(lowercase_word, comma_joined_variants)` rows.
pub(super) fn make_dicts(words: &[(&str, &str)]) -> Arc<DictionaryProvider> {
    let table = MemoryTable::from_entries(
        words
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    Arc::new(DictionaryProvider::new(
        Arc::new(DefaultDictionary::from_table(table)),
        Arc::new(UserDictionary::in_memory()),
    ))
}

pub(super) fn make_engine(
    provider: Arc<FakeProvider>,
    dicts: Arc<DictionaryProvider>,
    spell: Arc<FakeSpellChecker>,
    proxy: Arc<FakeProxy>,
) -> BilingualEngine {
    BilingualEngine::new(provider, dicts, spell, proxy, Settings::default())
}

pub(super) fn type_string(engine: &mut BilingualEngine, text: &str) {
    for ch in text.chars() {
        engine.process_char(ch);
    }
}

pub(super) fn merged_texts(engine: &mut BilingualEngine) -> Vec<String> {
    (0..engine.candidate_count())
        .filter_map(|i| engine.get_candidate(i))
        .collect()
}

// ---------------------------------------------------------------------------
// FakeSpellChecker — scripted oracle
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(super) struct FakeSpellChecker {
    known: HashSet<String>,
    guesses: HashMap<String, Vec<String>>,
    completions: HashMap<String, Vec<String>>,
}

impl FakeSpellChecker {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn know(mut self, word: &str) -> Self {
        self.known.insert(word.to_string());
        self
    }

    pub(super) fn guess(mut self, input: &str, suggestions: &[&str]) -> Self {
        self.guesses.insert(
            input.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub(super) fn complete(mut self, input: &str, suggestions: &[&str]) -> Self {
        self.completions.insert(
            input.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

fn word_at<'a>(context: &'a str, word_range: &Range<usize>) -> &'a str {
    context.get(word_range.clone()).unwrap_or("")
}

impl SpellChecker for FakeSpellChecker {
    fn is_misspelled(&self, context: &str, word_range: Range<usize>, _language: &str) -> bool {
        !self.known.contains(word_at(context, &word_range))
    }

    fn guesses(&self, context: &str, word_range: Range<usize>, _language: &str) -> Vec<String> {
        self.guesses
            .get(word_at(context, &word_range))
            .cloned()
            .unwrap_or_default()
    }

    fn completions(&self, context: &str, word_range: Range<usize>, _language: &str) -> Vec<String> {
        self.completions
            .get(word_at(context, &word_range))
            .cloned()
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// FakeProxy — records text-field interactions
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(super) struct FakeProxy {
    pub(super) before: Mutex<String>,
    pub(super) deletes: AtomicUsize,
    pub(super) adjustments: Mutex<Vec<isize>>,
}

impl FakeProxy {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn with_before(text: &str) -> Self {
        let proxy = Self::default();
        *proxy.before.lock().unwrap() = text.to_string();
        proxy
    }
}

impl TextDocumentProxy for FakeProxy {
    fn text_before_input(&self) -> Option<String> {
        let before = self.before.lock().unwrap();
        if before.is_empty() {
            None
        } else {
            Some(before.clone())
        }
    }

    fn text_after_input(&self) -> Option<String> {
        None
    }

    fn adjust_text_position(&self, char_offset: isize) {
        self.adjustments.lock().unwrap().push(char_offset);
    }

    fn delete_backward(&self) {
        self.deletes.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// FakeRimeSession — scripted candidates keyed by the raw input string
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub(super) struct ScriptedCandidate {
    pub(super) text: String,
    pub(super) comment: String,
    /// Raw-input characters this candidate consumes when selected.
    pub(super) consumes: usize,
}

pub(super) fn cand(text: &str, comment: &str, consumes: usize) -> ScriptedCandidate {
    ScriptedCandidate {
        text: text.to_string(),
        comment: comment.to_string(),
        consumes,
    }
}

#[derive(Clone, Default)]
pub(super) struct SessionScript {
    /// Raw input string -> scripted candidate list.
    pub(super) candidates: HashMap<String, Vec<ScriptedCandidate>>,
    /// Raw input string -> preedit display text (defaults to the raw text).
    pub(super) preedit: HashMap<String, String>,
    pub(super) page_size: usize,
}

impl SessionScript {
    pub(super) fn new() -> Self {
        Self {
            page_size: 100,
            ..Self::default()
        }
    }

    pub(super) fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub(super) fn on(mut self, raw: &str, candidates: Vec<ScriptedCandidate>) -> Self {
        self.candidates.insert(raw.to_string(), candidates);
        self
    }

    pub(super) fn preedit_for(mut self, raw: &str, preedit: &str) -> Self {
        self.preedit.insert(raw.to_string(), preedit.to_string());
        self
    }
}

struct SessionState {
    raw: String,
    /// Byte position within `raw`; the raw input is always ASCII here.
    caret: usize,
    pages: usize,
    committed: Option<String>,
    /// Accumulated text from partial selections.
    partial: String,
    selected_chars: usize,
}

pub(super) struct FakeRimeSession {
    script: SessionScript,
    state: Mutex<SessionState>,
    pub(super) unlearned: Mutex<Vec<String>>,
}

impl FakeRimeSession {
    fn new(script: SessionScript) -> Self {
        Self {
            script,
            state: Mutex::new(SessionState {
                raw: String::new(),
                caret: 0,
                pages: 1,
                committed: None,
                partial: String::new(),
                selected_chars: 0,
            }),
            unlearned: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn raw_text(&self) -> String {
        self.state.lock().unwrap().raw.clone()
    }

    fn scripted(&self, raw: &str) -> &[ScriptedCandidate] {
        self.script
            .candidates
            .get(raw)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn loaded_count(&self, state: &SessionState) -> usize {
        let total = self.scripted(&state.raw).len();
        total.min(state.pages * self.script.page_size)
    }
}

impl RimeSession for FakeRimeSession {
    fn process_key(&self, key_code: u32, _modifier: u32) {
        let mut state = self.state.lock().unwrap();
        match key_code {
            key::BACKSPACE => {
                if state.caret > 0 {
                    let caret = state.caret;
                    state.raw.remove(caret - 1);
                    state.caret -= 1;
                }
            }
            key::ESCAPE => {
                state.raw.clear();
                state.caret = 0;
                state.partial.clear();
                state.selected_chars = 0;
            }
            key::LEFT => {
                if state.caret > 0 {
                    state.caret -= 1;
                }
            }
            key::RIGHT => {
                if state.caret < state.raw.len() {
                    state.caret += 1;
                }
            }
            0x20..=0x7e => {
                let caret = state.caret;
                state.raw.insert(caret, key_code as u8 as char);
                state.caret += 1;
            }
            _ => {}
        }
    }

    fn set_current_schema(&self, _schema_id: &str) {}

    fn set_option(&self, _name: &str, _value: bool) {}

    fn set_candidate_menu_to_first_page(&self) {
        self.state.lock().unwrap().pages = 1;
    }

    fn get_candidate(&self, index: usize) -> Option<String> {
        let state = self.state.lock().unwrap();
        if index >= self.loaded_count(&state) {
            return None;
        }
        Some(self.scripted(&state.raw)[index].text.clone())
    }

    fn get_comment(&self, index: usize) -> Option<String> {
        let state = self.state.lock().unwrap();
        if index >= self.loaded_count(&state) {
            return None;
        }
        Some(self.scripted(&state.raw)[index].comment.clone())
    }

    fn load_more_candidates(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if self.loaded_count(&state) < self.scripted(&state.raw).len() {
            state.pages += 1;
            true
        } else {
            false
        }
    }

    fn select_candidate(&self, index: usize) -> bool {
        let mut state = self.state.lock().unwrap();
        if index >= self.loaded_count(&state) {
            return false;
        }
        let candidate = self.scripted(&state.raw)[index].clone();
        let raw_chars = state.raw.chars().count();
        if candidate.consumes >= raw_chars {
            state.committed = Some(format!("{}{}", state.partial, candidate.text));
            state.raw.clear();
            state.caret = 0;
            state.partial.clear();
            state.selected_chars = 0;
        } else {
            state.raw = state.raw.chars().skip(candidate.consumes).collect();
            state.caret = state.raw.len();
            state.selected_chars += candidate.text.chars().count();
            state.partial.push_str(&candidate.text);
        }
        true
    }

    fn unlearn_candidate(&self, index: usize) -> bool {
        let state = self.state.lock().unwrap();
        if index >= self.loaded_count(&state) {
            return false;
        }
        let text = self.scripted(&state.raw)[index].text.clone();
        drop(state);
        self.unlearned.lock().unwrap().push(text);
        true
    }

    fn get_committed_text(&self) -> Option<String> {
        self.state.lock().unwrap().committed.take()
    }

    fn composition_text(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        if state.raw.is_empty() {
            return None;
        }
        Some(
            self.script
                .preedit
                .get(&state.raw)
                .cloned()
                .unwrap_or_else(|| state.raw.clone()),
        )
    }

    fn composition_caret_byte_position(&self) -> usize {
        let state = self.state.lock().unwrap();
        let preedit_len = self
            .script
            .preedit
            .get(&state.raw)
            .map(String::len)
            .unwrap_or(state.raw.len());
        if state.caret == state.raw.len() {
            preedit_len
        } else {
            state.caret.min(preedit_len)
        }
    }

    fn raw_input(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        if state.raw.is_empty() {
            None
        } else {
            Some(state.raw.clone())
        }
    }

    fn raw_input_caret_byte_position(&self) -> usize {
        self.state.lock().unwrap().caret
    }

    fn is_first_candidate_complete_match(&self) -> bool {
        let state = self.state.lock().unwrap();
        let raw_chars = state.raw.chars().count();
        self.scripted(&state.raw)
            .first()
            .is_some_and(|c| c.consumes >= raw_chars)
    }

    fn user_selected_text_length(&self) -> usize {
        self.state.lock().unwrap().selected_chars
    }
}

// ---------------------------------------------------------------------------
// FakeProvider — owns the sessions it creates
// ---------------------------------------------------------------------------

pub(super) struct FakeProvider {
    state: Mutex<DeployState>,
    script: SessionScript,
    pub(super) sessions: Mutex<Vec<Arc<FakeRimeSession>>>,
    pub(super) create_attempts: AtomicUsize,
}

impl FakeProvider {
    pub(super) fn ready(script: SessionScript) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(DeployState::Succeeded),
            script,
            sessions: Mutex::new(Vec::new()),
            create_attempts: AtomicUsize::new(0),
        })
    }

    pub(super) fn deploying(script: SessionScript) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(DeployState::Deploying),
            script,
            sessions: Mutex::new(Vec::new()),
            create_attempts: AtomicUsize::new(0),
        })
    }

    pub(super) fn set_state(&self, state: DeployState) {
        *self.state.lock().unwrap() = state;
    }

    pub(super) fn session(&self) -> Arc<FakeRimeSession> {
        self.sessions.lock().unwrap()[0].clone()
    }
}

impl SessionProvider for FakeProvider {
    fn state(&self) -> DeployState {
        *self.state.lock().unwrap()
    }

    fn create_session(&self) -> Option<Arc<dyn RimeSession>> {
        self.create_attempts.fetch_add(1, Ordering::SeqCst);
        if self.state() != DeployState::Succeeded {
            return None;
        }
        let session = Arc::new(FakeRimeSession::new(self.script.clone()));
        self.sessions.lock().unwrap().push(session.clone());
        Some(session)
    }
}
