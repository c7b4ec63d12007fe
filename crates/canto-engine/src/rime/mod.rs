//! Adapter over the external Rime session.
//!
//! Translates character/backspace/caret operations into session key events,
//! converts the session's UTF-8 byte offsets into character offsets, and
//! caches paged-in candidates. The session itself is created lazily: until
//! the external deployment succeeds, every operation is a logged no-op and
//! a bounded background retry keeps trying to attach.

mod session;

pub use session::{key, DeployState, RimeSession, SessionProvider};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use canto_core::schema::RimeSchema;
use canto_core::settings::{CharForm, ToneInputMode};
use canto_core::unicode::utf8_byte_to_char_index;

use crate::types::Composition;

const MAX_SESSION_RETRIES: u32 = 10;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(33);
const RETRY_BACKOFF: f64 = 1.1;

type SessionSlot = Arc<Mutex<Option<Weak<dyn RimeSession>>>>;

pub struct RimeInputEngine {
    provider: Arc<dyn SessionProvider>,
    session: SessionSlot,
    retry_running: Arc<AtomicBool>,

    schema: RimeSchema,
    tone_input_mode: ToneInputMode,
    char_form: CharForm,

    candidates: Vec<String>,
    comments: Vec<String>,
    has_loaded_all: bool,
}

impl RimeInputEngine {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        schema: RimeSchema,
        tone_input_mode: ToneInputMode,
        char_form: CharForm,
    ) -> Self {
        let engine = Self {
            provider,
            session: Arc::new(Mutex::new(None)),
            retry_running: Arc::new(AtomicBool::new(false)),
            schema,
            tone_input_mode,
            char_form,
            candidates: Vec::new(),
            comments: Vec::new(),
            has_loaded_all: false,
        };
        engine.try_create_session_if_needed();
        engine
    }

    /// Kick session creation ahead of the first keystroke.
    pub fn prepare(&self) {
        self.try_create_session_if_needed();
    }

    pub fn schema(&self) -> RimeSchema {
        self.schema
    }

    /// Whether a live session is currently attached. Unlike `session()`,
    /// this never kicks off creation or retries.
    pub fn is_session_attached(&self) -> bool {
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some()
    }

    pub fn process_char(&mut self, ch: char) -> bool {
        let Some(ascii) = ch.as_ascii_lowercase_for(self.schema) else {
            return false;
        };
        // Collapse a doubled delimiter keystroke; Rime would treat it as an
        // empty syllable.
        if ascii == '\'' && self.char_before_raw_caret() == Some('\'') {
            return false;
        }
        self.process_key(ascii as u32)
    }

    pub fn process_backspace(&mut self) -> bool {
        let caret_at_start = self.composition().map_or(true, |c| c.caret_index == 0);
        if caret_at_start {
            return false;
        }
        self.process_key(key::BACKSPACE)
    }

    pub fn move_caret(&mut self, offset: isize) -> bool {
        if offset.unsigned_abs() != 1 {
            warn!(offset, "move_caret only supports ±1");
            return false;
        }
        let Some(session) = self.session() else {
            warn!("move_caret: no rime session");
            return false;
        };
        let Some(preedit) = session.composition_text() else {
            warn!("move_caret called without a composition");
            return false;
        };
        let caret = session.composition_caret_byte_position();
        if offset < 0 {
            if caret == 0 {
                return false;
            }
        } else if caret >= preedit.len() {
            return false;
        }
        self.process_key(if offset < 0 { key::LEFT } else { key::RIGHT })
    }

    /// Escape is sent twice: once to drop any highlighted candidate state,
    /// once to clear the raw input, in case the session is mid-menu.
    pub fn clear_input(&mut self) {
        let Some(session) = self.session() else {
            return;
        };
        session.process_key(key::ESCAPE, 0);
        session.process_key(key::ESCAPE, 0);
        self.reset_candidates(&session);
    }

    pub fn composition(&self) -> Option<Composition> {
        let session = self.session.lock().unwrap().as_ref()?.upgrade()?;
        let text = session.composition_text().filter(|t| !t.is_empty())?;
        let caret = byte_caret_to_chars(&text, session.composition_caret_byte_position());
        Some(Composition::new(text, caret))
    }

    pub fn raw_input(&self) -> Option<Composition> {
        let session = self.session.lock().unwrap().as_ref()?.upgrade()?;
        let text = session.raw_input().filter(|t| !t.is_empty())?;
        let caret = byte_caret_to_chars(&text, session.raw_input_caret_byte_position());
        Some(Composition::new(text, caret))
    }

    pub fn loaded_candidates_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn has_loaded_all_candidates(&self) -> bool {
        self.has_loaded_all
    }

    pub fn get_candidate(&self, index: usize) -> Option<&str> {
        self.candidates.get(index).map(String::as_str)
    }

    pub fn get_comment(&self, index: usize) -> Option<&str> {
        self.comments.get(index).map(String::as_str)
    }

    pub fn is_first_candidate_complete_match(&self) -> bool {
        self.session()
            .is_some_and(|s| s.is_first_candidate_complete_match())
    }

    pub fn user_selected_text_length(&self) -> usize {
        self.session()
            .map_or(0, |s| s.user_selected_text_length())
    }

    /// Page in another batch of candidates from the session. Returns `true`
    /// if anything new arrived.
    pub fn load_more_candidates(&mut self) -> bool {
        let Some(session) = self.session() else {
            warn!("load_more_candidates: no rime session");
            self.has_loaded_all = true;
            return false;
        };
        let loaded_more = session.load_more_candidates();
        if !loaded_more {
            self.has_loaded_all = true;
        }
        while let Some(candidate) = session.get_candidate(self.candidates.len()) {
            let comment = session
                .get_comment(self.candidates.len())
                .unwrap_or_default();
            self.candidates.push(candidate);
            self.comments.push(comment);
        }
        loaded_more
    }

    /// Selects the candidate in the session. Returns committed text only if
    /// the selection consumed the whole composition.
    pub fn select_candidate(&mut self, index: usize) -> Option<String> {
        let Some(session) = self.session() else {
            warn!("select_candidate: no rime session");
            return None;
        };
        if index >= self.candidates.len() {
            warn!(index, count = self.candidates.len(), "bad candidate index");
            return None;
        }
        if !session.select_candidate(index) {
            return None;
        }
        self.reset_candidates(&session);
        session.get_committed_text().filter(|t| !t.is_empty())
    }

    pub fn unlearn_candidate(&mut self, index: usize) -> bool {
        let Some(session) = self.session() else {
            return false;
        };
        if index >= self.candidates.len() {
            warn!(index, count = self.candidates.len(), "bad candidate index");
            return false;
        }
        session.unlearn_candidate(index)
    }

    /// No-op when the schema is unchanged; otherwise re-applies the schema
    /// id (with tonal variant) and character-form options to the session.
    pub fn set_schema(&mut self, schema: RimeSchema) {
        if schema == self.schema {
            return;
        }
        self.schema = schema;
        if let Some(session) = self.session() {
            apply_session_config(&session, self.schema, self.tone_input_mode, self.char_form);
            self.reset_candidates(&session);
        }
    }

    pub fn set_char_form(&mut self, char_form: CharForm) {
        self.char_form = char_form;
        self.refresh_chinese_script();
    }

    pub fn set_tone_input_mode(&mut self, tone_input_mode: ToneInputMode) {
        if tone_input_mode == self.tone_input_mode {
            return;
        }
        self.tone_input_mode = tone_input_mode;
        if let Some(session) = self.session() {
            apply_session_config(&session, self.schema, self.tone_input_mode, self.char_form);
            self.reset_candidates(&session);
        }
    }

    /// Re-applies the simplified/traditional option and restarts paging.
    pub fn refresh_chinese_script(&mut self) {
        if let Some(session) = self.session() {
            session.set_option("simplification", self.char_form == CharForm::Simplified);
            self.reset_candidates(&session);
        }
    }

    fn char_before_raw_caret(&self) -> Option<char> {
        let raw = self.raw_input()?;
        if raw.caret_index == 0 {
            return None;
        }
        raw.text.chars().nth(raw.caret_index - 1)
    }

    fn process_key(&mut self, key_code: u32) -> bool {
        let Some(session) = self.session() else {
            warn!(key_code, "process_key: no rime session");
            return false;
        };
        session.process_key(key_code, 0);
        self.reset_candidates(&session);
        true
    }

    fn reset_candidates(&mut self, session: &Arc<dyn RimeSession>) {
        session.set_candidate_menu_to_first_page();
        self.candidates.clear();
        self.comments.clear();
        self.has_loaded_all = false;
    }

    fn session(&self) -> Option<Arc<dyn RimeSession>> {
        self.try_create_session_if_needed();
        self.session.lock().unwrap().as_ref()?.upgrade()
    }

    fn try_create_session_if_needed(&self) {
        {
            let mut slot = self.session.lock().unwrap();
            if slot.as_ref().and_then(Weak::upgrade).is_some() {
                return;
            }
            if self.provider.state() == DeployState::Succeeded {
                if let Some(session) = self.provider.create_session() {
                    apply_session_config(
                        &session,
                        self.schema,
                        self.tone_input_mode,
                        self.char_form,
                    );
                    *slot = Some(Arc::downgrade(&session));
                    debug!("created rime session");
                    return;
                }
            }
        }
        self.spawn_session_retry();
    }

    /// Bounded asynchronous retry: ~33 ms initial delay, ×1.1 per attempt,
    /// 10 attempts. Cancelled implicitly when the engine is dropped (the
    /// weak slot reference dies).
    fn spawn_session_retry(&self) {
        if self.retry_running.swap(true, Ordering::AcqRel) {
            return;
        }
        let slot = Arc::downgrade(&self.session);
        let provider = Arc::clone(&self.provider);
        let running = Arc::clone(&self.retry_running);
        let (schema, tone, char_form) = (self.schema, self.tone_input_mode, self.char_form);
        let spawned = thread::Builder::new()
            .name("canto-rime-session".into())
            .spawn(move || {
                let mut delay = INITIAL_RETRY_DELAY;
                for attempt in 1..=MAX_SESSION_RETRIES {
                    thread::sleep(delay);
                    let Some(slot) = slot.upgrade() else {
                        // Engine discarded; nothing to attach to.
                        running.store(false, Ordering::Release);
                        return;
                    };
                    let mut guard = slot.lock().unwrap();
                    if guard.as_ref().and_then(Weak::upgrade).is_some() {
                        running.store(false, Ordering::Release);
                        return;
                    }
                    if provider.state() == DeployState::Succeeded {
                        if let Some(session) = provider.create_session() {
                            apply_session_config(&session, schema, tone, char_form);
                            *guard = Some(Arc::downgrade(&session));
                            debug!(attempt, "created rime session after retry");
                            running.store(false, Ordering::Release);
                            return;
                        }
                    }
                    drop(guard);
                    delay = Duration::from_secs_f64(delay.as_secs_f64() * RETRY_BACKOFF);
                }
                warn!(
                    attempts = MAX_SESSION_RETRIES,
                    "gave up creating rime session"
                );
                running.store(false, Ordering::Release);
            });
        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn session retry thread");
            self.retry_running.store(false, Ordering::Release);
        }
    }
}

fn apply_session_config(
    session: &Arc<dyn RimeSession>,
    schema: RimeSchema,
    tone_input_mode: ToneInputMode,
    char_form: CharForm,
) {
    session.set_current_schema(&schema.schema_id_with_tones(tone_input_mode));
    session.set_option("simplification", char_form == CharForm::Simplified);
}

fn byte_caret_to_chars(text: &str, byte_position: usize) -> usize {
    match utf8_byte_to_char_index(text, byte_position) {
        Some(chars) => chars,
        None => {
            warn!(
                byte_position,
                text_len = text.len(),
                "caret byte position off a character boundary"
            );
            text.chars().count()
        }
    }
}

trait CharExt {
    fn as_ascii_lowercase_for(self, schema: RimeSchema) -> Option<char>;
}

impl CharExt for char {
    /// ASCII gate plus schema-aware casing: keypad schemas send digit keys
    /// verbatim, everything else is lowercased before reaching the session.
    fn as_ascii_lowercase_for(self, schema: RimeSchema) -> Option<char> {
        if !self.is_ascii() {
            return None;
        }
        if schema.is_keypad_based() {
            Some(self)
        } else {
            Some(self.to_ascii_lowercase())
        }
    }
}
