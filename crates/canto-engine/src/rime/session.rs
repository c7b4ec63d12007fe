//! External Rime session interface.
//!
//! The linguistic engine is an opaque, externally owned collaborator. A
//! session holds the composing state for one input field; the adapter only
//! ever keeps a non-owning handle, so session teardown turns engine calls
//! into observable no-ops instead of dangling access.

use std::sync::Arc;

/// Key codes sent to the session. ASCII characters are sent as their
/// codepoint; these are the special keys the adapter uses.
pub mod key {
    pub const BACKSPACE: u32 = 0xff08;
    pub const ESCAPE: u32 = 0xff1b;
    pub const LEFT: u32 = 0xff96;
    pub const RIGHT: u32 = 0xff98;
}

/// Deployment state of the external Rime service. Sessions can only be
/// created once deployment has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployState {
    Uninitialized,
    Deploying,
    Succeeded,
    Failure,
}

/// One stateful composing session. Offsets are reported in UTF-8 bytes;
/// the adapter converts to character offsets.
pub trait RimeSession: Send + Sync {
    fn process_key(&self, key_code: u32, modifier: u32);

    fn set_current_schema(&self, schema_id: &str);
    fn set_option(&self, name: &str, value: bool);

    /// Restart candidate paging from the first page.
    fn set_candidate_menu_to_first_page(&self);
    fn get_candidate(&self, index: usize) -> Option<String>;
    /// Phonetic annotation (romanization) of the candidate at `index`.
    fn get_comment(&self, index: usize) -> Option<String>;
    /// Page in more candidates. Returns `true` if any were loaded.
    fn load_more_candidates(&self) -> bool;
    fn select_candidate(&self, index: usize) -> bool;
    fn unlearn_candidate(&self, index: usize) -> bool;
    /// Text committed by the last selection, if the whole composition was
    /// consumed.
    fn get_committed_text(&self) -> Option<String>;

    fn composition_text(&self) -> Option<String>;
    fn composition_caret_byte_position(&self) -> usize;
    /// The raw keystroke string, delimiters included.
    fn raw_input(&self) -> Option<String>;
    fn raw_input_caret_byte_position(&self) -> usize;

    fn is_first_candidate_complete_match(&self) -> bool;
    fn user_selected_text_length(&self) -> usize;
}

/// Creates and owns sessions. The adapter polls `state` and retries
/// creation until deployment succeeds.
pub trait SessionProvider: Send + Sync {
    fn state(&self) -> DeployState;
    /// `None` if the service cannot currently create a session. The
    /// provider retains ownership; callers hold weak handles.
    fn create_session(&self) -> Option<Arc<dyn RimeSession>>;
}
