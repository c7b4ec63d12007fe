//! Shared types at the engine boundary.

/// In-progress, not-yet-committed text with a caret. Recreated on every
/// query; no persistent identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub text: String,
    /// Character offset, always within `[0, text chars]`.
    pub caret_index: usize,
}

impl Composition {
    pub fn new(text: String, caret_index: usize) -> Self {
        Self { text, caret_index }
    }
}

/// Which sub-engine produced a merged candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    English,
    Rime,
}

/// One slot in the merged candidate list. `source_index` addresses the
/// candidate within its originating engine, for selection and unlearning.
#[derive(Debug, Clone)]
pub struct CandidateEntry {
    pub text: String,
    pub source: CandidateSource,
    pub source_index: usize,
}

/// The caller's text field. Consulted for document context around the
/// insertion point and used directly when no composition is active.
pub trait TextDocumentProxy: Send + Sync {
    fn text_before_input(&self) -> Option<String>;
    fn text_after_input(&self) -> Option<String>;
    /// Move the field's cursor by `char_offset` characters.
    fn adjust_text_position(&self, char_offset: isize);
    fn delete_backward(&self);
}
