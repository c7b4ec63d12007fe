//! Bilingual input composition engine.
//!
//! Merges two independent engines over the same keystroke stream (a Rime
//! session adapter for Cantonese/Chinese romanization and an English
//! autocomplete/autocorrect engine) into one candidate list and one
//! composed text buffer. The frontend feeds characters, backspaces, caret
//! moves, and candidate selections to [`BilingualEngine`] and re-renders
//! whenever an operation reports a state change.

mod candidates;
pub mod english;
pub mod rime;
pub mod text_buffer;
pub mod types;

mod bilingual;

#[cfg(test)]
mod tests;

pub use bilingual::BilingualEngine;
pub use english::EnglishInputEngine;
pub use rime::{DeployState, RimeInputEngine, RimeSession, SessionProvider};
pub use text_buffer::InputTextBuffer;
pub use types::{CandidateEntry, CandidateSource, Composition, TextDocumentProxy};
