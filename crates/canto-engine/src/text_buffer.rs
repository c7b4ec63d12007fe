//! Editable text sequence with a character-offset caret, backing the
//! English engine. Independent from the Rime session's byte-indexed raw
//! input; the bilingual layer keeps the two carets synchronized.

use tracing::warn;

pub struct InputTextBuffer {
    text: String,
    /// Character offset into `text`, always within `[0, char len]`.
    caret: usize,
    /// Substitute display text (e.g. a normalized form). Cleared by any
    /// mutation so it can never go stale.
    text_override: Option<String>,
}

impl InputTextBuffer {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            caret: 0,
            text_override: None,
        }
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.caret);
        self.text.insert(at, ch);
        self.caret += 1;
        self.text_override = None;
    }

    pub fn backspace(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let at = self.byte_index(self.caret - 1);
        self.text.remove(at);
        self.caret -= 1;
        self.text_override = None;
        true
    }

    pub fn move_caret(&mut self, offset: isize) -> bool {
        if offset.unsigned_abs() != 1 {
            warn!(offset, "move_caret only supports ±1");
            return false;
        }
        if offset < 0 {
            if self.caret == 0 {
                return false;
            }
            self.caret -= 1;
        } else {
            if self.caret == self.char_len() {
                return false;
            }
            self.caret += 1;
        }
        true
    }

    /// Absolute caret placement. Rejects out-of-range positions without
    /// mutating state; both boundaries are valid.
    pub fn set_caret(&mut self, position: usize) -> bool {
        if position > self.char_len() {
            warn!(
                position,
                len = self.char_len(),
                "set_caret position out of range"
            );
            return false;
        }
        self.caret = position;
        true
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.caret = 0;
        self.text_override = None;
    }

    /// Displayed text: the override when set, the real buffer otherwise.
    pub fn text(&self) -> &str {
        self.text_override.as_deref().unwrap_or(&self.text)
    }

    pub fn set_text_override(&mut self, text_override: Option<String>) {
        self.text_override = text_override;
    }

    pub fn caret_position(&self) -> usize {
        self.caret
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

impl Default for InputTextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
