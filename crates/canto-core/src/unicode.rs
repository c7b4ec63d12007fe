//! Character-level classification and casing helpers for mixed
//! Cantonese-romanization / English input.

use crate::settings::ToneInputMode;

pub fn is_english_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Characters the romanization engine reserves for syllable separation
/// rather than literal output. `'` and `/` are always reserved; the tone
/// digits `1..=6` only when tones are entered by long-press (when tones are
/// typed as trailing letters the digits stay ordinary input).
pub fn is_rime_special_char(c: char, tone_mode: ToneInputMode) -> bool {
    if c == '\'' || c == '/' {
        return true;
    }
    tone_mode == ToneInputMode::LongPress && ('1'..='6').contains(&c)
}

/// Lowercased English letters of `s`, everything else dropped.
pub fn letters_only(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Apply the casing of `english_text` onto `rime_text`, walking both in
/// lockstep. Letters in the Rime text take the case of the aligned English
/// character. Spaces and apostrophes in the Rime text (syllable delimiters)
/// are copied verbatim and do not consume an English character. Once the
/// English template runs out, the rest of the Rime text is copied as-is.
///
/// e.g. rime "a b'c" + english "ABC" → "A B'C".
pub fn case_morph(rime_text: &str, english_text: &str) -> String {
    let mut morphed = String::with_capacity(rime_text.len());
    let mut english = english_text.chars();
    let mut template = english.next();

    for rc in rime_text.chars() {
        match template {
            Some(ec) => {
                if is_english_letter(rc) {
                    if ec.is_uppercase() {
                        morphed.push(rc.to_ascii_uppercase());
                    } else {
                        morphed.push(rc.to_ascii_lowercase());
                    }
                } else {
                    morphed.push(rc);
                }
                if rc != ' ' && rc != '\'' {
                    template = english.next();
                }
            }
            None => morphed.push(rc),
        }
    }
    morphed
}

/// Translate a UTF-8 byte offset reported by the Rime session into a
/// character offset. Returns `None` when the offset is out of range or not
/// on a character boundary (callers treat that as a bug check).
pub fn utf8_byte_to_char_index(text: &str, byte_index: usize) -> Option<usize> {
    if byte_index > text.len() || !text.is_char_boundary(byte_index) {
        return None;
    }
    Some(text[..byte_index].chars().count())
}
