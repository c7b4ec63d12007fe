//! Input-scheme capability table.
//!
//! Each `RimeSchema` maps to a Rime schema id plus static capability flags
//! the engine consults when merging candidates and routing keystrokes.
//! Selecting a schema is a pure configuration change; the session adapter
//! re-applies it to the underlying Rime session.

use serde::{Deserialize, Serialize};

use crate::settings::ToneInputMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RimeSchema {
    Jyutping,
    Yale,
    Cangjie,
    Quick,
    Stroke,
    Mandarin,
    Jyutping10Keys,
    Loengfan,
}

impl RimeSchema {
    /// The base Rime schema id, without any tonal-input variant suffix.
    pub fn schema_id(self) -> &'static str {
        match self {
            Self::Jyutping => "jyut6ping3",
            Self::Yale => "jyut6ping3_yale",
            Self::Cangjie => "cangjie5",
            Self::Quick => "quick5",
            Self::Stroke => "stroke5",
            Self::Mandarin => "luna_pinyin",
            Self::Jyutping10Keys => "jyut6ping3_10keys",
            Self::Loengfan => "loengfan",
        }
    }

    /// Schema id to apply to the session, with the tonal-input variant
    /// suffix appended for schemas that support tonal input when tones are
    /// typed inline rather than via long-press.
    pub fn schema_id_with_tones(self, tone_mode: ToneInputMode) -> String {
        if self.supports_tonal_input() && tone_mode == ToneInputMode::VowelTone {
            format!("{}_tones", self.schema_id())
        } else {
            self.schema_id().to_string()
        }
    }

    /// 10-key layouts send ambiguous digit keys instead of letters.
    pub fn is_keypad_based(self) -> bool {
        matches!(self, Self::Jyutping10Keys)
    }

    /// Shape-based (non-phonetic) schemas: cangjie, quick, stroke.
    pub fn is_shape_based(self) -> bool {
        matches!(self, Self::Cangjie | Self::Quick | Self::Stroke)
    }

    pub fn supports_tonal_input(self) -> bool {
        matches!(self, Self::Jyutping | Self::Yale | Self::Jyutping10Keys)
    }

    /// Whether English candidates may be interleaved with this schema's
    /// candidates in mixed mode.
    pub fn supports_mixed_mode(self) -> bool {
        matches!(self, Self::Jyutping | Self::Yale | Self::Mandarin)
    }
}
