//! Engine settings loaded from TOML, with defaults embedded via
//! `include_str!`. Settings are plain data handed to the engine at
//! construction; there is no global singleton, so unrelated engine
//! instances (and tests) never share configuration state.

use serde::{Deserialize, Serialize};

use crate::schema::RimeSchema;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharForm {
    Traditional,
    Simplified,
}

/// How tones are entered in tonal schemas: held-key long-press (tone digits
/// become reserved delimiters) or typed inline after the syllable vowels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneInputMode {
    LongPress,
    VowelTone,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub rime_schema: RimeSchema,
    pub char_form: CharForm,
    pub tone_input_mode: ToneInputMode,
    pub mixed_mode_enabled: bool,
    /// Locale tag passed to the spell oracle and used to pick the default
    /// dictionary, e.g. "en_US".
    pub english_locale: String,
}

impl Settings {
    pub fn from_toml(toml_str: &str) -> Result<Self, SettingsError> {
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_toml(DEFAULT_SETTINGS_TOML).expect("embedded default settings must parse")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_parse() {
        let s = Settings::default();
        assert_eq!(s.rime_schema, RimeSchema::Jyutping);
        assert_eq!(s.char_form, CharForm::Traditional);
        assert_eq!(s.tone_input_mode, ToneInputMode::LongPress);
        assert!(s.mixed_mode_enabled);
        assert_eq!(s.english_locale, "en_US");
    }

    #[test]
    fn test_custom_toml() {
        let s = Settings::from_toml(
            r#"
            rime_schema = "cangjie"
            char_form = "simplified"
            tone_input_mode = "vowel_tone"
            mixed_mode_enabled = false
            english_locale = "en_GB"
            "#,
        )
        .unwrap();
        assert_eq!(s.rime_schema, RimeSchema::Cangjie);
        assert_eq!(s.char_form, CharForm::Simplified);
        assert!(!s.mixed_mode_enabled);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(Settings::from_toml("rime_schema = \"klingon\"").is_err());
        assert!(Settings::from_toml("not toml at all [").is_err());
    }
}
