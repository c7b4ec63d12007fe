use std::fs;
use std::process;

use canto_core::settings::{Settings, DEFAULT_SETTINGS_TOML};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn export() {
    print!("{DEFAULT_SETTINGS_TOML}");
}

pub fn validate(file: &str) {
    let text = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let settings = die!(Settings::from_toml(&text), "Invalid settings: {}");
    println!("OK: {file}");
    println!("  schema:       {}", settings.rime_schema.schema_id());
    println!("  char_form:    {:?}", settings.char_form);
    println!("  tone_input:   {:?}", settings.tone_input_mode);
    println!("  mixed_mode:   {}", settings.mixed_mode_enabled);
    println!("  english:      {}", settings.english_locale);
}
