use std::path::Path;
use std::process;
use std::sync::Arc;

use canto_core::dict::{MemoryTable, UserDictionary};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn default_user_dict_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    format!("{home}/Library/Application Support/Canto/user_dict.cbuw")
}

fn open_table(path: &Path) -> Arc<MemoryTable> {
    if path.exists() {
        Arc::new(die!(
            MemoryTable::load(path),
            "Error opening user dictionary: {}"
        ))
    } else {
        Arc::new(MemoryTable::new())
    }
}

pub fn add(path: &Path, word: &str) {
    let table = open_table(path);
    let dict = UserDictionary::new(table.clone());
    dict.learn_word(word);
    let freq = dict.entry_frequency(word);
    if freq == 0 {
        // learn_word ignores words below the length floor.
        eprintln!("Not learned (too short): {word}");
        process::exit(1);
    }
    die!(table.save(path), "Error saving user dictionary: {}");
    println!("Learned: {word} (count {freq})");
}

pub fn remove(path: &Path, word: &str) {
    let table = open_table(path);
    let dict = UserDictionary::new(table.clone());
    if dict.unlearn_word(word) {
        die!(table.save(path), "Error saving user dictionary: {}");
        println!("Removed: {word}");
    } else {
        println!("Not found: {word}");
    }
}

pub fn list(path: &Path) {
    let table = open_table(path);
    if table.is_empty() {
        println!("(empty)");
        return;
    }
    for (word, row) in table.entries() {
        let mut parts = row.split(',');
        let freq = parts.next().unwrap_or("0");
        let variants: Vec<&str> = parts.collect();
        println!("{word}\tcount={freq}\t{}", variants.join(","));
    }
}
