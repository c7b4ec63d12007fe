use std::fs;
use std::path::Path;
use std::process;

use canto_core::dict::{DefaultDictionary, Dictionary, MemoryTable};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Compile a text word list into a CBDX dictionary. One entry per line:
/// `word<TAB>comma,joined,case,variants`; the variants column defaults to
/// the word itself. Lines starting with `#` are skipped.
pub fn build(input_file: &str, output_file: &str) {
    let text = die!(
        fs::read_to_string(input_file),
        "Error reading {input_file}: {}"
    );

    let mut entries: Vec<(String, String)> = Vec::new();
    let mut skipped = 0usize;
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut columns = line.splitn(2, '\t');
        let word = columns.next().unwrap_or_default().trim();
        if word.is_empty() || word.contains(',') {
            eprintln!("Skipping line {}: bad word {word:?}", line_no + 1);
            skipped += 1;
            continue;
        }
        let variants = columns
            .next()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(word);
        entries.push((word.to_lowercase(), variants.to_string()));
    }

    let entry_count = entries.len();
    let table = MemoryTable::from_entries(entries);
    die!(
        table.save(Path::new(output_file)),
        "Error writing dictionary: {}"
    );

    let file_size = fs::metadata(output_file).map(|m| m.len()).unwrap_or(0);
    eprintln!(
        "Wrote {output_file}: {} words ({} lines skipped, {:.1} KB)",
        table.len().min(entry_count),
        skipped,
        file_size as f64 / 1024.0
    );
}

pub fn info(file: &str) {
    let table = die!(
        MemoryTable::load(Path::new(file)),
        "Error reading dictionary: {}"
    );
    let variant_count: usize = table
        .entries()
        .iter()
        .map(|(_, row)| row.split(',').count())
        .sum();
    println!("Format:   CBDX v1");
    println!("Words:    {}", table.len());
    println!("Variants: {variant_count}");
}

pub fn lookup(dict_file: &str, word: &str) {
    let table = die!(
        MemoryTable::load(Path::new(dict_file)),
        "Error reading dictionary: {}"
    );
    let dict = DefaultDictionary::from_table(table);
    let words = dict.get_words(&word.to_lowercase());
    if words.is_empty() {
        println!("Not found: {word}");
        process::exit(1);
    }
    for variant in words {
        println!("{variant}");
    }
}
