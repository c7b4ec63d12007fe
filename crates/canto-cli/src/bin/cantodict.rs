use std::path::Path;

use clap::{Parser, Subcommand};

use canto_cli::commands::{dict_ops, settings_ops, user_dict_ops};

#[derive(Parser)]
#[command(name = "cantodict", about = "Canto dictionary build tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a word list into a dictionary
    Build {
        /// Input text file (word<TAB>comma,joined,variants per line)
        input_file: String,
        /// Output dictionary file
        output_file: String,
    },
    /// Show dictionary info
    Info {
        /// Dictionary (.cbdx) file
        file: String,
    },
    /// Look up a word (exact, case-insensitive)
    Lookup {
        /// Dictionary file
        dict_file: String,
        /// Word to look up
        word: String,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
    /// Manage the user dictionary
    UserDict {
        /// User dictionary file (default: ~/Library/Application Support/Canto/user_dict.cbuw)
        #[arg(long)]
        file: Option<String>,
        #[command(subcommand)]
        action: UserDictAction,
    },
}

#[derive(Subcommand)]
enum UserDictAction {
    /// Record one use of a word
    Add {
        /// Word (exact casing is kept as a variant)
        word: String,
    },
    /// Forget a word entirely
    Remove {
        /// Word
        word: String,
    },
    /// List all learned words with their counts
    List,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            input_file,
            output_file,
        } => dict_ops::build(&input_file, &output_file),
        Command::Info { file } => dict_ops::info(&file),
        Command::Lookup { dict_file, word } => dict_ops::lookup(&dict_file, &word),
        Command::SettingsExport => settings_ops::export(),
        Command::SettingsValidate { file } => settings_ops::validate(&file),
        Command::UserDict { file, action } => {
            let path = file.unwrap_or_else(user_dict_ops::default_user_dict_path);
            let path = Path::new(&path);
            match action {
                UserDictAction::Add { word } => user_dict_ops::add(path, &word),
                UserDictAction::Remove { word } => user_dict_ops::remove(path, &word),
                UserDictAction::List => user_dict_ops::list(path),
            }
        }
    }
}
