//! The command language shared by the TUI command line and headless mode.
//!
//! Parsing never touches state. [`crate::session::Session::execute`] applies
//! a parsed command and reports an [`Outcome`].

use crate::catalog::{CatalogError, Category};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from parsing a command line.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a row number: '{0}'")]
    BadNumber(String),

    #[error(transparent)]
    Category(#[from] CatalogError),
}

/// A single user action.
///
/// Row and entry numbers are 1-based on the command line and stored 1-based
/// here; the session converts them.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Ledger
    AddRow { name: Option<String> },
    RemoveRow { row: usize },
    SetItemName { row: usize, name: String },
    SetItemWeight { row: usize, weight: String },
    SetItemQuantity { row: usize, quantity: String },

    // Catalog
    AddFromCatalog { category: Category, entry: usize },
    NewCatalogEntry { category: Category, weight: String, name: String },
    EditCatalogWeight { category: Category, entry: usize, weight: String },
    RemoveCatalogEntry { category: Category, entry: usize },
    RepopulateCatalog,

    // Character
    SetCharacterName(String),
    SetRace(String),
    SetStrength(String),
    AddModifier { delta: String, label: String },
    RemoveModifier { index: usize },

    // Display
    ToggleSystem,
    IncreaseTextSize,
    DecreaseTextSize,

    // Persistence
    SaveProfile,
    LoadProfile,
    SaveSession,
    RestoreSession,
    Export(Option<PathBuf>),
    Import(PathBuf),
    ListExports,
    ClearUserData,
    ClearAllData,

    // Misc
    Print(Option<PathBuf>),
    Status,
    Help,
    Quit,
    SaveAndQuit,
}

/// What happened after executing a command.
///
/// Variants other than `Updated`/`Info` ask the front end to do something it
/// owns: async file I/O, showing help, or exiting.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// State changed.
    Updated(String),
    /// Nothing changed; show the message.
    Info(String),
    Export(PathBuf),
    Import(PathBuf),
    /// List the exported characters in this directory.
    ListExports(PathBuf),
    Print(Option<PathBuf>),
    Help,
    Quit,
}

impl Outcome {
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Updated(msg) | Outcome::Info(msg) => Some(msg),
            _ => None,
        }
    }
}

impl Command {
    /// Parse a command line. A leading `:` or `#` is ignored.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line
            .trim()
            .trim_start_matches(':')
            .trim_start_matches('#')
            .trim();
        let mut parts = line.splitn(2, char::is_whitespace);
        let verb = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default().trim();

        if verb.is_empty() {
            return Err(CommandError::Empty);
        }

        let command = match verb {
            "add" | "o" => Command::AddRow {
                name: non_empty(rest),
            },
            "rm" | "del" => Command::RemoveRow {
                row: parse_index(required(rest, "rm <row>")?)?,
            },
            "name" => {
                let (row, name) = split_first(rest, "name <row> <text>")?;
                Command::SetItemName {
                    row: parse_index(row)?,
                    name: name.to_string(),
                }
            }
            "weight" => {
                let (row, weight) = split_first(rest, "weight <row> <weight>")?;
                Command::SetItemWeight {
                    row: parse_index(row)?,
                    weight: weight.to_string(),
                }
            }
            "qty" | "quantity" => {
                let (row, quantity) = split_first(rest, "qty <row> <quantity>")?;
                Command::SetItemQuantity {
                    row: parse_index(row)?,
                    quantity: quantity.to_string(),
                }
            }

            "cel" => {
                let (category, entry) = split_first(rest, "cel <category> <entry>")?;
                Command::AddFromCatalog {
                    category: category.parse()?,
                    entry: parse_index(entry)?,
                }
            }
            "celnew" => {
                const USAGE: &str = "celnew <category> <weight> <name...>";
                let (category, rest) = split_first(rest, USAGE)?;
                let (weight, name) = split_first(rest, USAGE)?;
                Command::NewCatalogEntry {
                    category: category.parse()?,
                    weight: weight.to_string(),
                    name: name.to_string(),
                }
            }
            "celweight" => {
                const USAGE: &str = "celweight <category> <entry> <weight>";
                let (category, rest) = split_first(rest, USAGE)?;
                let (entry, weight) = split_first(rest, USAGE)?;
                Command::EditCatalogWeight {
                    category: category.parse()?,
                    entry: parse_index(entry)?,
                    weight: weight.to_string(),
                }
            }
            "celrm" => {
                let (category, entry) = split_first(rest, "celrm <category> <entry>")?;
                Command::RemoveCatalogEntry {
                    category: category.parse()?,
                    entry: parse_index(entry)?,
                }
            }
            "repopulate" => Command::RepopulateCatalog,

            "charname" => Command::SetCharacterName(rest.to_string()),
            "race" => Command::SetRace(rest.to_string()),
            "str" | "strength" => Command::SetStrength(rest.to_string()),
            "mod" => {
                let (delta, label) = split_first(rest, "mod <delta> <label...>")?;
                Command::AddModifier {
                    delta: delta.to_string(),
                    label: label.to_string(),
                }
            }
            "unmod" => Command::RemoveModifier {
                index: parse_index(required(rest, "unmod <n>")?)?,
            },

            "system" => Command::ToggleSystem,
            "bigger" | "+" => Command::IncreaseTextSize,
            "smaller" | "-" => Command::DecreaseTextSize,

            "save" => Command::SaveProfile,
            "load" => Command::LoadProfile,
            "w" => Command::SaveSession,
            "restore" | "e" => Command::RestoreSession,
            "export" => Command::Export(non_empty(rest).map(PathBuf::from)),
            "import" => Command::Import(PathBuf::from(required(rest, "import <path>")?)),
            "exports" | "ls" => Command::ListExports,
            "clear" => Command::ClearUserData,
            "clearall" => Command::ClearAllData,

            "print" => Command::Print(non_empty(rest).map(PathBuf::from)),
            "status" => Command::Status,
            "help" | "h" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            "wq" | "x" => Command::SaveAndQuit,

            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }

    /// Destructive commands the TUI confirms before running.
    pub fn needs_confirmation(&self) -> bool {
        matches!(
            self,
            Command::ClearUserData | Command::ClearAllData | Command::RepopulateCatalog
        )
    }

    /// Question shown before a destructive command.
    pub fn confirmation_prompt(&self) -> Option<&'static str> {
        match self {
            Command::ClearUserData => {
                Some("Are you sure you want to clear user data? This cannot be undone.")
            }
            Command::ClearAllData => {
                Some("Are you sure you want to clear all data? This cannot be undone.")
            }
            Command::RepopulateCatalog => Some(
                "Are you sure you want to repopulate the CEL with default data? This will overwrite the current CEL.",
            ),
            _ => None,
        }
    }
}

/// Help lines for the command language.
pub const HELP: &[(&str, &str)] = &[
    ("add [name]", "Add an equipment row"),
    ("rm <row>", "Remove a row"),
    ("name|weight|qty <row> <value>", "Edit a row"),
    ("cel <category> <n>", "Add CEL entry n to equipment"),
    ("celnew <category> <weight> <name>", "Add a CEL entry"),
    ("celweight <category> <n> <weight>", "Edit a CEL weight"),
    ("celrm <category> <n>", "Delete a CEL entry"),
    ("str <n>", "Set base strength"),
    ("mod <delta> <label>", "Add a strength modifier"),
    ("unmod <n>", "Remove a strength modifier"),
    ("charname|race <text>", "Set character details"),
    ("system", "Toggle custom/classic system"),
    ("bigger|smaller", "Adjust text size"),
    ("save|load", "Save/load the character profile"),
    ("w|restore", "Save/restore the full session"),
    ("export [path]|import <path>", "Export/import a JSON file"),
    ("exports", "List exported characters"),
    ("clear|clearall|repopulate", "Reset data"),
    ("print [path]", "Show the sheet or write HTML"),
    ("status|help|q|wq", "Info and exit"),
];

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn required<'a>(s: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    let s = s.trim();
    if s.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(s)
    }
}

/// Split off the first word; the remainder must be non-empty.
fn split_first<'a>(s: &'a str, usage: &'static str) -> Result<(&'a str, &'a str), CommandError> {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((first, rest)) if !rest.trim().is_empty() => Ok((first, rest.trim())),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn parse_index(s: &str) -> Result<usize, CommandError> {
    s.trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CommandError::BadNumber(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ledger_commands() {
        assert_eq!(Command::parse("add"), Ok(Command::AddRow { name: None }));
        assert_eq!(
            Command::parse(":add Rope (50 feet)"),
            Ok(Command::AddRow {
                name: Some("Rope (50 feet)".to_string())
            })
        );
        assert_eq!(Command::parse("#rm 2"), Ok(Command::RemoveRow { row: 2 }));
        assert_eq!(
            Command::parse("name 1 Iron Rations"),
            Ok(Command::SetItemName {
                row: 1,
                name: "Iron Rations".to_string()
            })
        );
        assert_eq!(
            Command::parse("qty 3 abc"),
            Ok(Command::SetItemQuantity {
                row: 3,
                quantity: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_parse_catalog_commands() {
        assert_eq!(
            Command::parse("cel weapons 2"),
            Ok(Command::AddFromCatalog {
                category: Category::Weapons,
                entry: 2
            })
        );
        assert_eq!(
            Command::parse("celnew misc 3 Lute of Lament"),
            Ok(Command::NewCatalogEntry {
                category: Category::Misc,
                weight: "3".to_string(),
                name: "Lute of Lament".to_string()
            })
        );
        assert_eq!(
            Command::parse("celweight gems 1 0.2"),
            Ok(Command::EditCatalogWeight {
                category: Category::Gems,
                entry: 1,
                weight: "0.2".to_string()
            })
        );
        assert!(matches!(
            Command::parse("cel food 1"),
            Err(CommandError::Category(CatalogError::UnknownCategory(_)))
        ));
    }

    #[test]
    fn test_parse_character_commands() {
        assert_eq!(
            Command::parse("mod 2 Belt of Giant Strength"),
            Ok(Command::AddModifier {
                delta: "2".to_string(),
                label: "Belt of Giant Strength".to_string()
            })
        );
        assert_eq!(
            Command::parse("mod 2"),
            Err(CommandError::Usage("mod <delta> <label...>"))
        );
        assert_eq!(
            Command::parse("str 14"),
            Ok(Command::SetStrength("14".to_string()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(Command::parse(":"), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert_eq!(
            Command::parse("rm zero"),
            Err(CommandError::BadNumber("zero".to_string()))
        );
        assert_eq!(
            Command::parse("rm 0"),
            Err(CommandError::BadNumber("0".to_string()))
        );
        assert_eq!(Command::parse("rm"), Err(CommandError::Usage("rm <row>")));
    }

    #[test]
    fn test_parse_persistence_commands() {
        assert_eq!(Command::parse("export"), Ok(Command::Export(None)));
        assert_eq!(
            Command::parse("export out/hero.json"),
            Ok(Command::Export(Some(PathBuf::from("out/hero.json"))))
        );
        assert_eq!(
            Command::parse("import"),
            Err(CommandError::Usage("import <path>"))
        );
        assert_eq!(Command::parse("exports"), Ok(Command::ListExports));
        assert_eq!(Command::parse(":ls"), Ok(Command::ListExports));
        assert_eq!(Command::parse("wq"), Ok(Command::SaveAndQuit));
    }

    #[test]
    fn test_destructive_commands_need_confirmation() {
        assert!(Command::ClearUserData.needs_confirmation());
        assert!(Command::ClearAllData.needs_confirmation());
        assert!(Command::RepopulateCatalog.needs_confirmation());
        assert!(!Command::ToggleSystem.needs_confirmation());
        assert!(Command::ClearAllData.confirmation_prompt().is_some());
    }
}
