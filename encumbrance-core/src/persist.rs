//! Character persistence for export/import and session snapshots.
//!
//! Exports are versioned JSON documents that can be shared and re-imported.
//! Session snapshots use the same validation but carry no envelope.

use crate::character::CharacterState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid save format: {0}")]
    InvalidFormat(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current export file version.
const CHARACTER_SAVE_VERSION: u32 = 1;

/// An exported character that can be re-imported later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCharacter {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the character was saved (seconds since the Unix epoch).
    pub saved_at: String,

    /// Quick-access metadata for listings.
    pub metadata: CharacterMetadata,

    /// The complete character state.
    pub character: CharacterState,
}

/// Metadata about an export, readable without loading the full state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterMetadata {
    pub name: String,
    pub race: String,
    pub item_count: usize,
    pub catalog_size: usize,
}

impl SavedCharacter {
    pub fn new(character: CharacterState) -> Self {
        let metadata = CharacterMetadata {
            name: character.name.clone(),
            race: character.race.clone(),
            item_count: character.ledger.len(),
            catalog_size: character.catalog.len(),
        };

        Self {
            version: CHARACTER_SAVE_VERSION,
            saved_at: timestamp_now(),
            metadata,
            character,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate an export document.
    pub fn from_json(content: &str) -> Result<Self, PersistError> {
        let saved: Self = serde_json::from_str(content)?;

        if saved.version != CHARACTER_SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: CHARACTER_SAVE_VERSION,
                found: saved.version,
            });
        }
        validate(&saved.character)?;

        Ok(saved)
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, self.to_json()?).await?;
        tracing::info!(path = %path.display(), "Exported character");
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let saved = Self::from_json(&content)?;
        tracing::info!(path = %path.display(), "Imported character");
        Ok(saved)
    }

    /// Get metadata without loading the full character.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<CharacterMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: CharacterMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;

        if partial.version != CHARACTER_SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: CHARACTER_SAVE_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.metadata)
    }
}

/// Serialize the full state for the key-value store.
pub fn encode_state(state: &CharacterState) -> Result<String, PersistError> {
    Ok(serde_json::to_string(state)?)
}

/// Restore a state written by [`encode_state`].
pub fn decode_state(content: &str) -> Result<CharacterState, PersistError> {
    let state: CharacterState = serde_json::from_str(content)?;
    validate(&state)?;
    Ok(state)
}

/// Check invariants serde cannot express.
fn validate(state: &CharacterState) -> Result<(), PersistError> {
    if let Some(item) = state
        .ledger
        .iter()
        .find(|item| !item.unit_weight.is_finite())
    {
        return Err(PersistError::InvalidFormat(format!(
            "equipment '{}' has a non-finite weight",
            item.name
        )));
    }

    for (category, entries) in state.catalog.iter() {
        if let Some(entry) = entries
            .iter()
            .find(|e| !e.unit_weight.is_finite() || e.unit_weight < 0.0)
        {
            return Err(PersistError::InvalidFormat(format!(
                "{category} entry '{}' has an invalid weight",
                entry.name
            )));
        }
    }

    if !state.text_scale.is_valid() {
        return Err(PersistError::InvalidFormat(format!(
            "text scale {} is out of range",
            state.text_scale.px()
        )));
    }

    Ok(())
}

/// Information about an export file.
#[derive(Debug, Clone)]
pub struct CharacterSaveInfo {
    pub path: String,
    pub metadata: CharacterMetadata,
}

impl fmt::Display for CharacterSaveInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.metadata.name.trim().is_empty() {
            "Unnamed Character"
        } else {
            self.metadata.name.as_str()
        };
        write!(f, "{}: {name}", self.path)?;
        if !self.metadata.race.trim().is_empty() {
            write!(f, " ({})", self.metadata.race)?;
        }
        write!(f, ", {} items", self.metadata.item_count)
    }
}

/// One line per export, or a note that `dir` holds none.
pub fn describe_saves(dir: impl AsRef<Path>, saves: &[CharacterSaveInfo]) -> String {
    if saves.is_empty() {
        return format!("No exported characters in {}", dir.as_ref().display());
    }
    saves
        .iter()
        .map(|save| save.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// List all export files in a directory, sorted by character name.
pub async fn list_character_saves(
    dir: impl AsRef<Path>,
) -> Result<Vec<CharacterSaveInfo>, PersistError> {
    let mut saves = Vec::new();

    // Create the directory if it doesn't exist
    let dir_path = dir.as_ref();
    if !dir_path.exists() {
        fs::create_dir_all(dir_path).await?;
        return Ok(saves);
    }

    let mut entries = fs::read_dir(dir_path).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            match SavedCharacter::peek_metadata(&path).await {
                Ok(metadata) => saves.push(CharacterSaveInfo {
                    path: path.to_string_lossy().to_string(),
                    metadata,
                }),
                Err(e) => tracing::debug!(path = %path.display(), "Skipping file: {e}"),
            }
        }
    }

    saves.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
    Ok(saves)
}

/// Generate an export path for a character.
pub fn character_save_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let sanitized = if name.trim().is_empty() {
        "character_data".to_string()
    } else {
        name.chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect::<String>()
    };
    dir.as_ref().join(format!("{sanitized}.json"))
}

fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", now.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::MeasurementSystem;
    use crate::catalog::Category;
    use crate::character::{StrengthModifier, TextScale};
    use crate::testing::sample_state;
    use tempfile::TempDir;

    #[test]
    fn test_saved_character_metadata() {
        let saved = SavedCharacter::new(sample_state());

        assert_eq!(saved.version, CHARACTER_SAVE_VERSION);
        assert_eq!(saved.metadata.name, "Brannoc");
        assert_eq!(saved.metadata.race, "Half-Orc");
        assert_eq!(saved.metadata.item_count, 3);
        assert_eq!(saved.metadata.catalog_size, 65);
    }

    #[test]
    fn test_encode_decode_state_round_trip() {
        let mut state = sample_state();
        state.system = MeasurementSystem::Classic;
        state.text_scale = TextScale::new(22.0);
        state
            .modifiers
            .push(StrengthModifier::new("Gauntlets of Ogre Power", 3));
        state
            .catalog
            .add_entry(Category::Misc, "Lute", "3")
            .expect("valid entry");

        let encoded = encode_state(&state).expect("encode should succeed");
        let decoded = decode_state(&encoded).expect("decode should succeed");

        assert_eq!(decoded, state);
        assert_eq!(decoded.report(), state.report());
    }

    #[test]
    fn test_export_has_no_derived_fields() {
        let json = SavedCharacter::new(sample_state())
            .to_json()
            .expect("serialize");
        assert!(!json.contains("total_weight"));
        assert!(!json.contains("slots"));
        assert!(!json.contains("effective_strength"));
    }

    #[test]
    fn test_from_json_rejects_version_mismatch() {
        let mut saved = SavedCharacter::new(sample_state());
        saved.version = 99;
        let json = serde_json::to_string(&saved).unwrap();

        match SavedCharacter::from_json(&json) {
            Err(PersistError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, CHARACTER_SAVE_VERSION);
                assert_eq!(found, 99);
            }
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_bad_text_scale() {
        let mut value = serde_json::to_value(sample_state()).unwrap();
        value["text_scale"] = serde_json::json!(400.0);

        let result = decode_state(&value.to_string());
        assert!(matches!(result, Err(PersistError::InvalidFormat(_))));
    }

    #[test]
    fn test_decode_rejects_negative_catalog_weight() {
        let mut value = serde_json::to_value(sample_state()).unwrap();
        value["catalog"]["gems"][0]["unit_weight"] = serde_json::json!(-1.0);

        let result = decode_state(&value.to_string());
        assert!(matches!(result, Err(PersistError::InvalidFormat(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_category() {
        let mut value = serde_json::to_value(sample_state()).unwrap();
        value["catalog"]["food"] = serde_json::json!([]);

        assert!(matches!(
            decode_state(&value.to_string()),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn test_decode_accepts_standard_system_label() {
        let mut value = serde_json::to_value(sample_state()).unwrap();
        value["system"] = serde_json::json!("standard");

        let state = decode_state(&value.to_string()).expect("alias should parse");
        assert_eq!(state.system, MeasurementSystem::Classic);
    }

    #[test]
    fn test_character_save_path() {
        let path = character_save_path("/saves", "Sir Reginald!");
        assert!(path.to_string_lossy().ends_with("Sir_Reginald_.json"));

        let unnamed = character_save_path("/saves", "  ");
        assert!(unnamed.to_string_lossy().ends_with("character_data.json"));
    }

    #[tokio::test]
    async fn test_save_and_load_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let save_path = temp_dir.path().join("exports").join("brannoc.json");

        let state = sample_state();
        SavedCharacter::new(state.clone())
            .save_json(&save_path)
            .await
            .expect("Save should succeed");
        assert!(save_path.exists());

        let loaded = SavedCharacter::load_json(&save_path)
            .await
            .expect("Load should succeed");

        assert_eq!(loaded.character, state);
        assert_eq!(loaded.character.ledger.items(), state.ledger.items());
        assert_eq!(loaded.character.catalog, state.catalog);
    }

    #[tokio::test]
    async fn test_peek_metadata() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let save_path = temp_dir.path().join("peek.json");

        SavedCharacter::new(sample_state())
            .save_json(&save_path)
            .await
            .expect("Save should succeed");

        let metadata = SavedCharacter::peek_metadata(&save_path)
            .await
            .expect("Peek should succeed");
        assert_eq!(metadata.name, "Brannoc");
        assert_eq!(metadata.item_count, 3);
    }

    #[tokio::test]
    async fn test_list_character_saves() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("characters");
        std::fs::create_dir_all(&dir).expect("Create dir should succeed");

        for name in ["Charlie", "Alpha", "Beta"] {
            let mut state = sample_state();
            state.name = name.to_string();
            SavedCharacter::new(state)
                .save_json(character_save_path(&dir, name))
                .await
                .expect("Save should succeed");
        }
        std::fs::write(dir.join("junk.json"), "{}").expect("write junk");

        let saves = list_character_saves(&dir)
            .await
            .expect("List should succeed");
        let names: Vec<_> = saves.iter().map(|s| s.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Charlie"]);
    }

    #[tokio::test]
    async fn test_list_character_saves_creates_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("missing");

        let saves = list_character_saves(&dir)
            .await
            .expect("List should succeed");
        assert!(saves.is_empty());
        assert!(dir.exists());
    }
}
