//! Session - the single owner of a [`CharacterState`].
//!
//! Every mutation from the TUI, headless mode or tests goes through here.
//! The session also owns the key-value store and the auto-save timer.

use crate::autosave::AutoSave;
use crate::calculator::WeightReport;
use crate::catalog::{CatalogError, Category};
use crate::character::{CharacterProfile, CharacterState, StrengthModifier};
use crate::command::{Command, CommandError, Outcome};
use crate::config::Config;
use crate::equipment::{EquipmentItem, ItemId, LedgerError};
use crate::numeric::{parse_quantity, parse_weight};
use crate::persist::{
    character_save_path, decode_state, encode_state, list_character_saves, CharacterSaveInfo,
    PersistError, SavedCharacter,
};
use crate::sheet;
use crate::store::{KeyValueStore, StoreError, StoreKey};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Errors from session operations. None of them are fatal.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Please enter a modifier label.")]
    MissingLabel,

    #[error("No modifier {0}")]
    NoModifier(usize),

    #[error("No saved {0} found.")]
    NothingSaved(&'static str),
}

pub struct Session {
    config: Config,
    state: CharacterState,
    store: Box<dyn KeyValueStore>,
    autosave: AutoSave,
}

impl Session {
    /// A session with default state. Nothing is restored.
    pub fn new(config: Config, store: Box<dyn KeyValueStore>) -> Self {
        let autosave = AutoSave::new(config.autosave_interval, Instant::now());
        Self {
            config,
            state: CharacterState::new(),
            store,
            autosave,
        }
    }

    /// A session restored from the last snapshot when the config asks for it.
    ///
    /// A missing or unreadable snapshot starts fresh with the default catalog.
    pub fn open(config: Config, store: Box<dyn KeyValueStore>) -> Self {
        let restore = config.restore_on_start;
        let mut session = Self::new(config, store);

        if restore {
            match session.restore_session() {
                Ok(()) => tracing::info!(
                    items = session.state.ledger.len(),
                    "Restored previous session"
                ),
                Err(SessionError::NothingSaved(_)) => {
                    tracing::debug!("No previous session, starting fresh")
                }
                Err(e) => tracing::warn!("Could not restore previous session: {e}"),
            }
        }

        session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    /// Swap in a whole new state (fixtures, imports).
    pub fn replace_state(&mut self, state: CharacterState) {
        self.state = state;
    }

    /// Derived weight figures for the current state.
    pub fn report(&self) -> WeightReport {
        self.state.report()
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    /// Append a blank row (weight 0, quantity 1).
    pub fn add_row(&mut self) -> ItemId {
        self.add_item(EquipmentItem::blank())
    }

    pub fn add_item(&mut self, item: EquipmentItem) -> ItemId {
        tracing::debug!(name = %item.name, "Adding equipment row");
        self.state.ledger.push(item)
    }

    pub fn remove_item(&mut self, id: ItemId) -> Result<EquipmentItem, SessionError> {
        let item = self.state.ledger.remove(id)?;
        tracing::debug!(name = %item.name, "Removed equipment row");
        Ok(item)
    }

    /// Remove by 1-based row number.
    pub fn remove_row(&mut self, row: usize) -> Result<EquipmentItem, SessionError> {
        let id = self.state.ledger.id_at_row(row)?;
        self.remove_item(id)
    }

    pub fn set_item_name(&mut self, id: ItemId, name: &str) -> Result<(), SessionError> {
        self.item_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Set a row's unit weight from raw text. Non-numeric text becomes 0.
    pub fn set_item_weight(&mut self, id: ItemId, text: &str) -> Result<(), SessionError> {
        self.item_mut(id)?.unit_weight = parse_weight(text);
        Ok(())
    }

    /// Set a row's quantity from raw text. Non-numeric text becomes 0.
    pub fn set_item_quantity(&mut self, id: ItemId, text: &str) -> Result<(), SessionError> {
        self.item_mut(id)?.quantity = parse_quantity(text);
        Ok(())
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut EquipmentItem, SessionError> {
        self.state
            .ledger
            .get_mut(id)
            .ok_or(SessionError::Ledger(LedgerError::NotFound(id)))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Copy a catalog entry (0-based index) into a new row with quantity 1.
    pub fn add_from_catalog(
        &mut self,
        category: Category,
        index: usize,
    ) -> Result<ItemId, SessionError> {
        let entry = self.state.catalog.entry(category, index)?;
        let item = EquipmentItem::new(entry.name.clone(), entry.unit_weight, 1);
        Ok(self.add_item(item))
    }

    pub fn add_catalog_entry(
        &mut self,
        category: Category,
        name: &str,
        weight_text: &str,
    ) -> Result<(), SessionError> {
        let entry = self.state.catalog.add_entry(category, name, weight_text)?;
        tracing::info!(%category, name = %entry.name, "Added catalog entry");
        Ok(())
    }

    pub fn edit_catalog_weight(
        &mut self,
        category: Category,
        index: usize,
        weight_text: &str,
    ) -> Result<(), SessionError> {
        self.state
            .catalog
            .edit_weight(category, index, weight_text)?;
        Ok(())
    }

    pub fn remove_catalog_entry(
        &mut self,
        category: Category,
        index: usize,
    ) -> Result<(), SessionError> {
        let entry = self.state.catalog.remove_entry(category, index)?;
        tracing::info!(%category, name = %entry.name, "Removed catalog entry");
        Ok(())
    }

    pub fn repopulate_catalog(&mut self) {
        self.state.catalog.repopulate();
        tracing::info!("Catalog reset to defaults");
    }

    // =========================================================================
    // Character
    // =========================================================================

    pub fn set_name(&mut self, name: &str) {
        self.state.name = name.trim().to_string();
    }

    pub fn set_race(&mut self, race: &str) {
        self.state.race = race.trim().to_string();
    }

    /// Set the base strength from raw text. Non-numeric text becomes 0.
    pub fn set_strength(&mut self, text: &str) {
        self.state.strength = parse_quantity(text);
    }

    pub fn add_modifier(&mut self, delta_text: &str, label: &str) -> Result<(), SessionError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(SessionError::MissingLabel);
        }
        self.state
            .modifiers
            .push(StrengthModifier::new(label, parse_quantity(delta_text)));
        Ok(())
    }

    /// Remove a modifier by 0-based index.
    pub fn remove_modifier(&mut self, index: usize) -> Result<StrengthModifier, SessionError> {
        if index >= self.state.modifiers.len() {
            return Err(SessionError::NoModifier(index + 1));
        }
        Ok(self.state.modifiers.remove(index))
    }

    // =========================================================================
    // Display
    // =========================================================================

    pub fn toggle_system(&mut self) {
        self.state.system = self.state.system.toggled();
    }

    pub fn increase_text_size(&mut self) {
        self.state.text_scale = self.state.text_scale.increased();
    }

    pub fn decrease_text_size(&mut self) {
        self.state.text_scale = self.state.text_scale.decreased();
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Save name, race and equipment under the `character` key.
    pub fn save_profile(&mut self) -> Result<(), SessionError> {
        let json = serde_json::to_string(&self.state.profile()).map_err(PersistError::from)?;
        self.store.save(StoreKey::Profile, &json)?;
        tracing::info!(name = %self.state.name, "Saved character profile");
        Ok(())
    }

    pub fn load_profile(&mut self) -> Result<(), SessionError> {
        let json = self
            .store
            .load(StoreKey::Profile)?
            .ok_or(SessionError::NothingSaved("character data"))?;
        let profile: CharacterProfile = serde_json::from_str(&json).map_err(PersistError::from)?;
        self.state.apply_profile(profile);
        tracing::info!(name = %self.state.name, "Loaded character profile");
        Ok(())
    }

    /// Snapshot the full state under the `characterState` key.
    pub fn save_session(&mut self) -> Result<(), SessionError> {
        self.save_session_at(Instant::now())
    }

    fn save_session_at(&mut self, now: Instant) -> Result<(), SessionError> {
        let json = encode_state(&self.state)?;
        self.store.save(StoreKey::Session, &json)?;
        self.autosave.mark_saved(now);
        tracing::debug!("Session snapshot written");
        Ok(())
    }

    pub fn restore_session(&mut self) -> Result<(), SessionError> {
        let json = self
            .store
            .load(StoreKey::Session)?
            .ok_or(SessionError::NothingSaved("session"))?;
        self.state = decode_state(&json)?;
        Ok(())
    }

    /// Snapshot the session if the auto-save interval has elapsed.
    ///
    /// Returns whether a snapshot was written.
    pub fn autosave_tick(&mut self, now: Instant) -> Result<bool, SessionError> {
        if !self.autosave.due(now) {
            return Ok(false);
        }
        self.save_session_at(now)?;
        tracing::debug!("Auto-saved session");
        Ok(true)
    }

    /// Reset identity, strength, modifiers and equipment. The catalog stays.
    ///
    /// The stored snapshot is dropped first; if that fails nothing changes.
    pub fn clear_user_data(&mut self) -> Result<(), SessionError> {
        self.store.remove(StoreKey::Session)?;
        self.state.clear_user_data();
        tracing::info!("Cleared user data");
        Ok(())
    }

    /// [`Session::clear_user_data`] plus an empty catalog.
    pub fn clear_all_data(&mut self) -> Result<(), SessionError> {
        self.clear_user_data()?;
        self.state.catalog.clear();
        tracing::info!("Cleared all data");
        Ok(())
    }

    /// Where `export` writes when no path is given.
    pub fn default_export_path(&self) -> PathBuf {
        character_save_path(self.config.exports_dir(), &self.state.name)
    }

    pub async fn export(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        SavedCharacter::new(self.state.clone())
            .save_json(path)
            .await?;
        Ok(())
    }

    /// Replace the whole state with an exported file. On failure nothing changes.
    pub async fn import(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let saved = SavedCharacter::load_json(path).await?;
        self.state = saved.character;
        Ok(())
    }

    /// Exported characters in `dir`, sorted by name.
    pub async fn list_exports(
        &self,
        dir: impl AsRef<Path>,
    ) -> Result<Vec<CharacterSaveInfo>, SessionError> {
        Ok(list_character_saves(dir).await?)
    }

    pub fn sheet_text(&self) -> String {
        sheet::render_text(&self.state)
    }

    pub async fn write_sheet_html(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        sheet::write_html(&self.state, path).await?;
        Ok(())
    }

    /// One-line status for the status bar and `status` command.
    pub fn status_line(&self) -> String {
        let report = self.report();
        match report.slots_used() {
            Some(used) => format!(
                "{} | {} gp | {}/{} slots{}",
                self.state.strength_formula(),
                report.total_weight,
                used,
                self.state.effective_strength(),
                if report.over_encumbered() {
                    " | OVER-ENCUMBERED"
                } else {
                    ""
                }
            ),
            None => format!(
                "{} | {} gp | {:.2} lbs",
                self.state.strength_formula(),
                report.total_weight,
                report.pounds
            ),
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Apply a parsed command.
    ///
    /// Export, import and HTML printing need async I/O, so they come back as
    /// outcomes for the caller to finish with [`Session::export`],
    /// [`Session::import`] or [`Session::write_sheet_html`].
    pub fn execute(&mut self, command: Command) -> Result<Outcome, SessionError> {
        tracing::debug!(?command, "Executing command");

        let outcome = match command {
            Command::AddRow { name } => {
                let mut item = EquipmentItem::blank();
                if let Some(name) = name {
                    item.name = name;
                }
                self.add_item(item);
                Outcome::Updated(format!("Added row {}", self.state.ledger.len()))
            }
            Command::RemoveRow { row } => {
                let item = self.remove_row(row)?;
                Outcome::Updated(format!("Removed '{}'", item.name))
            }
            Command::SetItemName { row, name } => {
                let id = self.state.ledger.id_at_row(row)?;
                self.set_item_name(id, &name)?;
                Outcome::Updated(format!("Row {row} renamed"))
            }
            Command::SetItemWeight { row, weight } => {
                let id = self.state.ledger.id_at_row(row)?;
                self.set_item_weight(id, &weight)?;
                Outcome::Updated(format!("Row {row} weight updated"))
            }
            Command::SetItemQuantity { row, quantity } => {
                let id = self.state.ledger.id_at_row(row)?;
                self.set_item_quantity(id, &quantity)?;
                Outcome::Updated(format!("Row {row} quantity updated"))
            }

            Command::AddFromCatalog { category, entry } => {
                self.add_from_catalog(category, entry - 1)?;
                let name = self
                    .state
                    .ledger
                    .items()
                    .last()
                    .map(|item| item.name.clone())
                    .unwrap_or_default();
                Outcome::Updated(format!("Added '{name}'"))
            }
            Command::NewCatalogEntry {
                category,
                weight,
                name,
            } => {
                self.add_catalog_entry(category, &name, &weight)?;
                Outcome::Updated(format!("Added '{}' to {}", name.trim(), category.title()))
            }
            Command::EditCatalogWeight {
                category,
                entry,
                weight,
            } => {
                self.edit_catalog_weight(category, entry - 1, &weight)?;
                Outcome::Updated(format!("{} entry {entry} weight updated", category.title()))
            }
            Command::RemoveCatalogEntry { category, entry } => {
                self.remove_catalog_entry(category, entry - 1)?;
                Outcome::Updated(format!("{} entry {entry} deleted", category.title()))
            }
            Command::RepopulateCatalog => {
                self.repopulate_catalog();
                Outcome::Updated("CEL repopulated with default data".to_string())
            }

            Command::SetCharacterName(name) => {
                self.set_name(&name);
                Outcome::Updated("Character name updated".to_string())
            }
            Command::SetRace(race) => {
                self.set_race(&race);
                Outcome::Updated("Race updated".to_string())
            }
            Command::SetStrength(text) => {
                self.set_strength(&text);
                Outcome::Updated(self.state.strength_formula())
            }
            Command::AddModifier { delta, label } => {
                self.add_modifier(&delta, &label)?;
                Outcome::Updated(self.state.strength_formula())
            }
            Command::RemoveModifier { index } => {
                self.remove_modifier(index - 1)?;
                Outcome::Updated(self.state.strength_formula())
            }

            Command::ToggleSystem => {
                self.toggle_system();
                Outcome::Updated(self.state.system.label().to_string())
            }
            Command::IncreaseTextSize => {
                self.increase_text_size();
                Outcome::Updated(format!("Text size {}px", self.state.text_scale.px()))
            }
            Command::DecreaseTextSize => {
                self.decrease_text_size();
                Outcome::Updated(format!("Text size {}px", self.state.text_scale.px()))
            }

            Command::SaveProfile => {
                self.save_profile()?;
                Outcome::Info("Character saved!".to_string())
            }
            Command::LoadProfile => {
                self.load_profile()?;
                Outcome::Updated("Character loaded!".to_string())
            }
            Command::SaveSession => {
                self.save_session()?;
                Outcome::Info("Session saved".to_string())
            }
            Command::RestoreSession => {
                self.restore_session()?;
                Outcome::Updated("Session restored".to_string())
            }
            Command::Export(path) => {
                Outcome::Export(path.unwrap_or_else(|| self.default_export_path()))
            }
            Command::Import(path) => Outcome::Import(path),
            Command::ListExports => Outcome::ListExports(self.config.exports_dir()),
            Command::ClearUserData => {
                self.clear_user_data()?;
                Outcome::Updated("User data cleared.".to_string())
            }
            Command::ClearAllData => {
                self.clear_all_data()?;
                Outcome::Updated("All data cleared.".to_string())
            }

            Command::Print(path) => Outcome::Print(path),
            Command::Status => Outcome::Info(self.status_line()),
            Command::Help => Outcome::Help,
            Command::Quit => Outcome::Quit,
            Command::SaveAndQuit => {
                self.save_session()?;
                Outcome::Quit
            }
        };

        Ok(outcome)
    }
}
