//! Main application state and logic

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

use encumbrance_core::{Category, Command, ItemId, Outcome, Session, SessionError};

use crate::ui::theme::TrackerTheme;
use crate::ui::{FocusedPanel, Overlay};

/// Vim-style input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - navigation and hotkeys (default)
    #[default]
    Normal,
    /// Insert mode - editing a single field
    Insert,
    /// Command mode - entering : commands
    Command,
}

/// The field an INSERT mode edit is writing to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    ItemName(ItemId),
    ItemWeight(ItemId),
    ItemQuantity(ItemId),
    CharacterName,
    Race,
    Strength,
    /// `<delta> <label>`
    Modifier,
    /// `<weight> <name>`
    NewCatalogEntry(Category),
    CatalogWeight(Category, usize),
}

impl EditTarget {
    pub fn label(&self) -> &'static str {
        match self {
            EditTarget::ItemName(_) => "Item name",
            EditTarget::ItemWeight(_) => "Weight (gp)",
            EditTarget::ItemQuantity(_) => "Quantity",
            EditTarget::CharacterName => "Character name",
            EditTarget::Race => "Race",
            EditTarget::Strength => "Strength",
            EditTarget::Modifier => "Modifier: <delta> <label>",
            EditTarget::NewCatalogEntry(_) => "New CEL entry: <weight> <name>",
            EditTarget::CatalogWeight(..) => "CEL weight (gp)",
        }
    }
}

/// File work the run loop awaits between frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingIo {
    Export(PathBuf),
    Import(PathBuf),
    ListExports(PathBuf),
    PrintHtml(PathBuf),
}

/// Split `<first> <rest>` input, leaving `rest` empty when there is no space
fn split_field(text: &str) -> (&str, &str) {
    let text = text.trim();
    text.split_once(char::is_whitespace)
        .map(|(first, rest)| (first, rest.trim()))
        .unwrap_or((text, ""))
}

/// Main application state
pub struct App {
    pub session: Session,

    // UI state
    pub theme: TrackerTheme,
    pub focused_panel: FocusedPanel,
    overlay: Option<Overlay>,
    pub selected_row: usize,
    pub catalog_category: Category,
    pub catalog_selected: usize,

    // Input state
    pub input_mode: InputMode,
    edit_target: Option<EditTarget>,
    input_buffer: String,
    cursor_position: usize,
    pub command_history: VecDeque<String>,
    pub history_index: Option<usize>,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,
    pub pending_io: Option<PendingIo>,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            theme: TrackerTheme::default(),
            focused_panel: FocusedPanel::default(),
            overlay: None,
            selected_row: 0,
            catalog_category: Category::Weapons,
            catalog_selected: 0,
            input_mode: InputMode::Normal,
            edit_target: None,
            input_buffer: String::new(),
            cursor_position: 0,
            command_history: VecDeque::with_capacity(100),
            history_index: None,
            status_message: Some("Press '?' for help, ':' for commands".to_string()),
            should_quit: false,
            pending_io: None,
        }
    }

    // =========================================================================
    // Modes
    // =========================================================================

    /// Enter command mode (starts with :)
    pub fn enter_command_mode(&mut self) {
        self.input_mode = InputMode::Command;
        self.edit_target = None;
        self.set_input(":");
    }

    /// Start editing a field, pre-filled with its current value
    pub fn begin_edit(&mut self, target: EditTarget) {
        let current = self.current_value(target);
        self.edit_target = Some(target);
        self.input_mode = InputMode::Insert;
        self.set_input(current);
    }

    /// Exit to normal mode, discarding any edit
    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.edit_target = None;
        self.clear_input();
    }

    fn current_value(&self, target: EditTarget) -> String {
        let state = self.session.state();
        match target {
            EditTarget::ItemName(id) => state
                .ledger
                .get(id)
                .map(|item| item.name.clone())
                .unwrap_or_default(),
            EditTarget::ItemWeight(id) => state
                .ledger
                .get(id)
                .map(|item| item.unit_weight.to_string())
                .unwrap_or_default(),
            EditTarget::ItemQuantity(id) => state
                .ledger
                .get(id)
                .map(|item| item.quantity.to_string())
                .unwrap_or_default(),
            EditTarget::CharacterName => state.name.clone(),
            EditTarget::Race => state.race.clone(),
            EditTarget::Strength => state.strength.to_string(),
            EditTarget::Modifier | EditTarget::NewCatalogEntry(_) => String::new(),
            EditTarget::CatalogWeight(category, index) => state
                .catalog
                .entries(category)
                .get(index)
                .map(|entry| entry.unit_weight.to_string())
                .unwrap_or_default(),
        }
    }

    /// Write the input buffer to the field being edited
    pub fn commit_edit(&mut self) {
        let Some(target) = self.edit_target.take() else {
            self.enter_normal_mode();
            return;
        };
        let text = std::mem::take(&mut self.input_buffer);
        self.cursor_position = 0;
        self.input_mode = InputMode::Normal;

        let result = match target {
            EditTarget::ItemName(id) => self.session.set_item_name(id, &text),
            EditTarget::ItemWeight(id) => self.session.set_item_weight(id, &text),
            EditTarget::ItemQuantity(id) => self.session.set_item_quantity(id, &text),
            EditTarget::CharacterName => {
                self.session.set_name(&text);
                Ok(())
            }
            EditTarget::Race => {
                self.session.set_race(&text);
                Ok(())
            }
            EditTarget::Strength => {
                self.session.set_strength(&text);
                Ok(())
            }
            EditTarget::Modifier => {
                let (delta, label) = split_field(&text);
                self.session.add_modifier(delta, label)
            }
            EditTarget::NewCatalogEntry(category) => {
                let (weight, name) = split_field(&text);
                self.session.add_catalog_entry(category, name, weight)
            }
            EditTarget::CatalogWeight(category, index) => {
                self.session.edit_catalog_weight(category, index, &text)
            }
        };

        match result {
            Ok(()) => self.set_status(format!("{} updated", target.label())),
            Err(e) => self.set_status(e.to_string()),
        }
        self.clamp_selection();
    }

    pub fn edit_target(&self) -> Option<EditTarget> {
        self.edit_target
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Submit the command line
    pub fn submit_command(&mut self) {
        let line = std::mem::take(&mut self.input_buffer);
        self.cursor_position = 0;
        self.input_mode = InputMode::Normal;
        self.history_index = None;

        if line.trim_start_matches(':').trim().is_empty() {
            return;
        }

        self.command_history.push_front(line.clone());
        if self.command_history.len() > 100 {
            self.command_history.pop_back();
        }

        match Command::parse(&line) {
            Ok(command) => self.run_command(command),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Run a command, asking first if it destroys data
    pub fn run_command(&mut self, command: Command) {
        if command.needs_confirmation() {
            self.set_overlay(Overlay::Confirm(command));
            return;
        }
        self.execute(command);
    }

    /// Run a command without confirmation
    pub fn execute(&mut self, command: Command) {
        let result = self.session.execute(command);
        self.handle_outcome(result);
        self.clamp_selection();
    }

    fn handle_outcome(&mut self, result: Result<Outcome, SessionError>) {
        match result {
            Ok(Outcome::Updated(msg)) | Ok(Outcome::Info(msg)) => self.set_status(msg),
            Ok(Outcome::Export(path)) => {
                self.set_status("Exporting...");
                self.pending_io = Some(PendingIo::Export(path));
            }
            Ok(Outcome::Import(path)) => {
                self.set_status("Importing...");
                self.pending_io = Some(PendingIo::Import(path));
            }
            Ok(Outcome::ListExports(dir)) => {
                self.set_status("Listing exports...");
                self.pending_io = Some(PendingIo::ListExports(dir));
            }
            Ok(Outcome::Print(Some(path))) => {
                self.set_status("Writing sheet...");
                self.pending_io = Some(PendingIo::PrintHtml(path));
            }
            Ok(Outcome::Print(None)) => self.set_overlay(Overlay::Sheet { scroll: 0 }),
            Ok(Outcome::Help) => self.set_overlay(Overlay::Help),
            Ok(Outcome::Quit) => self.should_quit = true,
            Err(e) => {
                tracing::debug!("Command failed: {e}");
                self.set_status(e.to_string());
            }
        }
    }

    /// Answer the open confirmation overlay
    pub fn confirm(&mut self, accepted: bool) {
        if let Some(Overlay::Confirm(command)) = self.overlay.take() {
            if accepted {
                self.execute(command);
            } else {
                self.set_status("Cancelled");
            }
        }
    }

    // =========================================================================
    // Ledger and catalog actions
    // =========================================================================

    /// Id of the highlighted ledger row
    pub fn selected_item(&self) -> Option<ItemId> {
        self.session
            .state()
            .ledger
            .items()
            .get(self.selected_row)
            .map(|item| item.id)
    }

    /// Add a blank row, select it and start naming it
    pub fn add_row(&mut self) {
        let id = self.session.add_row();
        self.focused_panel = FocusedPanel::Ledger;
        self.selected_row = self.session.state().ledger.len().saturating_sub(1);
        self.begin_edit(EditTarget::ItemName(id));
    }

    pub fn remove_selected_row(&mut self) {
        if let Some(id) = self.selected_item() {
            match self.session.remove_item(id) {
                Ok(item) => self.set_status(format!("Removed '{}'", item.name)),
                Err(e) => self.set_status(e.to_string()),
            }
            self.clamp_selection();
        }
    }

    /// Copy the highlighted CEL entry into the ledger
    pub fn add_selected_catalog_entry(&mut self) {
        match self
            .session
            .add_from_catalog(self.catalog_category, self.catalog_selected)
        {
            Ok(_) => {
                let name = self
                    .session
                    .state()
                    .ledger
                    .items()
                    .last()
                    .map(|item| item.name.clone())
                    .unwrap_or_default();
                self.selected_row = self.session.state().ledger.len().saturating_sub(1);
                self.set_status(format!("Added '{name}'"));
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    pub fn remove_selected_catalog_entry(&mut self) {
        if let Err(e) = self
            .session
            .remove_catalog_entry(self.catalog_category, self.catalog_selected)
        {
            self.set_status(e.to_string());
        }
        self.clamp_selection();
    }

    /// Move the highlight in the focused panel
    pub fn move_selection(&mut self, delta: isize) {
        match self.focused_panel {
            FocusedPanel::Ledger => {
                self.selected_row = self.selected_row.saturating_add_signed(delta);
            }
            FocusedPanel::Catalog => {
                self.catalog_selected = self.catalog_selected.saturating_add_signed(delta);
            }
        }
        self.clamp_selection();
    }

    pub fn next_category(&mut self) {
        self.catalog_category = self.catalog_category.next();
        self.catalog_selected = 0;
    }

    pub fn prev_category(&mut self) {
        self.catalog_category = self.catalog_category.prev();
        self.catalog_selected = 0;
    }

    /// Keep both highlights inside their lists
    pub fn clamp_selection(&mut self) {
        let state = self.session.state();
        let rows = state.ledger.len();
        let entries = state.catalog.entries(self.catalog_category).len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
        self.catalog_selected = self.catalog_selected.min(entries.saturating_sub(1));
    }

    pub fn cycle_focus(&mut self) {
        self.focused_panel = match self.focused_panel {
            FocusedPanel::Ledger => FocusedPanel::Catalog,
            FocusedPanel::Catalog => FocusedPanel::Ledger,
        };
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Run the auto-save timer
    pub fn tick(&mut self, now: Instant) {
        if let Err(e) = self.session.autosave_tick(now) {
            tracing::warn!("Auto-save failed: {e}");
            self.set_status(format!("Auto-save failed: {e}"));
        }
    }

    // =========================================================================
    // Input buffer
    // =========================================================================

    /// Handle a typed character (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        let byte_pos = self
            .input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len());
        self.input_buffer.insert(byte_pos, c);
        self.cursor_position += 1;
    }

    /// Handle backspace (unicode-safe)
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position)
            {
                self.input_buffer
                    .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    /// Handle delete (unicode-safe)
    pub fn delete(&mut self) {
        if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position) {
            self.input_buffer
                .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input_buffer.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input_buffer.chars().count();
    }

    /// Previous command from history
    pub fn history_prev(&mut self) {
        let next = match self.history_index {
            None => 0,
            Some(i) => (i + 1).min(self.command_history.len().saturating_sub(1)),
        };
        if let Some(entry) = self.command_history.get(next).cloned() {
            self.set_input(entry);
            self.history_index = Some(next);
        }
    }

    /// Next command from history, or back to an empty prompt
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.set_input(":");
                self.history_index = None;
            }
            Some(i) => {
                if let Some(entry) = self.command_history.get(i - 1).cloned() {
                    self.set_input(entry);
                    self.history_index = Some(i - 1);
                }
            }
        }
    }

    /// Set input buffer content and move cursor to end (unicode-safe)
    pub fn set_input(&mut self, content: impl Into<String>) {
        self.input_buffer = content.into();
        self.cursor_position = self.input_buffer.chars().count();
    }

    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }

    // =========================================================================
    // Overlays and status
    // =========================================================================

    pub fn toggle_help(&mut self) {
        if matches!(self.overlay, Some(Overlay::Help)) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Help);
        }
    }

    pub fn toggle_sheet(&mut self) {
        if matches!(self.overlay, Some(Overlay::Sheet { .. })) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Sheet { scroll: 0 });
        }
    }

    pub fn scroll_sheet(&mut self, delta: isize) {
        if let Some(Overlay::Sheet { scroll }) = &mut self.overlay {
            *scroll = scroll.saturating_add_signed(delta);
        }
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn set_overlay(&mut self, overlay: Overlay) {
        self.overlay = Some(overlay);
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Set status message (always overwrites)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }
}
