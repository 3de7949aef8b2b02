//! Event handling for the tracker TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use encumbrance_core::Command;

use crate::app::{App, EditTarget, InputMode};
use crate::ui::{FocusedPanel, Overlay};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a mouse event
fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.move_selection(-1);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.move_selection(1);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    let result = match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    };

    if app.should_quit {
        EventResult::Quit
    } else {
        result
    }
}

/// Handle keys in NORMAL mode (vim-style navigation and hotkeys)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char(':') => app.enter_command_mode(),
        KeyCode::Char('?') | KeyCode::F(1) => app.toggle_help(),
        KeyCode::Char('q') => return EventResult::Quit,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char('g') | KeyCode::Home => app.move_selection(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => app.move_selection(isize::MAX),
        KeyCode::Tab | KeyCode::BackTab => app.cycle_focus(),

        // Character
        KeyCode::Char('N') => app.begin_edit(EditTarget::CharacterName),
        KeyCode::Char('r') => app.begin_edit(EditTarget::Race),
        KeyCode::Char('s') => app.begin_edit(EditTarget::Strength),
        KeyCode::Char('m') => app.begin_edit(EditTarget::Modifier),
        KeyCode::Char('M') => {
            let count = app.session.state().modifiers.len();
            if count > 0 {
                app.execute(Command::RemoveModifier { index: count });
            } else {
                app.set_status("No modifiers to remove");
            }
        }

        // Display
        KeyCode::Char('t') => app.execute(Command::ToggleSystem),
        KeyCode::Char('+') | KeyCode::Char('=') => app.execute(Command::IncreaseTextSize),
        KeyCode::Char('-') => app.execute(Command::DecreaseTextSize),
        KeyCode::Char('p') => app.toggle_sheet(),

        // Persistence
        KeyCode::Char('S') => app.execute(Command::SaveProfile),
        KeyCode::Char('L') => app.execute(Command::LoadProfile),

        _ => {
            return match app.focused_panel {
                FocusedPanel::Ledger => handle_ledger_keys(app, key),
                FocusedPanel::Catalog => handle_catalog_keys(app, key),
            }
        }
    }
    EventResult::NeedsRedraw
}

/// Handle ledger hotkeys (normal mode)
fn handle_ledger_keys(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('a') | KeyCode::Char('o') => app.add_row(),
        KeyCode::Char('x') | KeyCode::Char('d') | KeyCode::Delete => app.remove_selected_row(),
        KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('i') => {
            if let Some(id) = app.selected_item() {
                app.begin_edit(EditTarget::ItemName(id));
            }
        }
        KeyCode::Char('w') => {
            if let Some(id) = app.selected_item() {
                app.begin_edit(EditTarget::ItemWeight(id));
            }
        }
        KeyCode::Char('c') => {
            if let Some(id) = app.selected_item() {
                app.begin_edit(EditTarget::ItemQuantity(id));
            }
        }
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle CEL hotkeys (normal mode)
fn handle_catalog_keys(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.prev_category(),
        KeyCode::Char('l') | KeyCode::Right => app.next_category(),
        KeyCode::Enter | KeyCode::Char('a') => app.add_selected_catalog_entry(),
        KeyCode::Char('n') => app.begin_edit(EditTarget::NewCatalogEntry(app.catalog_category)),
        KeyCode::Char('w') => {
            if !app
                .session
                .state()
                .catalog
                .entries(app.catalog_category)
                .is_empty()
            {
                app.begin_edit(EditTarget::CatalogWeight(
                    app.catalog_category,
                    app.catalog_selected,
                ));
            }
        }
        KeyCode::Char('x') | KeyCode::Char('d') | KeyCode::Delete => {
            app.remove_selected_catalog_entry()
        }
        KeyCode::Char('R') => app.run_command(Command::RepopulateCatalog),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle keys in INSERT mode (field editing)
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => app.enter_normal_mode(),
        KeyCode::Enter => app.commit_edit(),

        // Input editing
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Char(c) => app.type_char(c),

        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle keys in COMMAND mode (: commands)
fn handle_command_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => app.enter_normal_mode(),
        KeyCode::Enter => app.submit_command(),

        // Input editing
        KeyCode::Left => {
            if app.cursor_position() > 1 {
                app.cursor_left();
            }
        }
        KeyCode::Right => app.cursor_right(),
        KeyCode::Backspace => {
            if app.cursor_position() > 1 {
                app.backspace();
            } else if app.input_buffer().len() <= 1 {
                // Backspace on just ":" exits command mode
                app.enter_normal_mode();
            }
        }
        KeyCode::Up => app.history_prev(),
        KeyCode::Down => app.history_next(),
        KeyCode::Char(c) => app.type_char(c),

        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle key when overlay is open
fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match app.overlay() {
        Some(Overlay::Confirm(_)) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                app.confirm(false)
            }
            _ => return EventResult::Continue,
        },
        Some(Overlay::Sheet { .. }) => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.scroll_sheet(1),
            KeyCode::Char('k') | KeyCode::Up => app.scroll_sheet(-1),
            KeyCode::PageDown => app.scroll_sheet(10),
            KeyCode::PageUp => app.scroll_sheet(-10),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('p') => app.close_overlay(),
            _ => return EventResult::Continue,
        },
        Some(Overlay::Help) | None => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Enter => {
                app.close_overlay()
            }
            _ => return EventResult::Continue,
        },
    }
    EventResult::NeedsRedraw
}

#[cfg(test)]
mod tests {
    use super::*;
    use encumbrance_core::{Config, MemoryStore, Session};
    use std::time::Duration;

    fn test_app() -> App {
        let config = Config::new()
            .with_autosave_interval(Duration::ZERO)
            .with_restore_on_start(false);
        App::new(Session::new(config, Box::new(MemoryStore::new())))
    }

    fn press(app: &mut App, code: KeyCode) -> EventResult {
        handle_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_keys(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_add_and_name_row_with_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        type_keys(&mut app, "Rope");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Backspace);
        type_keys(&mut app, "10");
        press(&mut app, KeyCode::Enter);

        let item = &app.session.state().ledger.items()[0];
        assert_eq!(item.name, "Rope");
        assert_eq!(item.unit_weight, 10.0);
        assert_eq!(app.session.report().total_weight, 10.0);
    }

    #[test]
    fn test_catalog_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_panel, FocusedPanel::Catalog);

        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);

        let item = &app.session.state().ledger.items()[0];
        assert_eq!(item.name, "Chainmail");
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_command_mode_quit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char(':'));
        type_keys(&mut app, "q");
        assert_eq!(press(&mut app, KeyCode::Enter), EventResult::Quit);
    }

    #[test]
    fn test_escape_discards_edit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('N'));
        type_keys(&mut app, "Brannoc");
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.session.state().name.is_empty());
    }

    #[test]
    fn test_repopulate_needs_confirmation() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('x'));
        let size = app.session.state().catalog.len();
        assert_eq!(size, 64);

        press(&mut app, KeyCode::Char('R'));
        assert!(matches!(app.overlay(), Some(Overlay::Confirm(_))));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.session.state().catalog.len(), 65);
    }
}
