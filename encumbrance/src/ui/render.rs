//! Render orchestration for the tracker TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use encumbrance_core::command::HELP;
use encumbrance_core::Command;

use crate::app::{App, InputMode};
use crate::ui::layout::{centered_rect, centered_rect_fixed, AppLayout};
use crate::ui::widgets::{
    CatalogWidget, HotkeyBarWidget, InputWidget, LedgerWidget, StatusBarWidget, SummaryWidget,
};

/// Which panel is focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    Ledger,
    Catalog,
}

/// Overlay types
#[derive(Debug, Clone)]
pub enum Overlay {
    Help,
    /// Printable sheet preview
    Sheet { scroll: usize },
    /// A destructive command waiting for y/n
    Confirm(Command),
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = AppLayout::calculate(area);
    let state = app.session.state();

    // Title bar
    render_title_bar(frame, app, layout.title_area);

    // Ledger
    let ledger_widget = LedgerWidget::new(&state.ledger, state.system, &app.theme)
        .selected(app.selected_row)
        .focused(matches!(app.focused_panel, FocusedPanel::Ledger));
    frame.render_widget(ledger_widget, layout.ledger_area);

    // Summary
    let summary_widget = SummaryWidget::new(state, app.session.report(), &app.theme);
    frame.render_widget(summary_widget, layout.summary_area);

    // CEL
    let catalog_widget = CatalogWidget::new(&state.catalog, app.catalog_category, &app.theme)
        .selected(app.catalog_selected)
        .focused(matches!(app.focused_panel, FocusedPanel::Catalog));
    frame.render_widget(catalog_widget, layout.catalog_area);

    // Status bar
    let status_widget = StatusBarWidget::new(
        app.session.report(),
        state.text_scale,
        app.input_mode,
        &app.theme,
    )
    .message(app.status_message());
    frame.render_widget(status_widget, layout.status_bar);

    // Hotkey bar
    let hotkey_widget = HotkeyBarWidget::new(app.focused_panel, app.input_mode, &app.theme);
    frame.render_widget(hotkey_widget, layout.hotkey_bar);

    // Input area
    render_input(frame, app, layout.input_area);

    // Render overlay if present
    if let Some(overlay) = app.overlay() {
        render_overlay(frame, app, overlay, area);
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.session.state();
    let mut spans = vec![Span::styled(
        " Encumbrance Tracker ",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw(format!("| {} ", state.system.label())));

    if app.session.report().over_encumbered() {
        spans.push(Span::styled(
            "| Warning: Over-encumbered! ",
            app.theme.warning_style(),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the input area
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = matches!(app.input_mode, InputMode::Insert | InputMode::Command);
    let is_command = matches!(app.input_mode, InputMode::Command);
    let label = app.edit_target().map(|target| target.label());

    let input_widget = InputWidget::new(app.input_buffer(), &app.theme)
        .cursor_position(app.cursor_position())
        .label(label)
        .active(is_active)
        .command_mode(is_command);

    frame.render_widget(input_widget, area);
}

/// Render overlay
fn render_overlay(frame: &mut Frame, app: &App, overlay: &Overlay, area: Rect) {
    match overlay {
        Overlay::Help => render_help_overlay(frame, app, area),
        Overlay::Sheet { scroll } => render_sheet_overlay(frame, app, *scroll, area),
        Overlay::Confirm(command) => render_confirm_overlay(frame, app, command, area),
    }
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(72, 36, area);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let underlined = Style::default().add_modifier(Modifier::UNDERLINED);
    let mut help_text = vec![
        Line::from(Span::styled(
            " Encumbrance Tracker - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Keys (NORMAL mode):", underlined)),
        Line::from("  j/k g/G     Move / jump     Tab     Switch ledger and CEL"),
        Line::from("  a           Add row         x       Delete row or entry"),
        Line::from("  e w c       Edit name / weight / quantity"),
        Line::from("  N r s       Edit character name / race / strength"),
        Line::from("  m M         Add / remove strength modifier"),
        Line::from("  t           Toggle system   + -     Text size"),
        Line::from("  S L         Save / load character   p   Sheet preview"),
        Line::from("  CEL: h/l category, Enter add, n new, w weight, R repopulate"),
        Line::from(""),
        Line::from(Span::styled("Commands:", underlined)),
    ];
    help_text.extend(
        HELP.iter()
            .map(|(usage, about)| Line::from(format!("  :{usage:<34} {about}"))),
    );
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        "Press Esc or q to close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

/// Render the printable sheet preview
fn render_sheet_overlay(frame: &mut Frame, app: &App, scroll: usize, area: Rect) {
    let popup_area = centered_rect(80, 85, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Character Sheet [j/k scroll, :print <file.html> to save] ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let offset = u16::try_from(scroll).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(app.session.sheet_text())
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));

    frame.render_widget(paragraph, popup_area);
}

/// Render a y/n confirmation
fn render_confirm_overlay(frame: &mut Frame, app: &App, command: &Command, area: Rect) {
    let popup_area = centered_rect_fixed(50, 7, area);
    frame.render_widget(Clear, popup_area);

    let question = command
        .confirmation_prompt()
        .unwrap_or("Are you sure?");

    let lines = vec![
        Line::from(question),
        Line::from(""),
        Line::from(Span::styled(
            "y: confirm    n/Esc: cancel",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(app.theme.warning_style());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}
