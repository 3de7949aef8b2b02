//! Status bar widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use encumbrance_core::{TextScale, WeightReport};

use crate::app::InputMode;
use crate::ui::theme::TrackerTheme;
use crate::ui::FocusedPanel;

/// Status bar widget showing mode, load and the last message
pub struct StatusBarWidget<'a> {
    report: WeightReport,
    text_scale: TextScale,
    input_mode: InputMode,
    theme: &'a TrackerTheme,
    message: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(
        report: WeightReport,
        text_scale: TextScale,
        input_mode: InputMode,
        theme: &'a TrackerTheme,
    ) -> Self {
        Self {
            report,
            text_scale,
            input_mode,
            theme,
            message: None,
        }
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Input mode indicator (vim-style)
        let (input_mode_text, input_mode_style) = match self.input_mode {
            InputMode::Normal => (
                "NORMAL",
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
            InputMode::Insert => (
                "INSERT",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            InputMode::Command => (
                "COMMAND",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        };

        let load = match self.report.slots_used() {
            Some(used) => {
                let possible = used + self.report.slots_available().unwrap_or(0);
                format!("{} gp | {used}/{possible} slots", self.report.total_weight)
            }
            None => format!(
                "{} gp | {:.2} lbs",
                self.report.total_weight, self.report.pounds
            ),
        };
        let load_style = if self.report.over_encumbered() {
            self.theme.warning_style()
        } else {
            Style::default()
        };

        let mut spans = vec![
            Span::styled(format!("-- {input_mode_text} --"), input_mode_style),
            Span::raw(" | "),
            Span::styled(load, load_style),
            Span::raw(" | "),
            Span::styled(
                format!("Text {}px", self.text_scale.px()),
                self.theme.system_style(),
            ),
        ];

        if let Some(msg) = self.message {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                msg,
                Style::default().add_modifier(Modifier::DIM),
            ));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Hotkey bar widget
pub struct HotkeyBarWidget<'a> {
    focused_panel: FocusedPanel,
    input_mode: InputMode,
    theme: &'a TrackerTheme,
}

impl<'a> HotkeyBarWidget<'a> {
    pub fn new(focused_panel: FocusedPanel, input_mode: InputMode, theme: &'a TrackerTheme) -> Self {
        Self {
            focused_panel,
            input_mode,
            theme,
        }
    }
}

impl Widget for HotkeyBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let hotkeys = match self.input_mode {
            InputMode::Normal => match self.focused_panel {
                FocusedPanel::Ledger => vec![
                    ("a:add", true),
                    ("e:name", true),
                    ("w:weight", true),
                    ("c:qty", true),
                    ("x:delete", true),
                    ("s:str", true),
                    ("m:mod", true),
                    ("t:system", true),
                    ("Tab:CEL", false),
                    ("?:help", false),
                ],
                FocusedPanel::Catalog => vec![
                    ("Enter:add", true),
                    ("h/l:category", true),
                    ("n:new", true),
                    ("w:weight", true),
                    ("x:delete", true),
                    ("R:repopulate", true),
                    ("Tab:ledger", false),
                    ("?:help", false),
                ],
            },
            InputMode::Insert => vec![("Esc:cancel", true), ("Enter:save", true)],
            InputMode::Command => vec![
                ("Esc:cancel", true),
                ("Enter:execute", true),
                ("↑↓:history", false),
                (":help", false),
            ],
        };

        let spans: Vec<Span> = hotkeys
            .iter()
            .flat_map(|(text, primary)| {
                let style = if *primary {
                    self.theme.text_style()
                } else {
                    self.theme.system_style()
                };
                vec![Span::styled(*text, style), Span::raw("  ")]
            })
            .collect();

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
