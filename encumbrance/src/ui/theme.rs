//! Color theme and styling for the tracker TUI

use ratatui::style::{Color, Modifier, Style};

/// Tracker UI color theme
#[derive(Debug, Clone)]
pub struct TrackerTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,
    pub highlight_bg: Color,

    // Capacity colors
    pub capacity_ok: Color,
    pub capacity_tight: Color,
    pub capacity_over: Color,

    // Text colors
    pub heading_text: Color,
    pub input_text: Color,
    pub system_text: Color,
}

impl Default for TrackerTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            highlight_bg: Color::DarkGray,

            capacity_ok: Color::Green,
            capacity_tight: Color::Yellow,
            capacity_over: Color::Red,

            heading_text: Color::LightYellow,
            input_text: Color::Cyan,
            system_text: Color::DarkGray,
        }
    }
}

impl TrackerTheme {
    /// Style for normal text
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    /// Style for section headings and table headers
    pub fn heading_style(&self) -> Style {
        Style::default()
            .fg(self.heading_text)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the input prompt
    pub fn input_style(&self) -> Style {
        Style::default().fg(self.input_text)
    }

    /// Style for hints and secondary text
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    /// Style for the highlighted row
    pub fn selected_style(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .bg(self.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        }
    }

    /// Capacity gauge color from the share of slots in use
    pub fn capacity_color(&self, used_ratio: f64) -> Color {
        if used_ratio > 1.0 {
            self.capacity_over
        } else if used_ratio > 0.75 {
            self.capacity_tight
        } else {
            self.capacity_ok
        }
    }

    /// Style for the over-encumbered warning
    pub fn warning_style(&self) -> Style {
        Style::default()
            .fg(self.capacity_over)
            .add_modifier(Modifier::BOLD)
    }

    /// Border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }
}
