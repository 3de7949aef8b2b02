//! Character and weight summary panel

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use encumbrance_core::{Capacity, CharacterState, WeightReport};

use crate::ui::theme::TrackerTheme;

/// Name, strength, capacity gauge and the report text
pub struct SummaryWidget<'a> {
    state: &'a CharacterState,
    report: WeightReport,
    theme: &'a TrackerTheme,
}

impl<'a> SummaryWidget<'a> {
    pub fn new(state: &'a CharacterState, report: WeightReport, theme: &'a TrackerTheme) -> Self {
        Self {
            state,
            report,
            theme,
        }
    }
}

impl Widget for SummaryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let name = if self.state.name.trim().is_empty() {
            "Unnamed Character"
        } else {
            self.state.name.as_str()
        };
        let block = Block::default()
            .title(format!(" {name} "))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Race / strength
                Constraint::Length(1), // Capacity gauge
                Constraint::Min(0),    // Report
            ])
            .split(inner);

        let race = if self.state.race.trim().is_empty() {
            "Unknown Race"
        } else {
            self.state.race.as_str()
        };
        let header = vec![
            Line::from(vec![
                Span::styled(race, Style::default().add_modifier(Modifier::DIM)),
                Span::raw(" | "),
                Span::raw(self.state.system.label()),
            ]),
            Line::from(Span::styled(
                self.state.strength_formula(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        Paragraph::new(header).render(chunks[0], buf);

        // Capacity gauge (custom system only)
        match self.report.capacity {
            Capacity::Slots { possible, used, .. } => {
                let ratio = if possible > 0 {
                    used as f64 / possible as f64
                } else if used > 0 {
                    f64::INFINITY
                } else {
                    0.0
                };
                let gauge = Gauge::default()
                    .gauge_style(Style::default().fg(self.theme.capacity_color(ratio)))
                    .ratio(ratio.clamp(0.0, 1.0))
                    .label(format!("Slots: {used}/{possible}"));
                gauge.render(chunks[1], buf);
            }
            Capacity::Classic { .. } => {
                Paragraph::new(Span::styled(
                    "No slots in Classic System.",
                    self.theme.system_style(),
                ))
                .render(chunks[1], buf);
            }
        }

        // Report text, with the warning picked out
        let report_text = self.report.to_string();
        let lines: Vec<Line> = report_text
            .lines()
            .map(|line| {
                if line.starts_with("Warning") {
                    Line::from(Span::styled(line.to_string(), self.theme.warning_style()))
                } else {
                    Line::from(line.to_string())
                }
            })
            .collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(chunks[2], buf);
    }
}
