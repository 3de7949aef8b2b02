//! Equipment ledger table

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

use encumbrance_core::calculator::{item_slots, WEIGHT_PER_POUND};
use encumbrance_core::{Ledger, MeasurementSystem};

use crate::ui::theme::TrackerTheme;

/// The equipment rows with per-row totals
pub struct LedgerWidget<'a> {
    ledger: &'a Ledger,
    system: MeasurementSystem,
    theme: &'a TrackerTheme,
    selected: usize,
    focused: bool,
}

impl<'a> LedgerWidget<'a> {
    pub fn new(ledger: &'a Ledger, system: MeasurementSystem, theme: &'a TrackerTheme) -> Self {
        Self {
            ledger,
            system,
            theme,
            selected: 0,
            focused: false,
        }
    }

    pub fn selected(mut self, selected: usize) -> Self {
        self.selected = selected;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for LedgerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.focused {
            " Equipment [a add, e/w/c edit, x delete] "
        } else {
            " Equipment "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        if self.ledger.is_empty() {
            let hint = Line::from(Span::styled(
                "No equipment yet. Press 'a' to add a row or pick from the CEL.",
                self.theme.system_style(),
            ));
            Paragraph::new(hint).block(block).render(area, buf);
            return;
        }

        // Last column depends on the measurement system
        let last_header = match self.system {
            MeasurementSystem::Custom => "Slots",
            MeasurementSystem::Classic => "Lbs",
        };

        let header = Row::new(vec!["#", "Name", "Weight", "Qty", "Total", last_header])
            .style(self.theme.heading_style());

        let rows: Vec<Row> = self
            .ledger
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let total = item.total_weight();
                let last = match self.system {
                    MeasurementSystem::Custom => {
                        item_slots(item.unit_weight, item.quantity).to_string()
                    }
                    MeasurementSystem::Classic => format!("{:.2}", total / WEIGHT_PER_POUND),
                };
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(item.name.clone()),
                    Cell::from(format!("{}", item.unit_weight)),
                    Cell::from(format!("{}", item.quantity)),
                    Cell::from(format!("{total}")),
                    Cell::from(last),
                ])
                .style(self.theme.text_style())
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(6),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(self.theme.selected_style(self.focused))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.selected));
        StatefulWidget::render(table, area, buf, &mut state);
    }
}
