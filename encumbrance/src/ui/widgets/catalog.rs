//! Common Equipment List browser

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Tabs, Widget},
};

use encumbrance_core::{Catalog, Category};

use crate::ui::theme::TrackerTheme;

/// One CEL category at a time, with tabs to switch
pub struct CatalogWidget<'a> {
    catalog: &'a Catalog,
    category: Category,
    theme: &'a TrackerTheme,
    selected: usize,
    focused: bool,
}

impl<'a> CatalogWidget<'a> {
    pub fn new(catalog: &'a Catalog, category: Category, theme: &'a TrackerTheme) -> Self {
        Self {
            catalog,
            category,
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

impl Widget for CatalogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.focused {
            " Common Equipment List [h/l category, Enter add, n new] "
        } else {
            " Common Equipment List "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));

        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        // Category tabs
        let index = Category::ALL
            .iter()
            .position(|c| *c == self.category)
            .unwrap_or(0);
        let tabs = Tabs::new(Category::ALL.iter().map(|c| c.title()))
            .select(index)
            .style(self.theme.system_style())
            .highlight_style(self.theme.heading_style())
            .divider("|");
        tabs.render(chunks[0], buf);

        let entries = self.catalog.entries(self.category);
        if entries.is_empty() {
            let hint = Line::from(Span::styled(
                "Empty. Press 'n' to add an entry or 'R' to repopulate.",
                self.theme.system_style(),
            ));
            Paragraph::new(hint).render(chunks[1], buf);
            return;
        }

        let items: Vec<ListItem> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                ListItem::new(format!("{:>2}. {} ({} gp)", i + 1, entry.name, entry.unit_weight))
            })
            .collect();

        let list = List::new(items)
            .style(self.theme.text_style())
            .highlight_style(self.theme.selected_style(self.focused))
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(self.selected));
        StatefulWidget::render(list, chunks[1], buf, &mut state);
    }
}
