//! Printable character sheet.
//!
//! Both renderers are pure projections of [`CharacterState`]; nothing here
//! mutates or caches.

use crate::character::CharacterState;
use std::fmt;
use std::path::Path;

const UNNAMED_CHARACTER: &str = "Unnamed Character";
const UNKNOWN_RACE: &str = "Unknown Race";
const UNNAMED_ITEM: &str = "Unnamed Item";
const NO_MODIFIERS: &str = "No modifiers";

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn modifiers_or_default(state: &CharacterState) -> String {
    if state.modifiers.is_empty() {
        NO_MODIFIERS.to_string()
    } else {
        state.modifiers_text()
    }
}

/// Plain-text sheet for terminals and headless output.
pub fn render_text(state: &CharacterState) -> String {
    TextSheet(state).to_string()
}

/// Standalone HTML document suitable for printing from a browser.
pub fn render_html(state: &CharacterState) -> String {
    HtmlSheet(state).to_string()
}

/// Escape text for inclusion in HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The plain-text sheet.
pub struct TextSheet<'a>(pub &'a CharacterState);

impl fmt::Display for TextSheet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(f, "{}", or_default(&state.name, UNNAMED_CHARACTER))?;
        writeln!(f, "{}", or_default(&state.race, UNKNOWN_RACE))?;
        writeln!(f)?;

        writeln!(f, "== Character Details ==")?;
        writeln!(f, "Strength: {}", state.effective_strength())?;
        writeln!(f, "Modifiers: {}", modifiers_or_default(state))?;
        writeln!(f, "System: {}", state.system)?;
        writeln!(f)?;

        writeln!(f, "== Equipment ==")?;
        writeln!(
            f,
            "{:<4} {:<28} {:>10} {:>8} {:>6}",
            "#", "Item", "Weight", "Qty", "Slots"
        )?;
        for (row, item) in state.ledger.iter().enumerate() {
            writeln!(
                f,
                "{:<4} {:<28} {:>10} {:>8} {:>6}",
                row + 1,
                or_default(&item.name, UNNAMED_ITEM),
                item.unit_weight,
                item.quantity,
                item.slots()
            )?;
        }
        writeln!(f)?;

        writeln!(f, "== Common Equipment List (CEL) ==")?;
        for (category, entries) in state.catalog.iter() {
            writeln!(f, "-- {} --", category.title())?;
            for entry in entries {
                writeln!(
                    f,
                    "  {:<30} {:>8}",
                    or_default(&entry.name, UNNAMED_ITEM),
                    entry.unit_weight
                )?;
            }
        }
        writeln!(f)?;

        writeln!(f, "== Weight Summary ==")?;
        writeln!(f, "{}", state.report())
    }
}

/// The printable HTML document.
pub struct HtmlSheet<'a>(pub &'a CharacterState);

impl fmt::Display for HtmlSheet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        let name = escape_html(or_default(&state.name, UNNAMED_CHARACTER));
        let race = escape_html(or_default(&state.race, UNKNOWN_RACE));
        let report = state.report();

        write!(
            f,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{name}</title>\n\
             <style>\n\
             body {{ font-family: Arial, sans-serif; font-size: {}px; }}\n\
             h1 {{ color: #333; }}\n\
             h2 {{ color: #555; }}\n\
             table {{ width: 100%; border-collapse: collapse; margin-bottom: 20px; }}\n\
             th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}\n\
             th {{ background-color: #f2f2f2; }}\n\
             .section {{ margin-bottom: 30px; }}\n\
             .warning {{ color: red; font-weight: bold; }}\n\
             </style>\n</head>\n<body>\n",
            state.text_scale.px()
        )?;

        writeln!(f, "<h1>{name}</h1>\n<h2>{race}</h2>")?;

        writeln!(f, "<div class=\"section\">\n<h2>Character Details</h2>")?;
        writeln!(
            f,
            "<p><strong>Strength:</strong> {}</p>",
            state.effective_strength()
        )?;
        writeln!(
            f,
            "<p><strong>Modifiers:</strong> {}</p>",
            escape_html(&modifiers_or_default(state))
        )?;
        writeln!(f, "<p><strong>System:</strong> {}</p>\n</div>", state.system)?;

        writeln!(
            f,
            "<div class=\"section\">\n<h2>Equipment</h2>\n<table>\n\
             <thead><tr><th>Item</th><th>Weight (Gold Pieces)</th><th>Quantity</th><th>Slots</th></tr></thead>\n<tbody>"
        )?;
        for item in state.ledger.iter() {
            writeln!(
                f,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(or_default(&item.name, UNNAMED_ITEM)),
                item.unit_weight,
                item.quantity,
                item.slots()
            )?;
        }
        writeln!(f, "</tbody>\n</table>\n</div>")?;

        writeln!(f, "<div class=\"section\">\n<h2>Common Equipment List (CEL)</h2>")?;
        for (category, entries) in state.catalog.iter() {
            writeln!(
                f,
                "<h3>{}</h3>\n<table>\n<thead><tr><th>Item</th><th>Weight (Gold Pieces)</th></tr></thead>\n<tbody>",
                category.title()
            )?;
            for entry in entries {
                writeln!(
                    f,
                    "<tr><td>{}</td><td>{}</td></tr>",
                    escape_html(or_default(&entry.name, UNNAMED_ITEM)),
                    entry.unit_weight
                )?;
            }
            writeln!(f, "</tbody>\n</table>")?;
        }
        writeln!(f, "</div>")?;

        let class = if report.over_encumbered() {
            " class=\"warning\""
        } else {
            ""
        };
        let summary = escape_html(&report.to_string()).replace('\n', "<br>");
        writeln!(
            f,
            "<div class=\"section\">\n<h2>Weight Summary</h2>\n<p{class}>{summary}</p>\n</div>"
        )?;

        writeln!(f, "</body>\n</html>")
    }
}

/// Write the HTML sheet to a file.
pub async fn write_html(state: &CharacterState, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, render_html(state)).await?;
    tracing::info!(path = %path.display(), "Wrote printable sheet");
    Ok(())
}
