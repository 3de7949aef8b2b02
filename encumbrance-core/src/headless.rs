//! Headless tracker for scripted use.
//!
//! Wraps [`Session`] so a caller can send command lines and get a response
//! back, with export, import and printing finished inline. This is what the
//! binary's `--headless` mode and the integration tests drive.
//!
//! # Example
//!
//! ```ignore
//! use encumbrance_core::headless::HeadlessTracker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tracker = HeadlessTracker::in_memory();
//!
//!     tracker.send("add Rope").await?;
//!     tracker.send("weight 1 10").await?;
//!     let response = tracker.send("status").await?;
//!     println!("{}", response.text);
//!
//!     tracker.send("export hero.json").await?;
//!     Ok(())
//! }
//! ```

use crate::command::{Command, Outcome, HELP};
use crate::config::Config;
use crate::persist::describe_saves;
use crate::session::{Session, SessionError};
use crate::store::{KeyValueStore, MemoryStore};
use std::path::PathBuf;
use std::time::Instant;

/// What kind of reply a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseKind {
    /// State changed.
    Updated,
    /// Informational only.
    Info,
    /// A file was written.
    Saved(PathBuf),
    /// A file was read.
    Loaded(PathBuf),
    /// The printable sheet as text.
    Sheet,
    Help,
    Quit,
}

/// A command's reply plus the figures a script usually checks next.
#[derive(Debug, Clone)]
pub struct TrackerResponse {
    pub kind: ResponseKind,
    pub text: String,
    pub total_weight: f64,
    /// `None` under the classic system.
    pub slots_used: Option<i64>,
    pub over_encumbered: bool,
}

/// A session driven by command lines.
pub struct HeadlessTracker {
    session: Session,
    commands_run: usize,
}

impl HeadlessTracker {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            commands_run: 0,
        }
    }

    /// Open a session over `store`, restoring the last snapshot if configured.
    pub fn open(config: Config, store: Box<dyn KeyValueStore>) -> Self {
        Self::new(Session::open(config, store))
    }

    /// A throwaway tracker: memory storage, auto-save off.
    pub fn in_memory() -> Self {
        let config = Config::new()
            .with_autosave_interval(std::time::Duration::ZERO)
            .with_restore_on_start(false);
        Self::new(Session::new(config, Box::new(MemoryStore::new())))
    }

    /// Parse and run one command line.
    pub async fn send(&mut self, line: &str) -> Result<TrackerResponse, SessionError> {
        let command = Command::parse(line)?;
        let outcome = self.session.execute(command)?;
        self.commands_run += 1;

        let (kind, text) = match outcome {
            Outcome::Updated(msg) => (ResponseKind::Updated, msg),
            Outcome::Info(msg) => (ResponseKind::Info, msg),
            Outcome::Export(path) => {
                self.session.export(&path).await?;
                let text = format!("Exported to {}", path.display());
                (ResponseKind::Saved(path), text)
            }
            Outcome::Import(path) => {
                self.session.import(&path).await?;
                let text = format!("Imported {}", path.display());
                (ResponseKind::Loaded(path), text)
            }
            Outcome::ListExports(dir) => {
                let saves = self.session.list_exports(&dir).await?;
                (ResponseKind::Info, describe_saves(&dir, &saves))
            }
            Outcome::Print(Some(path)) => {
                self.session.write_sheet_html(&path).await?;
                let text = format!("Sheet written to {}", path.display());
                (ResponseKind::Saved(path), text)
            }
            Outcome::Print(None) => (ResponseKind::Sheet, self.session.sheet_text()),
            Outcome::Help => (ResponseKind::Help, help_text()),
            Outcome::Quit => (ResponseKind::Quit, "Goodbye".to_string()),
        };

        let report = self.session.report();
        Ok(TrackerResponse {
            kind,
            text,
            total_weight: report.total_weight,
            slots_used: report.slots_used(),
            over_encumbered: report.over_encumbered(),
        })
    }

    /// Run the auto-save timer. Returns whether a snapshot was written.
    pub fn tick(&mut self, now: Instant) -> Result<bool, SessionError> {
        self.session.autosave_tick(now)
    }

    pub fn commands_run(&self) -> usize {
        self.commands_run
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}

/// The command reference, one command per line.
pub fn help_text() -> String {
    let width = HELP.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    HELP.iter()
        .map(|(usage, about)| format!("{usage:<width$}  {about}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_send_reports_figures() {
        let mut tracker = HeadlessTracker::in_memory();
        tracker.send("str 10").await.expect("str");
        tracker.send("add Rope").await.expect("add");
        tracker.send("weight 1 10").await.expect("weight");
        let response = tracker.send("qty 1 2").await.expect("qty");

        assert_eq!(response.kind, ResponseKind::Updated);
        assert_eq!(response.total_weight, 20.0);
        assert_eq!(response.slots_used, Some(1));
        assert!(!response.over_encumbered);
        assert_eq!(tracker.commands_run(), 4);
    }

    #[tokio::test]
    async fn test_errors_are_returned() {
        let mut tracker = HeadlessTracker::in_memory();
        assert!(tracker.send("rm 1").await.is_err());
        assert!(tracker.send("nonsense").await.is_err());
        assert_eq!(tracker.commands_run(), 0);
    }

    #[tokio::test]
    async fn test_print_and_help() {
        let mut tracker = HeadlessTracker::in_memory();
        let sheet = tracker.send("print").await.expect("print");
        assert_eq!(sheet.kind, ResponseKind::Sheet);
        assert!(sheet.text.starts_with("Unnamed Character"));

        let help = tracker.send("help").await.expect("help");
        assert!(help.text.contains("celnew"));
    }

    #[tokio::test]
    async fn test_print_html_to_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("sheet.html");

        let mut tracker = HeadlessTracker::in_memory();
        tracker.send("charname Ilse").await.expect("name");
        let response = tracker
            .send(&format!("print {}", path.display()))
            .await
            .expect("print");

        assert_eq!(response.kind, ResponseKind::Saved(path.clone()));
        let html = std::fs::read_to_string(&path).expect("sheet written");
        assert!(html.contains("Ilse"));
    }

    #[tokio::test]
    async fn test_list_exports() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config::new()
            .with_data_dir(temp_dir.path())
            .with_autosave_interval(std::time::Duration::ZERO)
            .with_restore_on_start(false);
        let mut tracker = HeadlessTracker::open(config, Box::new(MemoryStore::new()));

        let empty = tracker.send("exports").await.expect("exports");
        assert_eq!(empty.kind, ResponseKind::Info);
        assert!(empty.text.starts_with("No exported characters in"));

        for line in ["charname Osric", "race Dwarf", "add Battleaxe", "export"] {
            tracker.send(line).await.expect(line);
        }
        tracker.send("charname Ilse").await.expect("name");
        tracker.send("export").await.expect("export");

        let listing = tracker.send("ls").await.expect("ls");
        let lines: Vec<&str> = listing.text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Ilse (Dwarf), 1 items"));
        assert!(lines[1].ends_with("Osric (Dwarf), 1 items"));
        assert!(lines[1].contains("Osric.json"));
    }

    #[tokio::test]
    async fn test_quit() {
        let mut tracker = HeadlessTracker::in_memory();
        let response = tracker.send("q").await.expect("quit");
        assert_eq!(response.kind, ResponseKind::Quit);
    }
}
