//! TUI widgets for the tracker

pub mod catalog;
pub mod input;
pub mod ledger;
pub mod status_bar;
pub mod summary;

pub use catalog::CatalogWidget;
pub use input::InputWidget;
pub use ledger::LedgerWidget;
pub use status_bar::{HotkeyBarWidget, StatusBarWidget};
pub use summary::SummaryWidget;
