//! Equipment weight and slot tracker for tabletop characters.
//!
//! This crate provides:
//! - An equipment ledger with lenient numeric input
//! - The weight/slot calculator (custom slots or classic pounds)
//! - The Common Equipment List (CEL) of predefined items
//! - Key-value persistence, auto-save and versioned JSON export
//! - A shared command language for the TUI and headless mode
//!
//! # Quick Start
//!
//! ```ignore
//! use encumbrance_core::{Config, FileStore, Session};
//!
//! let config = Config::from_env();
//! let store = FileStore::open(&config.data_dir);
//! let mut session = Session::open(config, Box::new(store));
//!
//! let id = session.add_row();
//! session.set_item_name(id, "Rope (50 feet)")?;
//! session.set_item_weight(id, "10")?;
//! session.set_item_quantity(id, "2")?;
//! session.set_strength("10");
//!
//! println!("{}", session.report());
//! ```

pub mod autosave;
pub mod calculator;
pub mod catalog;
pub mod character;
pub mod command;
pub mod config;
pub mod equipment;
pub mod headless;
pub mod numeric;
pub mod persist;
pub mod session;
pub mod sheet;
pub mod store;
pub mod testing;

// Primary public API
pub use calculator::{calculate, Capacity, MeasurementSystem, WeightReport};
pub use catalog::{Catalog, CatalogEntry, CatalogError, Category};
pub use character::{CharacterProfile, CharacterState, StrengthModifier, TextScale};
pub use command::{Command, CommandError, Outcome};
pub use config::Config;
pub use equipment::{EquipmentItem, ItemId, Ledger, LedgerError};
pub use headless::{HeadlessTracker, ResponseKind, TrackerResponse};
pub use persist::{PersistError, SavedCharacter};
pub use session::{Session, SessionError};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreKey};
pub use testing::TestHarness;
