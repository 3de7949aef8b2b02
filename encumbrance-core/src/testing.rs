//! Testing utilities.
//!
//! - `sample_state` for a known character with a small ledger
//! - `TestHarness` for scripted sessions over an in-memory store

use crate::character::CharacterState;
use crate::command::{Command, Outcome};
use crate::config::Config;
use crate::equipment::EquipmentItem;
use crate::session::{Session, SessionError};
use crate::store::MemoryStore;
use std::time::Duration;

/// A Half-Orc with strength 10 carrying 29 gp of gear (one slot).
pub fn sample_state() -> CharacterState {
    let mut state = CharacterState::new();
    state.name = "Brannoc".to_string();
    state.race = "Half-Orc".to_string();
    state.strength = 10;
    state.ledger.push(EquipmentItem::new("Rope (50 feet)", 10.0, 2));
    state.ledger.push(EquipmentItem::new("Torch", 1.0, 5));
    state.ledger.push(EquipmentItem::new("Longsword", 4.0, 1));
    state
}

/// Drives a [`Session`] with command lines and records the outcomes.
pub struct TestHarness {
    pub session: Session,
    pub outcomes: Vec<Result<Outcome, SessionError>>,
}

impl TestHarness {
    /// A fresh session with default state, memory storage and auto-save off.
    pub fn new() -> Self {
        let config = Config::new()
            .with_data_dir(std::env::temp_dir().join("encumbrance-test"))
            .with_autosave_interval(Duration::ZERO)
            .with_restore_on_start(false);
        Self {
            session: Session::new(config, Box::new(MemoryStore::new())),
            outcomes: Vec::new(),
        }
    }

    /// Start from [`sample_state`].
    pub fn with_sample() -> Self {
        let mut harness = Self::new();
        harness.session.replace_state(sample_state());
        harness
    }

    /// Parse and execute each line in order. Parse errors are recorded too.
    pub fn run(&mut self, lines: &[&str]) -> &mut Self {
        for line in lines {
            let result = Command::parse(line)
                .map_err(SessionError::from)
                .and_then(|command| self.session.execute(command));
            self.outcomes.push(result);
        }
        self
    }

    pub fn last(&self) -> Option<&Result<Outcome, SessionError>> {
        self.outcomes.last()
    }

    pub fn state(&self) -> &CharacterState {
        self.session.state()
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    pub fn assert_total_weight(&self, expected: f64) {
        let actual = self.session.report().total_weight;
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected total weight {expected}, got {actual}"
        );
    }

    pub fn assert_slots_used(&self, expected: i64) {
        assert_eq!(self.session.report().slots_used(), Some(expected));
    }

    pub fn assert_over_encumbered(&self, expected: bool) {
        assert_eq!(self.session.report().over_encumbered(), expected);
    }

    pub fn assert_item_names(&self, expected: &[&str]) {
        let names: Vec<&str> = self
            .state()
            .ledger
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, expected);
    }

    pub fn assert_last_failed(&self) {
        assert!(
            matches!(self.last(), Some(Err(_))),
            "expected last command to fail, got {:?}",
            self.last()
        );
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
