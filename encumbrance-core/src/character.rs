//! Character state: the single record everything else projects from.

use crate::calculator::{calculate, MeasurementSystem, WeightReport};
use crate::catalog::Catalog;
use crate::equipment::Ledger;
use serde::{Deserialize, Serialize};

/// A labelled adjustment to the strength score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthModifier {
    pub label: String,
    pub delta: i64,
}

impl StrengthModifier {
    pub fn new(label: impl Into<String>, delta: i64) -> Self {
        Self {
            label: label.into(),
            delta,
        }
    }
}

/// Body text size in pixels, used by the printable sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextScale(f64);

impl TextScale {
    pub const DEFAULT: f64 = 16.0;
    pub const STEP: f64 = 2.0;
    pub const MIN: f64 = 8.0;
    pub const MAX: f64 = 48.0;

    /// Build a scale, clamping into the supported range.
    pub fn new(px: f64) -> Self {
        if px.is_finite() {
            Self(px.clamp(Self::MIN, Self::MAX))
        } else {
            Self(Self::DEFAULT)
        }
    }

    pub fn px(self) -> f64 {
        self.0
    }

    pub fn increased(self) -> Self {
        Self::new(self.0 + Self::STEP)
    }

    pub fn decreased(self) -> Self {
        Self::new(self.0 - Self::STEP)
    }

    pub fn is_valid(self) -> bool {
        self.0.is_finite() && (Self::MIN..=Self::MAX).contains(&self.0)
    }
}

impl Default for TextScale {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Everything about one character that is saved and restored.
///
/// Derived values (totals, slots, effective strength) are never stored; use
/// [`CharacterState::report`] and [`CharacterState::effective_strength`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub race: String,
    /// Base strength score, before modifiers.
    #[serde(default)]
    pub strength: i64,
    #[serde(default)]
    pub modifiers: Vec<StrengthModifier>,
    #[serde(default)]
    pub ledger: Ledger,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub system: MeasurementSystem,
    #[serde(default)]
    pub text_scale: TextScale,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self {
            name: String::new(),
            race: String::new(),
            strength: 0,
            modifiers: Vec::new(),
            ledger: Ledger::new(),
            catalog: Catalog::with_defaults(),
            system: MeasurementSystem::default(),
            text_scale: TextScale::default(),
        }
    }
}

impl CharacterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base strength plus every modifier. This is the slot capacity.
    pub fn effective_strength(&self) -> i64 {
        self.modifiers
            .iter()
            .fold(self.strength, |acc, m| acc.saturating_add(m.delta))
    }

    /// Recompute weight figures from the current ledger.
    pub fn report(&self) -> WeightReport {
        calculate(&self.ledger, self.effective_strength(), self.system)
    }

    /// Modifier list as shown beside the strength score.
    pub fn modifiers_text(&self) -> String {
        self.modifiers
            .iter()
            .map(|m| format!("{}: {}", m.label, m.delta))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `Strength: 12 (Belt of Giant Strength: 2)`
    pub fn strength_formula(&self) -> String {
        format!(
            "Strength: {} ({})",
            self.effective_strength(),
            self.modifiers_text()
        )
    }

    /// Reset everything except the catalog, system and text scale.
    pub fn clear_user_data(&mut self) {
        self.name.clear();
        self.race.clear();
        self.strength = 0;
        self.modifiers.clear();
        self.ledger.clear();
    }

    pub fn profile(&self) -> CharacterProfile {
        CharacterProfile {
            name: self.name.clone(),
            race: self.race.clone(),
            equipment: self.ledger.clone(),
        }
    }

    pub fn apply_profile(&mut self, profile: CharacterProfile) {
        self.name = profile.name;
        self.race = profile.race;
        self.ledger = profile.equipment;
    }
}

/// The smaller "character" save: identity and carried gear only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub race: String,
    pub equipment: Ledger,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::EquipmentItem;

    #[test]
    fn test_effective_strength_includes_modifiers() {
        let mut state = CharacterState::new();
        state.strength = 10;
        state.modifiers.push(StrengthModifier::new("Belt of Giant Strength", 4));
        state.modifiers.push(StrengthModifier::new("Curse", -1));

        assert_eq!(state.effective_strength(), 13);
        assert_eq!(
            state.strength_formula(),
            "Strength: 13 (Belt of Giant Strength: 4, Curse: -1)"
        );
    }

    #[test]
    fn test_report_uses_effective_strength() {
        let mut state = CharacterState::new();
        state.strength = 1;
        state
            .ledger
            .push(EquipmentItem::new("Chainmail", 40.0, 5));
        assert!(state.report().over_encumbered());

        state.modifiers.push(StrengthModifier::new("Potion", 1));
        assert!(!state.report().over_encumbered());
    }

    #[test]
    fn test_text_scale_clamps() {
        let scale = TextScale::default();
        assert_eq!(scale.increased().px(), 18.0);
        assert_eq!(scale.decreased().px(), 14.0);
        assert_eq!(TextScale::new(2.0).px(), TextScale::MIN);
        assert_eq!(TextScale::new(100.0).px(), TextScale::MAX);
        assert_eq!(TextScale::new(f64::NAN).px(), TextScale::DEFAULT);
        assert_eq!(TextScale::new(TextScale::MAX).increased().px(), TextScale::MAX);
    }

    #[test]
    fn test_clear_user_data_keeps_catalog() {
        let mut state = CharacterState::new();
        state.name = "Mirela".to_string();
        state.strength = 12;
        state.modifiers.push(StrengthModifier::new("Ring", 1));
        state.ledger.push(EquipmentItem::new("Torch", 1.0, 3));
        state.system = MeasurementSystem::Classic;

        state.clear_user_data();

        assert!(state.name.is_empty());
        assert_eq!(state.strength, 0);
        assert!(state.modifiers.is_empty());
        assert!(state.ledger.is_empty());
        assert_eq!(state.catalog, Catalog::with_defaults());
        assert_eq!(state.system, MeasurementSystem::Classic);
    }

    #[test]
    fn test_profile_round_trip() {
        let mut state = CharacterState::new();
        state.name = "Osric".to_string();
        state.race = "Dwarf".to_string();
        state.ledger.push(EquipmentItem::new("Battleaxe", 7.0, 1));

        let profile = state.profile();
        let mut other = CharacterState::new();
        other.apply_profile(profile);

        assert_eq!(other.name, "Osric");
        assert_eq!(other.race, "Dwarf");
        assert_eq!(other.ledger, state.ledger);
    }
}
