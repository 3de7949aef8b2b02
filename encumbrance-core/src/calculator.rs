//! Weight and encumbrance calculation.
//!
//! Everything here is a pure function of the ledger, the effective strength
//! and the measurement system. Nothing is cached: callers recompute a
//! [`WeightReport`] after every mutation.

use crate::equipment::Ledger;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight units (gold pieces) per slot in the custom system.
pub const WEIGHT_PER_SLOT: f64 = 100.0;

/// Weight units (gold pieces) per pound.
pub const WEIGHT_PER_POUND: f64 = 10.0;

/// Kilograms per pound.
pub const KILOGRAMS_PER_POUND: f64 = 0.453592;

/// Which encumbrance rules to report with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Slot-based capacity derived from strength.
    #[default]
    Custom,
    /// Pounds and kilograms only, no capacity.
    #[serde(alias = "standard")]
    Classic,
}

impl MeasurementSystem {
    pub fn toggled(self) -> Self {
        match self {
            MeasurementSystem::Custom => MeasurementSystem::Classic,
            MeasurementSystem::Classic => MeasurementSystem::Custom,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeasurementSystem::Custom => "Custom System",
            MeasurementSystem::Classic => "Classic System",
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Capacity figures, which depend on the measurement system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capacity {
    Slots {
        /// Effective strength, the number of slots the character may fill.
        possible: i64,
        used: i64,
        available: i64,
    },
    Classic {
        kilograms: f64,
    },
}

/// Derived weight figures for one character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightReport {
    /// Sum of unit weight times quantity, in gold pieces.
    pub total_weight: f64,
    pub pounds: f64,
    pub capacity: Capacity,
}

impl WeightReport {
    pub fn system(&self) -> MeasurementSystem {
        match self.capacity {
            Capacity::Slots { .. } => MeasurementSystem::Custom,
            Capacity::Classic { .. } => MeasurementSystem::Classic,
        }
    }

    /// Whether more slots are used than strength permits.
    ///
    /// Always false under the classic system.
    pub fn over_encumbered(&self) -> bool {
        match self.capacity {
            Capacity::Slots { available, .. } => available < 0,
            Capacity::Classic { .. } => false,
        }
    }

    pub fn slots_used(&self) -> Option<i64> {
        match self.capacity {
            Capacity::Slots { used, .. } => Some(used),
            Capacity::Classic { .. } => None,
        }
    }

    pub fn slots_available(&self) -> Option<i64> {
        match self.capacity {
            Capacity::Slots { available, .. } => Some(available),
            Capacity::Classic { .. } => None,
        }
    }

    pub fn kilograms(&self) -> Option<f64> {
        match self.capacity {
            Capacity::Classic { kilograms } => Some(kilograms),
            Capacity::Slots { .. } => None,
        }
    }
}

impl fmt::Display for WeightReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.capacity {
            Capacity::Slots {
                possible,
                used,
                available,
            } => {
                writeln!(
                    f,
                    "Total Weight: {} Gold Pieces ({:.2} lbs, {} Slots)",
                    self.total_weight, self.pounds, used
                )?;
                writeln!(f, "Possible Slots: {possible}")?;
                writeln!(f, "Used Slots: {used}")?;
                write!(f, "Available Slots: {available}")?;
                if self.over_encumbered() {
                    write!(f, "\n\nWarning: Over-encumbered!")?;
                }
                Ok(())
            }
            Capacity::Classic { kilograms } => {
                writeln!(
                    f,
                    "Total Weight: {} Gold Pieces ({:.2} lbs, {:.2} kg)",
                    self.total_weight, self.pounds, kilograms
                )?;
                write!(f, "No slots in Classic System.")
            }
        }
    }
}

/// Sum of unit weight times quantity over the ledger.
///
/// A sum that overflows stays infinite. Opposing infinities cancel to zero.
pub fn total_weight(ledger: &Ledger) -> f64 {
    let total: f64 = ledger.iter().map(|item| item.total_weight()).sum();
    if total.is_nan() {
        0.0
    } else {
        total
    }
}

/// Slots needed for a given weight, rounding partial slots up.
///
/// The float-to-int cast saturates, so an infinite load needs `i64::MAX` slots.
pub fn slots_for_weight(weight: f64) -> i64 {
    if weight.is_nan() {
        return 0;
    }
    (weight / WEIGHT_PER_SLOT).ceil() as i64
}

/// Slots occupied by a single row.
pub fn item_slots(unit_weight: f64, quantity: i64) -> i64 {
    slots_for_weight(unit_weight * quantity as f64)
}

/// Compute the full report for a ledger.
pub fn calculate(ledger: &Ledger, strength: i64, system: MeasurementSystem) -> WeightReport {
    let total_weight = total_weight(ledger);
    let pounds = total_weight / WEIGHT_PER_POUND;

    let capacity = match system {
        MeasurementSystem::Custom => {
            let used = slots_for_weight(total_weight);
            Capacity::Slots {
                possible: strength,
                used,
                available: strength.saturating_sub(used),
            }
        }
        MeasurementSystem::Classic => Capacity::Classic {
            kilograms: pounds * KILOGRAMS_PER_POUND,
        },
    };

    WeightReport {
        total_weight,
        pounds,
        capacity,
    }
}
