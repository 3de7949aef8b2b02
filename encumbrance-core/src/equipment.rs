//! The equipment ledger: the ordered rows of gear a character carries.

use crate::calculator::item_slots;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors from ledger operations.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("No equipment row with id {0}")]
    NotFound(ItemId),

    #[error("Row {row} is out of range (ledger has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },
}

/// Stable identity of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single row of carried equipment.
///
/// Weight is per unit, in gold-piece weight units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    #[serde(default)]
    pub id: ItemId,
    pub name: String,
    pub unit_weight: f64,
    pub quantity: i64,
}

impl EquipmentItem {
    pub fn new(name: impl Into<String>, unit_weight: f64, quantity: i64) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            unit_weight,
            quantity,
        }
    }

    /// An empty row as produced by the "add row" action.
    pub fn blank() -> Self {
        Self::new("", 0.0, 1)
    }

    /// Weight of the whole stack (unit weight times quantity).
    ///
    /// Overflow saturates to infinity; only a NaN product counts as zero.
    pub fn total_weight(&self) -> f64 {
        let total = self.unit_weight * self.quantity as f64;
        if total.is_nan() {
            0.0
        } else {
            total
        }
    }

    /// Slots this row alone would occupy.
    pub fn slots(&self) -> i64 {
        item_slots(self.unit_weight, self.quantity)
    }
}

/// Ordered list of equipment rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    items: Vec<EquipmentItem>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<EquipmentItem>) -> Self {
        Self { items }
    }

    /// Append a row and return its id.
    pub fn push(&mut self, item: EquipmentItem) -> ItemId {
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Remove the row with the given id, returning it.
    pub fn remove(&mut self, id: ItemId) -> Result<EquipmentItem, LedgerError> {
        let index = self.position(id).ok_or(LedgerError::NotFound(id))?;
        Ok(self.items.remove(index))
    }

    pub fn get(&self, id: ItemId) -> Option<&EquipmentItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut EquipmentItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Id of the row at a 1-based position, as users number rows.
    pub fn id_at_row(&self, row: usize) -> Result<ItemId, LedgerError> {
        row.checked_sub(1)
            .and_then(|index| self.items.get(index))
            .map(|item| item.id)
            .ok_or(LedgerError::RowOutOfRange {
                row,
                len: self.items.len(),
            })
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &EquipmentItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[EquipmentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a EquipmentItem;
    type IntoIter = std::slice::Iter<'a, EquipmentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_row_defaults() {
        let item = EquipmentItem::blank();
        assert_eq!(item.name, "");
        assert_eq!(item.unit_weight, 0.0);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.slots(), 0);
    }

    #[test]
    fn test_row_slots_round_up() {
        assert_eq!(EquipmentItem::new("Chainmail", 40.0, 1).slots(), 1);
        assert_eq!(EquipmentItem::new("Plate Mail", 50.0, 3).slots(), 2);
        assert_eq!(EquipmentItem::new("Gold Coins (100)", 1.0, 100).slots(), 1);
        assert_eq!(EquipmentItem::new("Gold Coins (100)", 1.0, 101).slots(), 2);
    }

    #[test]
    fn test_add_then_remove_restores_ledger() {
        let mut ledger = Ledger::from_items(vec![
            EquipmentItem::new("Rope", 10.0, 2),
            EquipmentItem::new("Torch", 1.0, 5),
        ]);
        let before = ledger.clone();

        let id = ledger.push(EquipmentItem::blank());
        assert_eq!(ledger.len(), 3);

        ledger.remove(id).expect("row should exist");
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut ledger = Ledger::new();
        let id = ItemId::new();
        assert_eq!(ledger.remove(id), Err(LedgerError::NotFound(id)));
    }

    #[test]
    fn test_id_at_row_is_one_based() {
        let mut ledger = Ledger::new();
        let first = ledger.push(EquipmentItem::new("Dagger", 1.0, 1));
        let second = ledger.push(EquipmentItem::new("Spear", 5.0, 1));

        assert_eq!(ledger.id_at_row(1), Ok(first));
        assert_eq!(ledger.id_at_row(2), Ok(second));
        assert_eq!(
            ledger.id_at_row(0),
            Err(LedgerError::RowOutOfRange { row: 0, len: 2 })
        );
        assert_eq!(
            ledger.id_at_row(3),
            Err(LedgerError::RowOutOfRange { row: 3, len: 2 })
        );
    }

    #[test]
    fn test_negative_quantity_passes_through() {
        let item = EquipmentItem::new("Debt", 10.0, -3);
        assert_eq!(item.total_weight(), -30.0);
    }

    #[test]
    fn test_overflowing_stack_stays_heavy() {
        let item = EquipmentItem::new("Mountain", 1e308, 10);
        assert_eq!(item.total_weight(), f64::INFINITY);
        assert_eq!(item.slots(), i64::MAX);
    }
}
