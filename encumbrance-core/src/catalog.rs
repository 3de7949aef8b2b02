//! The Common Equipment List (CEL).
//!
//! A user-editable catalog of predefined items grouped by category. Entries
//! are quick-added to the ledger with a quantity of one.

use crate::numeric::parse_strict_weight;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from catalog operations.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Please enter both item name and weight.")]
    MissingField,

    #[error("Please enter a valid weight (a non-negative number), got '{0}'")]
    InvalidWeight(String),

    #[error("Unknown category '{0}' (expected one of: weapons, armor, ammunition, utilities, coins, gems, misc)")]
    UnknownCategory(String),

    #[error("No entry {index} in {category}")]
    EntryNotFound { category: Category, index: usize },
}

/// Catalog category, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Weapons,
    Armor,
    Ammunition,
    Utilities,
    Coins,
    Gems,
    Misc,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Weapons,
        Category::Armor,
        Category::Ammunition,
        Category::Utilities,
        Category::Coins,
        Category::Gems,
        Category::Misc,
    ];

    /// Lowercase identifier used in commands and files.
    pub fn key(self) -> &'static str {
        match self {
            Category::Weapons => "weapons",
            Category::Armor => "armor",
            Category::Ammunition => "ammunition",
            Category::Utilities => "utilities",
            Category::Coins => "coins",
            Category::Gems => "gems",
            Category::Misc => "misc",
        }
    }

    /// Capitalized heading for display.
    pub fn title(self) -> &'static str {
        match self {
            Category::Weapons => "Weapons",
            Category::Armor => "Armor",
            Category::Ammunition => "Ammunition",
            Category::Utilities => "Utilities",
            Category::Coins => "Coins",
            Category::Gems => "Gems",
            Category::Misc => "Misc",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let index = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key() == lower || c.key().trim_end_matches('s') == lower)
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

/// A predefined item: name and unit weight in gold pieces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub unit_weight: f64,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, unit_weight: f64) -> Self {
        Self {
            name: name.into(),
            unit_weight,
        }
    }
}

/// All categories with their entries, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Category, Vec<CatalogEntry>>",
    into = "BTreeMap<Category, Vec<CatalogEntry>>"
)]
pub struct Catalog {
    tables: BTreeMap<Category, Vec<CatalogEntry>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<BTreeMap<Category, Vec<CatalogEntry>>> for Catalog {
    fn from(mut tables: BTreeMap<Category, Vec<CatalogEntry>>) -> Self {
        for category in Category::ALL {
            tables.entry(category).or_default();
        }
        Self { tables }
    }
}

impl From<Catalog> for BTreeMap<Category, Vec<CatalogEntry>> {
    fn from(catalog: Catalog) -> Self {
        catalog.tables
    }
}

impl Catalog {
    /// A catalog with every category present and no entries.
    pub fn empty() -> Self {
        Self::from(BTreeMap::new())
    }

    /// The preloaded AD&D item list.
    pub fn with_defaults() -> Self {
        Self::from(DEFAULT_CATALOG.clone())
    }

    pub fn entries(&self, category: Category) -> &[CatalogEntry] {
        self.tables
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn entry(&self, category: Category, index: usize) -> Result<&CatalogEntry, CatalogError> {
        self.entries(category)
            .get(index)
            .ok_or(CatalogError::EntryNotFound { category, index })
    }

    /// Iterate categories in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[CatalogEntry])> {
        self.tables
            .iter()
            .map(|(category, entries)| (*category, entries.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a user-defined entry from form text.
    ///
    /// Both the name and the weight are required.
    pub fn add_entry(
        &mut self,
        category: Category,
        name: &str,
        weight_text: &str,
    ) -> Result<&CatalogEntry, CatalogError> {
        let name = name.trim();
        if name.is_empty() || weight_text.trim().is_empty() {
            return Err(CatalogError::MissingField);
        }
        let unit_weight = parse_strict_weight(weight_text)
            .ok_or_else(|| CatalogError::InvalidWeight(weight_text.to_string()))?;

        let table = self.tables.entry(category).or_default();
        table.push(CatalogEntry::new(name, unit_weight));
        Ok(&table[table.len() - 1])
    }

    /// Replace the weight of an entry. The new weight must be a non-negative number.
    pub fn edit_weight(
        &mut self,
        category: Category,
        index: usize,
        weight_text: &str,
    ) -> Result<(), CatalogError> {
        let unit_weight = parse_strict_weight(weight_text)
            .ok_or_else(|| CatalogError::InvalidWeight(weight_text.to_string()))?;
        let entry = self
            .tables
            .get_mut(&category)
            .and_then(|table| table.get_mut(index))
            .ok_or(CatalogError::EntryNotFound { category, index })?;
        entry.unit_weight = unit_weight;
        Ok(())
    }

    pub fn remove_entry(
        &mut self,
        category: Category,
        index: usize,
    ) -> Result<CatalogEntry, CatalogError> {
        let table = self
            .tables
            .get_mut(&category)
            .filter(|table| index < table.len())
            .ok_or(CatalogError::EntryNotFound { category, index })?;
        Ok(table.remove(index))
    }

    /// Case-insensitive lookup across all categories.
    pub fn find(&self, name: &str) -> Option<(Category, &CatalogEntry)> {
        let name_lower = name.to_lowercase();
        self.iter().find_map(|(category, entries)| {
            entries
                .iter()
                .find(|e| e.name.to_lowercase() == name_lower)
                .map(|e| (category, e))
        })
    }

    /// Empty every category.
    pub fn clear(&mut self) {
        for table in self.tables.values_mut() {
            table.clear();
        }
    }

    /// Overwrite the catalog with the default list.
    pub fn repopulate(&mut self) {
        *self = Self::with_defaults();
    }
}

fn table(items: &[(&str, f64)]) -> Vec<CatalogEntry> {
    items
        .iter()
        .map(|(name, weight)| CatalogEntry::new(*name, *weight))
        .collect()
}

lazy_static::lazy_static! {
    /// Default AD&D 1st edition catalog.
    static ref DEFAULT_CATALOG: BTreeMap<Category, Vec<CatalogEntry>> = {
        let mut tables = BTreeMap::new();
        tables.insert(Category::Weapons, table(&[
            ("Dagger", 1.0),
            ("Longsword", 4.0),
            ("Shortbow", 2.0),
            ("Crossbow", 7.0),
            ("Battleaxe", 7.0),
            ("Warhammer", 5.0),
            ("Spear", 5.0),
            ("Mace", 6.0),
            ("Quarterstaff", 4.0),
            ("Greatsword", 8.0),
        ]));
        tables.insert(Category::Armor, table(&[
            ("Leather Armor", 15.0),
            ("Chainmail", 40.0),
            ("Plate Mail", 50.0),
            ("Shield", 10.0),
            ("Padded Armor", 10.0),
            ("Hide Armor", 12.0),
            ("Scale Mail", 45.0),
            ("Splint Armor", 60.0),
            ("Ring Mail", 40.0),
            ("Breastplate", 30.0),
        ]));
        tables.insert(Category::Ammunition, table(&[
            ("Arrows (20)", 3.0),
            ("Bolts (20)", 3.0),
            ("Sling Bullets (20)", 2.0),
            ("Darts (20)", 1.0),
            ("Javelins (5)", 10.0),
            ("Throwing Axes (5)", 10.0),
            ("Throwing Knives (5)", 5.0),
            ("Hand Crossbow Bolts (20)", 2.0),
            ("Heavy Crossbow Bolts (20)", 4.0),
            ("Blowgun Needles (50)", 1.0),
        ]));
        tables.insert(Category::Utilities, table(&[
            ("Backpack", 5.0),
            ("Bedroll", 7.0),
            ("Rope (50 feet)", 10.0),
            ("Lantern", 3.0),
            ("Torch", 1.0),
            ("Grappling Hook", 4.0),
            ("Pitons (10)", 2.0),
            ("Waterskin", 4.0),
            ("Rations (1 day)", 2.0),
            ("Tinderbox", 1.0),
        ]));
        tables.insert(Category::Coins, table(&[
            ("Gold Coins (100)", 1.0),
            ("Silver Coins (100)", 1.0),
            ("Copper Coins (100)", 1.0),
            ("Platinum Coins (10)", 0.2),
            ("Electrum Coins (50)", 0.5),
        ]));
        tables.insert(Category::Gems, table(&[
            ("Ruby", 0.1),
            ("Diamond", 0.1),
            ("Emerald", 0.1),
            ("Sapphire", 0.1),
            ("Topaz", 0.1),
            ("Amethyst", 0.1),
            ("Pearl", 0.1),
            ("Opal", 0.1),
            ("Jade", 0.1),
            ("Garnet", 0.1),
        ]));
        tables.insert(Category::Misc, table(&[
            ("Potion of Healing", 0.5),
            ("Thieves' Tools", 1.0),
            ("Spellbook", 5.0),
            ("Scroll Case", 1.0),
            ("Ink Pen", 0.1),
            ("Ink (1 oz)", 0.1),
            ("Paper (10 sheets)", 0.2),
            ("Chalk (10 pieces)", 0.1),
            ("Candle", 0.1),
            ("Mirror (Steel)", 1.0),
        ]));
        tables
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_sizes() {
        let catalog = Catalog::with_defaults();
        assert_eq!(catalog.entries(Category::Weapons).len(), 10);
        assert_eq!(catalog.entries(Category::Coins).len(), 5);
        assert_eq!(catalog.len(), 65);
    }

    #[test]
    fn test_categories_iterate_in_display_order() {
        let catalog = Catalog::empty();
        let order: Vec<_> = catalog.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn test_add_entry_requires_name_and_weight() {
        let mut catalog = Catalog::empty();
        assert_eq!(
            catalog.add_entry(Category::Misc, "", "1"),
            Err(CatalogError::MissingField)
        );
        assert_eq!(
            catalog.add_entry(Category::Misc, "Lute", "  "),
            Err(CatalogError::MissingField)
        );
        assert!(catalog.is_empty());

        let entry = catalog
            .add_entry(Category::Misc, "Lute", "3")
            .expect("valid entry")
            .clone();
        assert_eq!(entry, CatalogEntry::new("Lute", 3.0));
        assert_eq!(catalog.entries(Category::Misc), &[entry]);
    }

    #[test]
    fn test_edit_weight_rejects_invalid() {
        let mut catalog = Catalog::with_defaults();
        let before = catalog.clone();

        assert!(matches!(
            catalog.edit_weight(Category::Weapons, 0, "-1"),
            Err(CatalogError::InvalidWeight(_))
        ));
        assert!(matches!(
            catalog.edit_weight(Category::Weapons, 0, "heavy"),
            Err(CatalogError::InvalidWeight(_))
        ));
        assert_eq!(catalog, before);

        catalog
            .edit_weight(Category::Weapons, 0, "2")
            .expect("valid weight");
        assert_eq!(catalog.entries(Category::Weapons)[0].unit_weight, 2.0);
    }

    #[test]
    fn test_remove_entry() {
        let mut catalog = Catalog::with_defaults();
        let removed = catalog
            .remove_entry(Category::Gems, 0)
            .expect("ruby exists");
        assert_eq!(removed.name, "Ruby");
        assert_eq!(catalog.entries(Category::Gems).len(), 9);
        assert_eq!(
            catalog.remove_entry(Category::Gems, 50),
            Err(CatalogError::EntryNotFound {
                category: Category::Gems,
                index: 50
            })
        );
    }

    #[test]
    fn test_clear_and_repopulate() {
        let mut catalog = Catalog::with_defaults();
        catalog.clear();
        assert!(catalog.is_empty());
        assert_eq!(catalog.iter().count(), 7);

        catalog.repopulate();
        assert_eq!(catalog, Catalog::with_defaults());
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let catalog = Catalog::with_defaults();
        let (category, entry) = catalog.find("rope (50 FEET)").expect("rope exists");
        assert_eq!(category, Category::Utilities);
        assert_eq!(entry.unit_weight, 10.0);
        assert!(catalog.find("Vorpal Sword").is_none());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("weapons".parse::<Category>(), Ok(Category::Weapons));
        assert_eq!("Gem".parse::<Category>(), Ok(Category::Gems));
        assert_eq!("MISC".parse::<Category>(), Ok(Category::Misc));
        assert!("food".parse::<Category>().is_err());
    }

    #[test]
    fn test_deserialize_fills_missing_categories() {
        let catalog: Catalog =
            serde_json::from_str(r#"{"gems":[{"name":"Opal","unit_weight":0.1}]}"#).unwrap();
        assert_eq!(catalog.iter().count(), 7);
        assert_eq!(catalog.entries(Category::Gems).len(), 1);
        assert!(catalog.entries(Category::Weapons).is_empty());
    }
}
