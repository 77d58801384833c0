// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! The fixed item catalog and name normalization

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::LarderError;

/// A canonical catalog item.
///
/// The catalog is closed: recognition and forecasting are constrained to
/// these five items, and any other name coming back from the AI engine is
/// dropped during normalization. One variant per item also makes
/// case-insensitive uniqueness in the inventory hold by construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemName {
    Rice,
    Milk,
    Eggs,
    Oil,
    Bread,
}

impl ItemName {
    /// All catalog items, in normalizer match order.
    pub const ALL: [ItemName; 5] = [
        ItemName::Rice,
        ItemName::Milk,
        ItemName::Eggs,
        ItemName::Oil,
        ItemName::Bread,
    ];

    /// Canonical spelling of the item name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemName::Rice => "Rice",
            ItemName::Milk => "Milk",
            ItemName::Eggs => "Eggs",
            ItemName::Oil => "Oil",
            ItemName::Bread => "Bread",
        }
    }

    /// Map a free-text label to a catalog item.
    ///
    /// Case-insensitive substring containment, first match wins in catalog
    /// order. Deliberately loose rather than exact: vision models like to
    /// answer "carton of milk", which should still count as Milk.
    pub fn normalize(label: &str) -> Option<ItemName> {
        let lower = label.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|item| lower.contains(&item.as_str().to_lowercase()))
    }

    /// Joined catalog for prompt construction ("Rice, Milk, Eggs, Oil, Bread").
    pub fn joined() -> String {
        Self::ALL
            .iter()
            .map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact (case-insensitive) match against the catalog, for form input.
/// Unlike [`ItemName::normalize`] this does not accept loose labels.
impl FromStr for ItemName {
    type Err = LarderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|item| item.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LarderError::UnknownItem(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_exact_name() {
        assert_eq!(ItemName::normalize("Milk"), Some(ItemName::Milk));
        assert_eq!(ItemName::normalize("bread"), Some(ItemName::Bread));
    }

    #[test]
    fn test_normalize_loose_label() {
        assert_eq!(ItemName::normalize("carton of milk"), Some(ItemName::Milk));
        assert_eq!(ItemName::normalize("  Basmati RICE bag "), Some(ItemName::Rice));
        assert_eq!(ItemName::normalize("olive oil bottle"), Some(ItemName::Oil));
    }

    #[test]
    fn test_normalize_rejects_unknown() {
        assert_eq!(ItemName::normalize("Shampoo"), None);
        assert_eq!(ItemName::normalize(""), None);
        assert_eq!(ItemName::normalize("   "), None);
    }

    #[test]
    fn test_normalize_first_match_wins() {
        // Contains both "oil" and "rice"; Rice is declared first.
        assert_eq!(ItemName::normalize("rice with oil"), Some(ItemName::Rice));
    }

    #[test]
    fn test_from_str_is_exact() {
        assert_eq!("milk".parse::<ItemName>().ok(), Some(ItemName::Milk));
        assert!("carton of milk".parse::<ItemName>().is_err());
        assert!("soap".parse::<ItemName>().is_err());
    }

    #[test]
    fn test_joined_catalog() {
        assert_eq!(ItemName::joined(), "Rice, Milk, Eggs, Oil, Bread");
    }
}
