// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Inventory state and reconciliation
//!
//! [`Inventory`] is the single authority for mutating inventory state.
//! Every mutating operation ends by recomputing each entry's stock status
//! from its quantity and re-sorting the list by canonical name, so callers
//! always observe a normalized view.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::ItemName;

/// Sentinel for annotations that no forecast has filled in yet.
pub const NOT_AVAILABLE: &str = "N/A";

/// Stock status, always derived from quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockStatus {
    /// Classify a quantity: 0 is out, 1-2 is low, 3+ is in stock.
    pub fn for_quantity(quantity: u32) -> Self {
        match quantity {
            0 => StockStatus::OutOfStock,
            1..=2 => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        };
        f.write_str(label)
    }
}

/// One row of inventory state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Stable opaque identifier, assigned at creation.
    pub id: String,
    pub name: ItemName,
    pub quantity: u32,
    pub status: StockStatus,
    pub usage_rate: String,
    pub reorder_date: String,
}

/// A sparse partial update against the inventory.
///
/// Absent fields are preserved on an existing entry (overlay, not replace),
/// so applying the same batch twice is idempotent.
#[derive(Debug, Clone)]
pub struct EntryPatch {
    pub name: ItemName,
    pub quantity: Option<u32>,
    pub usage_rate: Option<String>,
    pub reorder_date: Option<String>,
}

impl EntryPatch {
    /// Patch carrying only a quantity (scan results, manual add).
    pub fn with_quantity(name: ItemName, quantity: u32) -> Self {
        Self {
            name,
            quantity: Some(quantity),
            usage_rate: None,
            reorder_date: None,
        }
    }

    /// Patch carrying only forecast annotations.
    pub fn with_annotations(name: ItemName, usage_rate: String, reorder_date: String) -> Self {
        Self {
            name,
            quantity: None,
            usage_rate: Some(usage_rate),
            reorder_date: Some(reorder_date),
        }
    }
}

/// The in-memory inventory. Created empty, lives for the session only.
#[derive(Debug, Default)]
pub struct Inventory {
    entries: Vec<Entry>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current entries, sorted by canonical name.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of all current entries (forecast input).
    pub fn names(&self) -> Vec<ItemName> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// Entries whose status is not In Stock, recomputed on demand.
    pub fn shopping_list(&self) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| e.status != StockStatus::InStock)
            .collect()
    }

    /// Apply a batch of sparse partial updates.
    ///
    /// Each patch overlays onto the entry with the same name, or creates a
    /// new entry (quantity defaults to 1, annotations to the sentinel).
    pub fn apply(&mut self, patches: &[EntryPatch]) {
        for patch in patches {
            match self.entries.iter_mut().find(|e| e.name == patch.name) {
                Some(entry) => {
                    if let Some(quantity) = patch.quantity {
                        entry.quantity = quantity;
                    }
                    if let Some(ref usage_rate) = patch.usage_rate {
                        entry.usage_rate = usage_rate.clone();
                    }
                    if let Some(ref reorder_date) = patch.reorder_date {
                        entry.reorder_date = reorder_date.clone();
                    }
                }
                None => {
                    let name = patch.name;
                    let quantity = patch.quantity.unwrap_or(1);
                    self.entries.push(Entry {
                        id: new_entry_id(name),
                        name,
                        quantity,
                        status: StockStatus::for_quantity(quantity),
                        usage_rate: patch
                            .usage_rate
                            .clone()
                            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                        reorder_date: patch
                            .reorder_date
                            .clone()
                            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                    });
                }
            }
        }
        self.normalize();
    }

    /// Set an entry's quantity to `requested` clamped into u32 range.
    /// Unknown ids are a no-op.
    pub fn set_quantity(&mut self, id: &str, requested: i64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.quantity = requested.clamp(0, i64::from(u32::MAX)) as u32;
        }
        self.normalize();
    }

    /// Increment each named entry's quantity by `amount` (mark purchased).
    /// Names without an existing entry are no-ops; restocking never creates
    /// entries.
    pub fn restock(&mut self, names: &[ItemName], amount: u32) {
        for entry in &mut self.entries {
            if names.contains(&entry.name) {
                entry.quantity = entry.quantity.saturating_add(amount);
            }
        }
        self.normalize();
    }

    /// Manual add: a single `{name, quantity: 1}` partial update.
    pub fn add(&mut self, name: ItemName) {
        self.apply(&[EntryPatch::with_quantity(name, 1)]);
    }

    /// Recompute every status from quantity and re-sort by canonical name.
    fn normalize(&mut self) {
        for entry in &mut self.entries {
            entry.status = StockStatus::for_quantity(entry.quantity);
        }
        self.entries.sort_by_key(|e| e.name.as_str());
    }
}

/// Entry identifier: canonical name plus creation instant. Unique in
/// practice for a single-session, single-writer inventory.
fn new_entry_id(name: ItemName) -> String {
    format!("{}-{}", name.as_str(), Utc::now().timestamp_millis())
}
