//! # Selection Aggregator
//!
//! The in-progress set of catalog items a customer is building a quote from.
//!
//! ## Selection Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Selection Operations                                 │
//! │                                                                         │
//! │  Storefront Action        Operation              Selection Change       │
//! │  ─────────────────        ─────────              ────────────────       │
//! │                                                                         │
//! │  Click "Add" / "Remove" ─► toggle() ───────────► push / retain          │
//! │                                                                         │
//! │  Change Quantity ────────► set_quantity() ─────► clamp into [1, max]    │
//! │                                                                         │
//! │  Click Remove ───────────► remove() ───────────► retain                 │
//! │                                                                         │
//! │  Quote form sidebar ─────► total(), services() ► (read only)            │
//! │                                                                         │
//! │  NOTE: A selection has no durable identity. It is discarded on         │
//! │        submission or abandonment, never cancelled through an API.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Live Availability
//! The aggregator trusts the catalog snapshot it is handed. Rejecting items
//! with no units left is the caller's job (see `CatalogItem::is_selectable`),
//! and nothing here decrements catalog stock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CatalogItem, CatalogKind, QuoteItem};

// =============================================================================
// Selected Item
// =============================================================================

/// One line in a selection.
///
/// ## Design Notes
/// - `item_id`: reference back to the catalog item
/// - everything else is frozen at selection time so the line stays valid
///   even if the catalog entry is edited or retired afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SelectedItem {
    pub item_id: String,

    pub kind: CatalogKind,

    /// Name at time of selection (frozen)
    pub name: String,

    /// Category at time of selection (frozen)
    pub category: String,

    /// Daily price in cents at time of selection (frozen)
    pub unit_price_cents: i64,

    /// Upper clamp bound for `quantity`, never below 1
    pub max_quantity: i64,

    pub quantity: i64,

    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl SelectedItem {
    /// Snapshots a catalog item with quantity 1.
    pub fn from_catalog(item: &CatalogItem) -> Self {
        SelectedItem {
            item_id: item.id.clone(),
            kind: item.kind,
            name: item.name.clone(),
            category: item.category.clone(),
            unit_price_cents: item.daily_price_cents,
            max_quantity: item.max_quantity().max(1),
            quantity: 1,
            added_at: Utc::now(),
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Calculates the line total (unit price × quantity), saturating.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Line total, or `None` when it does not fit in i64 cents.
    #[inline]
    pub fn checked_line_total(&self) -> Option<Money> {
        self.unit_price().checked_multiply_quantity(self.quantity)
    }

    /// Freezes this line into a quote item.
    pub fn to_quote_item(&self) -> QuoteItem {
        QuoteItem {
            item_id: self.item_id.clone(),
            kind: self.kind,
            name: self.name.clone(),
            category: self.category.clone(),
            unit_price_cents: self.unit_price_cents,
            quantity: self.quantity,
        }
    }
}

// =============================================================================
// Selection Change
// =============================================================================

/// What a toggle did, for storefront feedback ("Added to quote", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "change", rename_all = "snake_case")]
#[ts(export)]
pub enum SelectionChange {
    Added { item_id: String, name: String },
    Removed { item_id: String, name: String },
}

impl SelectionChange {
    pub fn item_id(&self) -> &str {
        match self {
            SelectionChange::Added { item_id, .. } | SelectionChange::Removed { item_id, .. } => {
                item_id
            }
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, SelectionChange::Added { .. })
    }
}

// =============================================================================
// Selection
// =============================================================================

/// The in-progress quote draft.
///
/// ## Invariants
/// - Items are unique by `item_id` (toggling removes rather than duplicates)
/// - Every quantity lies in `[1, max_quantity]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Selection {
    pub items: Vec<SelectedItem>,

    /// When the selection was started or last cleared
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Selection {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds the item with quantity 1, or removes it if already present.
    ///
    /// Toggling the same item twice leaves the selection as it was.
    pub fn toggle(&mut self, item: &CatalogItem) -> SelectionChange {
        if let Some(pos) = self.items.iter().position(|i| i.item_id == item.id) {
            let removed = self.items.remove(pos);
            return SelectionChange::Removed {
                item_id: removed.item_id,
                name: removed.name,
            };
        }

        self.items.push(SelectedItem::from_catalog(item));
        SelectionChange::Added {
            item_id: item.id.clone(),
            name: item.name.clone(),
        }
    }

    /// Sets a line's quantity, clamped into `[1, max_quantity]`.
    ///
    /// Out-of-range input is clamped, never rejected. Returns the quantity
    /// actually stored, or `None` when the item is not in the selection.
    pub fn set_quantity(&mut self, item_id: &str, quantity: i64) -> Option<i64> {
        let item = self.items.iter_mut().find(|i| i.item_id == item_id)?;
        item.quantity = quantity.clamp(1, item.max_quantity.max(1));
        Some(item.quantity)
    }

    /// Removes a line. Returns whether anything was removed.
    pub fn remove(&mut self, item_id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.item_id != item_id);
        self.items.len() != initial_len
    }

    /// Sum of `price * quantity` over all lines; zero when empty.
    ///
    /// Saturates at the i64 bounds. Use [`Selection::checked_total`] where
    /// overflow has to be reported.
    pub fn total(&self) -> Money {
        self.items.iter().map(SelectedItem::line_total).sum()
    }

    /// Exact total, or `None` when any line or the sum overflows.
    pub fn checked_total(&self) -> Option<Money> {
        Money::checked_sum(self.items.iter().map(SelectedItem::checked_line_total))
    }

    /// Categories present in the selection, de-duplicated in first-seen order.
    pub fn services(&self) -> Vec<String> {
        let mut services: Vec<String> = Vec::new();
        for item in &self.items {
            if !services.iter().any(|s| s == &item.category) {
                services.push(item.category.clone());
            }
        }
        services
    }

    /// Frozen quote lines for submission.
    pub fn snapshot(&self) -> Vec<QuoteItem> {
        self.items.iter().map(SelectedItem::to_quote_item).collect()
    }

    pub fn get(&self, item_id: &str) -> Option<&SelectedItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.get(item_id).is_some()
    }

    /// Returns the number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn equipment(id: &str, name: &str, category: &str, price_cents: i64, units: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            kind: CatalogKind::Equipment,
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            daily_price_cents: price_cents,
            available_units: units,
            features: vec![],
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn package(id: &str, price_cents: i64) -> CatalogItem {
        CatalogItem {
            kind: CatalogKind::Package,
            ..equipment(id, "Wedding Package", "wedding", price_cents, 0)
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = Selection::new();
        let toilet = equipment("item-1", "VIP Toilet", "mobile-toilets", 50_000, 5);

        let change = selection.toggle(&toilet);
        assert!(change.is_added());
        assert_eq!(selection.get("item-1").unwrap().quantity, 1);
        assert_eq!(selection.get("item-1").unwrap().max_quantity, 5);

        let change = selection.toggle(&toilet);
        assert_eq!(
            change,
            SelectionChange::Removed {
                item_id: "item-1".to_string(),
                name: "VIP Toilet".to_string()
            }
        );
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut selection = Selection::new();
        selection.toggle(&equipment("a", "Tent", "tents", 120_000, 3));
        selection.toggle(&equipment("b", "Chair", "furniture", 1_500, 200));
        selection.set_quantity("b", 80);
        let before = selection.clone();

        let lights = equipment("c", "Fairy Lights", "lighting", 25_000, 10);
        selection.toggle(&lights);
        selection.toggle(&lights);

        assert_eq!(selection, before);
    }

    #[test]
    fn test_set_quantity_clamps() {
        let mut selection = Selection::new();
        selection.toggle(&equipment("item-1", "VIP Toilet", "mobile-toilets", 50_000, 5));

        assert_eq!(selection.set_quantity("item-1", 50), Some(5));
        assert_eq!(selection.set_quantity("item-1", 0), Some(1));
        assert_eq!(selection.set_quantity("item-1", -3), Some(1));
        assert_eq!(selection.set_quantity("item-1", 3), Some(3));
        assert_eq!(selection.get("item-1").unwrap().quantity, 3);
    }

    #[test]
    fn test_set_quantity_on_missing_item_is_noop() {
        let mut selection = Selection::new();
        selection.toggle(&equipment("item-1", "VIP Toilet", "mobile-toilets", 50_000, 5));

        assert_eq!(selection.set_quantity("nope", 4), None);
        assert_eq!(selection.total_quantity(), 1);
    }

    #[test]
    fn test_package_is_capped_at_one() {
        let mut selection = Selection::new();
        selection.toggle(&package("pkg-1", 900_000));

        assert_eq!(selection.set_quantity("pkg-1", 4), Some(1));
    }

    #[test]
    fn test_zero_unit_snapshot_still_clamps_to_one() {
        let mut selection = Selection::new();
        selection.toggle(&equipment("item-1", "Generator", "power", 80_000, 0));

        assert_eq!(selection.set_quantity("item-1", 7), Some(1));
    }

    #[test]
    fn test_total() {
        let mut selection = Selection::new();
        assert_eq!(selection.total(), Money::zero());

        selection.toggle(&equipment("t", "VIP Toilet", "mobile-toilets", 50_000, 5));
        selection.toggle(&equipment("n", "Tent", "tents", 120_000, 2));
        selection.set_quantity("t", 2);

        assert_eq!(selection.total().cents(), 220_000);
        let by_hand: i64 = selection
            .items
            .iter()
            .map(|i| i.unit_price_cents * i.quantity)
            .sum();
        assert_eq!(selection.total().cents(), by_hand);
    }

    #[test]
    fn test_total_of_oversized_line_does_not_panic() {
        let mut selection = Selection::new();
        selection.toggle(&equipment("x", "Gold Marquee", "tents", i64::MAX, 3));
        selection.set_quantity("x", 2);

        assert_eq!(selection.total().cents(), i64::MAX);
        assert_eq!(selection.checked_total(), None);
        assert_eq!(selection.get("x").unwrap().checked_line_total(), None);
    }

    #[test]
    fn test_services_first_seen_order() {
        let mut selection = Selection::new();
        selection.toggle(&equipment("a", "Tent", "tents", 1, 1));
        selection.toggle(&equipment("b", "Toilet", "mobile-toilets", 1, 1));
        selection.toggle(&equipment("c", "Stretch Tent", "tents", 1, 1));

        assert_eq!(selection.services(), vec!["tents", "mobile-toilets"]);
    }

    #[test]
    fn test_remove() {
        let mut selection = Selection::new();
        selection.toggle(&equipment("a", "Tent", "tents", 1, 1));

        assert!(selection.remove("a"));
        assert!(!selection.remove("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_snapshot_freezes_price() {
        let mut selection = Selection::new();
        let mut tent = equipment("a", "Tent", "tents", 120_000, 2);
        selection.toggle(&tent);

        tent.daily_price_cents = 999_999;
        let lines = selection.snapshot();
        assert_eq!(lines[0].unit_price_cents, 120_000);
        assert_eq!(lines[0].line_total().cents(), 120_000);
    }
}
