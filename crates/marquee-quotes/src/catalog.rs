//! # Catalog Reader
//!
//! Read-only access to equipment and packages for the storefront.
//!
//! `select` is the availability gate that runs before an item reaches a
//! [`marquee_core::Selection`]: the selection itself trusts whatever snapshot
//! it is handed and never re-checks stock.

use tracing::debug;

use marquee_core::{CatalogItem, CatalogKind, CoreError, CoreResult};
use marquee_db::{CatalogFilter, Database};

#[derive(Debug, Clone)]
pub struct CatalogReader {
    db: Database,
}

impl CatalogReader {
    pub fn new(db: Database) -> Self {
        CatalogReader { db }
    }

    /// Active equipment, ordered by category then name.
    pub async fn list_equipment(&self, filter: &CatalogFilter) -> CoreResult<Vec<CatalogItem>> {
        Ok(self.db.catalog().list(CatalogKind::Equipment, filter).await?)
    }

    /// Active packages, ordered by category then name.
    pub async fn list_packages(&self, filter: &CatalogFilter) -> CoreResult<Vec<CatalogItem>> {
        Ok(self.db.catalog().list(CatalogKind::Package, filter).await?)
    }

    /// Fetches one item, listed or not.
    ///
    /// ## Errors
    /// `NotFound` when no item has this id.
    pub async fn get_by_id(&self, id: &str) -> CoreResult<CatalogItem> {
        self.db
            .catalog()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("CatalogItem", id))
    }

    /// Fetches an item the customer is about to add to their selection.
    ///
    /// ## Errors
    /// - `NotFound` when no item has this id
    /// - `ItemUnavailable` when the item is inactive, or is equipment with
    ///   no units left
    pub async fn select(&self, id: &str) -> CoreResult<CatalogItem> {
        let item = self.get_by_id(id).await?;

        if !item.is_selectable() {
            debug!(
                item_id = %id,
                active = item.is_active,
                units = item.available_units,
                "Rejected selection of unavailable item"
            );
            return Err(CoreError::ItemUnavailable {
                item_id: item.id,
            });
        }

        Ok(item)
    }
}
