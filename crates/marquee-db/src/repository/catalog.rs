//! # Catalog Repository
//!
//! Database operations for equipment and packages.
//!
//! The quote engine only reads the catalog. `insert`, `update` and
//! `set_active` exist for staff tooling and the seed binary; nothing here
//! decrements `available_units` when items are selected or quoted.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use marquee_core::{CatalogItem, CatalogKind};

use super::{decode_list, encode_list, like_pattern, CatalogFilter};
use crate::error::{DbError, DbResult};

const CATALOG_COLUMNS: &str = "id, kind, name, category, description, daily_price_cents, \
     available_units, features, image_url, is_active, created_at, updated_at";

// =============================================================================
// Row Adapter
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: String,
    kind: CatalogKind,
    name: String,
    category: String,
    description: Option<String>,
    daily_price_cents: i64,
    available_units: i64,
    features: String,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CatalogRow {
    fn into_item(self) -> DbResult<CatalogItem> {
        Ok(CatalogItem {
            features: decode_list(&self.features)?,
            id: self.id,
            kind: self.kind,
            name: self.name,
            category: self.category,
            description: self.description,
            daily_price_cents: self.daily_price_cents,
            available_units: self.available_units,
            image_url: self.image_url,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog item database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Gets a catalog item by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CatalogItem>> {
        let sql = format!("SELECT {} FROM catalog_items WHERE id = ?1", CATALOG_COLUMNS);

        let row: Option<CatalogRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CatalogRow::into_item).transpose()
    }

    /// Lists active items of one kind, ordered by category then name.
    ///
    /// ## Filters
    /// - `category`: exact match
    /// - `search`: case-insensitive substring of name or description
    /// - `available_only`: equipment with `available_units > 0`, all packages
    pub async fn list(&self, kind: CatalogKind, filter: &CatalogFilter) -> DbResult<Vec<CatalogItem>> {
        debug!(kind = %kind, ?filter, "Listing catalog items");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM catalog_items WHERE is_active = 1 AND kind = ",
            CATALOG_COLUMNS
        ));
        qb.push_bind(kind);

        if let Some(category) = filter.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            qb.push(" AND category = ").push_bind(category.to_string());
        }

        if let Some(pattern) = like_pattern(filter.search.as_deref()) {
            qb.push(" AND (lower(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR lower(coalesce(description, '')) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        if filter.available_only {
            qb.push(" AND (kind = 'package' OR available_units > 0)");
        }

        qb.push(" ORDER BY category, name");

        let rows: Vec<CatalogRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        rows.into_iter().map(CatalogRow::into_item).collect()
    }

    /// Counts active items of one kind.
    pub async fn count_active(&self, kind: CatalogKind) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM catalog_items WHERE is_active = 1 AND kind = ?1")
                .bind(kind)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Inserts a new catalog item (staff tooling / seeding).
    pub async fn insert(&self, item: &CatalogItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting catalog item");

        sqlx::query(
            r#"
            INSERT INTO catalog_items (
                id, kind, name, category, description,
                daily_price_cents, available_units, features, image_url,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&item.id)
        .bind(item.kind)
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.description)
        .bind(item.daily_price_cents)
        .bind(item.available_units)
        .bind(encode_list(&item.features)?)
        .bind(&item.image_url)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Overwrites a catalog item's editable fields (staff tooling).
    pub async fn update(&self, item: &CatalogItem) -> DbResult<()> {
        debug!(id = %item.id, "Updating catalog item");

        let result = sqlx::query(
            r#"
            UPDATE catalog_items SET
                kind = ?2,
                name = ?3,
                category = ?4,
                description = ?5,
                daily_price_cents = ?6,
                available_units = ?7,
                features = ?8,
                image_url = ?9,
                is_active = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(item.kind)
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.description)
        .bind(item.daily_price_cents)
        .bind(item.available_units)
        .bind(encode_list(&item.features)?)
        .bind(&item.image_url)
        .bind(item.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CatalogItem", &item.id));
        }

        Ok(())
    }

    /// Lists or unlists an item (soft delete).
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE catalog_items SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(is_active)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CatalogItem", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn item(id: &str, kind: CatalogKind, name: &str, category: &str, units: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            kind,
            name: name.to_string(),
            category: category.to_string(),
            description: Some(format!("{} for hire", name)),
            daily_price_cents: 50_000,
            available_units: units,
            features: vec!["Delivery included".to_string(), "Setup".to_string()],
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.catalog();
        repo.insert(&item("t1", CatalogKind::Equipment, "VIP Toilet", "mobile-toilets", 5))
            .await
            .unwrap();
        repo.insert(&item("t2", CatalogKind::Equipment, "Standard Toilet", "mobile-toilets", 0))
            .await
            .unwrap();
        repo.insert(&item("n1", CatalogKind::Equipment, "Stretch Tent", "tents", 2))
            .await
            .unwrap();
        repo.insert(&item("p1", CatalogKind::Package, "Wedding Package", "wedding", 0))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_get_by_id_round_trips_features() {
        let db = seeded().await;

        let found = db.catalog().get_by_id("t1").await.unwrap().unwrap();
        assert_eq!(found.name, "VIP Toilet");
        assert_eq!(found.features, vec!["Delivery included", "Setup"]);
        assert_eq!(found.kind, CatalogKind::Equipment);

        assert!(db.catalog().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = seeded().await;
        let repo = db.catalog();

        let equipment = repo.list(CatalogKind::Equipment, &CatalogFilter::new()).await.unwrap();
        assert_eq!(equipment.len(), 3);

        let toilets = repo
            .list(CatalogKind::Equipment, &CatalogFilter::new().category("mobile-toilets"))
            .await
            .unwrap();
        assert_eq!(toilets.len(), 2);

        let available = repo
            .list(
                CatalogKind::Equipment,
                &CatalogFilter::new().category("mobile-toilets").available_only(),
            )
            .await
            .unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, "t1");

        let search = repo
            .list(CatalogKind::Equipment, &CatalogFilter::new().search("vip"))
            .await
            .unwrap();
        assert_eq!(search.len(), 1);

        let packages = repo
            .list(CatalogKind::Package, &CatalogFilter::new().available_only())
            .await
            .unwrap();
        assert_eq!(packages.len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_items_are_not_listed() {
        let db = seeded().await;
        let repo = db.catalog();

        repo.set_active("n1", false).await.unwrap();

        let tents = repo
            .list(CatalogKind::Equipment, &CatalogFilter::new().category("tents"))
            .await
            .unwrap();
        assert!(tents.is_empty());
        assert_eq!(repo.count_active(CatalogKind::Equipment).await.unwrap(), 2);
        assert!(!repo.get_by_id("n1").await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() {
        let db = seeded().await;
        let ghost = item("ghost", CatalogKind::Equipment, "Ghost", "tents", 1);

        let err = db.catalog().update(&ghost).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
