//! # Repository Module
//!
//! Database repository implementations for the quote engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service (marquee-quotes)                                              │
//! │       │                                                                 │
//! │       │  db.quotes().list(&QuoteListQuery::new().status(Pending))       │
//! │       ▼                                                                 │
//! │  QuoteRepository                                                       │
//! │  ├── insert / update         (quote row + snapshot items, one tx)      │
//! │  ├── get_by_id / get_by_reference / list                               │
//! │  └── mark_approved           (customer upsert + status, one tx)        │
//! │       │                                                                 │
//! │       │  Row structs (FromRow) ⇄ canonical marquee-core types          │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row structs are the persistence-boundary adapters: storage shapes (flat
//! customer columns, JSON list columns, integer booleans) never leak past
//! this module.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Catalog reads, plus writes for staff tooling
//! - [`quote::QuoteRepository`] - Quote requests and their snapshot items
//! - [`customer::CustomerRepository`] - Customer records derived from approvals

use marquee_core::{PaymentStatus, QuoteStatus};

use crate::error::DbResult;

pub mod catalog;
pub mod customer;
pub mod quote;

/// Default page size when a list query is not paginated explicitly.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 200;

// =============================================================================
// Pagination
// =============================================================================

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Builds a page selection, clamping nonsense input (page 0, huge pages).
    pub fn new(page: usize, per_page: usize) -> Self {
        Pagination {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        ((self.page - 1) * self.per_page) as i64
    }
}

// =============================================================================
// Catalog Filter
// =============================================================================

/// Optional narrowing for catalog listings. Inactive items are never listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<String>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    /// Hide equipment with no units left (packages always pass).
    pub available_only: bool,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn available_only(mut self) -> Self {
        self.available_only = true;
        self
    }
}

// =============================================================================
// Quote List Query
// =============================================================================

/// Admin listing of quote requests, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteListQuery {
    pub status: Option<QuoteStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Exact customer email (compared case-insensitively).
    pub email: Option<String>,
    /// Matches reference, customer name or email, or location.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl QuoteListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: QuoteStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn payment_status(mut self, payment_status: PaymentStatus) -> Self {
        self.payment_status = Some(payment_status);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }
}

// =============================================================================
// Customer List Query
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerListQuery {
    /// Matches name, email or company.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CustomerListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// `%term%` LIKE pattern with LIKE metacharacters escaped (`ESCAPE '\'`).
///
/// Returns `None` for blank search terms so callers can skip the clause.
pub(crate) fn like_pattern(term: Option<&str>) -> Option<String> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped.to_lowercase()))
}

/// Encodes a string list column.
pub(crate) fn encode_list(values: &[String]) -> DbResult<String> {
    Ok(serde_json::to_string(values)?)
}

/// Decodes a string list column.
pub(crate) fn decode_list(raw: &str) -> DbResult<Vec<String>> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps() {
        let page = Pagination::new(0, 10_000);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 0);

        assert_eq!(Pagination::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_like_pattern_escapes() {
        assert_eq!(like_pattern(Some("  ")), None);
        assert_eq!(like_pattern(None), None);
        assert_eq!(like_pattern(Some("VIP")).as_deref(), Some("%vip%"));
        assert_eq!(like_pattern(Some("50%_off")).as_deref(), Some("%50\\%\\_off%"));
    }

    #[test]
    fn test_list_columns() {
        let raw = encode_list(&["Flushing".to_string(), "Hand basin".to_string()]).unwrap();
        assert_eq!(decode_list(&raw).unwrap(), vec!["Flushing", "Hand basin"]);
        assert!(decode_list("not json").is_err());
    }
}
