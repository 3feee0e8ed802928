//! # marquee-db: Database Layer for the Quote Engine
//!
//! Persistence for catalog items, quote requests and customer records, on
//! SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Marquee Data Flow                                │
//! │                                                                         │
//! │  marquee-quotes service (approve, submit, list, ...)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   marquee-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │◄───│ CatalogRepo    │   │ 001_initial  │   │   │
//! │  │   │ SqlitePool    │    │ QuoteRepo      │   │   _schema    │   │   │
//! │  │   │               │    │ CustomerRepo   │   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, quote, customer)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marquee_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./marquee.db")).await?;
//! let quote = db.quotes().get_by_reference("QT-261019-0001A3F9").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::catalog::CatalogRepository;
pub use repository::customer::CustomerRepository;
pub use repository::quote::{QuoteRepository, StatusCounts};
pub use repository::{CatalogFilter, CustomerListQuery, Pagination, QuoteListQuery};
