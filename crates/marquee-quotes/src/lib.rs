//! # marquee-quotes: Quote Services for Marquee Rentals
//!
//! The layer the web backend calls into: catalog browsing, quote
//! submission, and the staff lifecycle (approve, reject, payment, edit).
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Marquee Quote Engine                            │
//! │                                                                         │
//! │  Storefront (customer)              Back office (staff)                 │
//! │       │                                  │                              │
//! │       ├─► CatalogReader                  ├─► QuoteLifecycleManager      │
//! │       │     list / select                │     approve / reject         │
//! │       │                                  │     update_payment_status    │
//! │       └─► QuoteSubmissionService         │     edit / list / delete     │
//! │             Selection ─► QuoteBuilder    │          │                   │
//! │                  ─► QuoteRepository      │          ▼                   │
//! │                                          │   NotificationDispatcher     │
//! │                                          │                              │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  marquee-db: Database (catalog, quotes, customers)               │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`catalog`] - Catalog Reader and the selectable-item gate
//! - [`submission`] - Builds and stores customer quote requests
//! - [`lifecycle`] - Staff transitions and customer booking
//! - [`notify`] - Notification dispatchers
//! - [`engine`] - Wires the services together from configuration
//! - [`config`] - TOML + environment configuration
//! - [`telemetry`] - Tracing subscriber setup
//! - [`error`] - Configuration error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marquee_quotes::{LogDispatcher, QuoteEngine, QuotesConfig};
//!
//! let config = QuotesConfig::load(None)?;
//! marquee_quotes::telemetry::init_tracing(Some(&config.logging.filter));
//!
//! let engine = QuoteEngine::open(&config, LogDispatcher).await?;
//! let item = engine.catalog.select("vip-toilet").await?;
//! selection.toggle(&item);
//! let quote = engine.submissions.submit_form(form, &selection).await?;
//! engine.lifecycle.approve(&quote.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod submission;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::CatalogReader;
pub use config::{DatabaseSettings, LoggingSettings, QuoteSettings, QuotesConfig};
pub use engine::QuoteEngine;
pub use error::{ConfigError, ConfigResult};
pub use lifecycle::QuoteLifecycleManager;
pub use notify::{ChannelDispatcher, LogDispatcher, NotificationDispatcher};
pub use submission::QuoteSubmissionService;
