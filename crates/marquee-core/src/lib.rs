//! # marquee-core: Pure Business Logic for the Quote Engine
//!
//! This crate is the **heart** of the rental back office. It holds every rule
//! that turns a customer's equipment/package picks into a priced quote
//! request and moves that request through staff triage, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Marquee Quote Flow                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Storefront / Admin (web)                       │   │
//! │  │   Browse ──► Select items ──► Quote form ──► Staff triage       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (out of scope)                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 marquee-quotes (services)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ marquee-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌───────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │  │  types   │ │ selection │ │  quote   │ │    lifecycle     │  │   │
//! │  │  │ Catalog  │ │ toggle    │ │ build()  │ │ approval policy  │  │   │
//! │  │  │ Quote    │ │ clamp qty │ │ validate │ │ customer booking │  │   │
//! │  │  └──────────┘ └───────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  marquee-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CatalogItem, QuoteRequest, CustomerRecord, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`selection`] - The in-progress selection (cart) of catalog items
//! - [`quote`] - Assembles and validates a submittable quote request
//! - [`lifecycle`] - Status transition rules and customer booking math
//! - [`reference`] - Human-facing quote reference codes
//! - [`validation`] - Field-level validation rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use marquee_core::money::Money;
//!
//! let day_rate = Money::from_major_minor(500, 0); // R500.00 per day
//! let line = day_rate * 2i64;
//!
//! assert_eq!(line.cents(), 100_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod quote;
pub mod reference;
pub mod selection;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use lifecycle::{ApprovalPolicy, CustomerBooking, QuotePatch};
pub use money::Money;
pub use quote::{ContactForm, EventForm, QuoteBuilder, QuoteForm};
pub use reference::ReferenceGenerator;
pub use selection::{SelectedItem, Selection, SelectionChange};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Service categories offered for equipment.
///
/// Packages may carry free-text categories; equipment is expected to use one
/// of these so the storefront can group it.
pub const SERVICE_CATEGORIES: &[&str] = &[
    "mobile-toilets",
    "tents",
    "furniture",
    "decor",
    "lighting",
    "sound",
    "catering",
    "power",
];

/// Default prefix for quote references when none is configured.
pub const DEFAULT_REFERENCE_PREFIX: &str = "QT";
