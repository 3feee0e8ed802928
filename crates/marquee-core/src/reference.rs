//! # Reference Generator
//!
//! Human-facing quote reference codes, quoted by customers on EFT payments.
//!
//! ## Format
//! ```text
//!   QT-261019-0001A3F9
//!   ── ────── ──── ────
//!   │    │     │    └── 4 random hex digits (survives process restarts)
//!   │    │     └─────── per-generator sequence (never repeats in-process)
//!   │    └───────────── submission date, YYMMDD (UTC)
//!   └────────────────── configurable prefix
//! ```
//!
//! The sequence makes two calls on one generator distinct even when they
//! race. The random suffix covers restarts and multiple processes, and the
//! `UNIQUE` index on `quote_requests.reference` is the final guard.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::DEFAULT_REFERENCE_PREFIX;

/// Thread-safe generator of unique quote references.
///
/// Share one instance (behind `Arc` or a `&'static`) across all submissions.
#[derive(Debug)]
pub struct ReferenceGenerator {
    prefix: String,
    sequence: AtomicU64,
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        ReferenceGenerator::new(DEFAULT_REFERENCE_PREFIX)
    }
}

impl ReferenceGenerator {
    /// Creates a generator with the given prefix (upper-cased).
    pub fn new(prefix: impl AsRef<str>) -> Self {
        ReferenceGenerator::starting_at(prefix, 0)
    }

    /// Creates a generator whose first reference uses sequence `last + 1`.
    ///
    /// Seeding from the stored quote count keeps sequence numbers readable
    /// across restarts.
    pub fn starting_at(prefix: impl AsRef<str>, last: u64) -> Self {
        ReferenceGenerator {
            prefix: prefix.as_ref().trim().to_uppercase(),
            sequence: AtomicU64::new(last),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generates the next reference for today's date.
    pub fn generate(&self) -> String {
        self.generate_on(Utc::now().date_naive())
    }

    /// Generates the next reference stamped with `date`.
    pub fn generate_on(&self, date: NaiveDate) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let entropy = Uuid::new_v4().simple().to_string();
        let suffix = entropy[..4].to_uppercase();

        format!(
            "{}-{}-{:04}{}",
            self.prefix,
            date.format("%y%m%d"),
            seq,
            suffix
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
