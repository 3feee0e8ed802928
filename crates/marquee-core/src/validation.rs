//! # Validation Module
//!
//! Field-level validation rules for quote forms and catalog entries.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront form (TypeScript)                                 │
//! │  └── Immediate feedback, never trusted                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: QuoteBuilder (Rust)                                          │
//! │  └── THIS MODULE: one validator per field, results collected           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE reference, UNIQUE customer email                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validator returns the normalized value on success so callers never
//! have to trim or parse twice.
//!
//! ## Usage
//! ```rust
//! use marquee_core::validation::{validate_email, validate_event_date};
//!
//! assert_eq!(validate_email(" Thandi@Example.com ").unwrap(), "thandi@example.com");
//! assert!(validate_event_date("2026-02-30").is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::{CatalogItem, CatalogKind, EventType, PaymentMethod};
use crate::SERVICE_CATEGORIES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted free-text field (names, locations, companies).
pub const MAX_TEXT_LEN: usize = 200;

/// Longest accepted notes field.
pub const MAX_NOTES_LEN: usize = 2000;

/// Largest guest count accepted on a quote form.
pub const MAX_GUEST_COUNT: i64 = 100_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most [`MAX_TEXT_LEN`] characters
///
/// ## Returns
/// The trimmed value.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(value.to_string())
}

/// Normalizes an optional free-text field: trimmed, empty becomes `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates an email address against a basic `local@domain` shape.
///
/// ## Rules
/// - Must not be empty
/// - Exactly one `@`, with a non-empty local part
/// - Domain contains a dot that is neither its first nor last character
/// - No whitespace anywhere
///
/// ## Returns
/// The trimmed, lower-cased address (the customer key).
///
/// ## Example
/// ```rust
/// use marquee_core::validation::validate_email;
///
/// assert!(validate_email("events@marquee.co.za").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// assert!(validate_email("a@b").is_err());
/// ```
pub fn validate_email(value: &str) -> ValidationResult<String> {
    let email = value.trim().to_lowercase();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return Err(invalid("missing @")),
    };

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@domain"));
    }

    let dot_inside = domain
        .find('.')
        .map(|pos| pos > 0 && !domain.ends_with('.'))
        .unwrap_or(false);
    if !dot_inside {
        return Err(invalid("domain must look like example.com"));
    }

    Ok(email)
}

/// Validates the free-text notes field.
///
/// ## Returns
/// The trimmed notes, `None` when empty.
pub fn validate_notes(value: Option<&str>) -> ValidationResult<Option<String>> {
    let notes = normalize_optional(value);

    if let Some(text) = &notes {
        if text.chars().count() > MAX_NOTES_LEN {
            return Err(ValidationError::TooLong {
                field: "notes".to_string(),
                max: MAX_NOTES_LEN,
            });
        }
    }

    Ok(notes)
}

// =============================================================================
// Event Validators
// =============================================================================

/// Parses an ISO `YYYY-MM-DD` event date.
///
/// Rejects impossible calendar dates such as `2026-02-30`.
pub fn validate_event_date(value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: "date".to_string(),
        });
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: "date".to_string(),
        reason: "must be a calendar date in YYYY-MM-DD form".to_string(),
    })
}

/// Resolves the event type and its free-text override.
///
/// ## Rules
/// - Known types parse case-insensitively (`"Private Party"` → `private_party`)
/// - Unknown text becomes `other` with the text kept as the override
/// - Empty input becomes `other`, using `other_text` if supplied
///
/// Never fails: the event type is descriptive, not a hard requirement.
pub fn resolve_event_type(value: &str, other_text: Option<&str>) -> (EventType, Option<String>) {
    let override_text = normalize_optional(other_text);

    match value.trim().parse::<EventType>() {
        Ok(EventType::Other) => (EventType::Other, override_text),
        Ok(known) => (known, None),
        Err(_) if value.trim().is_empty() => (EventType::Other, override_text),
        Err(_) => (
            EventType::Other,
            override_text.or_else(|| Some(value.trim().to_string())),
        ),
    }
}

/// Validates an optional guest count.
///
/// ## Rules
/// - Absent is fine
/// - When present, between 1 and [`MAX_GUEST_COUNT`]
pub fn validate_guest_count(value: Option<i64>) -> ValidationResult<Option<i64>> {
    match value {
        None => Ok(None),
        Some(n) if (1..=MAX_GUEST_COUNT).contains(&n) => Ok(Some(n)),
        Some(_) => Err(ValidationError::OutOfRange {
            field: "guestCount".to_string(),
            min: 1,
            max: MAX_GUEST_COUNT,
        }),
    }
}

/// Validates the payment method (`eft` or `cash`).
pub fn validate_payment_method(value: &str) -> ValidationResult<PaymentMethod> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "paymentMethod".to_string(),
        });
    }

    value
        .parse::<PaymentMethod>()
        .map_err(|_| ValidationError::NotAllowed {
            field: "paymentMethod".to_string(),
            allowed: PaymentMethod::ALL
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
        })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary items inside packages)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "dailyPrice".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates one priced line of a selection or a quote.
///
/// ## Rules
/// - Quantity at least 1, and at most `max_quantity` when one is known
/// - Unit price non-negative
///
/// Failures are keyed to `items` and name the offending line.
pub fn validate_line(
    name: &str,
    quantity: i64,
    max_quantity: Option<i64>,
    unit_price_cents: i64,
) -> ValidationResult<()> {
    let invalid = |reason: String| ValidationError::InvalidFormat {
        field: "items".to_string(),
        reason,
    };

    match max_quantity {
        Some(max) if !(1..=max).contains(&quantity) => {
            return Err(invalid(format!(
                "quantity of {} must be between 1 and {}",
                name, max
            )));
        }
        None if quantity < 1 => {
            return Err(invalid(format!("quantity of {} must be at least 1", name)));
        }
        _ => {}
    }

    if unit_price_cents < 0 {
        return Err(invalid(format!("price of {} must not be negative", name)));
    }

    Ok(())
}

/// Validates an available-units count (non-negative).
pub fn validate_available_units(units: i64) -> ValidationResult<()> {
    if units < 0 {
        return Err(ValidationError::OutOfRange {
            field: "availableUnits".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a catalog item before staff tooling stores it.
///
/// ## Rules
/// - Name required
/// - Price and available units non-negative
/// - Equipment category must be one of [`SERVICE_CATEGORIES`]; packages may
///   use free text
pub fn validate_catalog_item(item: &CatalogItem) -> ValidationResult<()> {
    validate_required("name", &item.name)?;
    validate_price_cents(item.daily_price_cents)?;
    validate_available_units(item.available_units)?;

    if item.kind == CatalogKind::Equipment && !SERVICE_CATEGORIES.contains(&item.category.as_str()) {
        return Err(ValidationError::NotAllowed {
            field: "category".to_string(),
            allowed: SERVICE_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
