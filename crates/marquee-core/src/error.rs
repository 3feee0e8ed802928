//! # Error Types
//!
//! Domain-specific error types for marquee-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  marquee-core errors (this file)                                       │
//! │  ├── CoreError         - What every core/service operation returns     │
//! │  ├── ValidationErrors  - All field failures of one quote submission    │
//! │  └── ValidationError   - One field failure                             │
//! │                                                                         │
//! │  marquee-db errors (separate crate)                                    │
//! │  └── DbError           - Database failures, folded into CoreError      │
//! │                                                                         │
//! │  Flow: ValidationError → ValidationErrors → CoreError → transport      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every validation failure names its field so forms can highlight it
//! 3. Errors are enum variants, never String
//! 4. Nothing is swallowed: the operation that detects an error returns it

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors surfaced by catalog reads, quote submission and lifecycle actions.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Client-caused, recoverable by correcting the input.
    ///
    /// Carries one entry per failed field.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The referenced catalog item, quote request or customer does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The backing store could not be reached or failed mid-operation.
    ///
    /// ## Retry Policy
    /// None here. Retrying belongs to the transport/collaborator layer, so
    /// this is propagated upward unmodified.
    #[error("Backing store unavailable: {0}")]
    Unavailable(String),

    /// A catalog item cannot be selected (inactive or no units available).
    #[error("Catalog item {item_id} is not available for selection")]
    ItemUnavailable { item_id: String },
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_) | CoreError::NotFound { .. } | CoreError::ItemUnavailable { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid email, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A collection that must hold at least one entry is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },
}

impl ValidationError {
    /// The form field this failure belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Empty { field } => field,
        }
    }
}

// =============================================================================
// Validation Errors (collected)
// =============================================================================

/// Every failure found while validating one submission.
///
/// ## Why Collect?
/// The quote form shows all problems at once; stopping at the first failure
/// would make the customer resubmit once per mistake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure.
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Records the error side of a validation result, passing the value on.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns the individual failures in the order they were found.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Names of the failed fields, in order, without duplicates.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field()) {
                fields.push(error.field());
            }
        }
        fields
    }

    /// True when at least one failure is keyed to `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field() == field)
    }

    /// `(field, message)` pairs for form rendering.
    pub fn messages(&self) -> Vec<(String, String)> {
        self.errors
            .iter()
            .map(|e| (e.field().to_string(), e.to_string()))
            .collect()
    }

    /// Converts into `Ok(value)` when nothing failed.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors {
            errors: vec![error],
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
