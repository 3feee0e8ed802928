//! # Lifecycle Rules
//!
//! Pure rules behind staff triage: which approvals book a customer, how a
//! booking changes a customer record, and how an edit patches a quote.
//! The stateful manager that persists these lives in `marquee-quotes`.
//!
//! ## Approval Side Effects
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  approve(quote_id)                                                      │
//! │                                                                         │
//! │  policy.should_book(status)?                                            │
//! │       │                                                                 │
//! │       ├── no  ─► return quote unchanged (idempotent re-approval)        │
//! │       │                                                                 │
//! │       └── yes ─► (a) CustomerBooking::from_quote ─► upsert by email     │
//! │                  (b) status = approved                                  │
//! │                  (c) NotificationSignal { quote_approved }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{ValidationError, ValidationErrors};
use crate::money::Money;
use crate::types::{
    normalize_email, ContactDetails, CustomerRecord, CustomerStatus, EventDetails, PaymentMethod,
    QuoteItem, QuoteRequest, QuoteStatus,
};
use crate::validation::{
    normalize_optional, validate_email, validate_guest_count, validate_line, validate_required,
};

// =============================================================================
// Approval Policy
// =============================================================================

/// How repeat approvals of one quote are booked.
///
/// ## Variants
/// - `Permissive`: every `approve` books the customer again, whatever the
///   current status. Matches the established admin workflow.
/// - `Idempotent`: approving an already-approved quote is a successful
///   no-op. A rejected quote can still be approved (and booked) again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ApprovalPolicy {
    #[default]
    Permissive,
    Idempotent,
}

impl ApprovalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalPolicy::Permissive => "permissive",
            ApprovalPolicy::Idempotent => "idempotent",
        }
    }

    /// Whether approving a quote currently in `current` books the customer.
    pub fn should_book(&self, current: QuoteStatus) -> bool {
        match self {
            ApprovalPolicy::Permissive => true,
            ApprovalPolicy::Idempotent => current != QuoteStatus::Approved,
        }
    }
}

impl FromStr for ApprovalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permissive" => Ok(ApprovalPolicy::Permissive),
            "idempotent" => Ok(ApprovalPolicy::Idempotent),
            other => Err(format!("unknown approval policy: {}", other)),
        }
    }
}

impl fmt::Display for ApprovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Customer Booking
// =============================================================================

/// The customer-side effect of one approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerBooking {
    /// Case-insensitive customer key.
    pub email_key: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    /// Amount added to `total_spent`.
    pub amount_cents: i64,
    pub event_date: NaiveDate,
}

impl CustomerBooking {
    pub fn from_quote(quote: &QuoteRequest) -> Self {
        CustomerBooking {
            email_key: normalize_email(&quote.customer.email),
            name: quote.customer.name.clone(),
            email: quote.customer.email.clone(),
            phone: quote.customer.phone.clone(),
            company: quote.customer.company.clone(),
            amount_cents: quote.total_amount_cents,
            event_date: quote.event.date,
        }
    }

    /// The record created when no customer with this email exists yet.
    pub fn open_record(&self) -> CustomerRecord {
        let now = Utc::now();
        CustomerRecord {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            email: self.email_key.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            status: CustomerStatus::Active,
            total_bookings: 1,
            total_spent_cents: self.amount_cents,
            last_event_date: Some(self.event_date),
            created_at: now,
            updated_at: now,
        }
    }

    /// Books an existing customer again.
    ///
    /// Contact details stay as first recorded; only the booking counters,
    /// last event date and status change.
    pub fn apply_to(&self, record: &mut CustomerRecord) {
        record.total_bookings += 1;
        record.total_spent_cents = record.total_spent_cents.saturating_add(self.amount_cents);
        record.last_event_date = Some(self.event_date);
        record.status = CustomerStatus::Active;
        record.updated_at = Utc::now();
    }
}

// =============================================================================
// Quote Patch
// =============================================================================

/// Staff edit of a quote's mutable fields.
///
/// `reference`, `status`, `payment_status` and `created_at` are not
/// patchable. Nothing is recomputed: changing `items` leaves the total as it
/// was unless `total_amount_cents` is supplied too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct QuotePatch {
    pub customer: Option<ContactDetails>,
    pub event: Option<EventDetails>,
    pub items: Option<Vec<QuoteItem>>,
    pub total_amount_cents: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    /// `Some(None)` clears the notes.
    #[serde(with = "double_option")]
    #[ts(as = "Option<String>")]
    pub notes: Option<Option<String>>,
}

impl QuotePatch {
    pub fn is_empty(&self) -> bool {
        self == &QuotePatch::default()
    }

    /// Checks the supplied fields and returns the patch with them
    /// normalized: text trimmed, email lower-cased, empty company dropped.
    /// Absent fields are not checked.
    pub fn validate(mut self) -> Result<QuotePatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(customer) = self.customer.as_mut() {
            if let Some(name) = errors.check(validate_required("name", &customer.name)) {
                customer.name = name;
            }
            if let Some(email) = errors.check(validate_email(&customer.email)) {
                customer.email = email;
            }
            if let Some(phone) = errors.check(validate_required("phone", &customer.phone)) {
                customer.phone = phone;
            }
            customer.company = normalize_optional(customer.company.as_deref());
        }

        if let Some(event) = self.event.as_mut() {
            if let Some(location) = errors.check(validate_required("location", &event.location)) {
                event.location = location;
            }
            errors.check(validate_guest_count(event.guest_count));
        }

        if let Some(items) = &self.items {
            if items.is_empty() {
                errors.push(ValidationError::Empty {
                    field: "items".to_string(),
                });
            }
            for item in items {
                errors.check(validate_line(
                    &item.name,
                    item.quantity,
                    None,
                    item.unit_price_cents,
                ));
            }
            if Money::checked_sum(items.iter().map(QuoteItem::checked_line_total)).is_none() {
                errors.push(ValidationError::OutOfRange {
                    field: "items".to_string(),
                    min: 0,
                    max: i64::MAX,
                });
            }
        }

        if let Some(total) = self.total_amount_cents {
            if total < 0 {
                errors.push(ValidationError::OutOfRange {
                    field: "totalAmount".to_string(),
                    min: 0,
                    max: i64::MAX,
                });
            }
        }

        errors.into_result(self)
    }

    /// Overwrites the supplied fields and bumps `updated_at`.
    pub fn apply(self, quote: &mut QuoteRequest) {
        if let Some(mut customer) = self.customer {
            customer.email = normalize_email(&customer.email);
            quote.customer = customer;
        }
        if let Some(event) = self.event {
            quote.event = event;
        }
        if let Some(items) = self.items {
            quote.items = items;
        }
        if let Some(total) = self.total_amount_cents {
            quote.total_amount_cents = total;
        }
        if let Some(method) = self.payment_method {
            quote.payment_method = method;
        }
        if let Some(notes) = self.notes {
            quote.notes = notes;
        }
        quote.updated_at = Utc::now();
    }
}

/// Distinguishes an absent `notes` key from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Option<String>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
