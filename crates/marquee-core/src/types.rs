//! # Domain Types
//!
//! Core domain types used throughout the quote engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │  QuoteRequest   │   │ CustomerRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id / reference │   │  email (key)    │       │
//! │  │  kind           │──►│  items (frozen) │──►│  total_bookings │       │
//! │  │  daily_price    │   │  total_amount   │   │  total_spent    │       │
//! │  │  available_units│   │  status         │   │  last_event     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  QuoteStatus:   pending ─► approved / rejected                          │
//! │  PaymentStatus: pending / paid / failed / refunded (independent)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Quote requests have:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `reference`: human-readable code used for EFT payment matching

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog Kind
// =============================================================================

/// Whether a catalog entry is individual equipment or a bundled package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Equipment,
    Package,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Equipment => "equipment",
            CatalogKind::Package => "package",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// An equipment unit or package available for selection.
///
/// Created and edited by staff tooling; read-only to the quote engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub kind: CatalogKind,

    /// Display name shown on the storefront and in quotes.
    pub name: String,

    /// One of [`crate::SERVICE_CATEGORIES`] for equipment, free text for packages.
    pub category: String,

    pub description: Option<String>,

    /// Price per day in cents.
    pub daily_price_cents: i64,

    /// Units on hand. Packages ignore this and are capped at one per quote.
    pub available_units: i64,

    /// Ordered feature bullet points.
    pub features: Vec<String>,

    /// Public URL of the product image (served by the image store).
    pub image_url: Option<String>,

    /// Whether the item is listed (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Returns the daily price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.daily_price_cents)
    }

    /// The most units of this item one selection may hold.
    ///
    /// ## Rules
    /// - Packages: always 1
    /// - Equipment: `available_units` at the time of selection
    pub fn max_quantity(&self) -> i64 {
        match self.kind {
            CatalogKind::Package => 1,
            CatalogKind::Equipment => self.available_units.max(0),
        }
    }

    /// Checks if the item can be added to a selection right now.
    ///
    /// This is the caller-side check; the selection itself trusts whatever
    /// snapshot it is given.
    pub fn is_selectable(&self) -> bool {
        if !self.is_active {
            return false;
        }

        match self.kind {
            CatalogKind::Package => true,
            CatalogKind::Equipment => self.available_units > 0,
        }
    }
}

// =============================================================================
// Event Type
// =============================================================================

/// Kind of event the rental is for.
///
/// `Other` is paired with a free-text override on [`EventDetails`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Wedding,
    Corporate,
    Birthday,
    Funeral,
    Festival,
    Conference,
    PrivateParty,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Wedding,
        EventType::Corporate,
        EventType::Birthday,
        EventType::Funeral,
        EventType::Festival,
        EventType::Conference,
        EventType::PrivateParty,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Wedding => "wedding",
            EventType::Corporate => "corporate",
            EventType::Birthday => "birthday",
            EventType::Funeral => "funeral",
            EventType::Festival => "festival",
            EventType::Conference => "conference",
            EventType::PrivateParty => "private_party",
            EventType::Other => "other",
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("unknown event type: {}", s))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Electronic funds transfer, matched by quote reference.
    Eft,
    /// Cash on delivery or at the office.
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::Eft, PaymentMethod::Cash];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Eft => "eft",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eft" => Ok(PaymentMethod::Eft),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Quote Status
// =============================================================================

/// Triage status of a quote request.
///
/// ## State Machine
/// ```text
///            approve()                 reject()
///  pending ────────────► approved ◄──────────────┐
///     │                     │ reject()           │ approve()
///     │ reject()            ▼                    │
///     └─────────────────► rejected ──────────────┘
/// ```
/// Every state accepts `approve` and `reject`; see
/// [`crate::lifecycle::ApprovalPolicy`] for how repeat approvals are booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Submitted, awaiting staff triage.
    #[default]
    Pending,
    /// Accepted by staff; the customer has been booked.
    Approved,
    /// Declined by staff.
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "pending",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(QuoteStatus::Pending),
            "approved" => Ok(QuoteStatus::Approved),
            "rejected" => Ok(QuoteStatus::Rejected),
            other => Err(format!("unknown quote status: {}", other)),
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment progress, tracked independently of [`QuoteStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Contact & Event
// =============================================================================

/// Who the quote is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactDetails {
    pub name: String,
    /// Stored trimmed and lower-cased.
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
}

/// What the rental is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EventDetails {
    pub event_type: EventType,
    /// Free-text description when `event_type` is `Other`.
    pub event_type_other: Option<String>,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub guest_count: Option<i64>,
    pub location: String,
    /// Service categories requested, first-seen order.
    pub services: Vec<String>,
}

impl EventDetails {
    /// Label for emails and admin lists: the override text for `Other`.
    pub fn type_label(&self) -> &str {
        match (&self.event_type, &self.event_type_other) {
            (EventType::Other, Some(other)) => other,
            (event_type, _) => event_type.as_str(),
        }
    }
}

// =============================================================================
// Quote Item
// =============================================================================

/// A line on a submitted quote.
///
/// Uses the snapshot pattern: name, category and price are frozen at
/// submission so historical quotes stay stable when the catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteItem {
    /// Catalog item this line was taken from.
    pub item_id: String,
    pub kind: CatalogKind,
    pub name: String,
    pub category: String,
    /// Daily price in cents at time of submission (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl QuoteItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total (unit price × quantity), saturating.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn checked_line_total(&self) -> Option<Money> {
        self.unit_price().checked_multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Quote Request
// =============================================================================

/// The durable, submitted pricing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteRequest {
    pub id: String,
    /// Human-facing code; immutable once assigned.
    pub reference: String,
    pub customer: ContactDetails,
    pub event: EventDetails,
    pub items: Vec<QuoteItem>,
    /// Snapshot of the selection total at submission, in cents.
    pub total_amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: QuoteStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl QuoteRequest {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Sum of the item lines, independent of the stored total. Saturates.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(QuoteItem::line_total).sum()
    }

    /// True when the stored total equals the exact sum of the item lines.
    ///
    /// Always true at submission; staff edits may override it. Lines whose
    /// sum overflows are never consistent.
    pub fn is_total_consistent(&self) -> bool {
        Money::checked_sum(self.items.iter().map(QuoteItem::checked_line_total))
            == Some(self.total_amount())
    }
}

// =============================================================================
// Customer Record
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
}

/// A booked customer, derived from approved quote requests.
///
/// Unique by email, compared case-insensitively (see [`normalize_email`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub status: CustomerStatus,
    pub total_bookings: i64,
    pub total_spent_cents: i64,
    #[ts(as = "Option<String>")]
    pub last_event_date: Option<NaiveDate>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CustomerRecord {
    #[inline]
    pub fn total_spent(&self) -> Money {
        Money::from_cents(self.total_spent_cents)
    }
}

/// Canonical form of an email address used as the customer key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Notification Signal
// =============================================================================

/// Lifecycle events handed to the notification collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteEvent {
    QuoteApproved,
    QuoteRejected,
}

/// Payload emitted after a lifecycle transition.
///
/// The quote engine only emits this; delivering email is someone else's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NotificationSignal {
    pub event: QuoteEvent,
    pub quote_reference: String,
    pub customer_email: String,
}

impl NotificationSignal {
    pub fn for_quote(event: QuoteEvent, quote: &QuoteRequest) -> Self {
        NotificationSignal {
            event,
            quote_reference: quote.reference.clone(),
            customer_email: quote.customer.email.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_item(kind: CatalogKind, available_units: i64) -> CatalogItem {
        CatalogItem {
            id: "item-1".to_string(),
            kind,
            name: "VIP Toilet".to_string(),
            category: "mobile-toilets".to_string(),
            description: None,
            daily_price_cents: 50_000,
            available_units,
            features: vec!["Flushing".to_string()],
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_max_quantity_by_kind() {
        assert_eq!(catalog_item(CatalogKind::Equipment, 5).max_quantity(), 5);
        assert_eq!(catalog_item(CatalogKind::Package, 40).max_quantity(), 1);
        assert_eq!(catalog_item(CatalogKind::Package, 0).max_quantity(), 1);
    }

    #[test]
    fn test_is_selectable() {
        assert!(catalog_item(CatalogKind::Equipment, 1).is_selectable());
        assert!(!catalog_item(CatalogKind::Equipment, 0).is_selectable());
        assert!(catalog_item(CatalogKind::Package, 0).is_selectable());

        let mut retired = catalog_item(CatalogKind::Equipment, 10);
        retired.is_active = false;
        assert!(!retired.is_selectable());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("EFT".parse::<PaymentMethod>().unwrap(), PaymentMethod::Eft);
        assert_eq!(" cash ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("card".parse::<PaymentMethod>().is_err());

        assert_eq!("Paid".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert_eq!("approved".parse::<QuoteStatus>().unwrap(), QuoteStatus::Approved);

        assert_eq!("Private Party".parse::<EventType>().unwrap(), EventType::PrivateParty);
        assert!("bar mitzvah".parse::<EventType>().is_err());
    }

    #[test]
    fn test_event_type_label_uses_override_for_other() {
        let event = EventDetails {
            event_type: EventType::Other,
            event_type_other: Some("Car launch".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 12, 5).unwrap(),
            guest_count: Some(80),
            location: "Sandton".to_string(),
            services: vec![],
        };
        assert_eq!(event.type_label(), "Car launch");
    }

    #[test]
    fn test_notification_signal_wire_shape() {
        let signal = NotificationSignal {
            event: QuoteEvent::QuoteApproved,
            quote_reference: "QT-261019-0001A3F9".to_string(),
            customer_email: "thandi@example.com".to_string(),
        };
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["event"], "quote_approved");
        assert_eq!(json["quoteReference"], "QT-261019-0001A3F9");
        assert_eq!(json["customerEmail"], "thandi@example.com");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Thandi@Example.COM "), "thandi@example.com");
    }
}
