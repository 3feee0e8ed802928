//! # Quote Builder
//!
//! Turns a customer's contact/event form plus their selection into a
//! submittable [`QuoteRequest`].
//!
//! ## Build Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         QuoteBuilder::build()                           │
//! │                                                                         │
//! │  ContactForm ──┐                                                        │
//! │  EventForm ────┤     validate every field      ┌── Err(ValidationErrors)│
//! │  Selection ────┼──►  (collect, never stop  ────┤   one entry per field  │
//! │  payment ──────┤      at the first failure)    │                        │
//! │  notes ────────┘                               └── Ok(QuoteRequest)     │
//! │                                                     reference assigned  │
//! │                                                     items snapshotted   │
//! │                                                     total = Σ lines     │
//! │                                                     status = pending    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A request is either fully built or not built at all; a reference is only
//! drawn once every field has passed.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationErrors;
use crate::reference::ReferenceGenerator;
use crate::selection::Selection;
use crate::types::{
    ContactDetails, EventDetails, PaymentStatus, QuoteRequest, QuoteStatus,
};
use crate::validation::{
    normalize_optional, resolve_event_type, validate_email, validate_event_date,
    validate_guest_count, validate_line, validate_notes, validate_payment_method,
    validate_required,
};
use crate::ValidationError;

// =============================================================================
// Form Inputs
// =============================================================================

/// Contact section of the quote form, as submitted.
///
/// Fields are plain strings so that missing or malformed input reaches the
/// validator instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ContactForm {
    #[serde(alias = "fullName")]
    pub name: String,
    pub email: String,
    #[serde(alias = "phoneNumber")]
    pub phone: String,
    pub company: Option<String>,
}

/// Event section of the quote form, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct EventForm {
    pub event_type: String,
    pub event_type_other: Option<String>,
    /// ISO `YYYY-MM-DD`.
    #[serde(alias = "eventDate")]
    pub date: String,
    pub guest_count: Option<i64>,
    #[serde(alias = "venue")]
    pub location: String,
    /// Explicit service list; derived from the selection when empty.
    pub services: Vec<String>,
}

/// Everything the storefront posts alongside the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct QuoteForm {
    pub contact: ContactForm,
    pub event: EventForm,
    pub payment_method: String,
    pub notes: Option<String>,
}

// =============================================================================
// Quote Builder
// =============================================================================

/// Validates quote forms and assembles [`QuoteRequest`]s.
///
/// Borrows the shared [`ReferenceGenerator`] so every request built anywhere
/// in the process draws from one sequence.
#[derive(Debug, Clone, Copy)]
pub struct QuoteBuilder<'a> {
    references: &'a ReferenceGenerator,
}

impl<'a> QuoteBuilder<'a> {
    pub fn new(references: &'a ReferenceGenerator) -> Self {
        QuoteBuilder { references }
    }

    /// Validates every input and builds a pending quote request.
    ///
    /// ## Errors
    /// Returns [`ValidationErrors`] holding one entry per failed field.
    /// - an empty selection, or a line whose quantity lies outside
    ///   `[1, max_quantity]` or whose price is negative, is keyed to `items`
    /// - a total that does not fit in i64 cents is keyed to `totalAmount`
    ///
    /// Selections arrive deserialized from the storefront, so the clamp done
    /// by [`Selection::set_quantity`] is checked again here.
    pub fn build(
        &self,
        contact: ContactForm,
        event: EventForm,
        selection: &Selection,
        payment_method: &str,
        notes: Option<String>,
    ) -> Result<QuoteRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        // Contact
        let name = errors.check(validate_required("name", &contact.name));
        let email = errors.check(validate_email(&contact.email));
        let phone = errors.check(validate_required("phone", &contact.phone));
        let company = normalize_optional(contact.company.as_deref());

        // Event
        let date = errors.check(validate_event_date(&event.date));
        let location = errors.check(validate_required("location", &event.location));
        let guest_count = errors.check(validate_guest_count(event.guest_count));
        let (event_type, event_type_other) =
            resolve_event_type(&event.event_type, event.event_type_other.as_deref());

        // Selection
        if selection.is_empty() {
            errors.push(ValidationError::Empty {
                field: "items".to_string(),
            });
        }
        for line in &selection.items {
            errors.check(validate_line(
                &line.name,
                line.quantity,
                Some(line.max_quantity.max(1)),
                line.unit_price_cents,
            ));
        }
        let total = selection.checked_total();
        if total.is_none() {
            errors.push(ValidationError::OutOfRange {
                field: "totalAmount".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }

        let payment_method = errors.check(validate_payment_method(payment_method));
        let notes = errors.check(validate_notes(notes.as_deref()));

        let (
            Some(name),
            Some(email),
            Some(phone),
            Some(date),
            Some(location),
            Some(guest_count),
            Some(payment_method),
            Some(notes),
            Some(total),
        ) = (name, email, phone, date, location, guest_count, payment_method, notes, total)
        else {
            return Err(errors);
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let services = explicit_services(&event.services).unwrap_or_else(|| selection.services());
        let now = Utc::now();

        Ok(QuoteRequest {
            id: Uuid::new_v4().to_string(),
            reference: self.references.generate(),
            customer: ContactDetails {
                name,
                email,
                phone,
                company,
            },
            event: EventDetails {
                event_type,
                event_type_other,
                date,
                guest_count,
                location,
                services,
            },
            items: selection.snapshot(),
            total_amount_cents: total.cents(),
            payment_method,
            status: QuoteStatus::Pending,
            payment_status: PaymentStatus::Pending,
            notes,
            created_at: now,
            updated_at: now,
        })
    }

    /// Builds from a bundled [`QuoteForm`].
    pub fn build_form(
        &self,
        form: QuoteForm,
        selection: &Selection,
    ) -> Result<QuoteRequest, ValidationErrors> {
        self.build(
            form.contact,
            form.event,
            selection,
            &form.payment_method,
            form.notes,
        )
    }
}

/// Trimmed, de-duplicated explicit services, or `None` when none were given.
fn explicit_services(services: &[String]) -> Option<Vec<String>> {
    let mut cleaned: Vec<String> = Vec::new();
    for service in services.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !cleaned.iter().any(|c| c == service) {
            cleaned.push(service.to_string());
        }
    }

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogItem, CatalogKind, EventType, PaymentMethod};
    use chrono::NaiveDate;

    fn item(id: &str, name: &str, category: &str, price_cents: i64, units: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            kind: CatalogKind::Equipment,
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            daily_price_cents: price_cents,
            available_units: units,
            features: vec![],
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn contact() -> ContactForm {
        ContactForm {
            name: " Thandi Nkosi ".to_string(),
            email: " Thandi@Example.com".to_string(),
            phone: "082 555 0101".to_string(),
            company: Some("  ".to_string()),
        }
    }

    fn event() -> EventForm {
        EventForm {
            event_type: "wedding".to_string(),
            event_type_other: None,
            date: "2026-12-05".to_string(),
            guest_count: Some(120),
            location: "Stellenbosch".to_string(),
            services: vec![],
        }
    }

    fn selection() -> Selection {
        let mut selection = Selection::new();
        selection.toggle(&item("item-1", "VIP Toilet", "mobile-toilets", 50_000, 5));
        selection.toggle(&item("item-2", "Tent", "tents", 120_000, 2));
        selection.set_quantity("item-1", 2);
        selection
    }

    #[test]
    fn test_build_prices_and_snapshots() {
        let references = ReferenceGenerator::default();
        let quote = QuoteBuilder::new(&references)
            .build(contact(), event(), &selection(), "eft", None)
            .unwrap();

        assert_eq!(quote.total_amount_cents, 220_000);
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert_eq!(quote.payment_status, PaymentStatus::Pending);
        assert_eq!(quote.payment_method, PaymentMethod::Eft);
        assert_eq!(quote.items.len(), 2);
        assert!(quote.is_total_consistent());
        assert_eq!(quote.created_at, quote.updated_at);
        assert!(quote.reference.starts_with("QT-"));
    }

    #[test]
    fn test_build_normalizes_inputs() {
        let references = ReferenceGenerator::default();
        let quote = QuoteBuilder::new(&references)
            .build(contact(), event(), &selection(), "CASH", Some("  ".to_string()))
            .unwrap();

        assert_eq!(quote.customer.name, "Thandi Nkosi");
        assert_eq!(quote.customer.email, "thandi@example.com");
        assert_eq!(quote.customer.company, None);
        assert_eq!(quote.notes, None);
        assert_eq!(quote.event.event_type, EventType::Wedding);
        assert_eq!(quote.event.date, NaiveDate::from_ymd_opt(2026, 12, 5).unwrap());
        assert_eq!(quote.event.services, vec!["mobile-toilets", "tents"]);
    }

    #[test]
    fn test_explicit_services_win() {
        let references = ReferenceGenerator::default();
        let mut event = event();
        event.services = vec!["decor".into(), " decor ".into(), "sound".into()];

        let quote = QuoteBuilder::new(&references)
            .build(contact(), event, &selection(), "eft", None)
            .unwrap();

        assert_eq!(quote.event.services, vec!["decor", "sound"]);
    }

    #[test]
    fn test_empty_selection_names_items() {
        let references = ReferenceGenerator::default();
        let errors = QuoteBuilder::new(&references)
            .build(contact(), event(), &Selection::new(), "eft", None)
            .unwrap_err();

        assert!(errors.has_field("items"));
    }

    #[test]
    fn test_missing_email_is_keyed_to_email() {
        let references = ReferenceGenerator::default();
        let mut contact = contact();
        contact.email = String::new();

        let errors = QuoteBuilder::new(&references)
            .build(contact, event(), &selection(), "eft", None)
            .unwrap_err();

        assert_eq!(errors.fields(), vec!["email"]);
    }

    #[test]
    fn test_collects_every_failure() {
        let references = ReferenceGenerator::default();
        let errors = QuoteBuilder::new(&references)
            .build(
                ContactForm::default(),
                EventForm {
                    date: "2026-13-40".to_string(),
                    ..EventForm::default()
                },
                &Selection::new(),
                "card",
                None,
            )
            .unwrap_err();

        assert_eq!(
            errors.fields(),
            vec!["name", "email", "phone", "date", "location", "items", "paymentMethod"]
        );
    }

    #[test]
    fn test_failed_build_does_not_consume_a_reference() {
        let references = ReferenceGenerator::starting_at("QT", 0);
        let builder = QuoteBuilder::new(&references);

        assert!(builder
            .build(contact(), event(), &Selection::new(), "eft", None)
            .is_err());
        let quote = builder
            .build(contact(), event(), &selection(), "eft", None)
            .unwrap();

        assert_eq!(&quote.reference[10..14], "0001");
    }

    fn posted_selection(quantity: i64, max_quantity: i64, unit_price_cents: i64) -> Selection {
        let json = format!(
            r#"{{
                "items": [{{
                    "itemId": "item-9",
                    "kind": "equipment",
                    "name": "Luxury Toilet Trailer",
                    "category": "mobile-toilets",
                    "unitPriceCents": {},
                    "maxQuantity": {},
                    "quantity": {},
                    "addedAt": "2026-10-19T08:00:00Z"
                }}],
                "createdAt": "2026-10-19T08:00:00Z"
            }}"#,
            unit_price_cents, max_quantity, quantity
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_posted_selection_lines_are_rechecked() {
        let references = ReferenceGenerator::starting_at("QT", 0);
        let builder = QuoteBuilder::new(&references);

        for selection in [
            posted_selection(0, 3, 450_000),
            posted_selection(50, 2, 60_000),
            posted_selection(1, 3, -100),
        ] {
            let errors = builder
                .build(contact(), event(), &selection, "eft", None)
                .unwrap_err();
            assert_eq!(errors.fields(), vec!["items"]);
        }

        let quote = builder
            .build(contact(), event(), &posted_selection(2, 3, 450_000), "eft", None)
            .unwrap();
        assert_eq!(quote.total_amount_cents, 900_000);
        assert_eq!(&quote.reference[10..14], "0001");
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let references = ReferenceGenerator::default();
        let errors = QuoteBuilder::new(&references)
            .build(contact(), event(), &posted_selection(2, 3, i64::MAX), "eft", None)
            .unwrap_err();

        assert_eq!(errors.fields(), vec!["totalAmount"]);
    }

    #[test]
    fn test_form_deserializes_loose_shapes() {
        let json = r#"{
            "contact": { "fullName": "Sipho", "email": "sipho@example.com", "phone": "011" },
            "event": { "eventType": "Birthday", "eventDate": "2026-11-01", "venue": "Soweto" },
            "paymentMethod": "cash"
        }"#;
        let form: QuoteForm = serde_json::from_str(json).unwrap();

        let references = ReferenceGenerator::default();
        let quote = QuoteBuilder::new(&references)
            .build_form(form, &selection())
            .unwrap();

        assert_eq!(quote.customer.name, "Sipho");
        assert_eq!(quote.event.location, "Soweto");
        assert_eq!(quote.event.event_type, EventType::Birthday);
        assert_eq!(quote.payment_method, PaymentMethod::Cash);
    }
}
