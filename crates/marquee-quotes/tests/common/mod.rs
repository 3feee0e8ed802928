//! Shared fixtures for the service integration tests.

#![allow(dead_code)]

use chrono::Utc;
use marquee_core::{CatalogItem, CatalogKind, ContactForm, EventForm, QuoteForm};
use marquee_db::{Database, DbConfig};
use marquee_quotes::{ChannelDispatcher, QuoteEngine, QuotesConfig};

pub fn equipment(id: &str, name: &str, category: &str, price_cents: i64, units: i64) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        kind: CatalogKind::Equipment,
        name: name.to_string(),
        category: category.to_string(),
        description: None,
        daily_price_cents: price_cents,
        available_units: units,
        features: Vec::new(),
        image_url: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn package(id: &str, name: &str, price_cents: i64) -> CatalogItem {
    CatalogItem {
        kind: CatalogKind::Package,
        ..equipment(id, name, "wedding", price_cents, 0)
    }
}

/// Catalog used across the scenarios. Prices in cents.
pub async fn seeded_db() -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let catalog = db.catalog();
    for item in [
        equipment("vip-toilet", "VIP Toilet", "mobile-toilets", 50_000, 5),
        equipment("tent", "Tent", "tents", 120_000, 2),
        equipment("generator", "Generator", "power", 280_000, 0),
        package("garden-wedding", "Garden Wedding Package", 2_800_000),
    ] {
        catalog.insert(&item).await.unwrap();
    }
    db
}

pub async fn engine(
    config: QuotesConfig,
) -> (
    QuoteEngine<ChannelDispatcher>,
    tokio::sync::mpsc::UnboundedReceiver<marquee_core::NotificationSignal>,
) {
    let (dispatcher, rx) = ChannelDispatcher::channel();
    let engine = QuoteEngine::with_database(seeded_db().await, &config, dispatcher)
        .await
        .unwrap();
    (engine, rx)
}

pub fn form(email: &str) -> QuoteForm {
    QuoteForm {
        contact: ContactForm {
            name: "Thandi Nkosi".to_string(),
            email: email.to_string(),
            phone: "0215550123".to_string(),
            company: Some("Nkosi Events".to_string()),
        },
        event: EventForm {
            event_type: "wedding".to_string(),
            date: "2026-12-12".to_string(),
            location: "Franschhoek".to_string(),
            guest_count: Some(150),
            ..EventForm::default()
        },
        payment_method: "eft".to_string(),
        notes: Some("Access via the service road".to_string()),
    }
}
