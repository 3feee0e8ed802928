//! # Catalog Seeder
//!
//! Populates a database with a realistic rental catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the configured database
//! cargo run -p marquee-quotes --bin seed
//!
//! # Specify database path
//! cargo run -p marquee-quotes --bin seed -- --db ./marquee.db
//!
//! # Use a specific config file
//! cargo run -p marquee-quotes --bin seed -- --config ./quotes.toml
//! ```
//!
//! ## Generated Catalog
//! - Equipment across toilets, tents, furniture, lighting, sound and power
//! - Packages for weddings, corporate days and parties
//!
//! Seeding is skipped when the catalog already has equipment.

use chrono::Utc;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use marquee_core::validation::validate_catalog_item;
use marquee_core::{CatalogItem, CatalogKind};
use marquee_db::Database;
use marquee_quotes::{telemetry, QuotesConfig};

/// (category, name, daily price in rand, units, features)
const EQUIPMENT: &[(&str, &str, i64, i64, &[&str])] = &[
    ("mobile-toilets", "Standard Portable Toilet", 650, 40, &["Chemical flush", "Hand sanitiser"]),
    ("mobile-toilets", "VIP Flushing Toilet", 1_200, 12, &["Porcelain bowl", "Hand basin", "Mirror"]),
    ("mobile-toilets", "Luxury Toilet Trailer", 4_500, 3, &["Three cubicles", "Running water", "Lighting"]),
    ("mobile-toilets", "Wheelchair Accessible Unit", 950, 6, &["Ramp access", "Grab rails"]),
    ("tents", "Stretch Tent 10m x 15m", 3_500, 8, &["Weatherproof", "Setup included"]),
    ("tents", "Stretch Tent 15m x 20m", 5_800, 4, &["Weatherproof", "Setup included"]),
    ("tents", "Peg and Pole Marquee", 7_200, 2, &["Seats 200", "Side walls"]),
    ("tents", "Gazebo 3m x 3m", 450, 25, &["Pop-up frame"]),
    ("furniture", "Tiffany Chair", 35, 400, &["Seat cushion"]),
    ("furniture", "Round Banquet Table", 120, 60, &["Seats 10"]),
    ("furniture", "Cocktail Table", 150, 30, &["Bar height"]),
    ("furniture", "Lounge Set", 1_100, 6, &["Couch", "Two armchairs", "Coffee table"]),
    ("decor", "Table Linen Set", 60, 120, &["Cloth", "Runner", "Napkins"]),
    ("decor", "Floral Arch", 1_800, 2, &["Fresh flowers on request"]),
    ("lighting", "Fairy Light Canopy", 900, 10, &["Warm white", "Per 10m"]),
    ("lighting", "Chandelier", 750, 8, &["Battery option"]),
    ("lighting", "LED Uplighter", 180, 40, &["RGB", "Remote control"]),
    ("sound", "PA System", 1_500, 5, &["Two speakers", "Mixer", "Microphone"]),
    ("sound", "Wireless Microphone", 250, 10, &[]),
    ("catering", "Chafing Dish", 90, 50, &["Fuel included"]),
    ("catering", "Mobile Bar Counter", 1_300, 4, &["Refrigerated"]),
    ("power", "Silent Generator 20kVA", 2_800, 3, &["Fuel for 8 hours"]),
    ("power", "Distribution Board", 400, 10, &["Earth leakage"]),
];

/// (category, name, price in rand, features)
const PACKAGES: &[(&str, &str, i64, &[&str])] = &[
    (
        "wedding",
        "Garden Wedding Package",
        28_000,
        &["Stretch tent", "100 Tiffany chairs", "Fairy light canopy", "Two VIP toilets"],
    ),
    (
        "wedding",
        "Intimate Wedding Package",
        14_500,
        &["Gazebos", "40 Tiffany chairs", "Table linen", "One VIP toilet"],
    ),
    (
        "corporate",
        "Corporate Day Package",
        19_000,
        &["Peg and pole marquee", "PA system", "Cocktail tables", "Toilet trailer"],
    ),
    (
        "party",
        "Backyard Party Package",
        6_500,
        &["Gazebo", "Cocktail tables", "LED uplighters", "Portable toilets"],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<String> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Marquee Rentals Catalog Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (overrides config)");
                println!("  -c, --config <PATH>    Config file (default: platform config dir)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = QuotesConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = PathBuf::from(path);
    }
    telemetry::init_tracing(Some(&config.logging.filter));

    info!(path = ?config.database.path, "Seeding catalog");

    let db = Database::new(config.to_db_config()).await?;
    let catalog = db.catalog();

    let existing = catalog.count_active(CatalogKind::Equipment).await?;
    if existing > 0 {
        warn!(existing, "Catalog already has equipment, skipping seed");
        println!("Database already has {} equipment items.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut inserted = 0usize;

    let equipment = EQUIPMENT
        .iter()
        .map(|(category, name, rand, units, features)| {
            catalog_item(CatalogKind::Equipment, category, name, *rand, *units, features)
        });
    let packages = PACKAGES
        .iter()
        .map(|(category, name, rand, features)| {
            catalog_item(CatalogKind::Package, category, name, *rand, 0, features)
        });

    for item in equipment.chain(packages) {
        if let Err(e) = validate_catalog_item(&item) {
            eprintln!("Skipping {}: {}", item.name, e);
            continue;
        }

        if let Err(e) = catalog.insert(&item).await {
            eprintln!("Failed to insert {}: {}", item.name, e);
            continue;
        }

        inserted += 1;
    }

    println!("✓ Inserted {} catalog items in {:?}", inserted, start.elapsed());
    println!(
        "  Equipment: {}  Packages: {}",
        catalog.count_active(CatalogKind::Equipment).await?,
        catalog.count_active(CatalogKind::Package).await?
    );

    db.close().await;
    Ok(())
}

fn catalog_item(
    kind: CatalogKind,
    category: &str,
    name: &str,
    rand: i64,
    units: i64,
    features: &[&str],
) -> CatalogItem {
    let now = Utc::now();

    CatalogItem {
        id: Uuid::new_v4().to_string(),
        kind,
        name: name.to_string(),
        category: category.to_string(),
        description: Some(format!("{} available for hire across the Western Cape.", name)),
        daily_price_cents: rand * 100,
        available_units: units,
        features: features.iter().map(|f| f.to_string()).collect(),
        image_url: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
