//! # Seed Binary
//!
//! Stocks a development database with a small kirana catalog and a
//! morning float for the cash drawer. Running it twice is safe: each
//! section is skipped when the database already holds data.
//!
//! ```bash
//! cargo run -p kirana-db --bin seed
//! cargo run -p kirana-db --bin seed -- --db ./data/kirana.db
//! ```
//!
//! Prices are in paise, tax rates in GST basis points (0%, 5%, 12%,
//! 18%), and the float covers every note value the drawer tracks.

use std::env;

use chrono::Utc;
use kirana_core::validation::{
    validate_price_paise, validate_product_code, validate_product_name, validate_tax_rate_bps,
};
use kirana_core::Product;
use kirana_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Shelf contents: (code, name, unit_price_paise, tax_rate_bps, stock).
const CATALOG: &[(&str, &str, i64, u32, i64)] = &[
    ("RICE-1KG", "Basmati Rice 1kg", 9_500, 500, 40),
    ("ATTA-5KG", "Whole Wheat Atta 5kg", 27_500, 0, 25),
    ("DAL-1KG", "Toor Dal 1kg", 16_000, 500, 30),
    ("OIL-1L", "Sunflower Oil 1L", 14_500, 500, 35),
    ("SUGAR-1KG", "Sugar 1kg", 4_400, 500, 50),
    ("SALT-1KG", "Iodised Salt 1kg", 2_800, 0, 60),
    ("TEA-250G", "Assam Tea 250g", 12_000, 500, 45),
    ("MILK-1L", "Toned Milk 1L", 5_600, 0, 20),
    ("GHEE-500ML", "Pure Ghee 500ml", 32_500, 1200, 15),
    ("BISC-100G", "Glucose Biscuits 100g", 1_000, 1800, 120),
    ("NMKN-200G", "Aloo Bhujia 200g", 4_500, 1200, 70),
    ("SOAP-75G", "Bath Soap 75g", 3_200, 1800, 80),
    ("SHMP-180ML", "Shampoo 180ml", 9_900, 1800, 30),
    ("DETR-1KG", "Detergent Powder 1kg", 9_000, 1800, 40),
    ("AGRB-10PC", "Agarbatti 10 sticks", 1_500, 500, 90),
    ("MTCH-10BX", "Matchbox 10 pack", 1_200, 1200, 100),
];

/// Morning float: (note value in rupees, count).
const DRAWER_FLOAT: &[(i64, i64)] = &[
    (500, 4),
    (200, 6),
    (50, 10),
    (20, 15),
    (10, 20),
    (5, 20),
    (1, 50),
];

const DEFAULT_DB_PATH: &str = "./kirana_dev.db";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut db_path = DEFAULT_DB_PATH.to_string();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" | "-d" => {
                if let Some(path) = args.next() {
                    db_path = path;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {}
        }
    }

    println!("🌱 Kirana POS seed");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Database open, schema current");

    stock_catalog(&db).await?;
    fill_drawer(&db).await?;
    db.close().await;

    println!();
    println!("✓ Done");
    Ok(())
}

fn print_help() {
    println!("Seeds a Kirana POS database with a demo catalog and drawer float.");
    println!();
    println!("Usage: seed [OPTIONS]");
    println!();
    println!("Options:");
    println!(
        "  -d, --db <PATH>    Database file (default: {})",
        DEFAULT_DB_PATH
    );
    println!("  -h, --help         Show this help");
}

/// Inserts the demo catalog, unless products already exist.
async fn stock_catalog(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let existing = db.products().count().await?;
    if existing > 0 {
        println!(
            "⚠ Catalog already holds {} products, leaving it alone",
            existing
        );
        return Ok(());
    }

    println!();
    println!("Stocking shelves...");

    let mut stocked = 0;
    for &(code, name, unit_price_paise, tax_rate_bps, stock) in CATALOG {
        // The table above is hand edited; check every row before it
        // reaches the database.
        validate_product_code(code)?;
        validate_product_name(name)?;
        validate_price_paise(unit_price_paise)?;
        validate_tax_rate_bps(tax_rate_bps)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: name.to_string(),
            available_stock: stock,
            unit_price_paise,
            tax_rate_bps,
            created_at: now,
            updated_at: now,
        };

        db.products().insert(&product).await?;
        stocked += 1;
    }

    println!("✓ {} products on the shelves", stocked);
    Ok(())
}

/// Deposits the morning float, unless the drawer already holds cash.
async fn fill_drawer(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let cash = db.denominations().total_cash().await?;
    if !cash.is_zero() {
        println!("⚠ Drawer already holds {}, leaving it alone", cash);
        return Ok(());
    }

    println!();
    println!("Counting the float into the drawer...");

    for &(value, count) in DRAWER_FLOAT {
        db.denominations().deposit(value, count).await?;
        println!("  ₹{} × {}", value, count);
    }

    let total = db.denominations().total_cash().await?;
    println!("✓ Float in the drawer: {}", total);
    Ok(())
}
