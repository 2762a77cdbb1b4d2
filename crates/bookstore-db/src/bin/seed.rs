//! # Seed Data Generator
//!
//! Populates a database with demo catalog data for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p bookstore-db --bin seed
//!
//! # Specify database path
//! cargo run -p bookstore-db --bin seed -- --db ./data/bookstore.db
//! ```
//!
//! ## What Gets Seeded
//! - The two import regulations (minimum 2 per import, ceiling 300)
//! - A handful of books across several categories, each through the
//!   regular import workflow (so ledger entries and snapshots exist)
//! - One demo checkout, so the monthly reports have data

use std::env;

use bookstore_core::{
    Actor, Cart, DeliveryMethod, Money, PaymentMethod, UserRole, REG_MAX_STOCK_CEILING,
    REG_MIN_IMPORT_QUANTITY,
};
use bookstore_db::ops::cart::cart_add;
use bookstore_db::ops::checkout::{checkout, CheckoutRequest};
use bookstore_db::ops::import::{record_import, ImportRequest};
use bookstore_db::ops::regulation::upsert_regulation;
use bookstore_db::ops::report::revenue_by_category;
use bookstore_db::{Database, DbConfig};
use chrono::{Datelike, Utc};

/// Demo catalog: (category, title, copies, price in cents).
const BOOKS: &[(&str, &str, i64, i64)] = &[
    ("Travel", "Atlas of Remote Islands", 24, 2850),
    ("Travel", "The Art of Travel", 30, 1650),
    ("Travel", "In Patagonia", 18, 1499),
    ("Fiction", "The Master and Margarita", 40, 1299),
    ("Fiction", "Invisible Cities", 35, 1150),
    ("Fiction", "The Leopard", 20, 1399),
    ("Science", "The Selfish Gene", 28, 1799),
    ("Science", "Gödel, Escher, Bach", 15, 2499),
    ("Science", "The Character of Physical Law", 22, 1250),
    ("History", "The Guns of August", 25, 1899),
    ("History", "SPQR", 30, 2199),
    ("Cooking", "Salt Fat Acid Heat", 26, 3500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./bookstore_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bookstore Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./bookstore_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Bookstore Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.books().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} books", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = Actor::new(1, UserRole::Admin);

    // Regulations first, so the imports below are snapshotted with them.
    upsert_regulation(&db, &admin, REG_MIN_IMPORT_QUANTITY, 2.0, true).await?;
    upsert_regulation(&db, &admin, REG_MAX_STOCK_CEILING, 300.0, true).await?;
    println!("✓ Regulations: minimum import 2, stock ceiling 300");

    // Stock the shelves through the real import workflow.
    for &(category, title, copies, price_cents) in BOOKS {
        let outcome = record_import(
            &db,
            &admin,
            ImportRequest {
                book_name: title.to_string(),
                category_name: category.to_string(),
                quantity: copies,
                unit_price_cents: price_cents,
                import_date: None,
            },
        )
        .await?;
        println!("  {}", outcome.message);
    }
    println!("✓ Imported {} titles", BOOKS.len());

    // One demo checkout so the reports have something to show.
    let buyer = Actor::new(2, UserRole::User);
    let mut cart = Cart::new();

    let atlas = db
        .books()
        .get_by_name("Atlas of Remote Islands")
        .await?
        .expect("seeded book");
    let primer = db
        .books()
        .get_by_name("Invisible Cities")
        .await?
        .expect("seeded book");

    cart_add(&db, Some(&buyer), &mut cart, atlas.id).await?;
    cart_add(&db, Some(&buyer), &mut cart, atlas.id).await?;
    cart_add(&db, Some(&buyer), &mut cart, primer.id).await?;

    let outcome = checkout(
        &db,
        &buyer,
        &mut cart,
        CheckoutRequest {
            delivery_method: DeliveryMethod::Home,
            payment_method: PaymentMethod::Online,
            delivery_address: Some("12 Shelf Lane".to_string()),
            phone: "555-0199".to_string(),
            email: Some("reader@example.com".to_string()),
        },
    )
    .await?;
    println!(
        "✓ Demo checkout: receipt #{} for {} ({} lines)",
        outcome.receipt.id,
        outcome.total,
        outcome.lines.len()
    );

    let now = Utc::now();
    let report = revenue_by_category(&db, &admin, now.month(), now.year()).await?;
    println!();
    println!("Revenue this month:");
    for row in report {
        println!(
            "  {:<10} {:>10}  {:>3} units  {:>6.2}%",
            row.category_name,
            Money::from_cents(row.revenue_cents).to_string(),
            row.units_sold,
            row.percent_of_revenue
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
