//! # Seed Data Generator
//!
//! Populates the database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default owner in ./vitrine_dev.db
//! cargo run -p vitrine-db --bin seed
//!
//! # Specify database path and owner
//! cargo run -p vitrine-db --bin seed -- --db ./data/vitrine.db --owner <uuid>
//! ```
//!
//! ## Generated Data
//! - Five Natura/Avon products, one of them out of stock and one under
//!   the default low-stock threshold
//! - Three customers tagged VIP, Novo and Inativo

use std::collections::BTreeSet;
use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;
use vitrine_core::{
    Brand, CustomerPatch, Money, NewCustomer, NewProduct, DEFAULT_OWNER_ID, TAG_INACTIVE,
    TAG_NEW, TAG_VIP,
};
use vitrine_db::{Database, DbConfig};

/// (name, brand, category, stock, cost cents, sale cents)
const PRODUCTS: &[(&str, Brand, &str, u32, i64, i64)] = &[
    ("Kaiak Urbe Desodorante", Brand::Natura, "Perfumaria - Masculino", 5, 8990, 13990),
    ("Essencial Oud Masculino", Brand::Natura, "Perfumaria - Masculino", 2, 11000, 19000),
    ("Renew Platinum Dia", Brand::Avon, "Cuidados com a Pele", 8, 4550, 7590),
    ("Batom Power Stay Vermelho", Brand::Avon, "Maquiagem", 12, 1800, 3990),
    ("Hidratante Todo Dia Algodão", Brand::Natura, "Corpo", 0, 2500, 4990),
];

/// (name, phone, tag, total spent cents)
const CUSTOMERS: &[(&str, &str, &str, i64)] = &[
    ("Ana Silva", "(11) 98765-4321", TAG_VIP, 45000),
    ("Beatriz Costa", "(11) 91234-5678", TAG_NEW, 8990),
    ("Carla Dias", "(21) 99876-5432", TAG_INACTIVE, 120000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vitrine_dev.db");
    let mut owner_id = String::from(DEFAULT_OWNER_ID);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vitrine POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./vitrine_dev.db)");
                println!("  -o, --owner <ID>     Owner id to seed (default: {DEFAULT_OWNER_ID})");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vitrine POS Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!("Owner:    {}", owner_id);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let products = db.products(&owner_id);
    let existing = products.count().await?;
    if existing > 0 {
        println!("⚠ Owner already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Inserting products...");
    for &(name, brand, category, stock, cost, sale) in PRODUCTS {
        let product = products
            .insert(NewProduct {
                name: name.to_string(),
                brand,
                category: category.to_string(),
                stock_quantity: stock,
                cost_price: Money::from_cents(cost),
                sale_price: Money::from_cents(sale),
                image: None,
            })
            .await?;
        println!("  {} ({}) stock {}", product.name, product.brand, product.stock_quantity);
    }

    println!();
    println!("Inserting customers...");
    let customers = db.customers(&owner_id);
    for &(name, phone, tag, spent) in CUSTOMERS {
        let customer = customers
            .insert(NewCustomer {
                name: name.to_string(),
                phone: Some(phone.to_string()),
                tags: BTreeSet::from([tag.to_string()]),
                ..Default::default()
            })
            .await?;
        customers
            .update(
                &customer.id,
                CustomerPatch {
                    total_spent: Some(Money::from_cents(spent)),
                    ..Default::default()
                },
            )
            .await?;
        println!("  {} [{}] spent {}", customer.name, tag, Money::from_cents(spent));
    }

    info!(owner_id = %owner_id, "Seed complete");
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
