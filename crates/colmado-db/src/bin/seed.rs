//! # Seed Data Generator
//!
//! Populates the database with a demo account for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p colmado-db --bin seed
//!
//! # Specify database path
//! cargo run -p colmado-db --bin seed -- --db ./data/colmado.db
//! ```
//!
//! ## Generated Data
//! - One account ("Colmado Demo") with default settings (18% ITBIS)
//! - Three users: admin, cashier, supervisor (cancel capabilities)
//! - A handful of customers
//! - Typical colmado shelf products with stock

use chrono::Utc;
use std::env;
use uuid::Uuid;

use colmado_db::{Database, DbConfig};

/// Shelf products: (sku, name, price in cents, stock)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("ARR-001", "Arroz Selecto 5lb", 5900, 80),
    ("ARR-002", "Arroz Selecto 10lb", 11000, 40),
    ("ACE-001", "Aceite de Soya 1L", 11800, 35),
    ("ACE-002", "Aceite de Soya 1/2L", 6500, 50),
    ("HAB-001", "Habichuelas Rojas lb", 4500, 60),
    ("HAB-002", "Habichuelas Negras lb", 4200, 45),
    ("AZU-001", "Azúcar Crema 5lb", 3900, 70),
    ("SAL-001", "Sal de Mesa 1lb", 1500, 90),
    ("LEC-001", "Leche en Polvo 400g", 14500, 25),
    ("LEC-002", "Leche Evaporada", 6800, 40),
    ("CAF-001", "Café Molido 1lb", 19500, 30),
    ("ESP-001", "Espaguetis 1lb", 3500, 75),
    ("SAR-001", "Sardinas en Lata", 5500, 55),
    ("SAL-002", "Salami Súper Especial lb", 13500, 20),
    ("QUE-001", "Queso de Freír lb", 17500, 15),
    ("HUE-001", "Huevos Unidad", 900, 200),
    ("PLA-001", "Plátano Verde Unidad", 2500, 120),
    ("GAS-001", "Refresco Rojo 2L", 9500, 45),
    ("AGU-001", "Botellón de Agua", 5000, 30),
    ("JAB-001", "Jabón de Cuaba", 2800, 65),
    ("DET-001", "Detergente 500g", 6200, 40),
    ("CLO-001", "Cloro 1/2 Galón", 7500, 25),
    ("FOS-001", "Fósforos Caja", 1000, 100),
    ("VEL-001", "Velas Paquete", 3500, 50),
    ("PAN-001", "Pan de Agua Unidad", 1000, 150),
];

/// Customers with a tab at the counter.
const CUSTOMERS: &[(&str, &str)] = &[
    ("Juana Pérez", "809-555-0101"),
    ("Ramón Díaz", "809-555-0102"),
    ("Altagracia Santos", "829-555-0103"),
    ("Miguel Herrera", "849-555-0104"),
    ("Carmen Rosario", "809-555-0105"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Library tracing (migrations, pool) is hidden unless RUST_LOG asks.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./colmado_dev.db");

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
                println!("Colmado POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./colmado_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Colmado POS Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(db.pool())
        .await?;
    if existing > 0 {
        println!("⚠ Database already has {} account(s)", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let account_id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO accounts (id, name, created_at) VALUES (?1, ?2, ?3)")
        .bind(&account_id)
        .bind("Colmado Demo")
        .bind(now)
        .execute(db.pool())
        .await?;

    sqlx::query(
        "INSERT INTO account_settings (account_id, itbis_rate_bp, allow_negative_stock, updated_at)
         VALUES (?1, 1800, 0, ?2)",
    )
    .bind(&account_id)
    .bind(now)
    .execute(db.pool())
    .await?;

    // (username, display name, admin, cancel payments, cancel returns)
    let users = [
        ("ana", "Ana (Dueña)", true, true, true),
        ("pedro", "Pedro (Cajero)", false, false, false),
        ("maria", "María (Encargada)", false, true, true),
    ];
    for (username, name, is_admin, cancel_pay, cancel_ret) in users {
        sqlx::query(
            r#"
            INSERT INTO users (id, account_id, username, name, is_admin,
                               can_cancel_payments, can_cancel_returns, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&account_id)
        .bind(username)
        .bind(name)
        .bind(is_admin)
        .bind(cancel_pay)
        .bind(cancel_ret)
        .bind(now)
        .execute(db.pool())
        .await?;
        println!("  + user {}", username);
    }

    for (name, phone) in CUSTOMERS {
        sqlx::query(
            "INSERT INTO customers (id, account_id, name, phone, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&account_id)
        .bind(name)
        .bind(phone)
        .bind(now)
        .execute(db.pool())
        .await?;
    }
    println!("  + {} customers", CUSTOMERS.len());

    for (sku, name, price_cents, stock) in PRODUCTS {
        sqlx::query(
            r#"
            INSERT INTO products (id, account_id, sku, name, price_cents, stock,
                                  is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&account_id)
        .bind(sku)
        .bind(name)
        .bind(price_cents)
        .bind(stock)
        .bind(now)
        .execute(db.pool())
        .await?;
    }
    println!("  + {} products", PRODUCTS.len());

    println!();
    println!("✓ Seed complete! Account id: {}", account_id);

    Ok(())
}
