//! Seed the database with demo data.
//!
//! Creates an `admin`/`admin` login, a small starter catalog and the default
//! shop identity. Safe to run repeatedly; existing rows are left alone.
//!
//! # Usage
//!
//! ```bash
//! shoptill-cli seed
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;

use shoptill_core::Money;

/// Starter catalog: name, cost price, selling price, quantity, threshold.
const SEED_PRODUCTS: &[(&str, Money, Money, i64, i64)] = &[
    ("Apple", Money::from_cents(3000), Money::from_cents(3000), 50, 5),
    ("Banana", Money::from_cents(1000), Money::from_cents(1000), 100, 10),
    ("Milk (1L)", Money::from_cents(4500), Money::from_cents(4500), 40, 4),
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Seed demo data into the database.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let url = super::database_url();
    tracing::info!("Connecting to database...");
    let pool = super::connect(&url).await?;

    seed_admin_user(&pool).await?;
    seed_products(&pool).await?;
    seed_shop_info(&pool).await?;

    tracing::info!("Seeding complete!");
    Ok(())
}

/// Create the default `admin`/`admin` login if no users exist yet.
async fn seed_admin_user(pool: &SqlitePool) -> Result<(), SeedError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        tracing::info!("Users already present, skipping admin user");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(b"admin", &salt)
        .map_err(|e| SeedError::PasswordHash(e.to_string()))?
        .to_string();

    sqlx::query(
        "INSERT INTO user (username, password_hash, is_admin, created_at) VALUES (?, ?, 1, ?)",
    )
    .bind("admin")
    .bind(&password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    tracing::info!("Created default admin user (admin/admin)");
    tracing::warn!("Change the admin password before any real use");
    Ok(())
}

/// Insert the starter catalog, skipping products that already exist by name.
async fn seed_products(pool: &SqlitePool) -> Result<(), SeedError> {
    let mut inserted = 0;

    for &(name, cost_price, selling_price, quantity, threshold) in SEED_PRODUCTS {
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM product WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        let now = Utc::now();
        sqlx::query(
            "INSERT INTO product
                 (name, category, cost_price_cents, selling_price_cents,
                  quantity, low_stock_threshold, created_at, updated_at)
             VALUES (?, NULL, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(cost_price)
        .bind(selling_price)
        .bind(quantity)
        .bind(threshold)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;
        inserted += 1;
    }

    tracing::info!("Seeded {} products", inserted);
    Ok(())
}

/// Insert the default shop identity if none is stored yet.
async fn seed_shop_info(pool: &SqlitePool) -> Result<(), SeedError> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM shop_info WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        tracing::info!("Shop info already present, skipping");
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO shop_info (id, shop_name, address, phone, gstin, logo_filename)
         VALUES (1, ?, ?, ?, ?, ?)",
    )
    .bind("Patidar Traders")
    .bind("Mugaliya")
    .bind("1234567890")
    .bind("GSTN000001")
    .bind("logo.png")
    .execute(pool)
    .await?;

    tracing::info!("Seeded default shop info");
    Ok(())
}
