use std::str::FromStr;

use anyhow::Result;
use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub type DbPool = SqlitePool;

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Open the SQLite pool. Foreign keys stay unenforced: a cart row may outlive
/// its product, and the joined cart view hides such rows.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Seed the demo catalog. Inserts only when the tables are empty, so running
/// it against an existing database changes nothing.
pub async fn seed_demo_data(pool: &DbPool) -> Result<()> {
    let (stores,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stores")
        .fetch_one(pool)
        .await?;
    if stores == 0 {
        sqlx::query("INSERT INTO stores (name, image_url, description) VALUES (?, ?, ?)")
            .bind("ZEN")
            .bind(Option::<&str>::None)
            .bind("Streetwear essentials")
            .execute(pool)
            .await?;
    }

    let (products,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if products > 0 {
        return Ok(());
    }

    let demo = [
        (
            "Essential Tee",
            "Heavyweight cotton tee",
            2990,
            "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=400",
            "tee",
            "S,M,L,XL",
        ),
        (
            "Oversized Hoodie",
            "Oversized fleece hoodie",
            5990,
            "https://images.unsplash.com/photo-1556821840-3a63f95609a7?w=400",
            "hoodie",
            "S,M,L,XL",
        ),
        (
            "Cargo Pants",
            "Wide cargo pants with utility pockets",
            4990,
            "https://images.unsplash.com/photo-1624378439575-d8705ad7ae80?w=400",
            "pants",
            "S,M,L,XL",
        ),
        (
            "Minimal Jacket",
            "Minimalist windbreaker",
            7990,
            "https://images.unsplash.com/photo-1591047139829-d91aecb6caea?w=400",
            "jacket",
            "S,M,L,XL",
        ),
        (
            "Black Cap",
            "Black embroidered cap",
            1990,
            "https://images.unsplash.com/photo-1588850561407-ed78c282e89b?w=400",
            "accessories",
            "One size",
        ),
    ];

    for (name, description, price, image_url, category, sizes) in demo {
        sqlx::query(
            r#"
            INSERT INTO products (store_id, name, description, price, image_url, category, sizes)
            VALUES (1, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(image_url)
        .bind(category)
        .bind(sizes)
        .execute(pool)
        .await?;
    }

    tracing::info!("seeded demo catalog");
    Ok(())
}
