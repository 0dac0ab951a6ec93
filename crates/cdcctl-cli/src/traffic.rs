//! Test traffic for the source database.
//!
//! Creates the `public.orders` table and inserts random orders so the
//! connector has changes to capture.

use anyhow::Context;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Row};
use tracing::debug;

use cdcctl_proto::DatabaseConnectionSpec;

const MOCK_PRODUCTS: [&str; 8] = [
    "Laptop", "Phone", "Tablet", "Keyboard", "Mouse", "Monitor", "Headset", "Webcam",
];

const CREATE_ORDERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS public.orders (
        id SERIAL PRIMARY KEY,
        product VARCHAR(255) NOT NULL,
        quantity INT NOT NULL,
        created_at TIMESTAMP DEFAULT NOW()
    )";

const INSERT_ORDER: &str =
    "INSERT INTO public.orders (product, quantity) VALUES ($1, $2) RETURNING id, product, quantity";

/// A row inserted by [`insert_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedOrder {
    pub id: i32,
    pub product: String,
    pub quantity: i32,
}

async fn connect(database: &DatabaseConnectionSpec) -> anyhow::Result<PgConnection> {
    let options = PgConnectOptions::new()
        .host(&database.host)
        .port(database.port)
        .username(&database.user)
        .password(&database.password)
        .database(&database.database_name);

    debug!(host = %database.host, port = database.port, "connecting to source database");
    PgConnection::connect_with(&options)
        .await
        .with_context(|| format!("failed to connect to {}:{}", database.host, database.port))
}

/// Create `public.orders` if it does not exist.
pub async fn create_orders_table(database: &DatabaseConnectionSpec) -> anyhow::Result<()> {
    let mut conn = connect(database).await?;
    sqlx::query(CREATE_ORDERS_TABLE)
        .execute(&mut conn)
        .await
        .context("failed to create orders table")?;
    conn.close().await?;
    Ok(())
}

/// Insert one random order and return the stored row.
pub async fn insert_order(database: &DatabaseConnectionSpec) -> anyhow::Result<InsertedOrder> {
    let (product, quantity) = random_order();

    let mut conn = connect(database).await?;
    let row = sqlx::query(INSERT_ORDER)
        .bind(product)
        .bind(quantity)
        .fetch_one(&mut conn)
        .await
        .context("failed to insert order")?;
    conn.close().await?;

    Ok(InsertedOrder {
        id: row.try_get("id")?,
        product: row.try_get("product")?,
        quantity: row.try_get("quantity")?,
    })
}

fn random_order() -> (&'static str, i32) {
    let mut rng = rand::thread_rng();
    let product = MOCK_PRODUCTS.choose(&mut rng).copied().unwrap_or(MOCK_PRODUCTS[0]);
    (product, rng.gen_range(1..=20))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_order_bounds() {
        for _ in 0..100 {
            let (product, quantity) = random_order();
            assert!(MOCK_PRODUCTS.contains(&product));
            assert!((1..=20).contains(&quantity));
        }
    }
}
