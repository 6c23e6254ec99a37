use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;
use crate::error::{StoreError, StoreResult};

pub type DbPool = PgPool;

/// Bootstrap must finish well before the process starts taking traffic;
/// exceeding the budget is fatal to startup, not a retryable condition.
const SCHEMA_INIT_BUDGET: Duration = Duration::from_secs(10);

const SCHEMA_DDL: &[(&str, &str)] = &[
    (
        "orders table",
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            order_id VARCHAR(50) PRIMARY KEY,
            user_id VARCHAR(50) NOT NULL,
            email VARCHAR(255),
            street_address VARCHAR(500),
            city VARCHAR(100),
            state VARCHAR(100),
            country VARCHAR(100),
            zip_code VARCHAR(20),
            credit_card_number_masked VARCHAR(25),
            credit_card_cvv VARCHAR(4),
            credit_card_exp_month INT,
            credit_card_exp_year INT,
            order_total DECIMAL(10, 2),
            currency_code VARCHAR(3),
            shipping_tracking_id VARCHAR(100),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    ),
    (
        "orders user_id index",
        "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)",
    ),
    (
        "orders created_at index",
        "CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at)",
    ),
    (
        "order_items table",
        r#"
        CREATE TABLE IF NOT EXISTS order_items (
            id SERIAL PRIMARY KEY,
            order_id VARCHAR(50) NOT NULL REFERENCES orders(order_id) ON DELETE CASCADE,
            product_id VARCHAR(50) NOT NULL,
            quantity INT NOT NULL
        )
        "#,
    ),
    (
        "order_items order_id index",
        "CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items(order_id)",
    ),
];

/// Create the shared connection pool handed to `OrderStore`.
pub async fn create_pool(config: &AppConfig) -> anyhow::Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

/// Ensure the orders and order_items tables and their indexes exist. Every
/// statement is `IF NOT EXISTS`, so repeated runs are no-ops. Expected to run
/// once per process lifetime, before any read or write is accepted.
pub async fn init_schema(pool: &DbPool) -> StoreResult<()> {
    tokio::time::timeout(SCHEMA_INIT_BUDGET, apply_schema(pool))
        .await
        .map_err(|_| StoreError::schema_init_timeout(SCHEMA_INIT_BUDGET))??;
    tracing::info!("database schema initialized");
    Ok(())
}

async fn apply_schema(pool: &DbPool) -> StoreResult<()> {
    // Postgres prepared statements cannot contain multiple commands, so each
    // DDL statement runs on its own.
    for &(stage, ddl) in SCHEMA_DDL {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| StoreError::schema_init(stage, e))?;
    }
    Ok(())
}
