//! SQLite persistence for saved budgets.

pub mod snapshots;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tracing::info;

use crate::error::Result;

pub use snapshots::{BudgetContents, BudgetSnapshot};

/// Opens the pool and creates the schema if it is missing.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    // In-memory databases are private to one connection.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    init_schema(&pool).await?;
    info!("Opened budget database: {database_url}");
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS budget_snapshots (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT,
            fixed_expenses TEXT NOT NULL,
            frequency_data TEXT NOT NULL,
            selected_subscriptions TEXT NOT NULL,
            custom_sub_amounts TEXT NOT NULL,
            monthly_income REAL NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_budget_snapshots_user ON budget_snapshots(user_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    connect("sqlite::memory:").await.expect("in-memory database")
}
