//! Card, deck and review storage for Mathisi
//!
//! [`SrsStore`] is the storage seam the service is written against. [`PgStore`]
//! backs it with PostgreSQL through the executor-generic queries in
//! [`repositories`]; [`MemoryStore`] keeps everything in process for tests and
//! database-less runs.

pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::{SrsStore, SrsTransaction, StoreError};

use anyhow::Context;
use sqlx::{PgPool, Postgres, migrate::MigrateDatabase, postgres::PgPoolOptions};

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to database")?;

    Ok(pool)
}

/// Ensure the database exists and run migrations in this crate's `migrations/` folder.
pub async fn ensure_db_and_migrate(database_url: &str, pool: &PgPool) -> anyhow::Result<()> {
    if !Postgres::database_exists(database_url).await? {
        tracing::info!("Creating database");
        Postgres::create_database(database_url).await?;
    }

    sqlx::migrate!().run(pool).await?;

    Ok(())
}
