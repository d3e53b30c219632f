// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use anyhow::Result;
use deadpool::Runtime;
use diesel::{Connection, PgConnection};
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub type DbPool = deadpool::managed::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;
pub type DbConnection = deadpool::managed::Object<AsyncDieselConnectionManager<AsyncPgConnection>>;
pub type DbPoolError = deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database manager for the booster backend
pub struct Database {
    pool: DbPool,
    url: String,
}

impl Database {
    /// Create a new database manager with connection pool
    pub async fn new(config: &DatabaseConfig, url: &str) -> Result<Self> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(url);

        // Configure pool with connection parameters
        let pool = DbPool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()?;

        let db = Self {
            pool,
            url: url.to_string(),
        };

        // Test connection and run migrations
        db.initialize().await?;

        Ok(db)
    }

    /// Initialize the database by testing connection and running migrations
    async fn initialize(&self) -> Result<()> {
        let _conn = self.get_connection().await?;
        info!("Successfully connected to the database");

        let url = self.url.clone();
        tokio::task::spawn_blocking(move || run_migrations(&url)).await??;

        Ok(())
    }

    /// Get a database connection from the pool
    pub async fn get_connection(&self) -> Result<DbConnection, DbPoolError> {
        self.pool.get().await
    }
}

/// Apply pending migrations over a dedicated synchronous connection
fn run_migrations(url: &str) -> Result<()> {
    let mut conn = PgConnection::establish(url)?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    info!("Database migrations applied successfully ({} new)", applied.len());

    Ok(())
}

/// Initialize database connection pool and run migrations
pub async fn init_database(config: &DatabaseConfig, url: &str) -> Result<Database> {
    Database::new(config, url).await
}
