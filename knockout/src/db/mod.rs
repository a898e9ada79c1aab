//! Storage layer: repository traits plus PostgreSQL and in-memory stores.
//!
//! [`Database`] owns the sqlx connection pool and the schema bootstrap;
//! [`PgStore`] implements the repositories on top of it. [`MemoryStore`]
//! implements the same traits without a database.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod errors;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{MatchRepository, PlayerRepository, SharedStore, Store, TournamentRepository};

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use knockout::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env();
    ///     let db = Database::new(&config).await?;
    ///     db.init_schema().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        log::info!("Database schema ready");
        Ok(())
    }

    /// Repository implementation sharing this pool
    pub fn store(&self) -> PgStore {
        PgStore::new(self.pool.clone())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_declares_every_table() {
        for table in ["players", "tournaments", "tournament_players", "matches"] {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "missing table {table}"
            );
        }
        assert!(SCHEMA.contains("UNIQUE (tournament_id, round, position)"));
        assert!(SCHEMA.contains("UNIQUE (tournament_id, player_id)"));
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_database_connection() {
        let config = DatabaseConfig {
            max_connections: 5,
            min_connections: 1,
            connection_timeout_secs: 5,
            ..DatabaseConfig::from_env()
        };

        let db = Database::new(&config)
            .await
            .expect("Failed to connect to database");
        db.init_schema().await.expect("Schema bootstrap failed");
        db.store().health_check().await.expect("Health check failed");
        db.close().await;
    }
}
