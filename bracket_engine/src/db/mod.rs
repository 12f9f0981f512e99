//! Database module providing PostgreSQL connection pooling and bracket storage.
//!
//! This module manages the database connection pool using sqlx, applies the
//! schema migrations and exposes the [`BracketRepository`] seam with its
//! PostgreSQL and in-memory implementations.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::tournament::errors::{BracketError, BracketResult};

pub mod config;
pub mod memory;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use memory::MemoryBracketRepository;
pub use repository::{BracketRepository, PgBracketRepository};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Arguments
    ///
    /// * `config` - Database configuration
    ///
    /// # Returns
    ///
    /// * `Result<Database, sqlx::Error>` - Database instance or error
    ///
    /// # Errors
    ///
    /// Returns the connection error when the pool cannot reach the database
    /// within `connection_timeout_secs`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bracket_engine::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env();
    ///     let db = Database::new(&config).await?;
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

    /// Bracket repository sharing this pool
    ///
    /// # Returns
    ///
    /// * `PgBracketRepository` - Repository writing through a clone of the pool
    pub fn bracket_repository(&self) -> PgBracketRepository {
        PgBracketRepository::new(self.pool.clone())
    }

    /// Apply pending schema migrations
    ///
    /// # Returns
    ///
    /// * `BracketResult<()>` - Ok once every migration is applied
    ///
    /// # Errors
    ///
    /// Returns `Migration` if a migration fails and `Timeout` if they take
    /// longer than the long operation timeout.
    pub async fn run_migrations(&self) -> BracketResult<()> {
        let migrator = sqlx::migrate!("./migrations");
        timeouts::with_timeout(timeouts::LONG_OPERATION_TIMEOUT, async {
            migrator.run(&self.pool).await.map_err(BracketError::from)
        })
        .await
    }

    /// Check if the database connection is healthy
    ///
    /// # Returns
    ///
    /// * `Result<(), sqlx::Error>` - Ok if healthy, error otherwise
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "needs a running PostgreSQL instance"]
    async fn test_database_connection() {
        let config = DatabaseConfig::from_env();

        let db = Database::new(&config)
            .await
            .expect("Failed to connect to database");
        db.health_check().await.expect("Health check failed");
        db.run_migrations().await.expect("Migrations failed");
        db.close().await;
    }
}
