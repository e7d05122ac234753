//! # remark-db
//!
//! PostgreSQL + PostGIS backend for LandmarkRemark.
//!
//! This crate provides:
//! - Connection pool management
//! - [`PgLandmarkRepository`], the hosted landmark store behind
//!   [`remark_core::LandmarkBackend`]
//! - [`PgUserRepository`], username/password accounts behind
//!   [`remark_core::AuthService`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use remark_core::{BoundaryPreference, LandmarkPipeline};
//! use remark_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/remark").await?;
//!     let pipeline = LandmarkPipeline::new(Arc::new(db.landmarks.clone()));
//!     let list = pipeline
//!         .fetch_all(None, BoundaryPreference::Unbounded, "alice")
//!         .await?;
//!     println!("{} landmarks", list.len());
//!     Ok(())
//! }
//! ```

pub mod landmarks;
pub mod pool;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

pub use landmarks::PgLandmarkRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use users::PgUserRepository;

use remark_core::Result;

/// Database handle with repository access.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Landmark repository.
    pub landmarks: PgLandmarkRepository,
    /// User repository.
    pub users: PgUserRepository,
}

impl Database {
    /// Create a new database instance from an existing pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            landmarks: PgLandmarkRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to a database using a connection URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Connect to the test database (`DATABASE_URL` or the fixture default).
    pub async fn connect_test() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| crate::test_fixtures::DEFAULT_TEST_DATABASE_URL.to_string());
        Self::connect(&database_url).await
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
        tracing::info!(
            subsystem = "db",
            component = "migrations",
            op = "migrate",
            "Migrations applied"
        );
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
