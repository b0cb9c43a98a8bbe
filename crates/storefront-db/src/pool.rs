//! # Connection Pool
//!
//! Opens the SQLite store, applies migrations, and hands out repositories.
//!
//! ```text
//! DbConfig::new("./storefront.db")        DbConfig::in_memory()
//!        │  WAL, synchronous=NORMAL              │  private database,
//!        │  foreign_keys=ON                      │  exactly one connection
//!        └───────────────┬───────────────────────┘
//!                        ▼
//!              Database::new(config)  ── migrations ──► schema ready
//!                        │
//!        ┌───────────────┼────────────────┐
//!        ▼               ▼                ▼
//!   .products()     .categories()      .carts()
//! ```
//!
//! Readers run in parallel under WAL; writers queue on the SQLite lock for
//! up to `acquire_timeout`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::cart::CartRepository;
use crate::repository::category::CategoryRepository;
use crate::repository::product::ProductRepository;

/// Path value that selects an in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private to one pool; gone when the pool closes.
    Memory,
}

/// Pool settings.
///
/// ```rust,ignore
/// let config = DbConfig::new("./storefront.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: DbLocation,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    /// `None` keeps idle connections open forever.
    pub idle_timeout: Option<Duration>,
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed store; the file is created if missing. `":memory:"`
    /// selects [`DbConfig::in_memory`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.as_os_str() == MEMORY_PATH {
            return Self::in_memory();
        }

        DbConfig {
            location: DbLocation::File(path),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Fresh, private database for tests.
    ///
    /// ## Single Connection
    /// Every in-memory connection is its own database, so the pool holds
    /// exactly one and never recycles it. Inside a transaction every
    /// statement must go through the transaction, not the pool, or the
    /// caller waits on itself.
    pub fn in_memory() -> Self {
        DbConfig {
            location: DbLocation::Memory,
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    /// Ignored for in-memory stores, which stay at one connection.
    pub fn max_connections(mut self, max: u32) -> Self {
        if self.location != DbLocation::Memory {
            self.max_connections = max.max(1);
            self.min_connections = self.min_connections.min(self.max_connections);
        }
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.location {
            DbLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            DbLocation::Memory => SqliteConnectOptions::new().in_memory(true),
        };

        // Off by default in SQLite.
        options.foreign_keys(true)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the store. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        match &config.location {
            DbLocation::File(path) => info!(path = %path.display(), "Opening database"),
            DbLocation::Memory => debug!("Opening in-memory database"),
        }

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout);

        if config.location == DbLocation::Memory {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections, then closes the pool. Later
    /// operations fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// `true` when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_healthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        a.carts().create().await.unwrap();

        assert_eq!(a.carts().count().await.unwrap(), 1);
        assert_eq!(b.carts().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_pool_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
    }

    #[test]
    fn test_memory_path_selects_in_memory() {
        let config = DbConfig::new(MEMORY_PATH).max_connections(10);

        assert_eq!(config.location, DbLocation::Memory);
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn test_file_config_builder() {
        let config = DbConfig::new("/tmp/storefront-test.db")
            .max_connections(10)
            .run_migrations(false);

        assert_eq!(config.location, DbLocation::File(PathBuf::from("/tmp/storefront-test.db")));
        assert_eq!(config.max_connections, 10);
        assert!(!config.run_migrations);
    }
}
