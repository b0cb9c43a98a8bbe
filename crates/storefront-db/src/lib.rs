//! # storefront-db
//!
//! SQLite persistence for the storefront: pool, embedded migrations,
//! repositories, and the development seed.
//!
//! ```text
//! handler ─► db.products() / db.categories() / db.carts()
//!                 │
//!                 ├─ single statements on the pool
//!                 └─ multi-step writes in one transaction
//!                         │
//!                         ▼
//!                 SQLite (DATABASE_URI)
//! ```
//!
//! Reads never return soft-deleted rows. A cart's products are the live
//! products linked to it, ordered by when they were added.
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./storefront.db")).await?;
//! let cart = db.carts().create().await?;
//! let cart = db.carts().add_product(&cart.id, &product_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbLocation};

pub use repository::cart::CartRepository;
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
