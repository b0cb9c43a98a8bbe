//! # storefront-core
//!
//! Domain model and rules for the storefront, with no I/O.
//!
//! ```text
//!            apps/api ──── validation::* ───► typed input
//!               │                                 │
//!               ▼                                 ▼
//!        storefront-db ◄──── types::* / Money / ProductQuery
//! ```
//!
//! - [`types`]: categories, products, carts, checkout summaries, list queries
//! - [`money`]: integer-cent amounts and their decimal wire format
//! - [`validation`]: request checks, run before any storage call
//! - [`error`]: `CoreError` and `ValidationError`
//!
//! ```rust
//! use storefront_core::{validation::validate_product_query, ListProductsParams};
//!
//! let params = ListProductsParams {
//!     min_price: Some("5".to_string()),
//!     ..Default::default()
//! };
//! let query = validate_product_query(&params).unwrap();
//! assert_eq!(query.min_price.map(|m| m.cents()), Some(500));
//! ```

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

/// Page size used when a list request does not name one.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Maximum length of product and category names, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Highest accepted price: 10,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;
