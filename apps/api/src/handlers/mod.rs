//! # Request Handlers
//!
//! One module per resource. Every handler follows the same shape:
//!
//! ```text
//! extract (path / query / JSON) ──► validate (storefront-core)
//!        ──► ONE repository call under the deadline (AppState::store)
//!        ──► status + JSON body
//! ```
//!
//! Handlers never check existence before mutating; the repository call
//! reports `NotFound` itself.

pub mod cart;
pub mod category;
pub mod health;
pub mod product;

use storefront_core::validation::validate_uuid;

use crate::error::AppResult;

/// Validates an id taken from the URL path, returning its stored form.
fn path_id(field: &str, raw: String) -> AppResult<String> {
    Ok(validate_uuid(field, &raw)?)
}
