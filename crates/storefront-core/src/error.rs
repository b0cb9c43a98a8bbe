//! # Domain Errors
//!
//! ```text
//! ValidationError ──────────────────────► AppError 400
//! CoreError ──► DbError::Rule ──────────► AppError 400
//! ```
//!
//! Both types carry the client-facing message in their `Display` impl.

use thiserror::Error;

/// A domain rule refused an operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout needs at least one product.
    #[error("Cart {0} is empty")]
    EmptyCart(String),

    #[error("Cart {0} total is out of range")]
    TotalOverflow(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Request input that fails a rule, caught before storage is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Missing, or blank after trimming.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Amounts are reported in decimal form, e.g. "0.00".
    #[error("{field} must be between {min} and {max}")]
    AmountOutOfRange { field: String, min: String, max: String },

    /// Unparseable UUID or amount.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// `lower` exceeds `upper` (e.g. `minPrice` > `maxPrice`).
    #[error("{lower} must not be greater than {upper}")]
    InvertedRange { lower: String, upper: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
