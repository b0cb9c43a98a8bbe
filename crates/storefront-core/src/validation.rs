//! # Validation Module
//!
//! Input validation utilities for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (axum)                                       │
//! │  ├── Type validation (JSON / query deserialization)                    │
//! │  └── Malformed input → 400 "Invalid request format"                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, UUID format                             │
//! │  └── Pagination bounds, price range sanity                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Live category reference check (in the write transaction)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_name, validate_uuid};
//!
//! validate_name("name", "Foo").unwrap();
//! validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CategoryInput, ListProductsParams, Pagination, ProductInput, ProductQuery};
use crate::{DEFAULT_PAGE_SIZE, MAX_NAME_LENGTH, MAX_PAGE_SIZE, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product or category).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `MAX_NAME_LENGTH` characters
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Books ").unwrap(), "Books");
/// assert!(validate_name("name", "").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative
/// - Zero is allowed (free items)
/// - At most `MAX_PRICE_CENTS`
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    let max = Money::from_cents(MAX_PRICE_CENTS);
    if price.is_negative() || price > max {
        return Err(ValidationError::AmountOutOfRange {
            field: field.to_string(),
            min: Money::zero().to_decimal_string(),
            max: max.to_decimal_string(),
        });
    }

    Ok(())
}

/// Parses and validates an optional price bound from a query string.
///
/// Empty strings count as "not given".
fn parse_price_bound(field: &str, raw: Option<&str>) -> ValidationResult<Option<Money>> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    let price: Money = raw.parse().map_err(|e: crate::money::MoneyParseError| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: e.to_string(),
        }
    })?;
    validate_price(field, price)?;

    Ok(Some(price))
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID and returns it in the stored form: lowercase and
/// hyphenated. Uppercase, braced, `urn:uuid:` and simple forms are accepted.
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_uuid;
///
/// let id = validate_uuid("id", "550E8400-E29B-41D4-A716-446655440000").unwrap();
/// assert_eq!(id, "550e8400-e29b-41d4-a716-446655440000");
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let parsed = uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(parsed.hyphenated().to_string())
}

/// Normalizes an optional id: blank means "none", anything else must be a UUID.
fn optional_uuid(field: &str, id: Option<&str>) -> ValidationResult<Option<String>> {
    match id.map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => {
            validate_uuid(field, id).map(Some)
        }
    }
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates and normalizes a product create/update body.
pub fn validate_product_input(input: ProductInput) -> ValidationResult<ProductInput> {
    let name = validate_name("name", &input.name)?;
    validate_price("price", input.price)?;
    let category_id = optional_uuid("categoryId", input.category_id.as_deref())?;

    Ok(ProductInput {
        name,
        price: input.price,
        category_id,
    })
}

/// Validates and normalizes a category create/update body.
pub fn validate_category_input(input: CategoryInput) -> ValidationResult<CategoryInput> {
    Ok(CategoryInput {
        name: validate_name("name", &input.name)?,
    })
}

/// Turns raw `GET /products` parameters into a [`ProductQuery`].
///
/// ## Rules
/// ```text
/// page        ≥ 1                     (default 1)
/// pageSize    1..=MAX_PAGE_SIZE       (default 25)
/// categoryId  UUID, blank = no filter
/// minPrice    decimal ≥ 0, blank = no bound
/// maxPrice    decimal ≥ 0, blank = no bound
/// minPrice ≤ maxPrice when both are given
/// ```
pub fn validate_product_query(params: &ListProductsParams) -> ValidationResult<ProductQuery> {
    let page = params.page.unwrap_or(1);
    if page < 1 {
        return Err(ValidationError::OutOfRange {
            field: "page".to_string(),
            min: 1,
            max: i64::from(u32::MAX),
        });
    }

    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ValidationError::OutOfRange {
            field: "pageSize".to_string(),
            min: 1,
            max: i64::from(MAX_PAGE_SIZE),
        });
    }

    let category_id = optional_uuid("categoryId", params.category_id.as_deref())?;
    let min_price = parse_price_bound("minPrice", params.min_price.as_deref())?;
    let max_price = parse_price_bound("maxPrice", params.max_price.as_deref())?;

    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(ValidationError::InvertedRange {
                lower: "minPrice".to_string(),
                upper: "maxPrice".to_string(),
            });
        }
    }

    Ok(ProductQuery {
        pagination: Pagination::new(page, page_size),
        category_id,
        min_price,
        max_price,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKS: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", " Foo ").unwrap(), "Foo");
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_cents(999)).is_ok());
        assert!(validate_price("price", Money::from_cents(-1)).is_err());
        assert!(validate_price("price", Money::from_cents(MAX_PRICE_CENTS)).is_ok());

        let err = validate_price("price", Money::from_cents(MAX_PRICE_CENTS + 1)).unwrap_err();
        assert_eq!(err.to_string(), "price must be between 0.00 and 10000000.00");
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", BOOKS).is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());

        let canonical = BOOKS.to_string();
        assert_eq!(validate_uuid("id", &BOOKS.to_uppercase()).unwrap(), canonical);
        assert_eq!(validate_uuid("id", &format!("{{{}}}", BOOKS)).unwrap(), canonical);
        assert_eq!(validate_uuid("id", &format!("urn:uuid:{}", BOOKS)).unwrap(), canonical);
        assert_eq!(validate_uuid("id", &BOOKS.replace('-', "")).unwrap(), canonical);
    }

    #[test]
    fn test_validate_product_input_normalizes() {
        let input = ProductInput {
            name: "  Foo ".to_string(),
            price: Money::from_cents(999),
            category_id: Some(" ".to_string()),
        };
        let normalized = validate_product_input(input).unwrap();
        assert_eq!(normalized.name, "Foo");
        assert_eq!(normalized.category_id, None);

        let bad = ProductInput {
            name: "Foo".to_string(),
            price: Money::from_cents(999),
            category_id: Some("books".to_string()),
        };
        assert!(validate_product_input(bad).is_err());
    }

    #[test]
    fn test_validate_category_input() {
        let input = CategoryInput {
            name: " Books ".to_string(),
        };
        assert_eq!(validate_category_input(input).unwrap().name, "Books");

        let blank = CategoryInput {
            name: String::new(),
        };
        assert!(matches!(
            validate_category_input(blank),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_product_query_defaults() {
        let query = validate_product_query(&ListProductsParams::default()).unwrap();
        assert_eq!(query.pagination.page(), 1);
        assert_eq!(query.pagination.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.category_id, None);
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, None);
    }

    #[test]
    fn test_product_query_parses_filters() {
        let params = ListProductsParams {
            page: Some(2),
            page_size: Some(10),
            category_id: Some(BOOKS.to_string()),
            min_price: Some("5".to_string()),
            max_price: Some("0".to_string()),
        };
        // min 5 > max 0 is rejected: zero is a real bound, not "unset"
        assert!(matches!(
            validate_product_query(&params),
            Err(ValidationError::InvertedRange { .. })
        ));

        let params = ListProductsParams {
            max_price: Some("15.50".to_string()),
            ..params
        };
        let query = validate_product_query(&params).unwrap();
        assert_eq!(query.pagination.offset(), 10);
        assert_eq!(query.category_id.as_deref(), Some(BOOKS));
        assert_eq!(query.min_price, Some(Money::from_cents(500)));
        assert_eq!(query.max_price, Some(Money::from_cents(1550)));
    }

    #[test]
    fn test_product_query_rejects_bad_input() {
        let zero_page = ListProductsParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(validate_product_query(&zero_page).is_err());

        let huge_page = ListProductsParams {
            page_size: Some(MAX_PAGE_SIZE + 1),
            ..Default::default()
        };
        assert!(validate_product_query(&huge_page).is_err());

        let bad_price = ListProductsParams {
            min_price: Some("cheap".to_string()),
            ..Default::default()
        };
        assert!(validate_product_query(&bad_price).is_err());

        let negative = ListProductsParams {
            max_price: Some("-1".to_string()),
            ..Default::default()
        };
        assert!(validate_product_query(&negative).is_err());
    }

    #[test]
    fn test_product_query_blank_filters_are_unset() {
        let params = ListProductsParams {
            category_id: Some(String::new()),
            min_price: Some(" ".to_string()),
            ..Default::default()
        };
        let query = validate_product_query(&params).unwrap();
        assert_eq!(query.category_id, None);
        assert_eq!(query.min_price, None);
    }
}
