//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │     Product     │   │      Cart       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  category_id?   │◄─►│  products[]     │       │
//! │  │  name           │ 1:N│  name, price   │ N:M│  (set, no qty)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Pagination    │   │  ProductQuery   │   │ CheckoutSummary │       │
//! │  │  page, size     │──►│  filters        │   │  total, count   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft Delete
//! Every entity carries `deleted_at`. It is never serialized; rows with a
//! marker are invisible to default reads but stay in storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Category
// =============================================================================

/// A product category ("Books", "Electronics", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker. Never leaves the backend.
    #[serde(skip)]
    #[ts(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating or renaming a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be listed and put into carts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    /// Unit price, serialized as a decimal string (`"9.99"`).
    #[serde(with = "crate::money::decimal")]
    #[ts(as = "String")]
    pub price: Money,

    /// Owning category, if any.
    pub category_id: Option<String>,

    /// The owning category, attached on reads.
    pub category: Option<Category>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[serde(skip)]
    #[ts(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating or fully overwriting a product.
///
/// ## Overwrite Semantics
/// `PUT /products/{id}` replaces ALL of these fields. Omitting `categoryId`
/// clears the category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductInput {
    pub name: String,

    #[serde(with = "crate::money::decimal")]
    #[ts(as = "String")]
    pub price: Money,

    #[serde(default)]
    pub category_id: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

/// A shopping cart holding a SET of products (no quantities).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub id: String,

    /// Products currently in the cart, oldest addition first.
    pub products: Vec<Product>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[serde(skip)]
    #[ts(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Sum of the prices of every product in the cart; `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        Money::checked_sum(self.products.iter().map(|p| p.price))
    }

    /// Checks whether the cart holds the given product.
    pub fn contains(&self, product_id: &str) -> bool {
        self.products.iter().any(|p| p.id == product_id)
    }
}

/// Result of checking out a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutSummary {
    pub cart_id: String,
    pub products: Vec<Product>,
    pub item_count: u32,
    #[serde(with = "crate::money::decimal")]
    #[ts(as = "String")]
    pub total: Money,
}

impl CheckoutSummary {
    /// Builds the summary for a cart that is about to be closed.
    ///
    /// ## Rules
    /// - An empty cart cannot be checked out
    /// - The total must fit in `Money`
    pub fn for_cart(cart: Cart) -> CoreResult<Self> {
        if cart.products.is_empty() {
            return Err(CoreError::EmptyCart(cart.id));
        }

        let Some(total) = cart.total() else {
            return Err(CoreError::TotalOverflow(cart.id));
        };
        Ok(CheckoutSummary {
            item_count: cart.products.len() as u32,
            cart_id: cart.id,
            products: cart.products,
            total,
        })
    }
}

// =============================================================================
// Listing: Pagination + Product Query
// =============================================================================

/// Page selection for list endpoints.
///
/// ## Offset Math
/// ```text
/// page=1, size=25  →  OFFSET 0   LIMIT 25
/// page=3, size=10  →  OFFSET 20  LIMIT 10
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    page_size: u32,
}

impl Pagination {
    /// Creates a pagination, clamping `page` to at least 1 and `page_size`
    /// into `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, page_size: u32) -> Self {
        Pagination {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    #[inline]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[inline]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip: `(page - 1) × page_size`.
    #[inline]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size)
    }

    /// Rows to return.
    #[inline]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Validated criteria for listing products.
///
/// Every filter is independently optional. `None` means "no restriction";
/// `Some(Money::zero())` is a real bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub pagination: Pagination,
    pub category_id: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
}

impl ProductQuery {
    /// Whether a product satisfies the category and price filters.
    ///
    /// Mirrors the SQL the query composer emits; used to check results.
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = match &self.category_id {
            Some(id) => product.category_id.as_deref() == Some(id.as_str()),
            None => true,
        };
        let min_ok = self.min_price.map_or(true, |min| product.price >= min);
        let max_ok = self.max_price.map_or(true, |max| product.price <= max);
        category_ok && min_ok && max_ok
    }
}

/// Raw query-string parameters for `GET /products`.
///
/// Turned into a [`ProductQuery`] by
/// [`validate_product_query`](crate::validation::validate_product_query).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category_id: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64, category_id: Option<&str>) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(cents),
            category_id: category_id.map(str::to_string),
            category: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_pagination_offset_and_limit() {
        let p = Pagination::new(3, 10);
        assert_eq!(p.offset(), 20);
        assert_eq!(p.limit(), 10);

        let first = Pagination::default();
        assert_eq!(first.page(), 1);
        assert_eq!(first.offset(), 0);
        assert_eq!(first.limit(), 25);
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination::new(0, 0);
        assert_eq!(p.page(), 1);
        assert_eq!(p.page_size(), 1);

        let p = Pagination::new(2, 10_000);
        assert_eq!(p.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_query_matches_price_bounds() {
        let foo = product("a", 999, Some("books"));

        let mut query = ProductQuery {
            min_price: Some(Money::from_cents(500)),
            ..Default::default()
        };
        assert!(query.matches(&foo));

        query.min_price = Some(Money::from_cents(1500));
        assert!(!query.matches(&foo));

        query.min_price = None;
        query.max_price = Some(Money::from_cents(999));
        assert!(query.matches(&foo));
    }

    #[test]
    fn test_query_zero_bound_is_a_real_bound() {
        let free = product("free", 0, None);
        let query = ProductQuery {
            max_price: Some(Money::zero()),
            ..Default::default()
        };
        assert!(query.matches(&free));
        assert!(!query.matches(&product("paid", 1, None)));
    }

    #[test]
    fn test_query_matches_category() {
        let query = ProductQuery {
            category_id: Some("books".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&product("a", 100, Some("books"))));
        assert!(!query.matches(&product("b", 100, Some("toys"))));
        assert!(!query.matches(&product("c", 100, None)));
    }

    #[test]
    fn test_checkout_summary_totals_cart() {
        let now = Utc::now();
        let cart = Cart {
            id: "cart-1".to_string(),
            products: vec![product("a", 999, None), product("b", 501, None)],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        assert!(cart.contains("a"));

        let summary = CheckoutSummary::for_cart(cart).unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total.cents(), 1500);
    }

    #[test]
    fn test_checkout_rejects_empty_cart() {
        let now = Utc::now();
        let cart = Cart {
            id: "cart-1".to_string(),
            products: vec![],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        assert!(matches!(
            CheckoutSummary::for_cart(cart),
            Err(CoreError::EmptyCart(id)) if id == "cart-1"
        ));
    }

    #[test]
    fn test_checkout_refuses_total_that_overflows() {
        let now = Utc::now();
        let cart = Cart {
            id: "cart-1".to_string(),
            products: vec![
                product("a", 9_223_372_036_854_775_807, None),
                product("b", 9_223_372_036_854_775_807, None),
            ],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        assert_eq!(cart.total(), None);
        assert!(matches!(
            CheckoutSummary::for_cart(cart),
            Err(CoreError::TotalOverflow(id)) if id == "cart-1"
        ));
    }

    #[test]
    fn test_product_json_shape() {
        let json = serde_json::to_value(product("a", 999, Some("books"))).unwrap();
        assert_eq!(json["price"], "9.99");
        assert_eq!(json["categoryId"], "books");
        assert!(json.get("deletedAt").is_none());
        assert!(json.get("createdAt").is_some());
    }
}
