//! # Product Query Composer
//!
//! Turns a [`ProductQuery`] into one parameterized SELECT and maps the
//! joined rows back into domain types.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   ProductQuery → SQL                                    │
//! │                                                                         │
//! │  SELECT <product cols>, <category cols>                                │
//! │  FROM products p                                                       │
//! │  LEFT JOIN categories c                                                │
//! │         ON c.id = p.category_id AND c.deleted_at IS NULL               │
//! │  WHERE p.deleted_at IS NULL                                            │
//! │    [AND p.category_id = ?]          ← category_id: Some(..)            │
//! │    [AND p.price_cents >= ?]         ← min_price:   Some(..)            │
//! │    [AND p.price_cents <= ?]         ← max_price:   Some(..)            │
//! │  ORDER BY p.created_at DESC, p.id DESC                                 │
//! │  LIMIT ? OFFSET ?                                                      │
//! │                                                                         │
//! │  Every value is a bound parameter. A bound of zero is still emitted.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};

use storefront_core::{Category, Money, Product, ProductQuery};

/// Product columns plus the attached category, aliased for [`ProductRow`].
pub(crate) const PRODUCT_COLUMNS: &str = "\
    p.id, p.name, p.price_cents, p.category_id, \
    p.created_at, p.updated_at, p.deleted_at, \
    c.id AS category_ref_id, c.name AS category_name, \
    c.created_at AS category_created_at, c.updated_at AS category_updated_at";

/// Live-category join shared by every product read.
pub(crate) const CATEGORY_JOIN: &str =
    "LEFT JOIN categories c ON c.id = p.category_id AND c.deleted_at IS NULL";

/// Builds the listing query for `query`.
///
/// ## Example
/// ```rust,ignore
/// let mut builder = product_list_query(&query);
/// let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(&pool).await?;
/// ```
pub fn product_list_query(query: &ProductQuery) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM products p {} WHERE p.deleted_at IS NULL",
        PRODUCT_COLUMNS, CATEGORY_JOIN
    ));

    if let Some(category_id) = &query.category_id {
        builder
            .push(" AND p.category_id = ")
            .push_bind(category_id.clone());
    }

    if let Some(min) = query.min_price {
        builder.push(" AND p.price_cents >= ").push_bind(min.cents());
    }

    if let Some(max) = query.max_price {
        builder.push(" AND p.price_cents <= ").push_bind(max.cents());
    }

    builder
        .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
        .push_bind(query.pagination.limit())
        .push(" OFFSET ")
        .push_bind(query.pagination.offset());

    builder
}

// =============================================================================
// Row Mapping
// =============================================================================

/// One row of a product read, category columns included.
#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub category_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub category_ref_id: Option<String>,
    pub category_name: Option<String>,
    pub category_created_at: Option<DateTime<Utc>>,
    pub category_updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let category = match (
            row.category_ref_id,
            row.category_name,
            row.category_created_at,
            row.category_updated_at,
        ) {
            (Some(id), Some(name), Some(created_at), Some(updated_at)) => Some(Category {
                id,
                name,
                created_at,
                updated_at,
                deleted_at: None,
            }),
            _ => None,
        };

        Product {
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            category_id: row.category_id,
            category,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// A product row tagged with the cart that holds it.
#[derive(Debug, sqlx::FromRow)]
pub struct CartProductRow {
    pub cart_id: String,
    #[sqlx(flatten)]
    pub product: ProductRow,
}

/// Category table row.
#[derive(Debug, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// Cart table row (products are loaded separately).
#[derive(Debug, sqlx::FromRow)]
pub struct CartRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Pagination;

    #[test]
    fn test_unfiltered_query_has_no_filter_clauses() {
        let builder = product_list_query(&ProductQuery::default());
        let sql = builder.sql();

        assert!(sql.contains("WHERE p.deleted_at IS NULL"));
        assert!(!sql.contains("p.category_id = "));
        assert!(!sql.contains("price_cents >="));
        assert!(!sql.contains("price_cents <="));
        assert!(sql.contains("ORDER BY p.created_at DESC, p.id DESC"));
        assert!(sql.contains("c.deleted_at IS NULL"));
    }

    #[test]
    fn test_each_filter_adds_one_bound_clause() {
        let query = ProductQuery {
            pagination: Pagination::new(2, 10),
            category_id: Some("books".to_string()),
            min_price: Some(Money::zero()),
            max_price: Some(Money::from_cents(1500)),
        };
        let builder = product_list_query(&query);
        let sql = builder.sql();

        assert!(sql.contains("AND p.category_id = ?"));
        assert!(sql.contains("AND p.price_cents >= ?"));
        assert!(sql.contains("AND p.price_cents <= ?"));
        assert!(sql.ends_with("LIMIT ? OFFSET ?"));
        // no literal values leak into the SQL text
        assert!(!sql.contains("books"));
        assert!(!sql.contains("1500"));
    }
}
