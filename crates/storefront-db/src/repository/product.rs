//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Filtered, paginated listing (see [`query`](super::query))
//! - CRUD with a live-category check on every write
//! - Soft delete
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create / update                                      │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT … SELECT / UPDATE … WHERE category is NULL or live            │
//! │      0 rows → NotFound (update, product gone) or InvalidReference       │
//! │    SELECT product + category                                            │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The first statement is the write, so it takes the SQLite write lock   │
//! │  (waiting on busy_timeout) and the category check runs under it.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::query::{product_list_query, ProductRow, CATEGORY_JOIN, PRODUCT_COLUMNS};
use crate::error::{DbError, DbResult};
use storefront_core::{Product, ProductInput, ProductQuery};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let page = repo.list(&ProductQuery::default()).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists live products matching `query`, newest first.
    ///
    /// Each product carries its category (if the category is live).
    pub async fn list(&self, query: &ProductQuery) -> DbResult<Vec<Product>> {
        debug!(
            page = query.pagination.page(),
            page_size = query.pagination.page_size(),
            category_id = ?query.category_id,
            min_price = ?query.min_price,
            max_price = ?query.max_price,
            "Listing products"
        );

        let mut builder = product_list_query(query);
        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listing returned products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Gets a live product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product found
    /// * `Err(DbError::NotFound)` - Missing or soft-deleted
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        let mut conn = self.pool.acquire().await?;
        fetch_live_product(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Creates a product from validated input.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product, category attached
    /// * `Err(DbError::InvalidReference)` - `category_id` is not a live category
    pub async fn create(&self, input: ProductInput) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: input.name,
            price: input.price,
            category_id: input.category_id,
            category: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.insert(&product).await
    }

    /// Inserts a fully-formed product (id and timestamps already set).
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO products (
                id, name, price_cents, category_id,
                created_at, updated_at, deleted_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, NULL
            WHERE {}
            "#,
            CATEGORY_IS_NULL_OR_LIVE
        );
        let result = sqlx::query(&sql)
            .bind(&product.id)
            .bind(&product.name)
            .bind(product.price.cents())
            .bind(&product.category_id)
            .bind(product.created_at)
            .bind(product.updated_at)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            let category_id = product.category_id.as_deref().unwrap_or_default();
            return Err(DbError::invalid_reference("Category", category_id));
        }

        let stored = fetch_live_product(&mut tx, &product.id)
            .await?
            .ok_or_else(|| DbError::Internal("inserted product not readable".to_string()))?;

        tx.commit().await?;
        Ok(stored)
    }

    /// Overwrites every mutable field of a live product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::InvalidReference)` - `category_id` is not a live category
    pub async fn update(&self, id: &str, input: ProductInput) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                category_id = ?4,
                updated_at = ?5
            WHERE id = ?1 AND deleted_at IS NULL AND {}
            "#,
            CATEGORY_IS_NULL_OR_LIVE
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.price.cents())
            .bind(&input.category_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // The write lock is held, so this read agrees with the UPDATE.
            if fetch_live_product(&mut tx, id).await?.is_none() {
                return Err(DbError::not_found("Product", id));
            }
            let category_id = input.category_id.as_deref().unwrap_or_default();
            return Err(DbError::invalid_reference("Category", category_id));
        }

        let updated = fetch_live_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Soft-deletes a product.
    ///
    /// The row stays; carts that held it stop showing it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts live products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-Level Helpers
// =============================================================================
// Take a connection so they can run inside a caller's transaction.

/// Write guard: `?4` (the category id) is NULL or names a live category.
const CATEGORY_IS_NULL_OR_LIVE: &str =
    "(?4 IS NULL OR EXISTS (SELECT 1 FROM categories WHERE id = ?4 AND deleted_at IS NULL))";

/// Reads one live product with its category.
pub(crate) async fn fetch_live_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Product>> {
    let sql = format!(
        "SELECT {} FROM products p {} WHERE p.id = ?1 AND p.deleted_at IS NULL",
        PRODUCT_COLUMNS, CATEGORY_JOIN
    );

    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row.map(Product::from))
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use storefront_core::{Money, Pagination};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// File-backed store with a real multi-connection pool.
    async fn setup_file(dir: &tempfile::TempDir) -> Database {
        let config = DbConfig::new(dir.path().join("storefront.db")).max_connections(5);
        Database::new(config).await.unwrap()
    }

    fn input(name: &str, cents: i64, category_id: Option<&str>) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price: Money::from_cents(cents),
            category_id: category_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_attaches_category() {
        let db = setup().await;
        let books = db.categories().create("Books".to_string()).await.unwrap();

        let created = db
            .products()
            .create(input("Foo", 999, Some(&books.id)))
            .await
            .unwrap();
        assert_eq!(created.price, Money::from_cents(999));
        assert_eq!(created.category.as_ref().map(|c| c.name.as_str()), Some("Books"));

        let fetched = db.products().get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let db = setup().await;

        let missing = Uuid::new_v4().to_string();
        let err = db
            .products()
            .create(input("Foo", 999, Some(&missing)))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InvalidReference { .. }));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_price_filters_and_category() {
        let db = setup().await;
        let books = db.categories().create("Books".to_string()).await.unwrap();
        let foo = db
            .products()
            .create(input("Foo", 999, Some(&books.id)))
            .await
            .unwrap();

        let query = ProductQuery {
            category_id: Some(books.id.clone()),
            min_price: Some(Money::from_cents(500)),
            ..Default::default()
        };
        let found = db.products().list(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, foo.id);
        assert_eq!(found[0].category.as_ref().map(|c| c.id.as_str()), Some(books.id.as_str()));

        let query = ProductQuery {
            min_price: Some(Money::from_cents(1500)),
            ..query
        };
        assert!(db.products().list(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_max_price_is_applied() {
        let db = setup().await;
        db.products().create(input("Free", 0, None)).await.unwrap();
        db.products().create(input("Paid", 100, None)).await.unwrap();

        let query = ProductQuery {
            max_price: Some(Money::zero()),
            ..Default::default()
        };
        let found = db.products().list(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Free");
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginates() {
        let db = setup().await;
        let base = Utc::now();
        for i in 0..5 {
            let at = base + chrono::Duration::seconds(i);
            db.products()
                .insert(&Product {
                    id: generate_product_id(),
                    name: format!("P{}", i),
                    price: Money::from_cents(100),
                    category_id: None,
                    category: None,
                    created_at: at,
                    updated_at: at,
                    deleted_at: None,
                })
                .await
                .unwrap();
        }

        let first = ProductQuery {
            pagination: Pagination::new(1, 2),
            ..Default::default()
        };
        let names: Vec<_> = db
            .products()
            .list(&first)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["P4", "P3"]);

        let last = ProductQuery {
            pagination: Pagination::new(3, 2),
            ..Default::default()
        };
        let names: Vec<_> = db
            .products()
            .list(&last)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["P0"]);

        let past_end = ProductQuery {
            pagination: Pagination::new(4, 2),
            ..Default::default()
        };
        assert!(db.products().list(&past_end).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filtered_results_match_query() {
        let db = setup().await;
        let books = db.categories().create("Books".to_string()).await.unwrap();
        let toys = db.categories().create("Toys".to_string()).await.unwrap();
        for (i, cents) in [50, 500, 999, 1500, 2500].iter().enumerate() {
            let category = if i % 2 == 0 { &books.id } else { &toys.id };
            db.products()
                .create(input(&format!("P{}", i), *cents, Some(category)))
                .await
                .unwrap();
        }

        let query = ProductQuery {
            category_id: Some(books.id.clone()),
            min_price: Some(Money::from_cents(100)),
            max_price: Some(Money::from_cents(2500)),
            ..Default::default()
        };
        let found = db.products().list(&query).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| query.matches(p)));
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let db = setup().await;
        let books = db.categories().create("Books".to_string()).await.unwrap();
        let created = db
            .products()
            .create(input("Foo", 999, Some(&books.id)))
            .await
            .unwrap();

        let updated = db
            .products()
            .update(&created.id, input("Bar", 1250, None))
            .await
            .unwrap();

        assert_eq!(updated.name, "Bar");
        assert_eq!(updated.price, Money::from_cents(1250));
        assert_eq!(updated.category_id, None);
        assert!(updated.category.is_none());
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = setup().await;
        let err = db
            .products()
            .update("missing", input("Bar", 1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_product() {
        let db = setup().await;
        let created = db.products().create(input("Foo", 999, None)).await.unwrap();

        db.products().soft_delete(&created.id).await.unwrap();

        assert!(matches!(
            db.products().get_by_id(&created.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(db.products().list(&ProductQuery::default()).await.unwrap().is_empty());
        assert_eq!(db.products().count().await.unwrap(), 0);

        // second delete sees nothing live
        assert!(db.products().soft_delete(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_with_missing_category_keeps_product() {
        let db = setup().await;
        let created = db.products().create(input("Foo", 999, None)).await.unwrap();

        let missing = Uuid::new_v4().to_string();
        let err = db
            .products()
            .update(&created.id, input("Bar", 1, Some(&missing)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidReference { .. }));

        let unchanged = db.products().get_by_id(&created.id).await.unwrap();
        assert_eq!(unchanged.name, "Foo");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup_file(&dir).await;
        let books = db.categories().create("Books".to_string()).await.unwrap();

        let mut creates = Vec::new();
        for i in 0..100 {
            let products = db.products();
            let category_id = books.id.clone();
            creates.push(tokio::spawn(async move {
                products
                    .create(input(&format!("P{}", i), 100 + i, Some(&category_id)))
                    .await
            }));
        }

        let mut ids = Vec::new();
        for handle in creates {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        assert_eq!(db.products().count().await.unwrap(), 100);

        let mut updates = Vec::new();
        for (i, id) in ids.iter().cloned().enumerate() {
            let products = db.products();
            let category_id = books.id.clone();
            updates.push(tokio::spawn(async move {
                products
                    .update(&id, input(&format!("Q{}", i), 200, Some(&category_id)))
                    .await
            }));
        }

        for handle in updates {
            let updated = handle.await.unwrap().unwrap();
            assert!(updated.name.starts_with('Q'));
            assert_eq!(updated.price, Money::from_cents(200));
        }

        db.close().await;
    }
}
