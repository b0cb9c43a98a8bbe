//! # Cart Repository
//!
//! Carts and their product sets.
//!
//! ## Mutation Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              add / remove / clear / checkout                            │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE carts SET updated_at = now                                   │
//! │     WHERE id = ? AND deleted_at IS NULL    ← 0 rows → NotFound("Cart") │
//! │    ─────────────────────────────────────                                │
//! │    one statement against cart_products                                 │
//! │    ─────────────────────────────────────                                │
//! │    SELECT cart + live products                                         │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The first statement is a write, so the existence check takes the      │
//! │  SQLite write lock. Two requests on the same cart run one after the    │
//! │  other; neither sees a cart the other has deleted.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Set Semantics
//! `cart_products` is keyed on `(cart_id, product_id)` and rows are written
//! with `INSERT OR IGNORE`, so adding a product twice leaves one entry.
//! Products come back oldest addition first.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::query::{CartProductRow, CartRow, ProductRow, CATEGORY_JOIN, PRODUCT_COLUMNS};
use crate::error::{DbError, DbResult};
use storefront_core::{Cart, CheckoutSummary, Product};

/// Repository for cart database operations.
///
/// ## Usage
/// ```rust,ignore
/// let carts = db.carts();
///
/// let cart = carts.create().await?;
/// let cart = carts.add_product(&cart.id, &product_id).await?;
/// let summary = carts.checkout(&cart.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists every live cart with its products, newest cart first.
    pub async fn get_all(&self) -> DbResult<Vec<Cart>> {
        debug!("Listing carts");

        // one snapshot for both queries
        let mut tx = self.pool.begin().await?;

        let carts = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT id, created_at, updated_at, deleted_at
            FROM carts
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let sql = format!(
            "SELECT cp.cart_id, {} \
             FROM cart_products cp \
             JOIN carts ct ON ct.id = cp.cart_id AND ct.deleted_at IS NULL \
             JOIN products p ON p.id = cp.product_id AND p.deleted_at IS NULL \
             {} \
             ORDER BY cp.added_at ASC, p.id ASC",
            PRODUCT_COLUMNS, CATEGORY_JOIN
        );
        let rows = sqlx::query_as::<_, CartProductRow>(&sql)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut by_cart: HashMap<String, Vec<Product>> = HashMap::new();
        for row in rows {
            by_cart
                .entry(row.cart_id)
                .or_default()
                .push(Product::from(row.product));
        }

        let carts = carts
            .into_iter()
            .map(|row| {
                let products = by_cart.remove(&row.id).unwrap_or_default();
                cart_from_row(row, products)
            })
            .collect::<Vec<_>>();

        debug!(count = carts.len(), "Listing returned carts");
        Ok(carts)
    }

    /// Gets a live cart with its products.
    pub async fn get_by_id(&self, cart_id: &str) -> DbResult<Cart> {
        let mut conn = self.pool.acquire().await?;
        load_cart(&mut conn, cart_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart", cart_id))
    }

    /// Returns the products in a live cart.
    pub async fn get_products(&self, cart_id: &str) -> DbResult<Vec<Product>> {
        Ok(self.get_by_id(cart_id).await?.products)
    }

    /// Counts live carts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates an empty cart.
    pub async fn create(&self) -> DbResult<Cart> {
        let now = Utc::now();
        let cart = Cart {
            id: Uuid::new_v4().to_string(),
            products: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(id = %cart.id, "Creating cart");

        sqlx::query(
            r#"
            INSERT INTO carts (id, created_at, updated_at, deleted_at)
            VALUES (?1, ?2, ?3, NULL)
            "#,
        )
        .bind(&cart.id)
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Adds a product to a cart. Adding a product already present is a no-op.
    ///
    /// ## Returns
    /// * `Ok(Cart)` - The cart after the change
    /// * `Err(DbError::NotFound)` - Cart or product missing (entity says which)
    pub async fn add_product(&self, cart_id: &str, product_id: &str) -> DbResult<Cart> {
        debug!(cart_id = %cart_id, product_id = %product_id, "Adding product to cart");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_cart(&mut tx, cart_id, now).await?;

        let live: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = ?1 AND deleted_at IS NULL")
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await?;
        if live == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO cart_products (cart_id, product_id, added_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let cart = reload_cart(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(cart)
    }

    /// Removes a product from a cart. A product that isn't there is ignored.
    pub async fn remove_product(&self, cart_id: &str, product_id: &str) -> DbResult<Cart> {
        debug!(cart_id = %cart_id, product_id = %product_id, "Removing product from cart");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_cart(&mut tx, cart_id, now).await?;

        sqlx::query("DELETE FROM cart_products WHERE cart_id = ?1 AND product_id = ?2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let cart = reload_cart(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(cart)
    }

    /// Removes every product from a cart.
    pub async fn clear(&self, cart_id: &str) -> DbResult<Cart> {
        debug!(cart_id = %cart_id, "Clearing cart");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_cart(&mut tx, cart_id, now).await?;

        sqlx::query("DELETE FROM cart_products WHERE cart_id = ?1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        let cart = reload_cart(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(cart)
    }

    /// Soft-deletes a cart.
    pub async fn soft_delete(&self, cart_id: &str) -> DbResult<()> {
        debug!(cart_id = %cart_id, "Soft-deleting cart");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE carts
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(cart_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart", cart_id));
        }

        Ok(())
    }

    /// Closes a cart: totals its live products and soft-deletes it.
    ///
    /// ## Returns
    /// * `Ok(CheckoutSummary)` - What was bought
    /// * `Err(DbError::NotFound)` - Cart missing
    /// * `Err(DbError::Rule(CoreError::EmptyCart))` - Nothing to check out;
    ///   the cart is left untouched
    pub async fn checkout(&self, cart_id: &str) -> DbResult<CheckoutSummary> {
        debug!(cart_id = %cart_id, "Checking out cart");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        touch_cart(&mut tx, cart_id, now).await?;

        let cart = reload_cart(&mut tx, cart_id).await?;
        let summary = CheckoutSummary::for_cart(cart)?;

        sqlx::query("UPDATE carts SET deleted_at = ?2 WHERE id = ?1")
            .bind(cart_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            cart_id = %cart_id,
            items = summary.item_count,
            total = %summary.total,
            "Cart checked out"
        );
        Ok(summary)
    }
}

// =============================================================================
// Connection-Level Helpers
// =============================================================================

/// Bumps `updated_at` on a live cart; the write that opens every mutation.
async fn touch_cart(conn: &mut SqliteConnection, cart_id: &str, now: DateTime<Utc>) -> DbResult<()> {
    let result = sqlx::query("UPDATE carts SET updated_at = ?2 WHERE id = ?1 AND deleted_at IS NULL")
        .bind(cart_id)
        .bind(now)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Cart", cart_id));
    }

    Ok(())
}

/// Loads a cart that the current transaction has already touched.
async fn reload_cart(conn: &mut SqliteConnection, cart_id: &str) -> DbResult<Cart> {
    load_cart(conn, cart_id)
        .await?
        .ok_or_else(|| DbError::not_found("Cart", cart_id))
}

async fn load_cart(conn: &mut SqliteConnection, cart_id: &str) -> DbResult<Option<Cart>> {
    let row = sqlx::query_as::<_, CartRow>(
        r#"
        SELECT id, created_at, updated_at, deleted_at
        FROM carts
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(cart_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let products = load_cart_products(conn, cart_id).await?;
    Ok(Some(cart_from_row(row, products)))
}

async fn load_cart_products(conn: &mut SqliteConnection, cart_id: &str) -> DbResult<Vec<Product>> {
    let sql = format!(
        "SELECT {} \
         FROM cart_products cp \
         JOIN products p ON p.id = cp.product_id AND p.deleted_at IS NULL \
         {} \
         WHERE cp.cart_id = ?1 \
         ORDER BY cp.added_at ASC, p.id ASC",
        PRODUCT_COLUMNS, CATEGORY_JOIN
    );

    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(cart_id)
        .fetch_all(conn)
        .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}

fn cart_from_row(row: CartRow, products: Vec<Product>) -> Cart {
    Cart {
        id: row.id,
        products,
        created_at: row.created_at,
        updated_at: row.updated_at,
        deleted_at: row.deleted_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
