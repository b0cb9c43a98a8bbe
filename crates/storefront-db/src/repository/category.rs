//! # Category Repository
//!
//! Database operations for categories.
//!
//! Deleting a category is a soft delete that also detaches its products
//! (`category_id = NULL`) in the same transaction, so no live product ever
//! points at a deleted category.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::query::CategoryRow;
use crate::error::{DbError, DbResult};
use storefront_core::Category;

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists live categories, newest first.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        debug!("Listing categories");

        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, created_at, updated_at, deleted_at
            FROM categories
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Gets a live category by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, created_at, updated_at, deleted_at
            FROM categories
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Category::from)
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Creates a category with an already-validated name.
    pub async fn create(&self, name: String) -> DbResult<Category> {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, created_at, updated_at, deleted_at)
            VALUES (?1, ?2, ?3, ?4, NULL)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Renames a live category.
    pub async fn update(&self, id: &str, name: String) -> DbResult<Category> {
        debug!(id = %id, "Updating category");

        let now = Utc::now();

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET name = ?2, updated_at = ?3
            WHERE id = ?1 AND deleted_at IS NULL
            RETURNING id, name, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Category::from)
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Soft-deletes a category and detaches its products.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting category");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        let detached = sqlx::query(
            r#"
            UPDATE products
            SET category_id = NULL, updated_at = ?2
            WHERE category_id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(id = %id, detached = detached.rows_affected(), "Category deleted");
        Ok(())
    }

    /// Counts live categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use storefront_core::{Money, ProductInput, ProductQuery};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_get_update() {
        let db = setup().await;
        let repo = db.categories();

        let books = repo.create("Books".to_string()).await.unwrap();
        assert_eq!(repo.get_by_id(&books.id).await.unwrap().name, "Books");

        let renamed = repo.update(&books.id, "Novels".to_string()).await.unwrap();
        assert_eq!(renamed.name, "Novels");
        assert_eq!(renamed.created_at, books.created_at);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_category_is_not_found() {
        let db = setup().await;
        let repo = db.categories();

        assert!(matches!(repo.get_by_id("nope").await, Err(DbError::NotFound { .. })));
        assert!(matches!(
            repo.update("nope", "X".to_string()).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(repo.soft_delete("nope").await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_soft_delete_detaches_products() {
        let db = setup().await;
        let books = db.categories().create("Books".to_string()).await.unwrap();
        let foo = db
            .products()
            .create(ProductInput {
                name: "Foo".to_string(),
                price: Money::from_cents(999),
                category_id: Some(books.id.clone()),
            })
            .await
            .unwrap();

        db.categories().soft_delete(&books.id).await.unwrap();

        let foo = db.products().get_by_id(&foo.id).await.unwrap();
        assert_eq!(foo.category_id, None);
        assert!(foo.category.is_none());

        let query = ProductQuery {
            category_id: Some(books.id.clone()),
            ..Default::default()
        };
        assert!(db.products().list(&query).await.unwrap().is_empty());
        assert_eq!(db.categories().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deleted_category_cannot_be_referenced() {
        let db = setup().await;
        let books = db.categories().create("Books".to_string()).await.unwrap();
        db.categories().soft_delete(&books.id).await.unwrap();

        let err = db
            .products()
            .create(ProductInput {
                name: "Foo".to_string(),
                price: Money::from_cents(999),
                category_id: Some(books.id.clone()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidReference { .. }));
    }
}
