use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::stores::CategoryStore;

const CATEGORY_COLUMNS: &str = "id, parent_id, name, description, slug, image_url, meta_title, \
     meta_description, display_order, is_active, created_at, updated_at";

/// Postgres-backed category store
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);

        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to get category by id", e))
    }

    async fn get_children(&self, parent_id: i64) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE parent_id = $1 ORDER BY display_order, name",
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to list child categories", e))
    }

    async fn get_children_of(&self, parent_ids: &[i64]) -> Result<Vec<Category>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM categories WHERE parent_id = ANY($1) ORDER BY display_order, name",
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&sql)
            .bind(parent_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to list child categories", e))
    }

    async fn get_all_flat(&self, active_only: bool) -> Result<Vec<Category>> {
        let sql = if active_only {
            format!(
                "SELECT {} FROM categories WHERE is_active = TRUE ORDER BY display_order, name",
                CATEGORY_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM categories ORDER BY display_order, name",
                CATEGORY_COLUMNS
            )
        };

        sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to list categories", e))
    }

    async fn insert(&self, category: &NewCategory) -> Result<Category> {
        let sql = format!(
            r#"
            INSERT INTO categories
                (parent_id, name, description, slug, image_url, meta_title, meta_description, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&sql)
            .bind(category.parent_id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.slug)
            .bind(&category.image_url)
            .bind(&category.meta_title)
            .bind(&category.meta_description)
            .bind(category.display_order)
            .bind(category.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to insert category", e))
    }

    async fn save(&self, category: &Category) -> Result<Category> {
        let sql = format!(
            r#"
            UPDATE categories
            SET parent_id = $2, name = $3, description = $4, slug = $5, image_url = $6,
                meta_title = $7, meta_description = $8, display_order = $9, is_active = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        let saved = sqlx::query_as::<_, Category>(&sql)
            .bind(category.id)
            .bind(category.parent_id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.slug)
            .bind(&category.image_url)
            .bind(&category.meta_title)
            .bind(&category.meta_description)
            .bind(category.display_order)
            .bind(category.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to update category", e))?;

        saved.ok_or_else(|| AppError::NotFound(format!("Category {} not found", category.id)))
    }

    async fn save_all(&self, categories: &[Category]) -> Result<()> {
        // Dropping the transaction without commit rolls every row back
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::from_store("Failed to begin category batch", e))?;

        for category in categories {
            let result = sqlx::query(
                r#"
                UPDATE categories
                SET parent_id = $2, name = $3, description = $4, slug = $5, image_url = $6,
                    meta_title = $7, meta_description = $8, display_order = $9, is_active = $10,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(category.id)
            .bind(category.parent_id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(&category.slug)
            .bind(&category.image_url)
            .bind(&category.meta_title)
            .bind(&category.meta_description)
            .bind(category.display_order)
            .bind(category.is_active)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_store("Failed to update category in batch", e))?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!(
                    "Category {} not found",
                    category.id
                )));
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::from_store("Failed to commit category batch", e))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to delete category", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_store("Failed to count categories", e))
    }
}
