use std::sync::Arc;

use tokio::sync::Mutex;
use validator::Validate;

use crate::core::config::HierarchyConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    AuditReport, CategoryNode, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::services::{AncestryOracle, TreeAssembler};
use crate::features::categories::stores::CategoryStore;
use crate::features::products::ProductCatalog;

/// Service for category hierarchy operations.
///
/// The only writer of the hierarchy. Mutations are serialized behind one
/// lock and validate against fresh store data before issuing their single
/// write; reads never take the lock.
pub struct HierarchyService {
    store: Arc<dyn CategoryStore>,
    products: Arc<dyn ProductCatalog>,
    oracle: AncestryOracle,
    write_lock: Mutex<()>,
}

impl HierarchyService {
    pub fn new(
        store: Arc<dyn CategoryStore>,
        products: Arc<dyn ProductCatalog>,
        config: &HierarchyConfig,
    ) -> Self {
        let oracle = AncestryOracle::new(Arc::clone(&store), config.max_walk_steps);
        Self {
            store,
            products,
            oracle,
            write_lock: Mutex::new(()),
        }
    }

    async fn require(&self, id: i64) -> Result<Category> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    async fn require_parent(&self, parent_id: i64) -> Result<Category> {
        self.store
            .get_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Parent category {} not found", parent_id)))
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub async fn get_by_id(&self, id: i64) -> Result<Category> {
        self.require(id).await
    }

    /// Direct children of a category
    pub async fn get_children(&self, id: i64) -> Result<Vec<Category>> {
        self.require(id).await?;
        self.store.get_children(id).await
    }

    /// All categories as a flat list
    pub async fn list_flat(&self, active_only: bool) -> Result<Vec<Category>> {
        self.store.get_all_flat(active_only).await
    }

    /// Full category forest.
    ///
    /// With `active_only`, inactive categories are hidden along with their
    /// whole subtree.
    pub async fn get_category_tree(&self, active_only: bool) -> Result<Vec<CategoryNode>> {
        let categories = self.store.get_all_flat(false).await?;
        let forest = TreeAssembler::build_forest(categories)?;

        if active_only {
            Ok(TreeAssembler::prune_inactive(forest))
        } else {
            Ok(forest)
        }
    }

    pub async fn get_path(&self, id: i64) -> Result<Vec<Category>> {
        self.oracle.get_path(id).await
    }

    pub async fn get_descendants(&self, id: i64) -> Result<Vec<Category>> {
        self.oracle.get_descendants(id).await
    }

    pub async fn is_ancestor(&self, ancestor_id: i64, descendant_id: i64) -> Result<bool> {
        self.oracle.is_ancestor(ancestor_id, descendant_id).await
    }

    pub async fn would_create_cycle(&self, parent_id: i64, child_id: i64) -> Result<bool> {
        self.oracle.would_create_cycle(parent_id, child_id).await
    }

    /// Load the whole hierarchy and verify it assembles into a forest
    #[tracing::instrument(skip(self))]
    pub async fn audit(&self) -> Result<AuditReport> {
        let categories = self.store.get_all_flat(false).await?;
        let total = categories.len();
        let forest = TreeAssembler::build_forest(categories)?;

        let report = AuditReport {
            total,
            roots: forest.len(),
            max_depth: forest.iter().map(CategoryNode::depth).max().unwrap_or(0),
        };

        tracing::info!(
            "Category hierarchy audit passed: total={}, roots={}, max_depth={}",
            report.total,
            report.roots,
            report.max_depth
        );

        Ok(report)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create a category, optionally under an existing parent.
    ///
    /// No cycle check: a category that does not exist yet cannot be anyone's
    /// ancestor.
    #[tracing::instrument(skip(self, dto), fields(slug = %dto.slug, parent_id = ?dto.parent_id))]
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<Category> {
        dto.validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        let _guard = self.write_lock.lock().await;

        if let Some(parent_id) = dto.parent_id {
            self.require_parent(parent_id).await?;
        }

        let new_category: NewCategory = dto.into();
        let created = self.store.insert(&new_category).await?;

        tracing::info!(
            "Category {} '{}' created under {:?}",
            created.id,
            created.slug,
            created.parent_id
        );

        Ok(created)
    }

    /// Update descriptive fields; placement and activation are untouched
    #[tracing::instrument(skip(self, dto))]
    pub async fn update_details(&self, id: i64, dto: UpdateCategoryDto) -> Result<Category> {
        dto.validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        let _guard = self.write_lock.lock().await;

        let mut category = self.require(id).await?;
        dto.apply_to(&mut category);
        let updated = self.store.save(&category).await?;

        tracing::info!("Category {} details updated", id);

        Ok(updated)
    }

    /// Re-parent a category; `None` makes it a root.
    ///
    /// Fails with `BusinessRule` when the new parent is the category itself
    /// or one of its descendants.
    #[tracing::instrument(skip(self))]
    pub async fn move_category(&self, id: i64, new_parent_id: Option<i64>) -> Result<Category> {
        let _guard = self.write_lock.lock().await;

        let mut category = self.require(id).await?;

        if let Some(parent_id) = new_parent_id {
            self.require_parent(parent_id).await?;

            if self.oracle.would_create_cycle(parent_id, id).await? {
                return Err(AppError::BusinessRule(format!(
                    "Cannot move category {} under {}: it would create a cycle",
                    id, parent_id
                )));
            }
        }

        if category.parent_id == new_parent_id {
            return Ok(category);
        }

        let previous_parent_id = category.parent_id;
        category.parent_id = new_parent_id;
        let moved = self.store.save(&category).await?;

        tracing::info!(
            "Category {} moved from {:?} to {:?}",
            id,
            previous_parent_id,
            new_parent_id
        );

        Ok(moved)
    }

    /// Delete a category that has no children and no products
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        self.require(id).await?;

        let (children, has_products) = futures::try_join!(
            self.store.get_children(id),
            self.products.has_products(id)
        )?;

        if !children.is_empty() {
            return Err(AppError::BusinessRule(format!(
                "Cannot delete category {}: it has {} subcategories",
                id,
                children.len()
            )));
        }

        if has_products {
            return Err(AppError::BusinessRule(format!(
                "Cannot delete category {}: it still has products",
                id
            )));
        }

        self.store.delete(id).await?;

        tracing::info!("Category {} deleted", id);

        Ok(())
    }

    /// Toggle one category without touching its descendants
    #[tracing::instrument(skip(self))]
    pub async fn set_active(&self, id: i64, is_active: bool) -> Result<Category> {
        let _guard = self.write_lock.lock().await;

        let mut category = self.require(id).await?;
        if category.is_active == is_active {
            return Ok(category);
        }

        category.is_active = is_active;
        let updated = self.store.save(&category).await?;

        tracing::info!("Category {} is_active set to {}", id, is_active);

        Ok(updated)
    }

    /// Set `is_active` on a category and every descendant in one batch.
    ///
    /// Returns the number of categories whose flag changed. The batch is
    /// written atomically, so a failure leaves every flag as it was.
    #[tracing::instrument(skip(self))]
    pub async fn cascade_set_active(&self, id: i64, is_active: bool) -> Result<usize> {
        let _guard = self.write_lock.lock().await;

        let root = self.require(id).await?;
        let descendants = self.oracle.get_descendants(id).await?;

        let batch: Vec<Category> = std::iter::once(root)
            .chain(descendants)
            .filter(|c| c.is_active != is_active)
            .map(|mut c| {
                c.is_active = is_active;
                c
            })
            .collect();

        if batch.is_empty() {
            return Ok(0);
        }

        self.store.save_all(&batch).await?;

        tracing::info!(
            "Category {} cascade set is_active={} on {} categories",
            id,
            is_active,
            batch.len()
        );

        Ok(batch.len())
    }
}
