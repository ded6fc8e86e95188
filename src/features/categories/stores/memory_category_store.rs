use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, NewCategory};
use crate::features::categories::stores::CategoryStore;

#[derive(Debug, Default)]
struct MemoryState {
    rows: BTreeMap<i64, Category>,
    next_id: i64,
}

/// In-memory category store keyed by id.
///
/// Holds rows exactly as given, so it can also be seeded with inconsistent
/// data (dangling parents, cycles) through [`InMemoryCategoryStore::with_rows`].
#[derive(Debug, Default)]
pub struct InMemoryCategoryStore {
    state: RwLock<MemoryState>,
}

fn sort_siblings(rows: &mut [Category]) {
    rows.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with rows as-is; ids are taken from the rows
    pub fn with_rows(rows: Vec<Category>) -> Self {
        let next_id = rows.iter().map(|c| c.id).max().unwrap_or(0);
        let rows = rows.into_iter().map(|c| (c.id, c)).collect();
        Self {
            state: RwLock::new(MemoryState { rows, next_id }),
        }
    }

    fn collect_sorted<'a>(rows: impl Iterator<Item = &'a Category>) -> Vec<Category> {
        let mut result: Vec<Category> = rows.cloned().collect();
        sort_siblings(&mut result);
        result
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let state = self.state.read().await;
        Ok(state.rows.get(&id).cloned())
    }

    async fn get_children(&self, parent_id: i64) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        Ok(Self::collect_sorted(
            state
                .rows
                .values()
                .filter(|c| c.parent_id == Some(parent_id)),
        ))
    }

    async fn get_children_of(&self, parent_ids: &[i64]) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        Ok(Self::collect_sorted(state.rows.values().filter(|c| {
            c.parent_id
                .map(|parent| parent_ids.contains(&parent))
                .unwrap_or(false)
        })))
    }

    async fn get_all_flat(&self, active_only: bool) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        Ok(Self::collect_sorted(
            state.rows.values().filter(|c| !active_only || c.is_active),
        ))
    }

    async fn insert(&self, category: &NewCategory) -> Result<Category> {
        let mut state = self.state.write().await;

        if state.rows.values().any(|c| c.slug == category.slug) {
            return Err(AppError::Conflict(format!(
                "Category slug '{}' already exists",
                category.slug
            )));
        }

        state.next_id += 1;
        let now = Utc::now();
        let created = Category {
            id: state.next_id,
            parent_id: category.parent_id,
            name: category.name.clone(),
            description: category.description.clone(),
            slug: category.slug.clone(),
            image_url: category.image_url.clone(),
            meta_title: category.meta_title.clone(),
            meta_description: category.meta_description.clone(),
            display_order: category.display_order,
            is_active: category.is_active,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(created.id, created.clone());

        Ok(created)
    }

    async fn save(&self, category: &Category) -> Result<Category> {
        let mut state = self.state.write().await;

        if state
            .rows
            .values()
            .any(|c| c.id != category.id && c.slug == category.slug)
        {
            return Err(AppError::Conflict(format!(
                "Category slug '{}' already exists",
                category.slug
            )));
        }

        let row = state
            .rows
            .get_mut(&category.id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category.id)))?;

        let mut updated = category.clone();
        updated.created_at = row.created_at;
        updated.updated_at = Utc::now();
        *row = updated.clone();

        Ok(updated)
    }

    async fn save_all(&self, categories: &[Category]) -> Result<()> {
        let mut state = self.state.write().await;

        // Validate the whole batch before touching any row
        if let Some(missing) = categories.iter().find(|c| !state.rows.contains_key(&c.id)) {
            return Err(AppError::NotFound(format!(
                "Category {} not found",
                missing.id
            )));
        }

        let now = Utc::now();
        for category in categories {
            if let Some(row) = state.rows.get_mut(&category.id) {
                let created_at = row.created_at;
                *row = category.clone();
                row.created_at = created_at;
                row.updated_at = now;
            }
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    async fn count(&self) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.rows.len() as i64)
    }
}
