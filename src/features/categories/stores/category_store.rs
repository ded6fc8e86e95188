use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::categories::models::{Category, NewCategory};

/// Flat persistence access for categories.
///
/// Parent/child relationships are plain id references; nothing here
/// assembles trees or checks hierarchy invariants. Listing methods return
/// rows ordered by `display_order`, then `name`.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Point lookup; `None` when no category has this id
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Direct children of one parent
    async fn get_children(&self, parent_id: i64) -> Result<Vec<Category>>;

    /// Direct children of every id in `parent_ids`, in one round-trip
    async fn get_children_of(&self, parent_ids: &[i64]) -> Result<Vec<Category>>;

    async fn get_all_flat(&self, active_only: bool) -> Result<Vec<Category>>;

    /// Insert a new category; the store assigns the id
    async fn insert(&self, category: &NewCategory) -> Result<Category>;

    /// Update an existing category, keyed by id
    async fn save(&self, category: &Category) -> Result<Category>;

    /// Update many categories as one unit: either every row is written or none is
    async fn save_all(&self, categories: &[Category]) -> Result<()>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}
