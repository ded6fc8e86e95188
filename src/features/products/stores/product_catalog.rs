use async_trait::async_trait;

use crate::core::error::Result;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Whether any product is assigned directly to this category
    async fn has_products(&self, category_id: i64) -> Result<bool>;
}
