use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::error::Result;
use crate::features::products::stores::ProductCatalog;

/// Product counts per category, held in memory
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    counts: RwLock<HashMap<i64, usize>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_product(&self, category_id: i64) {
        let mut counts = self.counts.write().await;
        *counts.entry(category_id).or_insert(0) += 1;
    }

    pub async fn clear(&self, category_id: i64) {
        self.counts.write().await.remove(&category_id);
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn has_products(&self, category_id: i64) -> Result<bool> {
        let counts = self.counts.read().await;
        Ok(counts.get(&category_id).copied().unwrap_or(0) > 0)
    }
}
