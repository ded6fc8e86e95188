use std::collections::HashSet;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::features::categories::stores::CategoryStore;

/// Read-only relationship queries over the parent-link graph.
///
/// Every walk is iterative, keeps a visited set and is capped at the smaller
/// of `max_walk_steps` and the stored category count, so corrupted data
/// ends in `AppError::Consistency` instead of looping. Lookups go straight
/// to the store; nothing is cached.
#[derive(Clone)]
pub struct AncestryOracle {
    store: Arc<dyn CategoryStore>,
    max_walk_steps: usize,
}

impl AncestryOracle {
    pub fn new(store: Arc<dyn CategoryStore>, max_walk_steps: usize) -> Self {
        Self {
            store,
            max_walk_steps,
        }
    }

    async fn require(&self, id: i64) -> Result<Category> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// Resolve the parent of `node` during an upward walk.
    ///
    /// A parent id pointing at nothing is an orphan, which is a data problem
    /// rather than a caller mistake.
    async fn parent_of(&self, node: &Category) -> Result<Option<Category>> {
        let Some(parent_id) = node.parent_id else {
            return Ok(None);
        };

        match self.store.get_by_id(parent_id).await? {
            Some(parent) => Ok(Some(parent)),
            None => {
                tracing::error!(
                    "Category {} references missing parent {}",
                    node.id,
                    parent_id
                );
                Err(AppError::Consistency(format!(
                    "Category {} references missing parent {}",
                    node.id, parent_id
                )))
            }
        }
    }

    /// Walk from `start` to its root, calling `visit` on every ancestor
    /// (nearest first). Stops early when `visit` returns true.
    async fn walk_up<F>(&self, start: &Category, mut visit: F) -> Result<bool>
    where
        F: FnMut(&Category) -> bool + Send,
    {
        // A chain can never be longer than the number of stored categories
        let stored = usize::try_from(self.store.count().await?).unwrap_or(0);
        let bound = self.max_walk_steps.min(stored);

        let mut visited = HashSet::from([start.id]);
        let mut current = start.clone();
        let mut steps = 0usize;

        while let Some(parent) = self.parent_of(&current).await? {
            steps += 1;
            if steps > bound {
                tracing::error!(
                    "Ancestry walk from category {} exceeded {} steps",
                    start.id,
                    bound
                );
                return Err(AppError::Consistency(format!(
                    "Ancestry walk from category {} exceeded {} steps",
                    start.id, bound
                )));
            }
            if !visited.insert(parent.id) {
                tracing::error!(
                    "Cycle detected in stored hierarchy at category {} (walk from {})",
                    parent.id,
                    start.id
                );
                return Err(AppError::Consistency(format!(
                    "Cycle detected in stored hierarchy at category {}",
                    parent.id
                )));
            }
            if visit(&parent) {
                return Ok(true);
            }
            current = parent;
        }

        Ok(false)
    }

    /// True when `ancestor_id` appears on the parent chain of `descendant_id`.
    /// A category is never its own ancestor.
    pub async fn is_ancestor(&self, ancestor_id: i64, descendant_id: i64) -> Result<bool> {
        let descendant = self.require(descendant_id).await?;
        if ancestor_id == descendant_id {
            return Ok(false);
        }

        self.walk_up(&descendant, |node| node.id == ancestor_id).await
    }

    /// True when making `child_id` a child of `parent_id` would close a loop.
    ///
    /// Must be checked before any parent change.
    pub async fn would_create_cycle(&self, parent_id: i64, child_id: i64) -> Result<bool> {
        if parent_id == child_id {
            return Ok(true);
        }

        self.is_ancestor(child_id, parent_id).await
    }

    /// Categories from the root down to `node_id`, inclusive.
    pub async fn get_path(&self, node_id: i64) -> Result<Vec<Category>> {
        let node = self.require(node_id).await?;

        let mut path = Vec::new();
        self.walk_up(&node, |ancestor| {
            path.push(ancestor.clone());
            false
        })
        .await?;

        path.reverse();
        path.push(node);
        Ok(path)
    }

    /// Every transitive child of `node_id`, without duplicates and without
    /// the node itself. Order is unspecified.
    ///
    /// Expands one level per store call.
    pub async fn get_descendants(&self, node_id: i64) -> Result<Vec<Category>> {
        self.require(node_id).await?;

        let mut seen = HashSet::from([node_id]);
        let mut descendants = Vec::new();
        let mut frontier = vec![node_id];

        while !frontier.is_empty() {
            let children = self.store.get_children_of(&frontier).await?;
            frontier = Vec::with_capacity(children.len());

            for child in children {
                if !seen.insert(child.id) {
                    tracing::warn!(
                        "Skipping already visited category {} while expanding descendants of {}",
                        child.id,
                        node_id
                    );
                    continue;
                }
                frontier.push(child.id);
                descendants.push(child);
            }
        }

        Ok(descendants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::services::test_support::{category, sample_store};
    use crate::features::categories::stores::InMemoryCategoryStore;
    use tokio_test::{assert_err, assert_ok};

    fn oracle(store: InMemoryCategoryStore) -> AncestryOracle {
        AncestryOracle::new(Arc::new(store), 100)
    }

    fn ids(categories: &[Category]) -> Vec<i64> {
        let mut ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_node_is_not_its_own_ancestor() {
        let oracle = oracle(sample_store());
        for id in 1..=4 {
            assert!(!assert_ok!(oracle.is_ancestor(id, id).await));
        }
    }

    #[tokio::test]
    async fn test_is_ancestor_follows_parent_chain() {
        let oracle = oracle(sample_store());

        assert!(assert_ok!(oracle.is_ancestor(1, 3).await));
        assert!(assert_ok!(oracle.is_ancestor(2, 3).await));
        assert!(!assert_ok!(oracle.is_ancestor(3, 1).await));
        assert!(!assert_ok!(oracle.is_ancestor(4, 3).await));
    }

    #[tokio::test]
    async fn test_self_parenting_always_creates_cycle() {
        let oracle = oracle(sample_store());
        for id in 1..=4 {
            assert!(assert_ok!(oracle.would_create_cycle(id, id).await));
        }
    }

    #[tokio::test]
    async fn test_cycle_detection_on_chain() {
        // 1 -> 2 -> 3
        let oracle = oracle(sample_store());

        assert!(assert_ok!(oracle.would_create_cycle(3, 1).await));
        assert!(!assert_ok!(oracle.would_create_cycle(1, 3).await));
        assert!(!assert_ok!(oracle.would_create_cycle(3, 4).await));
    }

    #[tokio::test]
    async fn test_get_path_reads_root_first() {
        let oracle = oracle(sample_store());

        let path = assert_ok!(oracle.get_path(3).await);
        let path_ids: Vec<i64> = path.iter().map(|c| c.id).collect();
        assert_eq!(path_ids, vec![1, 2, 3]);

        let root_path = assert_ok!(oracle.get_path(1).await);
        assert_eq!(root_path.len(), 1);
    }

    #[tokio::test]
    async fn test_get_path_missing_node_is_not_found() {
        let oracle = oracle(sample_store());
        let err = assert_err!(oracle.get_path(99).await);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_descendants() {
        let oracle = oracle(sample_store());

        assert_eq!(ids(&assert_ok!(oracle.get_descendants(1).await)), vec![2, 3, 4]);
        assert_eq!(ids(&assert_ok!(oracle.get_descendants(2).await)), vec![3]);
        assert!(assert_ok!(oracle.get_descendants(3).await).is_empty());
    }

    #[tokio::test]
    async fn test_get_descendants_terminates_on_stored_cycle() {
        // 1 -> 2 -> 3 -> 1
        let store = InMemoryCategoryStore::with_rows(vec![
            category(1, Some(3)),
            category(2, Some(1)),
            category(3, Some(2)),
        ]);
        let oracle = oracle(store);

        let descendants = assert_ok!(oracle.get_descendants(1).await);
        assert_eq!(ids(&descendants), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_stored_cycle_fails_upward_walk_with_consistency_error() {
        let store = InMemoryCategoryStore::with_rows(vec![
            category(1, Some(3)),
            category(2, Some(1)),
            category(3, Some(2)),
            category(4, None),
        ]);
        let oracle = oracle(store);

        let err = assert_err!(oracle.is_ancestor(4, 1).await);
        assert!(matches!(err, AppError::Consistency(_)));

        let err = assert_err!(oracle.get_path(2).await);
        assert!(matches!(err, AppError::Consistency(_)));
    }

    #[tokio::test]
    async fn test_walk_longer_than_bound_is_consistency_error() {
        // Chain of 6 categories, bound of 3 steps
        let rows = (1..=6)
            .map(|id| category(id, if id == 1 { None } else { Some(id - 1) }))
            .collect();
        let oracle = AncestryOracle::new(Arc::new(InMemoryCategoryStore::with_rows(rows)), 3);

        assert!(assert_ok!(oracle.is_ancestor(3, 4).await));
        let err = assert_err!(oracle.get_path(6).await);
        assert!(matches!(err, AppError::Consistency(_)));
    }

    #[tokio::test]
    async fn test_dangling_parent_is_consistency_error() {
        let store = InMemoryCategoryStore::with_rows(vec![category(1, None), category(2, Some(50))]);
        let oracle = oracle(store);

        let err = assert_err!(oracle.get_path(2).await);
        assert!(matches!(err, AppError::Consistency(_)));
    }
}
