use std::collections::{HashMap, HashSet};

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::CategoryNode;
use crate::features::categories::models::Category;

/// Builds category forests from one flat load of records
pub struct TreeAssembler;

impl TreeAssembler {
    /// Assemble a forest from a flat list of categories.
    ///
    /// Every record ends up exactly once in the result, either as a root or
    /// under its parent. Repeated ids are attached once (first occurrence
    /// wins). Fails with `AppError::Consistency` when a record references a
    /// parent that is not in the input, or when records are unreachable from
    /// any root because their parent links form a cycle.
    ///
    /// Roots and each node's children are ordered by display order, then name.
    pub fn build_forest(categories: Vec<Category>) -> Result<Vec<CategoryNode>> {
        let mut by_id: HashMap<i64, Category> = HashMap::with_capacity(categories.len());
        let mut order: Vec<i64> = Vec::with_capacity(categories.len());
        for category in categories {
            if by_id.contains_key(&category.id) {
                continue;
            }
            order.push(category.id);
            by_id.insert(category.id, category);
        }

        let mut roots: Vec<i64> = Vec::new();
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut attached: HashSet<i64> = HashSet::new();
        let mut orphans: Vec<(i64, i64)> = Vec::new();

        for id in &order {
            let category = &by_id[id];
            match category.parent_id {
                None => roots.push(*id),
                Some(parent_id) if by_id.contains_key(&parent_id) => {
                    if attached.insert(*id) {
                        children.entry(parent_id).or_default().push(*id);
                    }
                }
                Some(parent_id) => orphans.push((*id, parent_id)),
            }
        }

        if !orphans.is_empty() {
            let detail = orphans
                .iter()
                .map(|(id, parent_id)| format!("{} -> {}", id, parent_id))
                .collect::<Vec<_>>()
                .join(", ");
            tracing::error!("Orphaned categories found during tree assembly: {}", detail);
            return Err(AppError::Consistency(format!(
                "Categories reference missing parents: {}",
                detail
            )));
        }

        // Top-down visit order; parents always precede their children
        let mut visit_order: Vec<i64> = Vec::with_capacity(order.len());
        let mut queue: Vec<i64> = roots.clone();
        while let Some(id) = queue.pop() {
            visit_order.push(id);
            if let Some(child_ids) = children.get(&id) {
                queue.extend(child_ids.iter().copied());
            }
        }

        if visit_order.len() != by_id.len() {
            let reached: HashSet<i64> = visit_order.iter().copied().collect();
            let mut unreachable: Vec<i64> = by_id
                .keys()
                .copied()
                .filter(|id| !reached.contains(id))
                .collect();
            unreachable.sort_unstable();
            tracing::error!(
                "Categories unreachable from any root (parent cycle): {:?}",
                unreachable
            );
            return Err(AppError::Consistency(format!(
                "Categories form a parent cycle: {:?}",
                unreachable
            )));
        }

        // Build bottom-up so each node is complete before its parent takes it
        let mut built: HashMap<i64, CategoryNode> = HashMap::with_capacity(visit_order.len());
        for id in visit_order.iter().rev() {
            let mut node = CategoryNode::new(by_id.remove(id).ok_or_else(|| {
                AppError::Internal(format!("Category {} visited twice", id))
            })?);

            if let Some(child_ids) = children.get(id) {
                for child_id in child_ids {
                    if let Some(child) = built.remove(child_id) {
                        node.children.push(child);
                    }
                }
                Self::sort_nodes(&mut node.children);
            }

            built.insert(*id, node);
        }

        let mut forest: Vec<CategoryNode> = roots
            .iter()
            .filter_map(|id| built.remove(id))
            .collect();
        Self::sort_nodes(&mut forest);

        Ok(forest)
    }

    /// Drop inactive nodes together with everything below them
    pub fn prune_inactive(forest: Vec<CategoryNode>) -> Vec<CategoryNode> {
        forest
            .into_iter()
            .filter(|node| node.category.is_active)
            .map(|mut node| {
                {
                    let mut stack: Vec<&mut CategoryNode> = vec![&mut node];
                    while let Some(current) = stack.pop() {
                        current.children.retain(|child| child.category.is_active);
                        stack.extend(current.children.iter_mut());
                    }
                }
                node
            })
            .collect()
    }

    fn sort_nodes(nodes: &mut [CategoryNode]) {
        nodes.sort_by(|a, b| {
            a.category
                .display_order
                .cmp(&b.category.display_order)
                .then_with(|| a.category.name.cmp(&b.category.name))
                .then_with(|| a.category.id.cmp(&b.category.id))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::services::test_support::category;
    use tokio_test::{assert_err, assert_ok};

    fn collect_ids(forest: &[CategoryNode]) -> Vec<i64> {
        let mut ids = Vec::new();
        let mut stack: Vec<&CategoryNode> = forest.iter().collect();
        while let Some(node) = stack.pop() {
            ids.push(node.id());
            stack.extend(node.children.iter());
        }
        ids.sort_unstable();
        ids
    }

    fn assert_parent_links(forest: &[CategoryNode]) {
        for root in forest {
            assert!(root.category.parent_id.is_none());
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                for child in &node.children {
                    assert_eq!(child.category.parent_id, Some(node.id()));
                    stack.push(child);
                }
            }
        }
    }

    #[test]
    fn test_build_forest_contains_every_record_once() {
        let records = vec![
            category(1, None),
            category(2, Some(1)),
            category(3, Some(2)),
            category(4, Some(1)),
            category(5, None),
            category(6, Some(5)),
        ];

        let forest = assert_ok!(TreeAssembler::build_forest(records));

        assert_eq!(forest.len(), 2);
        assert_eq!(collect_ids(&forest), vec![1, 2, 3, 4, 5, 6]);
        assert_parent_links(&forest);

        let root = forest.iter().find(|n| n.id() == 1).unwrap();
        assert_eq!(root.size(), 4);
        assert_eq!(root.depth(), 3);
    }

    #[test]
    fn test_build_forest_accepts_children_before_parents() {
        let records = vec![category(3, Some(2)), category(2, Some(1)), category(1, None)];

        let forest = assert_ok!(TreeAssembler::build_forest(records));

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].depth(), 3);
    }

    #[test]
    fn test_build_forest_attaches_duplicates_once() {
        let records = vec![
            category(1, None),
            category(2, Some(1)),
            category(2, Some(1)),
            category(1, None),
        ];

        let forest = assert_ok!(TreeAssembler::build_forest(records));

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(collect_ids(&forest), vec![1, 2]);
    }

    #[test]
    fn test_orphan_is_consistency_error_not_root() {
        let records = vec![category(1, None), category(2, Some(77))];

        let err = assert_err!(TreeAssembler::build_forest(records));
        assert!(matches!(err, AppError::Consistency(ref msg) if msg.contains("2 -> 77")));
    }

    #[test]
    fn test_parent_cycle_is_consistency_error() {
        let records = vec![category(1, None), category(2, Some(3)), category(3, Some(2))];

        let err = assert_err!(TreeAssembler::build_forest(records));
        assert!(matches!(err, AppError::Consistency(_)));
    }

    #[test]
    fn test_children_sorted_by_display_order() {
        let mut first = category(3, Some(1));
        first.display_order = 1;
        let mut second = category(2, Some(1));
        second.display_order = 2;

        let forest = assert_ok!(TreeAssembler::build_forest(vec![
            category(1, None),
            second,
            first,
        ]));

        let child_ids: Vec<i64> = forest[0].children.iter().map(|c| c.id()).collect();
        assert_eq!(child_ids, vec![3, 2]);
    }

    #[test]
    fn test_empty_input_yields_empty_forest() {
        let forest = assert_ok!(TreeAssembler::build_forest(Vec::new()));
        assert!(forest.is_empty());
    }

    #[test]
    fn test_prune_inactive_hides_whole_subtree() {
        let mut inactive = category(2, Some(1));
        inactive.is_active = false;
        let mut inactive_root = category(5, None);
        inactive_root.is_active = false;

        let forest = assert_ok!(TreeAssembler::build_forest(vec![
            category(1, None),
            inactive,
            category(3, Some(2)),
            category(4, Some(1)),
            inactive_root,
        ]));

        let pruned = TreeAssembler::prune_inactive(forest);
        assert_eq!(collect_ids(&pruned), vec![1, 4]);
    }

    #[test]
    fn test_tree_serializes_with_flattened_fields() {
        let forest = assert_ok!(TreeAssembler::build_forest(vec![
            category(1, None),
            category(2, Some(1)),
        ]));

        let value = serde_json::to_value(&forest[0]).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["children"][0]["id"], 2);
        assert_eq!(value["children"][0]["parent_id"], 1);
    }
}
