//! Tree construction from flat store records, plus derived queries.
//!
//! Records arrive in store order. Siblings are sorted by order key; ties keep
//! record order (stable sort), matching how the store breaks ties until the
//! next reorder rewrites the keys. A record whose parent id does not exist in
//! the set is attached at the root — dangling references occur transiently
//! while a move is being persisted and must not drop nodes.

use std::collections::{HashMap, HashSet};

use crate::node::{ItemRecord, NodeId, TreeItem};

/// Build a nested forest from a flat record set.
///
/// Pure; the input is unmodified. Roots and every sibling list come out
/// sorted by `(order_key, record order)`.
#[must_use]
pub fn build_tree(records: &[ItemRecord]) -> Vec<TreeItem> {
    let known: HashSet<&NodeId> = records.iter().map(|r| &r.id).collect();

    // Group record indices by effective parent, preserving record order.
    let mut children_of: HashMap<&NodeId, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();
    for (ix, record) in records.iter().enumerate() {
        match &record.parent {
            Some(parent) if known.contains(parent) => {
                children_of.entry(parent).or_default().push(ix);
            }
            _ => roots.push(ix),
        }
    }

    build_level(records, &roots, &children_of)
}

fn build_level(
    records: &[ItemRecord],
    level: &[usize],
    children_of: &HashMap<&NodeId, Vec<usize>>,
) -> Vec<TreeItem> {
    let mut items: Vec<TreeItem> = level
        .iter()
        .map(|&ix| {
            let record = &records[ix];
            let children = children_of
                .get(&record.id)
                .map(|child_ixs| build_level(records, child_ixs, children_of))
                .unwrap_or_default();
            TreeItem {
                id: record.id.clone(),
                parent: record.parent.clone(),
                order_key: record.order_key,
                children,
            }
        })
        .collect();
    items.sort_by_key(|item| item.order_key);
    items
}

/// Depth-first search for a node anywhere in the forest.
#[must_use]
pub fn find_item<'a>(items: &'a [TreeItem], id: &NodeId) -> Option<&'a TreeItem> {
    for item in items {
        if item.id == *id {
            return Some(item);
        }
        if let Some(found) = find_item(&item.children, id) {
            return Some(found);
        }
    }
    None
}

/// Number of descendants of `id` (the node itself not counted).
///
/// Drives the "N items" badge on the drag overlay.
#[must_use]
pub fn subtree_size(items: &[TreeItem], id: &NodeId) -> usize {
    find_item(items, id).map_or(0, |item| count_nodes(&item.children))
}

fn count_nodes(items: &[TreeItem]) -> usize {
    items
        .iter()
        .map(|item| 1 + count_nodes(&item.children))
        .sum()
}

/// The ids that must be expanded so that `id` is revealed: the ancestor
/// chain from the root down, plus `id` itself when it has children of its
/// own. `None` when `id` is not in the forest.
#[must_use]
pub fn expansion_path(items: &[TreeItem], id: &NodeId) -> Option<Vec<NodeId>> {
    let mut path = Vec::new();
    if walk_path(items, id, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn walk_path(items: &[TreeItem], id: &NodeId, path: &mut Vec<NodeId>) -> bool {
    for item in items {
        let has_children = !item.children.is_empty();
        if has_children {
            path.push(item.id.clone());
        }
        if item.id == *id {
            return true;
        }
        if has_children {
            if walk_path(&item.children, id, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}
