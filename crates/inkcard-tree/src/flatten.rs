//! Pre-order flattening of the forest into the display list.
//!
//! The drag layer never walks the nested tree directly; it works on the flat,
//! depth-annotated sequence produced here. Flattening runs on every pointer
//! move during a drag, so it is a single pass over the visible nodes with one
//! output allocation and no intermediate collections.

use std::collections::HashSet;

use crate::node::{NodeId, OrderKey, TreeItem};

/// One visible node in display (pre-order) order.
///
/// Ephemeral: rebuilt on every flatten, never persisted. `parent` is derived
/// from the traversal (not from the stored reference), so it is always
/// resolvable within the same list. `child_ids` keeps the per-parent child
/// list reconstructible without back-references into the nested tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatItem {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Number of ancestors; roots are 0.
    pub depth: usize,
    pub order_key: OrderKey,
    /// Direct children in display order (including currently hidden ones).
    pub child_ids: Vec<NodeId>,
}

/// Flatten the forest, honoring collapse state and exclusions.
///
/// - A node in `excluded` is skipped together with its entire subtree (used
///   for the node being dragged).
/// - A node in `collapsed` is emitted but its children are not traversed
///   (subtree hidden, not deleted).
///
/// Pure and idempotent: the same inputs always produce the same list.
#[must_use]
pub fn flatten(
    roots: &[TreeItem],
    collapsed: &HashSet<NodeId>,
    excluded: &HashSet<NodeId>,
) -> Vec<FlatItem> {
    let mut out = Vec::new();
    walk(roots, 0, None, collapsed, excluded, &mut out);
    out
}

/// Flatten every node regardless of collapse state.
///
/// This is the sequence subtree relocation operates on: hidden descendants
/// must move with their parent.
#[must_use]
pub fn flatten_tree(roots: &[TreeItem]) -> Vec<FlatItem> {
    let empty = HashSet::new();
    flatten(roots, &empty, &empty)
}

fn walk(
    items: &[TreeItem],
    depth: usize,
    parent: Option<&NodeId>,
    collapsed: &HashSet<NodeId>,
    excluded: &HashSet<NodeId>,
    out: &mut Vec<FlatItem>,
) {
    for item in items {
        if excluded.contains(&item.id) {
            continue;
        }
        out.push(FlatItem {
            id: item.id.clone(),
            parent: parent.cloned(),
            depth,
            order_key: item.order_key,
            child_ids: item.children.iter().map(|c| c.id.clone()).collect(),
        });
        if !collapsed.contains(&item.id) {
            walk(&item.children, depth + 1, Some(&item.id), collapsed, excluded, out);
        }
    }
}
