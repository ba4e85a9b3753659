//! Sparse order-key allocation.
//!
//! Sibling order is persisted as sparse integer keys so that a reorder
//! usually writes a single record instead of re-indexing the whole list.
//! Keys start `ORDER_KEY_BASE` apart; an insert between two siblings takes
//! the midpoint. Only when two adjacent keys have no integer room left does
//! the allocator fall back to renumbering — and then only the insertion
//! point and the siblings *after* it. The trailing-only rewrite is the
//! scheme's historical behavior and is kept: renumbering earlier siblings
//! would rewrite persisted keys that existing data depends on.
//!
//! | Insert position | Keys written |
//! |-----------------|--------------|
//! | empty list      | 1 (`BASE`) |
//! | head, room below the first key | 1 (half of it) |
//! | head, no room   | 1 + all siblings |
//! | tail            | 1 (last key + `BASE`) |
//! | middle, room    | 1 (midpoint) |
//! | middle, no room | 1 + trailing siblings |

use inkcard_tree::{NodeId, ORDER_KEY_BASE, OrderKey};

/// One sibling in target display order, identified with its current key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingKey {
    pub id: NodeId,
    pub order_key: OrderKey,
}

impl SiblingKey {
    pub fn new(id: impl Into<NodeId>, order_key: OrderKey) -> Self {
        Self {
            id: id.into(),
            order_key,
        }
    }
}

/// The set of key writes produced by one reorder, in display order with the
/// moved item first. Handed to the persistence adapter and discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct OrderKeyPlan {
    entries: Vec<PlanEntry>,
}

/// A single `id → new key` assignment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub id: NodeId,
    pub order_key: OrderKey,
}

impl OrderKeyPlan {
    fn push(&mut self, id: NodeId, order_key: OrderKey) {
        self.entries.push(PlanEntry { id, order_key });
    }

    /// The new key for `id`, if the plan touches it.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<OrderKey> {
        self.entries
            .iter()
            .find(|entry| entry.id == *id)
            .map(|entry| entry.order_key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in display order (moved item first).
    #[must_use]
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter()
    }
}

/// Compute the key writes that place `moved` at `insert_index` among
/// `siblings` (the target sibling list in display order, *excluding* the
/// moved node, with strictly increasing keys).
///
/// Postconditions: applying the plan makes the full sibling sequence
/// strictly increasing, and the plan is minimal — one entry unless a
/// rebalance was forced, then one entry per trailing sibling on top.
///
/// Total for every input: the rebalance path is unconditional reassignment
/// with a fixed gap and cannot run out of room. An `insert_index` past the
/// end is treated as an append.
#[must_use]
pub fn allocate_order_keys(
    siblings: &[SiblingKey],
    moved: &NodeId,
    insert_index: usize,
) -> OrderKeyPlan {
    let insert_index = insert_index.min(siblings.len());
    let mut plan = OrderKeyPlan::default();

    if siblings.is_empty() {
        plan.push(moved.clone(), ORDER_KEY_BASE);
        return plan;
    }

    if insert_index == 0 {
        let next = &siblings[0];
        if next.order_key > 1 {
            // Room below the first key: take half of it.
            plan.push(moved.clone(), next.order_key.div_euclid(2));
        } else {
            rebalance_from(&mut plan, moved, ORDER_KEY_BASE, &siblings[insert_index..]);
        }
        return plan;
    }

    let prev = &siblings[insert_index - 1];
    if insert_index == siblings.len() {
        plan.push(moved.clone(), prev.order_key + ORDER_KEY_BASE);
        return plan;
    }

    let next = &siblings[insert_index];
    let midpoint = (prev.order_key + next.order_key).div_euclid(2);
    if midpoint > prev.order_key {
        plan.push(moved.clone(), midpoint);
    } else {
        // Adjacent keys: no integer between them.
        rebalance_from(
            &mut plan,
            moved,
            midpoint + ORDER_KEY_BASE,
            &siblings[insert_index..],
        );
    }
    plan
}

/// Assign `start` to the moved node and successive `BASE`-spaced keys to the
/// trailing siblings.
fn rebalance_from(
    plan: &mut OrderKeyPlan,
    moved: &NodeId,
    start: OrderKey,
    trailing: &[SiblingKey],
) {
    let mut key = start;
    plan.push(moved.clone(), key);
    for sibling in trailing {
        key += ORDER_KEY_BASE;
        plan.push(sibling.id.clone(), key);
    }
}
