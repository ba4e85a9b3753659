//! Drop projection: pointer offset → legal destination.
//!
//! Recomputed on every pointer move, so the hot path is two linear id scans
//! and index arithmetic — the "remove the dragged item and drop it at the
//! hovered slot" reshuffle is simulated with an index mapping instead of
//! building a shifted list.

use std::collections::HashMap;

use inkcard_tree::{FlatItem, NodeId};

/// The tentative destination computed while a drag is in progress.
///
/// `min_depth`/`max_depth` are the clamp bounds that produced `depth`; the
/// UI renders the drop indicator from them. Ephemeral — discarded when the
/// gesture ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropProjection {
    /// Nesting level the dragged node would land at.
    pub depth: usize,
    /// Parent it would land under; `None` for the root level.
    pub parent: Option<NodeId>,
    /// Shallowest level allowed at this slot.
    pub min_depth: usize,
    /// Deepest level allowed at this slot.
    pub max_depth: usize,
}

/// Compute the legal destination for `active` while hovering `over`.
///
/// `lateral_offset` is the horizontal pointer travel since drag start in the
/// same unit as `indent_width` (one indent step to the right = one level
/// deeper). The destination depth is the depth of the item ending up just
/// above the insertion slot, adjusted by the offset and clamped:
///
/// - at most one level deeper than that item (you cannot nest under
///   something that is not directly above),
/// - at least as deep as the item below (which would otherwise be adopted by
///   the moved node).
///
/// Returns `None` when either id is missing from `visible`, or when the
/// gesture is a no-op: hovering the dragged item itself with no lateral
/// travel and a destination equal to its current position.
///
/// The caller must still reject destinations inside the dragged node's own
/// subtree — see [`projection_creates_cycle`].
#[must_use]
pub fn project_drop(
    visible: &[FlatItem],
    active: &NodeId,
    over: &NodeId,
    lateral_offset: f32,
    indent_width: f32,
) -> Option<DropProjection> {
    let over_ix = visible.iter().position(|it| it.id == *over)?;
    let active_ix = visible.iter().position(|it| it.id == *active)?;
    let active_item = &visible[active_ix];

    let previous = slot_item(visible, active_ix, over_ix, over_ix as isize - 1);
    let next = slot_item(visible, active_ix, over_ix, over_ix as isize + 1);

    let depth_delta = (lateral_offset / indent_width).round() as isize;
    let raw_depth = previous.map_or(0, |it| it.depth as isize) + depth_delta;
    let max_depth = previous.map_or(0, |it| it.depth + 1);
    let min_depth = next.map_or(0, |it| it.depth);

    // Upper clamp first, lower clamp second: when a malformed list makes the
    // bounds cross, the shallow bound wins (the item below must stay a
    // sibling, not become a child).
    let mut depth = raw_depth;
    if depth > max_depth as isize {
        depth = max_depth as isize;
    }
    if depth < min_depth as isize {
        depth = min_depth as isize;
    }
    let depth = depth as usize;

    let parent = resolve_parent(visible, active_ix, over_ix, depth);

    if active == over
        && depth_delta == 0
        && depth == active_item.depth
        && parent == active_item.parent
    {
        return None;
    }

    Some(DropProjection {
        depth,
        parent,
        min_depth,
        max_depth,
    })
}

/// Walk backward from the slot above the insertion point to the nearest item
/// one level shallower; that item is the parent. Depth 0 is the root. An
/// unresolvable parent at depth > 0 degrades to the root rather than failing
/// (upstream data may be transiently inconsistent).
fn resolve_parent(
    visible: &[FlatItem],
    active_ix: usize,
    over_ix: usize,
    depth: usize,
) -> Option<NodeId> {
    if depth == 0 {
        return None;
    }
    let mut slot = over_ix as isize - 1;
    while slot >= 0 {
        if let Some(item) = slot_item(visible, active_ix, over_ix, slot) {
            if item.depth + 1 == depth {
                return Some(item.id.clone());
            }
        }
        slot -= 1;
    }
    None
}

/// Item at position `slot` of the list with the element at `active_ix` moved
/// to `over_ix`, without materializing that list. `None` out of range or at
/// `over_ix` itself (the dragged item's slot).
fn slot_item<'a>(
    flat: &'a [FlatItem],
    active_ix: usize,
    over_ix: usize,
    slot: isize,
) -> Option<&'a FlatItem> {
    if slot < 0 {
        return None;
    }
    let slot = slot as usize;
    if slot == over_ix {
        return flat.get(active_ix);
    }
    let source = if active_ix < over_ix {
        // Items between the two shift one step toward the front.
        if slot >= active_ix && slot < over_ix {
            slot + 1
        } else {
            slot
        }
    } else {
        // Items between the two shift one step toward the back.
        if slot > over_ix && slot <= active_ix {
            slot - 1
        } else {
            slot
        }
    };
    flat.get(source)
}

/// Whether `node` sits anywhere below `ancestor`, following `parent` links.
///
/// The walk is index-based (no references between items) and bounded by the
/// list length so a corrupt parent chain cannot loop forever.
#[must_use]
pub fn is_descendant(flat: &[FlatItem], ancestor: &NodeId, node: &NodeId) -> bool {
    let by_id: HashMap<&NodeId, &FlatItem> = flat.iter().map(|it| (&it.id, it)).collect();
    let mut current = by_id.get(node).and_then(|it| it.parent.as_ref());
    let mut steps = 0;
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        steps += 1;
        if steps > flat.len() {
            return false;
        }
        current = by_id.get(parent).and_then(|it| it.parent.as_ref());
    }
    false
}

/// Whether applying `projection` to `active` would nest it under itself.
///
/// Checked against the *full* flattened list (the visible list may already
/// exclude the dragged subtree). A `true` result means the projection must
/// be discarded and the previous valid one retained.
#[must_use]
pub fn projection_creates_cycle(
    full: &[FlatItem],
    active: &NodeId,
    projection: &DropProjection,
) -> bool {
    match &projection.parent {
        None => false,
        Some(parent) => parent == active || is_descendant(full, active, parent),
    }
}
