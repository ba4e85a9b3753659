//! Subtree relocation over the full flattened sequence.
//!
//! Runs once per committed gesture, on the flatten of *every* node (collapse
//! state hidden descendants included — they travel with their parent). The
//! sequence splits into three contiguous runs around the dragged node:
//!
//! ```text
//! [ before ... ] [ active, descendants... ] [ after ... ]
//! ```
//!
//! The moved block is depth-rebased to the projected destination and
//! reinserted at the hovered item's original position, minus the block's own
//! length when the move goes forward. The output is a fresh list; the input
//! is never mutated.

use std::collections::{HashMap, HashSet};

use inkcard_tree::{FlatItem, NodeId};

use crate::projection::DropProjection;

/// Move `active` (and its entire subtree) to the destination described by
/// `projection`, anchored at `over`'s position in the original sequence.
///
/// `collapsed` is consulted for one edge case: a forward move dropped *onto a
/// collapsed parent* lands after that parent's hidden subtree, never inside
/// it (the hidden block must stay contiguous).
///
/// Guarantees: the output contains exactly the input's ids, the moved
/// subtree stays one contiguous block with depths offset by a constant, and
/// every `child_ids` list is rebuilt to match the new order. An `active` or
/// `over` that is missing from the sequence makes the call a no-op copy (the
/// gesture may have raced a store update).
#[must_use]
pub fn relocate_subtree(
    flat: &[FlatItem],
    active: &NodeId,
    over: &NodeId,
    projection: &DropProjection,
    collapsed: &HashSet<NodeId>,
) -> Vec<FlatItem> {
    let Some(old_ix) = flat.iter().position(|it| it.id == *active) else {
        return flat.to_vec();
    };
    let Some(over_ix) = flat.iter().position(|it| it.id == *over) else {
        return flat.to_vec();
    };

    let active_depth = flat[old_ix].depth;
    let subtree_end = subtree_end_ix(flat, old_ix);

    let before = &flat[..old_ix];
    let after = &flat[subtree_end..];

    // Depth-rebase the moved block; only the head changes parent.
    let mut moved: Vec<FlatItem> = flat[old_ix..subtree_end].to_vec();
    moved[0].depth = projection.depth;
    moved[0].parent = projection.parent.clone();
    for item in &mut moved[1..] {
        item.depth = projection.depth + (item.depth - active_depth);
    }

    let mut out: Vec<FlatItem> = Vec::with_capacity(flat.len());
    if over_ix < old_ix {
        // Backward: the block lands directly above the hovered item.
        for (ix, item) in before.iter().enumerate() {
            if ix == over_ix {
                out.append(&mut moved);
            }
            out.push(item.clone());
        }
        out.extend(after.iter().cloned());
    } else if over_ix >= subtree_end {
        // Forward: the hovered item's slot, measured after the block left.
        let mut cursor = over_ix - (before.len() + (subtree_end - old_ix));
        if projection.parent.as_ref() == Some(over) && collapsed.contains(over) {
            // Dropping onto a collapsed parent: skip its hidden subtree.
            cursor += subtree_end_ix(flat, over_ix) - over_ix - 1;
        }
        let mut pending = Some(moved);
        for (ix, item) in after.iter().enumerate() {
            out.push(item.clone());
            if ix == cursor {
                if let Some(mut block) = pending.take() {
                    out.append(&mut block);
                }
            }
        }
        if let Some(mut block) = pending.take() {
            // Cursor past the end (collapsed adjustment at the list tail).
            out.append(&mut block);
        }
    } else {
        // Hovering inside the moved block (including the head itself): the
        // position is unchanged; only depth/parent may have moved.
        out.extend(before.iter().cloned());
        out.append(&mut moved);
        out.extend(after.iter().cloned());
    }

    rebuild_child_ids(&mut out);
    out
}

/// One past the last index of the subtree rooted at `start_ix`.
fn subtree_end_ix(flat: &[FlatItem], start_ix: usize) -> usize {
    let start_depth = flat[start_ix].depth;
    let mut ix = start_ix + 1;
    while ix < flat.len() && flat[ix].depth > start_depth {
        ix += 1;
    }
    ix
}

/// Recompute every item's direct-child list from the new order in one pass.
fn rebuild_child_ids(flat: &mut [FlatItem]) {
    let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::with_capacity(flat.len());
    for item in flat.iter() {
        if let Some(parent) = &item.parent {
            children
                .entry(parent.clone())
                .or_default()
                .push(item.id.clone());
        }
    }
    for item in flat.iter_mut() {
        item.child_ids = children.remove(&item.id).unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkcard_tree::{ItemRecord, build_tree, flatten_tree};
    use proptest::prelude::*;

    use crate::projection::{project_drop, projection_creates_cycle};

    fn id(raw: &str) -> NodeId {
        NodeId::new(raw)
    }

    fn records(rows: &[(&str, Option<&str>)]) -> Vec<ItemRecord> {
        rows.iter()
            .enumerate()
            .map(|(i, (node, parent))| {
                ItemRecord::new(*node, parent.map(NodeId::new), (i as i64 + 1) * 10_000)
            })
            .collect()
    }

    /// a { b { c } }, d { e }, f
    fn sample() -> Vec<FlatItem> {
        flatten_tree(&build_tree(&records(&[
            ("a", None),
            ("b", Some("a")),
            ("c", Some("b")),
            ("d", None),
            ("e", Some("d")),
            ("f", None),
        ])))
    }

    fn projection(depth: usize, parent: Option<&str>) -> DropProjection {
        DropProjection {
            depth,
            parent: parent.map(NodeId::new),
            min_depth: 0,
            max_depth: depth,
        }
    }

    fn shape(flat: &[FlatItem]) -> Vec<(String, usize)> {
        flat.iter()
            .map(|it| (it.id.as_str().to_string(), it.depth))
            .collect()
    }

    fn no_collapse() -> HashSet<NodeId> {
        HashSet::new()
    }

    #[test]
    fn forward_move_to_root_tail() {
        let flat = sample();
        let out = relocate_subtree(&flat, &id("b"), &id("f"), &projection(0, None), &no_collapse());
        assert_eq!(
            shape(&out),
            vec![
                ("a".into(), 0),
                ("d".into(), 0),
                ("e".into(), 1),
                ("f".into(), 0),
                ("b".into(), 0),
                ("c".into(), 1),
            ]
        );
        // Old parent lost the child; depths inside the block stay offset.
        let a = out.iter().find(|it| it.id == id("a")).unwrap();
        assert!(a.child_ids.is_empty());
    }

    #[test]
    fn backward_move_into_other_parent() {
        let flat = sample();
        let out = relocate_subtree(
            &flat,
            &id("e"),
            &id("b"),
            &projection(1, Some("a")),
            &no_collapse(),
        );
        assert_eq!(
            shape(&out),
            vec![
                ("a".into(), 0),
                ("e".into(), 1),
                ("b".into(), 1),
                ("c".into(), 2),
                ("d".into(), 0),
                ("f".into(), 0),
            ]
        );
        let a = out.iter().find(|it| it.id == id("a")).unwrap();
        assert_eq!(a.child_ids, vec![id("e"), id("b")]);
        let d = out.iter().find(|it| it.id == id("d")).unwrap();
        assert!(d.child_ids.is_empty());
    }

    #[test]
    fn indent_in_place_moves_no_rows() {
        // over == active: reparent "d" under "a" without changing position.
        let flat = sample();
        let out = relocate_subtree(
            &flat,
            &id("d"),
            &id("d"),
            &projection(1, Some("a")),
            &no_collapse(),
        );
        assert_eq!(
            shape(&out),
            vec![
                ("a".into(), 0),
                ("b".into(), 1),
                ("c".into(), 2),
                ("d".into(), 1),
                ("e".into(), 2),
                ("f".into(), 0),
            ]
        );
        let a = out.iter().find(|it| it.id == id("a")).unwrap();
        assert_eq!(a.child_ids, vec![id("b"), id("d")]);
    }

    #[test]
    fn forward_drop_onto_collapsed_parent_lands_after_hidden_subtree() {
        let flat = sample();
        let collapsed: HashSet<NodeId> = [id("d")].into_iter().collect();
        let out = relocate_subtree(
            &flat,
            &id("a"),
            &id("d"),
            &projection(1, Some("d")),
            &collapsed,
        );
        assert_eq!(
            shape(&out),
            vec![
                ("d".into(), 0),
                ("e".into(), 1),
                ("a".into(), 1),
                ("b".into(), 2),
                ("c".into(), 3),
                ("f".into(), 0),
            ]
        );
        let d = out.iter().find(|it| it.id == id("d")).unwrap();
        assert_eq!(d.child_ids, vec![id("e"), id("a")]);
    }

    #[test]
    fn forward_drop_onto_collapsed_parent_at_list_tail() {
        // f is last; give it a hidden child and drop "a" onto it.
        let flat = flatten_tree(&build_tree(&records(&[
            ("a", None),
            ("b", Some("a")),
            ("f", None),
            ("g", Some("f")),
        ])));
        let collapsed: HashSet<NodeId> = [id("f")].into_iter().collect();
        let out = relocate_subtree(
            &flat,
            &id("a"),
            &id("f"),
            &projection(1, Some("f")),
            &collapsed,
        );
        assert_eq!(
            shape(&out),
            vec![
                ("f".into(), 0),
                ("g".into(), 1),
                ("a".into(), 1),
                ("b".into(), 2),
            ]
        );
    }

    #[test]
    fn unknown_active_is_a_noop_copy() {
        let flat = sample();
        let out = relocate_subtree(
            &flat,
            &id("ghost"),
            &id("f"),
            &projection(0, None),
            &no_collapse(),
        );
        assert_eq!(out, flat);
    }

    #[test]
    fn unknown_over_is_a_noop_copy() {
        let flat = sample();
        let out = relocate_subtree(
            &flat,
            &id("b"),
            &id("ghost"),
            &projection(0, None),
            &no_collapse(),
        );
        assert_eq!(out, flat);
    }

    // === Property tests ===

    /// Arbitrary forest plus a drag described by (active, over, offset).
    fn arb_case() -> impl Strategy<Value = (Vec<ItemRecord>, usize, usize, f32)> {
        prop::collection::vec(prop::option::weighted(0.7, 0usize..64), 2..20).prop_flat_map(
            |parent_picks| {
                let n = parent_picks.len();
                let records: Vec<ItemRecord> = parent_picks
                    .into_iter()
                    .enumerate()
                    .map(|(i, pick)| {
                        let parent = pick
                            .filter(|_| i > 0)
                            .map(|p| NodeId::new(format!("n{}", p % i)));
                        ItemRecord::new(format!("n{i}"), parent, (i as i64 + 1) * 10_000)
                    })
                    .collect();
                (Just(records), 0..n, 0..n, -120.0f32..120.0)
            },
        )
    }

    proptest! {
        #[test]
        fn relocation_preserves_the_id_set((records, active_pick, over_pick, offset) in arb_case()) {
            let flat = flatten_tree(&build_tree(&records));
            let active = flat[active_pick % flat.len()].id.clone();
            let over = flat[over_pick % flat.len()].id.clone();

            let Some(proj) = project_drop(&flat, &active, &over, offset, 24.0) else {
                return Ok(());
            };
            prop_assume!(!projection_creates_cycle(&flat, &active, &proj));

            let out = relocate_subtree(&flat, &active, &over, &proj, &HashSet::new());
            prop_assert_eq!(out.len(), flat.len());

            let mut expected: Vec<NodeId> = flat.iter().map(|it| it.id.clone()).collect();
            let mut got: Vec<NodeId> = out.iter().map(|it| it.id.clone()).collect();
            expected.sort();
            got.sort();
            prop_assert_eq!(expected, got);
        }

        #[test]
        fn relocation_keeps_the_subtree_contiguous((records, active_pick, over_pick, offset) in arb_case()) {
            let flat = flatten_tree(&build_tree(&records));
            let active = flat[active_pick % flat.len()].id.clone();
            let over = flat[over_pick % flat.len()].id.clone();

            let active_ix = flat.iter().position(|it| it.id == active).unwrap();
            let block: Vec<NodeId> = flat[active_ix..subtree_end_ix(&flat, active_ix)]
                .iter()
                .map(|it| it.id.clone())
                .collect();
            let old_depths: Vec<usize> = flat[active_ix..active_ix + block.len()]
                .iter()
                .map(|it| it.depth)
                .collect();

            let Some(proj) = project_drop(&flat, &active, &over, offset, 24.0) else {
                return Ok(());
            };
            prop_assume!(!projection_creates_cycle(&flat, &active, &proj));

            let out = relocate_subtree(&flat, &active, &over, &proj, &HashSet::new());
            let new_ix = out.iter().position(|it| it.id == active).unwrap();
            let moved: Vec<NodeId> = out[new_ix..new_ix + block.len()]
                .iter()
                .map(|it| it.id.clone())
                .collect();
            prop_assert_eq!(&moved, &block);

            // Depths shift by one constant across the whole block.
            let shift = out[new_ix].depth as isize - old_depths[0] as isize;
            for (offset_in_block, old_depth) in old_depths.iter().enumerate() {
                let new_depth = out[new_ix + offset_in_block].depth as isize;
                prop_assert_eq!(new_depth, *old_depth as isize + shift);
            }
        }

        #[test]
        fn relocation_output_is_a_consistent_tree((records, active_pick, over_pick, offset) in arb_case()) {
            let flat = flatten_tree(&build_tree(&records));
            let active = flat[active_pick % flat.len()].id.clone();
            let over = flat[over_pick % flat.len()].id.clone();

            let Some(proj) = project_drop(&flat, &active, &over, offset, 24.0) else {
                return Ok(());
            };
            prop_assume!(!projection_creates_cycle(&flat, &active, &proj));

            let out = relocate_subtree(&flat, &active, &over, &proj, &HashSet::new());
            for (ix, item) in out.iter().enumerate() {
                match &item.parent {
                    None => prop_assert_eq!(item.depth, 0),
                    Some(parent) => {
                        let parent_item = out.iter().find(|it| &it.id == parent);
                        let parent_item = parent_item.expect("parent present");
                        prop_assert_eq!(item.depth, parent_item.depth + 1);
                        prop_assert!(parent_item.child_ids.contains(&item.id));
                    }
                }
                if ix > 0 {
                    prop_assert!(item.depth <= out[ix - 1].depth + 1);
                }
            }
        }
    }
}
