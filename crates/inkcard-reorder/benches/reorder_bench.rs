//! Benchmarks for the drag hot paths.
//!
//! Flatten + project run on every pointer move (dozens of times per second
//! during a drag); relocate + allocate run once per committed gesture.
//!
//! Run with: cargo bench -p inkcard-reorder

use std::collections::HashSet;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use inkcard_reorder::{allocate_order_keys, project_drop, relocate_subtree, SiblingKey};
use inkcard_tree::{ItemRecord, NodeId, TreeItem, build_tree, flatten, flatten_tree};

/// Forest of `n` nodes in chains of `fanout`: each node is a child of the
/// previous one, with a new root every `fanout` nodes.
fn synthetic_records(n: usize, fanout: usize) -> Vec<ItemRecord> {
    (0..n)
        .map(|i| {
            let parent = if i % fanout == 0 || i == 0 {
                None
            } else {
                Some(NodeId::new(format!("n{}", i - 1)))
            };
            ItemRecord::new(format!("n{i}"), parent, (i as i64 + 1) * 10_000)
        })
        .collect()
}

fn synthetic_tree(n: usize) -> Vec<TreeItem> {
    build_tree(&synthetic_records(n, 8))
}

// ============================================================================
// Pointer-move path: flatten + project
// ============================================================================

fn bench_pointer_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("reorder/pointer_move");

    for n in [100usize, 1_000, 10_000] {
        let tree = synthetic_tree(n);
        let collapsed = HashSet::new();
        let excluded = HashSet::new();
        let active = NodeId::new("n1");
        let over = NodeId::new(format!("n{}", n - 1));

        group.bench_with_input(BenchmarkId::new("flatten", n), &(), |b, _| {
            b.iter(|| black_box(flatten(&tree, &collapsed, &excluded)))
        });

        let visible = flatten(&tree, &collapsed, &excluded);
        group.bench_with_input(BenchmarkId::new("project", n), &(), |b, _| {
            b.iter(|| black_box(project_drop(&visible, &active, &over, 31.0, 24.0)))
        });
    }

    group.finish();
}

// ============================================================================
// Commit path: relocate + allocate
// ============================================================================

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("reorder/commit");

    for n in [1_000usize, 10_000] {
        let tree = synthetic_tree(n);
        let full = flatten_tree(&tree);
        let collapsed = HashSet::new();
        let active = NodeId::new("n1");
        let over = NodeId::new(format!("n{}", n - 1));
        let projection = project_drop(&full, &active, &over, 0.0, 24.0)
            .expect("forward drag projects");

        group.bench_with_input(BenchmarkId::new("relocate", n), &(), |b, _| {
            b.iter(|| black_box(relocate_subtree(&full, &active, &over, &projection, &collapsed)))
        });
    }

    let siblings: Vec<SiblingKey> = (0..1_000)
        .map(|i| SiblingKey::new(format!("s{i}"), 10_000 + i as i64))
        .collect();
    let moved = NodeId::new("moved");
    group.bench_with_input(BenchmarkId::new("allocate_rebalance", 1_000usize), &(), |b, _| {
        // Adjacent keys force the worst case: renumber every trailing sibling.
        b.iter(|| black_box(allocate_order_keys(&siblings, &moved, 1)))
    });

    group.finish();
}

criterion_group!(benches, bench_pointer_move, bench_commit);
criterion_main!(benches);
