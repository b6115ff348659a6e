use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use delta_bst::tree::Tree;

/// Returns how many nodes are needed to fill a binary tree with `num_levels` levels.
fn num_nodes_in_full_tree(num_levels: u32) -> i32 {
    2i32.pow(num_levels) - 1
}

/// Builds a tree by inserting values in ascending order, which leaves it as one long right
/// spine.
fn get_degenerate_tree(num_levels: u32) -> Tree<i32> {
    Tree::from_values(0, 1..num_nodes_in_full_tree(num_levels), true)
}

/// Builds a tree by inserting values so that, without any rebalancing, it is full and balanced.
fn get_balanced_tree(num_levels: u32) -> Tree<i32> {
    let xs = (0..num_nodes_in_full_tree(num_levels)).collect::<Vec<_>>();
    let mut tree = Tree::with_duplicates(true);
    fill_balanced_tree(&mut tree, &xs);
    tree
}

/// Recursive helper for [`get_balanced_tree`].
fn fill_balanced_tree(tree: &mut Tree<i32>, xs: &[i32]) {
    if !xs.is_empty() {
        let mid = xs.len() / 2;
        tree.insert(xs[mid]);
        fill_balanced_tree(tree, &xs[..mid]);
        fill_balanced_tree(tree, &xs[mid + 1..]);
    }
}

/// Helper to bench a function on a tree.
/// It creates a group for the given name and closure and runs it against degenerate and
/// balanced trees of various sizes before finishing the group. The tree is rebuilt for every
/// iteration so mutating closures start from the same shape.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut Tree<i32>, i32)) {
    let mut group = c.benchmark_group(name);

    for num_levels in [3, 7, 11] {
        let largest_element_in_tree = num_nodes_in_full_tree(num_levels) - 1;
        let shapes: [(&str, fn(u32) -> Tree<i32>); 2] = [
            ("degenerate", get_degenerate_tree),
            ("balanced", get_balanced_tree),
        ];
        for (shape, build) in shapes {
            let id = BenchmarkId::new(shape, largest_element_in_tree);
            group.bench_function(id, |b| {
                b.iter_batched(
                    || build(num_levels),
                    |mut tree| f(&mut tree, black_box(largest_element_in_tree)),
                    BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "find", |tree, i| {
        let _found = black_box(tree.find(&i));
    });
    bench_helper(c, "find-miss", |tree, i| {
        let _found = black_box(tree.find(&(i + 1)));
    });
    bench_helper(c, "occurrences", |tree, i| {
        let _count = black_box(tree.occurrences(&i));
    });
    bench_helper(c, "insert", |tree, i| {
        tree.insert(i + 1);
    });
    bench_helper(c, "depth", |tree, _| {
        let _depth = black_box(tree.depth());
    });
    bench_helper(c, "optimize", |tree, _| {
        let _optimized = black_box(tree.optimize(false));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
