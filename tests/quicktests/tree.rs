use delta_bst::tree::Tree;

use std::collections::HashMap;

/// Builds a tree by inserting every value in order.
fn build(xs: &[i8], allow_duplicates: bool) -> Tree<i8> {
    let mut tree = Tree::with_duplicates(allow_duplicates);
    tree.insert_values(xs.iter().copied());
    tree
}

/// Counts each value in the tree's preorder walk.
fn multiset(tree: &Tree<i8>) -> HashMap<i8, usize> {
    let mut counts = HashMap::new();
    for node in tree {
        *counts.entry(*node.value()).or_insert(0) += 1;
    }
    counts
}

#[quickcheck]
fn contains(xs: Vec<i8>, allow_duplicates: bool) -> bool {
    let tree = build(&xs, allow_duplicates);

    xs.iter().all(|x| tree.find(x) == Ok(true))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree = build(&xs, false);
    if tree.is_empty() {
        return true;
    }

    nots.iter()
        .filter(|x| !xs.contains(*x))
        .all(|x| tree.find(x) == Ok(false))
}

#[quickcheck]
fn rejected_duplicates_are_not_logged(xs: Vec<i8>, x: i8) -> bool {
    let mut tree = build(&xs, false);
    tree.insert(x);
    let logged = tree.values().len();
    tree.insert(x);

    tree.values().len() == logged && tree.occurrences(&x) == Ok(1)
}

#[quickcheck]
fn occurrences_count_repeats(xs: Vec<i8>, x: i8, k: u8) -> bool {
    let k = usize::from(k % 16) + 1;
    let mut tree = build(&xs, true);
    let before = xs.iter().filter(|&&v| v == x).count();
    for _ in 0..k {
        tree.insert(x);
    }

    tree.occurrences(&x) == Ok(before + k)
}

#[quickcheck]
fn copy_keeps_multiset(xs: Vec<i8>, allow_duplicates: bool) -> bool {
    let tree = build(&xs, allow_duplicates);
    let copy = tree.copy();

    copy.allow_duplicates() == allow_duplicates && multiset(&copy) == multiset(&tree)
}

#[quickcheck]
fn delta_offsets_from_root(xs: Vec<i8>) -> bool {
    // Widen so that subtracting the root can't overflow.
    let mut tree = Tree::with_duplicates(true);
    tree.insert_values(xs.iter().map(|&x| i16::from(x)));
    let delta = match tree.delta_tree() {
        Ok(delta) => delta,
        Err(_) => return xs.is_empty(),
    };
    let copy = tree.copy();
    let root = *copy.root().unwrap().value();

    let expected: Vec<i16> = copy
        .iter()
        .enumerate()
        .map(|(i, n)| if i == 0 { root } else { *n.value() - root })
        .collect();
    let actual: Vec<i16> = delta.iter().map(|n| *n.value()).collect();

    expected == actual
}

#[quickcheck]
fn depth_excluding_root_is_one_less(xs: Vec<i8>, allow_duplicates: bool) -> bool {
    let tree = build(&xs, allow_duplicates);
    match (tree.depth(), tree.depth_with(false)) {
        (Ok(with), Ok(without)) => with == without + 1 && with <= tree.iter().count(),
        (Err(_), Err(_)) => xs.is_empty(),
        _ => false,
    }
}

#[quickcheck]
fn optimize_keeps_content_of_fresh_tree(xs: Vec<i8>, allow_duplicates: bool) -> bool {
    let mut tree = build(&xs, allow_duplicates);
    let before = multiset(&tree);
    if tree.optimize(false).is_err() {
        return xs.is_empty();
    }

    // Long runs of repeats stack up as chains, so only distinct values promise a shallower tree.
    let shallower = allow_duplicates
        || tree.depth().unwrap() <= build(&xs, allow_duplicates).depth().unwrap();
    multiset(&tree) == before && shallower
}
