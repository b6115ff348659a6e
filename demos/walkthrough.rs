//! Walks through the tree API on a small example and prints each result.
//!
//! Run with `cargo run --example walkthrough`.

use delta_bst::error::TreeError;
use delta_bst::tree::Tree;

fn main() -> Result<(), TreeError> {
    simple_logger::init_with_level(log::Level::Debug).expect("logger is installed once");

    let mut tree = Tree::from_values(5, vec![2, 9, 8], true);
    tree.insert_values(vec![4, 3, 5]);

    println!("root: {:?}", tree.root().map(|n| n.value()));
    println!("find(2): {}", tree.find(&2)?);
    println!("occurrences(5): {}", tree.occurrences(&5)?);
    println!("depth: {}", tree.depth()?);
    println!("as list: {}", tree.as_list()?);
    println!("values: {:?}", tree.values());

    let delta = tree.delta_tree()?;
    println!("delta: {}", delta.as_list()?);

    let mut optimized = tree.copy();
    optimized.optimize(false)?;
    println!("optimized: {}", optimized.as_list()?);
    println!("{} >= {}", tree.depth()?, optimized.depth()?);

    println!("Tree(2) == Tree(2): {}", Tree::with_root(2) == Tree::with_root(2));

    for node in &tree {
        println!("{}", node.value());
    }

    Ok(())
}
