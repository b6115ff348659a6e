//! An owned, unbalanced Binary Search Tree that can optionally keep duplicate values. Besides
//! the usual insert and find it can count occurrences, measure its depth, rebuild itself into a
//! balanced shape, and produce a "delta" copy whose values are offsets from the root.
//!
//! Equal values always route left, so the ordering invariant is: everything in a node's left
//! subtree is `<=` its value and everything in its right subtree is `>` its value.
//!
//! # Examples
//!
//! ```
//! use delta_bst::tree::Tree;
//!
//! let mut tree = Tree::from_values(5, vec![2, 9, 8], true);
//! tree.insert_values(vec![4, 3, 5]);
//!
//! assert_eq!(tree.find(&2), Ok(true));
//! assert_eq!(tree.occurrences(&5), Ok(2));
//! assert_eq!(tree.depth(), Ok(4));
//! assert_eq!(tree.values(), &[5, 2, 9, 8, 4, 3, 5]);
//!
//! // The duplicate 5 ends up under 4: it went left at the root and right from there on.
//! assert_eq!(
//!     tree.as_list().unwrap().to_string(),
//!     "[5, [2, None, [4, [3, None, None], [5, None, None]]], [9, [8, None, None], None]]"
//! );
//!
//! // Non-root values become offsets from the root.
//! let delta = tree.delta_tree().unwrap();
//! assert_eq!(
//!     delta.as_list().unwrap().to_string(),
//!     "[5, [-3, None, [-1, [-2, None, None], [0, None, None]]], [4, [3, None, None], None]]"
//! );
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::Sub;

use log::{debug, trace};
use serde::Serialize;

use crate::error::TreeError;
use crate::util::{self, Run};

type Link<T> = Option<Box<Node<T>>>;

/// A Binary Search Tree over values of type `T`. The tree owns its nodes, an insertion log of
/// every value that entered it, and a duplicate policy fixed at construction.
pub struct Tree<T> {
    root: Link<T>,
    allow_duplicates: bool,
    values: Vec<T>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Generates a new, empty `Tree` that rejects duplicates.
    pub fn new() -> Self {
        Self::with_duplicates(false)
    }

    /// Generates a new, empty `Tree` with the given duplicate policy.
    pub fn with_duplicates(allow_duplicates: bool) -> Self {
        Self {
            root: None,
            allow_duplicates,
            values: Vec::new(),
        }
    }

    /// Generates a single-node `Tree` that rejects duplicates.
    pub fn with_root(value: T) -> Self
    where
        T: Clone,
    {
        Self::with_policy(Some(value), false)
    }

    /// Generates a `Tree` with an optional root and the given duplicate policy. A root value is
    /// recorded in the insertion log.
    pub fn with_policy(root: Option<T>, allow_duplicates: bool) -> Self
    where
        T: Clone,
    {
        let mut tree = Self::with_duplicates(allow_duplicates);
        if let Some(value) = root {
            tree.values.push(value.clone());
            tree.root = Some(Box::new(Node::new(value)));
        }

        tree
    }

    /// Builds a tree whose root is `root` and inserts every value of `rest` in order. The
    /// duplicate policy applies to `rest` only: `root` always becomes the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use delta_bst::tree::Tree;
    ///
    /// let tree = Tree::from_values(5, vec![2, 5, 9], false);
    ///
    /// // The second 5 was silently rejected.
    /// assert_eq!(tree.values(), &[5, 2, 9]);
    /// ```
    pub fn from_values<I>(root: T, rest: I, allow_duplicates: bool) -> Self
    where
        T: Ord + Clone,
        I: IntoIterator<Item = T>,
    {
        let mut tree = Self::with_policy(Some(root), allow_duplicates);
        tree.insert_values(rest);
        tree
    }

    /// The root node, if any.
    pub fn root(&self) -> Option<&Node<T>> {
        self.root.as_deref()
    }

    /// Whether this tree keeps equal values as separate nodes.
    pub fn allow_duplicates(&self) -> bool {
        self.allow_duplicates
    }

    /// The insertion log: every value that entered the tree, in the order it did.
    ///
    /// [`Tree::replace_root`] appends without dropping the old values, so afterwards the log
    /// can hold more than the tree does. [`Tree::optimize`] rewrites it in sorted order, with
    /// the root's value moved to one end.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Whether the tree has no root.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Sets the root of an empty tree to a single node holding `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::AlreadyInitialized`] if the tree already has a root. The tree is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use delta_bst::error::TreeError;
    /// use delta_bst::tree::Tree;
    ///
    /// let mut tree = Tree::new();
    /// assert_eq!(tree.set_root(1), Ok(()));
    /// assert_eq!(tree.set_root(2), Err(TreeError::AlreadyInitialized));
    /// assert_eq!(tree.root().map(|n| *n.value()), Some(1));
    /// ```
    pub fn set_root(&mut self, value: T) -> Result<(), TreeError>
    where
        T: Clone,
    {
        self.set_root_node(Node::new(value))
    }

    /// Sets the root of an empty tree to a pre-built [`Node`]. Only the root's value is logged
    /// and the subtree is trusted as-is: its ordering is not checked.
    ///
    /// # Errors
    ///
    /// [`TreeError::AlreadyInitialized`] if the tree already has a root. The tree is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use delta_bst::tree::{Node, Tree};
    ///
    /// let mut tree = Tree::new();
    /// tree.set_root_node(Node::new(3).with_left(Node::new(2))).unwrap();
    ///
    /// assert_eq!(tree.values(), &[3]);
    /// assert_eq!(tree.find(&2), Ok(true));
    /// ```
    pub fn set_root_node(&mut self, root: Node<T>) -> Result<(), TreeError>
    where
        T: Clone,
    {
        if self.root.is_some() {
            return Err(TreeError::AlreadyInitialized);
        }
        self.values.push(root.value.clone());
        self.root = Some(Box::new(root));
        Ok(())
    }

    /// Unconditionally replaces the root (and with it the whole tree) with a single node holding
    /// `value`, then appends `value` to the insertion log.
    pub fn replace_root(&mut self, value: T)
    where
        T: Clone,
    {
        self.replace_root_node(Node::new(value))
    }

    /// Unconditionally replaces the root (and with it the whole tree) with a pre-built [`Node`],
    /// then appends the new root's value to the insertion log.
    pub fn replace_root_node(&mut self, root: Node<T>)
    where
        T: Clone,
    {
        debug!("replacing root, insertion log holds {} values", self.values.len() + 1);
        self.values.push(root.value.clone());
        self.root = Some(Box::new(root));
    }

    /// Inserts `value`. An empty tree takes it as its root. Otherwise values `<=` a node go
    /// left and values `>` go right until a free slot is found. When duplicates are disallowed
    /// and `value` is already present this is a silent no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use delta_bst::tree::Tree;
    ///
    /// let mut tree = Tree::with_duplicates(true);
    /// tree.insert(3);
    /// tree.insert(3);
    /// tree.insert(3);
    ///
    /// assert_eq!(tree.occurrences(&3), Ok(3));
    /// ```
    pub fn insert(&mut self, value: T)
    where
        T: Ord + Clone,
    {
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = match value.cmp(&node.value) {
                Ordering::Equal if !self.allow_duplicates => {
                    debug!("duplicate value rejected");
                    return;
                }
                Ordering::Less | Ordering::Equal => &mut node.left,
                Ordering::Greater => &mut node.right,
            };
        }

        *link = Some(Box::new(Node::new(value.clone())));
        self.values.push(value);
        trace!("inserted value, insertion log holds {}", self.values.len());
    }

    /// Inserts every value in order. If the tree is empty the first value becomes the root.
    pub fn insert_values<I>(&mut self, values: I)
    where
        T: Ord + Clone,
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.insert(value);
        }
    }

    /// Whether `value` is stored in the tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyTree`] if there is no root to search from.
    pub fn find(&self, value: &T) -> Result<bool, TreeError>
    where
        T: Ord,
    {
        let mut node = self.root().ok_or(TreeError::EmptyTree)?;
        loop {
            let next = match value.cmp(&node.value) {
                Ordering::Equal => return Ok(true),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
            match next {
                Some(n) => node = n,
                None => return Ok(false),
            }
        }
    }

    /// How many times `value` is stored. Without duplicates this is `find` as 0 or 1.
    ///
    /// With duplicates, every node equal to `value` on the search path counts once and the
    /// search carries on to its left child, which is where further copies are routed. Nodes on
    /// that path are not re-checked beyond this comparison.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyTree`] if there is no root to search from.
    #[doc(alias = "iterations")]
    pub fn occurrences(&self, value: &T) -> Result<usize, TreeError>
    where
        T: Ord,
    {
        if !self.allow_duplicates {
            return self.find(value).map(usize::from);
        }

        let mut count = 0;
        let mut node = self.root().ok_or(TreeError::EmptyTree)?;
        loop {
            let next = match value.cmp(&node.value) {
                Ordering::Equal => {
                    count += 1;
                    node.left()
                }
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
            match next {
                Some(n) => node = n,
                None => return Ok(count),
            }
        }
    }

    /// The number of nodes on the longest root-to-leaf path.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyTree`] if the tree has no root.
    pub fn depth(&self) -> Result<usize, TreeError> {
        self.depth_with(true)
    }

    /// Like [`Tree::depth`] but the root only counts if `include_root` is set. A lone root has
    /// a depth of 1, or 0 without the root.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyTree`] if the tree has no root.
    pub fn depth_with(&self, include_root: bool) -> Result<usize, TreeError> {
        let height = self.root().ok_or(TreeError::EmptyTree)?.height();
        Ok(if include_root { height } else { height - 1 })
    }

    /// A lazy preorder walk (node, left subtree, right subtree) over the nodes. Each call starts
    /// a fresh walk.
    pub fn iter(&self) -> Preorder<'_, T> {
        Preorder {
            stack: self.root().into_iter().collect(),
        }
    }

    /// Renders the tree as nested `[value, left, right]` records.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyTree`] if the tree has no root.
    pub fn as_list(&self) -> Result<Listed<T>, TreeError>
    where
        T: Clone,
    {
        self.root().map(Node::listed).ok_or(TreeError::EmptyTree)
    }

    /// A new tree with the same duplicate policy, built by inserting this tree's values in
    /// preorder. The values are kept but the shape may differ.
    pub fn copy(&self) -> Self
    where
        T: Ord + Clone,
    {
        let mut copy = Self::with_duplicates(self.allow_duplicates);
        copy.insert_values(self.iter().map(|n| n.value.clone()));
        copy
    }

    /// A [`Tree::copy`] where the root's value has been subtracted from every other node. The
    /// shape is left alone, so the result generally breaks the ordering invariant.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyTree`] if the tree has no root.
    ///
    /// # Panics
    ///
    /// The subtraction is plain `-`, so for fixed-width integers it panics on overflow in debug
    /// builds (and wraps in release builds), e.g. an `i32` tree rooted at `1` holding `i32::MIN`.
    /// Widen the value type first if the range of offsets can exceed it.
    #[doc(alias = "delta_variant")]
    pub fn delta_tree(&self) -> Result<Self, TreeError>
    where
        T: Ord + Clone + Sub<Output = T>,
    {
        let mut delta = self.copy();
        {
            let root = delta.root.as_deref_mut().ok_or(TreeError::EmptyTree)?;
            let offset = root.value.clone();

            let mut stack: Vec<&mut Node<T>> = root
                .left
                .as_deref_mut()
                .into_iter()
                .chain(root.right.as_deref_mut())
                .collect();
            while let Some(node) = stack.pop() {
                node.value = node.value.clone() - offset.clone();
                stack.extend(node.left.as_deref_mut());
                stack.extend(node.right.as_deref_mut());
            }
        }

        debug!("built delta tree");
        Ok(delta)
    }

    /// Rebuilds the tree into a height-balanced shape from the sorted insertion log, then
    /// installs it with [`Tree::replace_root_node`].
    ///
    /// The new root is the lower median of the sorted log or, with `keep_root`, the current
    /// root's value (one logged copy of it, normally the first logged value, is then left out).
    /// Equal values are stacked as a left chain so [`Tree::occurrences`] still counts them.
    /// When duplicates are disallowed repeats in the log are dropped.
    ///
    /// The log is left sorted with the root's value moved out: last without `keep_root`, first
    /// with it. It therefore holds the same values as the rebuilt tree but no longer records
    /// insertion order, and rebalancing again yields the same tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyTree`] if the tree has no root. The tree is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use delta_bst::tree::Tree;
    ///
    /// let mut tree = Tree::from_values(1, 2..=7, false);
    /// assert_eq!(tree.depth(), Ok(7));
    ///
    /// tree.optimize(false).unwrap();
    /// assert_eq!(tree.depth(), Ok(3));
    /// assert_eq!(tree.root().map(|n| *n.value()), Some(4));
    /// assert_eq!(tree.values(), &[1, 2, 3, 5, 6, 7, 4]);
    /// ```
    pub fn optimize(&mut self, keep_root: bool) -> Result<(), TreeError>
    where
        T: Ord + Clone,
    {
        let current_root = self.root().ok_or(TreeError::EmptyTree)?.value.clone();
        let collapse = !self.allow_duplicates;

        let (root_value, rest) = if keep_root {
            let mut rest = self.values.clone();
            if let Some(at) = rest.iter().position(|v| *v == current_root) {
                rest.remove(at);
            }
            rest.sort();
            (current_root, rest)
        } else {
            let mut sorted = self.values.clone();
            sorted.sort();
            if sorted.is_empty() {
                return Err(TreeError::EmptyTree);
            }
            let median = sorted.remove(sorted.len() / 2);
            (median, sorted)
        };

        let mut runs = util::runs(rest.clone(), collapse);
        let split = runs.partition_point(|run| run.head < root_value);
        let mut right = runs.split_off(split);
        let mut root_run = Run {
            head: root_value,
            rest: Vec::new(),
        };
        if right.first().map_or(false, |run| run.head == root_run.head) {
            let equal = right.remove(0);
            if !collapse {
                root_run.rest.push(equal.head);
                root_run.rest.extend(equal.rest);
            }
        }

        let root = Node::chain(root_run, Node::balanced(runs), Node::balanced(right));
        self.values = rest;
        self.replace_root_node(root);
        if keep_root {
            self.values.rotate_right(1);
        }
        debug!(
            "rebalanced {} logged values to depth {}",
            self.values.len(),
            self.root().map_or(0, Node::height)
        );
        Ok(())
    }
}

/// Trees compare their preorder walks node by node, stopping at the end of the shorter walk. In
/// particular an empty tree equals every tree.
///
/// Nodes compare as whole subtrees, so once the two roots match every later pair matches too.
/// Comparing the roots alone gives the same answer in one walk.
impl<T: PartialEq> PartialEq for Tree<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self.root(), other.root()) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("preorder", &DebugPreorder(self))
            .field("allow_duplicates", &self.allow_duplicates)
            .field("values", &self.values)
            .finish()
    }
}

struct DebugPreorder<'a, T>(&'a Tree<T>);

impl<T: fmt::Debug> fmt::Debug for DebugPreorder<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter().map(Node::value)).finish()
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a Node<T>;
    type IntoIter = Preorder<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A `Node` holds one value and owns up to two children. Two nodes are equal when their values
/// and both subtrees are equal. Cloning, comparing and dropping walk the subtree with a heap
/// stack, so they work on trees of any height.
pub struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
}

impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        self.rebuild(|value, left, right| Self {
            value: value.clone(),
            left: left.map(Box::new),
            right: right.map(Box::new),
        })
    }
}

impl<T: PartialEq> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.value != b.value {
                return false;
            }
            for pair in [(a.left(), b.left()), (a.right(), b.right())] {
                match pair {
                    (Some(a), Some(b)) => stack.push((a, b)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }

        true
    }
}

/// Only shows this node's value and its children's values.
impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("left", &self.left().map(Node::value))
            .field("right", &self.right().map(Node::value))
            .finish()
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        // Unlink children onto a heap stack so that dropping a long chain doesn't recurse.
        let mut stack: Vec<Box<Node<T>>> = Vec::new();
        stack.extend(self.left.take());
        stack.extend(self.right.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<T> Node<T> {
    /// A leaf node holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    /// Sets the left child, replacing any previous one. Ordering is not checked.
    ///
    /// # Examples
    ///
    /// ```
    /// use delta_bst::tree::{Node, Tree};
    ///
    /// let mut tree = Tree::new();
    /// tree.set_root_node(Node::new(3).with_left(Node::new(2))).unwrap();
    ///
    /// assert_eq!(tree.depth(), Ok(2));
    /// assert_eq!(tree.depth_with(false), Ok(1));
    /// ```
    pub fn with_left(mut self, left: Node<T>) -> Self {
        self.left = Some(Box::new(left));
        self
    }

    /// Sets the right child, replacing any previous one. Ordering is not checked.
    pub fn with_right(mut self, right: Node<T>) -> Self {
        self.right = Some(Box::new(right));
        self
    }

    /// The stored value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The left child, if any.
    pub fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    /// The right child, if any.
    pub fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    /// How many levels are in the subtree rooted at this node. A node with no children has a
    /// height of 1.
    fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            height = height.max(level);
            stack.extend(node.left().map(|n| (n, level + 1)));
            stack.extend(node.right().map(|n| (n, level + 1)));
        }

        height
    }

    fn listed(&self) -> Listed<T>
    where
        T: Clone,
    {
        self.rebuild(|value, left, right| {
            Listed(value.clone(), left.map(Box::new), right.map(Box::new))
        })
    }

    /// Folds the subtree bottom-up without recursing: `make` receives each node's value along
    /// with what it returned for the node's children.
    fn rebuild<R>(&self, mut make: impl FnMut(&T, Option<R>, Option<R>) -> R) -> R {
        let mut pending = vec![(self, false)];
        let mut built: Vec<R> = Vec::new();
        while let Some((node, expanded)) = pending.pop() {
            if expanded {
                // The left child is expanded first, so the right child's result is on top.
                let right = node.right.as_ref().and_then(|_| built.pop());
                let left = node.left.as_ref().and_then(|_| built.pop());
                built.push(make(&node.value, left, right));
            } else {
                pending.push((node, true));
                pending.extend(node.right().map(|n| (n, false)));
                pending.extend(node.left().map(|n| (n, false)));
            }
        }

        built.pop().expect("the root is built last")
    }

    /// Stacks a run of equal values into a left chain. `left` hangs off the bottom of the chain
    /// and `right` off its top.
    fn chain(run: Run<T>, left: Link<T>, right: Link<T>) -> Self {
        let mut below = left;
        for value in run.rest {
            below = Some(Box::new(Self {
                value,
                left: below,
                right: None,
            }));
        }

        Self {
            value: run.head,
            left: below,
            right,
        }
    }

    /// Builds a height-balanced subtree over ascending runs by repeatedly splitting at the lower
    /// median.
    fn balanced(mut runs: Vec<Run<T>>) -> Link<T> {
        if runs.is_empty() {
            return None;
        }
        let mid = runs.len() / 2;
        let right = runs.split_off(mid + 1);
        let run = runs.pop()?;

        Some(Box::new(Self::chain(
            run,
            Self::balanced(runs),
            Self::balanced(right),
        )))
    }
}

/// Preorder iterator over the nodes of a [`Tree`]. Created by [`Tree::iter`].
pub struct Preorder<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iterator for Preorder<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.right());
        self.stack.extend(node.left());
        Some(node)
    }
}

/// The nested-list rendering of a node: its value, then the rendering of its left and right
/// children where `None` marks an absent child. Serializes as a 3-element sequence.
///
/// Building one is iterative, but its derived impls (and `Display`) recurse once per level.
///
/// # Examples
///
/// ```
/// use delta_bst::tree::Tree;
///
/// let tree = Tree::from_values(2, vec![1], false);
/// let listed = tree.as_list().unwrap();
///
/// assert_eq!(listed.to_string(), "[2, [1, None, None], None]");
/// assert_eq!(serde_json::to_string(&listed).unwrap(), "[2,[1,null,null],null]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listed<T>(
    pub T,
    pub Option<Box<Listed<T>>>,
    pub Option<Box<Listed<T>>>,
);

impl<T: fmt::Display> fmt::Display for Listed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn child<T: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            child: &Option<Box<Listed<T>>>,
        ) -> fmt::Result {
            match child {
                Some(listed) => write!(f, "{}", listed),
                None => f.write_str("None"),
            }
        }

        write!(f, "[{}, ", self.0)?;
        child(f, &self.1)?;
        f.write_str(", ")?;
        child(f, &self.2)?;
        f.write_str("]")
    }
}
