//! This crate exposes an ordered Binary Search Tree container that can keep duplicate values,
//! mostly for educational purposes.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to insert and find stored
//! values. BSTs are typically defined recursively using the notion of a `Node`. A `Node` stores
//! a value and sometimes has child `Node`s. The invariant kept by [`tree::Tree`] is:
//!
//! 1. For every `Node`, all the `Node`s in its left subtree have a value less than **or equal
//!    to** its own value.
//! 2. For every `Node`, all the `Node`s in its right subtree have a value strictly greater than
//!    its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching takes `O(height)` where `height` is the longest path from the root `Node` to a
//! leaf `Node`. The tree does not balance itself on insert; instead
//! [`Tree::optimize`][tree::Tree::optimize] rebuilds it on demand into a shape of height
//! `O(lg N)`.
//!
//! Beyond that a `Tree` keeps a log of every value that entered it, can count how many times a
//! value was stored, export itself as nested `[value, left, right]` records, and derive a
//! "delta" copy whose non-root values are offsets from the root.
//!
//! Fallible operations return [`error::TreeError`]. The crate logs through the [`log`] facade
//! and never installs a logger itself.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod error;
pub mod tree;
mod util;
