//! Errors surfaced by [`Tree`][crate::tree::Tree] operations.

/// Errors triggered by tree operations. A rejected duplicate insertion is *not* an error, it is
/// a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TreeError {
    /// The one-time root assignment was used on a tree that already has a root. Use
    /// [`Tree::replace_root`][crate::tree::Tree::replace_root] instead.
    #[error("root has already been set for this tree")]
    AlreadyInitialized,
    /// The operation needs a root but the tree has none.
    #[error("tree is empty")]
    EmptyTree,
}
