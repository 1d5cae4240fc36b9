//! Ordered maps on binary search trees.
//!
//! [`BinarySearchTree`] is a plain, unbalanced search tree. [`AvlTree`]
//! layers AVL rebalancing on top of it and keeps its height logarithmic in
//! the number of entries.
//!
//! Nodes live in an arena and link to each other by index, so the trees
//! need no unsafe code. Neither tree is meant for shared mutable use from
//! several threads; callers serialize access.
//!
//! ```
//! use bstree::{AvlTree, BinarySearchTree, Error};
//!
//! let mut plain: BinarySearchTree<_, _> = (1..=5).map(|key| (key, ())).collect();
//! assert!(!plain.is_balanced());
//! plain.clear();
//!
//! let avl: AvlTree<_, _> = (1..=5).map(|key| (key, key)).collect();
//! assert!(avl.is_balanced());
//! assert_eq!(avl.at(&6), Err(Error::KeyNotFound));
//! ```

mod arena;
mod avl;
mod bst;
mod error;
mod iter;
mod relink;

pub use avl::{AvlTree, Balance};
pub use bst::BinarySearchTree;
pub use error::{Error, Result};
pub use iter::{Cursor, Iter, Keys, Values};

#[cfg(test)]
mod proptests;
