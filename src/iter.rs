//! In-order iteration over a tree.

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;

use crate::arena::Link;
use crate::bst::BinarySearchTree;

/// An iterator over the entries of a tree, sorted by key.
///
/// Steps forward with the in-order successor and backward with the
/// in-order predecessor.
pub struct Iter<'a, K, V, M = ()> {
    tree: &'a BinarySearchTree<K, V, M>,
    front: Link,
    back: Link,
    remaining: usize,
}

/// An iterator over the keys of a tree, in sorted order.
pub struct Keys<'a, K, V, M = ()> {
    iter: Iter<'a, K, V, M>,
}

/// An iterator over the values of a tree, in order by key.
pub struct Values<'a, K, V, M = ()> {
    iter: Iter<'a, K, V, M>,
}

impl<'a, K, V, M> Iter<'a, K, V, M> {
    pub(crate) fn new(tree: &'a BinarySearchTree<K, V, M>) -> Self {
        Self {
            tree,
            front: tree.root.map(|root_id| tree.leftmost(root_id)),
            back: tree.root.map(|root_id| tree.rightmost(root_id)),
            remaining: tree.len(),
        }
    }
}

impl<'a, K, V, M> Iterator for Iter<'a, K, V, M> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let node_id = self.front?;
        self.front = tree.successor(node_id);
        self.remaining -= 1;
        let node = &tree.arena[node_id];
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, M> DoubleEndedIterator for Iter<'a, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let node_id = self.back?;
        self.back = tree.predecessor(node_id);
        self.remaining -= 1;
        let node = &tree.arena[node_id];
        Some((&node.key, &node.value))
    }
}

impl<K, V, M> ExactSizeIterator for Iter<'_, K, V, M> {}

impl<K, V, M> FusedIterator for Iter<'_, K, V, M> {}

impl<K, V, M> Clone for Iter<'_, K, V, M> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, K, V, M> Keys<'a, K, V, M> {
    pub(crate) fn new(iter: Iter<'a, K, V, M>) -> Self {
        Self { iter }
    }
}

impl<'a, K, V, M> Iterator for Keys<'a, K, V, M> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V, M> DoubleEndedIterator for Keys<'_, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(key, _)| key)
    }
}

impl<K, V, M> ExactSizeIterator for Keys<'_, K, V, M> {}

impl<K, V, M> FusedIterator for Keys<'_, K, V, M> {}

impl<'a, K, V, M> Values<'a, K, V, M> {
    pub(crate) fn new(iter: Iter<'a, K, V, M>) -> Self {
        Self { iter }
    }
}

impl<'a, K, V, M> Iterator for Values<'a, K, V, M> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<K, V, M> DoubleEndedIterator for Values<'_, K, V, M> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|(_, value)| value)
    }
}

impl<K, V, M> ExactSizeIterator for Values<'_, K, V, M> {}

impl<K, V, M> FusedIterator for Values<'_, K, V, M> {}

/// A position in a tree: either on an entry or past the end.
///
/// Obtained from `begin`, `end` or `find`. Two cursors are equal iff they
/// are on the same entry or both past the end.
///
/// ```
/// use bstree::AvlTree;
/// let tree: AvlTree<_, _> = [(2, 'b'), (1, 'a')].into_iter().collect();
/// let mut cursor = tree.begin();
/// assert_eq!(cursor.key(), Some(&1));
/// cursor.move_next();
/// assert_eq!(cursor.value(), Some(&'b'));
/// cursor.move_next();
/// assert_eq!(cursor, tree.end());
/// ```
pub struct Cursor<'a, K, V, M = ()> {
    tree: &'a BinarySearchTree<K, V, M>,
    node: Link,
}

impl<'a, K, V, M> Cursor<'a, K, V, M> {
    pub(crate) fn new(tree: &'a BinarySearchTree<K, V, M>, node: Link) -> Self {
        Self { tree, node }
    }

    /// Returns true if the cursor is past the end.
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Returns the key under the cursor, or `None` past the end.
    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, or `None` past the end.
    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, value)| value)
    }

    /// Returns the entry under the cursor, or `None` past the end.
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.node.map(|node_id| {
            let node = &tree.arena[node_id];
            (&node.key, &node.value)
        })
    }

    /// Moves to the in-order successor. Past the end the cursor stays put.
    pub fn move_next(&mut self) {
        if let Some(node_id) = self.node {
            self.node = self.tree.successor(node_id);
        }
    }
}

impl<K, V, M> Clone for Cursor<'_, K, V, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, M> Copy for Cursor<'_, K, V, M> {}

impl<K, V, M> PartialEq for Cursor<'_, K, V, M> {
    fn eq(&self, other: &Self) -> bool {
        match (self.node, other.node) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b && ptr::eq(self.tree, other.tree),
            _ => false,
        }
    }
}

impl<K, V, M> Eq for Cursor<'_, K, V, M> {}

impl<K, V, M> fmt::Debug for Cursor<'_, K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("node", &self.node.map(|node_id| node_id.index()))
            .finish()
    }
}
