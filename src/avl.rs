//! An ordered map implemented with an AVL tree.

use std::borrow::Borrow;
use std::cmp;
use std::fmt;
use std::iter::FromIterator;
use std::ops::Index;

use tracing::trace;

use crate::arena::{Link, NodeId};
use crate::bst::{BinarySearchTree, Insertion};
use crate::error::Result;
use crate::iter::{Cursor, Iter, Keys, Values};
use crate::relink;

/// Balance record of an AVL node.
///
/// The record belongs to the position of a node in the tree: when two nodes
/// swap positions, they swap records too.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Balance {
    height: usize,
    factor: i8,
}

impl Balance {
    /// Number of nodes on the longest path down from this node.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Height of the left subtree minus height of the right subtree.
    pub fn factor(&self) -> i8 {
        self.factor
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self {
            height: 1,
            factor: 0,
        }
    }
}

type Tree<K, V> = BinarySearchTree<K, V, Balance>;

/// An ordered map implemented with an AVL tree.
///
/// Insertion and removal restore the AVL condition on the way back up to
/// the root, so the heights of the two subtrees of any node never differ by
/// more than one.
///
/// ```
/// use bstree::AvlTree;
/// let mut tree = AvlTree::new();
/// for key in 1..=7 {
///     tree.insert(key, key * 10);
/// }
/// assert_eq!(tree.height(), 3);
/// assert_eq!(tree[&4], 40);
/// assert_eq!(tree.remove(&4), Some(40));
/// assert!(tree.is_balanced());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AvlTree<K, V> {
    tree: Tree<K, V>,
}

impl<K, V> AvlTree<K, V> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            tree: Tree::empty(),
        }
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.height_of(self.tree.root)
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns true if at every node the heights of the two subtrees differ
    /// by at most one. Measures the real heights instead of trusting the
    /// balance records.
    pub fn is_balanced(&self) -> bool {
        self.tree.is_balanced()
    }

    /// Read-only access to the underlying search tree.
    pub fn as_tree(&self) -> &BinarySearchTree<K, V, Balance> {
        &self.tree
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V, Balance> {
        self.tree.iter()
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V, Balance> {
        self.tree.keys()
    }

    /// Gets an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V, Balance> {
        self.tree.values()
    }

    /// Returns a cursor on the entry with the smallest key.
    pub fn begin(&self) -> Cursor<'_, K, V, Balance> {
        self.tree.begin()
    }

    /// Returns the past-the-end cursor.
    pub fn end(&self) -> Cursor<'_, K, V, Balance> {
        self.tree.end()
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.tree.first_key_value()
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.tree.last_key_value()
    }

    fn height_of(&self, link: Link) -> usize {
        link.map_or(0, |node_id| self.tree.arena[node_id].meta.height)
    }

    fn factor_of(&self, node_id: NodeId) -> i8 {
        self.tree.arena[node_id].meta.factor
    }

    /// Exchanges the positions of two nodes along with their balance records.
    fn node_swap(tree: &mut Tree<K, V>, a: NodeId, b: NodeId) {
        tree.node_swap(a, b);
        let balance = tree.arena[a].meta;
        tree.arena[a].meta = tree.arena[b].meta;
        tree.arena[b].meta = balance;
    }

    /// Recomputes height and balance factor of a node from its children.
    fn update_balance(&mut self, node_id: NodeId) {
        let links = self.tree.arena.links(node_id);
        let left_height = self.height_of(links.left);
        let right_height = self.height_of(links.right);
        let meta = &mut self.tree.arena[node_id].meta;
        meta.height = cmp::max(left_height, right_height) + 1;
        meta.factor = (left_height as isize - right_height as isize) as i8;
    }

    /// Rotates left around a node. Returns the node that took its place.
    fn rotate_left(&mut self, node_id: NodeId) -> NodeId {
        let plan = relink::rotate_left(&self.tree.arena, self.tree.root, node_id);
        plan.apply(&mut self.tree.arena, &mut self.tree.root);
        let pivot_id = match self.tree.arena.parent(node_id) {
            Some(pivot_id) => pivot_id,
            None => unreachable!("rotated node {} has no parent", node_id.index()),
        };
        trace!(node = node_id.index(), pivot = pivot_id.index(), "rotate left");
        self.update_balance(node_id);
        self.update_balance(pivot_id);
        pivot_id
    }

    /// Rotates right around a node. Returns the node that took its place.
    fn rotate_right(&mut self, node_id: NodeId) -> NodeId {
        let plan = relink::rotate_right(&self.tree.arena, self.tree.root, node_id);
        plan.apply(&mut self.tree.arena, &mut self.tree.root);
        let pivot_id = match self.tree.arena.parent(node_id) {
            Some(pivot_id) => pivot_id,
            None => unreachable!("rotated node {} has no parent", node_id.index()),
        };
        trace!(node = node_id.index(), pivot = pivot_id.index(), "rotate right");
        self.update_balance(node_id);
        self.update_balance(pivot_id);
        pivot_id
    }

    /// Restores the AVL condition at a node if necessary.
    /// Returns the root of the subtree that now occupies the node's position.
    ///
    /// Children must already satisfy the AVL condition and carry up to date
    /// balance records, which holds after a single insert or removal.
    fn rebalance_node(&mut self, node_id: NodeId) -> NodeId {
        self.update_balance(node_id);
        let factor = self.factor_of(node_id);
        debug_assert!((-2..=2).contains(&factor));
        if factor > 1 {
            let left_id = match self.tree.arena.left(node_id) {
                Some(left_id) => left_id,
                None => unreachable!("left-heavy node {} without left child", node_id.index()),
            };
            // Left-right case
            if self.factor_of(left_id) < 0 {
                self.rotate_left(left_id);
            }
            self.rotate_right(node_id)
        } else if factor < -1 {
            let right_id = match self.tree.arena.right(node_id) {
                Some(right_id) => right_id,
                None => unreachable!("right-heavy node {} without right child", node_id.index()),
            };
            // Right-left case
            if self.factor_of(right_id) > 0 {
                self.rotate_right(right_id);
            }
            self.rotate_left(node_id)
        } else {
            node_id
        }
    }

    /// Rebalances nodes starting from given position up to the root node.
    fn rebalance(&mut self, start_from: Link) {
        if let Some(node_id) = start_from {
            trace!(node = node_id.index(), "rebalance");
        }
        let mut current = start_from;
        while let Some(node_id) = current {
            let subtree_root_id = self.rebalance_node(node_id);
            current = self.tree.arena.parent(subtree_root_id);
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self)
    where
        K: Ord,
    {
        self.tree.check_consistency();
        assert!(self.tree.is_balanced());

        self.tree.preorder(|node_id| {
            let node = &self.tree.arena[node_id];
            let left_height = self.height_of(node.links.left);
            let right_height = self.height_of(node.links.right);

            // Check height
            assert_eq!(node.meta.height, cmp::max(left_height, right_height) + 1);

            // Check AVL condition (nearly balance)
            assert_eq!(
                node.meta.factor as isize,
                left_height as isize - right_height as isize
            );
            assert!((-1..=1).contains(&node.meta.factor));
        });

        // Cached heights against measured height
        assert_eq!(self.height(), self.tree.height());
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_mut(key)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get_key_value(key)
    }

    /// Returns true if the tree contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }

    /// Returns the value for the key, or [`Error::KeyNotFound`](crate::Error::KeyNotFound).
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.at(key)
    }

    /// Returns the value for the key mutably, or [`Error::KeyNotFound`](crate::Error::KeyNotFound).
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.at_mut(key)
    }

    /// Returns a cursor on the entry for the key, if present.
    pub fn find<Q>(&self, key: &Q) -> Option<Cursor<'_, K, V, Balance>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key)
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// If the key was already present its value is overwritten in place and
    /// the old value is returned; the shape of the tree does not change.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.tree.insert_node(key, value) {
            Insertion::Replaced(old) => Some(old),
            Insertion::Attached(node_id) => {
                let parent = self.tree.arena.parent(node_id);
                self.rebalance(parent);
                None
            }
        }
    }

    /// Removes a key from the tree.
    /// Returns the value at the key if the key was previously in the tree.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the tree, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node_id = self.tree.find_node(key)?;
        let unlinked = self.tree.unlink_node(node_id, Self::node_swap);
        self.rebalance(unlinked.parent);
        Some((unlinked.key, unlinked.value))
    }
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.tree, f)
    }
}

impl<K, V, Q> Index<&Q> for AvlTree<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the tree.
    fn index(&self, key: &Q) -> &V {
        &self.tree[key]
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, Balance>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
