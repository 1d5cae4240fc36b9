//! An ordered map implemented with an unbalanced binary search tree.

use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FromIterator;
use std::mem;
use std::ops::{ControlFlow, Index};

use tracing::{debug, trace};

use crate::arena::{Arena, Link, NodeId};
use crate::error::{Error, Result};
use crate::iter::{Cursor, Iter, Keys, Values};
use crate::relink;

/// An ordered map implemented with an unbalanced binary search tree.
///
/// Nodes carry an augmentation `M`, which is `()` for the plain tree. Trees
/// with other augmentations are only handed out read-only, e.g. by
/// [`AvlTree::as_tree`](crate::AvlTree::as_tree).
///
/// ```
/// use bstree::BinarySearchTree;
/// let mut tree = BinarySearchTree::new();
/// tree.insert(2, "two");
/// tree.insert(1, "one");
/// tree.insert(3, "three");
/// assert_eq!(tree.get(&1), Some(&"one"));
/// assert_eq!(tree.remove(&1), Some("one"));
/// assert!(tree.get(&1).is_none());
/// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [2, 3]);
/// ```
#[derive(Clone)]
pub struct BinarySearchTree<K, V, M = ()> {
    pub(crate) arena: Arena<K, V, M>,
    pub(crate) root: Link,
    num_nodes: usize,
}

/// Outcome of [`BinarySearchTree::insert_node`].
pub(crate) enum Insertion<V> {
    /// The key was present; holds the previous value.
    Replaced(V),
    /// A new node was attached.
    Attached(NodeId),
}

/// A node taken out of the tree.
pub(crate) struct Unlinked<K, V> {
    pub key: K,
    pub value: V,
    /// Parent of the position the node was spliced out of.
    pub parent: Link,
}

enum InsertPos {
    Occupied(NodeId),
    Vacant { parent: Link, left: bool },
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl<K, V> BinarySearchTree<K, V> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self::empty()
    }
}

impl<K: Ord, V> BinarySearchTree<K, V> {
    /// Inserts a key-value pair into the tree.
    ///
    /// If the key was already present its value is overwritten in place and
    /// the old value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.insert_node(key, value) {
            Insertion::Replaced(old) => Some(old),
            Insertion::Attached(_) => None,
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
        let node_id = self.find_node(key)?;
        let unlinked = self.unlink_node(node_id, Self::node_swap);
        Some((unlinked.key, unlinked.value))
    }
}

impl<K, V, M> BinarySearchTree<K, V, M> {
    pub(crate) fn empty() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.measure_height(false).unwrap_or(0)
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        debug!(num_nodes = self.num_nodes, "clear tree");
        self.arena.clear();
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns true if at every node the heights of the two subtrees differ
    /// by at most one.
    ///
    /// Walks the whole tree once and stops at the first unbalanced node.
    pub fn is_balanced(&self) -> bool {
        self.measure_height(true).is_some()
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V, M> {
        Iter::new(self)
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V, M> {
        Keys::new(self.iter())
    }

    /// Gets an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V, M> {
        Values::new(self.iter())
    }

    /// Returns a cursor on the entry with the smallest key,
    /// or the end cursor if the tree is empty.
    pub fn begin(&self) -> Cursor<'_, K, V, M> {
        Cursor::new(self, self.root.map(|root_id| self.leftmost(root_id)))
    }

    /// Returns the past-the-end cursor.
    pub fn end(&self) -> Cursor<'_, K, V, M> {
        Cursor::new(self, None)
    }

    /// Returns the first key-value pair in the tree.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.begin().key_value()
    }

    /// Returns the last key-value pair in the tree.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let node_id = self.rightmost(self.root?);
        let node = &self.arena[node_id];
        Some((&node.key, &node.value))
    }

    pub(crate) fn leftmost(&self, mut node_id: NodeId) -> NodeId {
        while let Some(left_id) = self.arena.left(node_id) {
            node_id = left_id;
        }
        node_id
    }

    pub(crate) fn rightmost(&self, mut node_id: NodeId) -> NodeId {
        while let Some(right_id) = self.arena.right(node_id) {
            node_id = right_id;
        }
        node_id
    }

    /// Returns the in-order neighbour before the given node.
    pub(crate) fn predecessor(&self, node_id: NodeId) -> Link {
        if let Some(left_id) = self.arena.left(node_id) {
            return Some(self.rightmost(left_id));
        }
        let mut current = node_id;
        let mut parent = self.arena.parent(current);
        while let Some(parent_id) = parent {
            if self.arena.left(parent_id) != Some(current) {
                break;
            }
            current = parent_id;
            parent = self.arena.parent(parent_id);
        }
        parent
    }

    /// Returns the in-order neighbour after the given node.
    pub(crate) fn successor(&self, node_id: NodeId) -> Link {
        if let Some(right_id) = self.arena.right(node_id) {
            return Some(self.leftmost(right_id));
        }
        let mut current = node_id;
        let mut parent = self.arena.parent(current);
        while let Some(parent_id) = parent {
            if self.arena.right(parent_id) != Some(current) {
                break;
            }
            current = parent_id;
            parent = self.arena.parent(parent_id);
        }
        parent
    }

    /// Exchanges the positions of two nodes in the tree.
    /// Keys, values and augmentations stay with their nodes.
    pub(crate) fn node_swap(&mut self, a: NodeId, b: NodeId) {
        trace!(a = a.index(), b = b.index(), "swap node positions");
        relink::swap(&self.arena, self.root, a, b).apply(&mut self.arena, &mut self.root);
    }

    /// Takes a node with at most one child out of the tree.
    ///
    /// A node with two children is first moved into the position of its
    /// in-order predecessor with `swap`, which must exchange the positions of
    /// the two nodes it is given.
    pub(crate) fn unlink_node<F>(&mut self, node_id: NodeId, mut swap: F) -> Unlinked<K, V>
    where
        F: FnMut(&mut Self, NodeId, NodeId),
    {
        let links = self.arena.links(node_id);
        if let (Some(left_id), Some(_)) = (links.left, links.right) {
            let predecessor_id = self.rightmost(left_id);
            swap(self, node_id, predecessor_id);
        }

        let links = self.arena.links(node_id);
        debug_assert!(links.left.is_none() || links.right.is_none());
        let child = links.left.or(links.right);
        if let Some(child_id) = child {
            self.arena[child_id].links.parent = links.parent;
        }
        match links.parent {
            None => self.root = child,
            Some(parent_id) => {
                let parent_links = &mut self.arena[parent_id].links;
                if parent_links.left == Some(node_id) {
                    parent_links.left = child;
                } else {
                    parent_links.right = child;
                }
            }
        }

        debug_assert!(self.num_nodes >= 1);
        self.num_nodes -= 1;
        let node = self.arena.free(node_id);
        Unlinked {
            key: node.key,
            value: node.value,
            parent: links.parent,
        }
    }

    // Height of the whole tree, or `None` if `balanced` is requested and some
    // node has subtrees differing by more than one.
    fn measure_height(&self, balanced: bool) -> Option<usize> {
        let mut heights = vec![0; self.arena.capacity()];
        let height_of = |heights: &[usize], link: Link| link.map_or(0, |id| heights[id.index()]);
        let flow = self.traverse(
            |_| ControlFlow::Continue(()),
            |_| ControlFlow::Continue(()),
            |node_id| {
                let links = self.arena.links(node_id);
                let left_height = height_of(&heights, links.left);
                let right_height = height_of(&heights, links.right);
                if balanced && left_height.abs_diff(right_height) > 1 {
                    return ControlFlow::Break(());
                }
                heights[node_id.index()] = cmp::max(left_height, right_height) + 1;
                ControlFlow::Continue(())
            },
        );
        match flow {
            ControlFlow::Break(()) => None,
            ControlFlow::Continue(()) => Some(height_of(&heights, self.root)),
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self)
    where
        K: Ord,
    {
        // Check root link
        if let Some(root_id) = self.root {
            assert!(self.arena.parent(root_id).is_none());
        }

        // Check tree nodes
        let mut num_nodes = 0;
        self.preorder(|node_id| {
            let node = &self.arena[node_id];

            // Check link for left child node
            if let Some(left_id) = node.links.left {
                assert_eq!(self.arena.parent(left_id), Some(node_id));
                assert!(self.arena[left_id].key < node.key);
            }

            // Check link for right child node
            if let Some(right_id) = node.links.right {
                assert_eq!(self.arena.parent(right_id), Some(node_id));
                assert!(self.arena[right_id].key > node.key);
            }

            num_nodes += 1;
        });

        // Check number of nodes
        assert_eq!(num_nodes, self.num_nodes);

        // Check in-order sequence
        let keys: Vec<&K> = self.keys().collect();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub(crate) fn preorder<F: FnMut(NodeId)>(&self, mut f: F) {
        let _ = self.traverse::<(), _, _, _>(
            |node_id| {
                f(node_id);
                ControlFlow::Continue(())
            },
            |_| ControlFlow::Continue(()),
            |_| ControlFlow::Continue(()),
        );
    }

    fn traverse<B, Pre, In, Post>(
        &self,
        mut preorder: Pre,
        mut inorder: In,
        mut postorder: Post,
    ) -> ControlFlow<B>
    where
        Pre: FnMut(NodeId) -> ControlFlow<B>,
        In: FnMut(NodeId) -> ControlFlow<B>,
        Post: FnMut(NodeId) -> ControlFlow<B>,
    {
        if let Some(mut node_id) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        if let ControlFlow::Break(b) = preorder(node_id) {
                            return ControlFlow::Break(b);
                        }
                        if let Some(left_id) = self.arena.left(node_id) {
                            node_id = left_id;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        if let ControlFlow::Break(b) = inorder(node_id) {
                            return ControlFlow::Break(b);
                        }
                        if let Some(right_id) = self.arena.right(node_id) {
                            node_id = right_id;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        if let ControlFlow::Break(b) = postorder(node_id) {
                            return ControlFlow::Break(b);
                        }
                        match self.arena.parent(node_id) {
                            Some(parent_id) => {
                                if self.arena.left(parent_id) == Some(node_id) {
                                    dir = Direction::FromLeft;
                                } else {
                                    dir = Direction::FromRight;
                                }
                                node_id = parent_id;
                            }
                            None => break,
                        }
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }
}

impl<K: Ord, V, M> BinarySearchTree<K, V, M> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|node_id| &self.arena[node_id].value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node_id = self.find_node(key)?;
        Some(&mut self.arena[node_id].value)
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|node_id| {
            let node = &self.arena[node_id];
            (&node.key, &node.value)
        })
    }

    /// Returns true if the tree contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Returns the value for the key, or [`Error::KeyNotFound`].
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the value for the key mutably, or [`Error::KeyNotFound`].
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns a cursor on the entry for the key, if present.
    pub fn find<Q>(&self, key: &Q) -> Option<Cursor<'_, K, V, M>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|node_id| Cursor::new(self, Some(node_id)))
    }

    pub(crate) fn find_node<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(node_id) = current {
            current = match key.cmp(self.arena[node_id].key.borrow()) {
                Ordering::Equal => break,
                Ordering::Less => self.arena.left(node_id),
                Ordering::Greater => self.arena.right(node_id),
            }
        }
        current
    }

    fn find_insert_pos(&self, key: &K) -> InsertPos {
        let mut parent: Link = None;
        let mut left = false;
        let mut current = self.root;
        while let Some(node_id) = current {
            parent = current;
            current = match key.cmp(&self.arena[node_id].key) {
                Ordering::Equal => return InsertPos::Occupied(node_id),
                Ordering::Less => {
                    left = true;
                    self.arena.left(node_id)
                }
                Ordering::Greater => {
                    left = false;
                    self.arena.right(node_id)
                }
            }
        }
        InsertPos::Vacant { parent, left }
    }

    /// Overwrites the value of an existing key, or attaches a new leaf.
    pub(crate) fn insert_node(&mut self, key: K, value: V) -> Insertion<V>
    where
        M: Default,
    {
        match self.find_insert_pos(&key) {
            InsertPos::Occupied(node_id) => {
                Insertion::Replaced(mem::replace(&mut self.arena[node_id].value, value))
            }
            InsertPos::Vacant { parent, left } => {
                let node_id = self.arena.alloc(parent, key, value, M::default());
                match parent {
                    None => self.root = Some(node_id),
                    Some(parent_id) if left => self.arena[parent_id].links.left = Some(node_id),
                    Some(parent_id) => self.arena[parent_id].links.right = Some(node_id),
                }
                self.num_nodes += 1;
                Insertion::Attached(node_id)
            }
        }
    }
}

impl<K, V, M> Default for BinarySearchTree<K, V, M> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, M> fmt::Debug for BinarySearchTree<K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, M> PartialEq for BinarySearchTree<K, V, M> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, M> Eq for BinarySearchTree<K, V, M> {}

impl<K, V, M, Q> Index<&Q> for BinarySearchTree<K, V, M>
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
        match self.get(key) {
            Some(value) => value,
            None => panic!("{}", Error::KeyNotFound),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BinarySearchTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for BinarySearchTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, M> IntoIterator for &'a BinarySearchTree<K, V, M> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
