//! Slot storage for tree nodes.
//!
//! Nodes never move once allocated; links between them are plain indices.
//! A vacated slot is recycled by the next allocation.

use std::ops::{Index, IndexMut};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

pub(crate) type Link = Option<NodeId>;

/// The three structural links of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub parent: Link,
    pub left: Link,
    pub right: Link,
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V, M> {
    pub key: K,
    pub value: V,
    pub links: Links,
    pub meta: M,
}

#[derive(Clone, Debug)]
pub(crate) struct Arena<K, V, M> {
    slots: Vec<Option<Node<K, V, M>>>,
    free: Vec<usize>,
}

impl<K, V, M> Arena<K, V, M> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, parent: Link, key: K, value: V, meta: M) -> NodeId {
        let node = Node {
            key,
            value,
            links: Links {
                parent,
                left: None,
                right: None,
            },
            meta,
        };
        match self.free.pop() {
            Some(index) => {
                debug_assert!(self.slots[index].is_none());
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V, M> {
        match self.slots[id.0].take() {
            Some(node) => {
                self.free.push(id.0);
                node
            }
            None => unreachable!("double free of node slot {}", id.0),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Number of slots ever allocated, vacant ones included.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn links(&self, id: NodeId) -> Links {
        self[id].links
    }

    pub(crate) fn parent(&self, id: NodeId) -> Link {
        self[id].links.parent
    }

    pub(crate) fn left(&self, id: NodeId) -> Link {
        self[id].links.left
    }

    pub(crate) fn right(&self, id: NodeId) -> Link {
        self[id].links.right
    }
}

impl<K, V, M> Index<NodeId> for Arena<K, V, M> {
    type Output = Node<K, V, M>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match &self.slots[id.0] {
            Some(node) => node,
            None => unreachable!("dangling link to node slot {}", id.0),
        }
    }
}

impl<K, V, M> IndexMut<NodeId> for Arena<K, V, M> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => unreachable!("dangling link to node slot {}", id.0),
        }
    }
}
