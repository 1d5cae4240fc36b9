//! Structural edits computed as plans.
//!
//! A [`Relink`] holds the complete new link triple of every node an edit
//! touches plus the new root link. The planning functions only read the
//! arena; [`Relink::apply`] writes the plan back.

use crate::arena::{Arena, Link, Links, NodeId};

#[derive(Debug)]
pub(crate) struct Relink {
    links: Vec<(NodeId, Links)>,
    root: Link,
}

impl Relink {
    fn new(root: Link) -> Self {
        Self {
            links: Vec::with_capacity(6),
            root,
        }
    }

    // Staged links of a node, loaded from the arena on first access.
    fn entry<K, V, M>(&mut self, arena: &Arena<K, V, M>, id: NodeId) -> &mut Links {
        let pos = match self.links.iter().position(|(staged, _)| *staged == id) {
            Some(pos) => pos,
            None => {
                self.links.push((id, arena.links(id)));
                self.links.len() - 1
            }
        };
        &mut self.links[pos].1
    }

    /// Replaces `old` by `new` in the child slot of `parent`, or in the root link.
    fn replace_child<K, V, M>(
        &mut self,
        arena: &Arena<K, V, M>,
        parent: Link,
        old: NodeId,
        new: Link,
    ) {
        match parent {
            None => self.root = new,
            Some(parent_id) => {
                let links = self.entry(arena, parent_id);
                if links.left == Some(old) {
                    links.left = new;
                } else {
                    debug_assert_eq!(links.right, Some(old));
                    links.right = new;
                }
            }
        }
    }

    /// New links of `id` under this plan, if the plan touches it.
    #[cfg(test)]
    pub(crate) fn links_of(&self, id: NodeId) -> Option<Links> {
        self.links
            .iter()
            .find(|(staged, _)| *staged == id)
            .map(|(_, links)| *links)
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> Link {
        self.root
    }

    pub(crate) fn apply<K, V, M>(self, arena: &mut Arena<K, V, M>, root: &mut Link) {
        for (id, links) in self.links {
            arena[id].links = links;
        }
        *root = self.root;
    }
}

/// Plans the exchange of the tree positions of `a` and `b`.
///
/// Keys, values and augmentations stay with their nodes. Works for any two
/// nodes of the same tree, including a node and its own child and two
/// siblings.
pub(crate) fn swap<K, V, M>(
    arena: &Arena<K, V, M>,
    root: Link,
    a: NodeId,
    b: NodeId,
) -> Relink {
    let mut plan = Relink::new(root);
    if a == b {
        return plan;
    }

    // Every link is remapped through this exchange at most once, so a link
    // between `a` and `b` (adjacent swap) or a parent holding both (siblings)
    // comes out right without special cases.
    let exchange = |link: Link| match link {
        Some(id) if id == a => Some(b),
        Some(id) if id == b => Some(a),
        other => other,
    };
    let remap = |links: Links| Links {
        parent: exchange(links.parent),
        left: exchange(links.left),
        right: exchange(links.right),
    };

    let a_links = arena.links(a);
    let b_links = arena.links(b);

    let mut neighbors: Vec<NodeId> = Vec::with_capacity(6);
    for id in [
        a_links.parent,
        a_links.left,
        a_links.right,
        b_links.parent,
        b_links.left,
        b_links.right,
    ]
    .into_iter()
    .flatten()
    {
        if id != a && id != b && !neighbors.contains(&id) {
            neighbors.push(id);
        }
    }

    *plan.entry(arena, a) = remap(b_links);
    *plan.entry(arena, b) = remap(a_links);
    for id in neighbors {
        let links = plan.entry(arena, id);
        *links = remap(*links);
    }
    plan.root = exchange(root);
    plan
}

/// Plans a left rotation around `id`: its right child takes its place.
pub(crate) fn rotate_left<K, V, M>(arena: &Arena<K, V, M>, root: Link, id: NodeId) -> Relink {
    let mut plan = Relink::new(root);
    let links = arena.links(id);
    let right_id = match links.right {
        Some(right_id) => right_id,
        None => unreachable!(
            "left rotation around node {} without right child",
            id.index()
        ),
    };
    let right_left = arena.left(right_id);

    plan.replace_child(arena, links.parent, id, Some(right_id));
    if let Some(moved) = right_left {
        plan.entry(arena, moved).parent = Some(id);
    }
    {
        let node = plan.entry(arena, id);
        node.right = right_left;
        node.parent = Some(right_id);
    }
    {
        let pivot = plan.entry(arena, right_id);
        pivot.left = Some(id);
        pivot.parent = links.parent;
    }
    plan
}

/// Plans a right rotation around `id`: its left child takes its place.
pub(crate) fn rotate_right<K, V, M>(arena: &Arena<K, V, M>, root: Link, id: NodeId) -> Relink {
    let mut plan = Relink::new(root);
    let links = arena.links(id);
    let left_id = match links.left {
        Some(left_id) => left_id,
        None => unreachable!(
            "right rotation around node {} without left child",
            id.index()
        ),
    };
    let left_right = arena.right(left_id);

    plan.replace_child(arena, links.parent, id, Some(left_id));
    if let Some(moved) = left_right {
        plan.entry(arena, moved).parent = Some(id);
    }
    {
        let node = plan.entry(arena, id);
        node.left = left_right;
        node.parent = Some(left_id);
    }
    {
        let pivot = plan.entry(arena, left_id);
        pivot.right = Some(id);
        pivot.parent = links.parent;
    }
    plan
}
