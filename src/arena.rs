//! Node storage.
//!
//! Nodes live in a single `Vec` and refer to each other by 32-bit index.
//! Each node keeps its children twice: a token -> index map for lookups and
//! an intrusive doubly linked list (first/last child, prev/next sibling) that
//! records first-insertion order. Every traversal follows the list, never the
//! map, so output order is deterministic.

use std::collections::HashMap;
use std::hash::Hash;

/// Index of a node inside a [`NodeArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);
    const NIL: NodeId = NodeId(u32::MAX);

    #[inline]
    fn is_nil(self) -> bool {
        self == Self::NIL
    }

    #[inline]
    fn index(self) -> usize {
        debug_assert!(!self.is_nil());
        self.0 as usize
    }
}

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    /// `None` only for the root.
    token: Option<K>,
    /// `Some` iff a key ends here.
    pub(crate) value: Option<V>,
    children: HashMap<K, NodeId>,
    first_child: NodeId,
    last_child: NodeId,
    prev_sibling: NodeId,
    next_sibling: NodeId,
}

impl<K, V> Node<K, V> {
    fn new(token: Option<K>) -> Self {
        Self {
            token,
            value: None,
            children: HashMap::new(),
            first_child: NodeId::NIL,
            last_child: NodeId::NIL,
            prev_sibling: NodeId::NIL,
            next_sibling: NodeId::NIL,
        }
    }

    #[inline]
    pub(crate) fn token(&self) -> Option<&K> {
        self.token.as_ref()
    }

    #[inline]
    pub(crate) fn is_terminal(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub(crate) fn has_children(&self) -> bool {
        !self.first_child.is_nil()
    }

    #[inline]
    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Node arena with a free list for slots released by pruning.
#[derive(Clone)]
pub(crate) struct NodeArena<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<NodeId>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new(None)],
            free: Vec::new(),
        }
    }

    /// Number of live nodes, root included.
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id.index()]
    }

    /// Children of `id` in first-insertion order.
    pub(crate) fn children(&self, id: NodeId) -> Siblings<'_, K, V> {
        let node = self.node(id);
        Siblings {
            arena: self,
            front: node.first_child,
            back: node.last_child,
        }
    }
}

impl<K: Eq + Hash + Clone, V> NodeArena<K, V> {
    #[inline]
    pub(crate) fn child(&self, parent: NodeId, token: &K) -> Option<NodeId> {
        self.node(parent).children.get(token).copied()
    }

    /// Walks `path` from `from`, returning the landing node if every token exists.
    pub(crate) fn descend(&self, from: NodeId, path: &[K]) -> Option<NodeId> {
        path.iter()
            .try_fold(from, |current, token| self.child(current, token))
    }

    /// Creates a child under `parent` and appends it to the sibling list.
    ///
    /// The caller guarantees `parent` has no child for `token` yet.
    pub(crate) fn append_child(&mut self, parent: NodeId, token: K) -> NodeId {
        debug_assert!(self.child(parent, &token).is_none());
        let id = self.alloc(Node::new(Some(token.clone())));

        let tail = self.node(parent).last_child;
        self.node_mut(id).prev_sibling = tail;
        if tail.is_nil() {
            self.node_mut(parent).first_child = id;
        } else {
            self.node_mut(tail).next_sibling = id;
        }

        let parent_node = self.node_mut(parent);
        parent_node.last_child = id;
        parent_node.children.insert(token, id);
        id
    }

    /// Unlinks a childless `child` from `parent` and releases its slot.
    pub(crate) fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(!self.node(child).has_children());
        let (prev, next) = {
            let node = self.node(child);
            (node.prev_sibling, node.next_sibling)
        };

        if prev.is_nil() {
            self.node_mut(parent).first_child = next;
        } else {
            self.node_mut(prev).next_sibling = next;
        }
        if next.is_nil() {
            self.node_mut(parent).last_child = prev;
        } else {
            self.node_mut(next).prev_sibling = prev;
        }

        if let Some(token) = self.node_mut(child).token.take() {
            let removed = self.node_mut(parent).children.remove(&token);
            debug_assert_eq!(removed, Some(child));
        }
        self.release(child);
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            *self.node_mut(id) = node;
            return id;
        }
        let raw = u32::try_from(self.nodes.len())
            .ok()
            .filter(|&raw| raw != NodeId::NIL.0)
            .expect("node arena exhausted the 32-bit index space");
        self.nodes.push(node);
        NodeId(raw)
    }

    fn release(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.value = None;
        node.children.clear();
        node.first_child = NodeId::NIL;
        node.last_child = NodeId::NIL;
        node.prev_sibling = NodeId::NIL;
        node.next_sibling = NodeId::NIL;
        self.free.push(id);
    }
}

/// Iterator over a node's children, in first-insertion order from the front.
pub(crate) struct Siblings<'a, K, V> {
    arena: &'a NodeArena<K, V>,
    front: NodeId,
    back: NodeId,
}

impl<K, V> Iterator for Siblings<'_, K, V> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.front.is_nil() {
            return None;
        }
        let id = self.front;
        if id == self.back {
            self.front = NodeId::NIL;
            self.back = NodeId::NIL;
        } else {
            self.front = self.arena.node(id).next_sibling;
        }
        Some(id)
    }
}

impl<K, V> DoubleEndedIterator for Siblings<'_, K, V> {
    fn next_back(&mut self) -> Option<NodeId> {
        if self.back.is_nil() {
            return None;
        }
        let id = self.back;
        if id == self.front {
            self.front = NodeId::NIL;
            self.back = NodeId::NIL;
        } else {
            self.back = self.arena.node(id).prev_sibling;
        }
        Some(id)
    }
}
