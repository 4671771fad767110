//! # token-trie
//!
//! An in-memory trie over token sequences (characters, words, ...) with
//! prefix search and edit-distance ("fuzzy") search.
//!
//! Edit-distance search walks the trie once, carrying one Levenshtein row
//! per level of the current path, so keys sharing a prefix share the work.
//! Subtrees whose row can no longer stay within the distance budget are
//! skipped. Results can be capped, ranked by distance, and explained by the
//! edit operations that turn each stored key into the query.
//!
//! ## Example
//!
//! ```rust
//! use token_trie::{EditOp, SearchOptions, Trie};
//!
//! let mut trie = Trie::new();
//! trie.put(&["the"], 1);
//! trie.put(&["the", "quick", "brown", "fox"], 2);
//! trie.put(&["the", "quick", "sports", "car"], 3);
//! trie.put(&["the", "green", "tree"], 4);
//! trie.put(&["an", "apple", "tree"], 5);
//! trie.put(&["an", "umbrella"], 6);
//!
//! // Prefix search.
//! let results = trie.search(&["the", "quick"], &SearchOptions::default());
//! let values: Vec<i32> = results.iter().map(|r| r.value).collect();
//! assert_eq!(values, vec![2, 3]);
//!
//! // Keys at most two token edits away from [the, tree].
//! let opts = SearchOptions::builder()
//!     .max_edit_distance(2)
//!     .edit_ops()
//!     .build()
//!     .unwrap();
//! let results = trie.search(&["the", "tree"], &opts);
//! let apple = results.iter().find(|r| r.value == 5).unwrap();
//! assert_eq!(apple.edit_distance, 2);
//! assert_eq!(
//!     apple.edit_ops.as_deref(),
//!     Some(&[
//!         EditOp::Delete("an"),
//!         EditOp::Replace("apple", "the"),
//!         EditOp::NoEdit("tree"),
//!     ][..])
//! );
//! ```
//!
//! The trie does no internal locking. Mutation takes `&mut self`; share it
//! across threads behind a lock of your choice.

#![forbid(unsafe_code)]

mod arena;
mod display;
mod edit_ops;
mod matrix;
mod options;
mod search;
mod top_k;

use std::fmt;
use std::hash::Hash;

use tracing::trace;

use arena::{NodeArena, NodeId, Siblings};

pub use edit_ops::EditOp;
pub use options::{SearchOptions, SearchOptionsBuilder, SearchOptionsError};
pub use search::{SearchResult, SearchResults};

// =============================================================================
// Trie
// =============================================================================

/// A trie keyed by token sequences, holding one value per key.
///
/// Children are kept in the order they were first created, and every
/// traversal (search, [`walk`](Trie::walk), [`iter`](Trie::iter),
/// [`filter`](Trie::filter), `Display`) follows that order.
#[derive(Clone)]
pub struct Trie<K, V> {
    nodes: NodeArena<K, V>,
    /// Number of terminal nodes.
    count: usize,
}

impl<K, V> Trie<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            count: 0,
        }
    }

    /// Number of keys stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of nodes below the root, terminal or not.
    pub fn node_count(&self) -> usize {
        self.nodes.live() - 1
    }

    /// The root node. It carries no token and is never terminal.
    pub fn root(&self) -> NodeRef<'_, K, V> {
        NodeRef {
            nodes: &self.nodes,
            id: NodeId::ROOT,
        }
    }
}

impl<K: Eq + Hash + Clone, V> Trie<K, V> {
    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// Returns whether `key` was already present. An empty key is ignored
    /// and reported as absent.
    pub fn put(&mut self, key: &[K], value: V) -> bool {
        if key.is_empty() {
            trace!("put: ignoring empty key");
            return false;
        }

        let mut current = NodeId::ROOT;
        let mut created = 0usize;
        for token in key {
            current = match self.nodes.child(current, token) {
                Some(child) => child,
                None => {
                    created += 1;
                    self.nodes.append_child(current, token.clone())
                }
            };
        }

        let existed = self.nodes.node_mut(current).value.replace(value).is_some();
        if !existed {
            self.count += 1;
        }
        trace!(key_len = key.len(), created, existed, "put");
        existed
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// Ancestors left without children and without a value of their own are
    /// removed as well, up to the first one that still holds something.
    pub fn delete(&mut self, key: &[K]) -> Option<V> {
        let mut path: Vec<NodeId> = Vec::with_capacity(key.len() + 1);
        path.push(NodeId::ROOT);
        let mut current = NodeId::ROOT;
        for token in key {
            current = self.nodes.child(current, token)?;
            path.push(current);
        }

        let value = self.nodes.node_mut(current).value.take()?;
        self.count -= 1;

        let mut pruned = 0usize;
        while path.len() > 1 {
            let node_id = path.pop().expect("path holds at least two nodes");
            let node = self.nodes.node(node_id);
            if node.is_terminal() || node.has_children() {
                break;
            }
            let parent = *path.last().expect("path still holds the root");
            self.nodes.remove_child(parent, node_id);
            pruned += 1;
        }
        trace!(key_len = key.len(), pruned, "delete");
        Some(value)
    }

    pub fn get(&self, key: &[K]) -> Option<&V> {
        let id = self.nodes.descend(NodeId::ROOT, key)?;
        self.nodes.node(id).value.as_ref()
    }

    pub fn get_mut(&mut self, key: &[K]) -> Option<&mut V> {
        let id = self.nodes.descend(NodeId::ROOT, key)?;
        self.nodes.node_mut(id).value.as_mut()
    }

    pub fn contains_key(&self, key: &[K]) -> bool {
        self.get(key).is_some()
    }

    /// Overwrites the value of an existing key.
    ///
    /// Does nothing (and returns `false`) when `key` is not stored, even if
    /// its path exists as the prefix of another key.
    pub fn set_value(&mut self, key: &[K], value: V) -> bool {
        match self.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Calls `visitor` for every key starting with `prefix`, in insertion
    /// order, and stops at the first error, which is returned unchanged.
    ///
    /// A prefix that is not in the trie visits nothing.
    pub fn walk<'a, E, F>(&'a self, prefix: &[K], mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&[K], NodeRef<'a, K, V>) -> Result<(), E>,
    {
        let Some(start) = self.nodes.descend(NodeId::ROOT, prefix) else {
            return Ok(());
        };
        for (key, node) in Terminals::new(&self.nodes, start, prefix.to_vec()) {
            visitor(&key, node)?;
        }
        Ok(())
    }

    /// All keys and values, in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: Terminals::new(&self.nodes, NodeId::ROOT, Vec::new()),
        }
    }
}

impl<K, V> Default for Trie<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug + Eq + Hash + Clone, V: fmt::Debug> fmt::Debug for Trie<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Node handles
// =============================================================================

/// A borrowed view of one trie node.
pub struct NodeRef<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    id: NodeId,
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<'a, K, V> NodeRef<'a, K, V> {
    /// The token leading to this node; `None` for the root.
    pub fn token(&self) -> Option<&'a K> {
        self.nodes.node(self.id).token()
    }

    pub fn is_root(&self) -> bool {
        self.id == NodeId::ROOT
    }

    /// Whether a key ends at this node.
    pub fn is_terminal(&self) -> bool {
        self.nodes.node(self.id).is_terminal()
    }

    /// The stored value; `None` unless the node is terminal.
    pub fn value(&self) -> Option<&'a V> {
        self.nodes.node(self.id).value.as_ref()
    }

    /// Children in the order they were first created.
    pub fn children(&self) -> Children<'a, K, V> {
        Children {
            nodes: self.nodes,
            inner: self.nodes.children(self.id),
        }
    }

    pub fn child_count(&self) -> usize {
        self.nodes.node(self.id).child_count()
    }
}

impl<'a, K: Eq + Hash + Clone, V> NodeRef<'a, K, V> {
    pub fn child(&self, token: &K) -> Option<NodeRef<'a, K, V>> {
        self.nodes.child(self.id, token).map(|id| NodeRef {
            nodes: self.nodes,
            id,
        })
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("token", &self.token())
            .field("value", &self.value())
            .field("children", &self.child_count())
            .finish()
    }
}

/// Iterator over a node's children. See [`NodeRef::children`].
pub struct Children<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    inner: Siblings<'a, K, V>,
}

impl<'a, K, V> Iterator for Children<'a, K, V> {
    type Item = NodeRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.inner.next()?;
        Some(NodeRef {
            nodes: self.nodes,
            id,
        })
    }
}

impl<K, V> DoubleEndedIterator for Children<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.inner.next_back()?;
        Some(NodeRef {
            nodes: self.nodes,
            id,
        })
    }
}

// =============================================================================
// Ordered traversal
// =============================================================================

/// Pre-order walk over the terminal nodes below `start`, children in
/// insertion order, yielding each node with its full key.
pub(crate) struct Terminals<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    /// (node, key length once the node's token is appended)
    stack: Vec<(NodeId, usize)>,
    key: Vec<K>,
    /// Length of the prefix leading to `start`.
    base: usize,
}

impl<'a, K, V> Terminals<'a, K, V> {
    pub(crate) fn new(nodes: &'a NodeArena<K, V>, start: NodeId, prefix: Vec<K>) -> Self {
        let base = prefix.len();
        Self {
            nodes,
            stack: vec![(start, base)],
            key: prefix,
            base,
        }
    }
}

impl<'a, K: Clone, V> Iterator for Terminals<'a, K, V> {
    type Item = (Vec<K>, NodeRef<'a, K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        while let Some((id, depth)) = self.stack.pop() {
            let node = nodes.node(id);
            if depth > self.base {
                self.key.truncate(depth - 1);
                if let Some(token) = node.token() {
                    self.key.push(token.clone());
                }
            }

            self.stack
                .extend(nodes.children(id).rev().map(|child| (child, depth + 1)));

            if node.is_terminal() {
                let node = NodeRef { nodes, id };
                return Some((self.key.clone(), node));
            }
        }
        None
    }
}

/// Iterator over `(key, value)` pairs. See [`Trie::iter`].
pub struct Iter<'a, K, V> {
    inner: Terminals<'a, K, V>,
}

impl<'a, K: Clone, V> Iterator for Iter<'a, K, V> {
    type Item = (Vec<K>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (key, node) = self.inner.next()?;
            if let Some(value) = node.value() {
                return Some((key, value));
            }
        }
    }
}


#[cfg(test)]
mod proptests;
