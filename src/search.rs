//! Prefix and edit-distance search.

use std::hash::Hash;
use std::ops::ControlFlow;

use tracing::debug;

use crate::arena::{NodeArena, NodeId};
use crate::edit_ops::{backtrace, EditOp};
use crate::matrix::RowStack;
use crate::options::SearchOptions;
use crate::top_k::TopK;
use crate::{Terminals, Trie};

/// A key found by [`Trie::search`], copied out of the trie.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchResult<K, V> {
    /// The key as it was put into the trie.
    pub key: Vec<K>,
    /// The value stored under `key`.
    pub value: V,
    /// Number of token edits turning `key` into the searched key. Always 0
    /// for prefix and exact searches.
    pub edit_distance: usize,
    /// Present only when edit operations were requested.
    pub edit_ops: Option<Vec<EditOp<K>>>,
}

/// Ordered results of one search. Never absent, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SearchResults<K, V> {
    results: Vec<SearchResult<K, V>>,
}

impl<K, V> SearchResults<K, V> {
    pub(crate) fn new(results: Vec<SearchResult<K, V>>) -> Self {
        Self { results }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn as_slice(&self) -> &[SearchResult<K, V>] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult<K, V>> {
        self.results.iter()
    }

    pub fn into_vec(self) -> Vec<SearchResult<K, V>> {
        self.results
    }
}

impl<K, V> IntoIterator for SearchResults<K, V> {
    type Item = SearchResult<K, V>;
    type IntoIter = std::vec::IntoIter<SearchResult<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a SearchResults<K, V> {
    type Item = &'a SearchResult<K, V>;
    type IntoIter = std::slice::Iter<'a, SearchResult<K, V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Trie<K, V> {
    /// Searches the trie for `key`.
    ///
    /// Without options this is a prefix search: every stored key starting
    /// with `key`, in the order the keys' nodes were first created. See
    /// [`SearchOptions`] for exact and edit-distance modes.
    ///
    /// ```
    /// use token_trie::{SearchOptions, Trie};
    ///
    /// let mut trie = Trie::new();
    /// trie.put(&["the", "green", "tree"], 4);
    /// trie.put(&["an", "apple", "tree"], 5);
    ///
    /// let opts = SearchOptions::builder().max_edit_distance(1).build().unwrap();
    /// let results = trie.search(&["the", "tree"], &opts);
    /// assert_eq!(results.len(), 1);
    /// assert_eq!(results.as_slice()[0].value, 4);
    /// assert_eq!(results.as_slice()[0].edit_distance, 1);
    /// ```
    pub fn search(&self, key: &[K], options: &SearchOptions) -> SearchResults<K, V> {
        let results = match options.max_edit_distance() {
            Some(max_distance) => self.search_edit_distance(key, max_distance, options),
            None => self.search_prefix(key, options),
        };
        debug!(
            query_len = key.len(),
            ?options,
            results = results.len(),
            "search"
        );
        SearchResults::new(results)
    }

    /// Every stored key whose value satisfies `predicate`, in insertion order.
    pub fn filter(&self, mut predicate: impl FnMut(&V) -> bool) -> SearchResults<K, V> {
        let results: Vec<_> = Terminals::new(&self.nodes, NodeId::ROOT, Vec::new())
            .filter_map(|(key, node)| {
                node.value()
                    .filter(|value| predicate(value))
                    .map(|value| SearchResult::exact(key, value.clone()))
            })
            .collect();
        debug!(results = results.len(), "filter");
        SearchResults::new(results)
    }

    fn search_prefix(&self, key: &[K], options: &SearchOptions) -> Vec<SearchResult<K, V>> {
        let Some(start) = self.nodes.descend(NodeId::ROOT, key) else {
            return Vec::new();
        };

        if options.exact_key() {
            return self
                .nodes
                .node(start)
                .value
                .as_ref()
                .map(|value| vec![SearchResult::exact(key.to_vec(), value.clone())])
                .unwrap_or_default();
        }

        let matches = Terminals::new(&self.nodes, start, key.to_vec()).filter_map(|(key, node)| {
            node.value()
                .map(|value| SearchResult::exact(key, value.clone()))
        });
        match options.max_results() {
            Some(limit) => matches.take(limit).collect(),
            None => matches.collect(),
        }
    }

    fn search_edit_distance(
        &self,
        key: &[K],
        max_distance: usize,
        options: &SearchOptions,
    ) -> Vec<SearchResult<K, V>> {
        let sink = match options.top_k_least_edited() {
            Some(k) => Sink::TopK(TopK::new(k)),
            None => Sink::Collect {
                results: Vec::new(),
                limit: options.max_results(),
            },
        };
        let mut search = FuzzySearch {
            nodes: &self.nodes,
            query: key,
            max_distance,
            with_edit_ops: options.edit_ops(),
            rows: RowStack::new(key.len()),
            path: Vec::with_capacity(key.len().max(1)),
            sink,
        };
        // Breaking only signals that `max_results` was reached.
        let _ = search.visit_children(NodeId::ROOT);

        match search.sink {
            Sink::Collect { results, .. } => results,
            Sink::TopK(top) => top.into_sorted_vec(),
        }
    }
}

impl<K, V> SearchResult<K, V> {
    fn exact(key: Vec<K>, value: V) -> Self {
        Self {
            key,
            value,
            edit_distance: 0,
            edit_ops: None,
        }
    }
}

enum Sink<K, V> {
    /// Unranked, in traversal order; stops the walk once `limit` is reached.
    Collect {
        results: Vec<SearchResult<K, V>>,
        limit: Option<usize>,
    },
    TopK(TopK<SearchResult<K, V>>),
}

/// Depth-first walk of the whole trie that carries one Levenshtein row per
/// level of the current path.
struct FuzzySearch<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    query: &'a [K],
    max_distance: usize,
    with_edit_ops: bool,
    rows: RowStack,
    /// Tokens from the root to the current node.
    path: Vec<K>,
    sink: Sink<K, V>,
}

impl<K: Eq + Hash + Clone, V: Clone> FuzzySearch<'_, K, V> {
    fn visit(&mut self, id: NodeId) -> ControlFlow<()> {
        let nodes = self.nodes;
        let Some(token) = nodes.node(id).token() else {
            return ControlFlow::Continue(());
        };
        self.rows.push(token, self.query);
        self.path.push(token.clone());

        let flow = self.visit_pushed(id);

        self.path.pop();
        self.rows.pop();
        flow
    }

    fn visit_pushed(&mut self, id: NodeId) -> ControlFlow<()> {
        let nodes = self.nodes;
        let distance = self.rows.distance();
        if distance <= self.max_distance {
            if let Some(value) = nodes.node(id).value.as_ref() {
                self.emit(distance, value)?;
            }
        }

        if self.rows.min_in_last() > self.max_distance {
            return ControlFlow::Continue(());
        }
        self.visit_children(id)
    }

    /// Visits the child matching the query token at this depth first, then
    /// the others in insertion order.
    fn visit_children(&mut self, id: NodeId) -> ControlFlow<()> {
        let nodes = self.nodes;
        let prioritized = self
            .query
            .get(self.path.len())
            .and_then(|token| nodes.child(id, token));

        if let Some(child) = prioritized {
            self.visit(child)?;
        }
        for child in nodes.children(id) {
            if Some(child) == prioritized {
                continue;
            }
            self.visit(child)?;
        }
        ControlFlow::Continue(())
    }

    fn emit(&mut self, distance: usize, value: &V) -> ControlFlow<()> {
        let Self {
            query,
            with_edit_ops,
            rows,
            path,
            sink,
            ..
        } = self;
        let make = || SearchResult {
            key: path.clone(),
            value: value.clone(),
            edit_distance: distance,
            edit_ops: with_edit_ops.then(|| backtrace(rows, path, query)),
        };

        match sink {
            Sink::Collect { results, limit } => {
                results.push(make());
                if Some(results.len()) == *limit {
                    return ControlFlow::Break(());
                }
            }
            Sink::TopK(top) => {
                top.offer(distance, make);
            }
        }
        ControlFlow::Continue(())
    }
}
