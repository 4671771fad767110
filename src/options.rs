//! Search configuration.

use thiserror::Error;

/// A rule violated by a [`SearchOptionsBuilder`] configuration.
///
/// The messages are stable and name the offending toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchOptionsError {
    #[error("invalid usage: max edit distance must be greater than zero")]
    ZeroMaxEditDistance,

    #[error("invalid usage: max results must be greater than zero")]
    ZeroMaxResults,

    #[error("invalid usage: top-k least edited count must be greater than zero")]
    ZeroTopK,

    #[error("invalid usage: edit ops must not be requested without a max edit distance")]
    EditOpsWithoutMaxEditDistance,

    #[error("invalid usage: top-k least edited must not be requested without a max edit distance")]
    TopKWithoutMaxEditDistance,

    #[error("invalid usage: exact key must not be combined with a max edit distance")]
    ExactKeyWithMaxEditDistance,

    #[error("invalid usage: exact key must not be combined with max results")]
    ExactKeyWithMaxResults,

    #[error("invalid usage: top-k least edited must not be combined with max results")]
    TopKWithMaxResults,
}

/// Validated configuration for [`Trie::search`](crate::Trie::search).
///
/// The default value performs an uncapped prefix search. Anything else is
/// built through [`SearchOptions::builder`], which rejects invalid
/// combinations before a search can run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    exact_key: bool,
    max_edit_distance: Option<usize>,
    edit_ops: bool,
    max_results: Option<usize>,
    top_k_least_edited: Option<usize>,
}

impl SearchOptions {
    pub fn builder() -> SearchOptionsBuilder {
        SearchOptionsBuilder::default()
    }

    #[inline]
    pub fn exact_key(&self) -> bool {
        self.exact_key
    }

    /// `Some` switches the search from prefix mode to edit-distance mode.
    #[inline]
    pub fn max_edit_distance(&self) -> Option<usize> {
        self.max_edit_distance
    }

    #[inline]
    pub fn edit_ops(&self) -> bool {
        self.edit_ops
    }

    #[inline]
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    #[inline]
    pub fn top_k_least_edited(&self) -> Option<usize> {
        self.top_k_least_edited
    }
}

/// Builder for [`SearchOptions`].
///
/// ```
/// use token_trie::{SearchOptions, SearchOptionsError};
///
/// let opts = SearchOptions::builder()
///     .max_edit_distance(2)
///     .edit_ops()
///     .top_k_least_edited(5)
///     .build()
///     .unwrap();
/// assert_eq!(opts.top_k_least_edited(), Some(5));
///
/// let err = SearchOptions::builder().edit_ops().build().unwrap_err();
/// assert_eq!(err, SearchOptionsError::EditOpsWithoutMaxEditDistance);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptionsBuilder {
    exact_key: bool,
    max_edit_distance: Option<usize>,
    edit_ops: bool,
    max_results: Option<usize>,
    top_k_least_edited: Option<usize>,
}

impl SearchOptionsBuilder {
    /// Only return the result whose key equals the query.
    pub fn exact_key(mut self) -> Self {
        self.exact_key = true;
        self
    }

    /// Return stored keys within `distance` token edits of the query instead
    /// of keys that extend it. Larger distances are more lenient and slower.
    pub fn max_edit_distance(mut self, distance: usize) -> Self {
        self.max_edit_distance = Some(distance);
        self
    }

    /// Attach the edit operations that turn each result key into the query.
    pub fn edit_ops(mut self) -> Self {
        self.edit_ops = true;
        self
    }

    /// Stop after `count` results, in traversal order.
    pub fn max_results(mut self, count: usize) -> Self {
        self.max_results = Some(count);
        self
    }

    /// Keep only the `count` results with the lowest edit distance, sorted
    /// ascending. Ties keep the order in which the matches were found.
    pub fn top_k_least_edited(mut self, count: usize) -> Self {
        self.top_k_least_edited = Some(count);
        self
    }

    pub fn build(self) -> Result<SearchOptions, SearchOptionsError> {
        if self.max_edit_distance == Some(0) {
            return Err(SearchOptionsError::ZeroMaxEditDistance);
        }
        if self.max_results == Some(0) {
            return Err(SearchOptionsError::ZeroMaxResults);
        }
        if self.top_k_least_edited == Some(0) {
            return Err(SearchOptionsError::ZeroTopK);
        }

        let edit_distance = self.max_edit_distance.is_some();
        if self.edit_ops && !edit_distance {
            return Err(SearchOptionsError::EditOpsWithoutMaxEditDistance);
        }
        if self.top_k_least_edited.is_some() && !edit_distance {
            return Err(SearchOptionsError::TopKWithoutMaxEditDistance);
        }
        if self.exact_key && edit_distance {
            return Err(SearchOptionsError::ExactKeyWithMaxEditDistance);
        }
        if self.exact_key && self.max_results.is_some() {
            return Err(SearchOptionsError::ExactKeyWithMaxResults);
        }
        if self.top_k_least_edited.is_some() && self.max_results.is_some() {
            return Err(SearchOptionsError::TopKWithMaxResults);
        }

        Ok(SearchOptions {
            exact_key: self.exact_key,
            max_edit_distance: self.max_edit_distance,
            edit_ops: self.edit_ops,
            max_results: self.max_results,
            top_k_least_edited: self.top_k_least_edited,
        })
    }
}
