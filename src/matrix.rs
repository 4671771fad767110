//! Levenshtein rows kept along the current DFS path.
//!
//! Row `r` holds the distances between the first `r` tokens of the path and
//! every prefix of the query, so the stack is exactly the DP matrix for the
//! key spelled by the path. Rows are stored back to back in one buffer.

#[derive(Clone, Debug)]
pub(crate) struct RowStack {
    width: usize,
    cells: Vec<usize>,
}

impl RowStack {
    /// Starts with the base row `[0, 1, .., query_len]`.
    pub(crate) fn new(query_len: usize) -> Self {
        let width = query_len + 1;
        let mut cells = Vec::with_capacity(width * 8);
        cells.extend(0..width);
        Self { width, cells }
    }

    /// Number of rows, base row included.
    #[inline]
    pub(crate) fn rows(&self) -> usize {
        self.cells.len() / self.width
    }

    #[inline]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub(crate) fn row(&self, r: usize) -> &[usize] {
        &self.cells[r * self.width..(r + 1) * self.width]
    }

    #[inline]
    pub(crate) fn cell(&self, r: usize, c: usize) -> usize {
        self.cells[r * self.width + c]
    }

    #[inline]
    pub(crate) fn last(&self) -> &[usize] {
        self.row(self.rows() - 1)
    }

    /// Distance between the whole path and the whole query.
    #[inline]
    pub(crate) fn distance(&self) -> usize {
        self.cells[self.cells.len() - 1]
    }

    /// Lower bound on the distance of any key extending the current path.
    #[inline]
    pub(crate) fn min_in_last(&self) -> usize {
        self.last().iter().copied().min().unwrap_or(0)
    }

    /// Appends the row for extending the path by `token`.
    pub(crate) fn push<K: PartialEq>(&mut self, token: &K, query: &[K]) {
        debug_assert_eq!(query.len() + 1, self.width);
        let prev = self.cells.len() - self.width;
        self.cells.push(self.cells[prev] + 1);
        for i in 1..self.width {
            let substitution_cost = usize::from(query[i - 1] != *token);
            let insertion = self.cells[self.cells.len() - 1] + 1;
            let deletion = self.cells[prev + i] + 1;
            let substitution = self.cells[prev + i - 1] + substitution_cost;
            self.cells.push(insertion.min(deletion).min(substitution));
        }
    }

    pub(crate) fn pop(&mut self) {
        debug_assert!(self.rows() > 1, "base row must stay");
        let len = self.cells.len() - self.width;
        self.cells.truncate(len);
    }
}
