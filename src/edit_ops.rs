//! Edit operations explaining an edit-distance match.

use crate::matrix::RowStack;

/// One alignment step from a stored key towards the searched key.
///
/// Applying the operations of a result in order to its key yields the
/// searched key: keep `NoEdit` tokens, add `Insert` tokens, skip `Delete`
/// tokens and swap `Replace(from, to)` for `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EditOp<K> {
    /// Keep the stored token.
    NoEdit(K),
    /// Insert a token of the searched key.
    Insert(K),
    /// Drop the stored token.
    Delete(K),
    /// Replace the stored token (first) with a token of the searched key (second).
    Replace(K, K),
}

impl<K> EditOp<K> {
    /// Whether this step costs one edit.
    pub fn is_edit(&self) -> bool {
        !matches!(self, EditOp::NoEdit(_))
    }
}

/// Backtraces `rows` (the matrix for `stored` against `query`) from the
/// bottom-right cell.
///
/// Ties prefer substitution, then deletion, then insertion.
pub(crate) fn backtrace<K: Clone>(rows: &RowStack, stored: &[K], query: &[K]) -> Vec<EditOp<K>> {
    debug_assert_eq!(rows.rows(), stored.len() + 1);
    debug_assert_eq!(rows.width(), query.len() + 1);

    let mut ops = Vec::with_capacity(stored.len().max(query.len()));
    let (mut r, mut c) = (stored.len(), query.len());
    while r > 0 || c > 0 {
        let insertion = if c > 0 { rows.cell(r, c - 1) } else { usize::MAX };
        let deletion = if r > 0 { rows.cell(r - 1, c) } else { usize::MAX };
        let substitution = if r > 0 && c > 0 {
            rows.cell(r - 1, c - 1)
        } else {
            usize::MAX
        };
        let min = insertion.min(deletion).min(substitution);

        if min == substitution {
            if rows.cell(r, c) > substitution {
                ops.push(EditOp::Replace(stored[r - 1].clone(), query[c - 1].clone()));
            } else {
                ops.push(EditOp::NoEdit(stored[r - 1].clone()));
            }
            r -= 1;
            c -= 1;
        } else if min == deletion {
            ops.push(EditOp::Delete(stored[r - 1].clone()));
            r -= 1;
        } else {
            ops.push(EditOp::Insert(query[c - 1].clone()));
            c -= 1;
        }
    }
    ops.reverse();
    ops
}
