//! Human-readable tree rendering.
//!
//! ```text
//! ^
//! ├─ the ($)
//! │  └─ tree ($)
//! └─ an
//!    └─ umbrella ($)
//! ```
//!
//! The root is drawn as `^` and terminal nodes carry a ` ($)` suffix.

use std::fmt;

use crate::{NodeRef, Trie};

const ROOT_LABEL: &str = "^";
const TERMINAL_SUFFIX: &str = " ($)";

impl<K: fmt::Display, V> fmt::Display for Trie<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{ROOT_LABEL}")?;
        let mut indent = String::new();
        write_children(f, self.root(), &mut indent)
    }
}

fn write_children<K: fmt::Display, V>(
    f: &mut fmt::Formatter<'_>,
    node: NodeRef<'_, K, V>,
    indent: &mut String,
) -> fmt::Result {
    let mut children = node.children().peekable();
    while let Some(child) = children.next() {
        let last = children.peek().is_none();
        let (branch, extension) = if last {
            ("└─ ", "   ")
        } else {
            ("├─ ", "│  ")
        };

        write!(f, "{indent}{branch}")?;
        if let Some(token) = child.token() {
            write!(f, "{token}")?;
        }
        if child.is_terminal() {
            f.write_str(TERMINAL_SUFFIX)?;
        }
        writeln!(f)?;

        let len = indent.len();
        indent.push_str(extension);
        write_children(f, child, indent)?;
        indent.truncate(len);
    }
    Ok(())
}
