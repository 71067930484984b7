//! Canonical structural paths for tree nodes.
//!
//! Every mapping and sequence position is addressed by the chain of parent
//! keys and indices from the document root, rendered as a stable string
//! (`a.b[2].c`). Ordering configurations are scoped by matching regular
//! expressions against that string.

use compact_str::CompactString;
use smallvec::SmallVec;
use std::fmt;

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A mapping entry, by key name.
    Key(CompactString),
    /// A sequence item, by position.
    Index(usize),
}

/// The chain of segments from the document root to a node.
///
/// The root itself has an empty chain and renders as `""`. Identifier-like
/// keys render as `.name` (bare for the first segment); any other key
/// renders as a bracketed double-quoted literal, so two structurally equal
/// locations always produce the same string.
#[derive(Debug, Clone, Default)]
pub struct NodePath {
    segments: SmallVec<[PathSegment; 8]>,
}

impl NodePath {
    /// An empty path addressing the document root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend into a mapping entry.
    pub fn push_key(&mut self, name: &str) {
        self.segments.push(PathSegment::Key(CompactString::from(name)));
    }

    /// Descend into a sequence item.
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    /// Ascend one level.
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Whether this path addresses the document root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments from the root, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                PathSegment::Key(name) if is_identifier(name) => {
                    if !rendered.is_empty() {
                        rendered.push('.');
                    }
                    rendered.push_str(name);
                }
                PathSegment::Key(name) => {
                    rendered.push('[');
                    quote_key(&mut rendered, name);
                    rendered.push(']');
                }
                PathSegment::Index(index) => {
                    rendered.push('[');
                    rendered.push_str(&index.to_string());
                    rendered.push(']');
                }
            }
        }
        f.write_str(&rendered)
    }
}

/// Whether a key can be rendered bare, without bracket quoting.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Append `name` as a double-quoted literal with JSON-style escapes.
fn quote_key(out: &mut String, name: &str) {
    out.push('"');
    for c in name.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
