//! Parsed document tree consumed from the host parser.
//!
//! The engine never parses source text itself. The host hands over one
//! [`Document`] per lint pass: a tree of nodes carrying byte spans into the
//! original source, plus the comment tokens the parser collected.

use compact_str::CompactString;

/// A half-open byte range into the document source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// One node of the parsed tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A scalar value.
    Scalar(ScalarNode),
    /// A mapping of key-value entries.
    Mapping(MappingNode),
    /// A sequence of values.
    Sequence(SequenceNode),
}

impl Node {
    /// The source span of this node.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Scalar(s) => s.span,
            Self::Mapping(m) => m.span,
            Self::Sequence(s) => s.span,
        }
    }
}

/// A scalar node: decoded text plus the span of its source representation.
///
/// Uses `CompactString` - short scalars (keys in particular) stay inline
/// without a heap allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarNode {
    /// The decoded scalar text (quotes and escapes resolved).
    pub value: CompactString,
    /// Span of the scalar token, including any quotes.
    pub span: Span,
}

/// A mapping node: key-value entries in literal textual order.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingNode {
    /// Entries in the order they appear in the source.
    pub entries: Vec<MappingEntry>,
    /// Span of the whole mapping (including flow delimiters, if any).
    pub span: Span,
}

impl MappingNode {
    /// Iterate over the entry keys as string slices, in textual order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.value.as_str())
    }
}

/// One key-value entry of a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    /// The entry key. Keys are scalar strings; non-scalar keys are
    /// diagnosed by a separate collaborator and never reach this engine.
    pub key: ScalarNode,
    /// The entry value.
    pub value: Node,
    /// Span from the start of the key to the end of the value.
    pub span: Span,
}

/// A sequence node.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceNode {
    /// Items in the order they appear in the source.
    pub items: Vec<Node>,
    /// Span of the whole sequence (including flow delimiters, if any).
    pub span: Span,
}

/// A comment token collected by the host parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The comment text (including the `#` prefix).
    pub text: String,
    /// Span of the comment token.
    pub span: Span,
    /// Whether this comment follows code on the same line.
    pub is_inline: bool,
}

/// One parsed document: source text, root node and comment tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The full original source text.
    pub source: String,
    /// The root node, `None` for an empty document.
    pub root: Option<Node>,
    /// All comment tokens, ordered by position.
    pub comments: Vec<Comment>,
}
