//! Byte-range safe source rewriter.
//!
//! Applies text edits using byte ranges, preserving all surrounding
//! formatting and rejecting overlapping or out-of-bounds edits.

use serde::Serialize;
use thiserror::Error;

/// A single text replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Replacement content.
    pub replacement: String,
}

impl Edit {
    /// Create a new edit.
    #[must_use]
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    /// Check if this edit overlaps with another.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Error during rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// Two or more edits have overlapping ranges.
    #[error("overlapping edits at indices {edit_a} and {edit_b}")]
    OverlappingEdits {
        /// Index of the first overlapping edit.
        edit_a: usize,
        /// Index of the second overlapping edit.
        edit_b: usize,
    },
    /// An edit range reaches past the end of the source.
    #[error("edit {edit_index} out of bounds: end {end} > source length {source_len}")]
    OutOfBounds {
        /// Index of the bad edit.
        edit_index: usize,
        /// End byte of the edit.
        end: usize,
        /// Length of the source.
        source_len: usize,
    },
}

/// Safe source rewriter using byte ranges.
///
/// Edits are applied in reverse order so earlier byte positions stay valid
/// while the string is modified.
#[derive(Debug, Clone)]
pub struct SourceRewriter {
    source: String,
    edits: Vec<Edit>,
}

impl SourceRewriter {
    /// Create a new rewriter for the given source.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    /// Add an edit to the pending list.
    pub fn add_edit(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Add multiple edits.
    pub fn add_edits(&mut self, edits: impl IntoIterator<Item = Edit>) {
        self.edits.extend(edits);
    }

    /// Check if there are any pending edits.
    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Validate edits without applying them.
    ///
    /// # Errors
    /// Returns an error if edits overlap or are out of bounds.
    pub fn validate(&self) -> Result<(), RewriteError> {
        for (i, edit) in self.edits.iter().enumerate() {
            if edit.end > self.source.len() {
                return Err(RewriteError::OutOfBounds {
                    edit_index: i,
                    end: edit.end,
                    source_len: self.source.len(),
                });
            }
        }

        for i in 0..self.edits.len() {
            for j in (i + 1)..self.edits.len() {
                if self.edits[i].overlaps(&self.edits[j]) {
                    return Err(RewriteError::OverlappingEdits {
                        edit_a: i,
                        edit_b: j,
                    });
                }
            }
        }

        Ok(())
    }

    /// Apply all edits and return the modified source.
    ///
    /// # Errors
    /// Returns an error if edits overlap or are out of bounds.
    pub fn apply(self) -> Result<String, RewriteError> {
        self.validate()?;

        let mut result = self.source;
        let mut sorted_edits = self.edits;

        // Apply from the end of the source toward the start.
        sorted_edits.sort_by(|a, b| b.start.cmp(&a.start));

        for edit in sorted_edits {
            result.replace_range(edit.start..edit.end, &edit.replacement);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_replacement() {
        let mut rewriter = SourceRewriter::new("name: demo\nkind: tool\n");
        rewriter.add_edit(Edit::new(6, 10, "ymlint"));

        let result = rewriter.apply().unwrap();
        assert_eq!(result, "name: ymlint\nkind: tool\n");
    }

    #[test]
    fn multiple_non_overlapping_edits() {
        let source = "a: 1\nb: 2\nc: 3\n";
        let mut rewriter = SourceRewriter::new(source);
        rewriter.add_edit(Edit::new(0, 4, "b: 2"));
        rewriter.add_edit(Edit::new(5, 9, "a: 1"));

        let result = rewriter.apply().unwrap();
        assert_eq!(result, "b: 2\na: 1\nc: 3\n");
    }

    #[test]
    fn overlapping_edits_error() {
        let mut rewriter = SourceRewriter::new("a: 1\nb: 2\n");
        rewriter.add_edit(Edit::new(0, 6, "x"));
        rewriter.add_edit(Edit::new(5, 9, "y"));

        assert!(matches!(
            rewriter.apply(),
            Err(RewriteError::OverlappingEdits { .. })
        ));
    }

    #[test]
    fn out_of_bounds_error() {
        let mut rewriter = SourceRewriter::new("a: 1");
        rewriter.add_edit(Edit::new(0, 100, "b"));

        assert!(matches!(
            rewriter.apply(),
            Err(RewriteError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn adjacent_edits_are_not_overlapping() {
        let mut rewriter = SourceRewriter::new("abcdef");
        rewriter.add_edit(Edit::new(0, 3, "XXX"));
        rewriter.add_edit(Edit::new(3, 6, "YYY"));

        let result = rewriter.apply().unwrap();
        assert_eq!(result, "XXXYYY");
    }

    #[test]
    fn empty_edit_list_is_identity() {
        let rewriter = SourceRewriter::new("a: 1\n");
        assert!(!rewriter.has_edits());
        assert_eq!(rewriter.apply().unwrap(), "a: 1\n");
    }

    #[test]
    fn preserves_surrounding_text() {
        let source = "# header\nb: 2  # two\na: 1\n";
        let mut rewriter = SourceRewriter::new(source);
        rewriter.add_edit(Edit::new(9, 25, "a: 1\nb: 2  # two"));

        let result = rewriter.apply().unwrap();
        assert_eq!(result, "# header\na: 1\nb: 2  # two\n");
    }
}
