//! Rule dispatch boundary shared with the host.
//!
//! The host walks one document with a [`crate::linter::LinterVisitor`],
//! which calls into every registered [`Rule`] as it enters and leaves
//! mapping and sequence nodes.

use crate::document::{Comment, Document, MappingNode, SequenceNode};
use crate::fix::Edit;
use crate::path::NodePath;
use crate::utils::LineIndex;
use serde::Serialize;
use std::path::PathBuf;

/// Context passed to rules during analysis.
#[derive(Debug, Clone)]
pub struct Context {
    /// Path of the file being analyzed.
    pub filename: PathBuf,
    /// The full original source text.
    pub source: String,
    /// Line index for accurate line/column mapping.
    pub line_index: LineIndex,
    /// Comment tokens of the document, ordered by position.
    pub comments: Vec<Comment>,
}

impl Context {
    /// Build a per-document context from the host's parsed document.
    #[must_use]
    pub fn new(filename: PathBuf, document: &Document) -> Self {
        Self {
            filename,
            line_index: LineIndex::new(&document.source),
            source: document.source.clone(),
            comments: document.comments.clone(),
        }
    }
}

/// A single issue found by a rule.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// ID of the rule that triggered the finding.
    pub rule_id: String,
    /// Category of the rule.
    pub category: String,
    /// Severity level (e.g., "warning", "error").
    pub severity: String,
    /// Description of the issue.
    pub message: String,
    /// File where the issue was found.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, bytes).
    pub col: usize,
    /// Optional text replacement that resolves the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Edit>,
}

/// Metadata associated with a rule.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleMetadata {
    /// Unique code/ID of the rule.
    pub id: &'static str,
    /// Category of the rule.
    pub category: &'static str,
}

/// Trait defining a style rule over document trees.
pub trait Rule: Send + Sync {
    /// Returns the descriptive name of the rule.
    fn name(&self) -> &'static str;
    /// Returns the unique code/ID of the rule.
    fn code(&self) -> &'static str {
        self.metadata().id
    }
    /// Returns the category/functional group of the rule.
    fn category(&self) -> &'static str {
        self.metadata().category
    }
    /// Returns the full metadata for the rule.
    fn metadata(&self) -> RuleMetadata;
    /// Called when entering a mapping node.
    fn enter_mapping(
        &mut self,
        _mapping: &MappingNode,
        _path: &NodePath,
        _context: &Context,
    ) -> Option<Vec<Finding>> {
        None
    }
    /// Called when leaving a mapping node.
    fn leave_mapping(
        &mut self,
        _mapping: &MappingNode,
        _path: &NodePath,
        _context: &Context,
    ) -> Option<Vec<Finding>> {
        None
    }
    /// Called when entering a sequence node.
    fn enter_sequence(
        &mut self,
        _sequence: &SequenceNode,
        _path: &NodePath,
        _context: &Context,
    ) -> Option<Vec<Finding>> {
        None
    }
    /// Called when leaving a sequence node.
    fn leave_sequence(
        &mut self,
        _sequence: &SequenceNode,
        _path: &NodePath,
        _context: &Context,
    ) -> Option<Vec<Finding>> {
        None
    }
}

/// Module containing the mapping key ordering rule.
pub mod sort_keys;

/// Returns the ordering rules configured by the given host options.
///
/// # Errors
/// Returns an error when the options are malformed or contain an invalid
/// pattern; activation aborts and no rule instance is produced.
pub fn get_ordering_rules(
    options: &serde_json::Value,
) -> Result<Vec<Box<dyn Rule>>, sort_keys::config::OptionsError> {
    Ok(vec![Box::new(sort_keys::SortKeysRule::from_json(options)?)])
}
