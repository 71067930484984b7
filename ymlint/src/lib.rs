//! Core library for the ymlint style analysis engine.
//!
//! ymlint statically analyzes parsed trees of a YAML-like structured-text
//! format and reports (and fixes) style violations. The centerpiece is the
//! mapping key ordering rule: a layered, path-scoped configuration decides
//! the expected key order per mapping node, the validator reports precise
//! out-of-order keys, and the fixer computes a trivia-preserving reorder of
//! the mapping's entries. Parsing the format and applying fixes to files
//! are the embedding host's responsibility.

#![allow(clippy::similar_names)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

/// Module defining the parsed document tree consumed from the host.
pub mod document;

/// Module for byte-range fix edits and their safe application.
pub mod fix;

/// Module containing the traversal driver and visitor.
pub mod linter;

/// Module computing canonical structural paths for nodes.
pub mod path;

/// Module containing the rule trait and the rule implementations.
pub mod rules;

/// Module containing test utilities (fixture parser and lint harness).
pub mod test_utils;

/// Module containing utility helpers shared across the crate.
pub mod utils;

pub use document::Document;
pub use fix::{Edit, SourceRewriter};
pub use linter::{lint_document, LinterVisitor};
pub use rules::{Context, Finding, Rule, RuleMetadata};
