//! Mapping key ordering rule.
//!
//! For every mapping node, selects the ordering configurations scoped to
//! the node's canonical path, validates the actual key order against each
//! of them independently, and attaches a trivia-preserving reorder fix to
//! the resulting findings.

use crate::document::MappingNode;
use crate::path::NodePath;
use crate::rules::{Context, Finding, Rule, RuleMetadata};
use rustc_hash::FxHashSet;

/// Option parsing and compiled configurations.
pub mod config;
/// Compiled order specifications and key comparators.
pub mod spec;

mod fix;
mod validate;

use config::{OrderConfig, OrderConfigEntry, OptionsError};

/// The `sort-keys` rule: mapping keys must follow the configured order.
#[derive(Debug)]
pub struct SortKeysRule {
    configs: Vec<OrderConfig>,
}

impl SortKeysRule {
    /// Build the rule from parsed option entries, compiling all patterns.
    ///
    /// # Errors
    /// Returns an error for an invalid pattern or a malformed order list;
    /// the rule is not activated.
    pub fn new(entries: &[OrderConfigEntry]) -> Result<Self, OptionsError> {
        Ok(Self {
            configs: config::compile(entries)?,
        })
    }

    /// Build the rule from the host's JSON options array.
    ///
    /// # Errors
    /// Returns an error when the options do not match the schema or fail
    /// to compile; the rule is not activated.
    pub fn from_json(options: &serde_json::Value) -> Result<Self, OptionsError> {
        let entries: Vec<OrderConfigEntry> = serde_json::from_value(options.clone())?;
        Self::new(&entries)
    }
}

impl Rule for SortKeysRule {
    fn name(&self) -> &'static str {
        "SortKeysRule"
    }

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "YML-O001",
            category: "ordering",
        }
    }

    fn enter_mapping(
        &mut self,
        mapping: &MappingNode,
        path: &NodePath,
        context: &Context,
    ) -> Option<Vec<Finding>> {
        if mapping.entries.is_empty() {
            return None;
        }

        let rendered_path = path.to_string();
        let keys: Vec<&str> = mapping.keys().collect();
        let key_set: FxHashSet<&str> = keys.iter().copied().collect();

        let mut findings = Vec::new();
        for order_config in config::resolve(&self.configs, &rendered_path, &key_set) {
            let violations = validate::check_order(&keys, &order_config.order);
            if violations.is_empty() {
                continue;
            }

            let edit = fix::reorder_fix(
                mapping,
                &order_config.order,
                &context.source,
                &context.comments,
            );
            let order_word = order_config.order.order_word();
            for violation in violations {
                let entry = &mapping.entries[violation.index];
                let (line, col) = context.line_index.line_col(entry.key.span.start);
                findings.push(Finding {
                    rule_id: self.code().to_owned(),
                    category: self.category().to_owned(),
                    severity: "warning".to_owned(),
                    message: format!(
                        "Expected mapping keys to be in {order_word} order. '{}' should be before '{}'.",
                        keys[violation.index], keys[violation.predecessor],
                    ),
                    file: context.filename.clone(),
                    line,
                    col,
                    fix: edit.clone(),
                });
            }
        }

        if findings.is_empty() {
            None
        } else {
            Some(findings)
        }
    }
}
