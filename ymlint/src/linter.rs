//! Document traversal and rule dispatch.

use crate::document::{Document, Node};
use crate::path::NodePath;
use crate::rules::{Context, Finding, Rule};
use std::path::PathBuf;

/// Visitor for traversing one document tree and applying lint rules.
///
/// Traversal is depth-first and strictly sequential: outer mappings are
/// visited before the mappings nested inside their values, so findings
/// accumulate in traversal order. Independent visitors share nothing and
/// may lint different documents in parallel.
pub struct LinterVisitor {
    rules: Vec<Box<dyn Rule>>,
    context: Context,
    path: NodePath,
    /// List of findings collected during the traversal.
    pub findings: Vec<Finding>,
}

impl LinterVisitor {
    /// Creates a new `LinterVisitor` with the given rules and document.
    #[must_use]
    pub fn new(rules: Vec<Box<dyn Rule>>, filename: PathBuf, document: &Document) -> Self {
        Self {
            rules,
            context: Context::new(filename, document),
            path: NodePath::new(),
            findings: Vec::new(),
        }
    }

    /// Walks the document and collects findings from all rules.
    pub fn run(&mut self, document: &Document) {
        if let Some(root) = &document.root {
            self.visit_node(root);
        }
    }

    fn visit_node(&mut self, node: &Node) {
        match node {
            Node::Mapping(mapping) => {
                for rule in &mut self.rules {
                    if let Some(mut findings) =
                        rule.enter_mapping(mapping, &self.path, &self.context)
                    {
                        self.findings.append(&mut findings);
                    }
                }

                for entry in &mapping.entries {
                    self.path.push_key(entry.key.value.as_str());
                    self.visit_node(&entry.value);
                    self.path.pop();
                }

                for rule in &mut self.rules {
                    if let Some(mut findings) =
                        rule.leave_mapping(mapping, &self.path, &self.context)
                    {
                        self.findings.append(&mut findings);
                    }
                }
            }
            Node::Sequence(sequence) => {
                for rule in &mut self.rules {
                    if let Some(mut findings) =
                        rule.enter_sequence(sequence, &self.path, &self.context)
                    {
                        self.findings.append(&mut findings);
                    }
                }

                for (index, item) in sequence.items.iter().enumerate() {
                    self.path.push_index(index);
                    self.visit_node(item);
                    self.path.pop();
                }

                for rule in &mut self.rules {
                    if let Some(mut findings) =
                        rule.leave_sequence(sequence, &self.path, &self.context)
                    {
                        self.findings.append(&mut findings);
                    }
                }
            }
            Node::Scalar(_) => {}
        }
    }
}

/// Lint one document with the given rules and return the findings.
#[must_use]
pub fn lint_document(
    document: &Document,
    filename: PathBuf,
    rules: Vec<Box<dyn Rule>>,
) -> Vec<Finding> {
    let mut visitor = LinterVisitor::new(rules, filename, document);
    visitor.run(document);
    visitor.findings
}
