//! Ordering rule options.
//!
//! The host supplies one JSON array of [`OrderConfigEntry`] values per rule
//! activation. Entries are compiled exactly once into [`OrderConfig`]s
//! (patterns become compiled regexes, order forms become [`OrderSpec`]s);
//! a bad pattern aborts activation instead of failing per document.
//! Per-mapping applicability is then a pure function of the mapping's path
//! and key set.

use super::spec::{Direction, GroupSpec, KeyComparator, OrderSpec, Slot};
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use thiserror::Error;
use tracing::trace;

/// One ordering configuration, as supplied by the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderConfigEntry {
    /// Pattern matched against a mapping's canonical path.
    #[serde(rename = "pathPattern")]
    pub path_pattern: String,
    /// Key names that must all be present for the entry to apply.
    #[serde(rename = "hasProperties", default)]
    pub has_properties: Option<Vec<String>>,
    /// The required key order.
    pub order: OrderOption,
}

/// The `order` field: a slot list or a comparator description.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderOption {
    /// An explicit sequence of keys and groups.
    Sequence(Vec<OrderElement>),
    /// A comparator applied to adjacent keys.
    Comparator(ComparatorOption),
}

/// One element of a sequence-form `order` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderElement {
    /// A literal key name.
    Key(String),
    /// A nested group of keys.
    Group(GroupOption),
}

/// A group element: claiming pattern plus nested order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupOption {
    /// Pattern claiming member keys; absent for the catch-all group.
    #[serde(rename = "keyPattern", default)]
    pub key_pattern: Option<String>,
    /// Required order of the claimed keys.
    pub order: OrderOption,
}

/// A comparator description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparatorOption {
    /// Comparison direction.
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Compare embedded digit runs numerically. Defaults to `false`.
    #[serde(default)]
    pub natural: bool,
    /// Compare without case folding. Defaults to `true`.
    #[serde(rename = "caseSensitive", default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

const fn default_case_sensitive() -> bool {
    true
}

/// Error raised while parsing or compiling ordering options.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// A `pathPattern` failed to compile.
    #[error("invalid path pattern `{pattern}`: {source}")]
    InvalidPathPattern {
        /// The offending pattern text.
        pattern: String,
        /// The underlying regex error.
        source: regex::Error,
    },
    /// A `keyPattern` failed to compile.
    #[error("invalid key pattern `{pattern}`: {source}")]
    InvalidKeyPattern {
        /// The offending pattern text.
        pattern: String,
        /// The underlying regex error.
        source: regex::Error,
    },
    /// An order list declares more than one catch-all group.
    #[error("order list declares more than one catch-all group")]
    DuplicateRestGroup,
    /// The options value does not match the schema.
    #[error("malformed sort-keys options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One compiled, immutable ordering configuration.
#[derive(Debug, Clone)]
pub struct OrderConfig {
    /// Compiled path pattern.
    pub path_pattern: Regex,
    /// Key-presence guard, if any.
    pub has_properties: Option<Vec<String>>,
    /// Compiled order specification.
    pub order: OrderSpec,
}

impl OrderConfig {
    /// Whether this configuration governs the mapping at `path` holding
    /// `keys`.
    #[must_use]
    pub fn applies_to(&self, path: &str, keys: &FxHashSet<&str>) -> bool {
        self.path_pattern.is_match(path)
            && self
                .has_properties
                .as_ref()
                .is_none_or(|props| props.iter().all(|p| keys.contains(p.as_str())))
    }
}

/// Compile host option entries into immutable configurations.
///
/// # Errors
/// Returns the first pattern or shape error encountered; activation aborts.
pub fn compile(entries: &[OrderConfigEntry]) -> Result<Vec<OrderConfig>, OptionsError> {
    entries
        .iter()
        .map(|entry| {
            let path_pattern =
                Regex::new(&entry.path_pattern).map_err(|source| OptionsError::InvalidPathPattern {
                    pattern: entry.path_pattern.clone(),
                    source,
                })?;
            Ok(OrderConfig {
                path_pattern,
                has_properties: entry.has_properties.clone(),
                order: compile_order(&entry.order)?,
            })
        })
        .collect()
}

fn compile_order(option: &OrderOption) -> Result<OrderSpec, OptionsError> {
    match option {
        OrderOption::Comparator(cmp) => Ok(OrderSpec::Comparator(KeyComparator {
            direction: cmp.direction,
            natural: cmp.natural,
            case_sensitive: cmp.case_sensitive,
        })),
        OrderOption::Sequence(elements) => {
            let mut slots = Vec::with_capacity(elements.len());
            let mut seen_rest = false;
            for element in elements {
                match element {
                    OrderElement::Key(name) => slots.push(Slot::Key(name.clone())),
                    OrderElement::Group(group) => {
                        let key_pattern = match &group.key_pattern {
                            Some(pattern) => Some(Regex::new(pattern).map_err(|source| {
                                OptionsError::InvalidKeyPattern {
                                    pattern: pattern.clone(),
                                    source,
                                }
                            })?),
                            None => {
                                if seen_rest {
                                    return Err(OptionsError::DuplicateRestGroup);
                                }
                                seen_rest = true;
                                None
                            }
                        };
                        slots.push(Slot::Group(GroupSpec {
                            key_pattern,
                            order: compile_order(&group.order)?,
                        }));
                    }
                }
            }
            Ok(OrderSpec::Sequence(slots))
        }
    }
}

/// Select the configurations governing one mapping, in declaration order.
#[must_use]
pub fn resolve<'a>(
    configs: &'a [OrderConfig],
    path: &str,
    keys: &FxHashSet<&str>,
) -> Vec<&'a OrderConfig> {
    let matched: Vec<&OrderConfig> = configs
        .iter()
        .filter(|config| config.applies_to(path, keys))
        .collect();
    trace!(path, matched = matched.len(), "resolved order configs");
    matched
}
