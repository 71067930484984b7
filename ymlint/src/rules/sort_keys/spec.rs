//! Compiled order specifications.
//!
//! One [`OrderSpec`] describes the required key order for a mapping: either
//! a comparator every adjacent key pair must satisfy, or a sequence of
//! slots where a slot is a literal key name or a pattern-claimed group with
//! its own nested specification.

use regex::Regex;
use serde::Deserialize;
use std::cmp::Ordering;

/// The (possibly nested) specification of required key ordering.
#[derive(Debug, Clone)]
pub enum OrderSpec {
    /// An explicit sequence of slots.
    Sequence(Vec<Slot>),
    /// A comparator applied to every adjacent key pair.
    Comparator(KeyComparator),
}

impl OrderSpec {
    /// The order word used in diagnostic messages for this specification.
    #[must_use]
    pub fn order_word(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "specified",
            Self::Comparator(cmp) => match cmp.direction {
                Direction::Asc => "ascending",
                Direction::Desc => "descending",
            },
        }
    }
}

/// One ordinal position in a sequence specification.
#[derive(Debug, Clone)]
pub enum Slot {
    /// A single key, by literal name.
    Key(String),
    /// A group of keys claimed by a pattern, ordered among themselves.
    Group(GroupSpec),
}

/// A group slot: claims all keys matching `key_pattern` (or, with no
/// pattern, every key no other slot claims) and orders them by `order`.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    /// The claiming pattern; `None` marks the catch-all remainder group.
    pub key_pattern: Option<Regex>,
    /// Required order of the claimed keys relative to each other.
    pub order: OrderSpec,
}

/// Comparison direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending key order.
    Asc,
    /// Descending key order.
    Desc,
}

/// A key comparator: direction plus comparison flavor.
#[derive(Debug, Clone, Copy)]
pub struct KeyComparator {
    /// Required direction between adjacent keys.
    pub direction: Direction,
    /// Compare embedded digit runs by numeric value.
    pub natural: bool,
    /// Compare without case folding.
    pub case_sensitive: bool,
}

impl KeyComparator {
    /// Compare two keys, ignoring direction.
    #[must_use]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        if self.case_sensitive {
            self.compare_folded(a, b)
        } else {
            self.compare_folded(&a.to_lowercase(), &b.to_lowercase())
        }
    }

    fn compare_folded(&self, a: &str, b: &str) -> Ordering {
        if self.natural {
            natural_cmp(a, b)
        } else {
            a.cmp(b)
        }
    }

    /// Whether `next` may follow `prev`. Equal keys always pass.
    #[must_use]
    pub fn in_order(&self, prev: &str, next: &str) -> bool {
        match (self.direction, self.compare(prev, next)) {
            (_, Ordering::Equal) => true,
            (Direction::Asc, Ordering::Less) | (Direction::Desc, Ordering::Greater) => true,
            _ => false,
        }
    }

    /// Total ordering for sorting keys into this comparator's direction.
    #[must_use]
    pub fn sort_ordering(&self, a: &str, b: &str) -> Ordering {
        let ord = self.compare(a, b);
        match self.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

/// Natural-order string comparison: digit runs compare by numeric value,
/// everything else compares per character.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut x, mut y) = (a, b);
    loop {
        match (x.chars().next(), y.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(cx), Some(cy)) => {
                if cx.is_ascii_digit() && cy.is_ascii_digit() {
                    let dx = digit_run(x);
                    let dy = digit_run(y);
                    let nx = x[..dx].trim_start_matches('0');
                    let ny = y[..dy].trim_start_matches('0');
                    let ord = nx.len().cmp(&ny.len()).then_with(|| nx.cmp(ny));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    // Same numeric value: fewer leading zeros sorts later.
                    let ord = x[..dx].cmp(&y[..dy]);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    x = &x[dx..];
                    y = &y[dy..];
                } else {
                    let ord = cx.cmp(&cy);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    x = &x[cx.len_utf8()..];
                    y = &y[cy.len_utf8()..];
                }
            }
        }
    }
}

fn digit_run(s: &str) -> usize {
    s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len())
}
