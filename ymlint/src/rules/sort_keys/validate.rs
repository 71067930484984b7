//! Key-order validation.
//!
//! Walks a mapping's actual key sequence against one [`OrderSpec`] and
//! collects out-of-order keys. Sequence specifications are flattened into
//! slots; every actual key is assigned the first slot claiming it in
//! declaration order, keys claimed by nothing fall to the catch-all group
//! when one exists and are otherwise ignored entirely. Group members are
//! validated recursively against the group's nested specification.

use super::spec::{OrderSpec, Slot};

/// An out-of-order key, by entry position within the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// Position of the key that must move.
    pub index: usize,
    /// Position of the key it should be placed before.
    pub predecessor: usize,
}

/// Validate `keys` (in actual textual order) against `order`.
///
/// Violations are returned in actual-key traversal order.
#[must_use]
pub fn check_order(keys: &[&str], order: &OrderSpec) -> Vec<Violation> {
    let indexed: Vec<(usize, &str)> = keys.iter().copied().enumerate().collect();
    let mut violations = check_indexed(&indexed, order);
    violations.sort_by_key(|v| v.index);
    violations
}

fn check_indexed(keys: &[(usize, &str)], order: &OrderSpec) -> Vec<Violation> {
    match order {
        OrderSpec::Comparator(cmp) => keys
            .windows(2)
            .filter(|pair| !cmp.in_order(pair[0].1, pair[1].1))
            .map(|pair| Violation {
                index: pair[1].0,
                predecessor: pair[0].0,
            })
            .collect(),
        OrderSpec::Sequence(slots) => {
            let assigned = assign_slots(keys, slots);
            let mut violations = Vec::new();

            // Adjacent pairs over the slotted subsequence: a strictly
            // decreasing slot index is out of order.
            let mut prev: Option<(usize, usize)> = None;
            for (pos, slot) in assigned.iter().enumerate() {
                let Some(slot) = *slot else { continue };
                if let Some((prev_pos, prev_slot)) = prev {
                    if slot < prev_slot {
                        violations.push(Violation {
                            index: keys[pos].0,
                            predecessor: keys[prev_pos].0,
                        });
                    }
                }
                prev = Some((pos, slot));
            }

            // Group members are additionally ordered among themselves.
            for (slot_index, slot) in slots.iter().enumerate() {
                let Slot::Group(group) = slot else { continue };
                let members: Vec<(usize, &str)> = keys
                    .iter()
                    .zip(&assigned)
                    .filter(|(_, a)| **a == Some(slot_index))
                    .map(|(key, _)| *key)
                    .collect();
                if members.len() > 1 {
                    violations.extend(check_indexed(&members, &group.order));
                }
            }

            violations
        }
    }
}

/// Assign each key its slot in the flattened specification, if any.
pub(crate) fn assign_slots(keys: &[(usize, &str)], slots: &[Slot]) -> Vec<Option<usize>> {
    let rest = slots
        .iter()
        .position(|slot| matches!(slot, Slot::Group(g) if g.key_pattern.is_none()));
    keys.iter().map(|(_, key)| slot_of(key, slots, rest)).collect()
}

fn slot_of(key: &str, slots: &[Slot], rest: Option<usize>) -> Option<usize> {
    for (index, slot) in slots.iter().enumerate() {
        match slot {
            Slot::Key(name) => {
                if name == key {
                    return Some(index);
                }
            }
            Slot::Group(group) => {
                if let Some(pattern) = &group.key_pattern {
                    if pattern.is_match(key) {
                        return Some(index);
                    }
                }
            }
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::sort_keys::spec::{Direction, GroupSpec, KeyComparator};
    use regex::Regex;

    const ASC: KeyComparator = KeyComparator {
        direction: Direction::Asc,
        natural: false,
        case_sensitive: true,
    };

    fn group(pattern: Option<&str>, order: OrderSpec) -> Slot {
        Slot::Group(GroupSpec {
            key_pattern: pattern.map(|p| Regex::new(p).unwrap()),
            order,
        })
    }

    fn nested_spec() -> OrderSpec {
        OrderSpec::Sequence(vec![
            Slot::Key("a".to_owned()),
            Slot::Key("b".to_owned()),
            group(Some("[cd]"), OrderSpec::Comparator(ASC)),
            group(Some("[e-g]"), OrderSpec::Comparator(ASC)),
            Slot::Key("z".to_owned()),
        ])
    }

    #[test]
    fn comparator_flags_adjacent_inversions() {
        let order = OrderSpec::Comparator(ASC);
        assert!(check_order(&["a", "b", "c"], &order).is_empty());
        let violations = check_order(&["b", "a", "c"], &order);
        assert_eq!(violations, vec![Violation { index: 1, predecessor: 0 }]);
    }

    #[test]
    fn in_order_group_spec_is_clean() {
        let violations = check_order(&["a", "b", "c", "d", "e", "f", "g", "z"], &nested_spec());
        assert!(violations.is_empty());
    }

    #[test]
    fn group_members_are_ordered_among_themselves() {
        let violations = check_order(&["a", "b", "d", "c", "e", "g", "f", "z"], &nested_spec());
        assert_eq!(
            violations,
            vec![
                Violation { index: 3, predecessor: 2 },
                Violation { index: 6, predecessor: 5 },
            ]
        );
    }

    #[test]
    fn late_slot_flags_next_slotted_key_only() {
        let violations = check_order(&["a", "b", "z", "c", "d", "e", "f", "g"], &nested_spec());
        assert_eq!(violations, vec![Violation { index: 3, predecessor: 2 }]);
    }

    #[test]
    fn unslotted_keys_are_invisible() {
        let order = OrderSpec::Sequence(vec![Slot::Key("a".to_owned()), Slot::Key("b".to_owned())]);
        // "x" has no slot and no catch-all exists: never flagged, never an
        // anchor between "b" and "a".
        assert!(check_order(&["x", "a", "x2", "b"], &order).is_empty());
        let violations = check_order(&["b", "x", "a"], &order);
        assert_eq!(violations, vec![Violation { index: 2, predecessor: 0 }]);
    }

    #[test]
    fn catch_all_claims_the_remainder() {
        let order = OrderSpec::Sequence(vec![
            Slot::Key("a".to_owned()),
            group(None, OrderSpec::Comparator(ASC)),
        ]);
        let violations = check_order(&["a", "y", "x"], &order);
        assert_eq!(violations, vec![Violation { index: 2, predecessor: 1 }]);
        // Remainder keys may not precede the literal slot.
        let violations = check_order(&["x", "a"], &order);
        assert_eq!(violations, vec![Violation { index: 1, predecessor: 0 }]);
    }

    #[test]
    fn literal_before_group_pattern_wins_in_declaration_order() {
        let order = OrderSpec::Sequence(vec![
            Slot::Key("a".to_owned()),
            group(Some("^[ab]$"), OrderSpec::Comparator(ASC)),
        ]);
        // "a" is claimed by the literal slot, "b" by the group; this order
        // is already satisfied.
        assert!(check_order(&["a", "b"], &order).is_empty());
        let violations = check_order(&["b", "a"], &order);
        assert_eq!(violations, vec![Violation { index: 1, predecessor: 0 }]);
    }

    #[test]
    fn duplicate_keys_are_positional() {
        let order = OrderSpec::Comparator(ASC);
        let violations = check_order(&["a", "a", "b", "a"], &order);
        assert_eq!(violations, vec![Violation { index: 3, predecessor: 2 }]);
    }
}
