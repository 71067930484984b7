//! Trivia-preserving reorder fixes.
//!
//! The fix for an out-of-order mapping is a single replacement of the full
//! entry-list region: each entry's text block (attached blank lines and
//! standalone comments above it, the entry itself, a trailing comment on
//! the value line) is carried verbatim into its target position, and blocks
//! are joined with the separator originally following the first entry.
//! Formatting is never re-synthesized; the replacement is assembled purely
//! from substrings of the original source.

use super::spec::{OrderSpec, Slot};
use super::validate::assign_slots;
use crate::document::{Comment, MappingEntry, MappingNode};
use crate::fix::Edit;
use crate::utils::line_start;
use tracing::debug;

/// Compute the reorder fix for `mapping` under `order`.
///
/// Returns `None` when the mapping has fewer than two entries, the entries
/// are already in the target order, or no safe block layout can be
/// determined; the caller reports the diagnostic fix-less in that case.
#[must_use]
pub fn reorder_fix(
    mapping: &MappingNode,
    order: &OrderSpec,
    source: &str,
    comments: &[Comment],
) -> Option<Edit> {
    let entries = &mapping.entries;
    if entries.len() < 2 {
        return None;
    }

    let keys: Vec<(usize, &str)> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (i, e.key.value.as_str()))
        .collect();
    let target = ordered_positions(&keys, order);
    if target.iter().enumerate().all(|(i, t)| i == *t) {
        return None;
    }

    let blocks = entry_blocks(entries, source, comments)?;
    let separator = &source[blocks[0].end..blocks[1].start];

    let replacement = target
        .iter()
        .map(|&i| &source[blocks[i].start..blocks[i].end])
        .collect::<Vec<_>>()
        .join(separator);

    let start = blocks[0].start;
    let end = blocks[blocks.len() - 1].end;
    debug!(start, end, entries = entries.len(), "computed reorder fix");
    Some(Edit::new(start, end, replacement))
}

/// Target order of entry positions: a stable sort into slot order.
///
/// Keys without a slot keep their original positions; only slotted entries
/// are permuted around them. Comparator-ordered groups (and a top-level
/// comparator specification) additionally sort their members.
fn ordered_positions(keys: &[(usize, &str)], order: &OrderSpec) -> Vec<usize> {
    match order {
        OrderSpec::Comparator(cmp) => {
            let mut positions: Vec<usize> = (0..keys.len()).collect();
            positions.sort_by(|&a, &b| cmp.sort_ordering(keys[a].1, keys[b].1));
            positions
        }
        OrderSpec::Sequence(slots) => {
            let assigned = assign_slots(keys, slots);

            let mut by_slot: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
            for (position, slot) in assigned.iter().enumerate() {
                if let Some(slot) = slot {
                    by_slot[*slot].push(position);
                }
            }

            let mut ordered_slotted: Vec<usize> = Vec::new();
            for (slot_index, slot) in slots.iter().enumerate() {
                let members = &by_slot[slot_index];
                match slot {
                    Slot::Key(_) => ordered_slotted.extend(members),
                    Slot::Group(group) => {
                        let member_keys: Vec<(usize, &str)> =
                            members.iter().map(|&p| keys[p]).collect();
                        let sub_order = ordered_positions(&member_keys, &group.order);
                        ordered_slotted.extend(sub_order.into_iter().map(|p| members[p]));
                    }
                }
            }

            let mut slotted = ordered_slotted.into_iter();
            (0..keys.len())
                .map(|position| {
                    if assigned[position].is_some() {
                        slotted.next().unwrap_or(position)
                    } else {
                        position
                    }
                })
                .collect()
        }
    }
}

/// The source region carried with one entry when it moves.
#[derive(Debug, Clone, Copy)]
struct Block {
    start: usize,
    end: usize,
}

/// Compute each entry's text block. Returns `None` when the layout is
/// malformed (overlapping regions), in which case no fix is safe.
fn entry_blocks(
    entries: &[MappingEntry],
    source: &str,
    comments: &[Comment],
) -> Option<Vec<Block>> {
    let mut blocks: Vec<Block> = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let end = trailing_end(entry, source, comments);
        let start = if i == 0 {
            first_block_start(entry, source)
        } else {
            let prev_end = blocks[i - 1].end;
            if prev_end > entry.span.start {
                return None;
            }
            match source[prev_end..entry.span.start].find('\n') {
                Some(newline) => prev_end + newline + 1,
                None => entry.span.start,
            }
        };
        if start >= end || blocks.last().is_some_and(|prev| start < prev.end) {
            return None;
        }
        blocks.push(Block { start, end });
    }
    Some(blocks)
}

/// End of an entry's block: the value end, extended through a trailing
/// comment separated from it by spaces only.
fn trailing_end(entry: &MappingEntry, source: &str, comments: &[Comment]) -> usize {
    let end = entry.span.end;
    for comment in comments {
        if !comment.is_inline || comment.span.start < end {
            continue;
        }
        let between = &source[end..comment.span.start];
        if between.contains('\n') {
            break;
        }
        if between.chars().all(|c| c == ' ' || c == '\t') {
            return comment.span.end;
        }
    }
    end
}

/// Start of the first entry's block.
///
/// In block layout the entry owns its line from the line start, plus any
/// contiguous standalone-comment lines stacked above it (blank lines above
/// the topmost comment are left behind). In flow layout, where other text
/// precedes the entry on its line, the block starts at the entry itself.
fn first_block_start(entry: &MappingEntry, source: &str) -> usize {
    let entry_line = line_start(source, entry.span.start);
    if source[entry_line..entry.span.start]
        .chars()
        .any(|c| !c.is_whitespace())
    {
        return entry.span.start;
    }

    let mut start = entry_line;
    let mut cursor = entry_line;
    while cursor > 0 {
        let prev_line = line_start(source, cursor - 1);
        let line = source[prev_line..cursor].trim();
        if line.starts_with('#') {
            start = prev_line;
        } else if !line.is_empty() {
            break;
        }
        cursor = prev_line;
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::sort_keys::spec::{Direction, KeyComparator};
    use crate::test_utils::parse_document;

    const ASC: OrderSpec = OrderSpec::Comparator(KeyComparator {
        direction: Direction::Asc,
        natural: false,
        case_sensitive: true,
    });

    fn root_mapping(document: &crate::document::Document) -> &MappingNode {
        match document.root.as_ref().unwrap() {
            crate::document::Node::Mapping(m) => m,
            _ => panic!("expected mapping root"),
        }
    }

    fn apply(source: &str, order: &OrderSpec) -> Option<String> {
        let document = parse_document(source).unwrap();
        let mapping = root_mapping(&document);
        let edit = reorder_fix(mapping, order, &document.source, &document.comments)?;
        let mut fixed = document.source.clone();
        fixed.replace_range(edit.start..edit.end, &edit.replacement);
        Some(fixed)
    }

    #[test]
    fn sorted_mapping_needs_no_fix() {
        assert_eq!(apply("a: 1\nb: 2\n", &ASC), None);
    }

    #[test]
    fn single_entry_needs_no_fix() {
        assert_eq!(apply("b: 2\n", &ASC), None);
    }

    #[test]
    fn block_entries_swap_whole_lines() {
        let fixed = apply("b: 2\na: 1\n", &ASC).unwrap();
        assert_eq!(fixed, "a: 1\nb: 2\n");
    }

    #[test]
    fn standalone_comment_travels_with_its_entry() {
        let fixed = apply("# about b\nb: 2\na: 1\n", &ASC).unwrap();
        assert_eq!(fixed, "a: 1\n# about b\nb: 2\n");
    }

    #[test]
    fn inline_comment_travels_with_its_line() {
        let fixed = apply("b: 2 # two\na: 1\n", &ASC).unwrap();
        assert_eq!(fixed, "a: 1\nb: 2 # two\n");
    }

    #[test]
    fn flow_entries_reuse_the_first_separator() {
        let fixed = apply("{b: 2, a: 1}\n", &ASC).unwrap();
        assert_eq!(fixed, "{a: 1, b: 2}\n");
    }

    #[test]
    fn indented_entries_keep_indentation() {
        let source = "outer:\n  b: 2\n  a: 1\n";
        let document = parse_document(source).unwrap();
        let root = root_mapping(&document);
        let inner = match &root.entries[0].value {
            crate::document::Node::Mapping(m) => m,
            _ => panic!("expected nested mapping"),
        };
        let edit = reorder_fix(inner, &ASC, &document.source, &document.comments).unwrap();
        let mut fixed = document.source.clone();
        fixed.replace_range(edit.start..edit.end, &edit.replacement);
        assert_eq!(fixed, "outer:\n  a: 1\n  b: 2\n");
    }
}
