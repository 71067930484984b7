//! Test utilities.
//!
//! The engine consumes parsed trees from the host and never parses source
//! itself. For tests, this module synthesizes that host input: a small
//! fixture parser covering the block/flow subset the fixtures use (plain
//! and double-quoted scalars, nested block collections, multi-line flow
//! collections, comments), plus helpers that run the ordering rule over a
//! source snippet and apply the produced fixes.

use crate::document::{
    Comment, Document, MappingEntry, MappingNode, Node, ScalarNode, SequenceNode, Span,
};
use crate::fix::{Edit, SourceRewriter};
use crate::linter::lint_document;
use crate::rules::sort_keys::config::OptionsError;
use crate::rules::sort_keys::SortKeysRule;
use crate::rules::{Finding, Rule};
use compact_str::CompactString;
use std::path::PathBuf;
use thiserror::Error;

/// Error from the fixture parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fixture parse error at byte {offset}: {message}")]
pub struct ParseError {
    /// Byte offset the parser stopped at.
    pub offset: usize,
    /// What went wrong.
    pub message: String,
}

/// Error from the lint/fix harness helpers.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The fixture source failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The rule options failed to compile.
    #[error(transparent)]
    Options(#[from] OptionsError),
    /// The produced fixes failed to apply.
    #[error(transparent)]
    Rewrite(#[from] crate::fix::RewriteError),
}

/// Parse fixture source into a host-shaped document.
///
/// # Errors
/// Returns a [`ParseError`] for input outside the supported subset.
pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    let mut parser = Parser {
        src: source,
        pos: 0,
        comments: Vec::new(),
    };
    let root = parser.parse_root()?;
    Ok(Document {
        source: source.to_owned(),
        root,
        comments: parser.comments,
    })
}

/// Run the ordering rule over fixture source with the given JSON options.
///
/// # Errors
/// Returns an error when the fixture fails to parse or the options fail to
/// compile.
pub fn lint_source(
    source: &str,
    options: &serde_json::Value,
) -> Result<Vec<Finding>, HarnessError> {
    let document = parse_document(source)?;
    let rule: Box<dyn Rule> = Box::new(SortKeysRule::from_json(options)?);
    Ok(lint_document(
        &document,
        PathBuf::from("test.yml"),
        vec![rule],
    ))
}

/// The diagnostic messages of `findings`, in order.
#[must_use]
pub fn messages(findings: &[Finding]) -> Vec<String> {
    findings.iter().map(|f| f.message.clone()).collect()
}

/// Lint fixture source and apply one pass of the produced fixes, the way a
/// host does: duplicate edits collapse to one, later edits overlapping an
/// accepted one are dropped for this pass.
///
/// # Errors
/// Returns an error when linting fails or the accepted edits cannot be
/// applied.
pub fn fix_source(source: &str, options: &serde_json::Value) -> Result<String, HarnessError> {
    let findings = lint_source(source, options)?;

    let mut accepted: Vec<Edit> = Vec::new();
    for finding in findings {
        let Some(edit) = finding.fix else { continue };
        if accepted.contains(&edit) {
            continue;
        }
        if accepted.iter().any(|kept| kept.overlaps(&edit)) {
            continue;
        }
        accepted.push(edit);
    }

    let mut rewriter = SourceRewriter::new(source);
    rewriter.add_edits(accepted);
    Ok(rewriter.apply()?)
}

/// Repeat [`fix_source`] passes until the source stops changing, the way a
/// host re-parses and re-lints after applying fixes. Bounded at ten passes.
///
/// # Errors
/// Returns an error when any pass fails.
pub fn fix_source_to_fixpoint(
    source: &str,
    options: &serde_json::Value,
) -> Result<String, HarnessError> {
    let mut current = source.to_owned();
    for _ in 0..10 {
        let next = fix_source(&current, options)?;
        if next == current {
            break;
        }
        current = next;
    }
    Ok(current)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    comments: Vec<Comment>,
}

impl Parser<'_> {
    fn err<T>(&self, offset: usize, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            offset,
            message: message.into(),
        })
    }

    fn byte(&self, pos: usize) -> Option<u8> {
        self.src.as_bytes().get(pos).copied()
    }

    fn line_end(&self, pos: usize) -> usize {
        self.src[pos..].find('\n').map_or(self.src.len(), |n| pos + n)
    }

    fn record_comment(&mut self, start: usize, is_inline: bool) -> usize {
        let end = self.line_end(start);
        self.comments.push(Comment {
            text: self.src[start..end].to_owned(),
            span: Span::new(start, end),
            is_inline,
        });
        end
    }

    /// Advance over blank and standalone-comment lines. Leaves `pos` at the
    /// start of the next content line and returns its indent, or `None` at
    /// end of input. `pos` must be at a line start.
    fn next_content_line(&mut self) -> Result<Option<usize>, ParseError> {
        loop {
            if self.pos >= self.src.len() {
                return Ok(None);
            }
            let line_start = self.pos;
            let mut cursor = line_start;
            while self.byte(cursor) == Some(b' ') {
                cursor += 1;
            }
            match self.byte(cursor) {
                Some(b'\t') => return self.err(cursor, "tab in indentation"),
                None => {
                    self.pos = cursor;
                    return Ok(None);
                }
                Some(b'\n') => {
                    self.pos = cursor + 1;
                }
                Some(b'#') => {
                    let end = self.record_comment(cursor, false);
                    self.pos = if end < self.src.len() { end + 1 } else { end };
                }
                Some(_) => {
                    self.pos = line_start;
                    return Ok(Some(cursor - line_start));
                }
            }
        }
    }

    fn parse_root(&mut self) -> Result<Option<Node>, ParseError> {
        let Some(_) = self.next_content_line()? else {
            return Ok(None);
        };
        let root = self.parse_block_node()?;
        if self.next_content_line()?.is_some() {
            return self.err(self.pos, "trailing content after document root");
        }
        Ok(Some(root))
    }

    /// Parse the node starting at the current content line. `pos` is at the
    /// line start; the line's indent decides the block's level.
    fn parse_block_node(&mut self) -> Result<Node, ParseError> {
        let line_start = self.pos;
        let mut indent = 0;
        while self.byte(line_start + indent) == Some(b' ') {
            indent += 1;
        }
        let content = line_start + indent;

        if self.byte(content) == Some(b'-')
            && matches!(self.byte(content + 1), None | Some(b' ' | b'\n'))
        {
            return self.parse_block_sequence(indent);
        }
        if self.line_has_block_key(content) {
            return self.parse_block_mapping(indent);
        }

        self.pos = content;
        let node = self.parse_flow_value(false)?;
        self.finish_line()?;
        Ok(node)
    }

    /// Whether the content starting at `pos` reads as `key:` on this line.
    fn line_has_block_key(&self, pos: usize) -> bool {
        let end = self.line_end(pos);
        if self.byte(pos) == Some(b'"') {
            let mut cursor = pos + 1;
            while cursor < end {
                match self.byte(cursor) {
                    Some(b'\\') => cursor += 2,
                    Some(b'"') => {
                        let mut after = cursor + 1;
                        while self.byte(after) == Some(b' ') {
                            after += 1;
                        }
                        return self.byte(after) == Some(b':');
                    }
                    _ => cursor += 1,
                }
            }
            return false;
        }
        if self.byte(pos) == Some(b'-') && matches!(self.byte(pos + 1), None | Some(b' ' | b'\n'))
        {
            return false;
        }
        self.src[pos..end].contains(':')
            && !matches!(self.byte(pos), Some(b'{' | b'['))
    }

    /// Parse one `key: value` entry with the cursor at the key.
    /// `indent` is the column nested block values must exceed.
    fn parse_mapping_entry(&mut self, indent: usize) -> Result<MappingEntry, ParseError> {
        let key = self.parse_key()?;
        self.skip_spaces();
        if self.byte(self.pos) != Some(b':') {
            return self.err(self.pos, "expected ':' after mapping key");
        }
        self.pos += 1;
        self.skip_spaces();

        let value = match self.byte(self.pos) {
            None | Some(b'\n') | Some(b'#') => self.parse_nested_block(indent)?,
            _ => {
                let value = self.parse_flow_value(false)?;
                self.finish_line()?;
                value
            }
        };

        let span = Span::new(key.span.start, value.span().end);
        Ok(MappingEntry { key, value, span })
    }

    fn parse_block_mapping(&mut self, indent: usize) -> Result<Node, ParseError> {
        let mut entries: Vec<MappingEntry> = Vec::new();
        let start = self.pos + indent;

        loop {
            self.pos += indent;
            entries.push(self.parse_mapping_entry(indent)?);

            match self.next_content_line()? {
                Some(next_indent) if next_indent == indent => {}
                Some(next_indent) if next_indent > indent => {
                    return self.err(self.pos, "unexpected indent");
                }
                _ => break,
            }
        }

        let end = entries.last().map_or(start, |e| e.span.end);
        Ok(Node::Mapping(MappingNode {
            entries,
            span: Span::new(start, end),
        }))
    }

    /// Parse a mapping that starts mid-line, after a `- ` indicator.
    /// Further entries continue on lines indented to the key's column.
    fn parse_compact_mapping(&mut self, column: usize) -> Result<Node, ParseError> {
        let start = self.pos;
        let mut entries = vec![self.parse_mapping_entry(column)?];

        loop {
            let resume = self.pos;
            let recorded = self.comments.len();
            match self.next_content_line()? {
                Some(next_indent)
                    if next_indent == column && self.line_has_block_key(self.pos + column) =>
                {
                    self.pos += column;
                    entries.push(self.parse_mapping_entry(column)?);
                }
                _ => {
                    self.pos = resume;
                    self.comments.truncate(recorded);
                    break;
                }
            }
        }

        let end = entries.last().map_or(start, |e| e.span.end);
        Ok(Node::Mapping(MappingNode {
            entries,
            span: Span::new(start, end),
        }))
    }

    fn parse_block_sequence(&mut self, indent: usize) -> Result<Node, ParseError> {
        let mut items: Vec<Node> = Vec::new();
        let start = self.pos + indent;

        loop {
            let line_begin = self.pos;
            self.pos += indent;
            if self.byte(self.pos) != Some(b'-') {
                return self.err(self.pos, "expected '-' sequence indicator");
            }
            self.pos += 1;
            self.skip_spaces();

            let item = match self.byte(self.pos) {
                None | Some(b'\n') | Some(b'#') => self.parse_nested_block(indent)?,
                _ if self.line_has_block_key(self.pos) => {
                    let column = self.pos - line_begin;
                    self.parse_compact_mapping(column)?
                }
                _ => {
                    let item = self.parse_flow_value(false)?;
                    self.finish_line()?;
                    item
                }
            };
            items.push(item);

            match self.next_content_line()? {
                Some(next_indent) if next_indent == indent => {}
                Some(next_indent) if next_indent > indent => {
                    return self.err(self.pos, "unexpected indent");
                }
                _ => break,
            }
        }

        let end = items.last().map_or(start, |item| item.span().end);
        Ok(Node::Sequence(SequenceNode {
            items,
            span: Span::new(start, end),
        }))
    }

    /// Value continues as a nested block on deeper-indented lines, or is an
    /// empty scalar when no such block follows.
    fn parse_nested_block(&mut self, indent: usize) -> Result<Node, ParseError> {
        let empty_at = self.pos;
        if self.byte(self.pos) == Some(b'#') {
            let end = self.record_comment(self.pos, true);
            self.pos = end;
        }
        if self.byte(self.pos) == Some(b'\n') {
            self.pos += 1;
        }

        let resume = self.pos;
        let recorded = self.comments.len();
        match self.next_content_line()? {
            Some(next_indent) if next_indent > indent => self.parse_block_node(),
            _ => {
                // No nested block: the value is an empty scalar. Rewind so
                // the enclosing collection sees the next lines itself,
                // dropping comments recorded during the lookahead.
                self.pos = resume;
                self.comments.truncate(recorded);
                Ok(Node::Scalar(ScalarNode {
                    value: CompactString::default(),
                    span: Span::new(empty_at, empty_at),
                }))
            }
        }
    }

    fn parse_key(&mut self) -> Result<ScalarNode, ParseError> {
        if self.byte(self.pos) == Some(b'"') {
            return self.parse_quoted();
        }
        let start = self.pos;
        let end = self.line_end(self.pos);
        let Some(colon) = self.src[start..end].find(':') else {
            return self.err(start, "expected ':' on mapping line");
        };
        let mut key_end = start + colon;
        while key_end > start && self.byte(key_end - 1) == Some(b' ') {
            key_end -= 1;
        }
        if key_end == start {
            return self.err(start, "empty mapping key");
        }
        self.pos = start + colon;
        Ok(ScalarNode {
            value: CompactString::from(&self.src[start..key_end]),
            span: Span::new(start, key_end),
        })
    }

    fn skip_spaces(&mut self) {
        while matches!(self.byte(self.pos), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Consume an optional trailing comment and the line break after an
    /// inline value.
    fn finish_line(&mut self) -> Result<(), ParseError> {
        self.skip_spaces();
        if self.byte(self.pos) == Some(b'#') {
            let end = self.record_comment(self.pos, true);
            self.pos = end;
        }
        match self.byte(self.pos) {
            None => Ok(()),
            Some(b'\n') => {
                self.pos += 1;
                Ok(())
            }
            _ => self.err(self.pos, "unexpected content after value"),
        }
    }

    /// Skip whitespace (including line breaks) inside a flow collection.
    fn skip_flow_ws(&mut self) -> Result<(), ParseError> {
        loop {
            match self.byte(self.pos) {
                Some(b' ' | b'\t' | b'\n') => self.pos += 1,
                Some(b'#') => return self.err(self.pos, "comment inside flow collection"),
                _ => return Ok(()),
            }
        }
    }

    fn parse_flow_value(&mut self, in_flow: bool) -> Result<Node, ParseError> {
        match self.byte(self.pos) {
            Some(b'"') => Ok(Node::Scalar(self.parse_quoted()?)),
            Some(b'{') => self.parse_flow_mapping(),
            Some(b'[') => self.parse_flow_sequence(),
            _ => self.parse_plain_scalar(in_flow),
        }
    }

    fn parse_flow_mapping(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut entries: Vec<MappingEntry> = Vec::new();

        self.skip_flow_ws()?;
        if self.byte(self.pos) == Some(b'}') {
            self.pos += 1;
            return Ok(Node::Mapping(MappingNode {
                entries,
                span: Span::new(start, self.pos),
            }));
        }

        loop {
            self.skip_flow_ws()?;
            if self.byte(self.pos) == Some(b'}') {
                // Trailing comma before the closing brace.
                self.pos += 1;
                return Ok(Node::Mapping(MappingNode {
                    entries,
                    span: Span::new(start, self.pos),
                }));
            }
            let key = self.parse_flow_key()?;
            self.skip_flow_ws()?;
            if self.byte(self.pos) != Some(b':') {
                return self.err(self.pos, "expected ':' in flow mapping");
            }
            self.pos += 1;
            self.skip_flow_ws()?;
            let value = self.parse_flow_value(true)?;
            let span = Span::new(key.span.start, value.span().end);
            entries.push(MappingEntry { key, value, span });

            self.skip_flow_ws()?;
            match self.byte(self.pos) {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Node::Mapping(MappingNode {
                        entries,
                        span: Span::new(start, self.pos),
                    }));
                }
                _ => return self.err(self.pos, "expected ',' or '}' in flow mapping"),
            }
        }
    }

    fn parse_flow_sequence(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut items: Vec<Node> = Vec::new();

        self.skip_flow_ws()?;
        if self.byte(self.pos) == Some(b']') {
            self.pos += 1;
            return Ok(Node::Sequence(SequenceNode {
                items,
                span: Span::new(start, self.pos),
            }));
        }

        loop {
            self.skip_flow_ws()?;
            if self.byte(self.pos) == Some(b']') {
                // Trailing comma before the closing bracket.
                self.pos += 1;
                return Ok(Node::Sequence(SequenceNode {
                    items,
                    span: Span::new(start, self.pos),
                }));
            }
            items.push(self.parse_flow_value(true)?);
            self.skip_flow_ws()?;
            match self.byte(self.pos) {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Node::Sequence(SequenceNode {
                        items,
                        span: Span::new(start, self.pos),
                    }));
                }
                _ => return self.err(self.pos, "expected ',' or ']' in flow sequence"),
            }
        }
    }

    fn parse_flow_key(&mut self) -> Result<ScalarNode, ParseError> {
        if self.byte(self.pos) == Some(b'"') {
            return self.parse_quoted();
        }
        let start = self.pos;
        let mut cursor = self.pos;
        while let Some(byte) = self.byte(cursor) {
            if matches!(byte, b':' | b',' | b'}' | b']' | b'\n') {
                break;
            }
            cursor += 1;
        }
        let mut end = cursor;
        while end > start && self.byte(end - 1) == Some(b' ') {
            end -= 1;
        }
        if end == start {
            return self.err(start, "empty flow mapping key");
        }
        self.pos = cursor;
        Ok(ScalarNode {
            value: CompactString::from(&self.src[start..end]),
            span: Span::new(start, end),
        })
    }

    fn parse_plain_scalar(&mut self, in_flow: bool) -> Result<Node, ParseError> {
        let start = self.pos;
        let mut cursor = self.pos;
        while let Some(byte) = self.byte(cursor) {
            if byte == b'\n' {
                break;
            }
            if in_flow && matches!(byte, b',' | b'}' | b']') {
                break;
            }
            if !in_flow && byte == b'#' && cursor > start && self.byte(cursor - 1) == Some(b' ') {
                break;
            }
            cursor += 1;
        }
        let mut end = cursor;
        while end > start && matches!(self.byte(end - 1), Some(b' ' | b'\t')) {
            end -= 1;
        }
        if end == start {
            return self.err(start, "expected a value");
        }
        self.pos = cursor;
        Ok(Node::Scalar(ScalarNode {
            value: CompactString::from(&self.src[start..end]),
            span: Span::new(start, end),
        }))
    }

    fn parse_quoted(&mut self) -> Result<ScalarNode, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = CompactString::default();
        loop {
            match self.byte(self.pos) {
                None | Some(b'\n') => {
                    return self.err(start, "unterminated quoted scalar");
                }
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(ScalarNode {
                        value,
                        span: Span::new(start, self.pos),
                    });
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let escaped = self.byte(self.pos);
                    self.pos += 1;
                    match escaped {
                        Some(b'"') => value.push('"'),
                        Some(b'\\') => value.push('\\'),
                        Some(b'/') => value.push('/'),
                        Some(b'n') => value.push('\n'),
                        Some(b'r') => value.push('\r'),
                        Some(b't') => value.push('\t'),
                        Some(b'u') => {
                            let hex = self
                                .src
                                .get(self.pos..self.pos + 4)
                                .ok_or_else(|| ParseError {
                                    offset: self.pos,
                                    message: "truncated unicode escape".to_owned(),
                                })?;
                            let code = u32::from_str_radix(hex, 16).map_err(|_| ParseError {
                                offset: self.pos,
                                message: "invalid unicode escape".to_owned(),
                            })?;
                            let c = char::from_u32(code).ok_or_else(|| ParseError {
                                offset: self.pos,
                                message: "invalid unicode escape".to_owned(),
                            })?;
                            value.push(c);
                            self.pos += 4;
                        }
                        _ => return self.err(self.pos, "unsupported escape"),
                    }
                }
                Some(_) => {
                    let Some(c) = self.src[self.pos..].chars().next() else {
                        return self.err(self.pos, "invalid character");
                    };
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_mapping(document: &Document) -> &MappingNode {
        match document.root.as_ref().unwrap() {
            Node::Mapping(m) => m,
            other => panic!("expected mapping root, got {other:?}"),
        }
    }

    #[test]
    fn parses_block_mapping_with_spans() {
        let source = "a: 1\nb: two\n";
        let document = parse_document(source).unwrap();
        let mapping = root_mapping(&document);
        assert_eq!(mapping.entries.len(), 2);
        assert_eq!(mapping.entries[0].key.value, "a");
        assert_eq!(&source[mapping.entries[0].span.start..mapping.entries[0].span.end], "a: 1");
        assert_eq!(&source[mapping.entries[1].span.start..mapping.entries[1].span.end], "b: two");
    }

    #[test]
    fn parses_nested_block_collections() {
        let source = "outer:\n  inner: 1\nlist:\n  - x\n  - y: 2\n";
        let document = parse_document(source).unwrap();
        let mapping = root_mapping(&document);
        assert_eq!(mapping.entries.len(), 2);
        match &mapping.entries[0].value {
            Node::Mapping(inner) => assert_eq!(inner.entries[0].key.value, "inner"),
            other => panic!("expected nested mapping, got {other:?}"),
        }
        match &mapping.entries[1].value {
            Node::Sequence(list) => {
                assert_eq!(list.items.len(), 2);
                assert!(matches!(&list.items[1], Node::Mapping(m) if m.entries.len() == 1));
            }
            other => panic!("expected nested sequence, got {other:?}"),
        }
    }

    #[test]
    fn parses_multiline_flow_collections() {
        let source = "{\n  \"b\": 2,\n  \"a\": [1, {c: 3}]\n}\n";
        let document = parse_document(source).unwrap();
        let mapping = root_mapping(&document);
        assert_eq!(mapping.entries.len(), 2);
        assert_eq!(mapping.entries[0].key.value, "b");
        assert_eq!(mapping.span, Span::new(0, source.len() - 1));
        match &mapping.entries[1].value {
            Node::Sequence(list) => assert_eq!(list.items.len(), 2),
            other => panic!("expected flow sequence, got {other:?}"),
        }
    }

    #[test]
    fn records_comments_with_kinds() {
        let source = "# header\na: 1 # trailing\n# between\nb: 2\n";
        let document = parse_document(source).unwrap();
        assert_eq!(document.comments.len(), 3);
        assert_eq!(document.comments[0].text, "# header");
        assert!(!document.comments[0].is_inline);
        assert_eq!(document.comments[1].text, "# trailing");
        assert!(document.comments[1].is_inline);
        assert!(!document.comments[2].is_inline);
    }

    #[test]
    fn decodes_quoted_keys() {
        let source = "\"a\\tb\": 1\n";
        let document = parse_document(source).unwrap();
        let mapping = root_mapping(&document);
        assert_eq!(mapping.entries[0].key.value, "a\tb");
        assert_eq!(mapping.entries[0].key.span, Span::new(0, 6));
    }

    #[test]
    fn empty_value_becomes_empty_scalar() {
        let source = "a:\nb: 1\n";
        let document = parse_document(source).unwrap();
        let mapping = root_mapping(&document);
        assert_eq!(mapping.entries.len(), 2);
        assert!(matches!(
            &mapping.entries[0].value,
            Node::Scalar(s) if s.value.is_empty()
        ));
    }

    #[test]
    fn empty_document_has_no_root() {
        let document = parse_document("\n# only a comment\n\n").unwrap();
        assert!(document.root.is_none());
        assert_eq!(document.comments.len(), 1);
    }

    #[test]
    fn rejects_tab_indentation() {
        assert!(parse_document("\ta: 1\n").is_err());
    }
}
