//! Small shared helpers.

/// A utility struct to convert byte offsets to line and column numbers.
///
/// The tree and the fixer work with byte offsets, but findings are reported
/// with line/column positions which are more human-readable.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source for newlines.
    /// Iterates bytes since '\n' is always a single byte in UTF-8.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a byte offset to a 1-indexed line number.
    #[must_use]
    pub fn line(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Converts a byte offset to a 1-indexed (line, column) pair.
    /// Columns count bytes from the start of the line.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.line(offset);
        let col = offset - self.line_starts[line - 1] + 1;
        (line, col)
    }
}

/// Byte offset of the start of the line containing `offset`.
#[must_use]
pub fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |pos| pos + 1)
}
