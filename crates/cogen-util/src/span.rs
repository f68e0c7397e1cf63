//! Source location tracking.
//!
//! A [`Span`] is a byte-offset range plus the line/column of its start,
//! used by the lexer, parser and transformer to point diagnostics at
//! the offending source text.

use std::fmt;

/// A byte-offset range into a single source file, with human-readable
/// line/column of the first byte.
///
/// # Examples
///
/// ```
/// use cogen_util::span::Span;
///
/// let span = Span::new(10, 14, 2, 1);
/// assert_eq!(span.len(), 4);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Dummy span for synthesised nodes that have no source origin
    /// (e.g. blocks generated by the transformer).
    pub const DUMMY: Span = Span { start: 0, end: 0, line: 0, column: 0 };

    #[inline]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self { start, end, line, column }
    }

    /// A zero-width span at a single point, e.g. EOF.
    #[inline]
    pub const fn point(start: usize, line: u32, column: u32) -> Self {
        Self { start, end: start, line, column }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into the smallest span covering both. Assumes
    /// `self` starts no later than `other`.
    pub fn to(&self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The full text of a source file plus precomputed line-start offsets,
/// used to recover a [`Span`]'s source line for diagnostic rendering.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub contents: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        let contents = contents.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            contents
                .char_indices()
                .filter(|&(_, c)| c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self { name: name.into(), contents, line_starts }
    }

    /// The 1-based line number containing the given byte offset.
    pub fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    /// The text of the given 1-based line number, without its trailing
    /// newline.
    pub fn line_text(&self, line: usize) -> &str {
        if line == 0 || line > self.line_starts.len() {
            return "";
        }
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.contents.len());
        self.contents[start..end].trim_end_matches(['\n', '\r'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_and_merge() {
        let a = Span::new(0, 3, 1, 1);
        let b = Span::new(5, 8, 1, 6);
        let merged = a.to(b);
        assert_eq!(merged.start, 0);
        assert_eq!(merged.end, 8);
    }

    #[test]
    fn source_file_line_lookup() {
        let f = SourceFile::new("t.cogen", "ack:\n  return 1;\n");
        assert_eq!(f.line_text(1), "ack:");
        assert_eq!(f.line_text(2), "  return 1;");
        assert_eq!(f.line_index(5), 2);
    }
}
