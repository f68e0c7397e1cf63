//! Caret-underline diagnostic rendering.
//!
//! Mirrors the two-line `<line> | <source>` plus underline rendering
//! used throughout the CLI: a source line, then a caret line pointing
//! at the offending span.

use std::fmt;

use crate::span::{SourceFile, Span};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A single rendered source line with a caret underline beneath it.
pub struct SourceSnippet {
    pub line: String,
    pub line_number: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub label: Option<String>,
}

impl SourceSnippet {
    pub fn new(
        line: impl Into<String>,
        line_number: usize,
        start_column: usize,
        end_column: usize,
    ) -> Self {
        Self {
            line: line.into(),
            line_number,
            start_column,
            end_column,
            label: None,
        }
    }

    /// Build a snippet directly from a source file and the span to
    /// underline.
    pub fn from_span(file: &SourceFile, span: Span) -> Self {
        let line_number = span.line as usize;
        let line = file.line_text(line_number).to_string();
        let start_column = span.column as usize;
        let width = span.len().max(1);
        Self::new(line, line_number, start_column, start_column + width)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn format(&self) -> String {
        let width = self.line_number.to_string().len().max(3);
        let mut out = String::new();
        out.push_str(&format!("{:>width$} | {}\n", self.line_number, self.line, width = width));
        out.push_str(&format!("{:>width$} | ", "", width = width));
        let underline_start = self.start_column.saturating_sub(1);
        let underline_len = self.end_column.saturating_sub(self.start_column).max(1);
        for _ in 0..underline_start {
            out.push(' ');
        }
        for _ in 0..underline_len {
            out.push('^');
        }
        if let Some(label) = &self.label {
            out.push(' ');
            out.push_str(label);
        }
        out
    }
}

/// A fully-rendered diagnostic: a headline message plus an optional
/// source snippet.
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub snippet: Option<SourceSnippet>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.level, self.message)?;
        if let Some(snippet) = &self.snippet {
            write!(f, "{}", snippet.format())?;
        }
        Ok(())
    }
}

pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    snippet: Option<SourceSnippet>,
}

impl DiagnosticBuilder {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), snippet: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Level::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Level::Warning, message)
    }

    pub fn snippet(mut self, snippet: SourceSnippet) -> Self {
        self.snippet = Some(snippet);
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic { level: self.level, message: self.message, snippet: self.snippet }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_underlines_span() {
        let snippet = SourceSnippet::new("ack: if m = 0 goto done;", 3, 10, 11);
        let rendered = snippet.format();
        assert!(rendered.contains("ack: if m = 0 goto done;"));
        assert!(rendered.lines().nth(1).unwrap().ends_with('^'));
    }

    #[test]
    fn builder_renders_headline() {
        let diag = DiagnosticBuilder::error("unexpected token")
            .snippet(SourceSnippet::new("x :=", 1, 3, 4))
            .build();
        let rendered = diag.to_string();
        assert!(rendered.starts_with("error: unexpected token"));
    }
}
