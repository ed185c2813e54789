//! Error types for the item text parser.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while parsing a single item's text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Ran past the last line while a line was still expected.
    #[error("unexpected end of input at line {line}")]
    UnexpectedEof {
        /// Index of the line that was expected.
        line: usize,
    },
    /// A line did not contain the field its position requires.
    #[error("missing {field}")]
    MissingField {
        /// Human-readable name of the field (e.g. "item class").
        field: &'static str,
    },
    /// A separator line was expected but something else was found.
    #[error("expected separator, found '{found}'")]
    ExpectedSeparator { found: String },
    /// The mandatory `Requirements:` header is absent.
    #[error("expected 'Requirements:' header, found '{found}'")]
    MissingRequirements { found: String },
    /// A requirement key outside level/str/dex/int.
    #[error("unknown requirement '{key}'")]
    UnknownRequirement { key: String },
    /// A requirement line that is not `Key: value`.
    #[error("malformed requirement line")]
    MalformedRequirement,
    /// A trait value with more than two range bounds.
    #[error("unable to parse trait value '{value}'")]
    MalformedTrait { value: String },
    /// A parenthesised stat range that is not `(lo-hi)`.
    #[error("malformed range '{range}'")]
    MalformedRange { range: String },
    /// A token that should be numeric failed to convert.
    #[error("invalid number '{text}'")]
    InvalidNumber { text: String },
    /// Two separators with nothing between them.
    #[error("empty line group")]
    EmptyGroup,
    /// A `(...)` comment line before any effect line in a modifier block.
    #[error("comment line without a preceding effect")]
    OrphanComment,
    /// A pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(String),
}

/// A failed item parse, with enough context to locate the problem.
///
/// Partial results are never returned alongside a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    /// Label of where the text came from (file name, "REPL", ...).
    pub source_label: String,
    /// Item name, if parsing got far enough to read it.
    pub name: Option<String>,
    /// Index of the line being processed when the failure happened.
    pub line: Option<usize>,
    /// Text of that line, when it exists.
    pub line_text: Option<String>,
    /// What went wrong.
    pub kind: ParseError,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error in item \"{}\" from \"{}\"",
            self.name.as_deref().unwrap_or(""),
            self.source_label
        )?;
        if let Some(line) = self.line {
            write!(f, " at line {}", line)?;
        }
        if let Some(text) = &self.line_text {
            write!(f, " ('{}')", text)?;
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for ParseFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
