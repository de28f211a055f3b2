//! Error types for header parsing and layout.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a header.
///
/// Only block-structure violations inside an aggregate and failures of the
/// top-level file itself escape the parser as `Err`; everything else is
/// recorded as a diagnostic and parsing continues.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("syntax error at line {line}: {message}")]
    MalformedSyntax { line: usize, message: String },

    #[error("unexpected end of input while parsing {context}")]
    UnexpectedEof { context: &'static str },

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("{name} is already registered as {existing}")]
    DuplicateType { name: String, existing: &'static str },
}

impl ParseError {
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedSyntax {
            line,
            message: message.into(),
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised by the layout calculator for a single aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("member {field} has size {size}, which is not a multiple of the alignment unit")]
    Alignment { field: String, size: usize },

    #[error("array member {field} of {size} bytes has narrow elements, which the layout does not support")]
    NarrowArray { field: String, size: usize },

    #[error("member {field} of {size} bytes cannot continue the pending alignment run")]
    BadRunSize { field: String, size: usize },
}
