//! User-facing error types.

use thiserror::Error;

/// Error produced while parsing a textual problem description.
///
/// Line errors carry the 1-based line number and the raw offending
/// text so the message can be shown to the problem author verbatim.
/// A problem is never partially populated: any error aborts the parse.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: {message}: `{text}`")]
    Line {
        line: usize,
        message: String,
        text: String,
    },

    /// Whole-input validation failure (e.g. a portal with no inclusive
    /// region, or a missing `ENTITY_SIZE`).
    #[error("invalid problem: {0}")]
    Invalid(String),
}

impl ParseError {
    pub(crate) fn at(line: usize, message: impl Into<String>, text: &str) -> Self {
        ParseError::Line {
            line,
            message: message.into(),
            text: text.to_string(),
        }
    }
}
