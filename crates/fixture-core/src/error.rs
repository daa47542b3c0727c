//! Error types for fixture extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or tokenizing a fixture source file.
///
/// Unsupported expression shapes are not errors: the projector degrades them
/// to `null`. Only failures the front-end cannot recover from end up here.
#[derive(Error, Debug)]
pub enum FixtureError {
    /// The source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source text could not be tokenized.
    /// Line and column are 1-based and point at the offending token.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

impl FixtureError {
    /// Build a `Syntax` error for the byte `offset` within `source`.
    pub(crate) fn syntax_at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(source, offset);
        FixtureError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Translate a byte offset into a 1-based (line, column) pair.
/// Columns count characters, not bytes.
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Convenience alias used throughout fixture-core.
pub type Result<T> = std::result::Result<T, FixtureError>;
