//! Error types for G-code field extraction.

use std::fmt;

use serde::Serialize;

/// A field whose letter is present but whose numeral could not be read.
///
/// These never abort a run. The field is treated as absent and the anomaly is
/// reported alongside the rewrite results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub letter: char,
    pub line: usize,
    pub col: usize,
    pub kind: FieldErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    MissingValue,
    InvalidNumber,
}

impl FieldError {
    pub fn missing(letter: char, line: usize, col: usize) -> Self {
        Self {
            message: format!("'{letter}' has no numeric value"),
            letter,
            line,
            col,
            kind: FieldErrorKind::MissingValue,
        }
    }

    pub fn invalid(letter: char, numeral: &str, line: usize, col: usize) -> Self {
        Self {
            message: format!("'{letter}{numeral}' is not a valid number"),
            letter,
            line,
            col,
            kind: FieldErrorKind::InvalidNumber,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {:?}: {}",
            self.line, self.col, self.kind, self.message
        )
    }
}

impl std::error::Error for FieldError {}
