// SPDX-License-Identifier: MIT

//! Errors raised while compiling or evaluating a condition

use std::fmt;
use std::num::ParseFloatError;
use thiserror::Error;

/// A single syntax error reported by the lexer or parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// 1-based line
    pub line: u32,
    /// 0-based column
    pub column: u32,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{} {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Why a literal or a field value failed to parse
#[derive(Debug, Error)]
pub enum LiteralError {
    #[error(transparent)]
    Number(#[from] ParseFloatError),

    #[error(transparent)]
    Array(#[from] serde_json::Error),
}

/// Error returned by `compile` and `evaluate`
#[derive(Debug, Error)]
pub enum EvalError {
    /// One or more syntax errors, in source order
    #[error("syntax error: {}", join_syntax_errors(.0))]
    AggregatedSyntax(Vec<SyntaxError>),

    /// The record has no such field
    #[error("column {column}: field '{name}' does not exist")]
    FieldNotFound { name: String, column: u32 },

    /// A literal or a looked-up value could not be parsed
    #[error("parse data error: {field}: {cause}")]
    LiteralParse {
        field: String,
        column: Option<u32>,
        #[source]
        cause: LiteralError,
    },
}

/// Discriminant of an [`EvalError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AggregatedSyntaxError,
    FieldNotFound,
    LiteralParseError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::AggregatedSyntaxError => write!(f, "syntax"),
            ErrorKind::FieldNotFound => write!(f, "field_not_found"),
            ErrorKind::LiteralParseError => write!(f, "literal_parse"),
        }
    }
}

fn join_syntax_errors(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl EvalError {
    /// Create a field-not-found error
    pub fn field_not_found(name: impl Into<String>, column: u32) -> Self {
        Self::FieldNotFound {
            name: name.into(),
            column,
        }
    }

    /// Create a literal parse error
    pub fn literal_parse(
        field: impl Into<String>,
        column: Option<u32>,
        cause: impl Into<LiteralError>,
    ) -> Self {
        Self::LiteralParse {
            field: field.into(),
            column,
            cause: cause.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::AggregatedSyntax(_) => ErrorKind::AggregatedSyntaxError,
            EvalError::FieldNotFound { .. } => ErrorKind::FieldNotFound,
            EvalError::LiteralParse { .. } => ErrorKind::LiteralParseError,
        }
    }

    /// The field the error is about, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            EvalError::AggregatedSyntax(_) => None,
            EvalError::FieldNotFound { name, .. } => Some(name),
            EvalError::LiteralParse { field, .. } => Some(field),
        }
    }

    /// Source column of the offending field, or of the first syntax error
    pub fn column(&self) -> Option<u32> {
        match self {
            EvalError::AggregatedSyntax(errors) => errors.first().map(|e| e.column),
            EvalError::FieldNotFound { column, .. } => Some(*column),
            EvalError::LiteralParse { column, .. } => *column,
        }
    }

    /// Every syntax error carried by this error; empty for evaluation errors
    pub fn syntax_errors(&self) -> &[SyntaxError] {
        match self {
            EvalError::AggregatedSyntax(errors) => errors,
            _ => &[],
        }
    }
}
