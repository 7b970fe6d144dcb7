// SPDX-License-Identifier: MIT

//! Condition compilation and evaluation
//!
//! Conditions are small boolean expressions over the fields of a record:
//! - `age > 18`
//! - `name =~ "bob"`
//! - `tags in ["beta", "staff"] and (region == "eu" or score >= 0.5)`
//!
//! A [`Condition`] is compiled once and can then be evaluated any number of
//! times, from any number of threads.

mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod value;

pub use ast::{ArrayLiteral, Expression, FieldRef, LogicOp, MemberOp, NumOp, StrOp};
pub use error::{ErrorKind, EvalError, LiteralError, SyntaxError};
pub use evaluator::{evaluate, lookup};
pub use parser::{parse, MAX_DEPTH};
pub use value::{Record, Scalar, Value};

use std::fmt;
use std::str::FromStr;

/// A compiled condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    root: Expression,
}

impl Condition {
    /// Compile source text, collecting every syntax error into one
    pub fn compile(source: &str) -> Result<Self, EvalError> {
        let root = parse(source).map_err(EvalError::AggregatedSyntax)?;
        log::debug!("Compiled condition: {}", root);
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// Wrap an expression tree built in code
    pub fn from_expression(root: Expression) -> Self {
        Self {
            source: root.to_string(),
            root,
        }
    }

    /// Evaluate against a record
    pub fn evaluate(&self, record: &Record) -> Result<bool, EvalError> {
        evaluate(&self.root, record)
    }

    pub fn expression(&self) -> &Expression {
        &self.root
    }

    /// The text this condition was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Compile a condition; shorthand for [`Condition::compile`]
pub fn compile(source: &str) -> Result<Condition, EvalError> {
    Condition::compile(source)
}

impl FromStr for Condition {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::compile(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
