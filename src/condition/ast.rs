// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree for condition expressions

use super::value::Scalar;
use std::fmt;

/// A condition expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// field op number
    NumericComparison {
        key: FieldRef,
        op: NumOp,
        literal: f64,
    },
    /// field op "string"
    StringComparison {
        key: FieldRef,
        op: StrOp,
        literal: String,
    },
    /// field in [..] / field not in [..]
    ArrayMembership {
        key: FieldRef,
        op: MemberOp,
        literal: ArrayLiteral,
    },
    /// left and/or right
    Logical {
        op: LogicOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// ( inner )
    Grouping(Box<Expression>),
}

/// A reference to a record field, with the column it was written at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub name: String,
    pub column: u32,
}

/// Numeric comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumOp {
    /// >
    Gt,
    /// <
    Lt,
    /// ==
    Eq,
    /// !=
    NotEq,
    /// >=
    Gte,
    /// <=
    Lte,
}

/// String comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrOp {
    /// =~ (substring, not a regex)
    Contains,
    /// !~
    NotContains,
    /// ==
    Eq,
    /// !=
    NotEq,
}

/// Array membership operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOp {
    In,
    NotIn,
}

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// A JSON-style array literal, kept as written.
///
/// The text is only parsed when the comparison is evaluated, so a malformed
/// array compiles and fails at evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLiteral {
    text: String,
}

impl FieldRef {
    pub fn new(name: impl Into<String>, column: u32) -> Self {
        Self {
            name: name.into(),
            column,
        }
    }
}

impl ArrayLiteral {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Parse the literal into its elements
    pub fn parse(&self) -> Result<Vec<Scalar>, serde_json::Error> {
        serde_json::from_str(&self.text)
    }
}

impl Expression {
    /// Combine two expressions with `and`
    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::Logical {
            op: LogicOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Combine two expressions with `or`
    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Logical {
            op: LogicOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Wrap an expression in parentheses
    pub fn group(inner: Expression) -> Self {
        Expression::Grouping(Box::new(inner))
    }

    /// Field names referenced by this expression, in source order
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expression::NumericComparison { key, .. }
            | Expression::StringComparison { key, .. }
            | Expression::ArrayMembership { key, .. } => out.push(&key.name),
            Expression::Logical { left, right, .. } => {
                left.collect_fields(out);
                right.collect_fields(out);
            }
            Expression::Grouping(inner) => inner.collect_fields(out),
        }
    }
}

impl fmt::Display for NumOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumOp::Gt => write!(f, ">"),
            NumOp::Lt => write!(f, "<"),
            NumOp::Eq => write!(f, "=="),
            NumOp::NotEq => write!(f, "!="),
            NumOp::Gte => write!(f, ">="),
            NumOp::Lte => write!(f, "<="),
        }
    }
}

impl fmt::Display for StrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrOp::Contains => write!(f, "=~"),
            StrOp::NotContains => write!(f, "!~"),
            StrOp::Eq => write!(f, "=="),
            StrOp::NotEq => write!(f, "!="),
        }
    }
}

impl fmt::Display for MemberOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberOp::In => write!(f, "in"),
            MemberOp::NotIn => write!(f, "not in"),
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicOp::And => write!(f, "and"),
            LogicOp::Or => write!(f, "or"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::NumericComparison { key, op, literal } => {
                write!(f, "{} {} {}", key.name, op, literal)
            }
            Expression::StringComparison { key, op, literal } => {
                write!(f, "{} {} \"{}\"", key.name, op, literal)
            }
            Expression::ArrayMembership { key, op, literal } => {
                write!(f, "{} {} {}", key.name, op, literal.as_str())
            }
            Expression::Logical { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Expression::Grouping(inner) => write!(f, "({})", inner),
        }
    }
}
