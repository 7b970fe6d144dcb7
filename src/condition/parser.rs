// SPDX-License-Identifier: MIT

//! Condition expression parser
//!
//! Parses expressions like:
//! - `age > 18`
//! - `name =~ "bo"`
//! - `tags not in ["a", "b"] or (score >= 0.5 and region == "eu")`
//!
//! `and` and `or` share one precedence level and associate to the left.
//! The parser recovers from errors so that every syntax error in the input is
//! reported, not only the first.

use super::ast::{ArrayLiteral, Expression, FieldRef, LogicOp, MemberOp, NumOp, StrOp};
use super::error::SyntaxError;
use super::lexer::{tokenize, Token, TokenKind};

const EXPECTING_OPERATOR: &str = "{'>', '<', '>=', '<=', '==', '!=', '=~', '!~', IN, NOT IN}";
const EXPECTING_OPERAND: &str = "{'(', FIELD}";

/// Deepest tree the parser will build. Each group and each link of an
/// `and`/`or` chain adds one level.
pub const MAX_DEPTH: usize = 128;

/// Parse a condition expression into an AST, or every syntax error in source order
pub fn parse(input: &str) -> Result<Expression, Vec<SyntaxError>> {
    let (tokens, mut errors) = tokenize(input);
    let mut parser = Parser {
        tokens,
        position: 0,
        errors: Vec::new(),
        nesting: 0,
        too_deep: false,
    };

    let root = parser.parse_root();
    errors.append(&mut parser.errors);
    errors.sort_by_key(|e| (e.line, e.column));

    match root {
        Some(expr) if errors.is_empty() => Ok(expr),
        _ => Err(errors),
    }
}

/// A parsed subtree and its depth
type Node = (Expression, usize);

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    errors: Vec<SyntaxError>,
    /// Open parentheses around the cursor
    nesting: usize,
    /// Set once the depth limit is hit; the rest of the input is skipped
    too_deep: bool,
}

impl Parser {
    fn parse_root(&mut self) -> Option<Expression> {
        let expr = self.parse_expr();
        if self.peek().kind != TokenKind::Eof {
            let token = self.peek().clone();
            self.error(&token, format!("extraneous input '{}' expecting <EOF>", token.text));
        }
        expr.map(|(expr, _)| expr)
    }

    /// expr := primary (LOGOP primary)*
    fn parse_expr(&mut self) -> Option<Node> {
        let mut left = self.parse_primary();

        while let Some(op) = self.peek_logic_op() {
            let op_token = self.peek().clone();
            self.advance();
            let right = self.parse_primary();
            left = match (left, right) {
                (Some((left, l)), Some((right, r))) => {
                    let depth = l.max(r) + 1;
                    if depth > MAX_DEPTH {
                        self.nested_too_deeply(&op_token);
                        return None;
                    }
                    let expr = Expression::Logical {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                    Some((expr, depth))
                }
                _ => None,
            };
        }

        left
    }

    /// primary := '(' expr ')' | comparison
    fn parse_primary(&mut self) -> Option<Node> {
        if self.too_deep {
            return None;
        }

        let token = self.peek().clone();
        match token.kind {
            TokenKind::LParen => {
                if self.nesting >= MAX_DEPTH {
                    self.nested_too_deeply(&token);
                    return None;
                }
                self.advance();
                self.nesting += 1;
                let inner = self.parse_expr();
                self.nesting -= 1;
                if self.too_deep {
                    return None;
                }

                if self.peek().kind == TokenKind::RParen {
                    self.advance();
                } else {
                    let at = self.peek().clone();
                    self.error(&at, format!("missing ')' at '{}'", at.text));
                }

                let (inner, depth) = inner?;
                if depth >= MAX_DEPTH {
                    self.nested_too_deeply(&token);
                    return None;
                }
                Some((Expression::group(inner), depth + 1))
            }
            TokenKind::Field(name) => {
                self.advance();
                self.parse_comparison(FieldRef::new(name, token.column))
                    .map(|expr| (expr, 1))
            }
            _ => {
                self.mismatched(&token, EXPECTING_OPERAND);
                None
            }
        }
    }

    /// comparison := FIELD NUMOP NUMBER | FIELD STROP STRING | FIELD MEMBEROP ARRAY
    fn parse_comparison(&mut self, key: FieldRef) -> Option<Expression> {
        let op_token = self.peek().clone();
        let num_op = match op_token.kind {
            TokenKind::Gt => Some(NumOp::Gt),
            TokenKind::Lt => Some(NumOp::Lt),
            TokenKind::Gte => Some(NumOp::Gte),
            TokenKind::Lte => Some(NumOp::Lte),
            _ => None,
        };

        if let Some(op) = num_op {
            self.advance();
            let literal = self.expect_number()?;
            return Some(Expression::NumericComparison { key, op, literal });
        }

        match op_token.kind {
            TokenKind::Eq | TokenKind::NotEq => {
                self.advance();
                let is_eq = op_token.kind == TokenKind::Eq;
                let next = self.peek().clone();
                match next.kind {
                    TokenKind::Number(literal) => {
                        self.advance();
                        let op = if is_eq { NumOp::Eq } else { NumOp::NotEq };
                        Some(Expression::NumericComparison { key, op, literal })
                    }
                    TokenKind::Str(literal) => {
                        self.advance();
                        let op = if is_eq { StrOp::Eq } else { StrOp::NotEq };
                        Some(Expression::StringComparison { key, op, literal })
                    }
                    _ => {
                        self.mismatched(&next, "{NUMBER, STRING}");
                        None
                    }
                }
            }
            TokenKind::Contains | TokenKind::NotContains => {
                self.advance();
                let op = if op_token.kind == TokenKind::Contains {
                    StrOp::Contains
                } else {
                    StrOp::NotContains
                };
                let literal = self.expect_string()?;
                Some(Expression::StringComparison { key, op, literal })
            }
            TokenKind::In | TokenKind::NotIn => {
                self.advance();
                let op = if op_token.kind == TokenKind::In {
                    MemberOp::In
                } else {
                    MemberOp::NotIn
                };
                let literal = self.expect_array()?;
                Some(Expression::ArrayMembership { key, op, literal })
            }
            _ => {
                self.mismatched(&op_token, EXPECTING_OPERATOR);
                None
            }
        }
    }

    fn expect_number(&mut self) -> Option<f64> {
        let token = self.peek().clone();
        if let TokenKind::Number(n) = token.kind {
            self.advance();
            return Some(n);
        }
        self.mismatched(&token, "NUMBER");
        None
    }

    fn expect_string(&mut self) -> Option<String> {
        let token = self.peek().clone();
        if let TokenKind::Str(s) = token.kind {
            self.advance();
            return Some(s);
        }
        self.mismatched(&token, "STRING");
        None
    }

    fn expect_array(&mut self) -> Option<ArrayLiteral> {
        let token = self.peek().clone();
        if let TokenKind::Array(text) = token.kind {
            self.advance();
            return Some(ArrayLiteral::new(text));
        }
        self.mismatched(&token, "ARRAY");
        None
    }

    fn peek(&self) -> &Token {
        // The token stream always ends with Eof and the cursor never passes it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.peek().kind != TokenKind::Eof {
            self.position += 1;
        }
    }

    fn peek_logic_op(&self) -> Option<LogicOp> {
        match self.peek().kind {
            TokenKind::And => Some(LogicOp::And),
            TokenKind::Or => Some(LogicOp::Or),
            _ => None,
        }
    }

    fn error(&mut self, token: &Token, message: String) {
        self.errors.push(SyntaxError {
            message,
            line: token.line,
            column: token.column,
        });
    }

    /// Report an over-deep tree and abandon the rest of the input
    fn nested_too_deeply(&mut self, token: &Token) {
        self.error(token, "expression nested too deeply".to_string());
        self.too_deep = true;
        self.position = self.tokens.len() - 1;
    }

    /// Report a mismatch and skip to a point where parsing can resume
    fn mismatched(&mut self, token: &Token, expecting: &str) {
        self.error(
            token,
            format!("mismatched input '{}' expecting {}", token.text, expecting),
        );
        while !matches!(
            self.peek().kind,
            TokenKind::And | TokenKind::Or | TokenKind::RParen | TokenKind::Eof
        ) {
            self.advance();
        }
    }
}
