// SPDX-License-Identifier: MIT

//! Tokenizer for condition expressions
//!
//! Operator spellings are normalized here, so the parser and evaluator only
//! ever see the closed operator enums. Unrecognized characters are reported and
//! skipped; lexing always runs to the end of the input.

use super::error::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Field(String),
    Number(f64),
    /// String literal with its quotes stripped
    Str(String),
    /// Raw array literal text, brackets included
    Array(String),
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    NotEq,
    Contains,
    NotContains,
    In,
    NotIn,
    And,
    Or,
    LParen,
    RParen,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token, `<EOF>` at the end
    pub text: String,
    pub line: u32,
    pub column: u32,
}

pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
    errors: Vec<SyntaxError>,
}

/// Tokenize the whole input. The token list always ends with `Eof`.
pub fn tokenize(input: &str) -> (Vec<Token>, Vec<SyntaxError>) {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    (tokens, lexer.errors)
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            line: 1,
            column: 0,
            errors: Vec::new(),
        }
    }

    /// Get the next token, skipping anything that cannot start one
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let (line, column, start) = (self.line, self.column, self.position);
            let Some(c) = self.current() else {
                return Token {
                    kind: TokenKind::Eof,
                    text: "<EOF>".to_string(),
                    line,
                    column,
                };
            };

            let kind = match c {
                '(' => {
                    self.advance();
                    Some(TokenKind::LParen)
                }
                ')' => {
                    self.advance();
                    Some(TokenKind::RParen)
                }
                '>' => {
                    self.advance();
                    Some(self.with_eq(TokenKind::Gte, TokenKind::Gt))
                }
                '<' => {
                    self.advance();
                    Some(self.with_eq(TokenKind::Lte, TokenKind::Lt))
                }
                '=' | '!' => self.read_bang_or_eq(c),
                '"' => self.read_string(),
                '[' => self.read_array(),
                c if c.is_ascii_digit() => self.read_number(),
                '-' | '+' if self.peek().is_some_and(|n| n.is_ascii_digit()) => {
                    self.read_number()
                }
                c if c.is_alphabetic() || c == '_' => Some(self.read_word()),
                c => {
                    self.advance();
                    self.error_at(line, column, format!("token recognition error at: '{}'", c));
                    None
                }
            };

            if let Some(kind) = kind {
                return Token {
                    kind,
                    text: self.chars[start..self.position].iter().collect(),
                    line,
                    column,
                };
            }
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn error_at(&mut self, line: u32, column: u32, message: String) {
        self.errors.push(SyntaxError {
            message,
            line,
            column,
        });
    }

    fn with_eq(&mut self, with: TokenKind, without: TokenKind) -> TokenKind {
        if self.current() == Some('=') {
            self.advance();
            with
        } else {
            without
        }
    }

    /// `==`, `=~`, `!=`, `!~`
    fn read_bang_or_eq(&mut self, first: char) -> Option<TokenKind> {
        let (line, column) = (self.line, self.column);
        self.advance();
        let kind = match (first, self.current()) {
            ('=', Some('=')) => TokenKind::Eq,
            ('=', Some('~')) => TokenKind::Contains,
            ('!', Some('=')) => TokenKind::NotEq,
            ('!', Some('~')) => TokenKind::NotContains,
            _ => {
                self.error_at(
                    line,
                    column,
                    format!("token recognition error at: '{}'", first),
                );
                return None;
            }
        };
        self.advance();
        Some(kind)
    }

    fn read_string(&mut self) -> Option<TokenKind> {
        let (line, column, start) = (self.line, self.column, self.position);
        self.advance(); // opening quote
        let mut value = String::new();
        while let Some(c) = self.current() {
            self.advance();
            if c == '"' {
                return Some(TokenKind::Str(value));
            }
            value.push(c);
        }
        let text: String = self.chars[start..].iter().collect();
        self.error_at(
            line,
            column,
            format!("token recognition error at: '{}'", text),
        );
        None
    }

    /// Everything up to the matching `]`; brackets inside strings don't count
    fn read_array(&mut self) -> Option<TokenKind> {
        let (line, column, start) = (self.line, self.column, self.position);
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        while let Some(c) = self.current() {
            self.advance();
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        let text = self.chars[start..self.position].iter().collect();
                        return Some(TokenKind::Array(text));
                    }
                }
                _ => {}
            }
        }

        self.error_at(line, column, "unterminated array literal".to_string());
        None
    }

    fn read_number(&mut self) -> Option<TokenKind> {
        let (line, column, start) = (self.line, self.column, self.position);
        if matches!(self.current(), Some('-' | '+')) {
            self.advance();
        }
        self.skip_digits();
        if self.current() == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.skip_digits();
        }

        let text: String = self.chars[start..self.position].iter().collect();
        match text.parse::<f64>() {
            Ok(n) => Some(TokenKind::Number(n)),
            Err(e) => {
                self.error_at(line, column, format!("invalid number '{}': {}", text, e));
                None
            }
        }
    }

    fn skip_digits(&mut self) {
        while self.current().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn read_word(&mut self) -> TokenKind {
        let word = self.take_word();
        match word.to_lowercase().as_str() {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "in" => TokenKind::In,
            "notin" => TokenKind::NotIn,
            "not" => {
                if self.follows_in() {
                    TokenKind::NotIn
                } else {
                    TokenKind::Field(word)
                }
            }
            _ => TokenKind::Field(word),
        }
    }

    fn take_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        word
    }

    /// After `not`: consume whitespace and `in` if that is what follows.
    /// Leaves the cursor untouched otherwise.
    fn follows_in(&mut self) -> bool {
        let saved = (self.position, self.line, self.column);
        self.skip_whitespace();
        if self.position > saved.0
            && self.current().is_some_and(char::is_alphabetic)
            && self.take_word().eq_ignore_ascii_case("in")
        {
            return true;
        }
        (self.position, self.line, self.column) = saved;
        false
    }
}
