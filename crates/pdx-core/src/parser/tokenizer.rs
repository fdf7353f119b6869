//! PDX Tokenizer: converts PDX script bytes into a token stream
//!
//! Handles: barewords (identifiers, titles and date-like words alike),
//! quoted strings, integer/decimal literals, braces and `=`.
//! Comments (`#` to end of line) and whitespace are discarded.
//!
//! Bytes are decoded as Latin-1, so every input byte maps to exactly one
//! `char` and decoding never fails.
//!
//! Guarantees:
//! - Deterministic: same input always produces same token stream
//! - Forward-only: `next_token` never backtracks past the current token
//! - Every token and error carries a 1-based line:column

use crate::{Error, Result};

/// Token types for PDX syntax
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Unquoted word: identifier, title reference or date-like text
    Bareword(String),
    /// `"..."` with the quotes stripped
    QuotedString(String),
    Integer(i64),
    /// Decimal literal kept as its exact source text
    Decimal(String),

    LBrace, // {
    RBrace, // }
    Equals, // =

    Eof,
}

impl Token {
    /// Short description for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Bareword(s) => format!("'{}'", s),
            Token::QuotedString(s) => format!("\"{}\"", s),
            Token::Integer(i) => format!("'{}'", i),
            Token::Decimal(d) => format!("'{}'", d),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// Position in source text for error reporting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token with source position
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// True for characters that may appear in a bareword
pub fn is_bareword_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '.' | ':' | '-')
        || (!c.is_ascii() && c.is_alphabetic())
}

/// Tokenizer for PDX source bytes
pub struct Tokenizer<'a> {
    input: &'a [u8],
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer over the given bytes
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            input,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input into a stream of spanned tokens
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Produce the next token; yields `Eof` forever once input is exhausted.
    pub fn next_token(&mut self) -> Result<SpannedToken> {
        self.skip_whitespace_and_comments();

        let span = self.current_span();
        let ch = match self.peek() {
            Some(c) => c,
            None => {
                return Ok(SpannedToken {
                    token: Token::Eof,
                    span,
                })
            }
        };

        match ch {
            '{' => self.single(Token::LBrace, span),
            '}' => self.single(Token::RBrace, span),
            '=' => self.single(Token::Equals, span),
            '"' => self.read_string(span),
            c if is_bareword_char(c) => self.read_word(span),
            _ => Err(Error::lex(span, format!("unexpected character '{}'", ch))),
        }
    }

    // ── Character helpers ──────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).map(|&b| b as char)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if let Some(c) = ch {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn current_span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    fn single(&mut self, token: Token, span: Span) -> Result<SpannedToken> {
        self.advance();
        Ok(SpannedToken { token, span })
    }

    // ── Whitespace & Comments ──────────────────────────────

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while let Some(ch) = self.peek() {
                if matches!(ch, ' ' | '\t' | '\n' | '\r') {
                    self.advance();
                } else {
                    break;
                }
            }

            if self.peek() == Some('#') {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.advance();
                }
                continue;
            }

            break;
        }
    }

    // ── Quoted strings ─────────────────────────────────────

    fn read_string(&mut self, span: Span) -> Result<SpannedToken> {
        self.advance(); // opening "
        let mut value = String::new();

        loop {
            match self.advance() {
                None => return Err(Error::lex(span, "unterminated string")),
                Some('"') => break,
                Some(c) => value.push(c),
            }
        }

        Ok(SpannedToken {
            token: Token::QuotedString(value),
            span,
        })
    }

    // ── Barewords & numbers ────────────────────────────────

    fn read_word(&mut self, span: Span) -> Result<SpannedToken> {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if !is_bareword_char(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }

        let token = match classify_number(&text) {
            Some(NumberShape::Integer) => {
                let val: i64 = text.parse().map_err(|_| {
                    Error::lex(span, format!("integer literal '{}' out of range", text))
                })?;
                Token::Integer(val)
            }
            Some(NumberShape::Decimal) => Token::Decimal(text),
            None => Token::Bareword(text),
        };

        Ok(SpannedToken { token, span })
    }
}

enum NumberShape {
    Integer,
    Decimal,
}

/// `-?[0-9]+` is an integer, `-?[0-9]+\.[0-9]+` a decimal; anything else
/// (including `1066.1.1`) stays a bareword.
fn classify_number(text: &str) -> Option<NumberShape> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match digits.split_once('.') {
        None if all_digits(digits) => Some(NumberShape::Integer),
        Some((int, frac)) if all_digits(int) && all_digits(frac) => Some(NumberShape::Decimal),
        _ => None,
    }
}
