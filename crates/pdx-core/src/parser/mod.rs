//! PDX Parser: tokenizer, object model, and recursive descent parser
//!
//! Converts PDX script into a [`Block`] tree.
//!
//! # Grammar
//!
//! ```text
//! block      := statement*
//! statement  := key '=' value
//! key        := bareword | quoted-string | integer
//! value      := scalar | '{' block '}' | '{' scalar* '}'
//! scalar     := bareword | quoted-string | integer | decimal
//! ```
//!
//! The grammar is LL(1) once the first token inside a brace has been read:
//! a following `=` makes the body a block, anything else makes it a list.
//! Barewords are promoted to dates and titles here; numbers were already
//! split off by the tokenizer.

pub mod ast;
pub mod tokenizer;

use std::path::Path;

use crate::date::Date;
use crate::title::Title;
use crate::{Error, Result};
use ast::{Block, KnownKey, List, Obj, Stmt};
use tokenizer::{Span, SpannedToken, Token, Tokenizer};

/// Parse a whole document (root mode: no enclosing braces)
///
/// # Errors
/// `Lex` for malformed literals, `Parse` with line:column for structural
/// violations.
pub fn parse_document(input: &[u8]) -> Result<Block> {
    Parser::new(input).parse_root()
}

/// Read and parse one file; errors carry the file path.
pub fn parse_file(path: &Path) -> Result<Block> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&bytes).map_err(|e| e.with_path(path))
}

/// Recursive descent parser with one token of lookahead
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    peeked: Option<SpannedToken>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Parser {
            tokenizer: Tokenizer::new(input),
            peeked: None,
        }
    }

    /// Parse statements until end of input.
    pub fn parse_root(&mut self) -> Result<Block> {
        let mut block = Block::new();
        loop {
            let tok = self.next()?;
            match tok.token {
                Token::Eof => return Ok(block),
                Token::RBrace => return Err(Error::parse(tok.span, "unmatched '}'")),
                _ => {
                    let stmt = self.parse_statement(tok)?;
                    block.push(stmt);
                }
            }
        }
    }

    // ── Token helpers ──────────────────────────────────────

    fn next(&mut self) -> Result<SpannedToken> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => self.tokenizer.next_token(),
        }
    }

    fn peek(&mut self) -> Result<&SpannedToken> {
        let tok = match self.peeked.take() {
            Some(tok) => tok,
            None => self.tokenizer.next_token()?,
        };
        Ok(self.peeked.insert(tok))
    }

    // ── Statements ─────────────────────────────────────────

    /// `key = value`, with the key token already consumed
    fn parse_statement(&mut self, key_tok: SpannedToken) -> Result<Stmt> {
        let key = key_obj(key_tok)?;

        let eq = self.next()?;
        if eq.token != Token::Equals {
            return Err(Error::parse(
                eq.span,
                format!("expected '=' after key '{}', found {}", key, eq.token.describe()),
            ));
        }

        let tok = self.next()?;
        let value = match tok.token {
            Token::LBrace => self.parse_braced(tok.span, is_color_key(&key))?,
            Token::RBrace | Token::Equals | Token::Eof => {
                return Err(Error::parse(
                    tok.span,
                    format!("missing value for '{}', found {}", key, tok.token.describe()),
                ))
            }
            _ => scalar_obj(tok)?,
        };

        Ok(Stmt { key, value })
    }

    /// Body of `{ ... }` after the opening brace: block, list, or empty block.
    fn parse_braced(&mut self, open: Span, color_context: bool) -> Result<Obj> {
        let first = self.next()?;
        match first.token {
            Token::RBrace => return Ok(Obj::Block(Block::new())),
            Token::Eof => return Err(unterminated(open)),
            Token::LBrace | Token::Equals => {
                return Err(Error::parse(
                    first.span,
                    format!("unexpected {} at start of braced value", first.token.describe()),
                ))
            }
            _ => {}
        }

        if self.peek()?.token == Token::Equals {
            let stmt = self.parse_statement(first)?;
            let block = self.parse_block_body(open, stmt)?;
            return Ok(Obj::Block(block));
        }

        let list = self.parse_list_body(open, first)?;
        if color_context {
            if let Some(color) = list.as_color() {
                return Ok(Obj::Color(color));
            }
        }
        Ok(Obj::List(list))
    }

    fn parse_block_body(&mut self, open: Span, first: Stmt) -> Result<Block> {
        let mut block = Block::new();
        block.push(first);

        loop {
            let tok = self.next()?;
            match tok.token {
                Token::RBrace => return Ok(block),
                Token::Eof => return Err(unterminated(open)),
                _ => {
                    let stmt = self.parse_statement(tok)?;
                    block.push(stmt);
                }
            }
        }
    }

    fn parse_list_body(&mut self, open: Span, first: SpannedToken) -> Result<List> {
        let mut items = vec![scalar_obj(first)?];

        loop {
            let tok = self.next()?;
            match tok.token {
                Token::RBrace => return Ok(List::new(items)),
                Token::Eof => return Err(unterminated(open)),
                Token::Equals => {
                    return Err(Error::parse(
                        tok.span,
                        "'=' inside a list; a braced value is either all statements or all scalars",
                    ))
                }
                Token::LBrace => {
                    return Err(Error::parse(tok.span, "nested '{' inside a list"))
                }
                _ => items.push(scalar_obj(tok)?),
            }
        }
    }
}

fn unterminated(open: Span) -> Error {
    Error::parse(open, "unterminated '{' at end of input")
}

fn is_color_key(key: &Obj) -> bool {
    matches!(key, Obj::String { value, .. } if KnownKey::from_key(value) == Some(KnownKey::Color))
}

/// Bareword promotion: canonical date, then title, then plain string.
fn bareword_obj(text: String) -> Obj {
    if let Some(date) = Date::parse_canonical(&text) {
        return Obj::Date(date);
    }
    match Title::new(text.as_str()) {
        Ok(title) => Obj::Title(title),
        Err(_) => Obj::bareword(text),
    }
}

fn scalar_obj(tok: SpannedToken) -> Result<Obj> {
    match tok.token {
        Token::Bareword(text) => Ok(bareword_obj(text)),
        Token::QuotedString(text) => Ok(Obj::quoted(text)),
        Token::Integer(i) => Ok(Obj::Integer(i)),
        Token::Decimal(d) => Ok(Obj::Decimal(d)),
        other => Err(Error::parse(
            tok.span,
            format!("expected a value, found {}", other.describe()),
        )),
    }
}

/// Keys never hold decimals: a `Y.M` key is a partial date, kept as a
/// string so `Stmt::classify` reads it through `Obj::as_date`.
fn key_obj(tok: SpannedToken) -> Result<Obj> {
    match tok.token {
        Token::Decimal(text) => Ok(Obj::bareword(text)),
        Token::Bareword(_) | Token::QuotedString(_) | Token::Integer(_) => scalar_obj(tok),
        other => Err(Error::parse(
            tok.span,
            format!("expected a key, found {}", other.describe()),
        )),
    }
}
