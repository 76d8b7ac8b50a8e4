//! Lexer (tokenizer)
//!
//! This module converts program text into a lazy stream of tokens.

use super::token::{Token, TokenKind, KEYWORDS};
use crate::error::{Error, Result};

/// Lexer over a single program text.
///
/// Tokens are produced on demand. As an iterator the lexer yields each token
/// once, ends with the `Eof` token and then fuses; the stream is finite and
/// cannot be restarted.
pub struct Lexer {
    /// Input text
    src: String,
    /// Current byte offset into the input
    pos: usize,
    /// Set once `Eof` (or an error) has been yielded
    done: bool,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            src: input.to_string(),
            pos: 0,
            done: false,
        }
    }

    /// Get the next token from the input.
    ///
    /// Matching tries a fixed, priority-ordered alternation: keywords,
    /// identifier, integer, string, punctuation, operators. First match
    /// wins, so a keyword also wins as the prefix of a longer word.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let offset = self.pos;
        if self.pos >= self.src.len() {
            return Ok(Token::new(TokenKind::Eof, "EOF", offset));
        }

        let rest = &self.src[self.pos..];

        for (keyword, kind) in KEYWORDS {
            if rest.starts_with(keyword) {
                self.pos += keyword.len();
                return Ok(Token::new(*kind, *keyword, offset));
            }
        }

        let ch = rest.chars().next().unwrap_or_default();

        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.read_identifier(offset));
        }

        if ch.is_ascii_digit() {
            return Ok(self.read_integer(offset));
        }

        if ch == '\'' {
            return self.read_string(offset);
        }

        let kind = match ch {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semicolon),
            '=' => Some(TokenKind::Equals),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Mul),
            '/' => Some(TokenKind::Div),
            _ => None,
        };

        if let Some(kind) = kind {
            self.pos += ch.len_utf8();
            return Ok(Token::new(kind, ch, offset));
        }

        Err(Error::UnknownSymbol(offset))
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    /// Skip whitespace (spaces, tabs, newlines) between tokens
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Read an identifier: letters or underscores, then optional digits
    fn read_identifier(&mut self, offset: usize) -> Token {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphabetic() || ch == '_') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.pos += 1;
        }
        Token::new(TokenKind::Ident, &self.src[offset..self.pos], offset)
    }

    /// Read an unsigned integer literal
    fn read_integer(&mut self, offset: usize) -> Token {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.pos += 1;
        }
        Token::new(TokenKind::Int, &self.src[offset..self.pos], offset)
    }

    /// Read a single-quoted string literal with no escape processing.
    ///
    /// The lexeme keeps both quotes; the parser strips them. An unterminated
    /// string fails the same way any unmatched symbol does.
    fn read_string(&mut self, offset: usize) -> Result<Token> {
        let rest = &self.src[self.pos + 1..];
        match rest.find('\'') {
            Some(end) => {
                self.pos += end + 2;
                Ok(Token::new(
                    TokenKind::Str,
                    &self.src[offset..self.pos],
                    offset,
                ))
            }
            None => Err(Error::UnknownSymbol(offset)),
        }
    }
}

impl Iterator for Lexer {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        match &token {
            Ok(t) if t.kind == TokenKind::Eof => self.done = true,
            Err(_) => self.done = true,
            _ => {}
        }
        Some(token)
    }
}
