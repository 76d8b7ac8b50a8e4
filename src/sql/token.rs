//! Token definitions
//!
//! This module defines all tokens that can appear in a program.

use std::fmt;

/// Token types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // ========== Keywords ==========
    Create,
    Table,
    Primary,
    Key,

    Describe,

    Insert,
    Into,
    Set,

    Select,
    From,
    Where,
    Limit,
    Order,
    By,
    Asc,
    Desc,

    And,

    // ========== Literals ==========
    /// Identifier (table or column name)
    Ident,
    /// Unsigned integer literal
    Int,
    /// Single-quoted string literal (lexeme keeps the quotes)
    Str,

    // ========== Punctuation ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// =
    Equals,

    // ========== Arithmetic operators ==========
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Mul,
    /// /
    Div,

    // ========== Special ==========
    /// End of input
    Eof,
}

/// Keywords in matching priority order.
///
/// The lexer tries these before the identifier pattern, and tries them in
/// this exact order: `describe` must come before `desc`, or every DESCRIBE
/// statement would lex as DESC followed by an identifier.
pub(crate) const KEYWORDS: &[(&str, TokenKind)] = &[
    ("create", TokenKind::Create),
    ("table", TokenKind::Table),
    ("primary", TokenKind::Primary),
    ("key", TokenKind::Key),
    ("describe", TokenKind::Describe),
    ("insert", TokenKind::Insert),
    ("into", TokenKind::Into),
    ("set", TokenKind::Set),
    ("select", TokenKind::Select),
    ("from", TokenKind::From),
    ("where", TokenKind::Where),
    ("limit", TokenKind::Limit),
    ("order", TokenKind::Order),
    ("by", TokenKind::By),
    ("asc", TokenKind::Asc),
    ("desc", TokenKind::Desc),
    ("and", TokenKind::And),
];

impl TokenKind {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| kind == self)
    }

    /// Look up the keyword for a piece of text, if it is one
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == s)
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Create => write!(f, "create"),
            TokenKind::Table => write!(f, "table"),
            TokenKind::Primary => write!(f, "primary"),
            TokenKind::Key => write!(f, "key"),
            TokenKind::Describe => write!(f, "describe"),
            TokenKind::Insert => write!(f, "insert"),
            TokenKind::Into => write!(f, "into"),
            TokenKind::Set => write!(f, "set"),
            TokenKind::Select => write!(f, "select"),
            TokenKind::From => write!(f, "from"),
            TokenKind::Where => write!(f, "where"),
            TokenKind::Limit => write!(f, "limit"),
            TokenKind::Order => write!(f, "order"),
            TokenKind::By => write!(f, "by"),
            TokenKind::Asc => write!(f, "asc"),
            TokenKind::Desc => write!(f, "desc"),
            TokenKind::And => write!(f, "and"),
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Int => write!(f, "integer literal"),
            TokenKind::Str => write!(f, "string literal"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Equals => write!(f, "'='"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Mul => write!(f, "'*'"),
            TokenKind::Div => write!(f, "'/'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A single token: its kind, the matched text and the byte offset of the
/// lexeme's first byte in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            offset,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "['{}', {:?}]", self.lexeme, self.kind)
    }
}
