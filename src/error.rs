//! Error types for flatdb
//!
//! This module defines all error types used throughout the engine.

use std::fmt;

use thiserror::Error;

/// The pipeline stage a failure originated in.
///
/// Front ends branch on this to render differentiated diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDomain {
    Lex,
    Parse,
    Storage,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Lex => write!(f, "lex"),
            ErrorDomain::Parse => write!(f, "parse"),
            ErrorDomain::Storage => write!(f, "storage"),
        }
    }
}

/// The main error type for flatdb
#[derive(Error, Debug)]
pub enum Error {
    // ========== Lexer Errors ==========
    #[error("Lex error: unrecognized symbol at offset {0}")]
    UnknownSymbol(usize),

    // ========== Parser Errors ==========
    #[error("Parse error: unexpected token '{found}' at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: String,
    },

    #[error("Parse error: integer literal out of range at offset {0}")]
    InvalidNumber(usize),

    // ========== Storage Errors ==========
    #[error("Storage error: table '{0}' not found")]
    TableNotFound(String),

    #[error("Storage error: column '{1}' not found in table '{0}'")]
    UnknownColumn(String, String),

    #[error("Storage error: primary key '{0}' is required")]
    MissingPrimaryKey(String),

    #[error("Storage error: primary key must not be empty")]
    EmptyPrimaryKey,

    #[error("Storage error: primary key '{0}' already exists")]
    DuplicatePrimaryKey(String),

    #[error("Storage error: working directory '{0}' does not exist")]
    WorkingDirNotFound(String),

    #[error("Storage error: table '{0}' has a corrupt backing file: {1}")]
    CorruptRelation(String, String),

    // ========== Execution Errors ==========
    #[error("Execution error: division by zero")]
    DivisionByZero,

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error by the pipeline stage it originated in.
    pub fn domain(&self) -> ErrorDomain {
        match self {
            Error::UnknownSymbol(_) => ErrorDomain::Lex,
            Error::UnexpectedToken { .. } | Error::InvalidNumber(_) => ErrorDomain::Parse,
            _ => ErrorDomain::Storage,
        }
    }
}

/// Result type alias for flatdb operations
pub type Result<T> = std::result::Result<T, Error>;
