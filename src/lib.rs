//! flatdb - a minimal query-language engine over flat text tables
//!
//! This library provides the core components of the engine:
//! - Query parsing (lexer, parser, AST)
//! - Tree-walking interpreter
//! - Relation storage persisted as delimiter-separated text files
//!
//! Four statement forms are supported: CREATE TABLE, DESCRIBE, INSERT and
//! SELECT (equality WHERE conjunctions, single-column ORDER BY, LIMIT).
//! SELECT also evaluates bare integer arithmetic expressions.

pub mod error;
pub mod interpreter;
pub mod sql;
pub mod storage;

pub use error::{Error, ErrorDomain, Result};
pub use interpreter::{Interpreter, StatementResult};

use std::path::Path;

/// Execute a program against the relations stored under `working_dir`.
///
/// The working directory must already exist. Returns one result per
/// statement, in input order; the first error from any stage aborts the
/// remainder of the program.
pub fn execute(text: &str, working_dir: impl AsRef<Path>) -> Result<Vec<StatementResult>> {
    let interpreter = Interpreter::new(working_dir)?;
    let program = sql::Parser::new(text)?.parse()?;
    interpreter.run(&program)
}
