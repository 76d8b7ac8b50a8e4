//! Interpreter module
//!
//! This module contains the tree-walking interpreter and its result type.

pub mod interpreter;

pub use interpreter::{Interpreter, StatementResult};
