//! Abstract syntax tree
//!
//! This module defines the closed set of AST nodes for statements and
//! expressions. The node set is a group of exhaustively-matched enums and
//! absent clauses are `Option` or an empty list, so a statement kind
//! without an evaluation rule is a compile error rather than a runtime one.

use crate::storage::Value;

/// Arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Arithmetic expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal
    Number(i64),
    /// Binary operation
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

/// Column assignment: one `column = value` pair, used by INSERT and by the
/// equality predicates of WHERE.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: Value,
}

/// ORDER BY clause: a single column with a required direction
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    /// Ascending (true) or descending (false)
    pub ascending: bool,
}

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    Create(CreateStatement),
    /// DESCRIBE statement
    Describe(DescribeStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// SELECT statement
    Select(SelectStatement),
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateStatement {
    /// Table name
    pub table: String,
    /// Primary key column name
    pub primary_key: String,
    /// Non-key column names, in schema order
    pub columns: Vec<String>,
}

/// DESCRIBE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DescribeStatement {
    /// Table name
    pub table: String,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table: String,
    /// SET clause assignments
    pub assignments: Vec<Assignment>,
}

/// SELECT statement: either a bare arithmetic expression (a scalar query
/// with no table and no clauses) or a projection query against a table.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectStatement {
    /// `select <expr>;`
    Expr(Expr),
    /// `select <columns> from <table> ...;`
    Query(SelectQuery),
}

/// The table-backed form of SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    /// Source table name
    pub table: String,
    /// Projection list, in requested order; duplicates permitted
    pub columns: Vec<String>,
    /// WHERE clause: equality predicates combined with AND (empty = none)
    pub where_clause: Vec<Assignment>,
    /// ORDER BY clause
    pub order: Option<OrderBy>,
    /// LIMIT clause; 0 means unbounded, like absence
    pub limit: Option<u64>,
}

/// A full program: the ordered statement list
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}
