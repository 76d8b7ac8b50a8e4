//! Interpreter
//!
//! This module walks the AST, evaluates arithmetic directly and delegates
//! all table operations to the storage engine. Dispatch is an exhaustive
//! match over the statement and expression enums, so an AST kind without an
//! evaluation rule cannot compile.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sql::ast::{
    BinaryOp, Expr, Program, SelectQuery, SelectStatement, Statement,
};
use crate::storage::{Storage, Value};

/// The outcome of one statement.
///
/// A program yields exactly one entry per statement, in input order.
/// Callers branch on the variant rather than inspecting a value's shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatementResult {
    /// CREATE TABLE: true = newly created, false = the name already existed
    Created(bool),
    /// DESCRIBE: the ordered schema, primary key first
    Schema(Vec<String>),
    /// INSERT: side effect only
    Inserted,
    /// Scalar SELECT
    Scalar(i64),
    /// Tabular SELECT
    Rows(Vec<Vec<Value>>),
}

/// Tree-walking interpreter bound to one storage engine
pub struct Interpreter {
    storage: Storage,
}

impl Interpreter {
    /// Create an interpreter over relations stored under `working_dir`.
    /// The directory must already exist.
    pub fn new(working_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            storage: Storage::new(working_dir.as_ref())?,
        })
    }

    /// Run a program: evaluate each statement strictly in input order and
    /// collect one result per statement. The first failing statement aborts
    /// the remainder; results already produced are discarded with it.
    pub fn run(&self, program: &Program) -> Result<Vec<StatementResult>> {
        debug!(statements = program.statements.len(), "running program");
        program
            .statements
            .iter()
            .map(|statement| self.eval_statement(statement))
            .collect()
    }

    fn eval_statement(&self, statement: &Statement) -> Result<StatementResult> {
        match statement {
            Statement::Create(create) => {
                let created =
                    self.storage
                        .create(&create.table, &create.primary_key, &create.columns)?;
                Ok(StatementResult::Created(created))
            }
            Statement::Describe(describe) => {
                let schema = self.storage.describe(&describe.table)?;
                Ok(StatementResult::Schema(schema))
            }
            Statement::Insert(insert) => {
                let assignments: Vec<(String, Value)> = insert
                    .assignments
                    .iter()
                    .map(|assignment| (assignment.column.clone(), assignment.value.clone()))
                    .collect();
                self.storage.insert(&insert.table, &assignments)?;
                Ok(StatementResult::Inserted)
            }
            Statement::Select(SelectStatement::Expr(expr)) => {
                Ok(StatementResult::Scalar(eval_expr(expr)?))
            }
            Statement::Select(SelectStatement::Query(query)) => self.eval_select_query(query),
        }
    }

    fn eval_select_query(&self, query: &SelectQuery) -> Result<StatementResult> {
        let conditions: Vec<(String, Value)> = query
            .where_clause
            .iter()
            .map(|assignment| (assignment.column.clone(), assignment.value.clone()))
            .collect();
        let order = query
            .order
            .as_ref()
            .map(|order| (order.column.as_str(), order.ascending));

        let rows = self.storage.select(
            &query.table,
            &query.columns,
            &conditions,
            order,
            query.limit,
        )?;
        Ok(StatementResult::Rows(rows))
    }
}

/// Evaluate an arithmetic expression.
///
/// `+ - *` are standard integer operations; `/` truncates and fails on a
/// zero divisor. Precedence and associativity are whatever the parser baked
/// into the tree shape.
fn eval_expr(expr: &Expr) -> Result<i64> {
    match expr {
        Expr::Number(number) => Ok(*number),
        Expr::BinaryOp { left, op, right } => {
            let left = eval_expr(left)?;
            let right = eval_expr(right)?;
            match op {
                BinaryOp::Add => Ok(left + right),
                BinaryOp::Sub => Ok(left - right),
                BinaryOp::Mul => Ok(left * right),
                BinaryOp::Div => {
                    if right == 0 {
                        Err(Error::DivisionByZero)
                    } else {
                        Ok(left / right)
                    }
                }
            }
        }
    }
}
