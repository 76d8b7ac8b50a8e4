//! Parser
//!
//! This module parses the token stream into an AST by recursive descent
//! with one token of lookahead. The first syntax error aborts parsing; no
//! partial AST is produced.

use super::ast::*;
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::error::{Error, Result};
use crate::storage::Value;

/// Recursive-descent parser
pub struct Parser {
    lexer: Lexer,
    /// One token of lookahead
    current: Token,
}

impl Parser {
    /// Create a new parser over a program text
    pub fn new(text: &str) -> Result<Self> {
        let mut lexer = Lexer::new(text);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse a full program: `statement*` consumed until end of input
    pub fn parse(&mut self) -> Result<Program> {
        let mut statements = Vec::new();
        while self.current.kind != TokenKind::Eof {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    /// Parse a single statement, dispatched on the leading keyword
    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current.kind {
            TokenKind::Create => self.parse_create().map(Statement::Create),
            TokenKind::Describe => self.parse_describe().map(Statement::Describe),
            TokenKind::Insert => self.parse_insert().map(Statement::Insert),
            TokenKind::Select => self.parse_select().map(Statement::Select),
            _ => Err(self.unexpected("create, describe, insert or select")),
        }
    }

    // ========== CREATE Statement ==========

    /// `CREATE TABLE id '(' PRIMARY KEY id (',' id)* ')' ';'`
    fn parse_create(&mut self) -> Result<CreateStatement> {
        self.expect(TokenKind::Create)?;
        self.expect(TokenKind::Table)?;
        let table = self.expect_identifier()?;

        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::Primary)?;
        self.expect(TokenKind::Key)?;
        let primary_key = self.expect_identifier()?;

        let mut columns = Vec::new();
        while self.check(TokenKind::Comma) {
            self.advance()?;
            columns.push(self.expect_identifier()?);
        }

        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;

        Ok(CreateStatement {
            table,
            primary_key,
            columns,
        })
    }

    // ========== DESCRIBE Statement ==========

    /// `DESCRIBE id ';'`
    fn parse_describe(&mut self) -> Result<DescribeStatement> {
        self.expect(TokenKind::Describe)?;
        let table = self.expect_identifier()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(DescribeStatement { table })
    }

    // ========== INSERT Statement ==========

    /// `INSERT INTO id SET assign (',' assign)* ';'`
    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(TokenKind::Insert)?;
        self.expect(TokenKind::Into)?;
        let table = self.expect_identifier()?;
        self.expect(TokenKind::Set)?;

        let mut assignments = vec![self.parse_assignment()?];
        while self.check(TokenKind::Comma) {
            self.advance()?;
            assignments.push(self.parse_assignment()?);
        }

        self.expect(TokenKind::Semicolon)?;

        Ok(InsertStatement { table, assignments })
    }

    /// `assign := id '=' value`
    fn parse_assignment(&mut self) -> Result<Assignment> {
        let column = self.expect_identifier()?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_value()?;
        Ok(Assignment { column, value })
    }

    /// `value := INT | STRING`
    fn parse_value(&mut self) -> Result<Value> {
        match self.current.kind {
            TokenKind::Int => {
                let token = self.advance()?;
                let number = token
                    .lexeme
                    .parse()
                    .map_err(|_| Error::InvalidNumber(token.offset))?;
                Ok(Value::Integer(number))
            }
            TokenKind::Str => {
                let token = self.advance()?;
                // Strip the surrounding quotes; no escape processing.
                let inner = &token.lexeme[1..token.lexeme.len() - 1];
                Ok(Value::Text(inner.to_string()))
            }
            _ => Err(self.unexpected("integer or string literal")),
        }
    }

    // ========== SELECT Statement ==========

    /// `SELECT select_expr ';'`
    ///
    /// `select_expr` branches on the next token: an identifier starts a
    /// projection query, anything else is a bare arithmetic expression.
    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(TokenKind::Select)?;

        let statement = if self.check(TokenKind::Ident) {
            SelectStatement::Query(self.parse_select_query()?)
        } else {
            SelectStatement::Expr(self.parse_expr()?)
        };

        self.expect(TokenKind::Semicolon)?;
        Ok(statement)
    }

    /// `id (',' id)* FROM id (WHERE assign (AND assign)*)?
    ///  (ORDER BY id (ASC|DESC))? (LIMIT INT)?`
    fn parse_select_query(&mut self) -> Result<SelectQuery> {
        let mut columns = vec![self.expect_identifier()?];
        while self.check(TokenKind::Comma) {
            self.advance()?;
            columns.push(self.expect_identifier()?);
        }

        self.expect(TokenKind::From)?;
        let table = self.expect_identifier()?;

        let mut where_clause = Vec::new();
        if self.check(TokenKind::Where) {
            self.advance()?;
            where_clause.push(self.parse_assignment()?);
            while self.check(TokenKind::And) {
                self.advance()?;
                where_clause.push(self.parse_assignment()?);
            }
        }

        let order = if self.check(TokenKind::Order) {
            self.advance()?;
            self.expect(TokenKind::By)?;
            let column = self.expect_identifier()?;
            let ascending = match self.current.kind {
                TokenKind::Asc => {
                    self.advance()?;
                    true
                }
                TokenKind::Desc => {
                    self.advance()?;
                    false
                }
                _ => return Err(self.unexpected("asc or desc")),
            };
            Some(OrderBy { column, ascending })
        } else {
            None
        };

        let limit = if self.check(TokenKind::Limit) {
            self.advance()?;
            Some(self.expect_integer()? as u64)
        } else {
            None
        };

        Ok(SelectQuery {
            table,
            columns,
            where_clause,
            order,
            limit,
        })
    }

    // ========== Expression Parsing ==========

    /// `expr := term (('+' | '-') term)*`
    fn parse_expr(&mut self) -> Result<Expr> {
        let mut node = self.parse_term()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_term()?;
            node = Expr::BinaryOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }

        Ok(node)
    }

    /// `term := factor (('*' | '/') factor)*`
    fn parse_term(&mut self) -> Result<Expr> {
        let mut node = self.parse_factor()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Mul => BinaryOp::Mul,
                TokenKind::Div => BinaryOp::Div,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_factor()?;
            node = Expr::BinaryOp {
                left: Box::new(node),
                op,
                right: Box::new(right),
            };
        }

        Ok(node)
    }

    /// `factor := INT | '(' expr ')'`
    fn parse_factor(&mut self) -> Result<Expr> {
        match self.current.kind {
            TokenKind::Int => {
                let token = self.advance()?;
                let number = token
                    .lexeme
                    .parse()
                    .map_err(|_| Error::InvalidNumber(token.offset))?;
                Ok(Expr::Number(number))
            }
            TokenKind::LParen => {
                self.advance()?;
                let node = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(node)
            }
            _ => Err(self.unexpected("integer or '('")),
        }
    }

    // ========== Helper functions ==========

    /// Replace the lookahead with the next token and return the old one
    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consume a token of exactly the expected kind, or fail
    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        self.expect(TokenKind::Ident).map(|token| token.lexeme)
    }

    fn expect_integer(&mut self) -> Result<i64> {
        let token = self.expect(TokenKind::Int)?;
        token
            .lexeme
            .parse()
            .map_err(|_| Error::InvalidNumber(token.offset))
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::UnexpectedToken {
            found: self.current.lexeme.clone(),
            offset: self.current.offset,
            expected: expected.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Program> {
        Parser::new(text)?.parse()
    }

    fn single(text: &str) -> Statement {
        let mut program = parse(text).unwrap();
        assert_eq!(program.statements.len(), 1);
        program.statements.remove(0)
    }

    #[test]
    fn test_parse_create() {
        let stmt = single("create table foobar (primary key foo, bar, buz);");
        match stmt {
            Statement::Create(create) => {
                assert_eq!(create.table, "foobar");
                assert_eq!(create.primary_key, "foo");
                assert_eq!(create.columns, vec!["bar", "buz"]);
            }
            _ => panic!("expected CREATE statement"),
        }
    }

    #[test]
    fn test_parse_create_key_only() {
        let stmt = single("create table foo (primary key uid);");
        match stmt {
            Statement::Create(create) => {
                assert_eq!(create.primary_key, "uid");
                assert!(create.columns.is_empty());
            }
            _ => panic!("expected CREATE statement"),
        }
    }

    #[test]
    fn test_parse_describe() {
        let stmt = single("describe foo;");
        match stmt {
            Statement::Describe(describe) => assert_eq!(describe.table, "foo"),
            _ => panic!("expected DESCRIBE statement"),
        }
    }

    #[test]
    fn test_parse_insert() {
        let stmt = single("insert into foo set a=1, b=2, c='3';");
        match stmt {
            Statement::Insert(insert) => {
                assert_eq!(insert.table, "foo");
                assert_eq!(
                    insert.assignments,
                    vec![
                        Assignment {
                            column: "a".to_string(),
                            value: Value::Integer(1),
                        },
                        Assignment {
                            column: "b".to_string(),
                            value: Value::Integer(2),
                        },
                        Assignment {
                            column: "c".to_string(),
                            value: Value::Text("3".to_string()),
                        },
                    ]
                );
            }
            _ => panic!("expected INSERT statement"),
        }
    }

    #[test]
    fn test_parse_select_expression() {
        let stmt = single("select 1+1;");
        match stmt {
            Statement::Select(SelectStatement::Expr(expr)) => {
                assert_eq!(
                    expr,
                    Expr::BinaryOp {
                        left: Box::new(Expr::Number(1)),
                        op: BinaryOp::Add,
                        right: Box::new(Expr::Number(1)),
                    }
                );
            }
            _ => panic!("expected scalar SELECT"),
        }
    }

    #[test]
    fn test_expression_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let stmt = single("select 1+2*3;");
        match stmt {
            Statement::Select(SelectStatement::Expr(Expr::BinaryOp { left, op, right })) => {
                assert_eq!(op, BinaryOp::Add);
                assert_eq!(*left, Expr::Number(1));
                assert!(matches!(
                    *right,
                    Expr::BinaryOp {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            _ => panic!("expected scalar SELECT"),
        }
    }

    #[test]
    fn test_same_precedence_associates_left() {
        // 24 / 4 / 3 parses as (24 / 4) / 3
        let stmt = single("select 24/4/3;");
        match stmt {
            Statement::Select(SelectStatement::Expr(Expr::BinaryOp { left, op, right })) => {
                assert_eq!(op, BinaryOp::Div);
                assert_eq!(*right, Expr::Number(3));
                assert!(matches!(
                    *left,
                    Expr::BinaryOp {
                        op: BinaryOp::Div,
                        ..
                    }
                ));
            }
            _ => panic!("expected scalar SELECT"),
        }
    }

    #[test]
    fn test_parentheses_override_precedence() {
        // (1 + 2) * 3 keeps the addition as the left operand
        let stmt = single("select (1+2)*3;");
        match stmt {
            Statement::Select(SelectStatement::Expr(Expr::BinaryOp { left, op, .. })) => {
                assert_eq!(op, BinaryOp::Mul);
                assert!(matches!(
                    *left,
                    Expr::BinaryOp {
                        op: BinaryOp::Add,
                        ..
                    }
                ));
            }
            _ => panic!("expected scalar SELECT"),
        }
    }

    #[test]
    fn test_parse_select_query() {
        let stmt = single("select a, b from foo where a=1 and b='x' order by a desc limit 10;");
        match stmt {
            Statement::Select(SelectStatement::Query(query)) => {
                assert_eq!(query.table, "foo");
                assert_eq!(query.columns, vec!["a", "b"]);
                assert_eq!(query.where_clause.len(), 2);
                assert_eq!(query.where_clause[1].value, Value::Text("x".to_string()));
                assert_eq!(
                    query.order,
                    Some(OrderBy {
                        column: "a".to_string(),
                        ascending: false,
                    })
                );
                assert_eq!(query.limit, Some(10));
            }
            _ => panic!("expected SELECT query"),
        }
    }

    #[test]
    fn test_parse_select_query_minimal() {
        let stmt = single("select a from foo;");
        match stmt {
            Statement::Select(SelectStatement::Query(query)) => {
                assert_eq!(query.columns, vec!["a"]);
                assert!(query.where_clause.is_empty());
                assert_eq!(query.order, None);
                assert_eq!(query.limit, None);
            }
            _ => panic!("expected SELECT query"),
        }
    }

    #[test]
    fn test_order_requires_direction() {
        let err = parse("select a from foo order by a;").unwrap_err();
        match err {
            Error::UnexpectedToken { found, expected, .. } => {
                assert_eq!(found, ";");
                assert_eq!(expected, "asc or desc");
            }
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_program() {
        let program = parse("create table t (primary key uid); describe t;").unwrap();
        assert_eq!(program.statements.len(), 2);
        assert!(matches!(program.statements[0], Statement::Create(_)));
        assert!(matches!(program.statements[1], Statement::Describe(_)));
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse("describe foo").unwrap_err();
        match err {
            Error::UnexpectedToken { found, expected, .. } => {
                assert_eq!(found, "EOF");
                assert_eq!(expected, "';'");
            }
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_leading_keyword() {
        let err = parse("foo;").unwrap_err();
        match err {
            Error::UnexpectedToken { found, offset, .. } => {
                assert_eq!(found, "foo");
                assert_eq!(offset, 0);
            }
            other => panic!("expected UnexpectedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_first_error_aborts() {
        // The second statement is broken; parse fails as a whole.
        assert!(parse("describe foo; describe ; describe bar;").is_err());
    }

    #[test]
    fn test_lex_error_surfaces_through_parser() {
        let err = parse("select ?;").unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol(7)));
    }
}
