//! Minimal SQL front end implementing the dispatcher contract.
//!
//! Grammar (keywords are case-insensitive):
//!
//! ```text
//! script  := select (';' select)* ';'?
//! select  := SELECT ('*' | expr (',' expr)*) FROM ident (WHERE expr)?
//! expr    := cmp ((AND | OR) cmp)*
//! cmp     := primary (op primary)?
//! primary := ident | number | 'string' | '(' select ')' | '(' expr ')'
//! ```
//!
//! Start rules: `select`, `expression`; `None` parses a script.

#![allow(dead_code)]

use sct_focus::ast::Finder;
use sct_focus::dispatch::resolve_search_priority;
use sct_focus::{
    AstNode, DescribeContext, DispatchError, Dispatcher, FeedbackLog, FieldValue, ParseError,
    ParseResult, Scalar, Span, State, Vocabulary,
};
use std::rc::Rc;

const KEYWORDS: &[&str] = &["SELECT", "FROM", "WHERE", "AND", "OR"];
const OPERATORS: &[&str] = &["<=", ">=", "<>", "<", ">", "="];
const SYMBOLS: &[&str] = &["<=", ">=", "<>", "<", ">", "=", ",", ";", "(", ")", "*"];

pub struct SqlDispatcher {
    vocabulary: Vocabulary,
}

impl SqlDispatcher {
    pub fn new() -> Self {
        Self {
            vocabulary: Vocabulary::default()
                .with_node("Script", "SQL script")
                .with_node("SelectStmt", "SELECT statement")
                .with_node("BinaryExpr", "expression")
                .with_node("Identifier", "identifier")
                .with_field("from_clause", "FROM clause")
                .with_field("where_clause", "WHERE clause"),
        }
    }
}

pub fn priority_of(kind: &str) -> u32 {
    match kind {
        "SelectStmt" => 1,
        "BinaryExpr" => 2,
        _ => 0,
    }
}

impl Dispatcher for SqlDispatcher {
    fn parse(&self, code: &str, start: Option<&str>) -> Result<ParseResult, DispatchError> {
        let tokens = match lex(code) {
            Ok(tokens) => tokens,
            Err(err) => return Ok(Err(err)),
        };
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            last_end: 0,
            src_len: code.len(),
        };
        let node = match start {
            None => parser.script(),
            Some("select") => parser.select().and_then(|n| parser.finish(n)),
            Some("expression") => parser.expr().and_then(|n| parser.finish(n)),
            Some(other) => {
                return Err(DispatchError::UnknownStartRule {
                    rule: other.to_string(),
                })
            }
        };
        Ok(node.map(Rc::new))
    }

    fn select(&self, kind: &str, tree: &FieldValue, priority: Option<u32>) -> Vec<Rc<AstNode>> {
        let priority = resolve_search_priority(priority, priority_of(kind));
        Finder::new(kind, priority, priority_of).find_all(tree)
    }

    fn describe(
        &self,
        node: Option<&AstNode>,
        template: &str,
        ctx: &DescribeContext<'_>,
    ) -> Option<String> {
        self.vocabulary.describe(node, template, ctx)
    }
}

/// Root state over SQL code plus the log its failures go to.
pub fn sql_state(student: &str, solution: &str) -> (State, Rc<FeedbackLog>) {
    let log = Rc::new(FeedbackLog::new());
    let state = State::new(student, solution, Rc::new(SqlDispatcher::new()), log.clone())
        .expect("sql dispatcher never fails outright");
    (state, log)
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Word(String),
    Num(i64),
    Str(String),
    Sym(&'static str),
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    span: Span,
}

fn lex(src: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let tok = if c.is_ascii_alphabetic() || c == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            Tok::Word(src[start..i].to_string())
        } else if c.is_ascii_digit() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let value = src[start..i].parse().map_err(|_| error_at(start, i))?;
            Tok::Num(value)
        } else if c == b'\'' {
            i += 1;
            while i < bytes.len() && bytes[i] != b'\'' {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(error_at(start, i));
            }
            i += 1;
            Tok::Str(src[start + 1..i - 1].to_string())
        } else {
            let sym: &'static str = SYMBOLS
                .iter()
                .copied()
                .find(|s| src[start..].starts_with(*s))
                .ok_or_else(|| error_at(start, start + 1))?;
            i += sym.len();
            Tok::Sym(sym)
        };

        out.push(Token {
            tok,
            span: Span::new(start, i),
        });
    }

    Ok(out)
}

fn error_at(start: usize, end: usize) -> ParseError {
    ParseError {
        span: Some(Span::new(start, end)),
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    last_end: usize,
    src_len: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        self.last_end = token.span.end;
        Some(token)
    }

    fn error(&self) -> ParseError {
        match self.peek() {
            Some(token) => error_at(token.span.start, token.span.end),
            None => error_at(self.src_len, self.src_len),
        }
    }

    fn is_kw(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Token { tok: Tok::Word(w), .. }) if w.eq_ignore_ascii_case(kw))
    }

    fn expect_kw(&mut self, kw: &str) -> Result<Span, ParseError> {
        if !self.is_kw(kw) {
            return Err(self.error());
        }
        Ok(self.bump().map(|t| t.span).unwrap_or_default())
    }

    fn eat_sym(&mut self, sym: &str) -> Option<Span> {
        match self.peek() {
            Some(Token { tok: Tok::Sym(s), span }) if *s == sym => {
                self.bump();
                Some(*span)
            }
            _ => None,
        }
    }

    fn finish(&self, node: AstNode) -> Result<AstNode, ParseError> {
        match self.peek() {
            None => Ok(node),
            Some(_) => Err(self.error()),
        }
    }

    fn script(&mut self) -> Result<AstNode, ParseError> {
        let mut statements = vec![self.select()?];
        while self.eat_sym(";").is_some() {
            if self.peek().is_none() {
                break;
            }
            statements.push(self.select()?);
        }
        let script = AstNode::new("Script", 0..self.src_len)
            .with_field("statements", FieldValue::seq(statements));
        self.finish(script)
    }

    fn select(&mut self) -> Result<AstNode, ParseError> {
        let start = self.expect_kw("SELECT")?.start;

        let mut targets = Vec::new();
        if let Some(span) = self.eat_sym("*") {
            targets.push(AstNode::new("Star", span));
        } else {
            targets.push(self.expr()?);
            while self.eat_sym(",").is_some() {
                targets.push(self.expr()?);
            }
        }

        self.expect_kw("FROM")?;
        let from = self.identifier()?;

        let where_clause = if self.is_kw("WHERE") {
            self.bump();
            FieldValue::node(self.expr()?)
        } else {
            FieldValue::Null
        };

        Ok(AstNode::new("SelectStmt", start..self.last_end)
            .with_field("target_list", FieldValue::seq(targets))
            .with_field("from_clause", from)
            .with_field("where_clause", where_clause))
    }

    fn expr(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.comparison()?;
        while self.is_kw("AND") || self.is_kw("OR") {
            let op = match self.bump().map(|t| &t.tok) {
                Some(Tok::Word(w)) => w.to_ascii_uppercase(),
                _ => return Err(self.error()),
            };
            let right = self.comparison()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<AstNode, ParseError> {
        let left = self.primary()?;
        let op = match self.peek() {
            Some(Token { tok: Tok::Sym(s), .. }) if OPERATORS.contains(s) => *s,
            _ => return Ok(left),
        };
        self.bump();
        let right = self.primary()?;
        Ok(binary(left, op.to_string(), right))
    }

    fn primary(&mut self) -> Result<AstNode, ParseError> {
        if self.is_kw("SELECT") {
            return Err(self.error());
        }
        if self.eat_sym("(").is_some() {
            let inner = if self.is_kw("SELECT") {
                self.select()?
            } else {
                self.expr()?
            };
            self.eat_sym(")").ok_or_else(|| self.error())?;
            return Ok(inner);
        }

        let token = self.peek().ok_or_else(|| self.error())?;
        let node = match &token.tok {
            Tok::Word(w) if !KEYWORDS.iter().any(|k| w.eq_ignore_ascii_case(k)) => {
                AstNode::new("Identifier", token.span).with_field("name", FieldValue::text(w.as_str()))
            }
            Tok::Num(n) => {
                AstNode::new("Number", token.span).with_field("value", FieldValue::Scalar(Scalar::Int(*n)))
            }
            Tok::Str(s) => {
                AstNode::new("String", token.span).with_field("value", FieldValue::text(s.as_str()))
            }
            _ => return Err(self.error()),
        };
        self.bump();
        Ok(node)
    }

    fn identifier(&mut self) -> Result<AstNode, ParseError> {
        let node = self.primary()?;
        if node.kind == "Identifier" {
            Ok(node)
        } else {
            Err(self.error())
        }
    }
}

fn binary(left: AstNode, op: String, right: AstNode) -> AstNode {
    let span = left.span.hull(right.span);
    AstNode::new("BinaryExpr", span)
        .with_field("left", left)
        .with_field("op", FieldValue::text(op))
        .with_field("right", right)
}
