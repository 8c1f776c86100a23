//! The expression sublanguage's abstract syntax tree.
//!
//! Produced by [`super::parser::parse`], walked by [`super::eval::evaluate`].
//! `Fn` nodes only ever arise from the `filter`/`map`/`reduce` combinator
//! sugar productions in the parser (see design note on combinator sugar);
//! there is no surface syntax for writing a lambda directly.

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Expr>),
    /// A context-bound identifier, or the literal name `input`.
    Ident(String),
    /// The `#` placeholder inside a combinator body; binds to the innermost
    /// `item` parameter at evaluation time.
    Placeholder,
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    In(Box<Expr>, Box<Expr>),
    /// One of the four built-in calls: `sum`, `filter_`, `map_`, `reduce_`.
    Call(String, Vec<Expr>),
    /// `.startswith(x)` / `.endswith(x)`, the only method calls the grammar
    /// admits.
    MethodCall(Box<Expr>, String, Vec<Expr>),
    /// A function value with the given parameter names, produced only by
    /// the combinator sugar rewrite.
    Fn(Vec<String>, Arc<Expr>),
}
