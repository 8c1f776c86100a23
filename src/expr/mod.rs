//! The expression sublanguage: lexer, parser, AST and evaluator.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::Expr;
pub use eval::{evaluate, ExprValue, Locals};
