//! Recursive-descent parser for the expression sublanguage.
//!
//! Precedence, low to high: `or`, `and`, `not`, comparisons/`in`, `+ -`,
//! `* / %`, unary `-`, postfix (`.field`, `.method(...)`, `[index]`).
//!
//! `filter`, `map` and `reduce` are sugar: they are rewritten here into
//! calls to the explicit-parameter builtins `filter_`, `map_`, `reduce_`,
//! with the body wrapped as an `Expr::Fn` closing over `#`/`total`. This is
//! an AST transform, not a textual one, so it composes correctly when
//! combinators nest.

use std::sync::Arc;

use super::ast::{BinOp, Expr, UnOp};
use super::lexer::{Lexer, Token};

pub fn parse(src: &str) -> Result<Expr, String> {
    let tokens = Lexer::tokenize(src)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    parser.expect_eof()?;
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect_eof(&self) -> Result<(), String> {
        if matches!(self.peek(), Token::Eof) {
            Ok(())
        } else {
            Err(format!("unexpected trailing token {:?}", self.peek()))
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        let actual = self.advance();
        if actual == expected {
            Ok(())
        } else {
            Err(format!("expected {expected:?}, found {actual:?}"))
        }
    }

    fn expect_ident(&mut self) -> Result<String, String> {
        match self.advance() {
            Token::Ident(s) => Ok(s),
            other => Err(format!("expected identifier, found {other:?}")),
        }
    }

    fn is_ident(&self, text: &str) -> bool {
        matches!(self.peek(), Token::Ident(s) if s == text)
    }

    fn parse_or(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_and()?;
        while self.is_ident("or") {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_not()?;
        while self.is_ident("and") {
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, String> {
        if self.is_ident("not") {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Unary(UnOp::Not, Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, String> {
        let lhs = self.parse_additive()?;
        if self.is_ident("in") {
            self.advance();
            let rhs = self.parse_additive()?;
            return Ok(Expr::In(Box::new(lhs), Box::new(rhs)));
        }
        let op = match self.peek() {
            Token::EqEq => BinOp::Eq,
            Token::NotEq => BinOp::Ne,
            Token::Lt => BinOp::Lt,
            Token::Le => BinOp::Le,
            Token::Gt => BinOp::Gt,
            Token::Ge => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_additive()?;
        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_additive(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> Result<Expr, String> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, String> {
        if matches!(self.peek(), Token::Minus) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Expr::Unary(UnOp::Neg, Box::new(inner)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, String> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Token::Dot => {
                    self.advance();
                    let name = self.expect_ident()?;
                    if matches!(self.peek(), Token::LParen) {
                        self.advance();
                        let args = self.parse_args()?;
                        expr = Expr::MethodCall(Box::new(expr), name, args);
                    } else {
                        expr = Expr::Member(Box::new(expr), name);
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let idx = self.parse_or()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Index(Box::new(expr), Box::new(idx));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Token::Int(i) => Ok(Expr::Int(i)),
            Token::Float(f) => Ok(Expr::Float(f)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Hash => Ok(Expr::Placeholder),
            Token::LParen => {
                let e = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(e)
            }
            Token::LBracket => {
                let mut items = Vec::new();
                if !matches!(self.peek(), Token::RBracket) {
                    loop {
                        items.push(self.parse_or()?);
                        if matches!(self.peek(), Token::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(Token::RBracket)?;
                Ok(Expr::List(items))
            }
            Token::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "null" => Ok(Expr::Null),
                _ => {
                    if matches!(self.peek(), Token::LParen) {
                        self.advance();
                        self.parse_call(name)
                    } else {
                        Ok(Expr::Ident(name))
                    }
                }
            },
            other => Err(format!("unexpected token {other:?}")),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if !matches!(self.peek(), Token::RParen) {
            loop {
                args.push(self.parse_or()?);
                if matches!(self.peek(), Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    /// Called just after consuming the `(` that follows a call-position
    /// identifier.
    fn parse_call(&mut self, name: String) -> Result<Expr, String> {
        match name.as_str() {
            "filter" => {
                let xs = self.parse_or()?;
                self.expect(Token::Comma)?;
                let body = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Call(
                    "filter_".into(),
                    vec![xs, Expr::Fn(vec!["item".into()], Arc::new(body))],
                ))
            }
            "map" => {
                let xs = self.parse_or()?;
                self.expect(Token::Comma)?;
                let body = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Call(
                    "map_".into(),
                    vec![xs, Expr::Fn(vec!["item".into()], Arc::new(body))],
                ))
            }
            "reduce" => {
                let xs = self.parse_or()?;
                self.expect(Token::Comma)?;
                let body = self.parse_or()?;
                self.expect(Token::Comma)?;
                let init = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Call(
                    "reduce_".into(),
                    vec![xs, Expr::Fn(vec!["total".into(), "item".into()], Arc::new(body)), init],
                ))
            }
            "sum" | "filter_" | "map_" | "reduce_" => {
                let args = self.parse_args()?;
                Ok(Expr::Call(name, args))
            }
            other => Err(format!("unknown function `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_range_condition() {
        assert!(parse("age >= 18 and age <= 65").is_ok());
    }

    #[test]
    fn rewrites_sum_of_map_sugar() {
        let expr = parse("sum(map(items, #.price))").unwrap();
        match expr {
            Expr::Call(name, args) => {
                assert_eq!(name, "sum");
                assert_eq!(args.len(), 1);
                match &args[0] {
                    Expr::Call(inner_name, inner_args) => {
                        assert_eq!(inner_name, "map_");
                        assert!(matches!(inner_args[1], Expr::Fn(..)));
                    }
                    other => panic!("expected nested map_ call, got {other:?}"),
                }
            }
            other => panic!("expected sum call, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_calls() {
        assert!(parse("frobnicate(1, 2)").is_err());
    }
}
