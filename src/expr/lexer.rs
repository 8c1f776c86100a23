//! Character-level tokenizer for the expression sublanguage.

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    Hash,
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Eof,
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { chars: src.chars().peekable() }
    }

    pub fn tokenize(src: &str) -> Result<Vec<Token>, String> {
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let done = tok == Token::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, String> {
        self.skip_whitespace();
        let c = match self.chars.peek() {
            None => return Ok(Token::Eof),
            Some(&c) => c,
        };
        match c {
            '#' => {
                self.chars.next();
                Ok(Token::Hash)
            }
            '.' => {
                self.chars.next();
                Ok(Token::Dot)
            }
            ',' => {
                self.chars.next();
                Ok(Token::Comma)
            }
            '(' => {
                self.chars.next();
                Ok(Token::LParen)
            }
            ')' => {
                self.chars.next();
                Ok(Token::RParen)
            }
            '[' => {
                self.chars.next();
                Ok(Token::LBracket)
            }
            ']' => {
                self.chars.next();
                Ok(Token::RBracket)
            }
            '+' => {
                self.chars.next();
                Ok(Token::Plus)
            }
            '-' => {
                self.chars.next();
                Ok(Token::Minus)
            }
            '*' => {
                self.chars.next();
                Ok(Token::Star)
            }
            '/' => {
                self.chars.next();
                Ok(Token::Slash)
            }
            '%' => {
                self.chars.next();
                Ok(Token::Percent)
            }
            '=' => {
                self.chars.next();
                self.expect('=')?;
                Ok(Token::EqEq)
            }
            '!' => {
                self.chars.next();
                self.expect('=')?;
                Ok(Token::NotEq)
            }
            '<' => {
                self.chars.next();
                if self.chars.peek() == Some(&'=') {
                    self.chars.next();
                    Ok(Token::Le)
                } else {
                    Ok(Token::Lt)
                }
            }
            '>' => {
                self.chars.next();
                if self.chars.peek() == Some(&'=') {
                    self.chars.next();
                    Ok(Token::Ge)
                } else {
                    Ok(Token::Gt)
                }
            }
            '\'' | '"' => self.read_string(c),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_ident(),
            other => Err(format!("unexpected character '{other}'")),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.chars.next() {
            Some(c) if c == expected => Ok(()),
            other => Err(format!("expected '{expected}', found {other:?}")),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, String> {
        self.chars.next();
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => break,
                Some('\\') => {
                    if let Some(escaped) = self.chars.next() {
                        s.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                    }
                }
                Some(c) => s.push(c),
                None => return Err("unterminated string literal".into()),
            }
        }
        Ok(Token::Str(s))
    }

    fn read_number(&mut self) -> Result<Token, String> {
        let mut s = String::new();
        let mut is_float = false;
        while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
            s.push(self.chars.next().unwrap());
        }
        if self.chars.peek() == Some(&'.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some(c) if c.is_ascii_digit()) {
                is_float = true;
                s.push(self.chars.next().unwrap());
                while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
                    s.push(self.chars.next().unwrap());
                }
            }
        }
        if is_float {
            s.parse::<f64>().map(Token::Float).map_err(|e| e.to_string())
        } else {
            s.parse::<i64>().map(Token::Int).map_err(|e| e.to_string())
        }
    }

    fn read_ident(&mut self) -> Result<Token, String> {
        let mut s = String::new();
        while matches!(self.chars.peek(), Some(c) if c.is_alphanumeric() || *c == '_') {
            s.push(self.chars.next().unwrap());
        }
        Ok(Token::Ident(s))
    }
}
