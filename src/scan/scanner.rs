use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;
use tracing::trace;

use super::{Keyword, Lexeme, Token};
use crate::span::{Position, Span};

#[derive(Debug)]
pub struct Scanner<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    tokens: Vec<Lexeme>,
    start: Position,
    pos: Position,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::starting_at(source, Position::default())
    }

    /// Scans `source` as if it began at `start`.
    pub fn starting_at(source: &'a str, start: Position) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            tokens: vec![],
            start,
            pos: Position { offset: 0, ..start },
        }
    }

    /// Produces the whole token sequence, terminated by a zero-width
    /// [`Token::Eof`]. On failure nothing scanned so far is returned.
    pub fn scan(mut self) -> Result<Vec<Lexeme>, ScanError> {
        while self.chars.peek().is_some() {
            self.start = self.pos;
            self.scan_token().inspect_err(|e| trace!(msg = %e.msg, "scan failed"))?;
        }

        self.tokens.push(Lexeme {
            token: Token::Eof,
            span: Span::new(self.pos, self.pos),
        });
        trace!(count = self.tokens.len(), "scanned");

        Ok(self.tokens)
    }
}

impl Scanner<'_> {
    fn add_token(&mut self, token: Token) {
        self.tokens.push(Lexeme {
            token,
            span: self.span(),
        });
    }

    fn span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    fn scan_token(&mut self) -> Result<(), ScanError> {
        let Some(c) = self.advance() else {
            return Ok(());
        };

        match c {
            ' ' | '\t' => (),
            '+' => self.add_token(Token::Plus),
            '-' => self.add_token(Token::Minus),
            '*' => self.add_token(Token::Star),
            '/' => self.add_token(Token::Slash),
            '^' => self.add_token(Token::Caret),
            '(' => self.add_token(Token::LeftParen),
            ')' => self.add_token(Token::RightParen),
            '=' => {
                let tk = if self.expect_char('=') {
                    Token::EqualEqual
                } else {
                    Token::Equal
                };
                self.add_token(tk)
            }
            '!' => {
                if !self.expect_char('=') {
                    return Err(ScanError {
                        kind: ScanErrorKind::ExpectedCharacter,
                        span: self.span(),
                        msg: "'=' (after '!')".into(),
                    });
                }
                self.add_token(Token::BangEqual)
            }
            '<' => {
                let tk = if self.expect_char('=') {
                    Token::LessEqual
                } else {
                    Token::Less
                };
                self.add_token(tk)
            }
            '>' => {
                let tk = if self.expect_char('=') {
                    Token::GreaterEqual
                } else {
                    Token::Greater
                };
                self.add_token(tk)
            }
            c if c.is_ascii_digit() || c == '.' => self.number(c)?,
            c if c.is_ascii_alphabetic() => self.identifier_or_keyword(),
            c => {
                return Err(ScanError {
                    kind: ScanErrorKind::IllegalCharacter,
                    span: self.span(),
                    msg: format!("'{c}'"),
                });
            }
        }

        Ok(())
    }

    /// A maximal run of digits holding at most one `.`; a second `.` ends
    /// the literal and starts the next token.
    fn number(&mut self, first: char) -> Result<(), ScanError> {
        let mut dots = usize::from(first == '.');

        while let Some(&c) = self.chars.peek() {
            if c == '.' {
                if dots > 0 {
                    break;
                }
                dots += 1;
            } else if !c.is_ascii_digit() {
                break;
            }
            self.advance();
        }

        let source = self.source;
        let text = &source[self.start.offset..self.pos.offset];

        let token = if dots == 0 {
            match text.parse::<i64>() {
                Ok(n) => Token::Int(n),
                // wider than 64 bits
                Err(_) => Token::Float(text.parse::<f64>().map_err(|_| self.illegal(text))?),
            }
        } else {
            Token::Float(text.parse::<f64>().map_err(|_| self.illegal(text))?)
        };
        self.add_token(token);

        Ok(())
    }

    fn identifier_or_keyword(&mut self) {
        while self.expect_pred(|c| c.is_ascii_alphanumeric() || c == '_') {}

        let source = self.source;
        let s = &source[self.start.offset..self.pos.offset];

        let token = match Keyword::from_word(s) {
            Some(kw) => Token::Keyword(kw),
            None => Token::Identifier(s.into()),
        };

        self.add_token(token)
    }

    fn illegal(&self, text: &str) -> ScanError {
        ScanError {
            kind: ScanErrorKind::IllegalCharacter,
            span: self.span(),
            msg: format!("'{text}'"),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos.advance(c);
        Some(c)
    }

    fn expect_char(&mut self, expected: char) -> bool {
        self.expect_pred(|c| c == expected)
    }

    fn expect_pred<F>(&mut self, pred: F) -> bool
    where
        F: FnOnce(char) -> bool,
    {
        if self.chars.peek().is_some_and(|&c| pred(c)) {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    IllegalCharacter,
    ExpectedCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct ScanError {
    pub kind: ScanErrorKind,
    pub span: Span,
    pub msg: String,
}
