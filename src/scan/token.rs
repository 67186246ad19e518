use std::mem;

use smol_str::SmolStr;

use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lexeme {
    pub token: Token,
    pub span: Span,
}

impl Lexeme {
    pub fn ident(&self) -> &str {
        match &self.token {
            Token::Identifier(name) => name,
            _ => panic!("expected Identifier"),
        }
    }
}

/// ```text
/// INT         -> DIGIT+ ;
/// FLOAT       -> DIGIT* "." DIGIT* ;
/// IDENTIFIER  -> ALPHA ( ALPHA | DIGIT )* ;
/// ALPHA       -> "a" ... "z" | "A" ... "Z" ;
/// DIGIT       -> "0" ... "9" ;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// integer literal
    Int(i64),
    /// float literal
    Float(f64),
    /// identifier
    Identifier(SmolStr),
    /// reserved word
    Keyword(Keyword),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `^`
    Caret,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// End of file
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Var,
    And,
    Or,
    Not,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word {
            "VAR" => Self::Var,
            "AND" => Self::And,
            "OR" => Self::Or,
            "NOT" => Self::Not,
            _ => return None,
        };

        Some(kw)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Var => "VAR",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

impl Token {
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self, Token::Keyword(k) if *k == kw)
    }
}

impl Eq for Token {}

impl std::hash::Hash for Token {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Token::Int(n) => n.hash(state),
            Token::Float(x) => x.to_bits().hash(state),
            Token::Identifier(s) => s.hash(state),
            Token::Keyword(kw) => kw.hash(state),
            _ => (),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Token::Int(n) => return write!(f, "{n}"),
            Token::Float(x) => return write!(f, "{x:?}"),
            Token::Identifier(s) => s.as_str(),
            Token::Keyword(kw) => kw.as_str(),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Caret => "^",
            Token::Equal => "=",
            Token::EqualEqual => "==",
            Token::BangEqual => "!=",
            Token::Less => "<",
            Token::Greater => ">",
            Token::LessEqual => "<=",
            Token::GreaterEqual => ">=",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::Eof => "<EOF>",
        };

        f.write_str(s)
    }
}
