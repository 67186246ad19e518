use std::ops::Range;
use std::sync::Arc;

use smol_str::SmolStr;

pub use crate::parse::expr::*;

/// A cursor into the source text.
///
/// `offset` is a byte offset, `line` and `column` are zero-based and counted
/// in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Steps over `current`, moving to the next line when it is a newline.
    pub fn advance(&mut self, current: char) {
        self.offset += current.len_utf8();
        self.column += 1;

        if current == '\n' {
            self.line += 1;
            self.column = 0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// 以自身为起始，`other`为结束，圈起一部分区域
    pub fn enclose(&self, other: &Self) -> Self {
        debug_assert!(self.start <= other.end);

        Self {
            start: self.start,
            end: other.end,
        }
    }

    pub const fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    pub const fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }
}

/// Text being evaluated together with the label it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    label: SmolStr,
    text: String,
    first_line: usize,
}

impl Source {
    pub fn new(label: impl Into<SmolStr>, text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            text: text.into(),
            first_line: 0,
        })
    }

    /// Like [`Source::new`], but positions start on line `first_line`.
    ///
    /// Lets a caller evaluate a file line by line and still report the line
    /// numbers of the file.
    pub fn with_first_line(
        label: impl Into<SmolStr>,
        text: impl Into<String>,
        first_line: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            text: text.into(),
            first_line,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn start(&self) -> Position {
        Position::new(0, self.first_line, 0)
    }
}

pub trait Spanned {
    fn span(&self) -> Span;
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Number(e) => e.span(),
            Expr::Variable(e) => e.span(),
            Expr::Assign(e) => e.span(),
            Expr::Unary(e) => e.span(),
            Expr::Binary(e) => e.span(),
        }
    }
}

impl Spanned for NumberLit {
    fn span(&self) -> Span {
        self.token.span
    }
}

impl Spanned for Variable {
    fn span(&self) -> Span {
        self.name.span
    }
}

impl Spanned for Assign {
    fn span(&self) -> Span {
        self.name.span.enclose(&self.value.span())
    }
}

impl Spanned for Unary {
    fn span(&self) -> Span {
        self.operator.span.enclose(&self.right.span())
    }
}

impl Spanned for Binary {
    fn span(&self) -> Span {
        self.left.span().enclose(&self.right.span())
    }
}
