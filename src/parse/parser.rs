use thiserror::Error;
use tracing::debug;

use crate::{
    parse::expr::*,
    scan::{Keyword, Lexeme, Token},
    span::Span,
    utils::ensure_sufficient_stack,
};

/// Nesting allowed before parsing gives up, see [`Parser::with_max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 1000;

#[derive(Debug)]
pub struct Parser<'s> {
    cursor: Cursor<'s>,
    depth: usize,
    max_depth: usize,
}

impl<'s> Parser<'s> {
    /// `lexemes` is expected to end with [`Token::Eof`], as produced by the
    /// scanner.
    pub fn new(lexemes: &'s [Lexeme]) -> Self {
        Self {
            cursor: Cursor {
                lexemes,
                current: 0,
            },
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Bounds how deeply `(`, `VAR`, `NOT`, unary signs and `^` may nest.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses one expression that must span the whole input.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let res = self.expr().and_then(|expr| {
            if self.cursor.is_at_end() {
                Ok(expr)
            } else {
                Err(self.expected(
                    "'+', '-', '*', '/', '^', '==', '!=', '<', '>', '<=', '>=', 'AND' or 'OR'",
                ))
            }
        });

        if let Err(e) = &res {
            debug!(msg = %e.msg, at = ?e.span.range(), "parse failed");
        }

        res
    }

    /// # 求值次序（从低到高）
    ///
    /// expr
    /// comp_expr
    /// arith_expr
    /// term
    /// factor
    /// power
    /// atom
    ///
    /// 低次序的规则包裹着高次序的规则，
    /// 这样就能以极其简单的方式实现次序关系，同时还完成了解析。
    ///
    /// # rule
    ///
    /// ```text
    /// expr -> "VAR" IDENTIFIER "=" expr
    ///       | comp_expr ( ( "AND" | "OR" ) comp_expr )*
    /// ```
    pub fn expr(&mut self) -> Result<Expr, ParseError> {
        self.nested(|p| {
            if p.cursor.next_if(|t| t.is_keyword(Keyword::Var)).is_some() {
                return p.var_assign();
            }

            let span = p.cursor.next_span();
            p.attempt(|p| p.left_assoc(Self::comp_expr, is_logic_op))
                .or_expected(|| {
                    ParseError::expected(
                        span,
                        "'VAR', int, float, identifier, '+', '-', '(' or 'NOT'",
                    )
                })
        })
    }
}

impl Parser<'_> {
    fn var_assign(&mut self) -> Result<Expr, ParseError> {
        let name = self
            .cursor
            .next_if(|t| matches!(t, Token::Identifier(_)))
            .ok_or_else(|| self.expected("identifier"))?;

        self.cursor
            .next_if_eq(Token::Equal)
            .ok_or_else(|| self.expected("'='"))?;

        let value = self.expr()?;

        Ok(Assign { name, value }.into())
    }

    /// ```text
    /// comp_expr -> "NOT" comp_expr
    ///            | arith_expr ( ( "==" | "!=" | "<" | ">" | "<=" | ">=" ) arith_expr )*
    /// ```
    fn comp_expr(&mut self) -> Result<Expr, ParseError> {
        if let Some(operator) = self.cursor.next_if(|t| t.is_keyword(Keyword::Not)) {
            let right = self.nested(Self::comp_expr)?;
            return Ok(Unary { operator, right }.into());
        }

        let span = self.cursor.next_span();
        self.attempt(|p| p.left_assoc(Self::arith_expr, is_comparison_op))
            .or_expected(|| {
                ParseError::expected(span, "int, float, identifier, '+', '-', '(' or 'NOT'")
            })
    }

    /// ```text
    /// arith_expr -> term ( ( "+" | "-" ) term )*
    /// ```
    fn arith_expr(&mut self) -> Result<Expr, ParseError> {
        self.left_assoc(Self::term, |t| matches!(t, Token::Plus | Token::Minus))
    }

    /// ```text
    /// term -> factor ( ( "*" | "/" ) factor )*
    /// ```
    fn term(&mut self) -> Result<Expr, ParseError> {
        self.left_assoc(Self::factor, |t| matches!(t, Token::Star | Token::Slash))
    }

    /// ```text
    /// factor -> ( "+" | "-" ) factor | power
    /// ```
    fn factor(&mut self) -> Result<Expr, ParseError> {
        if let Some(operator) = self
            .cursor
            .next_if(|t| matches!(t, Token::Plus | Token::Minus))
        {
            let right = self.nested(Self::factor)?;
            return Ok(Unary { operator, right }.into());
        }

        self.power()
    }

    /// The right operand is a `factor`, which comes back here, so `^`
    /// associates to the right.
    ///
    /// ```text
    /// power -> atom ( "^" factor )?
    /// ```
    fn power(&mut self) -> Result<Expr, ParseError> {
        let expr = self.atom()?;

        if let Some(operator) = self.cursor.next_if_eq(Token::Caret) {
            let right = self.nested(Self::factor)?;
            return Ok(Binary {
                left: expr,
                operator,
                right,
            }
            .into());
        }

        Ok(expr)
    }

    /// ```text
    /// atom -> INT | FLOAT | IDENTIFIER | "(" expr ")"
    /// ```
    fn atom(&mut self) -> Result<Expr, ParseError> {
        let Some(lex) = self.cursor.next_if(|t| {
            matches!(
                t,
                Token::Int(_) | Token::Float(_) | Token::Identifier(_) | Token::LeftParen
            )
        }) else {
            return Err(self.expected("int, float, identifier, '+', '-' or '('"));
        };

        let expr = match &lex.token {
            Token::Int(_) | Token::Float(_) => NumberLit { token: lex }.into(),
            Token::Identifier(_) => Variable { name: lex }.into(),
            Token::LeftParen => {
                let expr = self.expr()?;
                self.cursor
                    .next_if_eq(Token::RightParen)
                    .ok_or_else(|| self.expected("')'"))?;
                expr
            }
            _ => unreachable!(),
        };

        Ok(expr)
    }

    /// `operand ( op operand )*`, folded to the left.
    ///
    /// Every fold deepens the left spine, so each one counts against
    /// `max_depth` until the chain ends.
    fn left_assoc(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
        is_op: fn(&Token) -> bool,
    ) -> Result<Expr, ParseError> {
        let mut expr = operand(self)?;
        let outer = self.depth;

        let res = loop {
            let Some(operator) = self.cursor.next_if(is_op) else {
                break Ok(expr);
            };
            if self.depth >= self.max_depth {
                break Err(self.too_deep());
            }
            self.depth += 1;

            match operand(self) {
                Ok(right) => {
                    expr = Binary {
                        left: expr,
                        operator,
                        right,
                    }
                    .into()
                }
                Err(e) => break Err(e),
            }
        };

        self.depth = outer;
        res
    }

    fn attempt<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Attempt<T> {
        let start = self.cursor.current;
        let result = rule(self);

        Attempt {
            advanced: self.cursor.current - start,
            result,
        }
    }

    fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.max_depth {
            return Err(self.too_deep());
        }

        self.depth += 1;
        let res = ensure_sufficient_stack(|| rule(self));
        self.depth -= 1;

        res
    }

    fn too_deep(&self) -> ParseError {
        ParseError {
            span: self.cursor.next_span(),
            msg: format!("Maximum nesting depth of {} exceeded", self.max_depth),
        }
    }

    fn expected(&self, what: &str) -> ParseError {
        ParseError::expected(self.cursor.next_span(), what)
    }
}

/// What a parse routine produced, and how many tokens it consumed doing so.
#[derive(Debug)]
struct Attempt<T> {
    advanced: usize,
    result: Result<T, ParseError>,
}

impl<T> Attempt<T> {
    /// A failure that consumed tokens points at the offending token and is
    /// kept; one that consumed nothing is replaced by `fallback`.
    fn or_expected(self, fallback: impl FnOnce() -> ParseError) -> Result<T, ParseError> {
        match self.result {
            Err(_) if self.advanced == 0 => Err(fallback()),
            result => result,
        }
    }
}

static EOF: Token = Token::Eof;

#[derive(Debug)]
struct Cursor<'a> {
    lexemes: &'a [Lexeme],
    current: usize,
}

impl Cursor<'_> {
    fn peek_token(&self) -> &Token {
        self.lexemes
            .get(self.current)
            .map_or(&EOF, |lex| &lex.token)
    }

    fn next_if(&mut self, func: impl FnOnce(&Token) -> bool) -> Option<Lexeme> {
        self.lexemes
            .get(self.current)
            .filter(|lex| func(&lex.token))
            .cloned()
            .inspect(|_| self.current += 1)
    }

    fn next_if_eq(&mut self, token: Token) -> Option<Lexeme> {
        self.next_if(|t| *t == token)
    }

    fn next_span(&self) -> Span {
        match self.lexemes.get(self.current) {
            Some(lex) => lex.span,
            None => self
                .lexemes
                .last()
                .map(|lex| Span::new(lex.span.end, lex.span.end))
                .unwrap_or_default(),
        }
    }

    fn is_at_end(&self) -> bool {
        *self.peek_token() == Token::Eof
    }
}

fn is_logic_op(token: &Token) -> bool {
    token.is_keyword(Keyword::And) || token.is_keyword(Keyword::Or)
}

fn is_comparison_op(token: &Token) -> bool {
    matches!(
        token,
        Token::EqualEqual
            | Token::BangEqual
            | Token::Less
            | Token::Greater
            | Token::LessEqual
            | Token::GreaterEqual
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct ParseError {
    pub span: Span,
    pub msg: String,
}

impl ParseError {
    fn expected(span: Span, what: &str) -> Self {
        Self {
            span,
            msg: format!("Expected {what}"),
        }
    }
}
