use crate::scan::Lexeme;

/// ```text
/// expr       -> "VAR" IDENTIFIER "=" expr
///               | comp_expr ( ( "AND" | "OR" ) comp_expr )* ;
///
/// comp_expr  -> "NOT" comp_expr
///               | arith_expr ( ( "==" | "!=" | "<" | ">" | "<=" | ">=" ) arith_expr )* ;
///
/// arith_expr -> term ( ( "+" | "-" ) term )* ;
///
/// term       -> factor ( ( "*" | "/" ) factor )* ;
///
/// factor     -> ( "+" | "-" ) factor | power ;
///
/// power      -> atom ( "^" factor )? ;
///
/// atom       -> INT | FLOAT | IDENTIFIER | "(" expr ")" ;
/// ```
///
/// Spans are never stored on the nodes; see [`crate::span::Spanned`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(NumberLit),
    Variable(Variable),
    Assign(Box<Assign>),
    Unary(Box<Unary>),
    Binary(Box<Binary>),
}

/// An `INT` or `FLOAT` literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLit {
    pub token: Lexeme,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: Lexeme,
}

/// `VAR name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub name: Lexeme,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub operator: Lexeme,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub left: Expr,
    pub operator: Lexeme,
    pub right: Expr,
}

impl From<NumberLit> for Expr {
    fn from(lit: NumberLit) -> Self {
        Self::Number(lit)
    }
}

impl From<Variable> for Expr {
    fn from(var: Variable) -> Self {
        Self::Variable(var)
    }
}

impl From<Assign> for Expr {
    fn from(expr: Assign) -> Self {
        Self::Assign(Box::new(expr))
    }
}

impl From<Unary> for Expr {
    fn from(expr: Unary) -> Self {
        Self::Unary(Box::new(expr))
    }
}

impl From<Binary> for Expr {
    fn from(expr: Binary) -> Self {
        Self::Binary(Box::new(expr))
    }
}

impl std::fmt::Display for Expr {
    /// Fully parenthesized form, handy for checking precedence.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(lit) => write!(f, "{}", lit.token.token),
            Expr::Variable(var) => write!(f, "{}", var.name.token),
            Expr::Assign(expr) => write!(f, "(VAR {} = {})", expr.name.token, expr.value),
            Expr::Unary(expr) => write!(f, "({} {})", expr.operator.token, expr.right),
            Expr::Binary(expr) => {
                write!(f, "({} {} {})", expr.left, expr.operator.token, expr.right)
            }
        }
    }
}
