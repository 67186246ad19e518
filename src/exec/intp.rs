use thiserror::Error;
use tracing::debug;

use crate::{
    error::Traceback,
    exec::{env::Env, Fault, FrameId, Num, Number},
    parse::expr::*,
    scan::{Keyword, Token},
    span::{Span, Spanned},
    utils::ensure_sufficient_stack,
};

/// Name of the frame every session starts in.
pub const PROGRAM_FRAME: &str = "<program>";

#[derive(Debug)]
pub struct Interpreter {
    env: Env,
    frame: FrameId,
}

impl Default for Interpreter {
    fn default() -> Self {
        let mut env = Env::default();
        let frame = env.root_frame(PROGRAM_FRAME);

        let globals = env.frame(frame).scope;
        env.set(globals, "null", Number::new(Num::Int(0)).with_frame(frame));

        Self { env, frame }
    }
}

impl Interpreter {
    /// Evaluates `expr` in the current frame. Only `VAR` has a lasting
    /// effect, binding into the current frame's own scope.
    pub fn eval(&mut self, expr: &Expr) -> Result<Number, ExecError> {
        ensure_sufficient_stack(|| match expr {
            Expr::Number(lit) => Ok(self.number(lit)),
            Expr::Variable(var) => self.variable(var),
            Expr::Assign(expr) => self.assign(expr),
            Expr::Unary(expr) => self.unary(expr),
            Expr::Binary(expr) => self.binary(expr),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Number> {
        self.env.get(self.env.frame(self.frame).scope, name)
    }

    pub fn set(&mut self, name: &str, value: Number) {
        let scope = self.env.frame(self.frame).scope;
        self.env.set(scope, name, value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Number> {
        let scope = self.env.frame(self.frame).scope;
        self.env.remove(scope, name)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub const fn frame(&self) -> FrameId {
        self.frame
    }
}

impl Interpreter {
    fn number(&self, lit: &NumberLit) -> Number {
        let value = match lit.token.token {
            Token::Int(n) => Num::Int(n),
            Token::Float(x) => Num::Float(x),
            _ => unreachable!("number literal holds {}", lit.token.token),
        };

        Number::new(value)
            .with_span(lit.span())
            .with_frame(self.frame)
    }

    fn variable(&self, var: &Variable) -> Result<Number, ExecError> {
        let name = var.name.ident();

        match self.get(name) {
            Some(value) => Ok(value.clone().with_span(var.span())),
            None => Err(self.error(var.span(), format!("'{name}' is not defined"), None)),
        }
    }

    fn assign(&mut self, expr: &Assign) -> Result<Number, ExecError> {
        let value = self.eval(&expr.value)?;
        let name = expr.name.ident();

        debug!(name, %value, "bound");
        self.set(name, value.clone());

        Ok(value)
    }

    fn unary(&mut self, expr: &Unary) -> Result<Number, ExecError> {
        let right = self.eval(&expr.right)?;

        let value = match &expr.operator.token {
            Token::Minus => right
                .mul(&Number::new(Num::Int(-1)).with_span(right.span))
                .map_err(|f| self.fault(f))?,
            Token::Plus => right,
            t if t.is_keyword(Keyword::Not) => right.logical_not(),
            t => unreachable!("unary operator {t}"),
        };

        Ok(value.with_span(expr.span()))
    }

    /// Both operands are always evaluated, `AND` and `OR` included.
    fn binary(&mut self, expr: &Binary) -> Result<Number, ExecError> {
        let left = self.eval(&expr.left)?;
        let right = self.eval(&expr.right)?;

        let value = match &expr.operator.token {
            Token::Plus => left.add(&right),
            Token::Minus => left.sub(&right),
            Token::Star => left.mul(&right),
            Token::Slash => left.div(&right),
            Token::Caret => left.pow(&right),
            Token::EqualEqual => Ok(left.comp_eq(&right)),
            Token::BangEqual => Ok(left.comp_ne(&right)),
            Token::Less => Ok(left.comp_lt(&right)),
            Token::Greater => Ok(left.comp_gt(&right)),
            Token::LessEqual => Ok(left.comp_lte(&right)),
            Token::GreaterEqual => Ok(left.comp_gte(&right)),
            t if t.is_keyword(Keyword::And) => Ok(left.logical_and(&right)),
            t if t.is_keyword(Keyword::Or) => Ok(left.logical_or(&right)),
            t => unreachable!("binary operator {t}"),
        }
        .map_err(|f| self.fault(f))?;

        Ok(value.with_span(expr.span()))
    }

    fn fault(&self, fault: Fault) -> ExecError {
        self.error(fault.span, fault.msg, fault.frame)
    }

    fn error(&self, span: Span, msg: String, frame: Option<FrameId>) -> ExecError {
        let traceback = self
            .env
            .traceback(frame.unwrap_or(self.frame), span.start);

        ExecError {
            span,
            msg,
            traceback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct ExecError {
    pub span: Span,
    pub msg: String,
    pub traceback: Traceback,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{parse::Parser, scan::Scanner};

    fn eval_in(intp: &mut Interpreter, source: &str) -> Result<Number, ExecError> {
        let lexemes = Scanner::new(source).scan().unwrap();
        let expr = Parser::new(&lexemes).parse().unwrap();
        intp.eval(&expr)
    }

    fn eval(source: &str) -> Result<Number, ExecError> {
        eval_in(&mut Interpreter::default(), source)
    }

    fn value(source: &str) -> Num {
        eval(source).unwrap().value
    }

    #[test]
    fn arithmetic() {
        assert_eq!(value("1 + 2 * 3"), Num::Int(7));
        assert_eq!(value("(1 + 2) * 3"), Num::Int(9));
        assert_eq!(value("2 ^ 3 ^ 2"), Num::Int(512));
        assert_eq!(value("7 / 2"), Num::Float(3.5));
        assert_eq!(value("-3 + +1"), Num::Int(-2));
        assert_eq!(value("1.5 * 2"), Num::Float(3.0));
    }

    #[test]
    fn logic_and_comparison() {
        assert_eq!(value("1 == 1 AND 0"), Num::Int(0));
        assert_eq!(value("NOT 0"), Num::Int(1));
        assert_eq!(value("NOT 2.5"), Num::Int(0));
        assert_eq!(value("3 >= 3 OR 0"), Num::Int(1));
    }

    #[test]
    fn results_take_the_node_span() {
        let n = eval("-(1 + 2)").unwrap();
        assert_eq!(n.span.range(), 0..7);

        let n = eval(" 4 * 5 ").unwrap();
        assert_eq!(n.span.range(), 1..6);
    }

    #[test]
    fn variables_persist_in_frame() {
        let mut intp = Interpreter::default();
        assert_eq!(eval_in(&mut intp, "VAR x = 5").unwrap().value, Num::Int(5));
        assert_eq!(eval_in(&mut intp, "x + 1").unwrap().value, Num::Int(6));
    }

    #[test]
    fn access_restamps_a_copy() {
        let mut intp = Interpreter::default();
        eval_in(&mut intp, "VAR x = 5").unwrap();

        let n = eval_in(&mut intp, "  x").unwrap();
        assert_eq!(n.span.range(), 2..3);
        assert_eq!(intp.get("x").unwrap().span.range(), 8..9);
    }

    #[test]
    fn null_is_predefined() {
        assert_eq!(value("null"), Num::Int(0));
    }

    #[test]
    fn undefined_variable() {
        let e = eval("1 + y").unwrap_err();
        assert_eq!(e.msg, "'y' is not defined");
        assert_eq!(e.span.range(), 4..5);
        assert_eq!(e.traceback.frames.len(), 1);
        assert_eq!(e.traceback.frames[0].name, PROGRAM_FRAME);
    }

    #[test]
    fn division_by_zero_spans_divisor() {
        let e = eval("10 / (2 - 2)").unwrap_err();
        assert_eq!(e.msg, "Division by zero");
        assert_eq!(e.span.range(), 6..11);
    }

    #[test]
    fn no_short_circuit() {
        let mut intp = Interpreter::default();
        eval_in(&mut intp, "VAR x = 0").unwrap();
        let n = eval_in(&mut intp, "(x == 0) OR (VAR y = 1)").unwrap();
        assert_eq!(n.value, Num::Int(1));
        assert_eq!(intp.get("y").unwrap().value, Num::Int(1));

        eval_in(&mut intp, "0 AND (VAR z = 3)").unwrap();
        assert_eq!(intp.get("z").unwrap().value, Num::Int(3));
    }

    #[test]
    fn failed_assignment_binds_nothing() {
        let mut intp = Interpreter::default();
        assert!(eval_in(&mut intp, "VAR a = 1 / 0").is_err());
        assert!(intp.get("a").is_none());
    }

    #[test]
    fn negating_min_int_overflows() {
        let mut intp = Interpreter::default();
        intp.set("m", Number::new(Num::Int(i64::MIN)));
        let e = eval_in(&mut intp, "-m").unwrap_err();
        assert_eq!(e.msg, "Integer overflow");
    }

    #[test]
    fn remove_unbinds() {
        let mut intp = Interpreter::default();
        eval_in(&mut intp, "VAR x = 1").unwrap();
        assert!(intp.remove("x").is_some());
        assert!(eval_in(&mut intp, "x").is_err());
        assert!(intp.remove("x").is_none());
    }
}
