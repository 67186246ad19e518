use std::cmp::Ordering;

use super::FrameId;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub const fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(x) => x,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Num::Int(n) => n == 0,
            Num::Float(x) => x == 0.0,
        }
    }
}

/// The only runtime value.
///
/// Carries the span it was computed from and the frame that computed it,
/// which is only ever consulted to build a traceback.
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub value: Num,
    pub span: Span,
    pub frame: Option<FrameId>,
}

/// A failed number operation, before it is turned into an
/// [`ExecError`](super::ExecError) with a traceback.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub span: Span,
    pub msg: String,
    pub frame: Option<FrameId>,
}

impl Number {
    pub fn new(value: Num) -> Self {
        Self {
            value,
            span: Span::default(),
            frame: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_frame(mut self, frame: FrameId) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn is_true(&self) -> bool {
        !self.value.is_zero()
    }

    pub fn add(&self, other: &Self) -> Result<Self, Fault> {
        self.arith(other, i64::checked_add, |a, b| a + b)
    }

    pub fn sub(&self, other: &Self) -> Result<Self, Fault> {
        self.arith(other, i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(&self, other: &Self) -> Result<Self, Fault> {
        self.arith(other, i64::checked_mul, |a, b| a * b)
    }

    /// Always float-valued. Fails on a zero divisor, pointing at the divisor.
    pub fn div(&self, other: &Self) -> Result<Self, Fault> {
        if other.value.is_zero() {
            return Err(self.division_by_zero(other));
        }

        Ok(self.derive(Num::Float(self.value.as_f64() / other.value.as_f64())))
    }

    /// Stays integral for an integer base and a non-negative integer
    /// exponent; anything else is computed in floating point.
    pub fn pow(&self, other: &Self) -> Result<Self, Fault> {
        if self.value.is_zero() && other.value.as_f64() < 0.0 {
            return Err(self.division_by_zero(other));
        }

        let value = match (self.value, other.value) {
            (Num::Int(base), Num::Int(exp)) if exp >= 0 => {
                Num::Int(int_pow(base, exp).ok_or_else(|| self.overflow(other))?)
            }
            (base, exp) => Num::Float(base.as_f64().powf(exp.as_f64())),
        };

        Ok(self.derive(value))
    }

    pub fn comp_eq(&self, other: &Self) -> Self {
        self.truth(self.compare(other) == Some(Ordering::Equal))
    }

    pub fn comp_ne(&self, other: &Self) -> Self {
        self.truth(self.compare(other) != Some(Ordering::Equal))
    }

    pub fn comp_lt(&self, other: &Self) -> Self {
        self.truth(self.compare(other) == Some(Ordering::Less))
    }

    pub fn comp_gt(&self, other: &Self) -> Self {
        self.truth(self.compare(other) == Some(Ordering::Greater))
    }

    pub fn comp_lte(&self, other: &Self) -> Self {
        self.truth(matches!(
            self.compare(other),
            Some(Ordering::Less | Ordering::Equal)
        ))
    }

    pub fn comp_gte(&self, other: &Self) -> Self {
        self.truth(matches!(
            self.compare(other),
            Some(Ordering::Greater | Ordering::Equal)
        ))
    }

    pub fn logical_and(&self, other: &Self) -> Self {
        self.truth(self.is_true() && other.is_true())
    }

    pub fn logical_or(&self, other: &Self) -> Self {
        self.truth(self.is_true() || other.is_true())
    }

    pub fn logical_not(&self) -> Self {
        self.truth(!self.is_true())
    }
}

impl Number {
    fn derive(&self, value: Num) -> Self {
        Self {
            value,
            span: Span::default(),
            frame: self.frame,
        }
    }

    fn truth(&self, b: bool) -> Self {
        self.derive(Num::Int(i64::from(b)))
    }

    fn arith(
        &self,
        other: &Self,
        int: fn(i64, i64) -> Option<i64>,
        float: fn(f64, f64) -> f64,
    ) -> Result<Self, Fault> {
        let value = match (self.value, other.value) {
            (Num::Int(a), Num::Int(b)) => Num::Int(int(a, b).ok_or_else(|| self.overflow(other))?),
            (a, b) => Num::Float(float(a.as_f64(), b.as_f64())),
        };

        Ok(self.derive(value))
    }

    fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self.value, other.value) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (Num::Int(a), Num::Float(b)) => cmp_int_float(a, b),
            (Num::Float(a), Num::Int(b)) => cmp_int_float(b, a).map(Ordering::reverse),
            (Num::Float(a), Num::Float(b)) => a.partial_cmp(&b),
        }
    }

    fn division_by_zero(&self, divisor: &Self) -> Fault {
        Fault {
            span: divisor.span,
            msg: "Division by zero".into(),
            frame: self.frame,
        }
    }

    fn overflow(&self, other: &Self) -> Fault {
        Fault {
            span: self.span.enclose(&other.span),
            msg: "Integer overflow".into(),
            frame: self.frame,
        }
    }
}

/// Exact, without rounding `int` to the nearest float first.
fn cmp_int_float(int: i64, float: f64) -> Option<Ordering> {
    // 2^63, the first float above every i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return None;
    }
    if float >= LIMIT {
        return Some(Ordering::Less);
    }
    if float < -LIMIT {
        return Some(Ordering::Greater);
    }

    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        ord => Some(ord),
    }
}

fn int_pow(base: i64, exp: i64) -> Option<i64> {
    match base {
        _ if exp == 0 => Some(1),
        0 | 1 => Some(base),
        -1 => Some(if exp % 2 == 0 { 1 } else { -1 }),
        _ => base.checked_pow(u32::try_from(exp).ok()?),
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            Num::Int(n) => write!(f, "{n}"),
            Num::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{x:.1}")
            }
            Num::Float(x) => write!(f, "{x}"),
        }
    }
}
