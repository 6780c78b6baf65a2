//! The numeric tower: exact 64-bit integers, IEEE doubles and reduced
//! fractions under one tagged type.
//!
//! Binary operations promote along a fixed lattice:
//!
//! - `Long op Long` stays `Long`, except that division with a non-integer
//!   quotient promotes both sides to `Fraction` and computes exactly.
//! - Anything involving a `Fraction` (and no `Double`) yields a reduced
//!   `Fraction`.
//! - A `Double` on either side absorbs the whole operation into `f64`.

use crate::error::EvalError;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy)]
pub enum Number {
    Long(i64),
    Double(f64),
    /// Invariant: `den > 0` and `gcd(|num|, den) == 1`.
    Fraction { num: i64, den: i64 },
}

impl Number {
    /// Builds a reduced fraction. A zero denominator is an arithmetic
    /// error, the same one raised by `(/ n 0)`.
    pub fn fraction(num: i64, den: i64) -> Result<Number, EvalError> {
        if den == 0 {
            return Err(EvalError::division_by_zero());
        }
        Ok(Number::reduced(num, den))
    }

    /// Parses a number literal handed over by the reader. The variant is
    /// selected by the lexeme shape: a `/` makes a fraction, a `.` makes a
    /// double, anything else is a long.
    pub fn from_lexeme(lexeme: &str, line: u32) -> Result<Number, EvalError> {
        let malformed = || EvalError::parse(format!("malformed number literal: {lexeme}"), line);

        if let Some((num, den)) = lexeme.split_once('/') {
            let num = num.parse::<i64>().map_err(|_| malformed())?;
            let den = den.parse::<i64>().map_err(|_| malformed())?;
            Number::fraction(num, den)
        } else if lexeme.contains('.') {
            lexeme
                .parse::<f64>()
                .map(Number::Double)
                .map_err(|_| malformed())
        } else {
            lexeme
                .parse::<i64>()
                .map(Number::Long)
                .map_err(|_| malformed())
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Number::Long(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Number::Double(_))
    }

    pub fn is_fraction(&self) -> bool {
        matches!(self, Number::Fraction { .. })
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Long(n) => n as f64,
            Number::Double(d) => d,
            Number::Fraction { num, den } => num as f64 / den as f64,
        }
    }

    /// Truncating integer view, fractions round toward zero.
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Long(n) => n,
            Number::Double(d) => d as i64,
            Number::Fraction { num, den } => num / den,
        }
    }

    pub fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Long(a), Number::Long(b)) => Number::Long(a + b),
            (Number::Double(_), _) | (_, Number::Double(_)) => {
                Number::Double(self.as_f64() + rhs.as_f64())
            }
            _ => {
                let (az, an) = self.fraction_parts();
                let (bz, bn) = rhs.fraction_parts();
                Number::reduced(az * bn + bz * an, an * bn)
            }
        }
    }

    pub fn sub(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Long(a), Number::Long(b)) => Number::Long(a - b),
            (Number::Double(_), _) | (_, Number::Double(_)) => {
                Number::Double(self.as_f64() - rhs.as_f64())
            }
            _ => {
                let (az, an) = self.fraction_parts();
                let (bz, bn) = rhs.fraction_parts();
                Number::reduced(az * bn - bz * an, an * bn)
            }
        }
    }

    pub fn mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Long(a), Number::Long(b)) => Number::Long(a * b),
            (Number::Double(_), _) | (_, Number::Double(_)) => {
                Number::Double(self.as_f64() * rhs.as_f64())
            }
            _ => {
                let (az, an) = self.fraction_parts();
                let (bz, bn) = rhs.fraction_parts();
                Number::reduced(az * bz, an * bn)
            }
        }
    }

    /// Exact division. An integer quotient stays a `Long`, everything
    /// else follows the promotion lattice. Doubles divide per IEEE and
    /// never signal.
    pub fn div(self, rhs: Number) -> Result<Number, EvalError> {
        match (self, rhs) {
            (Number::Long(a), Number::Long(b)) => {
                if b == 0 {
                    Err(EvalError::division_by_zero())
                } else if a % b == 0 {
                    Ok(Number::Long(a / b))
                } else {
                    Ok(Number::reduced(a, b))
                }
            }
            (Number::Double(_), _) | (_, Number::Double(_)) => {
                Ok(Number::Double(self.as_f64() / rhs.as_f64()))
            }
            _ => {
                let (az, an) = self.fraction_parts();
                let (bz, bn) = rhs.fraction_parts();
                if bz == 0 {
                    return Err(EvalError::division_by_zero());
                }
                Ok(Number::reduced(az * bn, an * bz))
            }
        }
    }

    pub fn neg(self) -> Number {
        match self {
            Number::Long(n) => Number::Long(-n),
            Number::Double(d) => Number::Double(-d),
            Number::Fraction { num, den } => Number::Fraction { num: -num, den },
        }
    }

    /// Numerator/denominator view for exact arithmetic. Doubles never
    /// reach this through the lattice; the truncating arm mirrors the
    /// integer view.
    fn fraction_parts(self) -> (i64, i64) {
        match self {
            Number::Long(n) => (n, 1),
            Number::Fraction { num, den } => (num, den),
            Number::Double(d) => (d as i64, 1),
        }
    }

    /// Normalizes the sign into the numerator and divides both components
    /// by their greatest common divisor.
    fn reduced(mut num: i64, mut den: i64) -> Number {
        debug_assert!(den != 0);
        if den < 0 {
            num = -num;
            den = -den;
        }
        let g = gcd(num.unsigned_abs(), den.unsigned_abs());
        if g > 1 {
            num /= g as i64;
            den /= g as i64;
        }
        Number::Fraction { num, den }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Long(a), Number::Long(b)) => a == b,
            (Number::Double(_), _) | (_, Number::Double(_)) => self.as_f64() == other.as_f64(),
            _ => {
                let (az, an) = self.fraction_parts();
                let (bz, bn) = other.fraction_parts();
                az * bn == bz * an
            }
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (*self, *other) {
            (Number::Long(a), Number::Long(b)) => Some(a.cmp(&b)),
            (Number::Double(_), _) | (_, Number::Double(_)) => {
                self.as_f64().partial_cmp(&other.as_f64())
            }
            _ => {
                let (az, an) = self.fraction_parts();
                let (bz, bn) = other.fraction_parts();
                Some((az * bn).cmp(&(bz * an)))
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Long(n) => write!(f, "{n}"),
            // Shortest round-trip form, keeps the decimal point so the
            // value reads back as a double.
            Number::Double(d) => write!(f, "{d:?}"),
            Number::Fraction { num, den } => write!(f, "{num}/{den}"),
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Long(n)
    }
}

impl From<f64> for Number {
    fn from(d: f64) -> Self {
        Number::Double(d)
    }
}
