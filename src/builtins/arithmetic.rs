//! Arithmetic natives: +, -, *, /
//!
//! Variadic folds over the numeric tower; mixing variants promotes per
//! the lattice, so `(+ 1 1/2)` stays exact and `(+ 1 1.5)` goes floating
//! point.
//!
//! - `+`: sum of all arguments
//! - `-`: subtract subsequent args from the first, negate a single arg
//! - `*`: product of all arguments
//! - `/`: divide the first by the rest, reciprocal of a single arg
//!
//! Each requires at least one argument; every argument must be a number.

use crate::env::Environment;
use crate::error::EvalError;
use crate::number::Number;
use crate::value::Value;
use std::rc::Rc;

fn number_arg(context: &str, value: &Value) -> Result<Number, EvalError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(EvalError::wrong_type(context, "numberp")),
    }
}

/// ```lisp
/// (+ 1 2 3) => 6
/// (+ 1 1/2) => 3/2
/// ```
fn subr_add(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, EvalError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(EvalError::wrong_arg_count("+"));
    };
    let mut sum = number_arg("+", first)?;
    for arg in rest {
        sum = sum.add(number_arg("+", arg)?);
    }
    Ok(Value::Number(sum))
}

/// ```lisp
/// (- 10 3 2) => 5
/// (- 5) => -5
/// ```
fn subr_sub(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, EvalError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(EvalError::wrong_arg_count("-"));
    };
    let first = number_arg("-", first)?;
    if rest.is_empty() {
        return Ok(Value::Number(first.neg()));
    }
    let mut result = first;
    for arg in rest {
        result = result.sub(number_arg("-", arg)?);
    }
    Ok(Value::Number(result))
}

/// ```lisp
/// (* 2 3 4) => 24
/// ```
fn subr_mul(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, EvalError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(EvalError::wrong_arg_count("*"));
    };
    let mut product = number_arg("*", first)?;
    for arg in rest {
        product = product.mul(number_arg("*", arg)?);
    }
    Ok(Value::Number(product))
}

/// Exact division: an uneven integer quotient becomes a fraction.
///
/// ```lisp
/// (/ 4 2) => 2
/// (/ 1 2) => 1/2
/// (/ 2) => 1/2
/// ```
fn subr_div(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, EvalError> {
    let Some((first, rest)) = args.split_first() else {
        return Err(EvalError::wrong_arg_count("/"));
    };
    let first = number_arg("/", first)?;
    if rest.is_empty() {
        return Ok(Value::Number(Number::Long(1).div(first)?));
    }
    let mut result = first;
    for arg in rest {
        result = result.div(number_arg("/", arg)?)?;
    }
    Ok(Value::Number(result))
}

pub fn register(env: &Rc<Environment>) {
    super::install_subr(env, "+", subr_add);
    super::install_subr(env, "-", subr_sub);
    super::install_subr(env, "*", subr_mul);
    super::install_subr(env, "/", subr_div);
}
