//! Control forms: quote, if, and, or
//!
//! All four are special forms; they receive their arguments unevaluated
//! and stop evaluating as soon as the result is decided.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{ConsCell, Value};
use std::rc::Rc;

/// Returns the single argument unevaluated.
///
/// ```lisp
/// (quote x) => x
/// '(1 2) => (1 2)
/// ```
fn form_quote(_env: &Rc<Environment>, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
    let Some(arg) = form.next("quote: listp")? else {
        return Err(EvalError::wrong_arg_count("quote"));
    };
    Ok(arg.car.clone())
}

/// Two-way branch. The condition decides which branch runs; a false
/// condition evaluates every else-form in sequence and yields the last.
///
/// ```lisp
/// (if t 'yes 'no) => yes
/// (if nil 'yes 1 2 3) => 3
/// (if nil 'yes) => nil
/// ```
fn form_if(env: &Rc<Environment>, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
    let Some(cond) = form.next("if: listp")? else {
        return Err(EvalError::wrong_arg_count("if"));
    };
    let Some(then) = cond.next("if: listp")? else {
        return Err(EvalError::wrong_arg_count("if"));
    };

    if env.eval(&cond.car)?.is_truthy() {
        return env.eval(&then.car);
    }

    let mut result = Value::Nil;
    let mut rest = then.next("if: listp")?;
    while let Some(cell) = rest {
        result = env.eval(&cell.car)?;
        rest = cell.next("if: listp")?;
    }
    Ok(result)
}

/// Evaluates left to right, returning the first non-nil value.
fn form_or(env: &Rc<Environment>, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
    let mut rest = form.next("or: listp")?;
    while let Some(cell) = rest {
        let value = env.eval(&cell.car)?;
        if value.is_truthy() {
            return Ok(value);
        }
        rest = cell.next("or: listp")?;
    }
    Ok(Value::Nil)
}

/// Evaluates left to right, stopping at the first nil; otherwise yields
/// the last value, or nil with no arguments.
fn form_and(env: &Rc<Environment>, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
    let mut last = Value::Nil;
    let mut rest = form.next("and: listp")?;
    while let Some(cell) = rest {
        last = env.eval(&cell.car)?;
        if !last.is_truthy() {
            return Ok(last);
        }
        rest = cell.next("and: listp")?;
    }
    Ok(last)
}

pub fn register(env: &Rc<Environment>) {
    super::install_form(env, "quote", form_quote);
    super::install_form(env, "if", form_if);
    super::install_form(env, "or", form_or);
    super::install_form(env, "and", form_and);
}
