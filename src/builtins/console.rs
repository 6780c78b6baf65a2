//! Console native: print
//!
//! Writes the printable form of each evaluated argument to the
//! diagnostic stream, one per line.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

fn subr_print(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, EvalError> {
    for arg in args {
        eprintln!("{arg}");
    }
    Ok(Value::Nil)
}

pub fn register(env: &Rc<Environment>) {
    super::install_subr(env, "print", subr_print);
}
