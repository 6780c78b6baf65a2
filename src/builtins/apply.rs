//! Application native: funcall
//!
//! Evaluates all its arguments and calls the first with the remaining
//! ones as its argument list.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{ConsCell, Value};
use std::rc::Rc;

/// ```lisp
/// (funcall (lambda (x) (+ x 1)) 41) => 42
/// ```
fn subr_funcall(env: &Rc<Environment>, args: &[Value]) -> Result<Value, EvalError> {
    let Some((callable, rest)) = args.split_first() else {
        return Err(EvalError::wrong_arg_count("funcall"));
    };

    // The arguments are already evaluated; quoting them in the rebuilt
    // call cell makes the callee's own evaluation pass return them
    // verbatim.
    let mut arglist = Value::Nil;
    for arg in rest.iter().rev() {
        arglist = Value::cons(Value::Quote(Rc::new(arg.clone())), arglist);
    }
    let form = Rc::new(ConsCell::new(callable.clone(), arglist));
    env.funcall(callable, &form)
}

pub fn register(env: &Rc<Environment>) {
    super::install_subr(env, "funcall", subr_funcall);
}
