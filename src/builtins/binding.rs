//! Binding forms: setq, setf, fset, defun, lambda
//!
//! These manipulate symbol slots. `setq` takes its target name raw,
//! `setf` and `fset` evaluate the target expression first and expect it
//! to yield a symbol reference. `defun` and `lambda` build user
//! functions out of a parameter list and a body.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::{ConsCell, Function, Value};
use std::rc::Rc;

/// Sets the value slot of a raw, unevaluated symbol name.
///
/// ```lisp
/// (setq a 10) => a
/// ```
fn form_setq(env: &Rc<Environment>, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
    let Some(target) = form.next("setq: listp")? else {
        return Err(EvalError::wrong_arg_count("setq"));
    };
    let Value::SymbolRef(name) = &target.car else {
        return Err(EvalError::wrong_type("setq", "symbolp"));
    };
    let Some(value) = target.next("setq: listp")? else {
        return Err(EvalError::wrong_arg_count("setq"));
    };

    let sym = env.get(name);
    sym.set_value(env.eval(&value.car)?);
    Ok(Value::Symbol(sym))
}

/// Like `setq`, but the target expression is evaluated and must yield a
/// symbol reference.
///
/// ```lisp
/// (setf 'a 10) => a
/// ```
fn form_setf(env: &Rc<Environment>, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
    let (sym, value) = resolve_target_and_value(env, form, "setf")?;
    sym.set_value(value);
    Ok(Value::Symbol(sym))
}

/// Like `setf`, but stores into the function slot.
///
/// ```lisp
/// (fset 'double (lambda (x) (+ x x))) => double
/// ```
fn form_fset(env: &Rc<Environment>, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
    let (sym, value) = resolve_target_and_value(env, form, "fset")?;
    sym.set_function(value);
    Ok(Value::Symbol(sym))
}

/// Shared shape of `setf` and `fset`: evaluate the first argument to a
/// symbol reference, resolve it, evaluate the second argument.
fn resolve_target_and_value(
    env: &Rc<Environment>,
    form: &Rc<ConsCell>,
    context: &str,
) -> Result<(crate::env::SymbolHandle, Value), EvalError> {
    let list_context = format!("{context}: listp");
    let Some(target) = form.next(&list_context)? else {
        return Err(EvalError::wrong_arg_count(context));
    };
    let evaluated = env.eval(&target.car)?;
    let Value::SymbolRef(name) = &evaluated else {
        return Err(EvalError::wrong_type(context, "symbolp"));
    };
    let Some(value) = target.next(&list_context)? else {
        return Err(EvalError::wrong_arg_count(context));
    };

    let sym = env.get(name);
    let value = env.eval(&value.car)?;
    Ok((sym, value))
}

/// Defines a named function: stores a `Function` built from the
/// parameter list and body into the target's function slot.
///
/// ```lisp
/// (defun sq (x) (+ x x)) => sq
/// ```
fn form_defun(env: &Rc<Environment>, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
    let Some(target) = form.next("defun: listp")? else {
        return Err(EvalError::wrong_arg_count("defun"));
    };
    let Value::SymbolRef(name) = &target.car else {
        return Err(EvalError::wrong_type("defun", "symbolp"));
    };
    let Some(params_cell) = target.next("defun: listp")? else {
        return Err(EvalError::wrong_arg_count("defun"));
    };

    let params = parse_param_list(&params_cell.car, "defun")?;
    let body = params_cell.cdr.clone();

    let sym = env.get(name);
    sym.set_function(Value::Function(Rc::new(Function { params, body })));
    Ok(Value::Symbol(sym))
}

/// Builds an anonymous function from a parameter list and body.
fn form_lambda(_env: &Rc<Environment>, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
    let Some(params_cell) = form.next("lambda: listp")? else {
        return Err(EvalError::wrong_arg_count("lambda"));
    };
    let params = parse_param_list(&params_cell.car, "lambda")?;
    let body = params_cell.cdr.clone();
    Ok(Value::Function(Rc::new(Function { params, body })))
}

/// A parameter list is nil or a proper list of symbol references.
fn parse_param_list(list: &Value, context: &str) -> Result<Vec<String>, EvalError> {
    let mut params = Vec::new();
    let mut cursor = list.clone();
    loop {
        cursor = match cursor {
            Value::Nil => return Ok(params),
            Value::Cons(cell) => {
                match &cell.car {
                    Value::SymbolRef(name) => params.push(name.clone()),
                    _ => return Err(EvalError::wrong_type(context, "symbolp")),
                }
                cell.cdr.clone()
            }
            _ => return Err(EvalError::wrong_type(context, "listp")),
        };
    }
}

pub fn register(env: &Rc<Environment>) {
    super::install_form(env, "setq", form_setq);
    super::install_form(env, "setf", form_setf);
    super::install_form(env, "fset", form_fset);
    super::install_form(env, "defun", form_defun);
    super::install_form(env, "lambda", form_lambda);
}

#[cfg(test)]
mod tests {
    use crate::env::global_env;
    use crate::error::EvalError;
    use crate::eval::eval_source;
    use crate::number::Number;
    use crate::value::Value;

    #[test]
    fn test_setq_binds_and_returns_the_symbol() {
        let env = global_env();
        let result = eval_source("(setq a 10)", &env).unwrap();
        match result {
            Value::Symbol(sym) => assert_eq!(sym.name(), "a"),
            other => panic!("expected symbol, got {other}"),
        }
        assert_eq!(
            eval_source("a", &env).unwrap(),
            Value::Number(Number::Long(10))
        );
    }

    #[test]
    fn test_setq_requires_a_raw_name() {
        let env = global_env();
        assert!(matches!(
            eval_source("(setq 5 10)", &env),
            Err(EvalError::WrongTypeArgument(_))
        ));
        assert!(matches!(
            eval_source("(setq a)", &env),
            Err(EvalError::WrongNumberOfArguments(_))
        ));
    }

    #[test]
    fn test_setf_evaluates_its_target() {
        let env = global_env();
        eval_source("(setf 'b 3)", &env).unwrap();
        assert_eq!(
            eval_source("b", &env).unwrap(),
            Value::Number(Number::Long(3))
        );
        // An indirect name works because the target is evaluated.
        eval_source("(setq which 'c) (setf which 4)", &env).unwrap();
        assert_eq!(
            eval_source("c", &env).unwrap(),
            Value::Number(Number::Long(4))
        );
        assert!(matches!(
            eval_source("(setf 5 1)", &env),
            Err(EvalError::WrongTypeArgument(_))
        ));
    }

    #[test]
    fn test_fset_stores_into_the_function_slot() {
        let env = global_env();
        eval_source("(fset 'double (lambda (x) (+ x x)))", &env).unwrap();
        assert_eq!(
            eval_source("(double 21)", &env).unwrap(),
            Value::Number(Number::Long(42))
        );
        // The value slot stays untouched.
        assert!(matches!(
            eval_source("double", &env),
            Err(EvalError::VoidVariable(_))
        ));
    }

    #[test]
    fn test_defun_and_call() {
        let env = global_env();
        let result = eval_source("(defun add3 (a b c) (+ a b c))", &env).unwrap();
        match result {
            Value::Symbol(sym) => assert_eq!(sym.name(), "add3"),
            other => panic!("expected symbol, got {other}"),
        }
        assert_eq!(
            eval_source("(add3 1 2 3)", &env).unwrap(),
            Value::Number(Number::Long(6))
        );
    }

    #[test]
    fn test_defun_validates_shape() {
        let env = global_env();
        assert!(matches!(
            eval_source("(defun 5 (x) x)", &env),
            Err(EvalError::WrongTypeArgument(_))
        ));
        assert!(matches!(
            eval_source("(defun f 5 5)", &env),
            Err(EvalError::WrongTypeArgument(_))
        ));
        assert!(matches!(
            eval_source("(defun f (5) 5)", &env),
            Err(EvalError::WrongTypeArgument(_))
        ));
        assert!(matches!(
            eval_source("(defun f)", &env),
            Err(EvalError::WrongNumberOfArguments(_))
        ));
    }

    #[test]
    fn test_defun_body_runs_in_sequence() {
        let env = global_env();
        eval_source("(defun seq (x) (setq trace x) (+ x 1))", &env).unwrap();
        assert_eq!(
            eval_source("(seq 5)", &env).unwrap(),
            Value::Number(Number::Long(6))
        );
        assert_eq!(
            eval_source("trace", &env).unwrap(),
            Value::Number(Number::Long(5))
        );
    }

    #[test]
    fn test_lambda_builds_a_function() {
        let env = global_env();
        let result = eval_source("(lambda (x) x)", &env).unwrap();
        match result {
            Value::Function(func) => {
                assert_eq!(func.params, vec!["x".to_string()]);
            }
            other => panic!("expected function, got {other}"),
        }
        // Empty parameter list is fine.
        assert!(eval_source("(lambda () 1)", &env).is_ok());
        assert!(matches!(
            eval_source("(lambda)", &env),
            Err(EvalError::WrongNumberOfArguments(_))
        ));
    }

    #[test]
    fn test_parameters_shadow_globals() {
        let env = global_env();
        eval_source("(setq x 100)", &env).unwrap();
        eval_source("(defun shadow (x) (+ x 1))", &env).unwrap();
        assert_eq!(
            eval_source("(shadow 1)", &env).unwrap(),
            Value::Number(Number::Long(2))
        );
        assert_eq!(
            eval_source("x", &env).unwrap(),
            Value::Number(Number::Long(100))
        );
    }
}
