// ABOUTME: Evaluator dispatch turning parsed forms into values

use crate::env::Environment;
use crate::error::EvalError;
use crate::reader::Reader;
use crate::value::{ConsCell, Function, Value};
use std::rc::Rc;

impl Environment {
    /// Evaluates a value. Per-variant evaluation may yield nothing, in
    /// which case the value evaluates to itself.
    pub fn eval(self: &Rc<Self>, expr: &Value) -> Result<Value, EvalError> {
        match eval_step(expr, self)? {
            Some(value) => Ok(value),
            None => Ok(expr.clone()),
        }
    }

    /// Applies a callable to a call cell whose car is the function
    /// position and whose cdr is the argument list. Non-callables signal
    /// `invalid-function`.
    pub fn funcall(self: &Rc<Self>, callable: &Value, form: &Rc<ConsCell>) -> Result<Value, EvalError> {
        match callable {
            Value::Form { f, .. } => f(self, form),
            Value::Subr { f, .. } => {
                let context = format!("{}: listp", form.car);
                let mut argv = Vec::new();
                let mut rest = form.next(&context)?;
                while let Some(cell) = rest {
                    argv.push(self.eval(&cell.car)?);
                    rest = cell.next(&context)?;
                }
                f(self, &argv)
            }
            Value::Function(func) => apply_function(func, self, form),
            Value::Symbol(handle) => {
                let function = handle.function()?;
                self.funcall(&function, form)
            }
            Value::SymbolRef(name) => {
                let sym = self.get(name);
                let function = sym.function()?;
                self.funcall(&function, form)
            }
            other => Err(EvalError::InvalidFunction(other.to_string())),
        }
    }
}

/// The self-evaluation contract: `None` means the variant evaluates to
/// itself. Nil, t, strings, numbers and callables are self-evaluating;
/// quotes unwrap, symbol references resolve, cons cells apply.
fn eval_step(expr: &Value, env: &Rc<Environment>) -> Result<Option<Value>, EvalError> {
    match expr {
        Value::Quote(inner) => Ok(Some((**inner).clone())),
        Value::Symbol(handle) => handle.value().map(Some),
        Value::SymbolRef(name) => env.get(name).value().map(Some),
        Value::Cons(cell) => eval_call(cell, env).map(Some),
        _ => Ok(None),
    }
}

fn eval_call(cell: &Rc<ConsCell>, env: &Rc<Environment>) -> Result<Value, EvalError> {
    // A call of the shape ((lambda ...) args) needs its head built into
    // a Function before application.
    let callee = match &cell.car {
        Value::Cons(head) if matches!(&head.car, Value::SymbolRef(name) if name == "lambda") => {
            env.eval(&cell.car)?
        }
        other => other.clone(),
    };
    env.funcall(&callee, cell)
}

/// Applies a user-defined function: binds each parameter to its argument
/// evaluated in the caller's environment, runs the body in a fresh child
/// scope and tears the scope down afterwards. The teardown order matters:
/// the parameter handles are still alive at that point, so symbols a
/// closure captured migrate into the parent instead of being dropped.
fn apply_function(
    func: &Function,
    env: &Rc<Environment>,
    form: &Rc<ConsCell>,
) -> Result<Value, EvalError> {
    let context = form.car.to_string();
    let list_context = format!("{context}: listp");
    let local = Environment::with_parent(env.clone());

    let mut bound = Vec::with_capacity(func.params.len());
    let mut rest = form.next(&list_context)?;
    for param in &func.params {
        let Some(cell) = rest else {
            return Err(EvalError::wrong_arg_count(context));
        };
        let argument = env.eval(&cell.car)?;
        let sym = local.create(param)?;
        sym.set_value(argument);
        bound.push(sym);
        rest = cell.next(&list_context)?;
    }
    // Excess arguments are ignored.

    let mut result = Value::Nil;
    let mut body = &func.body;
    while let Value::Cons(cell) = body {
        result = local.eval(&cell.car)?;
        body = &cell.cdr;
    }

    local.teardown();
    drop(bound);
    Ok(result)
}

/// Reads and evaluates every top-level form of `source`, returning the
/// last result. An empty source yields nil.
pub fn eval_source(source: &str, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut reader = Reader::new(source.chars());
    let mut result = Value::Nil;
    while let Some(expr) = reader.next_expr()? {
        result = env.eval(&expr)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::global_env;
    use crate::number::Number;

    fn read_one(src: &str) -> Value {
        Reader::new(src.chars())
            .next_expr()
            .unwrap()
            .expect("expected an expression")
    }

    #[test]
    fn test_self_evaluating_values() {
        let env = Environment::new();
        for expr in [
            Value::Nil,
            Value::T,
            Value::String("hi".to_string()),
            Value::Number(Number::Long(42)),
        ] {
            assert_eq!(env.eval(&expr).unwrap(), expr);
        }
    }

    #[test]
    fn test_quote_unwraps() {
        let env = Environment::new();
        let expr = Value::Quote(Rc::new(Value::SymbolRef("x".to_string())));
        assert_eq!(
            env.eval(&expr).unwrap(),
            Value::SymbolRef("x".to_string())
        );
    }

    #[test]
    fn test_symbol_ref_resolves_value_slot() {
        let env = Environment::new();
        env.get("x").set_value(Value::Number(Number::Long(7)));
        assert_eq!(
            env.eval(&Value::SymbolRef("x".to_string())).unwrap(),
            Value::Number(Number::Long(7))
        );
    }

    #[test]
    fn test_unbound_symbol_is_void_variable() {
        let env = Environment::new();
        assert!(matches!(
            env.eval(&Value::SymbolRef("ghost".to_string())),
            Err(EvalError::VoidVariable(name)) if name == "ghost"
        ));
        // The probe symbol was useless and did not linger.
        let child = Environment::with_parent(env);
        assert!(matches!(
            child.eval(&Value::SymbolRef("ghost".to_string())),
            Err(EvalError::VoidVariable(_))
        ));
    }

    #[test]
    fn test_applying_a_non_callable() {
        let env = global_env();
        assert!(matches!(
            eval_source("(42 1 2)", &env),
            Err(EvalError::InvalidFunction(_))
        ));
        assert!(matches!(
            eval_source("('foo 1)", &env),
            Err(EvalError::InvalidFunction(_))
        ));
    }

    #[test]
    fn test_applying_a_function_less_symbol() {
        let env = global_env();
        assert!(matches!(
            eval_source("(no-such-function 1)", &env),
            Err(EvalError::VoidFunction(name)) if name == "no-such-function"
        ));
    }

    #[test]
    fn test_lambda_head_application() {
        let env = global_env();
        let result = eval_source("((lambda (x) (+ x x)) 21)", &env).unwrap();
        assert_eq!(result, Value::Number(Number::Long(42)));
    }

    #[test]
    fn test_function_arity() {
        let env = global_env();
        eval_source("(defun two (a b) (+ a b))", &env).unwrap();
        assert!(matches!(
            eval_source("(two 1)", &env),
            Err(EvalError::WrongNumberOfArguments(_))
        ));
        // Excess arguments are ignored.
        assert_eq!(
            eval_source("(two 1 2 3)", &env).unwrap(),
            Value::Number(Number::Long(3))
        );
    }

    #[test]
    fn test_empty_body_returns_nil() {
        let env = global_env();
        eval_source("(defun noop ())", &env).unwrap();
        assert_eq!(eval_source("(noop)", &env).unwrap(), Value::Nil);
    }

    #[test]
    fn test_arguments_evaluate_in_caller_scope() {
        let env = global_env();
        eval_source("(setq a 10)", &env).unwrap();
        eval_source("(defun pass (a) a)", &env).unwrap();
        assert_eq!(
            eval_source("(pass (+ a 1))", &env).unwrap(),
            Value::Number(Number::Long(11))
        );
    }

    #[test]
    fn test_eval_source_returns_last_result() {
        let env = global_env();
        assert_eq!(
            eval_source("(setq a 1) (setq b 2) (+ a b)", &env).unwrap(),
            Value::Number(Number::Long(3))
        );
        assert_eq!(eval_source("", &env).unwrap(), Value::Nil);
    }

    #[test]
    fn test_read_one_round_trips_through_eval() {
        let env = global_env();
        let expr = read_one("(+ 1 2)");
        assert_eq!(
            env.eval(&expr).unwrap(),
            Value::Number(Number::Long(3))
        );
    }
}
