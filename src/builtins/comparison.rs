//! Comparison native: equal
//!
//! Structural equality over evaluated arguments: singletons by identity,
//! numbers through the promotion comparator, cons cells recursively.

use crate::env::Environment;
use crate::error::EvalError;
use crate::value::Value;
use std::rc::Rc;

/// ```lisp
/// (equal 1 1.0) => t
/// (equal '(1 2) '(1 2)) => t
/// (equal 'a 'b) => nil
/// ```
fn subr_equal(_env: &Rc<Environment>, args: &[Value]) -> Result<Value, EvalError> {
    let [first, second, ..] = args else {
        return Err(EvalError::wrong_arg_count("equal"));
    };
    Ok(if first == second { Value::T } else { Value::Nil })
}

pub fn register(env: &Rc<Environment>) {
    super::install_subr(env, "equal", subr_equal);
}

#[cfg(test)]
mod tests {
    use crate::env::global_env;
    use crate::error::EvalError;
    use crate::eval::eval_source;
    use crate::value::Value;

    fn truthy(src: &str) -> bool {
        eval_source(src, &global_env()).unwrap().is_truthy()
    }

    #[test]
    fn test_singleton_identity() {
        assert!(truthy("(equal nil nil)"));
        assert!(truthy("(equal t t)"));
        assert!(!truthy("(equal t nil)"));
    }

    #[test]
    fn test_numbers_compare_through_promotion() {
        assert!(truthy("(equal 1 1)"));
        assert!(truthy("(equal 1 1.0)"));
        assert!(truthy("(equal 1/2 2/4)"));
        assert!(truthy("(equal 2 4/2)"));
        assert!(!truthy("(equal 1 2)"));
    }

    #[test]
    fn test_structural_equality() {
        assert!(truthy("(equal \"a\" \"a\")"));
        assert!(!truthy("(equal \"a\" \"b\")"));
        assert!(truthy("(equal '(1 (2 . 3)) '(1 (2 . 3)))"));
        assert!(!truthy("(equal '(1 2) '(1 2 3))"));
        assert!(truthy("(equal 'yes 'yes)"));
    }

    #[test]
    fn test_bound_variables_compare_by_value() {
        let env = global_env();
        eval_source("(setq a 10)", &env).unwrap();
        assert_eq!(eval_source("(equal a 10)", &env).unwrap(), Value::T);
    }

    #[test]
    fn test_arity() {
        assert!(matches!(
            eval_source("(equal 1)", &global_env()),
            Err(EvalError::WrongNumberOfArguments(_))
        ));
    }
}
