// ABOUTME: Error types for tokenizing, reading and evaluation failures

use thiserror::Error;

/// Diagnostics follow the `<symbol-name> <detail>` convention, so the
/// top-level driver can print an error with plain `{}` formatting.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Lexical or syntactic error; carries the 1-based source line.
    #[error("parse_error {message} (line {line})")]
    Parse { message: String, line: u32 },

    /// A form or function was called with too few arguments.
    #[error("wrong-number-of-arguments {0}")]
    WrongNumberOfArguments(String),

    /// An operand failed a type predicate, e.g. `listp` or `symbolp`.
    #[error("wrong-type-argument {0}")]
    WrongTypeArgument(String),

    /// A symbol was evaluated while its value slot is unset.
    #[error("void-variable {0}")]
    VoidVariable(String),

    /// A symbol was applied while its function slot is unset.
    #[error("void-function {0}")]
    VoidFunction(String),

    /// A non-callable value was applied.
    #[error("invalid-function {0}")]
    InvalidFunction(String),

    /// Arithmetic failure, currently only division by zero.
    #[error("arith_error {0}")]
    Arith(String),

    /// Logic error: `create` found the name already bound in the same
    /// scope. Only reachable through a duplicate parameter name.
    #[error("duplicate local binding {0}")]
    DuplicateBinding(String),
}

impl EvalError {
    pub fn parse(message: impl Into<String>, line: u32) -> Self {
        EvalError::Parse {
            message: message.into(),
            line,
        }
    }

    /// Failed predicate with its context, formatted like `"setq: symbolp"`.
    pub fn wrong_type(context: &str, predicate: &str) -> Self {
        EvalError::WrongTypeArgument(format!("{context}: {predicate}"))
    }

    pub fn wrong_arg_count(context: impl Into<String>) -> Self {
        EvalError::WrongNumberOfArguments(context.into())
    }

    pub fn division_by_zero() -> Self {
        EvalError::Arith("division by zero".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_format() {
        assert_eq!(
            EvalError::wrong_type("setq", "symbolp").to_string(),
            "wrong-type-argument setq: symbolp"
        );
        assert_eq!(
            EvalError::wrong_arg_count("defun").to_string(),
            "wrong-number-of-arguments defun"
        );
        assert_eq!(
            EvalError::division_by_zero().to_string(),
            "arith_error division by zero"
        );
        assert_eq!(
            EvalError::parse("unterminated string literal", 3).to_string(),
            "parse_error unterminated string literal (line 3)"
        );
    }
}
