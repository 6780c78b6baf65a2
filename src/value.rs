// ABOUTME: Value types representing Lisp data structures and expressions

use crate::env::{Environment, SymbolHandle};
use crate::error::EvalError;
use crate::number::Number;
use std::fmt;
use std::rc::Rc;

/// A special form: receives the whole call cell unevaluated and drives
/// argument evaluation itself.
pub type FormFn = fn(&Rc<Environment>, &Rc<ConsCell>) -> Result<Value, EvalError>;

/// A native function: every positional argument is evaluated before the
/// callback runs.
pub type SubrFn = fn(&Rc<Environment>, &[Value]) -> Result<Value, EvalError>;

#[derive(Debug, Clone)]
pub enum Value {
    /// The empty list and the unique falsey value.
    Nil,
    /// The canonical truth value.
    T,
    Cons(Rc<ConsCell>),
    /// A resolved symbol, shared with the environment that owns it.
    Symbol(SymbolHandle),
    /// An unresolved by-name reference produced by the reader.
    SymbolRef(String),
    /// Wraps a value so that evaluation returns the inner value verbatim.
    Quote(Rc<Value>),
    String(String),
    Number(Number),
    /// A user-defined procedure built by `lambda` or `defun`.
    Function(Rc<Function>),
    /// Host special form, installed at startup.
    Form { name: &'static str, f: FormFn },
    /// Host function with pre-evaluated arguments.
    Subr { name: &'static str, f: SubrFn },
}

/// The primitive compound data structure. A list is a chain of cells
/// ending in `Nil`; a dotted pair ends in anything else.
#[derive(Debug)]
pub struct ConsCell {
    pub car: Value,
    pub cdr: Value,
}

impl ConsCell {
    pub fn new(car: Value, cdr: Value) -> Self {
        ConsCell { car, cdr }
    }

    /// Steps to the next cell of an argument list. `Nil` terminates the
    /// walk; any other tail fails the `listp` predicate.
    pub fn next(&self, context: &str) -> Result<Option<Rc<ConsCell>>, EvalError> {
        match &self.cdr {
            Value::Cons(cell) => Ok(Some(cell.clone())),
            Value::Nil => Ok(None),
            _ => Err(EvalError::wrong_type(context, "listp")),
        }
    }
}

impl Default for ConsCell {
    fn default() -> Self {
        ConsCell::new(Value::Nil, Value::Nil)
    }
}

/// A user-defined procedure: ordered parameter names plus a body list.
/// There is no captured environment; symbols a closure needs survive by
/// migrating into the parent scope when their environment is torn down.
#[derive(Debug)]
pub struct Function {
    pub params: Vec<String>,
    /// Cons list of body forms, `Nil` for an empty body.
    pub body: Value,
}

impl Value {
    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Cons(Rc::new(ConsCell::new(car, cdr)))
    }

    /// Builds a proper list from the given elements.
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        let mut out = Value::Nil;
        for item in items.into_iter().rev() {
            out = Value::cons(item, out);
        }
        out
    }

    /// Nil is the unique falsey value; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::T => "t",
            Value::Cons(_) => "cons",
            Value::Symbol(_) => "symbol",
            Value::SymbolRef(_) => "symbol-ref",
            Value::Quote(_) => "quote",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Function(_) => "function",
            Value::Form { .. } | Value::Subr { .. } => "native",
        }
    }
}

/// Structural equality: singletons by identity, numbers through the
/// promotion comparator, cons cells recursively, symbols and callables by
/// pointer identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) | (Value::T, Value::T) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::SymbolRef(a), Value::SymbolRef(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a.ptr_eq(b),
            (Value::Quote(a), Value::Quote(b)) => a == b,
            (Value::Cons(a), Value::Cons(b)) => a.car == b.car && a.cdr == b.cdr,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Form { name: a, .. }, Value::Form { name: b, .. }) => a == b,
            (Value::Subr { name: a, .. }, Value::Subr { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::T => write!(f, "t"),
            Value::Cons(cell) => {
                write!(f, "({}", cell.car)?;
                let mut tail = &cell.cdr;
                loop {
                    match tail {
                        Value::Cons(next) => {
                            write!(f, " {}", next.car)?;
                            tail = &next.cdr;
                        }
                        Value::Nil => break,
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::Symbol(handle) => write!(f, "{}", handle.name()),
            Value::SymbolRef(name) => write!(f, "{name}"),
            Value::Quote(inner) => write!(f, "'{inner}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Number(n) => write!(f, "{n}"),
            Value::Function(_) => write!(f, "#<function>"),
            Value::Form { name, .. } => write!(f, "#<form {name}>"),
            Value::Subr { name, .. } => write!(f, "#<subr {name}>"),
        }
    }
}
