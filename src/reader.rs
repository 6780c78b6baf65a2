// ABOUTME: Recursive-descent reader building the object graph from tokens

use crate::error::EvalError;
use crate::number::Number;
use crate::tokenizer::{Token, Tokenizer};
use crate::value::Value;
use std::rc::Rc;

/// Turns the token stream into values: lists, dotted pairs, quotes and
/// atoms. Symbols stay unresolved `SymbolRef`s; the evaluator binds them
/// through the environment chain.
pub struct Reader<I: Iterator<Item = char>> {
    tokens: Tokenizer<I>,
}

impl<I: Iterator<Item = char>> Reader<I> {
    pub fn new(input: I) -> Self {
        Reader {
            tokens: Tokenizer::new(input),
        }
    }

    /// Reads the next top-level expression, `None` at end of input.
    pub fn next_expr(&mut self) -> Result<Option<Value>, EvalError> {
        if self.tokens.next_token()? == Token::End {
            return Ok(None);
        }
        self.read_expr().map(Some)
    }

    /// Reads one expression starting from the current token.
    fn read_expr(&mut self) -> Result<Value, EvalError> {
        match self.tokens.current_token() {
            Token::LeftParen => self.read_list(),
            Token::Symbol => Ok(match self.tokens.lexeme() {
                "nil" => Value::Nil,
                "t" => Value::T,
                name => Value::SymbolRef(name.to_string()),
            }),
            Token::Str => Ok(Value::String(self.tokens.lexeme().to_string())),
            Token::Number => {
                Number::from_lexeme(self.tokens.lexeme(), self.tokens.line()).map(Value::Number)
            }
            Token::Quote => {
                self.tokens.next_token()?;
                let inner = self.read_expr()?;
                Ok(Value::Quote(Rc::new(inner)))
            }
            Token::End => Err(self.error("unexpected end of file")),
            Token::RightParen => Err(self.error("unexpected )")),
            Token::Dot => Err(self.error("dotted-pair dot outside a list")),
        }
    }

    /// Reads the remainder of a list after its opening paren. A dot makes
    /// the following expression the tail of the enclosing pair.
    fn read_list(&mut self) -> Result<Value, EvalError> {
        match self.tokens.next_token()? {
            Token::RightParen => Ok(Value::Nil),
            Token::End => Err(self.error("unexpected end of file")),
            Token::Dot => {
                self.tokens.next_token()?;
                let tail = self.read_expr()?;
                if self.tokens.next_token()? != Token::RightParen {
                    return Err(self.error("expected ) after dotted pair"));
                }
                Ok(tail)
            }
            _ => {
                let car = self.read_expr()?;
                let cdr = self.read_list()?;
                Ok(Value::cons(car, cdr))
            }
        }
    }

    fn error(&self, message: &str) -> EvalError {
        EvalError::parse(message, self.tokens.line())
    }
}
