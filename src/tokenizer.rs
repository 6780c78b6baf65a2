// ABOUTME: Streaming tokenizer cutting a character stream into Lisp tokens

use crate::error::EvalError;
use std::iter::Peekable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    End,
    LeftParen,
    RightParen,
    Str,
    Symbol,
    Number,
    Dot,
    Quote,
}

/// Pull-based scanner over a forward character iterator. The caller
/// drives it with `next_token`; the lexeme of the current token stays
/// available until the next call.
pub struct Tokenizer<I: Iterator<Item = char>> {
    input: Peekable<I>,
    line: u32,
    lexeme: String,
    current: Token,
}

impl<I: Iterator<Item = char>> Tokenizer<I> {
    pub fn new(input: I) -> Self {
        Tokenizer {
            input: input.peekable(),
            line: 1,
            lexeme: String::new(),
            current: Token::End,
        }
    }

    /// 1-based line of the scan position, incremented on every newline.
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn current_token(&self) -> Token {
        self.current
    }

    /// Text of the current token. For strings this is the unescaped
    /// content without the surrounding quotes.
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn next_token(&mut self) -> Result<Token, EvalError> {
        self.lexeme.clear();

        loop {
            let Some(&c) = self.input.peek() else {
                return Ok(self.set_current(Token::End));
            };
            match c {
                '\n' => {
                    self.line += 1;
                    self.input.next();
                }
                ' ' | '\t' => {
                    self.input.next();
                }
                '(' => return Ok(self.single(c, Token::LeftParen)),
                ')' => return Ok(self.single(c, Token::RightParen)),
                '\'' => return Ok(self.single(c, Token::Quote)),
                '.' => return Ok(self.single(c, Token::Dot)),
                '"' => {
                    self.input.next();
                    self.scan_string()?;
                    return Ok(self.set_current(Token::Str));
                }
                _ => return Ok(self.scan_symbol_or_number()),
            }
        }
    }

    fn set_current(&mut self, token: Token) -> Token {
        self.current = token;
        token
    }

    fn single(&mut self, c: char, token: Token) -> Token {
        self.input.next();
        self.lexeme.push(c);
        self.set_current(token)
    }

    fn scan_string(&mut self) -> Result<(), EvalError> {
        loop {
            match self.input.next() {
                None => {
                    return Err(EvalError::parse("unterminated string literal", self.line));
                }
                Some('"') => return Ok(()),
                Some('\\') => match self.input.next() {
                    None => {
                        return Err(EvalError::parse("unterminated string literal", self.line));
                    }
                    Some('n') => self.lexeme.push('\n'),
                    Some('t') => self.lexeme.push('\t'),
                    Some('\\') => self.lexeme.push('\\'),
                    Some('"') => self.lexeme.push('"'),
                    Some(other) => {
                        log::warn!("line {}: unknown escape sequence: \\{}", self.line, other);
                        if other == '\n' {
                            self.line += 1;
                        }
                        self.lexeme.push(other);
                    }
                },
                Some('\n') => {
                    self.line += 1;
                    self.lexeme.push('\n');
                }
                Some(c) => self.lexeme.push(c),
            }
        }
    }

    fn scan_symbol_or_number(&mut self) -> Token {
        while let Some(&c) = self.input.peek() {
            if matches!(c, ' ' | '\t' | '\n' | '"' | '\'' | '(' | ')') {
                break;
            }
            self.lexeme.push(c);
            self.input.next();
        }
        if is_number_lexeme(&self.lexeme) {
            self.set_current(Token::Number)
        } else {
            self.set_current(Token::Symbol)
        }
    }
}

/// A lexeme is a number when it is an optional leading minus, digits, and
/// at most one interior `.` (double) or `/` (fraction), never both. A
/// fraction denominator may carry its own sign; reduction normalizes it.
fn is_number_lexeme(lexeme: &str) -> bool {
    let body = lexeme.strip_prefix('-').unwrap_or(lexeme);
    if body.is_empty() {
        return false;
    }
    if let Some((int, frac)) = body.split_once('.') {
        return is_digits(int) && is_digits(frac);
    }
    if let Some((num, den)) = body.split_once('/') {
        let den = den.strip_prefix('-').unwrap_or(den);
        return is_digits(num) && is_digits(den);
    }
    is_digits(body)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
