//! Restricted arithmetic over recognized text.
//!
//! Only numeric literals, `+ - * /`, unary signs and parentheses are
//! understood. Anything else is a syntax error; there is no fallback to a
//! general-purpose evaluator.

use thiserror::Error;

/// Nesting limit for parentheses and unary signs.
const MAX_DEPTH: usize = 256;

/// Values with a magnitude below this print without a fractional part when integral.
const INTEGRAL_DISPLAY_LIMIT: f64 = 1e15;

/// Errors raised while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Expression is empty")]
    Empty,

    #[error("Invalid number literal at position {0}")]
    InvalidNumber(usize),

    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Unexpected token at position {0}")]
    UnexpectedToken(usize),

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NonFinite,

    #[error("Expression nested deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

/// Prepares recognized text for evaluation.
///
/// Lowercases, maps the letter `x` to `*` (a commonly misread multiplication
/// sign), then drops every character that is not a digit, `+ - * / ( ) .` or
/// whitespace.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'x' { '*' } else { c })
        .filter(|c| c.is_ascii_digit() || "+-*/().".contains(*c) || c.is_whitespace())
        .collect()
}

/// Evaluates a sanitized expression.
pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(EvalError::UnexpectedToken(token.offset));
    }
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(value)
}

/// Formats a result for display: `36`, `-4`, `2.5`.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < INTEGRAL_DISPLAY_LIMIT {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: Kind,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let kind = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Kind::Plus,
            '-' => Kind::Minus,
            '*' => Kind::Star,
            '/' => Kind::Slash,
            '(' => Kind::LParen,
            ')' => Kind::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                let mut seen_dot = false;
                while i < chars.len() {
                    match chars[i] {
                        d if d.is_ascii_digit() => {}
                        '.' if !seen_dot => seen_dot = true,
                        _ => break,
                    }
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::InvalidNumber(start))?;
                tokens.push(Token {
                    kind: Kind::Number(value),
                    offset: start,
                });
                continue;
            }
            ch => return Err(EvalError::UnexpectedChar { ch, pos: i }),
        };
        tokens.push(Token { kind, offset: i });
        i += 1;
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn descend(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        Ok(())
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(token) = self.peek() {
            match token.kind {
                Kind::Plus => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Kind::Minus => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        while let Some(token) = self.peek() {
            match token.kind {
                Kind::Star => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Kind::Slash => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    value /= divisor;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // unary := ('+' | '-') unary | primary
    fn unary(&mut self) -> Result<f64, EvalError> {
        match self.peek().map(|t| t.kind) {
            Some(Kind::Plus) | Some(Kind::Minus) => {
                let negate = matches!(self.next().map(|t| t.kind), Some(Kind::Minus));
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(if negate { -value } else { value })
            }
            _ => self.primary(),
        }
    }

    // primary := number | '(' expr ')'
    fn primary(&mut self) -> Result<f64, EvalError> {
        let token = self.next().ok_or(EvalError::UnexpectedEnd)?;
        match token.kind {
            Kind::Number(value) => Ok(value),
            Kind::LParen => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token {
                        kind: Kind::RParen, ..
                    }) => Ok(value),
                    Some(other) => Err(EvalError::UnexpectedToken(other.offset)),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            _ => Err(EvalError::UnexpectedToken(token.offset)),
        }
    }
}
