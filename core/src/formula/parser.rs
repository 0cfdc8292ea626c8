use nom::{
    character::complete::{char, digit0, digit1},
    combinator::opt,
    error::{Error, ErrorKind},
    IResult, Parser,
};

use crate::error::CalcError;
use crate::formula::evaluator::resolve;
use crate::formula::token::{Operator, Token};

/// Deepest parenthesis nesting accepted before giving up.
pub const MAX_DEPTH: usize = 256;

/// Evaluate a flattened arithmetic expression.
///
/// The input must already be free of whitespace, placeholders and function
/// calls. Numbers are unsigned: `-` is always a binary operator.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    if expression.is_empty() {
        return Err(CalcError::EmptyExpression);
    }
    let (value, _) = Cursor { src: expression }.group(0, 0)?;
    Ok(value)
}

/// Index-based reader over one immutable expression.
///
/// Each nesting level scans from its start offset and hands back the reduced
/// value together with the offset just past its closing parenthesis.
struct Cursor<'a> {
    src: &'a str,
}

impl Cursor<'_> {
    fn group(&self, start: usize, depth: usize) -> Result<(f64, usize), CalcError> {
        if depth > MAX_DEPTH {
            return Err(CalcError::parse(start, "parentheses nested too deeply"));
        }

        let mut tokens = Vec::new();
        let mut offset = start;

        while let Some(c) = self.src[offset..].chars().next() {
            match c {
                '(' => {
                    let (value, next) = self.group(offset + 1, depth + 1)?;
                    tokens.push(Token::Number(value));
                    offset = next;
                }
                ')' => {
                    if depth == 0 {
                        return Err(CalcError::parse(offset, "unbalanced ')'"));
                    }
                    if tokens.is_empty() {
                        return Err(CalcError::parse(offset, "empty parentheses"));
                    }
                    let value = resolve(&tokens, offset)?;
                    return Ok((value, offset + 1));
                }
                _ => {
                    if let Some(op) = Operator::from_char(c) {
                        tokens.push(Token::Operator(op));
                        offset += 1;
                        continue;
                    }
                    let rest = &self.src[offset..];
                    match number_literal(rest) {
                        Ok((remaining, n)) => {
                            tokens.push(Token::Number(n));
                            offset += rest.len() - remaining.len();
                        }
                        Err(_) => {
                            return Err(CalcError::parse(
                                offset,
                                format!("unrecognized character '{}'", c),
                            ));
                        }
                    }
                }
            }
        }

        if depth > 0 {
            return Err(CalcError::parse(offset, "unbalanced '(': missing ')'"));
        }
        if tokens.is_empty() {
            return Err(CalcError::EmptyExpression);
        }
        Ok((resolve(&tokens, offset)?, offset))
    }
}

/// An unsigned decimal literal: digits with an optional fraction.
fn number_literal(input: &str) -> IResult<&str, f64> {
    let (rest, _) = (digit1, opt((char('.'), digit0))).parse(input)?;
    let literal = &input[..input.len() - rest.len()];
    match literal.parse::<f64>() {
        Ok(n) => Ok((rest, n)),
        Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::Float))),
    }
}
