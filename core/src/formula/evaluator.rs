use crate::error::CalcError;
use crate::formula::token::{Operator, Token};

/// Reduce a flat token list to one number, honoring precedence and associativity.
///
/// `position` is where the list ended in the source and is only used for errors.
pub fn resolve(tokens: &[Token], position: usize) -> Result<f64, CalcError> {
    let postfix = to_postfix(tokens);
    evaluate_postfix(&postfix, position)
}

/// Reorder infix tokens into postfix order using an operator stack.
pub fn to_postfix(tokens: &[Token]) -> Vec<Token> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Operator> = Vec::new();

    for token in tokens {
        match *token {
            Token::Number(_) => output.push(*token),
            Token::Operator(incoming) => {
                while let Some(&top) = stack.last() {
                    if !top.yields_to(incoming) {
                        break;
                    }
                    stack.pop();
                    output.push(Token::Operator(top));
                }
                stack.push(incoming);
            }
        }
    }

    output.extend(stack.into_iter().rev().map(Token::Operator));
    output
}

/// Evaluate a postfix token sequence with a value stack.
pub fn evaluate_postfix(postfix: &[Token], position: usize) -> Result<f64, CalcError> {
    let mut values: Vec<f64> = Vec::with_capacity(postfix.len() / 2 + 1);

    for token in postfix {
        match *token {
            Token::Number(n) => values.push(n),
            Token::Operator(op) => {
                let (Some(b), Some(a)) = (values.pop(), values.pop()) else {
                    return Err(CalcError::parse(
                        position,
                        format!("missing operand for '{}'", op.symbol()),
                    ));
                };
                values.push(op.apply(a, b));
            }
        }
    }

    match values.as_slice() {
        [result] => Ok(*result),
        [] => Err(CalcError::parse(position, "nothing to evaluate")),
        _ => Err(CalcError::parse(position, "missing operator between operands")),
    }
}
