//! Boolean retrieval over `&&` / `||` expressions.
//!
//! Terms are single words, operators are binary and left-associative, and
//! `&&` binds tighter than `||`. There are no parentheses and no negation.

use crate::index::{intersect_postings, union_postings, InvertedIndex};
use crate::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }

    /// Higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
        }
    }

    fn apply(self, a: &[DocId], b: &[DocId]) -> Vec<DocId> {
        match self {
            Operator::And => intersect_postings(a, b),
            Operator::Or => union_postings(a, b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Term(String),
    Op(Operator),
}

/// Split on `sep`, then trim and lowercase every piece. Empty pieces are kept.
pub fn split_trim_lower(s: &str, sep: &str) -> Vec<String> {
    s.split(sep).map(|piece| piece.trim().to_lowercase()).collect()
}

/// Flatten an expression into `[term, op, term, op, ...]`.
///
/// The expression is split on `&&` first and each chunk on `||`, so empty
/// operands (as in `a && && b`) survive as empty terms.
pub fn parse_infix(expr: &str) -> Vec<Token> {
    let mut output = Vec::new();
    for chunk in split_trim_lower(expr, Operator::And.symbol()) {
        for term in split_trim_lower(&chunk, Operator::Or.symbol()) {
            output.push(Token::Term(term));
            output.push(Token::Op(Operator::Or));
        }
        if let Some(last) = output.last_mut() {
            *last = Token::Op(Operator::And);
        }
    }
    output.pop();
    output
}

/// Reorder infix tokens into postfix with a single operator stack.
/// Equal precedence pops, which makes every operator left-associative.
pub fn shunting_yard(tokens: Vec<Token>) -> Vec<Token> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Operator> = Vec::new();
    for token in tokens {
        match token {
            Token::Term(_) => output.push(token),
            Token::Op(op) => {
                while let Some(&top) = operators.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    output.push(Token::Op(top));
                    operators.pop();
                }
                operators.push(op);
            }
        }
    }
    output.extend(operators.into_iter().rev().map(Token::Op));
    output
}

/// Evaluate a postfix sequence with a stack of postings lists.
///
/// Returns `None` if an operator is missing an operand or more than one
/// value remains at the end.
pub fn evaluate<F>(postfix: &[Token], mut operand: F) -> Option<Vec<DocId>>
where
    F: FnMut(&str) -> Vec<DocId>,
{
    let mut stack: Vec<Vec<DocId>> = Vec::new();
    for token in postfix {
        match token {
            Token::Term(term) => stack.push(operand(term.as_str())),
            Token::Op(op) => {
                let right = stack.pop()?;
                let left = stack.pop()?;
                stack.push(op.apply(&left, &right));
            }
        }
    }
    match stack.len() {
        1 => stack.pop(),
        _ => None,
    }
}

/// Answer a boolean query against `index`.
///
/// Pure `&&` or pure `||` expressions skip the expression tree and go
/// straight to `intersect` / `union`. Malformed input yields no results.
pub fn boolean_query(index: &InvertedIndex, query: &str) -> Vec<DocId> {
    let has_and = query.contains(Operator::And.symbol());
    let has_or = query.contains(Operator::Or.symbol());

    if has_and && has_or {
        let postfix = shunting_yard(parse_infix(query));
        match evaluate(&postfix, |term| index.intersect(&[term])) {
            Some(result) => result,
            None => {
                tracing::debug!(query, "malformed boolean expression");
                Vec::new()
            }
        }
    } else if has_or {
        index.union(&split_trim_lower(query, Operator::Or.symbol()))
    } else {
        index.intersect(&split_trim_lower(query, Operator::And.symbol()))
    }
}
