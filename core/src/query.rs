//! Boolean query expressions: tokenizer, shunting-yard parser, and the
//! postfix stack machine.
//!
//! Grammar: terms are maximal alphanumeric runs, `|` is OR, parentheses
//! group, and the implicit AND comes from adjacency of two terms/groups.
//! Every other character is a plain separator. AND binds tighter than OR;
//! both operators are left-associative.

use std::borrow::Cow;

use thiserror::Error;

use crate::index::InvertedIndex;
use crate::postings::PostingSet;

/// Failure of a single query. The batch keeps going; the caller logs and
/// skips the query.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unbalanced parentheses")]
    UnbalancedParens,
    #[error("operator is missing an operand")]
    MissingOperand,
    #[error("empty expression")]
    EmptyExpression,
    #[error("expression does not reduce to a single result")]
    DanglingOperands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    And,
    Or,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Op::And => 2,
            Op::Or => 1,
        }
    }

    fn apply<S: PostingSet>(self, left: &S, right: &S) -> S {
        match self {
            Op::And => left.intersect(right),
            Op::Or => left.union(right),
        }
    }
}

/// One element of the tokenized infix expression. Terms are resolved
/// against the index as they are scanned, so every leaf is already a
/// posting set borrowed from the index.
#[derive(Debug, PartialEq)]
pub enum Token<'a, S> {
    Leaf(&'a S),
    Operator(Op),
    OpenParen,
    CloseParen,
}

/// Postfix element: leaves and operators only, parentheses are gone.
#[derive(Debug, PartialEq)]
pub enum Postfix<'a, S> {
    Leaf(&'a S),
    Operator(Op),
}

/// Splits a raw query into infix tokens. Separators emit nothing of their
/// own; an And token is inserted exactly where a leaf or `(` follows a leaf
/// or `)`, so `"a b | c"` and `"a b|c"` tokenize identically.
pub fn tokenize<'a, S: PostingSet>(
    query: &str,
    index: &'a InvertedIndex<S>,
) -> Vec<Token<'a, S>> {
    let mut tokens = Vec::new();
    let mut term = String::new();
    for ch in query.chars() {
        if ch.is_alphanumeric() {
            term.push(ch);
            continue;
        }
        flush_term(&mut term, &mut tokens, index);
        match ch {
            '|' => tokens.push(Token::Operator(Op::Or)),
            '(' => {
                implicit_and(&mut tokens);
                tokens.push(Token::OpenParen);
            }
            ')' => tokens.push(Token::CloseParen),
            _ => {}
        }
    }
    flush_term(&mut term, &mut tokens, index);
    tokens
}

fn flush_term<'a, S: PostingSet>(
    term: &mut String,
    tokens: &mut Vec<Token<'a, S>>,
    index: &'a InvertedIndex<S>,
) {
    if term.is_empty() {
        return;
    }
    implicit_and(tokens);
    tokens.push(Token::Leaf(index.lookup(term)));
    term.clear();
}

fn implicit_and<S>(tokens: &mut Vec<Token<'_, S>>) {
    if matches!(tokens.last(), Some(Token::Leaf(_) | Token::CloseParen)) {
        tokens.push(Token::Operator(Op::And));
    }
}

enum StackEntry {
    Operator(Op),
    Paren,
}

/// Shunting-yard conversion of the infix token sequence to postfix order.
/// An incoming operator first pops every stacked operator of greater or
/// equal precedence (the left-associative tie-break).
pub fn to_postfix<'a, S>(tokens: Vec<Token<'a, S>>) -> Result<Vec<Postfix<'a, S>>, QueryError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<StackEntry> = Vec::new();
    for token in tokens {
        match token {
            Token::Leaf(set) => output.push(Postfix::Leaf(set)),
            Token::Operator(op) => {
                while let Some(&StackEntry::Operator(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    output.push(Postfix::Operator(top));
                    stack.pop();
                }
                stack.push(StackEntry::Operator(op));
            }
            Token::OpenParen => stack.push(StackEntry::Paren),
            Token::CloseParen => loop {
                match stack.pop() {
                    Some(StackEntry::Operator(op)) => output.push(Postfix::Operator(op)),
                    Some(StackEntry::Paren) => break,
                    None => return Err(QueryError::UnbalancedParens),
                }
            },
        }
    }
    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Operator(op) => output.push(Postfix::Operator(op)),
            StackEntry::Paren => return Err(QueryError::UnbalancedParens),
        }
    }
    Ok(output)
}

/// Runs the postfix sequence on an operand stack: leaves push, an operator
/// pops the right operand, then the left, and pushes the combined set.
/// Exactly one set must remain at the end.
pub fn evaluate_postfix<'a, S: PostingSet>(
    postfix: Vec<Postfix<'a, S>>,
) -> Result<S, QueryError> {
    let mut stack: Vec<Cow<'a, S>> = Vec::new();
    for item in postfix {
        match item {
            Postfix::Leaf(set) => stack.push(Cow::Borrowed(set)),
            Postfix::Operator(op) => {
                let right = stack.pop().ok_or(QueryError::MissingOperand)?;
                let left = stack.pop().ok_or(QueryError::MissingOperand)?;
                stack.push(Cow::Owned(op.apply(left.as_ref(), right.as_ref())));
            }
        }
    }
    let result = stack.pop().ok_or(QueryError::EmptyExpression)?;
    if !stack.is_empty() {
        return Err(QueryError::DanglingOperands);
    }
    Ok(result.into_owned())
}

/// Evaluates a whole query expression to a single posting set.
pub fn evaluate<S: PostingSet>(query: &str, index: &InvertedIndex<S>) -> Result<S, QueryError> {
    evaluate_postfix(to_postfix(tokenize(query, index))?)
}

/// Evaluates each top-level OR clause of the query independently, for
/// overlap scoring. The split is bracket-aware: a `|` inside parentheses
/// stays within its clause.
pub fn evaluate_clauses<S: PostingSet>(
    query: &str,
    index: &InvertedIndex<S>,
) -> Result<Vec<S>, QueryError> {
    split_top_level_or(query)
        .into_iter()
        .map(|clause| evaluate(clause, index))
        .collect()
}

fn split_top_level_or(query: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (pos, ch) in query.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                clauses.push(&query[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    clauses.push(&query[start..]);
    clauses
}
