use crate::errors::{PlanError, Result};
use crate::grammar::Token;
use itertools::Itertools;
use std::fmt;

/// LIFO holder for one expression's tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateStack {
    tokens: Vec<Token>,
}

impl PredicateStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from tokens in reading order, so the first token is popped first.
    pub fn from_sequence(mut tokens: Vec<Token>) -> Self {
        tokens.reverse();
        Self { tokens }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn pop(&mut self) -> Result<Token> {
        self.tokens.pop().ok_or(PlanError::EmptyStack)
    }

    pub fn peek(&self) -> Result<&Token> {
        self.tokens.last().ok_or(PlanError::EmptyStack)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

impl fmt::Display for PredicateStack {
    // Top of stack first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.tokens.iter().rev().join(" | "))
    }
}
