// src/grammar.rs
use crate::comparison::Comparator;
use crate::errors::{PlanError, Result};
use crate::parser::{ParseError, Parser};
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(String),
    Comparator(Comparator),
    Number(f64),
    Coordinate { lat: f64, lon: f64 },
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(k) => write!(f, "{k}"),
            Token::Comparator(c) => write!(f, "{c}"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Coordinate { lat, lon } => write!(f, "{lat}, {lon}"),
        }
    }
}

/// Operand layout following a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `= <number> , <number>`
    Coordinate,
    /// `(> | <) <number>`
    Comparison,
}

#[derive(Debug, Clone, Copy)]
pub struct Alternative {
    pub keyword: &'static str,
    pub shape: Shape,
}

pub const LOCATION: &str = "location";

/// Every form the language accepts. Keywords are unique, so at most one
/// alternative can match a given input.
pub const ALTERNATIVES: &[Alternative] = &[
    Alternative { keyword: LOCATION, shape: Shape::Coordinate },
    Alternative { keyword: "wind", shape: Shape::Comparison },
    Alternative { keyword: "wind_dir", shape: Shape::Comparison },
    Alternative { keyword: "temperature_2m", shape: Shape::Comparison },
    Alternative { keyword: "precipitation", shape: Shape::Comparison },
    Alternative { keyword: "precipitation_prob", shape: Shape::Comparison },
    Alternative { keyword: "cloud", shape: Shape::Comparison },
];

pub fn keywords() -> impl Iterator<Item = &'static str> {
    ALTERNATIVES.iter().map(|a| a.keyword)
}

/// Parse one expression into tokens in reading order: keyword first, then
/// operands left to right. The `=` of the location form is not emitted.
pub fn parse(text: &str) -> Result<Vec<Token>> {
    let mut p = Parser::new(text);
    let tokens = parse_tokens(&mut p).map_err(|ParseError::InvalidSyntax(m)| PlanError::syntax(text, m))?;
    trace!(input = text, tokens = ?tokens, "parsed expression");
    Ok(tokens)
}

fn parse_tokens(p: &mut Parser) -> std::result::Result<Vec<Token>, ParseError> {
    p.skip_ws();
    let word = p
        .parse_identifier()
        .map_err(|_| ParseError::InvalidSyntax("expected a predicate keyword".into()))?;
    let alt = ALTERNATIVES
        .iter()
        .find(|a| a.keyword.eq_ignore_ascii_case(word))
        .ok_or_else(|| ParseError::InvalidSyntax(format!("unknown predicate `{word}`")))?;

    let mut tokens = vec![Token::Keyword(alt.keyword.to_string())];
    p.skip_ws();
    match alt.shape {
        Shape::Coordinate => {
            p.expect('=')?;
            p.skip_ws();
            let lat = p.parse_number()?;
            p.skip_ws();
            p.expect(',')?;
            p.skip_ws();
            let lon = p.parse_number()?;
            tokens.push(Token::Coordinate { lat, lon });
        }
        Shape::Comparison => {
            let cmp = p
                .peek_char()
                .and_then(Comparator::from_symbol)
                .filter(|c| *c != Comparator::Equal)
                .ok_or_else(|| ParseError::InvalidSyntax("expected '>' or '<'".into()))?;
            p.expect(cmp.symbol())?;
            p.skip_ws();
            let n = p.parse_number()?;
            tokens.push(Token::Comparator(cmp));
            tokens.push(Token::Number(n));
        }
    }

    p.skip_ws();
    if !p.eof() {
        return Err(ParseError::InvalidSyntax(format!(
            "unexpected trailing input `{}`",
            p.rest()
        )));
    }
    Ok(tokens)
}
