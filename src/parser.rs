// src/parser.rs

#[derive(Debug, PartialEq)]
pub enum ParseError {
    InvalidSyntax(String),
}

/// Character cursor over a single expression line.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn parse_identifier(&mut self) -> Result<&'a str, ParseError> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(ParseError::InvalidSyntax("identifier expected".into()));
        }
        Ok(&self.s[start..self.i])
    }

    /// Optionally signed integer or decimal literal, with an optional exponent.
    pub fn parse_number(&mut self) -> Result<f64, ParseError> {
        let start = self.i;
        if matches!(self.peek_char(), Some('+' | '-')) {
            self.i += 1;
        }
        let mut digits = self.skip_digits();
        if self.consume_char('.') {
            digits += self.skip_digits();
        }
        if digits == 0 {
            self.i = start;
            return Err(ParseError::InvalidSyntax("number expected".into()));
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let mark = self.i;
            self.i += 1;
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.i += 1;
            }
            if self.skip_digits() == 0 {
                // Not an exponent after all; leave it for the caller to reject.
                self.i = mark;
            }
        }
        let text = &self.s[start..self.i];
        let value: f64 = text
            .parse()
            .map_err(|_| ParseError::InvalidSyntax(format!("bad number `{text}`")))?;
        if !value.is_finite() {
            return Err(ParseError::InvalidSyntax(format!("number `{text}` out of range")));
        }
        Ok(value)
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        self.i - start
    }

    pub fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(ParseError::InvalidSyntax(format!("expected '{}'", c)))
        }
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn rest(&self) -> &'a str {
        &self.s[self.i..]
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_accept_sign_decimal_and_exponent() {
        for (text, expected) in [
            ("35", 35.0),
            ("-4", -4.0),
            ("+2.5", 2.5),
            (".5", 0.5),
            ("12.", 12.0),
            ("1e3", 1000.0),
            ("2.5E-1", 0.25),
        ] {
            let mut p = Parser::new(text);
            assert_eq!(p.parse_number(), Ok(expected), "{text}");
            assert!(p.eof(), "{text}");
        }
    }

    #[test]
    fn dangling_exponent_is_left_unconsumed() {
        let mut p = Parser::new("3e");
        assert_eq!(p.parse_number(), Ok(3.0));
        assert_eq!(p.rest(), "e");
    }

    #[test]
    fn rejects_non_numbers() {
        for text in ["", "-", ".", "abc", "1e999"] {
            let mut p = Parser::new(text);
            assert!(p.parse_number().is_err(), "{text}");
        }
    }

    #[test]
    fn identifier_stops_at_punctuation() {
        let mut p = Parser::new("wind_dir>3");
        assert_eq!(p.parse_identifier(), Ok("wind_dir"));
        assert_eq!(p.peek_char(), Some('>'));
    }
}
