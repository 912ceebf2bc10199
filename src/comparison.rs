use std::fmt;

/// Comparison symbols of the predicate language.
///
/// `Greater` and `Less` are strict. The text grammar only accepts `Equal` in
/// the `location` form; a `Predicate::Threshold` built in code may still use
/// it for an exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Greater,
    Less,
    Equal,
}

impl Comparator {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '>' => Some(Comparator::Greater),
            '<' => Some(Comparator::Less),
            '=' => Some(Comparator::Equal),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Comparator::Greater => '>',
            Comparator::Less => '<',
            Comparator::Equal => '=',
        }
    }

    /// `lhs <self> rhs`. NaN on either side never passes.
    pub fn test(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparator::Greater => lhs > rhs,
            Comparator::Less => lhs < rhs,
            Comparator::Equal => lhs == rhs,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
