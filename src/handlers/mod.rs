use crate::errors::{PlanError, Result};
use crate::predicate::Predicate;
use crate::stack::PredicateStack;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Turns the operands left on a stack after its keyword into a predicate.
pub trait Handler: Send + Sync {
    fn keyword(&self) -> &'static str;
    /// Number of operand tokens this handler pops.
    fn arity(&self) -> usize;
    fn handle(&self, stack: &mut PredicateStack) -> Result<Predicate>;
}

/// Keyword to handler mapping. Build it once, then share it read-only.
/// Keys are stored lower-cased, so lookups ignore case.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<String, Arc<dyn Handler>>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register(builtins::Location);
        for field in crate::dataset::Field::ALL {
            reg.register(builtins::Measure(field));
        }
        reg
    }

    /// Adds `h`, replacing any handler whose keyword differs only in case.
    pub fn register<H: Handler + 'static>(&mut self, h: H) {
        let mut_map = Arc::make_mut(&mut self.inner);
        mut_map.insert(h.keyword().to_ascii_lowercase(), Arc::new(h));
    }

    pub fn get(&self, keyword: &str) -> Option<Arc<dyn Handler>> {
        self.inner.get(keyword.to_ascii_lowercase().as_str()).cloned()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.keys().map(String::as_str)
    }

    /// Run the handler for `keyword` against the operands on `stack`.
    /// The stack must hold exactly the handler's operands.
    pub fn dispatch(&self, keyword: &str, stack: &mut PredicateStack) -> Result<Predicate> {
        let handler = self
            .get(keyword)
            .ok_or_else(|| PlanError::UnknownPredicate(keyword.to_string()))?;
        if stack.len() != handler.arity() {
            return Err(PlanError::malformed(
                keyword,
                format!("expected {} operand(s), found {}", handler.arity(), stack.len()),
            ));
        }
        debug!(keyword, operands = %stack, "dispatching predicate");
        let predicate = handler.handle(stack)?;
        if !stack.is_empty() {
            return Err(PlanError::malformed(keyword, "operands left on the stack"));
        }
        Ok(predicate)
    }
}

pub mod builtins {
    use super::*;
    use crate::comparison::Comparator;
    use crate::dataset::{Coordinates, Field};
    use crate::grammar::{Token, LOCATION};

    /// `location = <lat>, <lon>`
    pub struct Location;
    impl Handler for Location {
        fn keyword(&self) -> &'static str { LOCATION }
        fn arity(&self) -> usize { 1 }
        fn handle(&self, stack: &mut PredicateStack) -> Result<Predicate> {
            match stack.pop()? {
                Token::Coordinate { lat, lon } => Ok(Predicate::Location(Coordinates::new(lat, lon))),
                other => Err(PlanError::malformed(
                    LOCATION,
                    format!("expected a coordinate pair, found `{other}`"),
                )),
            }
        }
    }

    /// `<field> (> | <) <number>`, e.g. `wind > 35`.
    pub struct Measure(pub Field);
    impl Handler for Measure {
        fn keyword(&self) -> &'static str { self.0.keyword() }
        fn arity(&self) -> usize { 2 }
        fn handle(&self, stack: &mut PredicateStack) -> Result<Predicate> {
            let keyword = self.keyword();
            let comparator = match stack.pop()? {
                Token::Comparator(c @ (Comparator::Greater | Comparator::Less)) => c,
                other => {
                    return Err(PlanError::malformed(
                        keyword,
                        format!("expected '>' or '<', found `{other}`"),
                    ))
                }
            };
            let value = match stack.pop()? {
                Token::Number(n) => n,
                other => {
                    return Err(PlanError::malformed(
                        keyword,
                        format!("expected a number, found `{other}`"),
                    ))
                }
            };
            Ok(Predicate::Threshold {
                field: self.0,
                comparator,
                value,
            })
        }
    }
}
