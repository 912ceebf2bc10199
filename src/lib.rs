pub mod errors;
pub mod context;
pub mod dataset;
pub mod engine;
pub mod grammar;
pub mod handlers;
pub mod predicate;
pub mod stack;
mod comparison;
mod parser;

use context::EvalOptions;
use dataset::{Dataset, WeatherRecord, Window};
use errors::Result;
use handlers::Registry;

pub use comparison::Comparator;
pub use dataset::Coordinates;
pub use errors::PlanError;
pub use predicate::Predicate;

/// Evaluates predicate expressions against weather datasets.
///
/// Holds an immutable handler registry and the evaluation options; cheap to
/// clone and safe to share between threads.
#[derive(Clone)]
pub struct Planner {
    options: EvalOptions,
    registry: Registry,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(Registry::with_builtins())
    }
}

impl Planner {
    pub fn new(registry: Registry) -> Self {
        Self { options: EvalOptions::default(), registry }
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn compile(&self, expr: &str) -> Result<Predicate> {
        engine::compile(expr, &self.registry)
    }

    /// Records satisfying all of `exprs`, in dataset order.
    pub fn evaluate<'d, S: AsRef<str>>(
        &self,
        exprs: &[S],
        dataset: &'d Dataset,
    ) -> Result<Vec<&'d WeatherRecord>> {
        engine::evaluate(exprs, dataset, &self.registry, &self.options)
    }

    /// Same as [`Planner::evaluate`], grouped into contiguous time windows.
    pub fn windows<'d, S: AsRef<str>>(&self, exprs: &[S], dataset: &'d Dataset) -> Result<Vec<Window<'d>>> {
        let selection = self.evaluate(exprs, dataset)?;
        Ok(dataset::windows(&selection, dataset.interval()))
    }
}

/// Convenience: evaluate with the built-in registry and default options.
pub fn evaluate<'d, S: AsRef<str>>(exprs: &[S], dataset: &'d Dataset) -> Result<Vec<&'d WeatherRecord>> {
    Planner::default().evaluate(exprs, dataset)
}
