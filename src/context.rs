/// Default tolerance, in degrees, when matching a dataset's coordinates
/// against a `location` predicate.
pub const DEFAULT_LOCATION_TOLERANCE: f64 = 1e-6;

/// Evaluation options shared by every expression in one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalOptions {
    /// Maximum per-axis difference for two coordinates to count as equal.
    pub location_tolerance: f64,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            location_tolerance: DEFAULT_LOCATION_TOLERANCE,
        }
    }
}

impl EvalOptions {
    pub fn with_location_tolerance(mut self, tolerance: f64) -> Self {
        self.location_tolerance = tolerance.abs();
        self
    }
}
