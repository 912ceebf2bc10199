use crate::comparison::Comparator;
use crate::context::EvalOptions;
use crate::dataset::{Coordinates, Dataset, Field, WeatherRecord};
use crate::errors::{PlanError, Result};
use crate::grammar::LOCATION;
use std::fmt;

/// A compiled, evaluable condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// The dataset must have been retrieved for this point.
    Location(Coordinates),
    /// Per-record test: `record.field <comparator> value`.
    Threshold {
        field: Field,
        comparator: Comparator,
        value: f64,
    },
}

impl Predicate {
    pub fn wind(comparator: Comparator, threshold: f64) -> Self {
        Predicate::Threshold {
            field: Field::WindSpeed,
            comparator,
            value: threshold,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Predicate::Location(_) => LOCATION,
            Predicate::Threshold { field, .. } => field.keyword(),
        }
    }

    /// Applies to the dataset as a whole rather than to each record.
    pub fn is_dataset_level(&self) -> bool {
        matches!(self, Predicate::Location(_))
    }

    pub fn check_dataset(&self, dataset: &Dataset, options: &EvalOptions) -> Result<()> {
        match self {
            Predicate::Location(expected) => {
                let actual = dataset.location();
                if expected.approx_eq(&actual, options.location_tolerance) {
                    Ok(())
                } else {
                    Err(PlanError::LocationMismatch {
                        expected: *expected,
                        actual,
                    })
                }
            }
            Predicate::Threshold { .. } => Ok(()),
        }
    }

    pub fn matches(&self, record: &WeatherRecord) -> bool {
        match self {
            Predicate::Location(_) => true,
            Predicate::Threshold {
                field,
                comparator,
                value,
            } => comparator.test(record.value(*field), *value),
        }
    }

    /// Ascending indices of the records this predicate accepts.
    pub fn filter_indices(&self, records: &[WeatherRecord]) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.matches(r))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Canonical text form. Predicates built by `compile` parse back to an
/// equal predicate.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Location(c) => write!(f, "{LOCATION} = {}, {}", c.lat, c.lon),
            Predicate::Threshold {
                field,
                comparator,
                value,
            } => write!(f, "{} {comparator} {value}", field.keyword()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::record;
    use pretty_assertions::assert_eq;

    #[test]
    fn wind_filter_selects_strictly() {
        let rs: Vec<_> = [10.0, 20.0, 25.0, 30.0, 40.0]
            .iter()
            .enumerate()
            .map(|(h, w)| record(h as u32, *w, 15.0))
            .collect();
        assert_eq!(Predicate::wind(Comparator::Greater, 25.0).filter_indices(&rs), vec![3, 4]);
        assert_eq!(Predicate::wind(Comparator::Less, 25.0).filter_indices(&rs), vec![0, 1]);
    }

    #[test]
    fn constructed_equal_threshold_matches_exact_values() {
        let rs: Vec<_> = [10.0, 25.0, 25.5, 25.0]
            .iter()
            .enumerate()
            .map(|(h, w)| record(h as u32, *w, 15.0))
            .collect();
        let exact = Predicate::wind(Comparator::Equal, 25.0);
        assert_eq!(exact.filter_indices(&rs), vec![1, 3]);
        assert_eq!(exact.to_string(), "wind = 25");
    }

    #[test]
    fn location_within_tolerance() {
        let ds = Dataset::new(Coordinates::new(31.83, 115.77), vec![record(0, 1.0, 1.0)]).unwrap();
        let opts = EvalOptions::default();
        assert!(Predicate::Location(Coordinates::new(31.8300001, 115.77))
            .check_dataset(&ds, &opts)
            .is_ok());
        let err = Predicate::Location(Coordinates::new(10.0, 10.0))
            .check_dataset(&ds, &opts)
            .unwrap_err();
        assert!(matches!(err, PlanError::LocationMismatch { .. }));
    }

    #[test]
    fn canonical_text() {
        assert_eq!(
            Predicate::Location(Coordinates::new(31.83, 115.77)).to_string(),
            "location = 31.83, 115.77"
        );
        assert_eq!(Predicate::wind(Comparator::Greater, 35.0).to_string(), "wind > 35");
        let cloud = Predicate::Threshold {
            field: Field::CloudCover,
            comparator: Comparator::Less,
            value: 12.5,
        };
        assert_eq!(cloud.to_string(), "cloud < 12.5");
    }
}
