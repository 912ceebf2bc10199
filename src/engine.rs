use crate::context::EvalOptions;
use crate::dataset::{Dataset, WeatherRecord};
use crate::errors::{PlanError, Result};
use crate::grammar::{self, Token};
use crate::handlers::Registry;
use crate::predicate::Predicate;
use crate::stack::PredicateStack;
use itertools::{EitherOrBoth, Itertools};
use std::path::Path;
use tracing::debug;

/// Expressions in a plan text: one per line, blank lines and `#` comments skipped.
pub fn plan_expressions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

pub fn read_plan(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| PlanError::read(path, e))?;
    Ok(plan_expressions(&text))
}

/// Plan file expressions first, then `extra` in the given order.
pub fn collect_expressions(plan: Option<&Path>, extra: Vec<String>) -> Result<Vec<String>> {
    let mut exprs = match plan {
        Some(p) => read_plan(p)?,
        None => Vec::new(),
    };
    exprs.extend(extra);
    Ok(exprs)
}

/// Parse one expression and turn it into a predicate via `registry`.
pub fn compile(expr: &str, registry: &Registry) -> Result<Predicate> {
    let mut stack = PredicateStack::from_sequence(grammar::parse(expr)?);
    let keyword = match stack.pop()? {
        Token::Keyword(k) => k,
        other => {
            return Err(PlanError::syntax(
                expr,
                format!("expression must start with a keyword, found `{other}`"),
            ))
        }
    };
    registry.dispatch(&keyword, &mut stack)
}

/// Records satisfying every expression, in dataset order.
///
/// All expressions are compiled before anything is evaluated, and
/// dataset-level predicates are checked before any record is filtered, so a
/// failure anywhere yields no partial result.
pub fn evaluate<'d, S: AsRef<str>>(
    exprs: &[S],
    dataset: &'d Dataset,
    registry: &Registry,
    options: &EvalOptions,
) -> Result<Vec<&'d WeatherRecord>> {
    let predicates = exprs
        .iter()
        .map(|e| compile(e.as_ref(), registry))
        .collect::<Result<Vec<_>>>()?;
    evaluate_predicates(&predicates, dataset, options)
}

pub fn evaluate_predicates<'d>(
    predicates: &[Predicate],
    dataset: &'d Dataset,
    options: &EvalOptions,
) -> Result<Vec<&'d WeatherRecord>> {
    let (dataset_level, record_level): (Vec<&Predicate>, Vec<&Predicate>) =
        predicates.iter().partition(|p| p.is_dataset_level());

    for p in &dataset_level {
        p.check_dataset(dataset, options)?;
        debug!(predicate = %p, "dataset check passed");
    }

    let records = dataset.records();
    let mut selected: Vec<usize> = (0..records.len()).collect();
    for p in &record_level {
        let passing = p.filter_indices(records);
        debug!(predicate = %p, passing = passing.len(), "filtered records");
        selected = intersect(&selected, &passing);
    }
    Ok(selected.into_iter().map(|i| &records[i]).collect())
}

/// Intersection of two ascending index lists.
fn intersect(a: &[usize], b: &[usize]) -> Vec<usize> {
    a.iter()
        .merge_join_by(b.iter(), |x, y| x.cmp(y))
        .filter_map(|e| match e {
            EitherOrBoth::Both(x, _) => Some(*x),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::Comparator;
    use crate::dataset::tests::record;
    use crate::dataset::Coordinates;
    use pretty_assertions::assert_eq;

    fn dataset() -> Dataset {
        let rs = [(10.0, 15.0), (20.0, 18.0), (30.0, 22.0), (40.0, 12.0)]
            .iter()
            .enumerate()
            .map(|(h, (w, t))| record(h as u32, *w, *t))
            .collect();
        Dataset::new(Coordinates::new(31.83, 115.77), rs).unwrap()
    }

    fn speeds(rs: &[&WeatherRecord]) -> Vec<f64> {
        rs.iter().map(|r| r.wind_speed).collect()
    }

    #[test]
    fn compile_builds_predicates() {
        let reg = Registry::with_builtins();
        assert_eq!(
            compile("WIND < 22.22", &reg).unwrap(),
            Predicate::wind(Comparator::Less, 22.22)
        );
        assert_eq!(
            compile("location = 31.83, 115.77", &reg).unwrap(),
            Predicate::Location(Coordinates::new(31.83, 115.77))
        );
    }

    #[test]
    fn compile_without_handler_is_unknown() {
        let reg = Registry::new();
        assert!(matches!(
            compile("wind > 1", &reg),
            Err(PlanError::UnknownPredicate(_))
        ));
    }

    #[test]
    fn conjunction_is_an_intersection() {
        let ds = dataset();
        let reg = Registry::with_builtins();
        let opts = EvalOptions::default();
        let wind = evaluate(&["wind > 15"], &ds, &reg, &opts).unwrap();
        let temp = evaluate(&["temperature_2m < 20"], &ds, &reg, &opts).unwrap();
        assert_eq!(speeds(&wind), vec![20.0, 30.0, 40.0]);
        assert_eq!(speeds(&temp), vec![10.0, 20.0, 40.0]);

        let both = evaluate(&["wind > 15", "temperature_2m < 20"], &ds, &reg, &opts).unwrap();
        assert_eq!(speeds(&both), vec![20.0, 40.0]);
    }

    #[test]
    fn same_kind_predicates_form_a_range() {
        let ds = dataset();
        let out = evaluate(
            &["wind > 15", "wind < 35"],
            &ds,
            &Registry::with_builtins(),
            &EvalOptions::default(),
        )
        .unwrap();
        assert_eq!(speeds(&out), vec![20.0, 30.0]);
    }

    #[test]
    fn no_expressions_is_identity() {
        let ds = dataset();
        let none: [&str; 0] = [];
        let out = evaluate(&none, &ds, &Registry::with_builtins(), &EvalOptions::default()).unwrap();
        assert_eq!(out, ds.records().iter().collect::<Vec<_>>());
    }

    #[test]
    fn syntax_error_anywhere_aborts() {
        let ds = dataset();
        let err = evaluate(
            &["wind > 15", "wind >> 3"],
            &ds,
            &Registry::with_builtins(),
            &EvalOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::Syntax { .. }));
    }

    #[test]
    fn plan_text_skips_blanks_and_comments() {
        let text = "# photography, calm and dry\n\n  wind < 20  \n#cloud < 10\nprecipitation_prob < 30\n   \n";
        assert_eq!(
            plan_expressions(text),
            vec!["wind < 20".to_string(), "precipitation_prob < 30".to_string()]
        );
        assert!(plan_expressions("").is_empty());
    }

    #[test]
    fn plan_file_lines_come_before_extra_expressions() {
        let path = std::env::temp_dir().join(format!("weather-planner-plan-{}.txt", std::process::id()));
        std::fs::write(&path, "# calm\nwind < 20\n\ncloud < 50\n").unwrap();
        let exprs = collect_expressions(Some(&path), vec!["temperature_2m > 5".into()]);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            exprs.unwrap(),
            vec!["wind < 20", "cloud < 50", "temperature_2m > 5"]
        );

        let only_extra = collect_expressions(None, vec!["wind > 1".into()]).unwrap();
        assert_eq!(only_extra, vec!["wind > 1"]);
    }

    #[test]
    fn missing_plan_file_is_a_read_error() {
        let path = std::env::temp_dir().join("weather-planner-missing/plan.txt");
        let err = collect_expressions(Some(&path), Vec::new()).unwrap_err();
        assert!(matches!(err, PlanError::Read { path: ref p, .. } if p == &path));
    }

    #[test]
    fn intersect_merges_sorted_lists() {
        assert_eq!(intersect(&[0, 1, 3, 5, 8], &[1, 2, 5, 9]), vec![1, 5]);
        assert_eq!(intersect(&[], &[1, 2]), Vec::<usize>::new());
    }
}
