//! Variance
//!
//! Scores how unevenly an outcome is spread across the categories of an
//! explanatory column. The score is the population standard deviation of the
//! per-category outcome rates, so a column whose categories show very
//! different rates scores high regardless of how large each category is.
use crate::data::Dataset;
use crate::errors::SplitwiseError;
use crate::histogram::CategoryHistogram;
use crate::outcome::Outcome;
use crate::utils::population_std_dev;
use log::debug;

/// Score an explanatory column against an outcome.
///
/// Never fails: a column that cannot be scored gets a score of 0 and is
/// simply deprioritized by the selector.
pub fn percentage_variance(data: &Dataset, column: &str, outcome: &Outcome) -> f64 {
    match try_percentage_variance(data, column, outcome) {
        Ok(score) => score,
        Err(e) => {
            debug!("Scoring column '{}' failed, using 0: {}", column, e);
            0.0
        }
    }
}

/// Score an explanatory column, surfacing lookup failures.
pub fn try_percentage_variance(data: &Dataset, column: &str, outcome: &Outcome) -> Result<f64, SplitwiseError> {
    let hist = CategoryHistogram::build(data, column, outcome)?;
    if hist.hits() == 0 {
        return Ok(0.0);
    }
    let rates = hist.rates();
    if rates.len() > 1 {
        Ok(population_std_dev(&rates))
    } else {
        Ok(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn weather_data() -> Dataset {
        let mut weather = vec!["rain"; 8];
        weather.extend(["clear"; 2]);
        let mut injury = vec![true; 8];
        injury.extend([false; 2]);
        Dataset::new(vec![
            Column::from_values("weather", weather),
            Column::from_values("injury", injury),
        ])
        .unwrap()
    }

    #[test]
    fn test_weather_variance() {
        let data = weather_data();
        let score = percentage_variance(&data, "weather", &Outcome::new("injury", true));
        assert_eq!(score, 50.0);
        // The string form of the target is normalized to a boolean.
        let score = percentage_variance(&data, "weather", &Outcome::new("injury", "true"));
        assert_eq!(score, 50.0);
    }

    #[test]
    fn test_single_category_scores_zero() {
        let data = Dataset::new(vec![
            Column::from_values("road", ["dry", "dry", "dry"]),
            Column::from_values("injury", [true, false, true]),
        ])
        .unwrap();
        assert_eq!(percentage_variance(&data, "road", &Outcome::new("injury", true)), 0.0);
    }

    #[test]
    fn test_missing_only_column_scores_zero() {
        let data = Dataset::new(vec![
            Column::from_options("road", [None::<&str>, None]),
            Column::from_values("injury", [true, false]),
        ])
        .unwrap();
        assert_eq!(percentage_variance(&data, "road", &Outcome::new("injury", true)), 0.0);
    }

    #[test]
    fn test_absent_outcome_scores_zero() {
        let data = weather_data();
        assert_eq!(percentage_variance(&data, "weather", &Outcome::new("injury", "maybe")), 0.0);
    }

    #[test]
    fn test_failures_score_zero() {
        let data = weather_data();
        assert_eq!(percentage_variance(&data, "unknown", &Outcome::new("injury", true)), 0.0);
        assert!(try_percentage_variance(&data, "unknown", &Outcome::new("injury", true)).is_err());
    }

    #[test]
    fn test_three_categories() {
        // rates: a = 100, b = 50, c = 0
        let data = Dataset::new(vec![
            Column::from_values("cat", ["a", "a", "b", "b", "c", "c"]),
            Column::from_values("y", [1, 1, 1, 0, 0, 0]),
        ])
        .unwrap();
        let score = percentage_variance(&data, "cat", &Outcome::new("y", 1));
        assert!((score - 40.824829).abs() < 1e-5);
    }
}
