//! Splitter
//!
//! Picks the explanatory column to split on next.
use crate::data::Dataset;
use crate::outcome::Outcome;
use crate::variance::percentage_variance;
use serde::{Deserialize, Serialize};

/// A candidate column together with its variance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredColumn {
    pub column: String,
    pub score: f64,
}

/// Score every candidate and return the best one.
///
/// Candidates are scored in the order given. When several share the highest
/// score the first of them wins, so results only depend on the caller's
/// column order. Returns `None` only when there are no candidates.
pub fn select_best_column<S: AsRef<str>>(data: &Dataset, candidates: &[S], outcome: &Outcome) -> Option<ScoredColumn> {
    let mut best: Option<ScoredColumn> = None;
    for candidate in candidates {
        let column = candidate.as_ref();
        let score = percentage_variance(data, column, outcome);
        let better = match &best {
            Some(b) => score > b.score,
            None => true,
        };
        if better {
            best = Some(ScoredColumn {
                column: column.to_string(),
                score,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn data() -> Dataset {
        // `light` has rates {100, 0}, `road` has rates {75, 0}, `day` is constant
        // and `twin` duplicates `light`.
        Dataset::new(vec![
            Column::from_values("day", ["mon", "mon", "mon", "mon", "mon", "mon"]),
            Column::from_values("road", ["wet", "wet", "wet", "wet", "dry", "dry"]),
            Column::from_values("light", ["dark", "dark", "dark", "lit", "lit", "lit"]),
            Column::from_values("twin", ["x", "x", "x", "y", "y", "y"]),
            Column::from_values("injury", [true, true, true, false, false, false]),
        ])
        .unwrap()
    }

    #[test]
    fn test_selects_highest_score() {
        let outcome = Outcome::new("injury", true);
        let best = select_best_column(&data(), &["day", "road", "light"], &outcome).unwrap();
        assert_eq!(best.column, "light");
        assert_eq!(best.score, 50.0);
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let outcome = Outcome::new("injury", true);
        let best = select_best_column(&data(), &["twin", "light"], &outcome).unwrap();
        assert_eq!(best.column, "twin");
        let best = select_best_column(&data(), &["light", "twin"], &outcome).unwrap();
        assert_eq!(best.column, "light");
    }

    #[test]
    fn test_all_zero_selects_first() {
        let outcome = Outcome::new("injury", true);
        let best = select_best_column(&data(), &["day", "missing_column"], &outcome).unwrap();
        assert_eq!(best.column, "day");
        assert_eq!(best.score, 0.0);
    }

    #[test]
    fn test_empty_candidates() {
        let outcome = Outcome::new("injury", true);
        let empty: [&str; 0] = [];
        assert_eq!(select_best_column(&data(), &empty, &outcome), None);
    }
}
