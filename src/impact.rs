//! Impact
//!
//! Reports how much the initial sample selection reduced the data and the
//! diversity of each explanatory column.
use crate::constants::{DIVERSITY_LOSS_RATIO, LOW_CARDINALITY_LIMIT, REDUCTION_DECIMALS};
use crate::data::Dataset;
use crate::errors::SplitwiseError;
use crate::utils::{percentage, round_to};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilteringReport {
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub original_sample_size: usize,
    pub filtered_sample_size: usize,
    /// Share of rows removed by filtering, in percent, one decimal.
    pub reduction_percentage: f64,
}

/// Compare unique-value counts of the explanatory columns before and after
/// filtering. At most one warning, with its suggestion, is emitted per column.
pub fn analyze_filtering_impact<S: AsRef<str>>(
    original: &Dataset,
    filtered: &Dataset,
    explanatory_columns: &[S],
) -> Result<FilteringReport, SplitwiseError> {
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    for column in explanatory_columns {
        let column = column.as_ref();
        let original_unique = original.n_unique(column)?;
        let filtered_unique = filtered.n_unique(column)?;

        if filtered_unique == 1 {
            warnings.push(format!(
                "Column '{}' has a single unique value in the filtered sample",
                column
            ));
            suggestions.push(format!(
                "Consider widening the selection for '{}' or removing it from the explanatory columns",
                column
            ));
        } else if (filtered_unique as f64) < original_unique as f64 * DIVERSITY_LOSS_RATIO {
            warnings.push(format!("Column '{}' lost more than 50% of its unique values", column));
            suggestions.push(format!("Column '{}' may have a reduced variance", column));
        } else if filtered_unique < LOW_CARDINALITY_LIMIT {
            warnings.push(format!(
                "Column '{}' has fewer than {} unique values in the filtered sample",
                column, LOW_CARDINALITY_LIMIT
            ));
            suggestions.push(format!("Column '{}' may have a low variance", column));
        }
    }

    let removed = original.row_count().saturating_sub(filtered.row_count());
    let reduction_percentage = percentage(removed, original.row_count())
        .map(|p| round_to(p, REDUCTION_DECIMALS))
        .unwrap_or(0.0);

    Ok(FilteringReport {
        warnings,
        suggestions,
        original_sample_size: original.row_count(),
        filtered_sample_size: filtered.row_count(),
        reduction_percentage,
    })
}
