//! Histogram
//!
//! Per-category outcome counts for one explanatory column, gathered in a
//! single pass over the rows of a dataset view. Both the variance scorer and
//! the branch builder are computed from these bins.
use crate::data::{Dataset, Value};
use crate::errors::SplitwiseError;
use crate::outcome::Outcome;
use crate::utils::percentage;
use hashbrown::HashMap;

/// Counts for one category of an explanatory column.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBin {
    /// The category value.
    pub value: Value,
    /// Rows in the category where the outcome holds.
    pub hits: usize,
    /// Rows in the category.
    pub total: usize,
}

impl CategoryBin {
    /// Outcome rate within the category, in percent.
    pub fn rate(&self) -> Option<f64> {
        percentage(self.hits, self.total)
    }
}

/// Category bins of one column, in first-seen order. Missing cells of the
/// explanatory column are not counted in any bin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryHistogram {
    pub bins: Vec<CategoryBin>,
}

impl CategoryHistogram {
    pub fn build(data: &Dataset, column: &str, outcome: &Outcome) -> Result<Self, SplitwiseError> {
        let col = data.column(column)?;
        let target = data.column(&outcome.column)?;

        let mut positions: HashMap<&Value, usize> = HashMap::new();
        let mut bins: Vec<CategoryBin> = Vec::new();
        for &i in data.index.iter() {
            let Some(v) = col.get(i) else {
                continue;
            };
            let pos = *positions.entry(v).or_insert_with(|| {
                bins.push(CategoryBin {
                    value: v.clone(),
                    hits: 0,
                    total: 0,
                });
                bins.len() - 1
            });
            let bin = &mut bins[pos];
            bin.total += 1;
            if outcome.holds(target.get(i)) {
                bin.hits += 1;
            }
        }
        Ok(CategoryHistogram { bins })
    }

    /// Total number of rows where the outcome holds, over all bins.
    pub fn hits(&self) -> usize {
        self.bins.iter().map(|b| b.hits).sum()
    }

    /// Outcome rates of the non-empty bins, in percent.
    pub fn rates(&self) -> Vec<f64> {
        self.bins.iter().filter_map(CategoryBin::rate).collect()
    }
}
