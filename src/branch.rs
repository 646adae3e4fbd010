//! Branch
//!
//! Per-category statistics of the column a node splits on.
use crate::constants::PERCENTAGE_DECIMALS;
use crate::data::{Dataset, Value};
use crate::errors::SplitwiseError;
use crate::histogram::CategoryHistogram;
use crate::label_map::LabelMap;
use crate::outcome::Outcome;
use crate::tree::TreeNode;
use crate::utils::{percentage, round_to};
use serde::{Deserialize, Serialize};

/// One category of the column a node splits on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// The category value, kept typed so subsets are filtered on the value
    /// itself rather than its label.
    pub value: Value,
    /// Rows in the category where the outcome holds.
    pub count: usize,
    /// Rows in the category.
    pub total: usize,
    /// `100 * count / total`, rounded to two decimals.
    pub percentage: f64,
    /// Further splits of the category. `None` when the branch is terminal.
    pub subtree: Option<Box<TreeNode>>,
}

/// Compute one branch per present category of `column`, keyed by the
/// category label and in first-seen order. Subtrees are left unset.
pub fn build_branches(data: &Dataset, column: &str, outcome: &Outcome) -> Result<LabelMap<Branch>, SplitwiseError> {
    let hist = CategoryHistogram::build(data, column, outcome)?;
    let mut branches = LabelMap::with_capacity(hist.bins.len());
    for bin in hist.bins {
        if let Some(pct) = percentage(bin.hits, bin.total) {
            branches.insert(
                bin.value.label(),
                Branch {
                    value: bin.value,
                    count: bin.hits,
                    total: bin.total,
                    percentage: round_to(pct, PERCENTAGE_DECIMALS),
                    subtree: None,
                },
            );
        }
    }
    Ok(branches)
}
