/// Name of the synthetic outcome column built in combined mode.
pub const COMBINED_TARGET_COLUMN: &str = "_combined_target";
/// Inner label of the single tree built in combined mode.
pub const COMBINED_TREE_LABEL: &str = "Combined";
/// Separator used to join outcome column names into the combined group label.
pub const COMBINED_LABEL_SEPARATOR: &str = " + ";

pub const PERCENTAGE_DECIMALS: i32 = 2;
pub const VARIANCE_DECIMALS: i32 = 4;
pub const REDUCTION_DECIMALS: i32 = 1;

/// Below this share of its original unique values a column is reported as having lost diversity.
pub const DIVERSITY_LOSS_RATIO: f64 = 0.5;
/// Columns with fewer unique values than this after filtering are reported as low cardinality.
pub const LOW_CARDINALITY_LIMIT: usize = 3;
