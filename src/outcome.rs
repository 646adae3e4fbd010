use crate::data::Value;
use serde::{Deserialize, Serialize};

/// The `(target_column, target_value)` pair a tree explains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub column: String,
    pub value: Value,
}

impl Outcome {
    /// Create an outcome. The target value goes through boolean
    /// normalization so that "true"/"false" strings match boolean cells.
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Outcome {
            column: column.into(),
            value: value.into().normalized(),
        }
    }

    /// Whether a cell of the target column satisfies this outcome.
    /// Missing cells never do.
    #[inline]
    pub fn holds(&self, cell: Option<&Value>) -> bool {
        cell == Some(&self.value)
    }
}
