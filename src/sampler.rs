//! Sampler
//!
//! Restricts the dataset to the sample the analyst selected before any tree
//! is grown.
use crate::data::{Dataset, Value};
use crate::errors::SplitwiseError;
use crate::label_map::LabelMap;
use hashbrown::HashSet;

/// Selected values per column.
pub type Selections = LabelMap<Vec<Value>>;

/// Normalize selected values into a set usable for membership tests.
pub fn value_set(values: &[Value]) -> HashSet<Value> {
    values.iter().cloned().map(Value::normalized).collect()
}

// A sampler subsets the data prior to growing trees.
pub trait Sampler {
    /// Return the view of `data` that trees are grown on.
    fn sample(&self, data: &Dataset) -> Result<Dataset, SplitwiseError>;
}

/// Keeps the rows whose value, in every constrained column, is one of the
/// selected values. Columns without a selection are unconstrained.
#[derive(Debug, Clone, Default)]
pub struct SelectionSampler {
    constraints: Vec<(String, HashSet<Value>)>,
}

impl SelectionSampler {
    /// Build the sampler from `selections`, considering only the columns in
    /// `eligible` that have a non-empty selection.
    pub fn new<S: AsRef<str>>(selections: &Selections, eligible: &[S]) -> Self {
        let constraints = selections
            .iter()
            .filter(|(col, values)| !values.is_empty() && eligible.iter().any(|e| e.as_ref() == *col))
            .map(|(col, values)| (col.to_string(), value_set(values)))
            .collect();
        SelectionSampler { constraints }
    }

    /// Names of the constrained columns.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.constraints.iter().map(|(c, _)| c.as_str())
    }
}

impl Sampler for SelectionSampler {
    fn sample(&self, data: &Dataset) -> Result<Dataset, SplitwiseError> {
        let mut sampled = data.clone();
        for (column, allowed) in &self.constraints {
            let col = data.column(column)?;
            sampled = sampled.filter(|i| col.get(i).is_some_and(|v| allowed.contains(v)));
        }
        Ok(sampled)
    }
}
