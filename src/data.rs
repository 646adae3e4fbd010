//! Data
//!
//! Typed cell values, named columns and the read-only [`Dataset`] view that
//! tree construction operates on.
use crate::errors::SplitwiseError;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A single non-missing cell. Missing cells are represented as `None`
/// wherever a `Option<Value>` is stored.
///
/// Integers and floats compare numerically, so `Int(1) == Float(1.0)`.
/// Booleans and text only ever equal values of their own kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Map the strings "true" and "false" (any ASCII case) to booleans.
    /// Every other value is returned unchanged.
    pub fn normalized(self) -> Value {
        match self {
            Value::Text(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
            Value::Text(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
            v => v,
        }
    }

    /// Display label used as a key in branch and forest maps.
    pub fn label(&self) -> String {
        self.to_string()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    fn numeric_key(&self) -> Option<u64> {
        let f = match self {
            Value::Int(i) => *i as f64,
            Value::Float(f) => *f,
            _ => return None,
        };
        // -0.0 and 0.0 compare equal, so they must hash equal.
        Some(if f == 0.0 { 0_u64 } else { f.to_bits() })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

// Floats are never NaN once stored in a column, see `Column::new`.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Bool(b) => {
                0_u8.hash(state);
                b.hash(state);
            }
            Value::Int(_) | Value::Float(_) => {
                1_u8.hash(state);
                self.numeric_key().hash(state);
            }
            Value::Text(s) => {
                2_u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Every present value is an integer or a float.
    Numeric,
    /// Anything else, including all-missing columns.
    Categorical,
}

/// A named column of optional values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    values: Vec<Option<Value>>,
}

impl Column {
    /// Create a new column. NaN floats are stored as missing.
    pub fn new(name: impl Into<String>, values: Vec<Option<Value>>) -> Self {
        let values: Vec<Option<Value>> = values
            .into_iter()
            .map(|v| match v {
                Some(Value::Float(f)) if f.is_nan() => None,
                v => v,
            })
            .collect();
        let mut present = values.iter().flatten().peekable();
        let kind = if present.peek().is_some() && present.all(Value::is_numeric) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        };
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Create a column with no missing values.
    pub fn from_values<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Column::new(name, values.into_iter().map(|v| Some(v.into())).collect())
    }

    /// Create a column where `None` marks a missing cell.
    pub fn from_options<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<Value>,
    {
        Column::new(name, values.into_iter().map(|v| v.map(Into::into)).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at an absolute row id, `None` when missing.
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row).and_then(Option::as_ref)
    }
}

/// Read-only view over a set of columns.
///
/// Columns are shared between a dataset and every view filtered from it,
/// filtering only produces a new row index, much like the `index` of a
/// column major matrix.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Arc<Column>>,
    /// Absolute row ids visible in this view, in source order.
    pub index: Vec<usize>,
    n_source_rows: usize,
}

impl Dataset {
    /// Create a dataset from columns of equal length with unique names.
    pub fn new(columns: Vec<Column>) -> Result<Self, SplitwiseError> {
        let n_rows = columns.first().map_or(0, Column::len);
        {
            let mut names = HashSet::with_capacity(columns.len());
            for col in &columns {
                if !names.insert(col.name()) {
                    return Err(SplitwiseError::DuplicateColumn(col.name().to_string()));
                }
                if col.len() != n_rows {
                    return Err(SplitwiseError::ColumnLengthMismatch {
                        column: col.name().to_string(),
                        expected: n_rows,
                        found: col.len(),
                    });
                }
            }
        }
        Ok(Dataset {
            columns: columns.into_iter().map(Arc::new).collect(),
            index: (0..n_rows).collect(),
            n_source_rows: n_rows,
        })
    }

    /// Number of rows in this view.
    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Column names in dataset order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, SplitwiseError> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
            .ok_or_else(|| SplitwiseError::InvalidColumn(name.to_string()))
    }

    /// Row ids and values of a column, for the rows in this view.
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = (usize, Option<&Value>)> + '_, SplitwiseError> {
        let col = self.column(name)?;
        Ok(self.index.iter().map(move |&i| (i, col.get(i))))
    }

    /// Keep the rows of this view for which `predicate` holds on the row id.
    pub fn filter<P>(&self, predicate: P) -> Dataset
    where
        P: Fn(usize) -> bool,
    {
        Dataset {
            columns: self.columns.clone(),
            index: self.index.iter().copied().filter(|&i| predicate(i)).collect(),
            n_source_rows: self.n_source_rows,
        }
    }

    /// Keep the rows where `column` is present and equal to `value`.
    pub fn filter_eq(&self, column: &str, value: &Value) -> Result<Dataset, SplitwiseError> {
        let col = self.column(column)?;
        Ok(self.filter(|i| col.get(i) == Some(value)))
    }

    /// Unique present values of a column, in first-seen order.
    pub fn unique_values(&self, column: &str) -> Result<Vec<Value>, SplitwiseError> {
        let col = self.column(column)?;
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for v in self.index.iter().filter_map(|&i| col.get(i)) {
            if seen.insert(v) {
                unique.push(v.clone());
            }
        }
        Ok(unique)
    }

    /// Number of unique present values of a column.
    pub fn n_unique(&self, column: &str) -> Result<usize, SplitwiseError> {
        let col = self.column(column)?;
        Ok(self.index.iter().filter_map(|&i| col.get(i)).collect::<HashSet<_>>().len())
    }

    /// Add a derived column. It must cover every source row, not only the
    /// rows visible in this view.
    pub fn with_column(&self, column: Column) -> Result<Dataset, SplitwiseError> {
        if self.has_column(column.name()) {
            return Err(SplitwiseError::DuplicateColumn(column.name().to_string()));
        }
        if column.len() != self.n_source_rows {
            return Err(SplitwiseError::ColumnLengthMismatch {
                column: column.name().to_string(),
                expected: self.n_source_rows,
                found: column.len(),
            });
        }
        let mut columns = self.columns.clone();
        columns.push(Arc::new(column));
        Ok(Dataset {
            columns,
            index: self.index.clone(),
            n_source_rows: self.n_source_rows,
        })
    }

    /// Number of rows of the source the view was taken from.
    pub fn source_rows(&self) -> usize {
        self.n_source_rows
    }
}
