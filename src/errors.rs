//! Errors
//!
//! Custom error types used throughout the `splitwise` crate.
use thiserror::Error;

/// Errors that can occur while building decision trees.
#[derive(Debug, Error, PartialEq)]
pub enum SplitwiseError {
    /// A requested column does not exist in the dataset.
    #[error("Column '{0}' does not exist in the dataset.")]
    InvalidColumn(String),
    /// Two columns share the same name.
    #[error("Column '{0}' is defined more than once.")]
    DuplicateColumn(String),
    /// A column does not have the same number of rows as the others.
    #[error("Column '{column}' has {found} rows, expected {expected}.")]
    ColumnLengthMismatch {
        /// Name of the offending column.
        column: String,
        /// Row count of the dataset.
        expected: usize,
        /// Row count of the offending column.
        found: usize,
    },
    /// Recursion went deeper than the number of explanatory columns allows.
    #[error("Tree construction exceeded the maximum depth of {0}.")]
    MaxDepthExceeded(usize),
    /// Unable to write a result or configuration.
    #[error("Unable to write to file: {0}")]
    UnableToWrite(String),
    /// Unable to read a result or configuration.
    #[error("Unable to read from a file {0}")]
    UnableToRead(String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
}
