use thiserror::Error;

/// Convenience result type for conversion operations.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Error type returned by date conversion.
///
/// The `Display` output of [`ConversionError::NumericColumns`] and [`ConversionError::Format`] is
/// the exact text shown to end users.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// A selected column holds numbers.
    #[error("Cannot convert numerical columns.")]
    NumericColumns,

    /// Cells failed to parse and nulls were not allowed.
    ///
    /// `row` is 1-based; `column` is the first selected column with a failure.
    #[error(
        "Format error in row {row} of '{column}'. Overall, there are {total} errors in {columns} columns. \
         Select 'non-dates to null' to set these cells to null"
    )]
    Format {
        row: usize,
        column: String,
        total: usize,
        columns: usize,
    },

    /// A selected column is not part of the schema.
    #[error("unknown column '{name}'")]
    UnknownColumn { name: String },

    /// A row does not have one cell per schema field. `row` is 1-based.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Host-supplied parameters could not be decoded.
    #[error("invalid conversion parameters: {message}")]
    InvalidParams { message: String },
}

impl From<serde_json::Error> for ConversionError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidParams {
            message: e.to_string(),
        }
    }
}
