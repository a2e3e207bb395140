//! Null scan over converted columns.

use crate::error::ConversionError;
use crate::types::DataSet;

/// Rows left null after conversion, per selected column.
///
/// Columns keep selection order; rows are 0-based and ascending. A null that was already
/// present before conversion is indistinguishable from a failed parse and is counted too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    columns: Vec<(String, Vec<usize>)>,
}

impl ErrorReport {
    /// Scan the columns at `indices` of `dataset`.
    pub fn scan(dataset: &DataSet, indices: &[usize]) -> Self {
        let columns = indices
            .iter()
            .map(|&idx| {
                let rows = dataset
                    .column(idx)
                    .enumerate()
                    .filter(|(_, v)| v.is_null())
                    .map(|(row, _)| row)
                    .collect();
                (dataset.schema.fields[idx].name.clone(), rows)
            })
            .collect();
        Self { columns }
    }

    /// Null rows of `column`, if it was scanned.
    pub fn rows_for(&self, column: &str) -> Option<&[usize]> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, rows)| rows.as_slice())
    }

    /// Null cells across all scanned columns.
    pub fn total(&self) -> usize {
        self.columns.iter().map(|(_, rows)| rows.len()).sum()
    }

    /// Scanned columns holding at least one null.
    pub fn columns_with_errors(&self) -> usize {
        self.columns.iter().filter(|(_, rows)| !rows.is_empty()).count()
    }

    /// First scanned column with a null, and its first null row (0-based).
    pub fn first(&self) -> Option<(&str, usize)> {
        self.columns
            .iter()
            .find_map(|(name, rows)| rows.first().map(|&row| (name.as_str(), row)))
    }

    /// The user-facing format error, or `None` when nothing is null.
    pub fn to_error(&self) -> Option<ConversionError> {
        let (column, row) = self.first()?;
        Some(ConversionError::Format {
            row: row + 1,
            column: column.to_owned(),
            total: self.total(),
            columns: self.columns_with_errors(),
        })
    }
}
