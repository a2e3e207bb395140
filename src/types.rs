//! Core data model types for date conversion.
//!
//! Conversion operates on an in-memory [`DataSet`] described by a [`Schema`] (a list of typed
//! [`Field`]s). The field's [`DataType`] is the storage kind the converter dispatches on.

use std::sync::Arc;

use chrono::NaiveDateTime;

/// Category set of a [`DataType::Categorical`] field.
///
/// Shared and immutable: several fields may point at the same set, so anything that needs a
/// different set builds a new one.
pub type Categories = Arc<[String]>;

/// Logical data type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// UTF-8 string restricted to a fixed set of categories.
    Categorical(Categories),
    /// Calendar date and time of day, without timezone.
    DateTime,
}

impl DataType {
    /// Build a categorical type from its categories.
    pub fn categorical<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cats: Vec<String> = categories.into_iter().map(Into::into).collect();
        Self::Categorical(Arc::from(cats))
    }

    /// `true` for [`DataType::Int64`] and [`DataType::Float64`].
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string (also used for categorical cells).
    Utf8(String),
    /// Date and time of day.
    DateTime(NaiveDateTime),
}

impl Value {
    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `true` for [`Value::Int64`] and [`Value::Float64`].
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64(_) | Self::Float64(_))
    }

    /// Borrow the text of a [`Value::Utf8`] cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate the cells of column `idx`, top to bottom.
    ///
    /// Short rows yield [`Value::Null`] for the missing cell; see [`DataSet::first_ragged_row`]
    /// for rejecting them up front.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        const NULL: &Value = &Value::Null;
        self.rows.iter().map(move |row| row.get(idx).unwrap_or(NULL))
    }

    /// First row whose cell count differs from the schema, as `(row index, cell count)`.
    pub fn first_ragged_row(&self) -> Option<(usize, usize)> {
        let expected = self.schema.fields.len();
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
            .map(|(idx, row)| (idx, row.len()))
    }

    /// Clone the cells of column `idx` into a vector.
    pub fn column_values(&self, idx: usize) -> Vec<Value> {
        self.column(idx).cloned().collect()
    }

    /// Replace field `idx` and every cell of that column.
    ///
    /// Row count and column count are unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range for the schema or any row, or if `values` has a different
    /// length than the row count.
    pub fn replace_column(&mut self, idx: usize, field: Field, values: Vec<Value>) {
        assert!(
            values.len() == self.rows.len(),
            "replacement column length {} does not match row count {}",
            values.len(),
            self.rows.len()
        );
        self.schema.fields[idx] = field;
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
    }
}
