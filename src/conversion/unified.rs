//! Column-to-datetime conversion entrypoint.
//!
//! Most callers should use [`convert_to_datetime`], which converts the columns named in
//! [`ConversionOptions::colnames`] of a [`crate::types::DataSet`] to [`DataType::DateTime`].
//!
//! - Parsing follows [`ConversionOptions::parse_mode`].
//! - Unparseable cells become null; unless [`ConversionOptions::null_on_error`] is set, any null
//!   left in the converted columns fails the whole call with [`ConversionError::Format`].
//! - If a [`super::observability::ConversionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{ConversionError, ConversionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::category::{materialize_text, normalize_categories};
use super::observability::{ConversionContext, ConversionObserver, ConversionSeverity, ConversionStats};
use super::parse::{DateTimeParser, ParseMode};
use super::report::ErrorReport;

/// Options controlling conversion.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ConversionOptions {
    /// Comma-separated column names. Empty means "convert nothing".
    pub colnames: String,
    /// How cell text is read as a date.
    pub parse_mode: ParseMode,
    /// Leave unparseable cells null instead of failing.
    pub null_on_error: bool,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ConversionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ConversionSeverity,
}

impl fmt::Debug for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOptions")
            .field("colnames", &self.colnames)
            .field("parse_mode", &self.parse_mode)
            .field("null_on_error", &self.null_on_error)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            colnames: String::new(),
            parse_mode: ParseMode::default(),
            null_on_error: false,
            observer: None,
            alert_at_or_above: ConversionSeverity::Critical,
        }
    }
}

impl ConversionOptions {
    /// Options converting `colnames` under `parse_mode`.
    pub fn new(colnames: impl Into<String>, parse_mode: ParseMode) -> Self {
        Self {
            colnames: colnames.into(),
            parse_mode,
            ..Default::default()
        }
    }

    /// Column names in request order, trimmed. Duplicates are kept.
    pub fn column_names(&self) -> Vec<String> {
        if self.colnames.trim().is_empty() {
            return Vec::new();
        }
        self.colnames
            .split(',')
            .map(|name| name.trim().to_owned())
            .collect()
    }
}

/// Parameters as a host UI sends them.
///
/// `type_date` is the position in the date-type menu (see [`ParseMode::ALL`]) and `type_null`
/// is the "non-dates to null" checkbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConversionParams {
    /// Comma-separated column names.
    pub colnames: String,
    /// Index into [`ParseMode::ALL`].
    pub type_date: usize,
    /// Leave unparseable cells null instead of failing.
    pub type_null: bool,
}

impl ConversionParams {
    /// Decode parameters from a JSON object.
    pub fn from_json(json: &str) -> ConversionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Turn host parameters into [`ConversionOptions`], rejecting an unknown menu index.
    pub fn into_options(self) -> ConversionResult<ConversionOptions> {
        let parse_mode = ParseMode::from_menu_index(self.type_date).ok_or_else(|| {
            ConversionError::InvalidParams {
                message: format!("date type index {} out of range", self.type_date),
            }
        })?;
        Ok(ConversionOptions {
            colnames: self.colnames,
            parse_mode,
            null_on_error: self.type_null,
            ..Default::default()
        })
    }
}

/// Convert the selected columns of `dataset` to [`DataType::DateTime`].
///
/// The steps, in order:
///
/// - An empty selection returns `dataset` untouched.
/// - Every selected name must exist ([`ConversionError::UnknownColumn`]) and every row must have
///   one cell per field ([`ConversionError::RaggedRow`]).
/// - No selected non-categorical column may hold numbers ([`ConversionError::NumericColumns`]).
/// - Each column is converted in selection order. Categorical columns get an explicit `""`
///   category for their nulls first; columns that are already `DateTime` pass through.
/// - Without `null_on_error`, any null in a converted column yields [`ConversionError::Format`]
///   naming the first one.
///
/// Errors are returned before any converted data escapes, so a failed call never hands back a
/// partially converted dataset.
///
/// # Examples
///
/// ```rust
/// use datetime_columns::conversion::{convert_to_datetime, ConversionOptions, ParseMode};
/// use datetime_columns::types::{DataSet, DataType, Field, Schema, Value};
///
/// let ds = DataSet::new(
///     Schema::new(vec![Field::new("when", DataType::Utf8)]),
///     vec![
///         vec![Value::Utf8("07/08/2018".to_string())],
///         vec![Value::Utf8("not a date".to_string())],
///     ],
/// );
///
/// let err = convert_to_datetime(ds.clone(), &ConversionOptions::new("when", ParseMode::Eu))
///     .unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Format error in row 2 of 'when'. Overall, there are 1 errors in 1 columns. \
///      Select 'non-dates to null' to set these cells to null"
/// );
///
/// let opts = ConversionOptions {
///     null_on_error: true,
///     ..ConversionOptions::new("when", ParseMode::Eu)
/// };
/// let out = convert_to_datetime(ds, &opts).unwrap();
/// assert_eq!(out.schema.fields[0].data_type, DataType::DateTime);
/// assert_eq!(out.rows[1][0], Value::Null);
/// ```
///
/// ## Observability (stderr logging + alert threshold)
///
/// ```rust
/// use std::sync::Arc;
///
/// use datetime_columns::conversion::{
///     convert_to_datetime, ConversionOptions, ConversionSeverity, StdErrObserver,
/// };
/// use datetime_columns::types::{DataSet, DataType, Field, Schema, Value};
///
/// let ds = DataSet::new(
///     Schema::new(vec![Field::new("n", DataType::Int64)]),
///     vec![vec![Value::Int64(99)]],
/// );
/// let opts = ConversionOptions {
///     colnames: "n".to_string(),
///     observer: Some(Arc::new(StdErrObserver::default())),
///     alert_at_or_above: ConversionSeverity::Error,
///     ..Default::default()
/// };
///
/// // Numeric columns are an Error and trigger `on_alert` at this threshold.
/// let err = convert_to_datetime(ds, &opts).unwrap_err();
/// assert_eq!(err.to_string(), "Cannot convert numerical columns.");
/// ```
pub fn convert_to_datetime(dataset: DataSet, options: &ConversionOptions) -> ConversionResult<DataSet> {
    let columns = options.column_names();
    if columns.is_empty() {
        return Ok(dataset);
    }

    let result = convert_columns(dataset, &columns, options);

    if let Some(obs) = options.observer.as_ref() {
        let ctx = ConversionContext {
            columns,
            parse_mode: options.parse_mode,
        };
        match &result {
            Ok((_, stats)) => obs.on_success(&ctx, *stats),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result.map(|(ds, _)| ds)
}

fn convert_columns(
    mut dataset: DataSet,
    columns: &[String],
    options: &ConversionOptions,
) -> ConversionResult<(DataSet, ConversionStats)> {
    let indices = resolve_columns(&dataset.schema, columns)?;
    if let Some((row, found)) = dataset.first_ragged_row() {
        return Err(ConversionError::RaggedRow {
            row: row + 1,
            expected: dataset.schema.fields.len(),
            found,
        });
    }

    if indices.iter().any(|&idx| holds_numbers(&dataset, idx)) {
        return Err(ConversionError::NumericColumns);
    }

    let mut parser = DateTimeParser::new(options.parse_mode);
    for &idx in &indices {
        let field = &dataset.schema.fields[idx];
        let convert = strategy_for(&field.data_type);
        let values = convert(field, dataset.column_values(idx), &mut parser);
        let field = Field::new(field.name.clone(), DataType::DateTime);
        dataset.replace_column(idx, field, values);
    }

    let report = ErrorReport::scan(&dataset, &indices);
    if !options.null_on_error {
        if let Some(err) = report.to_error() {
            return Err(err);
        }
    }

    let stats = ConversionStats {
        rows: dataset.row_count(),
        columns: indices.len(),
        nulls: report.total(),
    };
    Ok((dataset, stats))
}

/// Schema indices of `columns`, first occurrence order, without repeats.
fn resolve_columns(schema: &Schema, columns: &[String]) -> ConversionResult<Vec<usize>> {
    let mut indices: Vec<usize> = Vec::with_capacity(columns.len());
    for name in columns {
        let idx = schema
            .index_of(name)
            .ok_or_else(|| ConversionError::UnknownColumn { name: name.clone() })?;
        if !indices.contains(&idx) {
            indices.push(idx);
        }
    }
    Ok(indices)
}

/// Categorical columns are exempt: their cells are read as text whatever they look like.
fn holds_numbers(dataset: &DataSet, idx: usize) -> bool {
    match &dataset.schema.fields[idx].data_type {
        DataType::Categorical(_) => false,
        dt if dt.is_numeric() => true,
        _ => dataset.column(idx).any(Value::is_numeric),
    }
}

type ColumnStrategy = fn(&Field, Vec<Value>, &mut DateTimeParser) -> Vec<Value>;

fn strategy_for(data_type: &DataType) -> ColumnStrategy {
    match data_type {
        DataType::Categorical(_) => convert_categorical,
        DataType::DateTime => keep_datetimes,
        DataType::Utf8 | DataType::Bool | DataType::Int64 | DataType::Float64 => convert_text,
    }
}

fn convert_text(_field: &Field, values: Vec<Value>, parser: &mut DateTimeParser) -> Vec<Value> {
    values
        .iter()
        .map(|v| match v {
            Value::Utf8(s) => to_value(parser.parse(s)),
            _ => Value::Null,
        })
        .collect()
}

fn convert_categorical(field: &Field, values: Vec<Value>, parser: &mut DateTimeParser) -> Vec<Value> {
    let (_, values) = normalize_categories(field, values);
    values
        .iter()
        .map(|v| match materialize_text(v) {
            Some(text) => to_value(parser.parse(&text)),
            None => Value::Null,
        })
        .collect()
}

fn keep_datetimes(_field: &Field, values: Vec<Value>, _parser: &mut DateTimeParser) -> Vec<Value> {
    values
        .into_iter()
        .map(|v| match v {
            Value::DateTime(_) => v,
            _ => Value::Null,
        })
        .collect()
}

fn to_value(parsed: Option<chrono::NaiveDateTime>) -> Value {
    parsed.map(Value::DateTime).unwrap_or(Value::Null)
}

fn severity_for_error(e: &ConversionError) -> ConversionSeverity {
    match e {
        ConversionError::Format { .. } => ConversionSeverity::Warning,
        ConversionError::NumericColumns => ConversionSeverity::Error,
        ConversionError::UnknownColumn { .. }
        | ConversionError::RaggedRow { .. }
        | ConversionError::InvalidParams { .. } => {
            ConversionSeverity::Critical
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_are_trimmed_and_keep_duplicates() {
        let opts = ConversionOptions::new(" a , b,a ", ParseMode::Auto);
        assert_eq!(opts.column_names(), vec!["a", "b", "a"]);
        assert!(ConversionOptions::new("  ", ParseMode::Auto).column_names().is_empty());
    }

    #[test]
    fn resolve_columns_dedupes_and_rejects_unknown() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Utf8),
            Field::new("b", DataType::Utf8),
        ]);
        let names = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(resolve_columns(&schema, &names(&["b", "a", "b"])).unwrap(), vec![1, 0]);
        assert_eq!(
            resolve_columns(&schema, &names(&["a", "zzz"])).unwrap_err(),
            ConversionError::UnknownColumn {
                name: "zzz".to_string()
            }
        );
    }

    #[test]
    fn dispatch_table_covers_every_kind() {
        let mut parser = DateTimeParser::new(ParseMode::Auto);
        let text = Field::new("t", DataType::Utf8);
        let input = vec![Value::Utf8("2018-08-07".to_string()), Value::Bool(true), Value::Null];

        let out = strategy_for(&text.data_type)(&text, input, &mut parser);
        assert!(matches!(out[0], Value::DateTime(_)));
        assert_eq!(out[1], Value::Null);
        assert_eq!(out[2], Value::Null);

        let dates = Field::new("d", DataType::DateTime);
        let already = vec![out[0].clone(), Value::Null];
        assert_eq!(strategy_for(&dates.data_type)(&dates, already.clone(), &mut parser), already);
    }

    #[test]
    fn severities() {
        assert_eq!(
            severity_for_error(&ConversionError::NumericColumns),
            ConversionSeverity::Error
        );
        assert_eq!(
            severity_for_error(&ConversionError::UnknownColumn { name: "x".into() }),
            ConversionSeverity::Critical
        );
        assert_eq!(
            severity_for_error(&ConversionError::RaggedRow {
                row: 2,
                expected: 2,
                found: 1
            }),
            ConversionSeverity::Critical
        );
    }

    #[test]
    fn params_map_menu_index_to_mode() {
        let params = ConversionParams::from_json(r#"{"colnames":"a,b","type_date":1,"type_null":true}"#)
            .unwrap();
        let opts = params.into_options().unwrap();
        assert_eq!(opts.colnames, "a,b");
        assert_eq!(opts.parse_mode, ParseMode::Us);
        assert!(opts.null_on_error);

        let bad = ConversionParams {
            type_date: 7,
            ..Default::default()
        };
        assert!(matches!(bad.into_options(), Err(ConversionError::InvalidParams { .. })));
        assert!(matches!(
            ConversionParams::from_json("{not json"),
            Err(ConversionError::InvalidParams { .. })
        ));
    }

    #[test]
    fn params_default_missing_fields() {
        let opts = ConversionParams::from_json("{}").unwrap().into_options().unwrap();
        assert!(opts.colnames.is_empty());
        assert_eq!(opts.parse_mode, ParseMode::Auto);
        assert!(!opts.null_on_error);
    }
}
