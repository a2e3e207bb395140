//! `datetime-columns` converts text columns of an in-memory [`types::DataSet`] into date/time
//! values.
//!
//! The primary entrypoint is [`conversion::convert_to_datetime`], driven by
//! [`conversion::ConversionOptions`]: which columns to convert, how to read the dates
//! ([`conversion::ParseMode`]) and whether unparseable cells may silently become null.
//!
//! ## Parse modes
//!
//! - [`conversion::ParseMode::Auto`]: per-value inference over a fixed, ordered list of layouts
//!   (year-first, then `MM/DD/YYYY`, then `DD/MM/YYYY`, then written month names). See
//!   [`conversion::parse::AUTO_DATE_FORMATS`].
//! - [`conversion::ParseMode::Us`]: `MM/DD/YYYY`, found anywhere in the cell.
//! - [`conversion::ParseMode::Eu`]: `DD/MM/YYYY`, found anywhere in the cell.
//!
//! ## Column kinds
//!
//! - [`types::DataType::Utf8`] columns are parsed cell by cell.
//! - [`types::DataType::Categorical`] columns first get an explicit `""` category standing in
//!   for nulls, then their text is parsed.
//! - [`types::DataType::Int64`] / [`types::DataType::Float64`] columns (or text columns holding
//!   numbers) are rejected with `Cannot convert numerical columns.`
//! - [`types::DataType::DateTime`] columns are left as they are.
//!
//! ## Quick example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use datetime_columns::conversion::{convert_to_datetime, ConversionOptions, ParseMode};
//! use datetime_columns::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("id", DataType::Int64),
//!     Field::new("shipped", DataType::Utf8),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Int64(1), Value::Utf8("08/07/2018".to_string())],
//!         vec![Value::Int64(2), Value::Utf8(" 08/07/2018T00:00:00 ".to_string())],
//!     ],
//! );
//!
//! let out = convert_to_datetime(ds, &ConversionOptions::new("shipped", ParseMode::Us)).unwrap();
//!
//! let expected = NaiveDate::from_ymd_opt(2018, 8, 7).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! assert_eq!(out.rows[0][1], Value::DateTime(expected));
//! assert_eq!(out.rows[1][1], Value::DateTime(expected));
//! assert_eq!(out.rows[1][0], Value::Int64(2));
//! ```
//!
//! ## Modules
//!
//! - [`conversion`]: the converter, parse modes, observers
//! - [`types`]: schema + in-memory dataset types
//! - [`error`]: error type returned by conversion

pub mod conversion;
pub mod error;
pub mod types;

pub use conversion::{convert_to_datetime, ConversionOptions, ParseMode};
pub use error::{ConversionError, ConversionResult};
