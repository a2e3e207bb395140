//! Date conversion of text columns.
//!
//! Most callers should use [`convert_to_datetime`] (from [`unified`]) which:
//!
//! - converts the selected `Utf8` / categorical columns of a [`crate::types::DataSet`] to
//!   [`crate::types::DataType::DateTime`]
//! - parses cells according to a [`ParseMode`]
//! - optionally reports success/failure/alerts to a [`ConversionObserver`]
//!
//! Building blocks are also available under:
//! - [`parse`]: parse modes and the memoizing cell parser
//! - [`category`]: categorical normalization
//! - [`report`]: the post-conversion null scan

pub mod category;
pub mod observability;
pub mod parse;
pub mod report;
pub mod unified;

pub use observability::{
    CompositeObserver, ConversionContext, ConversionObserver, ConversionSeverity, ConversionStats, FileObserver,
    StdErrObserver,
};
pub use parse::{DateTimeParser, ParseMode, ParseModeSettings};
pub use report::ErrorReport;
pub use unified::{convert_to_datetime, ConversionOptions, ConversionParams};
