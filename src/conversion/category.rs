//! Categorical column handling.

use std::borrow::Cow;
use std::sync::Arc;

use crate::types::{DataType, Field, Value};

/// Return a categorical column with an explicit `""` category standing in for every null.
///
/// The input category set is never modified: when `""` is missing a new set is built, so other
/// fields sharing the old set keep seeing it unchanged. Non-categorical fields are returned
/// as-is.
pub fn normalize_categories(field: &Field, values: Vec<Value>) -> (Field, Vec<Value>) {
    let DataType::Categorical(categories) = &field.data_type else {
        return (field.clone(), values);
    };

    let categories = if categories.iter().any(|c| c.is_empty()) {
        Arc::clone(categories)
    } else {
        categories
            .iter()
            .cloned()
            .chain(std::iter::once(String::new()))
            .collect()
    };

    let values = values
        .into_iter()
        .map(|v| match v {
            Value::Null => Value::Utf8(String::new()),
            other => other,
        })
        .collect();

    (
        Field::new(field.name.clone(), DataType::Categorical(categories)),
        values,
    )
}

/// Text representation of a cell, as a categorical column materializes it.
pub fn materialize_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::Utf8(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Int64(v) => Some(Cow::Owned(v.to_string())),
        Value::Float64(v) => Some(Cow::Owned(v.to_string())),
        Value::Bool(v) => Some(Cow::Owned(v.to_string())),
        Value::DateTime(v) => Some(Cow::Owned(v.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_empty_category_and_fills_nulls() {
        let field = Field::new("cat", DataType::categorical(["a", "b"]));
        let (out_field, out) =
            normalize_categories(&field, vec![Value::Utf8("a".to_string()), Value::Null]);

        assert_eq!(out_field.data_type, DataType::categorical(["a", "b", ""]));
        assert_eq!(out, vec![Value::Utf8("a".to_string()), Value::Utf8(String::new())]);
    }

    #[test]
    fn shared_category_set_is_left_alone() {
        let field = Field::new("cat", DataType::categorical(["a"]));
        let sibling = field.clone();

        let _ = normalize_categories(&field, vec![Value::Null]);

        assert_eq!(sibling.data_type, DataType::categorical(["a"]));
        assert_eq!(field.data_type, DataType::categorical(["a"]));
    }

    #[test]
    fn existing_empty_category_is_reused() {
        let field = Field::new("cat", DataType::categorical(["", "a"]));
        let (out_field, _) = normalize_categories(&field, vec![Value::Null]);
        match (&field.data_type, &out_field.data_type) {
            (DataType::Categorical(before), DataType::Categorical(after)) => {
                assert!(Arc::ptr_eq(before, after));
            }
            other => panic!("unexpected types: {other:?}"),
        }
    }

    #[test]
    fn non_categorical_is_untouched() {
        let field = Field::new("s", DataType::Utf8);
        let (out_field, out) = normalize_categories(&field, vec![Value::Null]);
        assert_eq!(out_field, field);
        assert_eq!(out, vec![Value::Null]);
    }

    #[test]
    fn materialize_text_of_cells() {
        assert_eq!(materialize_text(&Value::Null), None);
        assert_eq!(materialize_text(&Value::Utf8("x".to_string())).as_deref(), Some("x"));
        assert_eq!(materialize_text(&Value::Int64(99)).as_deref(), Some("99"));
    }
}
