//! Conversion between polars values and parameter values.

use datalist_model::ParamValue;
use polars::prelude::*;

/// Converts a polars `AnyValue` into a [`ParamValue`]. Nulls map to `None`.
pub fn any_to_param(value: AnyValue<'_>) -> Option<ParamValue> {
    let value = match value {
        AnyValue::Null => return None,
        AnyValue::Boolean(b) => ParamValue::Bool(b),
        AnyValue::Int8(v) => ParamValue::Int(i64::from(v)),
        AnyValue::Int16(v) => ParamValue::Int(i64::from(v)),
        AnyValue::Int32(v) => ParamValue::Int(i64::from(v)),
        AnyValue::Int64(v) => ParamValue::Int(v),
        AnyValue::UInt8(v) => ParamValue::Int(i64::from(v)),
        AnyValue::UInt16(v) => ParamValue::Int(i64::from(v)),
        AnyValue::UInt32(v) => ParamValue::Int(i64::from(v)),
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => ParamValue::Int(v),
            Err(_) => ParamValue::Float(v as f64),
        },
        AnyValue::Float32(v) => ParamValue::Float(f64::from(v)),
        AnyValue::Float64(v) => ParamValue::Float(v),
        AnyValue::String(s) => ParamValue::Text(s.to_string()),
        AnyValue::StringOwned(s) => ParamValue::Text(s.to_string()),
        // Dates, durations and nested types keep their display form
        other => {
            let s = other.to_string();
            if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
                ParamValue::Text(s[1..s.len() - 1].to_string())
            } else {
                ParamValue::Text(s)
            }
        }
    };
    Some(value)
}

/// Builds a string-equality predicate for `column`.
///
/// The column is cast to text so that `"3"` from a query string matches an
/// integer column. A list value matches any of its items. Maps have no
/// sensible equality and yield `None`.
pub fn equality_predicate(column: &str, value: &ParamValue) -> Option<Expr> {
    let target = col(column).cast(DataType::String);
    match value {
        ParamValue::Map(_) => None,
        ParamValue::List(items) => items
            .iter()
            .filter(|item| item.is_scalar())
            .map(|item| target.clone().eq(lit(item.to_string())))
            .reduce(Expr::or),
        scalar => Some(target.eq(lit(scalar.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_param_numbers() {
        assert_eq!(any_to_param(AnyValue::Null), None);
        assert_eq!(any_to_param(AnyValue::Int32(42)), Some(ParamValue::Int(42)));
        assert_eq!(any_to_param(AnyValue::Float64(1.5)), Some(ParamValue::Float(1.5)));
        assert_eq!(
            any_to_param(AnyValue::UInt64(u64::MAX)),
            Some(ParamValue::Float(u64::MAX as f64))
        );
    }

    #[test]
    fn test_any_to_param_text() {
        assert_eq!(
            any_to_param(AnyValue::String("hello")),
            Some(ParamValue::from("hello"))
        );
        assert_eq!(any_to_param(AnyValue::Boolean(true)), Some(ParamValue::Bool(true)));
    }

    #[test]
    fn test_map_has_no_predicate() {
        let map = ParamValue::Map(Default::default());
        assert!(equality_predicate("status", &map).is_none());
        assert!(equality_predicate("status", &ParamValue::from("open")).is_some());
        assert!(equality_predicate("status", &ParamValue::List(Vec::new())).is_none());
    }
}
