//! Reserved parameter keys and helpers for reading them.

use crate::error::{ParamError, Result};
use crate::order::OrderToken;
use crate::value::{ParamMap, ParamValue};

/// Current page (1-based).
pub const PAGE: &str = "page";
/// Items per page.
pub const ON_PAGE: &str = "onpage";
/// Order token, `"<name>-<DIRECTION>"`.
pub const ORDER: &str = "order";
/// Session key holding the whole filter map.
pub const FILTERS: &str = "filters";
/// Marker sent along with a submitted filter form.
pub const FILTER_SUBMIT: &str = "filter";
/// Placeholder sent by multi-selects with nothing selected.
pub const NONE_SENTINEL: &str = "__none__";

/// Reads a positive integer such as `page` or `onpage`.
pub fn parse_positive(key: &str, value: &ParamValue) -> Result<u32> {
    if !value.is_scalar() {
        return Err(ParamError::NotScalar {
            key: key.to_string(),
            kind: value.kind(),
        });
    }
    value
        .as_int()
        .filter(|v| *v >= 1)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| ParamError::NotPositiveInteger {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Reads an order token. Any scalar is accepted; the token parser itself
/// never fails.
pub fn parse_order(value: &ParamValue) -> Result<OrderToken> {
    if !value.is_scalar() {
        return Err(ParamError::NotScalar {
            key: ORDER.to_string(),
            kind: value.kind(),
        });
    }
    Ok(OrderToken::parse(&value.to_string()))
}

/// Strips the multi-select `"__none__"` placeholder from list and map
/// values.
///
/// A list or map made only of placeholders is removed from `params`
/// altogether; otherwise the placeholders are dropped and the remaining
/// entries keep their order (and keys).
pub fn strip_none_sentinel(params: &mut ParamMap) {
    let is_sentinel = |item: &ParamValue| item.as_str() == Some(NONE_SENTINEL);
    params.retain(|_, value| match value {
        ParamValue::List(items) => {
            items.retain(|item| !is_sentinel(item));
            !items.is_empty()
        }
        ParamValue::Map(entries) => {
            entries.retain(|_, item| !is_sentinel(item));
            !entries.is_empty()
        }
        _ => true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_accepts_numeric_text() {
        assert_eq!(parse_positive(PAGE, &ParamValue::from("3")), Ok(3));
        assert_eq!(parse_positive(PAGE, &ParamValue::Int(7)), Ok(7));
    }

    #[test]
    fn positive_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_positive(PAGE, &ParamValue::from("0")),
            Err(ParamError::NotPositiveInteger { .. })
        ));
        assert!(matches!(
            parse_positive(PAGE, &ParamValue::from("two")),
            Err(ParamError::NotPositiveInteger { .. })
        ));
        assert!(matches!(
            parse_positive(PAGE, &ParamValue::from(vec!["1"])),
            Err(ParamError::NotScalar { kind: "list", .. })
        ));
    }

    #[test]
    fn sentinel_only_lists_are_dropped() {
        let mut params = ParamMap::new();
        params.insert("tags".into(), ParamValue::from(vec![NONE_SENTINEL]));
        params.insert(
            "status".into(),
            ParamValue::from(vec!["new", NONE_SENTINEL, "open"]),
        );
        params.insert("q".into(), ParamValue::from("x"));

        strip_none_sentinel(&mut params);

        assert!(!params.contains_key("tags"));
        assert_eq!(params["status"], ParamValue::from(vec!["new", "open"]));
        assert_eq!(params["q"], ParamValue::from("x"));
    }

    #[test]
    fn sentinel_is_stripped_from_keyed_values() {
        let mut params = ParamMap::new();
        params.insert(
            "roles".into(),
            ParamValue::Map(ParamMap::from([
                ("admin".to_string(), ParamValue::from("1")),
                ("none".to_string(), ParamValue::from(NONE_SENTINEL)),
                ("editor".to_string(), ParamValue::from("2")),
            ])),
        );
        params.insert(
            "groups".into(),
            ParamValue::Map(ParamMap::from([(
                "0".to_string(),
                ParamValue::from(NONE_SENTINEL),
            )])),
        );

        strip_none_sentinel(&mut params);

        assert!(!params.contains_key("groups"));
        let ParamValue::Map(roles) = &params["roles"] else {
            panic!("expected map, got {:?}", params["roles"]);
        };
        assert_eq!(roles.keys().collect::<Vec<_>>(), vec!["admin", "editor"]);
    }
}
