//! Request parameters from the command line.

use anyhow::{Result, bail};
use datalist_core::{ParamMap, ParamValue, params};

/// Parses one `key=value` argument. Only the first `=` separates.
pub fn parse_param(raw: &str) -> Result<(String, ParamValue)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("parameter `{raw}` must have the form key=value");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("parameter `{raw}` has an empty key");
    }
    Ok((key.to_string(), ParamValue::from(value)))
}

/// Collects `key=value` arguments into a parameter map. A key given more
/// than once becomes a list, in argument order.
pub fn collect_params<S: AsRef<str>>(raw: &[S]) -> Result<ParamMap> {
    let mut params = ParamMap::new();
    for arg in raw {
        let (key, value) = parse_param(arg.as_ref())?;
        match params.get_mut(&key) {
            Some(ParamValue::List(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, ParamValue::List(Vec::new()));
                *existing = ParamValue::List(vec![first, value]);
            }
            None => {
                params.insert(key, value);
            }
        }
    }
    Ok(params)
}

/// Adds the dedicated `--page`, `--on-page` and `--order` options; they win
/// over the same keys given with `--param`.
pub fn apply_overrides(
    params: &mut ParamMap,
    page: Option<u32>,
    on_page: Option<u32>,
    order: Option<&str>,
) {
    if let Some(page) = page {
        params.insert(params::PAGE.to_string(), ParamValue::from(page));
    }
    if let Some(on_page) = on_page {
        params.insert(params::ON_PAGE.to_string(), ParamValue::from(on_page));
    }
    if let Some(order) = order {
        params.insert(params::ORDER.to_string(), ParamValue::from(order));
    }
}
