//! Request state: loading from and saving to parameter maps.
//!
//! Inbound parameters are normalized (multi-select placeholders stripped),
//! the persistent `page`/`onpage`/`order` keys are read leniently, and every
//! parameter named like a registered filter expression becomes a stateful
//! filter. Outbound parameters mirror that, optionally canonicalized so that
//! default values never show up in links.

use datalist_model::{OrderToken, ParamMap, ParamValue, params};
use indexmap::IndexSet;

use crate::datalist::Datalist;
use crate::source::Source;

/// Page, page size, order and filter values of one list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    pub page: Option<u32>,
    pub on_page: Option<u32>,
    pub order: Option<OrderToken>,
    pub filters: ParamMap,
    pub stateful_filters: IndexSet<String>,
}

impl<S: Source> Datalist<S> {
    /// Restores state from request parameters.
    ///
    /// Malformed `page`, `onpage` and `order` values are ignored. A filter
    /// that was restored earlier and is now missing (or back at its default)
    /// is cleared.
    pub fn load_state(&mut self, params: &mut ParamMap) {
        for hook in &self.hooks.on_load_state {
            hook(params);
        }

        params::strip_none_sentinel(params);

        if let Some(value) = params.get(params::PAGE) {
            match params::parse_positive(params::PAGE, value) {
                Ok(page) => self.state.page = Some(page),
                Err(error) => tracing::debug!(%error, "Ignoring page parameter"),
            }
        }
        if let Some(value) = params.get(params::ON_PAGE) {
            match params::parse_positive(params::ON_PAGE, value) {
                Ok(on_page) => self.state.on_page = Some(on_page),
                Err(error) => tracing::debug!(%error, "Ignoring onpage parameter"),
            }
        }
        if let Some(value) = params.get(params::ORDER) {
            match params::parse_order(value) {
                Ok(token) => self.state.order = Some(token),
                Err(error) => tracing::debug!(%error, "Ignoring order parameter"),
            }
        }

        for (name, value) in params.iter() {
            if !self.expressions.has_filter(name) {
                continue;
            }
            self.state.filters.insert(name.clone(), value.clone());
            self.state.stateful_filters.insert(name.clone());
        }

        let stale: Vec<String> = self
            .expressions
            .filter_names()
            .filter(|name| self.state.stateful_filters.contains(*name))
            .filter(|name| {
                params
                    .get(*name)
                    .is_none_or(|value| self.expressions.is_default(name, value))
            })
            .map(str::to_string)
            .collect();
        for name in stale {
            tracing::debug!(filter = %name, "Clearing filter absent from request");
            self.state.filters.shift_remove(&name);
            self.state.stateful_filters.shift_remove(&name);
        }

        if params.contains_key(params::FILTER_SUBMIT) {
            self.state.page = None;
        }

        self.invalidate();
    }

    /// Writes state into outbound parameters.
    pub fn save_state(&self, params: &mut ParamMap) {
        if let Some(page) = self.state.page.filter(|page| *page > 0) {
            params.insert(params::PAGE.to_string(), ParamValue::from(page));
        }
        if let Some(on_page) = self.state.on_page {
            params.insert(params::ON_PAGE.to_string(), ParamValue::from(on_page));
        }
        if let Some(token) = &self.state.order {
            params.insert(params::ORDER.to_string(), ParamValue::from(token.to_string()));
        }

        for hook in &self.hooks.on_save_state {
            hook(params);
        }

        if self.config.auto_canonicalize {
            self.canonicalize(params);
        }

        for (name, value) in &self.state.filters {
            if self.state.stateful_filters.contains(name) {
                params.insert(name.clone(), value.clone());
            }
        }
    }

    fn canonicalize(&self, params: &mut ParamMap) {
        if let Some(default_on_page) = self.config.default_on_page {
            let is_default = params
                .get(params::ON_PAGE)
                .and_then(ParamValue::as_int)
                .is_some_and(|on_page| on_page == i64::from(default_on_page));
            if is_default {
                params.shift_remove(params::ON_PAGE);
            }
        }

        if let Some(default) = self.config.default_order_token() {
            let is_default = params
                .get(params::ORDER)
                .is_some_and(|order| order.to_string() == default.to_string());
            if is_default {
                params.shift_remove(params::ORDER);
            }
        }

        let first_page = params
            .get(params::PAGE)
            .and_then(ParamValue::as_int)
            .is_some_and(|page| page == 1);
        if first_page {
            params.shift_remove(params::PAGE);
        }
    }
}
