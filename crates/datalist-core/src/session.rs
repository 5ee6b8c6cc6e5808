//! Session persistence of list state.
//!
//! A list keeps its page, page size, order and filters in a session section
//! so that a visitor returning without parameters sees the list as they left
//! it. The host decides where sections live; [`SessionStore`] is a simple
//! serializable store keyed by component path.

use datalist_model::{OrderToken, ParamMap, ParamValue, params};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::datalist::Datalist;
use crate::source::Source;

/// One named section of a session.
pub trait SessionSection {
    fn get(&self, key: &str) -> Option<&ParamValue>;
    fn set(&mut self, key: &str, value: ParamValue);
    fn remove(&mut self, key: &str);
}

/// In-memory session section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemorySession {
    values: ParamMap,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &ParamMap {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SessionSection for MemorySession {
    fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: ParamValue) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.shift_remove(key);
    }
}

/// Session sections keyed by component path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionStore {
    sections: IndexMap<String, MemorySession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The section for `path`, created empty on first access.
    pub fn section(&mut self, path: &str) -> &mut MemorySession {
        self.sections.entry(path.to_string()).or_default()
    }

    pub fn get(&self, path: &str) -> Option<&MemorySession> {
        self.sections.get(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<MemorySession> {
        self.sections.shift_remove(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

const PERSISTENT_KEYS: [&str; 3] = [params::PAGE, params::ON_PAGE, params::ORDER];

impl<S: Source> Datalist<S> {
    /// Restores state from a session section.
    ///
    /// `page`, `onpage` and `order` are taken from the section when the
    /// request does not carry them, and are removed from `params` either way.
    /// Session filters are adopted only when the request holds no filter.
    pub fn load_session(&mut self, params: &mut ParamMap, section: &impl SessionSection) {
        for key in PERSISTENT_KEYS {
            if !params.contains_key(key) {
                if let Some(value) = section.get(key) {
                    self.restore_persistent(key, value);
                }
            }
            params.shift_remove(key);
        }

        let request_has_filters = params.contains_key(params::FILTER_SUBMIT)
            || self
                .expressions
                .filter_names()
                .any(|name| params.contains_key(name));

        if !request_has_filters {
            if let Some(ParamValue::Map(filters)) = section.get(params::FILTERS) {
                tracing::debug!(filters = filters.len(), "Restored filters from session");
                self.state.filters = filters.clone();
            }
        }
        self.invalidate();
    }

    fn restore_persistent(&mut self, key: &str, value: &ParamValue) {
        match key {
            params::PAGE => match params::parse_positive(key, value) {
                Ok(page) => self.state.page = Some(page),
                Err(error) => tracing::debug!(%error, "Ignoring session page"),
            },
            params::ON_PAGE => match params::parse_positive(key, value) {
                Ok(on_page) => self.state.on_page = Some(on_page),
                Err(error) => tracing::debug!(%error, "Ignoring session page size"),
            },
            _ => self.state.order = Some(OrderToken::parse(&value.to_string())),
        }
    }

    /// Persists state into a session section.
    ///
    /// `page`, `onpage` and `order` are stored when present in `params` (the
    /// order in canonical form from the list) and deleted otherwise. The full
    /// filter map is always stored.
    pub fn save_session(&self, params: &ParamMap, section: &mut impl SessionSection) {
        for key in PERSISTENT_KEYS {
            match params.get(key) {
                Some(_) if key == params::ORDER => match self.order_parameter() {
                    Some(order) => section.set(key, ParamValue::from(order)),
                    None => section.remove(key),
                },
                Some(value) => section.set(key, value.clone()),
                None => section.remove(key),
            }
        }
        section.set(params::FILTERS, ParamValue::Map(self.state.filters.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListConfig;
    use crate::memory::MemorySource;
    use datalist_model::Direction;

    fn list() -> Datalist<MemorySource<ParamMap>> {
        let mut list = Datalist::new(MemorySource::new(Vec::new()), ListConfig::default());
        list.add_filter_expression("status", |_, _| {}, None);
        list
    }

    #[test]
    fn restores_absent_keys_and_strips_params() {
        let mut section = MemorySession::new();
        section.set("page", ParamValue::Int(3));
        section.set("order", ParamValue::from("name-DESC"));

        let mut list = list();
        let mut params = ParamMap::new();
        list.load_session(&mut params, &section);

        assert_eq!(list.page(), 3);
        assert!(list.is_order_by("name", Some(Direction::Desc)));
        assert!(params.is_empty());
    }

    #[test]
    fn request_keys_win_over_session() {
        let mut section = MemorySession::new();
        section.set("page", ParamValue::Int(3));

        let mut list = list();
        let mut params = ParamMap::from([("page".to_string(), ParamValue::from("5"))]);
        list.load_session(&mut params, &section);

        assert_eq!(list.page(), 1);
        assert!(!params.contains_key("page"));
    }

    #[test]
    fn session_filters_adopted_only_without_request_filters() {
        let mut section = MemorySession::new();
        section.set(
            "filters",
            ParamValue::Map(ParamMap::from([(
                "status".to_string(),
                ParamValue::from("open"),
            )])),
        );

        let mut list = list();
        list.load_session(&mut ParamMap::new(), &section);
        assert_eq!(list.filters()["status"], ParamValue::from("open"));

        let mut list = self::list();
        let mut params = ParamMap::from([("filter".to_string(), ParamValue::from("1"))]);
        list.load_session(&mut params, &section);
        assert!(list.filters().is_empty());
    }

    #[test]
    fn save_stores_canonical_order_and_filters() {
        let mut list = list();
        list.set_order("name", Direction::Asc);
        list.set_filter("status", Some(ParamValue::from("open")));

        let params = ParamMap::from([
            ("order".to_string(), ParamValue::from("name-asc")),
            ("page".to_string(), ParamValue::Int(2)),
        ]);
        let mut section = MemorySession::new();
        section.set("onpage", ParamValue::Int(50));
        list.save_session(&params, &mut section);

        assert_eq!(section.get("order"), Some(&ParamValue::from("name-ASC")));
        assert_eq!(section.get("page"), Some(&ParamValue::Int(2)));
        assert_eq!(section.get("onpage"), None);
        assert!(matches!(section.get("filters"), Some(ParamValue::Map(m)) if m.len() == 1));
    }

    #[test]
    fn store_serializes_sections_by_path() {
        let mut store = SessionStore::new();
        store.section("products-list").set("page", ParamValue::Int(2));
        store.section("orders-list");

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"products-list":{"page":2},"orders-list":{}}"#);

        let restored: SessionStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, store);
        assert_eq!(restored.paths().collect::<Vec<_>>(), vec!["products-list", "orders-list"]);
    }
}
