//! Query composition: filters and ordering applied to a clone of the source.

use datalist_model::{OrderSpec, ParamMap};

use crate::datalist::Datalist;
use crate::source::Source;

impl<S: Source> Datalist<S> {
    /// Composes a new filtered and ordered source from the current state.
    ///
    /// Each filter value is routed, in insertion order, to the source's
    /// native filter (allowed repository filters without an expression) or to
    /// its filter expression unless the value equals the expression's default.
    /// Anything else is inert.
    pub fn compose(&self) -> S {
        let mut source = self.source.clone();

        for (name, value) in &self.state.filters {
            let has_expression = self.expressions.has_filter(name);

            if !has_expression
                && source.supports_native_filter()
                && self.allowed_repository_filters.contains(name)
            {
                tracing::trace!(filter = %name, "Applying native filter");
                source.filter(&ParamMap::from([(name.clone(), value.clone())]));
            } else if let Some(expression) = self.expressions.filter(name) {
                if expression.is_default(value) {
                    tracing::trace!(filter = %name, "Skipping filter at default value");
                    continue;
                }
                tracing::trace!(filter = %name, "Applying filter expression");
                expression.apply(&mut source, value);
            } else {
                tracing::debug!(filter = %name, "Ignoring unknown filter");
            }
        }

        self.apply_order(&mut source);
        source
    }

    fn apply_order(&self, source: &mut S) {
        let Some(name) = self.order() else {
            return;
        };
        // A source ordered by its owner keeps that order unless the request
        // asks for one explicitly.
        if source.has_order_by() && self.state.order.is_none() {
            return;
        }

        let direction = self.direction(false);
        source.set_order_by(&OrderSpec::new());

        if let Some(transform) = self.expressions.order(name) {
            transform(source, direction);
        } else if let Some(column) = self.allowed_order_columns.get(name) {
            source.order_by(&OrderSpec::from([(column.clone(), direction)]));
        } else {
            tracing::debug!(order = %name, "Ignoring unknown order");
        }

        let mut secondary = self.config.secondary_order.clone();
        secondary.shift_remove(name);
        if !secondary.is_empty() {
            source.order_by(&secondary);
        }
    }

    /// The filtered source. With `new_instance` a fresh composition is
    /// returned and the cache is left alone; otherwise the cached source is
    /// returned, composing it first if needed.
    pub fn filtered_source(&mut self, new_instance: bool) -> S {
        if new_instance {
            return self.compose();
        }
        if let Some(source) = &self.filtered_source {
            return source.clone();
        }
        let source = self.compose();
        self.filtered_source = Some(source.clone());
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListConfig;
    use crate::memory::MemorySource;
    use datalist_model::{Direction, ParamValue};
    use indexmap::IndexMap;
    use std::cell::Cell;
    use std::rc::Rc;

    fn row(id: i64, name: &str, status: &str) -> ParamMap {
        ParamMap::from([
            ("id".to_string(), ParamValue::Int(id)),
            ("name".to_string(), ParamValue::from(name)),
            ("status".to_string(), ParamValue::from(status)),
        ])
    }

    fn source() -> MemorySource<ParamMap> {
        MemorySource::new(vec![
            row(1, "delta", "open"),
            row(2, "alpha", "closed"),
            row(3, "charlie", "open"),
        ])
    }

    fn ids(source: &MemorySource<ParamMap>) -> Vec<i64> {
        source
            .fetch()
            .unwrap()
            .iter()
            .filter_map(|r| r["id"].as_int())
            .collect()
    }

    #[test]
    fn native_filter_requires_allow_listing() {
        let mut list = Datalist::builder(source())
            .allowed_repository_filters(["status"])
            .build();
        list.set_filter("status", Some(ParamValue::from("open")));
        list.set_filter("name", Some(ParamValue::from("alpha")));

        assert_eq!(ids(&list.compose()), vec![1, 3]);
    }

    #[test]
    fn expression_wins_over_native_filter() {
        let mut list = Datalist::builder(source())
            .allowed_repository_filters(["status"])
            .build();
        list.add_filter_expression(
            "status",
            |s: &mut MemorySource<ParamMap>, _| s.where_fn(|r| r["id"] == ParamValue::Int(2)),
            None,
        );
        list.set_filter("status", Some(ParamValue::from("open")));

        assert_eq!(ids(&list.compose()), vec![2]);
    }

    #[test]
    fn default_valued_filter_is_inert() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut list = Datalist::new(source(), ListConfig::default());
        list.add_filter_expression(
            "status",
            move |_, _| counter.set(counter.get() + 1),
            Some(ParamValue::from("all")),
        );

        list.set_filter("status", Some(ParamValue::from("all")));
        list.compose();
        assert_eq!(calls.get(), 0);

        list.set_filter("status", Some(ParamValue::from("open")));
        list.compose();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn order_column_and_secondary_order() {
        let config = ListConfig::default().with_secondary_order(OrderSpec::from([
            ("name".to_string(), Direction::Asc),
            ("id".to_string(), Direction::Desc),
        ]));
        let mut list = Datalist::builder(source())
            .config(config)
            .allowed_order_columns(IndexMap::from([("name".to_string(), "name".to_string())]))
            .build();
        list.set_order("name", Direction::Desc);

        let composed = list.compose();
        let order: Vec<_> = composed.order().iter().map(|(c, d)| (c.as_str(), *d)).collect();
        assert_eq!(order, vec![("name", Direction::Desc), ("id", Direction::Desc)]);
        assert_eq!(ids(&composed), vec![1, 3, 2]);
    }

    #[test]
    fn order_expression_takes_precedence() {
        let mut list = Datalist::builder(source())
            .allowed_order_columns(IndexMap::from([("name".to_string(), "name".to_string())]))
            .build();
        list.add_order_expression("name", |s: &mut MemorySource<ParamMap>, direction| {
            s.order_by(&OrderSpec::from([("id".to_string(), direction)]));
        });
        list.set_order("name", Direction::Asc);

        let composed = list.compose();
        assert_eq!(composed.order().keys().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn default_order_respects_source_order() {
        let mut base = source();
        base.set_order_by(&OrderSpec::from([("id".to_string(), Direction::Desc)]));
        let config = ListConfig::default().with_default_order("name", Direction::Asc);
        let mut list = Datalist::builder(base)
            .config(config)
            .allowed_order_columns(IndexMap::from([("name".to_string(), "name".to_string())]))
            .build();

        assert_eq!(ids(&list.compose()), vec![3, 2, 1]);

        list.set_order("name", Direction::Asc);
        assert_eq!(ids(&list.compose()), vec![2, 3, 1]);
    }

    #[test]
    fn unknown_order_leaves_source_unordered() {
        let mut list = Datalist::new(source(), ListConfig::default());
        list.set_order("nope", Direction::Asc);
        assert!(!list.compose().has_order_by());
    }

    #[test]
    fn cached_source_is_reused_until_invalidated() {
        let mut list = Datalist::builder(source())
            .allowed_repository_filters(["status"])
            .build();
        list.set_filter("status", Some(ParamValue::from("open")));

        let cached = list.filtered_source(false);
        assert!(list.filtered_source.is_some());
        assert_eq!(ids(&cached), ids(&list.filtered_source(false)));

        list.set_filter("status", Some(ParamValue::from("closed")));
        assert!(list.filtered_source.is_none());
        assert_eq!(ids(&list.filtered_source(false)), vec![2]);
    }

    #[test]
    fn fresh_compositions_do_not_touch_cache() {
        let mut list = Datalist::new(source(), ListConfig::default());
        let _ = list.filtered_source(true);
        assert!(list.filtered_source.is_none());
    }
}
