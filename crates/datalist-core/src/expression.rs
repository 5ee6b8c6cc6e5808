//! Named filter and order expressions.
//!
//! An expression is a caller-supplied function that narrows or orders a
//! source. Expressions are keyed by the name that appears in request
//! parameters; registering a name twice replaces the earlier expression.

use std::fmt;

use datalist_model::{Direction, ParamValue};
use indexmap::IndexMap;

/// Filter transform: mutates the source for a given value.
pub type FilterFn<S> = Box<dyn Fn(&mut S, &ParamValue)>;

/// Order transform: mutates the source's ordering for a given direction.
pub type OrderFn<S> = Box<dyn Fn(&mut S, Direction)>;

/// A filter transform together with the value that means "not filtering".
pub struct FilterExpression<S> {
    transform: FilterFn<S>,
    default_value: Option<ParamValue>,
}

impl<S> FilterExpression<S> {
    pub fn new<F>(transform: F, default_value: Option<ParamValue>) -> Self
    where
        F: Fn(&mut S, &ParamValue) + 'static,
    {
        Self {
            transform: Box::new(transform),
            default_value,
        }
    }

    pub fn default_value(&self) -> Option<&ParamValue> {
        self.default_value.as_ref()
    }

    /// True when `value` is exactly the registered default.
    pub fn is_default(&self, value: &ParamValue) -> bool {
        self.default_value.as_ref() == Some(value)
    }

    pub fn apply(&self, source: &mut S, value: &ParamValue) {
        (self.transform)(source, value);
    }
}

/// Registry of filter and order expressions for one list.
pub struct ExpressionRegistry<S> {
    filters: IndexMap<String, FilterExpression<S>>,
    orders: IndexMap<String, OrderFn<S>>,
}

impl<S> Default for ExpressionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ExpressionRegistry<S> {
    pub fn new() -> Self {
        Self {
            filters: IndexMap::new(),
            orders: IndexMap::new(),
        }
    }

    /// Registers a filter expression, replacing any previous one of that name.
    pub fn add_filter(&mut self, name: impl Into<String>, expression: FilterExpression<S>) {
        let name = name.into();
        if self.filters.insert(name.clone(), expression).is_some() {
            tracing::debug!(filter = %name, "Replaced filter expression");
        }
    }

    /// Removes a filter expression. Returns true if one was registered.
    pub fn remove_filter(&mut self, name: &str) -> bool {
        self.filters.shift_remove(name).is_some()
    }

    pub fn filter(&self, name: &str) -> Option<&FilterExpression<S>> {
        self.filters.get(name)
    }

    pub fn has_filter(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered filter names, in registration order.
    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// True when `name` is registered and `value` equals its default.
    pub fn is_default(&self, name: &str, value: &ParamValue) -> bool {
        self.filters
            .get(name)
            .is_some_and(|expression| expression.is_default(value))
    }

    /// Registers an order expression, replacing any previous one of that name.
    pub fn add_order<F>(&mut self, name: impl Into<String>, transform: F)
    where
        F: Fn(&mut S, Direction) + 'static,
    {
        let name = name.into();
        if self.orders.insert(name.clone(), Box::new(transform)).is_some() {
            tracing::debug!(order = %name, "Replaced order expression");
        }
    }

    /// Removes an order expression. Returns true if one was registered.
    pub fn remove_order(&mut self, name: &str) -> bool {
        self.orders.shift_remove(name).is_some()
    }

    pub fn order(&self, name: &str) -> Option<&OrderFn<S>> {
        self.orders.get(name)
    }

    pub fn has_order(&self, name: &str) -> bool {
        self.orders.contains_key(name)
    }

    pub fn order_names(&self) -> impl Iterator<Item = &str> {
        self.orders.keys().map(String::as_str)
    }
}

impl<S> fmt::Debug for ExpressionRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionRegistry")
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("orders", &self.orders.keys().collect::<Vec<_>>())
            .finish()
    }
}
