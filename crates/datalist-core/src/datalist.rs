//! The list component: state store, registries and caches for one list.
//!
//! A [`Datalist`] owns the base source and everything that shapes a request
//! over it. Query composition, paging, item loading and state round-trips are
//! implemented in their own modules on top of the fields declared here.

use std::fmt;

use datalist_model::{Direction, OrderSpec, OrderToken, ParamMap, ParamValue};
use indexmap::{IndexMap, IndexSet};

use crate::config::ListConfig;
use crate::control::FilterControl;
use crate::error::{DatalistError, Result};
use crate::expression::{ExpressionRegistry, FilterExpression};
use crate::items::NestingFn;
use crate::paginator::{ItemCountStrategy, Paginator};
use crate::source::Source;
use crate::state::ListState;

/// Source hook fired on the page source right before materialization.
pub type LoadHook<S> = Box<dyn Fn(&mut S)>;

/// Parameter hook fired around state loading and saving.
pub type StateHook = Box<dyn Fn(&mut ParamMap)>;

pub(crate) struct Hooks<S> {
    pub(crate) on_load: Vec<LoadHook<S>>,
    pub(crate) on_load_state: Vec<StateHook>,
    pub(crate) on_save_state: Vec<StateHook>,
}

impl<S> Default for Hooks<S> {
    fn default() -> Self {
        Self {
            on_load: Vec::new(),
            on_load_state: Vec::new(),
            on_save_state: Vec::new(),
        }
    }
}

/// A paginated, ordered, filtered view over a [`Source`].
pub struct Datalist<S: Source> {
    pub(crate) source: S,
    pub(crate) config: ListConfig,
    pub(crate) state: ListState,
    pub(crate) expressions: ExpressionRegistry<S>,
    pub(crate) allowed_order_columns: IndexMap<String, String>,
    pub(crate) allowed_repository_filters: IndexSet<String>,
    pub(crate) controls: IndexMap<String, FilterControl>,
    pub(crate) nesting: Option<NestingFn<S>>,
    pub(crate) item_count: ItemCountStrategy<S>,
    pub(crate) source_id_name: Option<String>,
    pub(crate) hooks: Hooks<S>,

    // Caches
    pub(crate) filtered_source: Option<S>,
    pub(crate) paginator: Option<Paginator>,
    pub(crate) items_on_page: Option<Vec<S::Item>>,
}

impl<S: Source> Datalist<S> {
    /// Creates a list over `source`, with order columns taken from the
    /// source structure.
    pub fn new(source: S, config: ListConfig) -> Self {
        DatalistBuilder::new(source).config(config).build()
    }

    pub fn builder(source: S) -> DatalistBuilder<S> {
        DatalistBuilder::new(source)
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// The base source, cloned. Mutating the clone never affects the list.
    pub fn source(&self) -> S {
        self.source.clone()
    }

    /// The base source itself.
    pub fn base_source(&self) -> &S {
        &self.source
    }

    /// Drops the filtered source, paginator and item caches.
    pub fn invalidate(&mut self) {
        let had_cache = self.filtered_source.take().is_some()
            | self.paginator.take().is_some()
            | self.items_on_page.take().is_some();
        if had_cache {
            tracing::trace!("Invalidated list caches");
        }
    }

    // Order

    /// Sets the order token. Names are not validated; an unknown name leaves
    /// the source unordered.
    pub fn set_order(&mut self, name: impl Into<String>, direction: Direction) {
        self.state.order = Some(OrderToken::new(name, direction));
        self.invalidate();
    }

    pub fn set_order_token(&mut self, token: OrderToken) {
        self.state.order = Some(token);
        self.invalidate();
    }

    /// Removes the explicit order so the default order applies again.
    pub fn clear_order(&mut self) {
        self.state.order = None;
        self.invalidate();
    }

    /// The name part of the order token, or the default order name.
    pub fn order(&self) -> Option<&str> {
        match &self.state.order {
            Some(token) => Some(token.name.as_str()),
            None => self.config.default_order.as_deref(),
        }
    }

    /// The direction part of the order token, or the default direction.
    pub fn direction(&self, reverse: bool) -> Direction {
        let direction = self
            .state
            .order
            .as_ref()
            .map_or(self.config.default_direction, |token| token.direction);
        if reverse {
            direction.reversed()
        } else {
            direction
        }
    }

    /// Canonical `"<order>-<DIRECTION>"` of the resolved order.
    pub fn order_parameter(&self) -> Option<String> {
        self.order()
            .map(|name| OrderToken::new(name, self.direction(false)).to_string())
    }

    /// True when the resolved order is `name` (and `direction`, if given).
    pub fn is_order_by(&self, name: &str, direction: Option<Direction>) -> bool {
        self.order() == Some(name) && direction.is_none_or(|d| d == self.direction(false))
    }

    pub fn default_order(&self) -> Option<OrderToken> {
        self.config.default_order_token()
    }

    pub fn set_default_order(&mut self, name: Option<String>, direction: Direction) {
        self.config.default_order = name;
        self.config.default_direction = direction;
        self.invalidate();
    }

    pub fn set_secondary_order(&mut self, order: OrderSpec) {
        self.config.secondary_order = order;
        self.invalidate();
    }

    pub fn allowed_order_columns(&self) -> &IndexMap<String, String> {
        &self.allowed_order_columns
    }

    /// Replaces the order name → column mapping.
    pub fn set_allowed_order_columns(&mut self, columns: IndexMap<String, String>) {
        self.allowed_order_columns = columns;
        self.invalidate();
    }

    /// Merges into the order name → column mapping; later entries win.
    pub fn merge_allowed_order_columns(&mut self, columns: IndexMap<String, String>) {
        self.allowed_order_columns.extend(columns);
        self.invalidate();
    }

    // Filters

    /// Replaces filter values. `None` clears every filter; otherwise each
    /// `Some` value is set and each `None` value removed.
    pub fn set_filters(&mut self, filters: Option<IndexMap<String, Option<ParamValue>>>) {
        match filters {
            None => self.state.filters.clear(),
            Some(filters) => {
                for (name, value) in filters {
                    match value {
                        Some(value) => {
                            self.state.filters.insert(name, value);
                        }
                        None => {
                            self.state.filters.shift_remove(&name);
                        }
                    }
                }
            }
        }
        self.invalidate();
    }

    pub fn set_filter(&mut self, name: impl Into<String>, value: Option<ParamValue>) {
        self.set_filters(Some(IndexMap::from([(name.into(), value)])));
    }

    pub fn filters(&self) -> &ParamMap {
        &self.state.filters
    }

    /// True when the filter was restored from request parameters and is
    /// therefore written back by `save_state`.
    pub fn is_filter_stateful(&self, name: &str) -> bool {
        self.state.stateful_filters.contains(name)
    }

    pub fn allowed_repository_filters(&self) -> &IndexSet<String> {
        &self.allowed_repository_filters
    }

    /// Names handed to the source's native filter when no filter expression
    /// is registered for them.
    pub fn set_allowed_repository_filters<I, N>(&mut self, names: I, merge: bool)
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        if !merge {
            self.allowed_repository_filters.clear();
        }
        self.allowed_repository_filters
            .extend(names.into_iter().map(Into::into));
        self.invalidate();
    }

    // Paging

    /// Sets the current page; `0` resets to the first page.
    pub fn set_page(&mut self, page: u32) {
        self.state.page = (page > 0).then_some(page);
        self.invalidate();
    }

    pub fn page(&self) -> u32 {
        self.state.page.filter(|page| *page > 0).unwrap_or(1)
    }

    pub fn set_on_page(&mut self, on_page: Option<u32>) {
        self.state.on_page = on_page;
        self.invalidate();
    }

    /// Page size, falling back to the configured default.
    pub fn on_page(&self) -> Option<u32> {
        self.state
            .on_page
            .filter(|size| *size > 0)
            .or(self.config.default_on_page)
    }

    pub fn set_default_on_page(&mut self, on_page: Option<u32>) {
        self.config.default_on_page = on_page;
        self.invalidate();
    }

    pub fn set_auto_canonicalize(&mut self, enabled: bool) {
        self.config.auto_canonicalize = enabled;
    }

    // Expressions

    pub fn add_filter_expression<F>(
        &mut self,
        name: impl Into<String>,
        transform: F,
        default_value: Option<ParamValue>,
    ) where
        F: Fn(&mut S, &ParamValue) + 'static,
    {
        self.expressions
            .add_filter(name, FilterExpression::new(transform, default_value));
        self.invalidate();
    }

    pub fn remove_filter_expressions<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.expressions.remove_filter(name);
            self.controls.shift_remove(name);
        }
        self.invalidate();
    }

    pub fn add_order_expression<F>(&mut self, name: impl Into<String>, transform: F)
    where
        F: Fn(&mut S, Direction) + 'static,
    {
        self.expressions.add_order(name, transform);
        self.invalidate();
    }

    pub fn remove_order_expressions<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.expressions.remove_order(name);
        }
        self.invalidate();
    }

    pub fn expressions(&self) -> &ExpressionRegistry<S> {
        &self.expressions
    }

    pub fn set_nesting_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut S, Option<&S::Item>) + 'static,
    {
        self.nesting = Some(Box::new(callback));
        self.invalidate();
    }

    pub fn set_item_count_strategy(&mut self, strategy: ItemCountStrategy<S>) {
        self.item_count = strategy;
        self.invalidate();
    }

    // Identity

    pub fn set_source_id_name(&mut self, name: impl Into<String>) {
        self.source_id_name = Some(name.into());
    }

    /// The id column of the source: the configured one, else the primary key
    /// declared by the source structure.
    pub fn source_id_name(&self) -> Result<String> {
        self.source_id_name
            .clone()
            .or_else(|| {
                self.source
                    .structure()
                    .and_then(|structure| structure.primary_key.clone())
            })
            .ok_or(DatalistError::MissingIdColumn)
    }

    /// Counts distinct root ids instead of rows.
    pub fn use_distinct_root_count(&mut self) -> Result<()> {
        let id_column = self.source_id_name()?;
        tracing::debug!(id_column = %id_column, "Counting distinct root ids");
        self.set_item_count_strategy(ItemCountStrategy::DistinctRoots { id_column });
        Ok(())
    }

    // Hooks

    pub fn on_load<F>(&mut self, hook: F)
    where
        F: Fn(&mut S) + 'static,
    {
        self.hooks.on_load.push(Box::new(hook));
        self.invalidate();
    }

    pub fn on_load_state<F>(&mut self, hook: F)
    where
        F: Fn(&mut ParamMap) + 'static,
    {
        self.hooks.on_load_state.push(Box::new(hook));
    }

    pub fn on_save_state<F>(&mut self, hook: F)
    where
        F: Fn(&mut ParamMap) + 'static,
    {
        self.hooks.on_save_state.push(Box::new(hook));
    }
}

impl<S> fmt::Debug for Datalist<S>
where
    S: Source + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datalist")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("expressions", &self.expressions)
            .field("allowed_order_columns", &self.allowed_order_columns)
            .field("allowed_repository_filters", &self.allowed_repository_filters)
            .field("item_count", &self.item_count)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Datalist`].
pub struct DatalistBuilder<S: Source> {
    source: S,
    config: ListConfig,
    allowed_order_columns: Option<IndexMap<String, String>>,
    extra_order_columns: IndexMap<String, String>,
    allowed_repository_filters: IndexSet<String>,
    item_count: ItemCountStrategy<S>,
    nesting: Option<NestingFn<S>>,
    source_id_name: Option<String>,
}

impl<S: Source> DatalistBuilder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: ListConfig::default(),
            allowed_order_columns: None,
            extra_order_columns: IndexMap::new(),
            allowed_repository_filters: IndexSet::new(),
            item_count: ItemCountStrategy::Count,
            nesting: None,
            source_id_name: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: ListConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the order columns derived from the source structure.
    #[must_use]
    pub fn allowed_order_columns(mut self, columns: IndexMap<String, String>) -> Self {
        self.allowed_order_columns = Some(columns);
        self
    }

    /// Adds order columns on top of the derived (or replaced) ones.
    #[must_use]
    pub fn merge_allowed_order_columns(mut self, columns: IndexMap<String, String>) -> Self {
        self.extra_order_columns.extend(columns);
        self
    }

    #[must_use]
    pub fn allowed_repository_filters<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.allowed_repository_filters
            .extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn item_count_strategy(mut self, strategy: ItemCountStrategy<S>) -> Self {
        self.item_count = strategy;
        self
    }

    #[must_use]
    pub fn nesting_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut S, Option<&S::Item>) + 'static,
    {
        self.nesting = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn source_id_name(mut self, name: impl Into<String>) -> Self {
        self.source_id_name = Some(name.into());
        self
    }

    pub fn build(self) -> Datalist<S> {
        let mut allowed_order_columns = self.allowed_order_columns.unwrap_or_else(|| {
            self.source
                .structure()
                .map(|structure| structure.order_columns())
                .unwrap_or_default()
        });
        allowed_order_columns.extend(self.extra_order_columns);

        tracing::debug!(
            order_columns = allowed_order_columns.len(),
            default_on_page = ?self.config.default_on_page,
            default_order = ?self.config.default_order,
            "Built datalist"
        );

        Datalist {
            source: self.source,
            config: self.config,
            state: ListState::default(),
            expressions: ExpressionRegistry::new(),
            allowed_order_columns,
            allowed_repository_filters: self.allowed_repository_filters,
            controls: IndexMap::new(),
            nesting: self.nesting,
            item_count: self.item_count,
            source_id_name: self.source_id_name,
            hooks: Hooks::default(),
            filtered_source: None,
            paginator: None,
            items_on_page: None,
        }
    }
}
