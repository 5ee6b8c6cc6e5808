//! In-memory source over a shared row vector.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use datalist_model::{OrderSpec, ParamMap, ParamValue};

use crate::source::{Source, SourceStructure};

/// Field access for rows held by a [`MemorySource`].
pub trait Record {
    fn field(&self, name: &str) -> Option<ParamValue>;
}

impl Record for ParamMap {
    fn field(&self, name: &str) -> Option<ParamValue> {
        self.get(name).cloned()
    }
}

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Source over rows kept in memory.
///
/// Rows are shared between clones; filters, ordering and the page window are
/// per clone. Missing fields sort last regardless of direction.
#[derive(Clone)]
pub struct MemorySource<T> {
    rows: Arc<Vec<T>>,
    predicates: Vec<Predicate<T>>,
    order: OrderSpec,
    window: Option<(u32, u32)>,
    structure: Option<SourceStructure>,
    loaded: bool,
}

impl<T> MemorySource<T>
where
    T: Record + Clone + Send + Sync + 'static,
{
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(rows),
            predicates: Vec::new(),
            order: OrderSpec::new(),
            window: None,
            structure: None,
            loaded: false,
        }
    }

    #[must_use]
    pub fn with_structure(mut self, structure: SourceStructure) -> Self {
        self.structure = Some(structure);
        self
    }

    /// Marks the rows as an already materialized result set, e.g. a page
    /// handed over by the caller. Distinct-root counting then counts rows.
    #[must_use]
    pub fn with_loaded(mut self, loaded: bool) -> Self {
        self.loaded = loaded;
        self
    }

    /// Adds an arbitrary predicate; used by filter and nesting expressions.
    pub fn where_fn<F>(&mut self, predicate: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
    }

    /// Current order-by, in application order.
    pub fn order(&self) -> &OrderSpec {
        &self.order
    }

    fn matching(&self) -> Vec<&T> {
        let mut rows: Vec<&T> = self
            .rows
            .iter()
            .filter(|row| self.predicates.iter().all(|p| p(row)))
            .collect();

        if !self.order.is_empty() {
            rows.sort_by(|a, b| self.compare(a, b));
        }
        rows
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        for (column, direction) in &self.order {
            let ordering = match (a.field(column), b.field(column)) {
                (Some(x), Some(y)) => {
                    let ordering = x.loose_cmp(&y);
                    if direction.is_descending() {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl<T> Source for MemorySource<T>
where
    T: Record + Clone + Send + Sync + 'static,
{
    type Item = T;
    type Error = Infallible;

    fn filter(&mut self, criteria: &ParamMap) {
        for (column, expected) in criteria {
            let column = column.clone();
            let expected = expected.clone();
            self.where_fn(move |row: &T| {
                row.field(&column).is_some_and(|actual| match &expected {
                    ParamValue::List(options) => options.iter().any(|o| o.loose_eq(&actual)),
                    other => other.loose_eq(&actual),
                })
            });
        }
    }

    fn order_by(&mut self, spec: &OrderSpec) {
        for (column, direction) in spec {
            self.order.insert(column.clone(), *direction);
        }
    }

    fn set_order_by(&mut self, spec: &OrderSpec) {
        self.order = spec.clone();
    }

    fn has_order_by(&self) -> bool {
        !self.order.is_empty()
    }

    fn set_page(&mut self, page: u32, size: u32) {
        self.window = Some((page.max(1), size));
    }

    fn count(&self) -> Result<usize, Self::Error> {
        Ok(self
            .rows
            .iter()
            .filter(|row| self.predicates.iter().all(|p| p(row)))
            .count())
    }

    fn fetch(&self) -> Result<Vec<T>, Self::Error> {
        let rows = self.matching();
        let (offset, limit) = match self.window {
            Some((page, size)) => ((page as usize - 1) * size as usize, size as usize),
            None => (0, rows.len()),
        };
        Ok(rows.into_iter().skip(offset).take(limit).cloned().collect())
    }

    fn count_distinct(&self, column: &str) -> Result<usize, Self::Error> {
        let distinct: HashSet<String> = self
            .matching()
            .into_iter()
            .filter_map(|row| row.field(column))
            .map(|value| value.to_string())
            .collect();
        Ok(distinct.len())
    }

    fn supports_native_filter(&self) -> bool {
        true
    }

    fn structure(&self) -> Option<&SourceStructure> {
        self.structure.as_ref()
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}

impl<T> fmt::Debug for MemorySource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("rows", &self.rows.len())
            .field("predicates", &self.predicates.len())
            .field("order", &self.order)
            .field("window", &self.window)
            .field("loaded", &self.loaded)
            .finish()
    }
}
