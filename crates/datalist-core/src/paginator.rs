//! Pagination over the filtered source.

use std::fmt;

use crate::datalist::Datalist;
use crate::error::{DatalistError, Result};
use crate::source::Source;

/// Custom item counter.
pub type CountFn<S> = Box<dyn Fn(&S) -> Result<usize>>;

/// How the paginator counts items of the filtered source.
pub enum ItemCountStrategy<S> {
    /// Every matching row.
    Count,
    /// Distinct values of the id column, unless the source is already
    /// materialized. Used for grids over joined sources.
    DistinctRoots { id_column: String },
    Custom(CountFn<S>),
}

impl<S: Source> ItemCountStrategy<S> {
    pub fn custom<F>(count: F) -> Self
    where
        F: Fn(&S) -> Result<usize> + 'static,
    {
        Self::Custom(Box::new(count))
    }

    pub fn count(&self, source: &S) -> Result<usize> {
        match self {
            Self::Count => source
                .count()
                .map_err(DatalistError::source_failure("count")),
            Self::DistinctRoots { id_column } if !source.is_loaded() => source
                .count_distinct(id_column)
                .map_err(DatalistError::source_failure("count")),
            Self::DistinctRoots { .. } => source
                .count()
                .map_err(DatalistError::source_failure("count")),
            Self::Custom(count) => count(source),
        }
    }
}

impl<S> fmt::Debug for ItemCountStrategy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => f.write_str("Count"),
            Self::DistinctRoots { id_column } => f
                .debug_struct("DistinctRoots")
                .field("id_column", id_column)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Page window and counts for one request.
///
/// Pages are 1-based. The current page is reported as requested, even past
/// the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: u32,
    items_per_page: usize,
    item_count: usize,
}

impl Paginator {
    pub fn new(page: u32, items_per_page: usize, item_count: usize) -> Self {
        Self {
            page: page.max(1),
            items_per_page: items_per_page.max(1),
            item_count,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn page_count(&self) -> usize {
        self.item_count.div_ceil(self.items_per_page)
    }

    pub fn first_page(&self) -> u32 {
        1
    }

    pub fn last_page(&self) -> u32 {
        u32::try_from(self.page_count().max(1)).unwrap_or(u32::MAX)
    }

    pub fn is_first(&self) -> bool {
        self.page <= self.first_page()
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.last_page()
    }

    pub fn has_previous(&self) -> bool {
        !self.is_first()
    }

    pub fn has_next(&self) -> bool {
        !self.is_last()
    }

    /// Index of the first item on the current page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.items_per_page
    }

    /// Number of items on the current page.
    pub fn length(&self) -> usize {
        self.item_count
            .saturating_sub(self.offset())
            .min(self.items_per_page)
    }
}

impl<S: Source> Datalist<S> {
    /// The paginator for the current state, cached unless `refresh` is set.
    ///
    /// Without a page size every item lands on a single page.
    pub fn paginator(&mut self, refresh: bool) -> Result<Paginator> {
        if let Some(paginator) = self.paginator.filter(|_| !refresh) {
            return Ok(paginator);
        }

        let source = self.filtered_source(false);
        let item_count = self.item_count.count(&source)?;
        let items_per_page = self
            .on_page()
            .map_or(item_count, |size| size as usize);

        let paginator = Paginator::new(self.page(), items_per_page, item_count);
        tracing::debug!(
            page = paginator.page(),
            items_per_page = paginator.items_per_page(),
            item_count,
            "Computed paginator"
        );
        self.paginator = Some(paginator);
        Ok(paginator)
    }
}
