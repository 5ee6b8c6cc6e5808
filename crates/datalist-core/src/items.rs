//! Materialization of the current page, flat or nested.

use crate::datalist::Datalist;
use crate::error::{DatalistError, Result};
use crate::source::Source;

/// Re-parameterizes a source to the children of `parent`, or to the roots
/// when `parent` is `None`.
pub type NestingFn<S> = Box<dyn Fn(&mut S, Option<&<S as Source>::Item>)>;

impl<S: Source> Datalist<S> {
    /// Items of the current page, memoized until the next state change.
    ///
    /// With a nesting callback and no active filters the page holds the
    /// roots, each followed depth-first by its descendants. The nesting
    /// relation must be acyclic.
    pub fn items_on_page(&mut self) -> Result<&[S::Item]> {
        if self.items_on_page.is_none() {
            let items = self.load_items()?;
            tracing::debug!(items = items.len(), page = self.page(), "Loaded page items");
            self.items_on_page = Some(items);
        }
        Ok(self.items_on_page.as_deref().unwrap_or_default())
    }

    fn load_items(&mut self) -> Result<Vec<S::Item>> {
        let mut source = self.filtered_source(false);

        if let Some(size) = self.on_page() {
            source.set_page(self.page(), size);
        }

        for hook in &self.hooks.on_load {
            hook(&mut source);
        }

        match &self.nesting {
            Some(nesting) if self.state.filters.is_empty() => {
                let mut items = Vec::new();
                self.expand(nesting, source, None, &mut items)?;
                Ok(items)
            }
            _ => source
                .fetch()
                .map_err(DatalistError::source_failure("fetch")),
        }
    }

    fn expand(
        &self,
        nesting: &NestingFn<S>,
        mut source: S,
        parent: Option<&S::Item>,
        items: &mut Vec<S::Item>,
    ) -> Result<()> {
        nesting(&mut source, parent);
        let level = source
            .fetch()
            .map_err(DatalistError::source_failure("fetch"))?;

        for item in level {
            items.push(item.clone());
            self.expand(nesting, self.compose(), Some(&item), items)?;
        }
        Ok(())
    }
}
