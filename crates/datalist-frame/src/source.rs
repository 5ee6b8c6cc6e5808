//! [`Source`] implementation over a polars `LazyFrame`.

use std::fmt;

use datalist_core::{ColumnInfo, Source, SourceStructure};
use datalist_model::{OrderSpec, ParamMap};
use polars::prelude::*;

use crate::error::{FrameError, Result};
use crate::value::{any_to_param, equality_predicate};

const ROW_COUNT: &str = "__row_count";

/// A materialized frame row. Null cells are left out.
pub type FrameRow = ParamMap;

/// Lazily evaluated frame source.
///
/// Filters are pushed into the query plan as they arrive; ordering and the
/// page window are applied when the frame is materialized, so a later
/// `set_order_by` replaces earlier ordering.
#[derive(Clone)]
pub struct FrameSource {
    frame: LazyFrame,
    order: OrderSpec,
    window: Option<(u32, u32)>,
    structure: SourceStructure,
}

impl FrameSource {
    /// Wraps a lazy frame; its schema becomes the declared columns.
    pub fn new(mut frame: LazyFrame) -> Result<Self> {
        let schema = frame.collect_schema()?;
        let columns = schema
            .iter_names()
            .map(|name| ColumnInfo::new(name.as_str(), name.as_str()))
            .collect();
        tracing::debug!(columns = schema.len(), "Created frame source");

        Ok(Self {
            frame,
            order: OrderSpec::new(),
            window: None,
            structure: SourceStructure::new(columns),
        })
    }

    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        Self::new(frame.lazy())
    }

    /// Declares `column` as the row identity.
    pub fn with_id_column(mut self, column: &str) -> Result<Self> {
        if !self.has_column(column) {
            return Err(FrameError::MissingColumn {
                column: column.to_string(),
            });
        }
        self.structure.primary_key = Some(column.to_string());
        Ok(self)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.structure.columns.iter().any(|c| c.name == column)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.structure.columns.iter().map(|c| c.name.as_str())
    }

    /// Narrows the frame with an arbitrary predicate.
    pub fn where_expr(&mut self, predicate: Expr) {
        self.frame = self.frame.clone().filter(predicate);
    }

    pub fn order(&self) -> &OrderSpec {
        &self.order
    }

    /// The query plan with ordering and window applied.
    pub fn query(&self) -> LazyFrame {
        let mut frame = self.frame.clone();

        if !self.order.is_empty() {
            let columns: Vec<Expr> = self.order.keys().map(|name| col(name.as_str())).collect();
            let descending: Vec<bool> = self.order.values().map(|d| d.is_descending()).collect();
            frame = frame.sort_by_exprs(
                columns,
                SortMultipleOptions::default()
                    .with_order_descending_multi(descending)
                    .with_nulls_last(true)
                    .with_maintain_order(true),
            );
        }

        if let Some((page, size)) = self.window {
            let offset = i64::from(page.max(1) - 1) * i64::from(size);
            frame = frame.slice(offset, IdxSize::from(size));
        }
        frame
    }

    /// Materializes the current page as a `DataFrame`.
    pub fn collect(&self) -> Result<DataFrame> {
        Ok(self.query().collect()?)
    }
}

impl Source for FrameSource {
    type Item = FrameRow;
    type Error = FrameError;

    fn filter(&mut self, criteria: &ParamMap) {
        for (column, value) in criteria {
            if !self.has_column(column) {
                tracing::warn!(column = %column, "Ignoring filter on unknown column");
                continue;
            }
            match equality_predicate(column, value) {
                Some(predicate) => self.where_expr(predicate),
                None => {
                    tracing::warn!(column = %column, kind = value.kind(), "Unsupported filter value");
                }
            }
        }
    }

    fn order_by(&mut self, spec: &OrderSpec) {
        for (column, direction) in spec {
            if self.has_column(column) {
                self.order.insert(column.clone(), *direction);
            } else {
                tracing::warn!(column = %column, "Ignoring order on unknown column");
            }
        }
    }

    fn set_order_by(&mut self, spec: &OrderSpec) {
        self.order.clear();
        self.order_by(spec);
    }

    fn has_order_by(&self) -> bool {
        !self.order.is_empty()
    }

    fn set_page(&mut self, page: u32, size: u32) {
        self.window = Some((page.max(1), size));
    }

    fn count(&self) -> Result<usize> {
        let df = self
            .frame
            .clone()
            .select([len().alias(ROW_COUNT)])
            .collect()?;
        let count = any_to_param(df.column(ROW_COUNT)?.get(0)?)
            .and_then(|value| value.as_int())
            .unwrap_or(0);
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn fetch(&self) -> Result<Vec<FrameRow>> {
        let df = self.collect()?;
        let columns = df.get_columns();
        let mut rows = Vec::with_capacity(df.height());

        for idx in 0..df.height() {
            let mut row = FrameRow::new();
            for column in columns {
                if let Some(value) = any_to_param(column.get(idx)?) {
                    row.insert(column.name().to_string(), value);
                }
            }
            rows.push(row);
        }
        Ok(rows)
    }

    fn count_distinct(&self, column: &str) -> Result<usize> {
        if !self.has_column(column) {
            return Err(FrameError::MissingColumn {
                column: column.to_string(),
            });
        }
        let df = self.frame.clone().select([col(column)]).collect()?;
        Ok(df.column(column)?.n_unique()?)
    }

    fn supports_native_filter(&self) -> bool {
        true
    }

    fn structure(&self) -> Option<&SourceStructure> {
        Some(&self.structure)
    }
}

impl fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSource")
            .field("columns", &self.column_names().collect::<Vec<_>>())
            .field("order", &self.order)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
