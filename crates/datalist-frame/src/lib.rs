//! Polars-backed data source for the datalist engine.
//!
//! [`FrameSource`] implements [`datalist_core::Source`] over a polars
//! `LazyFrame`:
//!
//! - native filters become string-equality predicates (lists match any item)
//! - order columns become a multi-column sort, nulls last
//! - the page window becomes a slice of the sorted plan
//! - rows are materialized as [`FrameRow`] maps, nulls left out
//!
//! The declared columns come from the frame schema, so every column is an
//! allowed order column out of the box.

mod csv;
mod error;
mod source;
mod value;

pub use csv::{read_csv, read_csv_source};
pub use error::{FrameError, Result};
pub use source::{FrameRow, FrameSource};
pub use value::{any_to_param, equality_predicate};
