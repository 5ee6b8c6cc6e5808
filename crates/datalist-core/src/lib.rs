//! List-state engine.
//!
//! A [`Datalist`] wraps a lazily queryable [`Source`] and resolves a request
//! into a filtered, ordered, paginated view over it, keeping that state
//! round-trippable through request parameters and a session.
//!
//! # Features
//!
//! - **Named expressions**: filter and order transforms keyed by the
//!   parameter name that triggers them, with per-filter default values
//! - **Native filters and order columns** for names the source understands
//! - **Pagination** with an injectable item-count strategy
//! - **Nested expansion** of self-referential sources, depth-first
//! - **State round-trip** through parameters (`load_state` / `save_state`)
//!   and session sections (`load_session` / `save_session`)
//! - **Filter controls** that validate restored values before a form renders
//!
//! # Example
//!
//! ```ignore
//! use datalist_core::{Datalist, ListConfig, MemorySource};
//!
//! let mut list = Datalist::new(MemorySource::new(rows), ListConfig::default().with_default_on_page(Some(20)));
//! list.add_filter_expression("q", |source, value| source.where_fn(/* ... */), None);
//! list.load_state(&mut params);
//!
//! for item in list.items_on_page()? {
//!     // render
//! }
//! let paginator = list.paginator(false)?;
//! ```
//!
//! # Architecture
//!
//! - `datalist.rs` - The list, its builder and state accessors
//! - `compose.rs` - Filter and order composition, filtered-source cache
//! - `paginator.rs` - Paginator and item-count strategies
//! - `items.rs` - Page materialization and nested expansion
//! - `state.rs` / `session.rs` - Parameter and session round-trips
//! - `control.rs` - Filter control registry
//! - `source.rs` / `memory.rs` - Source capability and in-memory source
//! - `error.rs` - Error types with user-friendly messages

mod compose;
mod config;
mod control;
mod datalist;
mod error;
mod expression;
mod items;
mod memory;
mod paginator;
mod session;
mod source;
mod state;

// Re-export main types
pub use config::ListConfig;
pub use control::{ControlOptions, FilterControl, FilterControlKind};
pub use datalist::{Datalist, DatalistBuilder, LoadHook, StateHook};
pub use error::{ControlError, DatalistError, Result};
pub use expression::{ExpressionRegistry, FilterExpression, FilterFn, OrderFn};
pub use items::NestingFn;
pub use memory::{MemorySource, Record};
pub use paginator::{CountFn, ItemCountStrategy, Paginator};
pub use session::{MemorySession, SessionSection, SessionStore};
pub use source::{ColumnInfo, Source, SourceStructure};
pub use state::ListState;

// Shared value types
pub use datalist_model::{Direction, OrderSpec, OrderToken, ParamMap, ParamValue, params};
