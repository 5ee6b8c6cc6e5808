//! Shared value types for the datalist engine.
//!
//! - [`ParamValue`] / [`ParamMap`]: request, session and filter values
//! - [`Direction`], [`OrderToken`], [`OrderSpec`]: ordering state
//! - [`params`]: reserved parameter keys and parsing helpers

pub mod error;
pub mod order;
pub mod params;
pub mod value;

pub use error::{ParamError, Result};
pub use order::{Direction, OrderSpec, OrderToken};
pub use value::{ParamMap, ParamValue};
