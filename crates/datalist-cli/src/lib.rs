//! CLI library components for the datalist browser.

pub mod logging;
pub mod request;
