use thiserror::Error;

/// A request parameter that could not be interpreted.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("parameter `{key}` must be a positive integer, got `{value}`")]
    NotPositiveInteger { key: String, value: String },
    #[error("parameter `{key}` must be a single value, got a {kind}")]
    NotScalar { key: String, kind: &'static str },
}

pub type Result<T> = std::result::Result<T, ParamError>;
