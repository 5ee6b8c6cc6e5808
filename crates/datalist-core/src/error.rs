//! Datalist error types.
//!
//! Composition and state handling never fail; errors come from
//! misconfiguration (missing id column, unreadable config) or from the
//! source adapter while counting or fetching rows.

use std::path::PathBuf;
use thiserror::Error;

/// Datalist operation error.
#[derive(Debug, Error)]
pub enum DatalistError {
    /// The source exposes no structure and no id column was configured.
    #[error("Cannot resolve the source id column")]
    MissingIdColumn,

    /// Configuration file could not be read.
    #[error("Failed to read list configuration: {path}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for a list configuration.
    #[error("Invalid list configuration")]
    ConfigParse {
        #[source]
        source: toml::de::Error,
    },

    /// The source adapter failed while counting or fetching.
    #[error("Source {operation} failed")]
    Source {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DatalistError {
    pub(crate) fn source_failure<E>(operation: &'static str) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |error| Self::Source {
            operation,
            source: Box::new(error),
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingIdColumn => {
                "The list cannot identify its rows because no id column is known.".to_string()
            }
            Self::ConfigIo { path, .. } => {
                format!("Could not read the list configuration at {}", path.display())
            }
            Self::ConfigParse { source } => {
                format!("The list configuration is not valid: {source}")
            }
            Self::Source { operation, source } => {
                format!("The data source failed to {operation}: {source}")
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MissingIdColumn => Some(
                "Configure the id column explicitly or use a source that exposes its primary key."
                    .into(),
            ),
            Self::ConfigIo { .. } => {
                Some("Check that the file exists and you have permission to read it.".into())
            }
            Self::ConfigParse { .. } => {
                Some("Compare the file against the documented list configuration keys.".into())
            }
            Self::Source { .. } => None,
        }
    }
}

/// A restored filter value that a filter control cannot hold.
#[derive(Debug, Error, PartialEq)]
pub enum ControlError {
    #[error("`{value}` is not an option of control `{control}`")]
    UnknownOption { control: String, value: String },

    #[error("control `{control}` cannot hold a {kind} value")]
    IncompatibleValue {
        control: String,
        kind: &'static str,
    },
}

/// Result type alias for datalist operations.
pub type Result<T> = std::result::Result<T, DatalistError>;
