//! List configuration.
//!
//! Defaults that shape every request: page size, default order, tie-breaking
//! secondary order and canonical parameter output. Loadable from TOML:
//!
//! ```toml
//! default_on_page = 20
//! default_order = "createdAt"
//! default_direction = "DESC"
//! auto_canonicalize = true
//!
//! [secondary_order]
//! id = "ASC"
//! ```

use std::path::Path;

use datalist_model::{Direction, OrderSpec, OrderToken};
use serde::{Deserialize, Serialize};

use crate::error::{DatalistError, Result};

/// Configuration for one list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Page size when the request does not choose one. `None` shows every
    /// row on a single page.
    pub default_on_page: Option<u32>,

    /// Order name used when the request carries no order token.
    pub default_order: Option<String>,

    /// Direction paired with `default_order`.
    pub default_direction: Direction,

    /// Tie-breaking order appended after the primary order.
    pub secondary_order: OrderSpec,

    /// Omit `page`, `onpage` and `order` from outbound parameters when they
    /// equal their defaults.
    pub auto_canonicalize: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            default_on_page: None,
            default_order: None,
            default_direction: Direction::Asc,
            secondary_order: OrderSpec::new(),
            auto_canonicalize: false,
        }
    }
}

impl ListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| DatalistError::ConfigParse { source })
    }

    /// Read a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DatalistError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded list configuration");
        Ok(config)
    }

    #[must_use]
    pub fn with_default_on_page(mut self, on_page: Option<u32>) -> Self {
        self.default_on_page = on_page;
        self
    }

    #[must_use]
    pub fn with_default_order(mut self, name: impl Into<String>, direction: Direction) -> Self {
        self.default_order = Some(name.into());
        self.default_direction = direction;
        self
    }

    #[must_use]
    pub fn with_secondary_order(mut self, order: OrderSpec) -> Self {
        self.secondary_order = order;
        self
    }

    #[must_use]
    pub fn with_auto_canonicalize(mut self, enabled: bool) -> Self {
        self.auto_canonicalize = enabled;
        self
    }

    /// The default order in token form, if a default order is configured.
    pub fn default_order_token(&self) -> Option<OrderToken> {
        self.default_order
            .as_ref()
            .map(|name| OrderToken::new(name.clone(), self.default_direction))
    }
}
