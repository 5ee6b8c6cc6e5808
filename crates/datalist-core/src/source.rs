//! The source capability the engine orchestrates.
//!
//! A [`Source`] is a cloneable, lazily evaluated collection. The engine only
//! ever calls the methods below; it never inspects rows itself, except through
//! the nesting callback and the item-count strategy supplied by the caller.

use datalist_model::{OrderSpec, ParamMap};
use indexmap::IndexMap;

/// Lazily evaluated, cloneable collection.
///
/// `clone` must produce an independent copy: mutating a clone never changes
/// the original. Every composition relies on this.
pub trait Source: Clone {
    /// Materialized row type.
    type Item: Clone;

    /// Error raised while counting or materializing.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Applies native criteria, one `column → value` pair per entry. A list
    /// value means "any of".
    fn filter(&mut self, criteria: &ParamMap);

    /// Appends ordering after any existing order-by.
    fn order_by(&mut self, spec: &OrderSpec);

    /// Replaces the whole order-by; an empty spec clears it.
    fn set_order_by(&mut self, spec: &OrderSpec);

    /// True when an order-by is already set.
    fn has_order_by(&self) -> bool;

    /// Restricts materialization to one 1-based page of `size` rows.
    fn set_page(&mut self, page: u32, size: u32);

    /// Number of rows matching the filters, ignoring any page window.
    fn count(&self) -> Result<usize, Self::Error>;

    /// Materializes the rows, honouring order and page window.
    fn fetch(&self) -> Result<Vec<Self::Item>, Self::Error>;

    /// Number of distinct values of `column` among the matching rows.
    fn count_distinct(&self, column: &str) -> Result<usize, Self::Error> {
        let _ = column;
        self.count()
    }

    /// Whether [`Source::filter`] is meaningful for this source.
    fn supports_native_filter(&self) -> bool {
        false
    }

    /// Declared columns and identity, when the source knows them.
    fn structure(&self) -> Option<&SourceStructure> {
        None
    }

    /// True once the result set has been materialized.
    fn is_loaded(&self) -> bool {
        false
    }
}

/// A column declared by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Public property name, used as the order name.
    pub property: String,
    /// Column identifier inside the source.
    pub name: String,
    /// Column stores one value per locale suffix.
    pub has_mutations: bool,
}

impl ColumnInfo {
    pub fn new(property: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            name: name.into(),
            has_mutations: false,
        }
    }

    pub fn localized(property: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            has_mutations: true,
            ..Self::new(property, name)
        }
    }
}

/// Structural metadata a source may expose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStructure {
    /// Prefix prepended to column names (e.g. a table alias `this.`).
    pub prefix: String,
    pub columns: Vec<ColumnInfo>,
    pub primary_key: Option<String>,
    /// Suffix of the active locale for localized columns.
    pub mutation_suffix: String,
    /// Every locale suffix the source stores.
    pub available_mutations: Vec<String>,
}

impl SourceStructure {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = Some(primary_key.into());
        self
    }

    #[must_use]
    pub fn with_mutations(mut self, active: impl Into<String>, available: Vec<String>) -> Self {
        self.mutation_suffix = active.into();
        self.available_mutations = available;
        self
    }

    /// Order name → column identifier for every declared column.
    ///
    /// Localized columns map their plain property to the active locale and
    /// additionally expose `property + suffix` for every stored locale.
    pub fn order_columns(&self) -> IndexMap<String, String> {
        let mut columns = IndexMap::new();
        for column in &self.columns {
            let qualified = format!("{}{}", self.prefix, column.name);
            if !column.has_mutations {
                columns.insert(column.property.clone(), qualified);
                continue;
            }
            columns.insert(
                column.property.clone(),
                format!("{qualified}{}", self.mutation_suffix),
            );
            for suffix in &self.available_mutations {
                columns.insert(
                    format!("{}{suffix}", column.property),
                    format!("{qualified}{suffix}"),
                );
            }
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_columns_are_prefixed() {
        let structure = SourceStructure::new(vec![
            ColumnInfo::new("id", "uuid"),
            ColumnInfo::new("createdAt", "created_at"),
        ])
        .with_prefix("this.");

        let columns = structure.order_columns();
        assert_eq!(columns["id"], "this.uuid");
        assert_eq!(columns["createdAt"], "this.created_at");
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn localized_columns_expose_every_suffix() {
        let structure = SourceStructure::new(vec![ColumnInfo::localized("name", "name")])
            .with_prefix("this.")
            .with_mutations("_cs", vec!["_cs".into(), "_en".into()]);

        let columns = structure.order_columns();
        assert_eq!(columns["name"], "this.name_cs");
        assert_eq!(columns["name_cs"], "this.name_cs");
        assert_eq!(columns["name_en"], "this.name_en");
    }
}
