//! Filter controls: typed inputs bound to filter expressions.
//!
//! Registering a control registers its filter expression at the same time,
//! so a filter form and the list always agree on the set of filter names.
//! Restored filter values are pushed back into the controls before a form is
//! rendered; a value a control cannot hold is dropped and the control keeps
//! its default.

use datalist_model::ParamValue;
use indexmap::IndexMap;

use crate::datalist::Datalist;
use crate::error::ControlError;
use crate::expression::FilterExpression;
use crate::source::Source;

/// Option value → label.
pub type ControlOptions = IndexMap<String, String>;

/// The kind of input a filter is edited with.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterControlKind {
    Text,
    Integer,
    Checkbox,
    Hidden,
    Select { options: ControlOptions },
    MultiSelect { options: ControlOptions },
}

impl FilterControlKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Checkbox => "checkbox",
            Self::Hidden => "hidden",
            Self::Select { .. } => "select",
            Self::MultiSelect { .. } => "multi-select",
        }
    }
}

/// A filter input and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl {
    name: String,
    kind: FilterControlKind,
    label: Option<String>,
    default_value: Option<ParamValue>,
    value: Option<ParamValue>,
}

impl FilterControl {
    pub fn new(name: impl Into<String>, kind: FilterControlKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            default_value: None,
            value: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: Option<ParamValue>) -> Self {
        self.default_value = value;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FilterControlKind {
        &self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn default_value(&self) -> Option<&ParamValue> {
        self.default_value.as_ref()
    }

    /// Current value, or the default when none was set.
    pub fn value(&self) -> Option<&ParamValue> {
        self.value.as_ref().or(self.default_value.as_ref())
    }

    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Sets the control value after checking it fits the control kind.
    /// On error the previous value is kept.
    pub fn set_value(&mut self, value: &ParamValue) -> Result<(), ControlError> {
        self.value = Some(self.coerce(value)?);
        Ok(())
    }

    fn coerce(&self, value: &ParamValue) -> Result<ParamValue, ControlError> {
        let incompatible = || ControlError::IncompatibleValue {
            control: self.name.clone(),
            kind: value.kind(),
        };

        match &self.kind {
            FilterControlKind::Text | FilterControlKind::Hidden => {
                if value.is_scalar() {
                    Ok(ParamValue::Text(value.to_string()))
                } else {
                    Err(incompatible())
                }
            }
            FilterControlKind::Integer => value
                .as_int()
                .map(ParamValue::Int)
                .ok_or_else(incompatible),
            FilterControlKind::Checkbox => match value {
                ParamValue::Bool(checked) => Ok(ParamValue::Bool(*checked)),
                ParamValue::Int(v) => Ok(ParamValue::Bool(*v != 0)),
                ParamValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "on" | "yes" => Ok(ParamValue::Bool(true)),
                    "" | "0" | "false" | "off" | "no" => Ok(ParamValue::Bool(false)),
                    _ => Err(incompatible()),
                },
                _ => Err(incompatible()),
            },
            FilterControlKind::Select { options } => {
                if !value.is_scalar() {
                    return Err(incompatible());
                }
                self.check_option(options, value)?;
                Ok(value.clone())
            }
            FilterControlKind::MultiSelect { options } => {
                let items = match value {
                    ParamValue::List(items) => items.clone(),
                    ParamValue::Map(_) => return Err(incompatible()),
                    scalar => vec![scalar.clone()],
                };
                for item in &items {
                    if !item.is_scalar() {
                        return Err(incompatible());
                    }
                    self.check_option(options, item)?;
                }
                Ok(ParamValue::List(items))
            }
        }
    }

    fn check_option(&self, options: &ControlOptions, value: &ParamValue) -> Result<(), ControlError> {
        let key = value.to_string();
        if options.contains_key(&key) {
            Ok(())
        } else {
            Err(ControlError::UnknownOption {
                control: self.name.clone(),
                value: key,
            })
        }
    }
}

impl<S: Source> Datalist<S> {
    /// Registers a filter expression together with the control that edits it.
    /// A control registered under an existing name replaces the old one.
    pub fn register_filter_control<F>(
        &mut self,
        kind: FilterControlKind,
        name: impl Into<String>,
        transform: F,
        default_value: Option<ParamValue>,
        label: Option<&str>,
    ) -> &mut FilterControl
    where
        F: Fn(&mut S, &ParamValue) + 'static,
    {
        let name = name.into();
        self.expressions.add_filter(
            name.clone(),
            FilterExpression::new(transform, default_value.clone()),
        );
        self.invalidate();

        let mut control = FilterControl::new(name.clone(), kind).with_default(default_value);
        if let Some(label) = label {
            control = control.with_label(label);
        }

        match self.controls.entry(name) {
            indexmap::map::Entry::Occupied(mut entry) => {
                entry.insert(control);
                entry.into_mut()
            }
            indexmap::map::Entry::Vacant(entry) => entry.insert(control),
        }
    }

    pub fn filter_control(&self, name: &str) -> Option<&FilterControl> {
        self.controls.get(name)
    }

    pub fn filter_controls(&self) -> impl Iterator<Item = &FilterControl> {
        self.controls.values()
    }

    /// Pushes restored filter values into their controls.
    ///
    /// Values equal to the filter default are skipped. Returns the number of
    /// controls that took a value.
    pub fn bind_filter_controls(&mut self) -> usize {
        let mut bound = 0;
        for control in self.controls.values_mut() {
            control.reset();
            let Some(value) = self.state.filters.get(control.name()) else {
                continue;
            };
            if self.expressions.is_default(control.name(), value) {
                continue;
            }
            match control.set_value(value) {
                Ok(()) => bound += 1,
                Err(error) => {
                    tracing::debug!(control = control.name(), %error, "Filter value rejected by control");
                }
            }
        }
        bound
    }
}
