//! Canonical parameter state.
//!
//! [`ParameterStore`] is the single source of truth for the current value of
//! every declared parameter. Controls write into it through their bindings;
//! the recompute controller reads it through [`ParameterSnapshot`]s.
//!
//! The store never rescales a value: whatever is written must already be in
//! model space. A write that the domain does not admit is rejected and the
//! previous value is kept.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ConfigurationError, DomainError};
use crate::param_info::{Domain, ParamDescriptor, ParamScale, ParamValue};

/// Mapping from parameter name to current value, with declared defaults.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    descriptors: Vec<ParamDescriptor>,
    values: Vec<ParamValue>,
    index: HashMap<String, usize>,
    dirty: bool,
}

impl ParameterStore {
    /// Builds a store from declared parameters, each starting at its default.
    ///
    /// Fails if a descriptor is malformed or two share a name.
    pub fn new(
        descriptors: impl IntoIterator<Item = ParamDescriptor>,
    ) -> Result<Self, ConfigurationError> {
        let descriptors: Vec<ParamDescriptor> = descriptors.into_iter().collect();
        let mut index = HashMap::with_capacity(descriptors.len());

        for (i, desc) in descriptors.iter().enumerate() {
            desc.validate()?;
            if index.insert(desc.name.clone(), i).is_some() {
                return Err(ConfigurationError::DuplicateParameter(desc.name.clone()));
            }
        }

        let values = descriptors.iter().map(|d| d.default.clone()).collect();
        Ok(Self {
            descriptors,
            values,
            index,
            dirty: true,
        })
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if no parameters are declared.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Returns `true` if `name` is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Current value of a parameter.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.index.get(name).map(|&i| &self.values[i])
    }

    /// Current numeric value of a parameter, if it is a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_number)
    }

    /// Current variant tag of a parameter, if it is a variant.
    pub fn variant(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_variant)
    }

    /// Current flag of a parameter, if it is a flag.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_flag)
    }

    /// Descriptor of a parameter.
    pub fn descriptor(&self, name: &str) -> Option<&ParamDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    /// Iterates `(descriptor, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParamDescriptor, &ParamValue)> {
        self.descriptors.iter().zip(self.values.iter())
    }

    /// Writes a model-space value.
    ///
    /// Marks the store dirty on success; does not trigger any recompute.
    /// On failure the previous value is kept.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), DomainError> {
        let &i = self
            .index
            .get(name)
            .ok_or_else(|| DomainError::UnknownParameter(name.to_string()))?;
        let desc = &self.descriptors[i];

        if !desc.admits(&value) {
            return Err(rejection(desc, &value));
        }

        self.values[i] = value;
        self.dirty = true;
        Ok(())
    }

    /// Takes an immutable copy of every current value.
    pub fn snapshot(&self) -> ParameterSnapshot {
        let entries: Vec<(String, ParamValue)> = self
            .descriptors
            .iter()
            .zip(self.values.iter())
            .map(|(d, v)| (d.name.clone(), v.clone()))
            .collect();
        ParameterSnapshot {
            entries: entries.into(),
        }
    }

    /// Restores every parameter to its declared default.
    pub fn reset_to_defaults(&mut self) {
        for (value, desc) in self.values.iter_mut().zip(self.descriptors.iter()) {
            value.clone_from(&desc.default);
        }
        self.dirty = true;
    }

    /// Returns `true` if a write happened since the last [`mark_clean`](Self::mark_clean).
    ///
    /// A freshly built store is dirty so the first recompute always runs.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Builds the error for a value the descriptor rejected.
fn rejection(desc: &ParamDescriptor, value: &ParamValue) -> DomainError {
    match (&desc.domain, value) {
        (Domain::Continuous { min, max, scale }, ParamValue::Number(v)) => {
            let shown = match scale {
                ParamScale::Linear => *v,
                ParamScale::Log10 => scale.to_control(*v).unwrap_or(f64::NEG_INFINITY),
            };
            DomainError::OutOfRange {
                param: desc.name.clone(),
                value: shown,
                min: *min,
                max: *max,
            }
        }
        (Domain::Discrete { .. }, ParamValue::Variant(tag)) => DomainError::UnknownVariant {
            param: desc.name.clone(),
            variant: tag.clone(),
        },
        (domain, value) => DomainError::WrongKind {
            param: desc.name.clone(),
            expected: domain.kind(),
            found: value.kind(),
        },
    }
}

/// Immutable copy of all parameter values taken at one instant.
///
/// Cloning is cheap (shared storage). Two snapshots compare equal when they
/// hold the same values in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot {
    entries: Arc<[(String, ParamValue)]>,
}

impl ParameterSnapshot {
    /// Builds a snapshot from explicit entries.
    ///
    /// Mostly useful for driving a [`Model`](crate::Model) outside a session.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, ParamValue)>) -> Self {
        let entries: Vec<_> = entries.into_iter().collect();
        Self {
            entries: entries.into(),
        }
    }

    /// Value of a parameter.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Numeric value of a parameter.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_number)
    }

    /// Variant tag of a parameter.
    pub fn variant(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_variant)
    }

    /// Flag value of a parameter.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_flag)
    }

    /// Iterates `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
