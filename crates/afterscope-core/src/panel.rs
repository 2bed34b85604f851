//! The set of controls shown next to the plot.
//!
//! [`ControlPanel`] holds every [`ControlBinding`] in display order and routes
//! widget input to the binding that owns the control. Control ids are unique
//! across the panel, including the extra controls owned by composite
//! bindings.

use crate::binding::{ControlBinding, RawValue};
use crate::error::{BindingError, ConfigurationError};
use crate::store::ParameterStore;

/// Ordered collection of control bindings.
#[derive(Debug, Default)]
pub struct ControlPanel {
    bindings: Vec<Box<dyn ControlBinding>>,
    control_ids: Vec<String>,
}

impl ControlPanel {
    /// Creates an empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding. `controls` lists every control id the binding owns.
    ///
    /// Fails if a control id is already taken or the binding does not own
    /// one of the listed ids.
    pub fn add(
        &mut self,
        binding: Box<dyn ControlBinding>,
        controls: &[&str],
    ) -> Result<(), ConfigurationError> {
        for &control in controls {
            if self.control_ids.iter().any(|c| c == control) {
                return Err(ConfigurationError::DuplicateControl(control.to_string()));
            }
            if !binding.owns(control) {
                return Err(ConfigurationError::IncompatibleBinding {
                    control: control.to_string(),
                    param: binding.parameter().to_string(),
                    reason: "binding does not own this control".to_string(),
                });
            }
        }
        self.control_ids
            .extend(controls.iter().map(|c| (*c).to_string()));
        self.bindings.push(binding);
        Ok(())
    }

    /// Adds a binding that owns a single control.
    pub fn add_single(&mut self, binding: Box<dyn ControlBinding>) -> Result<(), ConfigurationError> {
        let id = binding.control_id().to_string();
        self.add(binding, &[&id])
    }

    /// Checks every binding against the store.
    ///
    /// Fails if a binding drives a parameter the store does not declare.
    pub fn validate(&self, store: &ParameterStore) -> Result<(), ConfigurationError> {
        for b in &self.bindings {
            if !store.contains(b.parameter()) {
                return Err(ConfigurationError::UnboundParameter {
                    control: b.control_id().to_string(),
                    param: b.parameter().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the panel has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Every control id, in registration order.
    pub fn control_ids(&self) -> impl Iterator<Item = &str> {
        self.control_ids.iter().map(String::as_str)
    }

    /// Iterates bindings in display order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ControlBinding> {
        self.bindings.iter().map(|b| b.as_ref())
    }

    /// Binding that owns `control`.
    pub fn find(&self, control: &str) -> Option<&dyn ControlBinding> {
        self.bindings
            .iter()
            .find(|b| b.owns(control))
            .map(|b| b.as_ref())
    }

    /// Current position of a control.
    pub fn position(&self, control: &str) -> Option<RawValue> {
        self.find(control).and_then(|b| b.position_of(control))
    }

    /// Moves a control and writes the result to the store.
    ///
    /// On a rejected write the control snaps back to the store's value, so the
    /// panel never shows a position the store refused.
    pub fn input(
        &mut self,
        store: &mut ParameterStore,
        control: &str,
        raw: RawValue,
    ) -> Result<(), BindingError> {
        let binding = self
            .bindings
            .iter_mut()
            .find(|b| b.owns(control))
            .ok_or_else(|| BindingError::UnknownControl(control.to_string()))?;

        let result = binding
            .push(control, raw)
            .and_then(|()| binding.apply_to_store(store).map_err(BindingError::from));
        if result.is_err() {
            binding.set_from_store(store);
        }
        result
    }

    /// Repositions every control to reflect the store.
    pub fn sync_from_store(&mut self, store: &ParameterStore) {
        for b in &mut self.bindings {
            b.set_from_store(store);
        }
    }

    /// Writes every control's position to the store.
    ///
    /// Stops at the first rejected write.
    pub fn apply_all(&self, store: &mut ParameterStore) -> Result<(), BindingError> {
        for b in &self.bindings {
            b.apply_to_store(store)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{LinearBinding, LogBinding};
    use crate::param_info::ParamDescriptor;

    fn setup() -> (ParameterStore, ControlPanel) {
        let store = ParameterStore::new([
            ParamDescriptor::log10("E0", 48.0, 55.0, 51.0),
            ParamDescriptor::linear("p", 2.0, 3.0, 2.2),
        ])
        .unwrap();
        let mut panel = ControlPanel::new();
        panel
            .add_single(Box::new(
                LogBinding::new("log10_E0", store.descriptor("E0").unwrap()).unwrap(),
            ))
            .unwrap();
        panel
            .add_single(Box::new(
                LinearBinding::new("p", store.descriptor("p").unwrap()).unwrap(),
            ))
            .unwrap();
        (store, panel)
    }

    #[test]
    fn routes_input_to_owner() {
        let (mut store, mut panel) = setup();
        panel
            .input(&mut store, "p", RawValue::Number(2.6))
            .unwrap();
        assert_eq!(store.number("p"), Some(2.6));
        assert_eq!(panel.position("p"), Some(RawValue::Number(2.6)));
    }

    #[test]
    fn rejected_input_snaps_control_back() {
        let (mut store, mut panel) = setup();
        panel
            .input(&mut store, "log10_E0", RawValue::Number(52.0))
            .unwrap();
        let err = panel
            .input(&mut store, "log10_E0", RawValue::Number(55.5))
            .unwrap_err();
        assert!(matches!(err, BindingError::Domain(_)));
        let pos = panel.position("log10_E0").and_then(|r| r.as_number()).unwrap();
        assert!((pos - 52.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_control_is_reported() {
        let (mut store, mut panel) = setup();
        let err = panel
            .input(&mut store, "nope", RawValue::Number(1.0))
            .unwrap_err();
        assert_eq!(err, BindingError::UnknownControl("nope".into()));
    }

    #[test]
    fn duplicate_control_ids_are_rejected() {
        let (store, mut panel) = setup();
        let again = LinearBinding::new("p", store.descriptor("p").unwrap()).unwrap();
        assert_eq!(
            panel.add_single(Box::new(again)).unwrap_err(),
            ConfigurationError::DuplicateControl("p".into())
        );
    }

    #[test]
    fn validate_catches_unbound_parameter() {
        let (_, panel) = setup();
        let other = ParameterStore::new([ParamDescriptor::linear("p", 2.0, 3.0, 2.2)]).unwrap();
        assert!(matches!(
            panel.validate(&other),
            Err(ConfigurationError::UnboundParameter { .. })
        ));
    }
}
