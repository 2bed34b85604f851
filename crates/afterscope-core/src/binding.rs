//! Control bindings: translating UI control positions to and from the store.
//!
//! Every on-screen control is represented by a [`ControlBinding`]. The
//! binding owns the control's position (what the widget currently shows) and
//! knows how to turn that position into a parameter write, and how to move
//! the position back to match the store.
//!
//! ```text
//!  widget ──push──► binding.position ──apply_to_store──► ParameterStore
//!     ▲                                                        │
//!     └────────────pull───── binding.position ◄─set_from_store─┘
//! ```
//!
//! Four variants cover every control in the explorer:
//!
//! - [`LinearBinding`] — slider whose position is the model value
//! - [`LogBinding`] — slider whose position is the base-10 exponent
//! - [`DiscreteBinding`] — radio selector mapping a label to a variant tag
//! - [`OverrideBinding`] — toggle that forces a numeric parameter to a fixed
//!   value while off, composed with the slider it overrides

use core::fmt;

use crate::error::{BindingError, ConfigurationError, DomainError};
use crate::param_info::{Domain, ParamDescriptor, ParamScale, ParamValue};
use crate::store::ParameterStore;

/// Raw input delivered by a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Slider position.
    Number(f64),
    /// Selected radio label.
    Label(String),
    /// Checkbox state.
    Flag(bool),
}

impl RawValue {
    /// Name of the input kind, for error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            RawValue::Number(_) => "number",
            RawValue::Label(_) => "label",
            RawValue::Flag(_) => "flag",
        }
    }

    /// Returns the slider position, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(v) => write!(f, "{v}"),
            RawValue::Label(l) => f.write_str(l),
            RawValue::Flag(b) => write!(f, "{}", if *b { "on" } else { "off" }),
        }
    }
}

/// Uniform interface over every control kind.
pub trait ControlBinding: fmt::Debug {
    /// Id of the primary control this binding owns.
    fn control_id(&self) -> &str;

    /// Name of the parameter the primary control drives.
    fn parameter(&self) -> &str;

    /// Returns `true` if `control` is owned by this binding.
    ///
    /// Composite bindings own more than one control.
    fn owns(&self, control: &str) -> bool {
        self.control_id() == control
    }

    /// Current position of the primary control.
    fn pull(&self) -> RawValue;

    /// Current position of any owned control.
    fn position_of(&self, control: &str) -> Option<RawValue> {
        self.owns(control).then(|| self.pull())
    }

    /// Moves an owned control, as the widget layer would.
    ///
    /// Does not touch the store; call [`apply_to_store`](Self::apply_to_store)
    /// afterwards.
    fn push(&mut self, control: &str, raw: RawValue) -> Result<(), BindingError>;

    /// Converts the current position and writes it to the store.
    fn apply_to_store(&self, store: &mut ParameterStore) -> Result<(), DomainError>;

    /// Repositions the control(s) to reflect the store.
    fn set_from_store(&mut self, store: &ParameterStore);
}

/// Position and bounds of a slider, in control space.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Increment the slider snaps to.
    pub step: Option<f64>,
    /// Current position.
    pub position: f64,
}

impl Slider {
    /// Creates a slider at `position`.
    pub fn new(min: f64, max: f64, step: Option<f64>, position: f64) -> Self {
        Self {
            min,
            max,
            step,
            position,
        }
    }

    /// Snaps `raw` to the step grid anchored at `min`, kept inside the bounds.
    ///
    /// Values already on the grid are kept bit-exact. When the range is not a
    /// whole number of steps the last grid point past `max` becomes `max`.
    pub fn snap(&self, raw: f64) -> f64 {
        match self.step {
            Some(step) if raw.is_finite() => {
                let snapped = self.min + ((raw - self.min) / step).round() * step;
                if (snapped - raw).abs() <= step * 1e-6 {
                    raw
                } else {
                    snapped.clamp(self.min, self.max)
                }
            }
            _ => raw,
        }
    }

    /// Moves the slider to `raw`, snapped to the step grid.
    ///
    /// A position outside the bounds is rejected before snapping and the
    /// slider stays where it was.
    pub fn move_to(&mut self, param: &str, raw: f64) -> Result<(), DomainError> {
        if !(raw.is_finite() && raw >= self.min && raw <= self.max) {
            return Err(DomainError::OutOfRange {
                param: param.to_string(),
                value: raw,
                min: self.min,
                max: self.max,
            });
        }
        self.position = self.snap(raw);
        Ok(())
    }

    /// Returns `true` if the position lies within the bounds.
    pub fn in_bounds(&self) -> bool {
        self.position.is_finite() && self.position >= self.min && self.position <= self.max
    }

    fn out_of_range(&self, param: &str) -> DomainError {
        DomainError::OutOfRange {
            param: param.to_string(),
            value: self.position,
            min: self.min,
            max: self.max,
        }
    }
}

fn numeric_slider(
    control_id: &str,
    desc: &ParamDescriptor,
    expected: ParamScale,
) -> Result<Slider, ConfigurationError> {
    let incompatible = |reason: &str| ConfigurationError::IncompatibleBinding {
        control: control_id.to_string(),
        param: desc.name.clone(),
        reason: reason.to_string(),
    };
    match desc.domain {
        Domain::Continuous { min, max, scale } if scale == expected => {
            let default = desc
                .default
                .as_number()
                .and_then(|v| scale.to_control(v))
                .ok_or_else(|| incompatible("default has no control-space position"))?;
            Ok(Slider::new(min, max, desc.step, default))
        }
        Domain::Continuous { .. } => Err(incompatible(match expected {
            ParamScale::Linear => "parameter is not linear",
            ParamScale::Log10 => "parameter is not log-scaled",
        })),
        _ => Err(incompatible("parameter is not continuous")),
    }
}

fn wrong_kind(control: &str, expected: &'static str, raw: &RawValue) -> BindingError {
    BindingError::WrongKind {
        control: control.to_string(),
        expected,
        found: raw.kind(),
    }
}

/// Slider whose position is the model value.
#[derive(Debug, Clone)]
pub struct LinearBinding {
    control_id: String,
    parameter: String,
    slider: Slider,
}

impl LinearBinding {
    /// Binds `control_id` to a linear continuous parameter.
    pub fn new(
        control_id: impl Into<String>,
        desc: &ParamDescriptor,
    ) -> Result<Self, ConfigurationError> {
        let control_id = control_id.into();
        let slider = numeric_slider(&control_id, desc, ParamScale::Linear)?;
        Ok(Self {
            control_id,
            parameter: desc.name.clone(),
            slider,
        })
    }

    /// Slider state.
    pub fn slider(&self) -> &Slider {
        &self.slider
    }
}

impl ControlBinding for LinearBinding {
    fn control_id(&self) -> &str {
        &self.control_id
    }

    fn parameter(&self) -> &str {
        &self.parameter
    }

    fn pull(&self) -> RawValue {
        RawValue::Number(self.slider.position)
    }

    fn push(&mut self, control: &str, raw: RawValue) -> Result<(), BindingError> {
        if control != self.control_id {
            return Err(BindingError::UnknownControl(control.to_string()));
        }
        let value = raw
            .as_number()
            .ok_or_else(|| wrong_kind(control, "number", &raw))?;
        self.slider.move_to(&self.parameter, value)?;
        Ok(())
    }

    fn apply_to_store(&self, store: &mut ParameterStore) -> Result<(), DomainError> {
        if !self.slider.in_bounds() {
            return Err(self.slider.out_of_range(&self.parameter));
        }
        store.set(&self.parameter, ParamValue::Number(self.slider.position))
    }

    fn set_from_store(&mut self, store: &ParameterStore) {
        if let Some(value) = store.number(&self.parameter)
            && store
                .descriptor(&self.parameter)
                .is_some_and(|d| d.domain.admits(&ParamValue::Number(value)))
        {
            self.slider.position = value;
        }
    }
}

/// Slider whose position is the base-10 exponent of the model value.
///
/// Bounds are declared in exponent space. A position outside them is a
/// [`DomainError`]; it is never clamped.
#[derive(Debug, Clone)]
pub struct LogBinding {
    control_id: String,
    parameter: String,
    slider: Slider,
}

impl LogBinding {
    /// Binds `control_id` to a log-scaled continuous parameter.
    pub fn new(
        control_id: impl Into<String>,
        desc: &ParamDescriptor,
    ) -> Result<Self, ConfigurationError> {
        let control_id = control_id.into();
        let slider = numeric_slider(&control_id, desc, ParamScale::Log10)?;
        Ok(Self {
            control_id,
            parameter: desc.name.clone(),
            slider,
        })
    }

    /// Slider state.
    pub fn slider(&self) -> &Slider {
        &self.slider
    }
}

impl ControlBinding for LogBinding {
    fn control_id(&self) -> &str {
        &self.control_id
    }

    fn parameter(&self) -> &str {
        &self.parameter
    }

    fn pull(&self) -> RawValue {
        RawValue::Number(self.slider.position)
    }

    fn push(&mut self, control: &str, raw: RawValue) -> Result<(), BindingError> {
        if control != self.control_id {
            return Err(BindingError::UnknownControl(control.to_string()));
        }
        let value = raw
            .as_number()
            .ok_or_else(|| wrong_kind(control, "number", &raw))?;
        self.slider.move_to(&self.parameter, value)?;
        Ok(())
    }

    fn apply_to_store(&self, store: &mut ParameterStore) -> Result<(), DomainError> {
        if !self.slider.in_bounds() {
            return Err(self.slider.out_of_range(&self.parameter));
        }
        let value = ParamScale::Log10.to_model(self.slider.position);
        store.set(&self.parameter, ParamValue::Number(value))
    }

    fn set_from_store(&mut self, store: &ParameterStore) {
        // An override value (e.g. zero) has no exponent; keep the position.
        if let Some(exp) = store
            .number(&self.parameter)
            .and_then(|v| ParamScale::Log10.to_control(v))
            && exp.is_finite()
        {
            self.slider.position = exp;
        }
    }
}

/// One entry of a radio selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Label shown on the radio button.
    pub label: String,
    /// Variant tag written to the store.
    pub tag: String,
}

impl ChoiceOption {
    /// Creates an option.
    pub fn new(label: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tag: tag.into(),
        }
    }
}

/// Radio selector mapping a label to a fixed variant tag.
#[derive(Debug, Clone)]
pub struct DiscreteBinding {
    control_id: String,
    parameter: String,
    options: Vec<ChoiceOption>,
    selected: usize,
}

impl DiscreteBinding {
    /// Binds `control_id` to a discrete parameter.
    ///
    /// Every option tag must be a declared variant, and the parameter's
    /// default must be one of the option tags.
    pub fn new(
        control_id: impl Into<String>,
        desc: &ParamDescriptor,
        options: Vec<ChoiceOption>,
    ) -> Result<Self, ConfigurationError> {
        let control_id = control_id.into();
        let incompatible = |reason: String| ConfigurationError::IncompatibleBinding {
            control: control_id.clone(),
            param: desc.name.clone(),
            reason,
        };

        let Domain::Discrete { variants } = &desc.domain else {
            return Err(incompatible("parameter is not discrete".to_string()));
        };
        if options.is_empty() {
            return Err(incompatible("selector has no options".to_string()));
        }
        for (i, option) in options.iter().enumerate() {
            if !variants.contains(&option.tag) {
                return Err(incompatible(format!("'{}' is not a declared variant", option.tag)));
            }
            if options[..i].iter().any(|o| o.label == option.label) {
                return Err(incompatible(format!("duplicate label '{}'", option.label)));
            }
        }
        let default_tag = desc.default.as_variant().unwrap_or_default();
        let selected = options
            .iter()
            .position(|o| o.tag == default_tag)
            .ok_or_else(|| incompatible(format!("default '{default_tag}' has no option")))?;

        Ok(Self {
            parameter: desc.name.clone(),
            control_id,
            options,
            selected,
        })
    }

    /// Declared options in display order.
    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    /// Currently selected option.
    pub fn selected(&self) -> &ChoiceOption {
        &self.options[self.selected]
    }
}

impl ControlBinding for DiscreteBinding {
    fn control_id(&self) -> &str {
        &self.control_id
    }

    fn parameter(&self) -> &str {
        &self.parameter
    }

    fn pull(&self) -> RawValue {
        RawValue::Label(self.selected().label.clone())
    }

    fn push(&mut self, control: &str, raw: RawValue) -> Result<(), BindingError> {
        if control != self.control_id {
            return Err(BindingError::UnknownControl(control.to_string()));
        }
        let RawValue::Label(label) = &raw else {
            return Err(wrong_kind(control, "label", &raw));
        };
        self.selected = self
            .options
            .iter()
            .position(|o| &o.label == label)
            .ok_or_else(|| DomainError::UnknownVariant {
                param: self.parameter.clone(),
                variant: label.clone(),
            })?;
        Ok(())
    }

    fn apply_to_store(&self, store: &mut ParameterStore) -> Result<(), DomainError> {
        store.set(
            &self.parameter,
            ParamValue::Variant(self.selected().tag.clone()),
        )
    }

    fn set_from_store(&mut self, store: &ParameterStore) {
        if let Some(tag) = store.variant(&self.parameter)
            && let Some(i) = self.options.iter().position(|o| o.tag == tag)
        {
            self.selected = i;
        }
    }
}

/// Toggle composed with a numeric binding.
///
/// While enabled, the inner slider drives the dependent parameter. While
/// disabled, the dependent parameter is forced to the override value; the
/// slider stays interactive and keeps its own position, so re-enabling
/// restores whatever the slider shows.
#[derive(Debug)]
pub struct OverrideBinding {
    toggle_id: String,
    flag_parameter: String,
    dependent: String,
    override_value: f64,
    enabled: bool,
    inner: Box<dyn ControlBinding>,
}

impl OverrideBinding {
    /// Composes a toggle control with the binding of the slider it overrides.
    ///
    /// `flag` must be a flag parameter; `dependent` must declare an override
    /// value and be the parameter `inner` drives.
    pub fn new(
        toggle_id: impl Into<String>,
        flag: &ParamDescriptor,
        dependent: &ParamDescriptor,
        inner: Box<dyn ControlBinding>,
    ) -> Result<Self, ConfigurationError> {
        let toggle_id = toggle_id.into();
        let incompatible = |param: &str, reason: &str| ConfigurationError::IncompatibleBinding {
            control: toggle_id.clone(),
            param: param.to_string(),
            reason: reason.to_string(),
        };

        let Some(enabled) = flag.default.as_flag() else {
            return Err(incompatible(&flag.name, "toggle parameter is not a flag"));
        };
        let Some(override_value) = dependent.override_value else {
            return Err(incompatible(&dependent.name, "parameter declares no override value"));
        };
        if inner.parameter() != dependent.name {
            return Err(incompatible(
                &dependent.name,
                "inner control drives a different parameter",
            ));
        }
        if inner.owns(&toggle_id) {
            return Err(ConfigurationError::DuplicateControl(toggle_id));
        }

        Ok(Self {
            flag_parameter: flag.name.clone(),
            dependent: dependent.name.clone(),
            toggle_id,
            override_value,
            enabled,
            inner,
        })
    }

    /// Name of the flag parameter holding the toggle state.
    pub fn flag_parameter(&self) -> &str {
        &self.flag_parameter
    }

    /// Whether the slider currently drives the dependent parameter.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Value forced while disabled.
    pub fn override_value(&self) -> f64 {
        self.override_value
    }

    /// The composed slider binding.
    pub fn inner(&self) -> &dyn ControlBinding {
        self.inner.as_ref()
    }
}

impl ControlBinding for OverrideBinding {
    fn control_id(&self) -> &str {
        &self.toggle_id
    }

    fn parameter(&self) -> &str {
        &self.dependent
    }

    fn owns(&self, control: &str) -> bool {
        control == self.toggle_id || self.inner.owns(control)
    }

    fn pull(&self) -> RawValue {
        RawValue::Flag(self.enabled)
    }

    fn position_of(&self, control: &str) -> Option<RawValue> {
        if control == self.toggle_id {
            Some(self.pull())
        } else {
            self.inner.position_of(control)
        }
    }

    fn push(&mut self, control: &str, raw: RawValue) -> Result<(), BindingError> {
        if control == self.toggle_id {
            let RawValue::Flag(enabled) = &raw else {
                return Err(wrong_kind(control, "flag", &raw));
            };
            self.enabled = *enabled;
            Ok(())
        } else {
            self.inner.push(control, raw)
        }
    }

    fn apply_to_store(&self, store: &mut ParameterStore) -> Result<(), DomainError> {
        // Dependent first: if the slider is rejected the flag stays as it was.
        if self.enabled {
            self.inner.apply_to_store(store)?;
        } else {
            store.set(&self.dependent, ParamValue::Number(self.override_value))?;
        }
        store.set(&self.flag_parameter, ParamValue::Flag(self.enabled))
    }

    fn set_from_store(&mut self, store: &ParameterStore) {
        if let Some(enabled) = store.flag(&self.flag_parameter) {
            self.enabled = enabled;
        }
        if self.enabled {
            self.inner.set_from_store(store);
        }
    }
}
