//! Parameter descriptors for the explorable model parameters.
//!
//! Each model parameter is described by a [`ParamDescriptor`] carrying its
//! display metadata, its [`Domain`], and its default value. Descriptors are
//! declared once by the default configuration and never change afterwards.
//!
//! # Control space and model space
//!
//! Sliders for quantities spanning many decades (energies, densities,
//! microphysical fractions) move the base-10 exponent rather than the value
//! itself. For those parameters the domain bounds are declared in *control
//! space* (exponents) while the store and the model only ever see *model
//! space* values:
//!
//! - **Linear**: `model = control`
//! - **Log10**: `model = 10^control`
//!
//! # Example
//!
//! ```rust
//! use afterscope_core::{ParamDescriptor, ParamScale, ParamValue};
//!
//! let e0 = ParamDescriptor::log10("E0", 48.0, 55.0, 51.0).with_label("log10 E0");
//! assert_eq!(e0.scale(), Some(ParamScale::Log10));
//! assert!(e0.admits(&ParamValue::Number(1e52)));
//! assert!(!e0.admits(&ParamValue::Number(1e56)));
//! ```

use core::fmt;

use crate::error::ConfigurationError;

/// Tolerance applied in exponent space when checking log-scaled values.
///
/// `10^x` followed by `log10` does not always round-trip exactly; a model
/// value whose exponent is within this distance of a bound is admitted.
pub const LOG_TOLERANCE: f64 = 1e-9;

/// Transform between a slider's control value and the model value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamScale {
    /// Identity transform.
    #[default]
    Linear,
    /// The control moves the base-10 exponent: `model = 10^control`.
    Log10,
}

impl ParamScale {
    /// Converts a control value into a model value.
    #[inline]
    pub fn to_model(self, control: f64) -> f64 {
        match self {
            ParamScale::Linear => control,
            ParamScale::Log10 => 10f64.powf(control),
        }
    }

    /// Converts a model value back into control space.
    ///
    /// Returns `None` for non-positive values on a log scale.
    #[inline]
    pub fn to_control(self, model: f64) -> Option<f64> {
        match self {
            ParamScale::Linear => Some(model),
            ParamScale::Log10 if model > 0.0 => Some(model.log10()),
            ParamScale::Log10 => None,
        }
    }

    /// Short lowercase name used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            ParamScale::Linear => "linear",
            ParamScale::Log10 => "log10",
        }
    }
}

/// A parameter value as seen by the store and the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Continuous numeric value in model space.
    Number(f64),
    /// Tag of the active variant of a discrete choice.
    Variant(String),
    /// Boolean switch.
    Flag(bool),
}

impl ParamValue {
    /// Returns the numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the variant tag, if this is a variant.
    pub fn as_variant(&self) -> Option<&str> {
        match self {
            ParamValue::Variant(tag) => Some(tag),
            _ => None,
        }
    }

    /// Returns the flag, if this is a flag.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ParamValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the value kind, for error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            ParamValue::Number(_) => "number",
            ParamValue::Variant(_) => "variant",
            ParamValue::Flag(_) => "flag",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{v:e}"),
            ParamValue::Variant(tag) => f.write_str(tag),
            ParamValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// Set of values a parameter may take.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    /// Closed range in control space.
    Continuous {
        /// Lower bound (an exponent for [`ParamScale::Log10`]).
        min: f64,
        /// Upper bound (an exponent for [`ParamScale::Log10`]).
        max: f64,
        /// Control-to-model transform.
        scale: ParamScale,
    },
    /// Finite set of variant tags.
    Discrete {
        /// Declared variant tags in display order.
        variants: Vec<String>,
    },
    /// Boolean.
    Flag,
}

impl Domain {
    /// Name of the value kind this domain holds.
    pub const fn kind(&self) -> &'static str {
        match self {
            Domain::Continuous { .. } => "number",
            Domain::Discrete { .. } => "variant",
            Domain::Flag => "flag",
        }
    }

    /// Returns `true` if `control` lies within a continuous domain's bounds.
    ///
    /// Always `false` for non-continuous domains.
    pub fn contains_control(&self, control: f64) -> bool {
        match self {
            Domain::Continuous { min, max, .. } => {
                control.is_finite() && control >= *min && control <= *max
            }
            _ => false,
        }
    }

    /// Returns `true` if the model-space value belongs to this domain.
    pub fn admits(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Domain::Continuous { min, max, scale }, ParamValue::Number(v)) => match scale {
                ParamScale::Linear => v.is_finite() && *v >= *min && *v <= *max,
                ParamScale::Log10 => match scale.to_control(*v) {
                    Some(exp) if exp.is_finite() => {
                        exp >= *min - LOG_TOLERANCE && exp <= *max + LOG_TOLERANCE
                    }
                    _ => false,
                },
            },
            (Domain::Discrete { variants }, ParamValue::Variant(tag)) => {
                variants.iter().any(|v| v == tag)
            }
            (Domain::Flag, ParamValue::Flag(_)) => true,
            _ => false,
        }
    }
}

/// Physical unit used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamUnit {
    /// Energy in erg.
    Erg,
    /// Luminosity in erg/s.
    ErgPerSecond,
    /// Number density in cm^-3.
    PerCubicCm,
    /// Angle in radians.
    Radians,
    /// Time in seconds.
    Seconds,
    /// Distance in cm.
    Centimeters,
    /// Dimensionless.
    #[default]
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Erg => " erg",
            ParamUnit::ErgPerSecond => " erg/s",
            ParamUnit::PerCubicCm => " cm^-3",
            ParamUnit::Radians => " rad",
            ParamUnit::Seconds => " s",
            ParamUnit::Centimeters => " cm",
            ParamUnit::None => "",
        }
    }
}

/// Describes a single model parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDescriptor {
    /// Parameter key passed to the model (e.g. `"E0"`, `"thetaCore"`).
    pub name: String,

    /// Label shown next to the control (e.g. `"log10_E0"`).
    pub label: String,

    /// Unit for display.
    pub unit: ParamUnit,

    /// Admissible values.
    pub domain: Domain,

    /// Default value in model space.
    pub default: ParamValue,

    /// Slider increment in control space. `None` means continuous.
    pub step: Option<f64>,

    /// Group for panel layout (e.g. `"blast wave"`, `"microphysics"`).
    ///
    /// Empty string means ungrouped.
    pub group: String,

    /// Value written while a toggle override is disabled.
    ///
    /// Admitted by the store even though it lies outside [`Self::domain`].
    pub override_value: Option<f64>,
}

impl ParamDescriptor {
    /// Linear continuous parameter.
    pub fn linear(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            unit: ParamUnit::None,
            domain: Domain::Continuous {
                min,
                max,
                scale: ParamScale::Linear,
            },
            default: ParamValue::Number(default),
            step: None,
            group: String::new(),
            override_value: None,
        }
    }

    /// Log-scaled continuous parameter with bounds and default given as
    /// base-10 exponents.
    pub fn log10(name: impl Into<String>, min_exp: f64, max_exp: f64, default_exp: f64) -> Self {
        let name = name.into();
        Self {
            label: format!("log10_{name}"),
            name,
            unit: ParamUnit::None,
            domain: Domain::Continuous {
                min: min_exp,
                max: max_exp,
                scale: ParamScale::Log10,
            },
            default: ParamValue::Number(ParamScale::Log10.to_model(default_exp)),
            step: None,
            group: String::new(),
            override_value: None,
        }
    }

    /// Discrete parameter over the given variant tags.
    pub fn discrete<I, S>(name: impl Into<String>, variants: I, default: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            unit: ParamUnit::None,
            domain: Domain::Discrete {
                variants: variants.into_iter().map(Into::into).collect(),
            },
            default: ParamValue::Variant(default.into()),
            step: None,
            group: String::new(),
            override_value: None,
        }
    }

    /// Boolean parameter.
    pub fn flag(name: impl Into<String>, default: bool) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            unit: ParamUnit::None,
            domain: Domain::Flag,
            default: ParamValue::Flag(default),
            step: None,
            group: String::new(),
            override_value: None,
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the unit.
    pub fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Sets the slider step in control space.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Sets the group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Declares the value forced by a disabled toggle override.
    pub fn with_override(mut self, value: f64) -> Self {
        self.override_value = Some(value);
        self
    }

    /// Scale of a continuous parameter, `None` otherwise.
    pub fn scale(&self) -> Option<ParamScale> {
        match self.domain {
            Domain::Continuous { scale, .. } => Some(scale),
            _ => None,
        }
    }

    /// Control-space bounds of a continuous parameter.
    pub fn control_bounds(&self) -> Option<(f64, f64)> {
        match self.domain {
            Domain::Continuous { min, max, .. } => Some((min, max)),
            _ => None,
        }
    }

    /// Returns `true` if the store may hold `value` for this parameter.
    pub fn admits(&self, value: &ParamValue) -> bool {
        if self.domain.admits(value) {
            return true;
        }
        matches!((self.override_value, value), (Some(o), ParamValue::Number(v)) if o == *v)
    }

    /// Checks that the descriptor is internally consistent.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidDomain {
            param: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("parameter name is empty".to_string()));
        }

        match &self.domain {
            Domain::Continuous { min, max, .. } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(invalid(format!("bounds [{min}, {max}] are not finite")));
                }
                if min > max {
                    return Err(invalid(format!("lower bound {min} exceeds upper bound {max}")));
                }
                if let Some(step) = self.step
                    && (!step.is_finite() || step <= 0.0)
                {
                    return Err(invalid(format!("step {step} must be positive")));
                }
            }
            Domain::Discrete { variants } => {
                if variants.is_empty() {
                    return Err(invalid("discrete domain has no variants".to_string()));
                }
                for (i, v) in variants.iter().enumerate() {
                    if variants[..i].contains(v) {
                        return Err(invalid(format!("duplicate variant '{v}'")));
                    }
                }
            }
            Domain::Flag => {}
        }

        if let Some(value) = self.override_value {
            if !matches!(self.domain, Domain::Continuous { .. }) {
                return Err(invalid("override declared on a non-numeric parameter".to_string()));
            }
            if !value.is_finite() {
                return Err(invalid(format!("override value {value} is not finite")));
            }
        }

        if !self.domain.admits(&self.default) {
            return Err(ConfigurationError::DefaultOutsideDomain {
                param: self.name.clone(),
                default: self.default.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log10_descriptor_stores_model_default() {
        let desc = ParamDescriptor::log10("E0", 48.0, 55.0, 51.0);
        assert_eq!(desc.label, "log10_E0");
        let default = desc.default.as_number().unwrap();
        assert!((default / 1e51 - 1.0).abs() < 1e-12);
        assert_eq!(desc.control_bounds(), Some((48.0, 55.0)));
    }

    #[test]
    fn log_domain_checks_exponent() {
        let desc = ParamDescriptor::log10("n0", -5.0, 3.0, -3.0);
        assert!(desc.admits(&ParamValue::Number(1e-5)));
        assert!(desc.admits(&ParamValue::Number(1e3)));
        assert!(!desc.admits(&ParamValue::Number(1e-6)));
        assert!(!desc.admits(&ParamValue::Number(0.0)));
        assert!(!desc.admits(&ParamValue::Number(-1.0)));
    }

    #[test]
    fn log_domain_absorbs_pow_rounding_at_bounds() {
        let desc = ParamDescriptor::log10("E0", 48.0, 55.0, 51.0);
        let top = ParamScale::Log10.to_model(55.0);
        assert!(desc.admits(&ParamValue::Number(top)));
    }

    #[test]
    fn linear_domain_is_closed() {
        let desc = ParamDescriptor::linear("p", 2.0, 3.0, 2.2);
        assert!(desc.admits(&ParamValue::Number(2.0)));
        assert!(desc.admits(&ParamValue::Number(3.0)));
        assert!(!desc.admits(&ParamValue::Number(3.0001)));
        assert!(!desc.admits(&ParamValue::Number(f64::NAN)));
    }

    #[test]
    fn kind_mismatch_is_not_admitted() {
        let desc = ParamDescriptor::linear("p", 2.0, 3.0, 2.2);
        assert!(!desc.admits(&ParamValue::Flag(true)));
        let jet = ParamDescriptor::discrete("jetType", ["tophat", "gaussian"], "tophat");
        assert!(!jet.admits(&ParamValue::Number(1.0)));
        assert!(jet.admits(&ParamValue::Variant("gaussian".into())));
        assert!(!jet.admits(&ParamValue::Variant("cone".into())));
    }

    #[test]
    fn override_value_is_admitted_outside_domain() {
        let desc = ParamDescriptor::log10("L0", 45.0, 55.0, 47.0).with_override(0.0);
        assert!(desc.admits(&ParamValue::Number(0.0)));
        assert!(!desc.domain.admits(&ParamValue::Number(0.0)));
    }

    #[test]
    fn validate_rejects_default_outside_domain() {
        let desc = ParamDescriptor::linear("thetaObs", 0.0, 0.8, 1.2);
        assert!(matches!(
            desc.validate(),
            Err(ConfigurationError::DefaultOutsideDomain { .. })
        ));
    }

    #[test]
    fn validate_rejects_inverted_and_empty_domains() {
        let inverted = ParamDescriptor::linear("p", 3.0, 2.0, 2.5);
        assert!(inverted.validate().is_err());

        let empty = ParamDescriptor::discrete("jetType", Vec::<String>::new(), "tophat");
        assert!(empty.validate().is_err());

        let dup = ParamDescriptor::discrete("jetType", ["a", "a"], "a");
        assert!(dup.validate().is_err());

        let bad_step = ParamDescriptor::linear("p", 2.0, 3.0, 2.2).with_step(0.0);
        assert!(bad_step.validate().is_err());
    }

    #[test]
    fn validate_rejects_override_on_flag() {
        let desc = ParamDescriptor::flag("injection", true).with_override(0.0);
        assert!(desc.validate().is_err());
    }

    #[test]
    fn scale_round_trip() {
        for &exp in &[-6.0, -0.3, 0.0, 47.0, 52.5] {
            let model = ParamScale::Log10.to_model(exp);
            let back = ParamScale::Log10.to_control(model).unwrap();
            assert!((back - exp).abs() < 1e-9, "{exp} -> {back}");
        }
        assert_eq!(ParamScale::Linear.to_control(-4.0), Some(-4.0));
        assert_eq!(ParamScale::Log10.to_control(0.0), None);
    }

    #[test]
    fn unit_suffix() {
        assert_eq!(ParamUnit::Erg.suffix(), " erg");
        assert_eq!(ParamUnit::None.suffix(), "");
    }
}
