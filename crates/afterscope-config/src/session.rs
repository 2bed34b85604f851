//! Session file format and operations.

use std::path::Path;

use afterscope_core::{BandGroup, LineStyle, ParamUnit};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Everything needed to start an exploration session.
///
/// Sessions are stored as TOML files. Slider bounds and defaults are given in
/// control space (exponents for `log10` sliders); the store receives model
/// values.
///
/// # TOML Format
///
/// ```toml
/// name = "minimal"
///
/// [time_grid]
/// kind = "log"
/// start = 10.0
/// stop = 1e6
/// points = 30
///
/// [[fixed]]
/// name = "z"
/// value = 0.661
///
/// [[sliders]]
/// param = "E0"
/// scale = "log10"
/// min = 48.0
/// max = 55.0
/// default = 51.0
/// step = 0.01
/// unit = "erg"
///
/// [[choices]]
/// param = "jetType"
/// default = "TopHat"
/// options = [
///     { label = "TopHat", tag = "tophat" },
///     { label = "Gaussian", tag = "gaussian" },
/// ]
///
/// [[series]]
/// key = "r"
/// frequency = 4.81e14
/// group = "optical"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Name of the session.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample times.
    pub time_grid: TimeGridConfig,

    /// Parameters passed to the model but not exposed as controls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed: Vec<FixedParam>,

    /// Continuous parameters driven by sliders, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sliders: Vec<SliderConfig>,

    /// Toggles that substitute a fixed value for a slider.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toggles: Vec<ToggleConfig>,

    /// Discrete parameters driven by radio selectors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceConfig>,

    /// Plotted bands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<SeriesConfig>,
}

/// Sample time specification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeGridConfig {
    /// `points` samples evenly spaced in log between `start` and `stop`
    /// seconds, both inclusive.
    Log {
        /// First sample time (s).
        start: f64,
        /// Last sample time (s).
        stop: f64,
        /// Number of samples.
        points: usize,
    },
    /// Explicit sample times (s).
    Explicit {
        /// Strictly increasing times.
        times: Vec<f64>,
    },
}

/// A parameter with a constant value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixedParam {
    /// Parameter key passed to the model.
    pub name: String,
    /// Constant value.
    pub value: FixedValue,
    /// Unit for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

/// Value of a fixed parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FixedValue {
    /// Numeric constant.
    Number(f64),
    /// Variant tag (e.g. a jet structure the session does not let you change).
    Variant(String),
}

/// Slider scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// Slider position is the model value.
    #[default]
    Linear,
    /// Slider position is the base-10 exponent of the model value.
    Log10,
}

/// Display unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Unit {
    /// erg
    #[serde(rename = "erg")]
    Erg,
    /// erg/s
    #[serde(rename = "erg/s")]
    ErgPerSecond,
    /// cm^-3
    #[serde(rename = "cm^-3")]
    PerCubicCm,
    /// rad
    #[serde(rename = "rad")]
    Radians,
    /// s
    #[serde(rename = "s")]
    Seconds,
    /// cm
    #[serde(rename = "cm")]
    Centimeters,
}

impl From<Unit> for ParamUnit {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::Erg => ParamUnit::Erg,
            Unit::ErgPerSecond => ParamUnit::ErgPerSecond,
            Unit::PerCubicCm => ParamUnit::PerCubicCm,
            Unit::Radians => ParamUnit::Radians,
            Unit::Seconds => ParamUnit::Seconds,
            Unit::Centimeters => ParamUnit::Centimeters,
        }
    }
}

/// A slider bound to one continuous parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SliderConfig {
    /// Parameter key passed to the model.
    pub param: String,

    /// Control id; defaults to `log10_<param>` for log sliders and `<param>`
    /// otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,

    /// How the slider position maps to the model value.
    #[serde(default)]
    pub scale: Scale,

    /// Lower bound (control space).
    pub min: f64,

    /// Upper bound (control space).
    pub max: f64,

    /// Startup and reset position (control space).
    pub default: f64,

    /// Slider increment; omitted means continuous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    /// Unit of the model value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,

    /// Panel group.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
}

impl SliderConfig {
    /// A linear slider.
    pub fn linear(param: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        Self {
            param: param.into(),
            control: None,
            scale: Scale::Linear,
            min,
            max,
            default,
            step: None,
            unit: None,
            group: String::new(),
        }
    }

    /// A log slider; bounds and default are exponents.
    pub fn log10(param: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        Self {
            scale: Scale::Log10,
            ..Self::linear(param, min, max, default)
        }
    }

    /// Sets an explicit control id.
    pub fn with_control(mut self, control: impl Into<String>) -> Self {
        self.control = Some(control.into());
        self
    }

    /// Sets the slider increment.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Sets the unit.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the panel group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Control id this slider registers.
    pub fn control_id(&self) -> String {
        match (&self.control, self.scale) {
            (Some(id), _) => id.clone(),
            (None, Scale::Linear) => self.param.clone(),
            (None, Scale::Log10) => format!("log10_{}", self.param),
        }
    }
}

fn default_true() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(b: &bool) -> bool {
    *b
}

/// A toggle that overrides a slider's parameter while switched off.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToggleConfig {
    /// Control id (e.g. `"Energy Injection"`).
    pub control: String,
    /// Flag parameter holding the toggle state.
    pub flag: String,
    /// Parameter of the slider being overridden.
    pub param: String,
    /// Model value forced while switched off.
    pub override_value: f64,
    /// State at startup and after reset.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub default: bool,
}

/// One option of a radio selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionConfig {
    /// Label shown on the button.
    pub label: String,
    /// Variant tag passed to the model.
    pub tag: String,
}

impl OptionConfig {
    /// Creates an option.
    pub fn new(label: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tag: tag.into(),
        }
    }
}

/// A radio selector bound to one discrete parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceConfig {
    /// Parameter key passed to the model.
    pub param: String,
    /// Control id; defaults to the parameter key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control: Option<String>,
    /// Label selected at startup and after reset.
    pub default: String,
    /// Options in display order.
    pub options: Vec<OptionConfig>,
}

impl ChoiceConfig {
    /// Control id this selector registers.
    pub fn control_id(&self) -> &str {
        self.control.as_deref().unwrap_or(&self.param)
    }

    /// Tag of the default option, if the default label exists.
    pub fn default_tag(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.label == self.default)
            .map(|o| o.tag.as_str())
    }
}

/// Frequency of a band: one value or a set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FrequencyConfig {
    /// One frequency (Hz).
    Single(f64),
    /// Several frequencies (Hz).
    Set(Vec<f64>),
}

/// Band group names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// Optical / near-infrared.
    Optical,
    /// X-ray.
    Xray,
    /// Radio.
    Radio,
    /// Anything else.
    #[default]
    Other,
}

impl From<Group> for BandGroup {
    fn from(group: Group) -> Self {
        match group {
            Group::Optical => BandGroup::Optical,
            Group::Xray => BandGroup::XRay,
            Group::Radio => BandGroup::Radio,
            Group::Other => BandGroup::Other,
        }
    }
}

/// Line style names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// `-`
    Solid,
    /// `--`
    Dashed,
    /// `:`
    Dotted,
    /// `-.`
    Dashdot,
}

impl From<Style> for LineStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Solid => LineStyle::Solid,
            Style::Dashed => LineStyle::Dashed,
            Style::Dotted => LineStyle::Dotted,
            Style::Dashdot => LineStyle::DashDot,
        }
    }
}

/// One plotted band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesConfig {
    /// Unique key (legend label).
    pub key: String,
    /// Evaluation frequency.
    pub frequency: FrequencyConfig,
    /// Visible at startup and after reset.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub visible: bool,
    /// Wavelength regime.
    #[serde(default)]
    pub group: Group,
    /// Line style; defaults from the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl SeriesConfig {
    /// A visible band at one frequency.
    pub fn new(key: impl Into<String>, frequency: f64, group: Group) -> Self {
        Self {
            key: key.into(),
            frequency: FrequencyConfig::Single(frequency),
            visible: true,
            group,
            style: None,
        }
    }
}

impl SessionConfig {
    /// Create an empty session with a log time grid.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            time_grid: TimeGridConfig::Log {
                start: 10.0,
                stop: 1e6,
                points: 30,
            },
            fixed: Vec::new(),
            sliders: Vec::new(),
            toggles: Vec::new(),
            choices: Vec::new(),
            series: Vec::new(),
        }
    }

    /// Load a session from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let session: SessionConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), name = %session.name, "loaded session");
        Ok(session)
    }

    /// Load a session from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the session to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the session to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve a factory session name or a path to a session file.
    pub fn resolve(name_or_path: &str) -> Result<Self, ConfigError> {
        if let Some(session) = crate::factory::get_factory_session(name_or_path) {
            return Ok(session);
        }
        let path = Path::new(name_or_path);
        if path.exists() {
            Self::load(path)
        } else {
            Err(ConfigError::UnknownSession(name_or_path.to_string()))
        }
    }

    /// Slider driving `param`.
    pub fn slider(&self, param: &str) -> Option<&SliderConfig> {
        self.sliders.iter().find(|s| s.param == param)
    }

    /// Toggle overriding `param`.
    pub fn toggle_for(&self, param: &str) -> Option<&ToggleConfig> {
        self.toggles.iter().find(|t| t.param == param)
    }

    /// Band keys in declaration order.
    pub fn series_keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "minimal"

[time_grid]
kind = "log"
start = 10.0
stop = 1e6
points = 30

[[fixed]]
name = "z"
value = 0.661

[[fixed]]
name = "jetType"
value = "tophat"

[[sliders]]
param = "E0"
scale = "log10"
min = 48.0
max = 55.0
default = 51.0
step = 0.01
unit = "erg"

[[sliders]]
param = "thetaObs"
min = 0.0
max = 0.8
default = 0.05

[[series]]
key = "r"
frequency = 4.81e14
group = "optical"

[[series]]
key = "radio"
frequency = [6e9, 1e10]
group = "radio"
visible = false
"#;

    #[test]
    fn parses_minimal_session() {
        let s = SessionConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(s.name, "minimal");
        assert_eq!(
            s.time_grid,
            TimeGridConfig::Log {
                start: 10.0,
                stop: 1e6,
                points: 30
            }
        );
        assert_eq!(s.fixed[0].value, FixedValue::Number(0.661));
        assert_eq!(s.fixed[1].value, FixedValue::Variant("tophat".into()));
        assert_eq!(s.sliders[0].scale, Scale::Log10);
        assert_eq!(s.sliders[0].unit, Some(Unit::Erg));
        assert_eq!(s.sliders[1].scale, Scale::Linear);
        assert_eq!(s.series[0].frequency, FrequencyConfig::Single(4.81e14));
        assert_eq!(s.series[1].frequency, FrequencyConfig::Set(vec![6e9, 1e10]));
        assert!(s.series[0].visible);
        assert!(!s.series[1].visible);
    }

    #[test]
    fn control_ids_default_from_param() {
        assert_eq!(SliderConfig::log10("E0", 48.0, 55.0, 51.0).control_id(), "log10_E0");
        assert_eq!(SliderConfig::linear("p", 2.0, 3.0, 2.2).control_id(), "p");
        assert_eq!(
            SliderConfig::log10("epsilon_e", -3.0, -0.3, -1.0)
                .with_control("log10_eps_e")
                .control_id(),
            "log10_eps_e"
        );
    }

    #[test]
    fn toml_round_trip() {
        let s = SessionConfig::from_toml(MINIMAL).unwrap();
        let text = s.to_toml().unwrap();
        assert_eq!(SessionConfig::from_toml(&text).unwrap(), s);
    }

    #[test]
    fn explicit_grid_parses() {
        let s = SessionConfig::from_toml(
            r#"
name = "x"
[time_grid]
kind = "explicit"
times = [1.0, 2.0, 4.0]
"#,
        )
        .unwrap();
        assert_eq!(
            s.time_grid,
            TimeGridConfig::Explicit {
                times: vec![1.0, 2.0, 4.0]
            }
        );
    }

    #[test]
    fn unknown_unit_is_a_parse_error() {
        let err = SessionConfig::from_toml(
            r#"
name = "x"
[time_grid]
kind = "log"
start = 1.0
stop = 10.0
points = 2
[[sliders]]
param = "E0"
min = 0.0
max = 1.0
default = 0.5
unit = "joule"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn resolve_unknown_name() {
        assert!(matches!(
            SessionConfig::resolve("no-such-session"),
            Err(ConfigError::UnknownSession(_))
        ));
    }
}
