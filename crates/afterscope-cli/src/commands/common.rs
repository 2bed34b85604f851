//! Shared CLI helpers used across multiple commands.

use std::path::Path;

use afterscope_config::{ConfigError, SessionConfig};
use afterscope_core::{
    AxisBounds, ControlEvent, Explorer, ParamValue, RecordingRenderer, RecomputeReport,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::AnalyticAfterglow;

/// A session wired to the built-in model and a recording renderer.
pub type SessionExplorer = Explorer<AnalyticAfterglow, RecordingRenderer>;

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("Invalid assignment: '{s}' (expected control=value)"))
}

/// Load a session by factory name or path.
pub fn load_session(name: &str) -> anyhow::Result<SessionConfig> {
    match SessionConfig::resolve(name) {
        Ok(session) => Ok(session),
        Err(ConfigError::UnknownSession(_)) => anyhow::bail!(
            "Session '{name}' not found. Use 'afterscope config list' to see factory sessions."
        ),
        Err(e) => Err(e.into()),
    }
}

/// Assemble a session around the built-in model.
pub fn open_explorer(session: &SessionConfig) -> anyhow::Result<SessionExplorer> {
    let explorer = session.into_explorer(AnalyticAfterglow, RecordingRenderer::new())?;
    tracing::info!(session = %session.name, "session ready");
    Ok(explorer)
}

/// A `control=value` assignment that does not fit the session.
#[derive(Debug, Error, PartialEq)]
pub enum AssignmentError {
    /// No slider, toggle or selector has this id.
    #[error("unknown control '{0}'")]
    UnknownControl(String),
    /// A slider value is not a number.
    #[error("control '{control}' expects a number, got '{value}'")]
    NotANumber {
        /// Control id.
        control: String,
        /// Offending text.
        value: String,
    },
    /// A toggle value is not on/off.
    #[error("control '{control}' expects on/off, got '{value}'")]
    NotAFlag {
        /// Control id.
        control: String,
        /// Offending text.
        value: String,
    },
}

/// Turns `control=value` into the event the control's widget would send.
///
/// Slider values are raw positions (exponents for log sliders), toggle
/// values are `on`/`off`/`true`/`false`, selector values are option labels.
pub fn assignment_event(
    session: &SessionConfig,
    control: &str,
    value: &str,
) -> Result<ControlEvent, AssignmentError> {
    if session.sliders.iter().any(|s| s.control_id() == control) {
        let number = value.parse::<f64>().map_err(|_| AssignmentError::NotANumber {
            control: control.to_string(),
            value: value.to_string(),
        })?;
        return Ok(ControlEvent::slider(control, number));
    }
    if session.toggles.iter().any(|t| t.control == control) {
        let enabled = match value.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" | "yes" => true,
            "off" | "false" | "0" | "no" => false,
            _ => {
                return Err(AssignmentError::NotAFlag {
                    control: control.to_string(),
                    value: value.to_string(),
                });
            }
        };
        return Ok(ControlEvent::toggle(control, enabled));
    }
    if session.choices.iter().any(|c| c.control_id() == control) {
        return Ok(ControlEvent::select(control, value));
    }
    Err(AssignmentError::UnknownControl(control.to_string()))
}

/// Write `text` to `path`, or to stdout when no path is given.
pub fn write_output(text: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// JSON form of a parameter value.
pub fn value_json(value: &ParamValue) -> serde_json::Value {
    match value {
        ParamValue::Number(v) => serde_json::json!(v),
        ParamValue::Variant(tag) => serde_json::json!(tag),
        ParamValue::Flag(b) => serde_json::json!(b),
    }
}

/// One band in a rendered frame.
#[derive(Debug, Serialize)]
pub struct SeriesFrame {
    /// Band key.
    pub key: String,
    /// Evaluation frequencies (Hz).
    pub frequency_hz: Vec<f64>,
    /// Wavelength regime.
    pub group: &'static str,
    /// Line pattern.
    pub style: &'static str,
    /// Whether the band is shown.
    pub visible: bool,
    /// `[time_s, flux_mjy]` pairs.
    pub points: Vec<[f64; 2]>,
}

/// Axis extent of a frame.
#[derive(Debug, Serialize)]
pub struct BoundsFrame {
    /// Time range (s).
    pub time: [f64; 2],
    /// Flux range (mJy).
    pub flux: [f64; 2],
}

impl From<AxisBounds> for BoundsFrame {
    fn from(b: AxisBounds) -> Self {
        Self {
            time: [b.x_min, b.x_max],
            flux: [b.y_min, b.y_max],
        }
    }
}

/// Everything the renderer last drew, plus the parameters behind it.
#[derive(Debug, Serialize)]
pub struct Frame {
    /// Session name.
    pub session: String,
    /// Parameter values by name.
    pub params: serde_json::Map<String, serde_json::Value>,
    /// Bands in registry order.
    pub series: Vec<SeriesFrame>,
    /// Axis extent, absent when nothing plottable is visible.
    pub bounds: Option<BoundsFrame>,
}

impl Frame {
    /// Captures the explorer's current frame.
    pub fn capture(session: &str, explorer: &SessionExplorer) -> Self {
        let params = explorer
            .store()
            .iter()
            .map(|(desc, value)| (desc.name.clone(), value_json(value)))
            .collect();

        let registry = explorer.registry();
        let renderer = explorer.renderer();
        let series = registry
            .keys()
            .filter_map(|key| {
                let desc = registry.descriptor(key)?;
                let drawn = renderer.series(key);
                Some(SeriesFrame {
                    key: key.to_string(),
                    frequency_hz: desc.frequency.values().to_vec(),
                    group: desc.group.name(),
                    style: desc.style.pattern(),
                    visible: registry.is_visible(key),
                    points: drawn
                        .map(|d| d.pairs.iter().map(|&(t, f)| [t, f]).collect())
                        .unwrap_or_default(),
                })
            })
            .collect();

        Self {
            session: session.to_string(),
            params,
            series,
            bounds: renderer.bounds().map(BoundsFrame::from),
        }
    }
}

/// Short summary of one recompute, for logs and JSON output.
#[derive(Debug, Serialize)]
pub struct ReportSummary {
    /// Bands evaluated.
    pub computed: Vec<String>,
    /// Bands served from cache.
    pub reused: Vec<String>,
    /// `series: error` strings.
    pub failures: Vec<String>,
}

impl From<&RecomputeReport> for ReportSummary {
    fn from(report: &RecomputeReport) -> Self {
        Self {
            computed: report.computed.clone(),
            reused: report.reused.clone(),
            failures: report.failures.iter().map(ToString::to_string).collect(),
        }
    }
}
