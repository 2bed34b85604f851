//! Control-event scripts for `afterscope replay`.
//!
//! A script is a JSON array of steps. Each step is one event or an array of
//! events dispatched as a single batch:
//!
//! ```json
//! [
//!   { "event": "slider", "control": "log10_E0", "value": 52.0 },
//!   [
//!     { "event": "select", "control": "Jet Type", "label": "Gaussian" },
//!     { "event": "toggle", "control": "Energy Injection", "enabled": false }
//!   ],
//!   { "event": "hide", "series": "radio(6GHz)" },
//!   { "event": "reset" }
//! ]
//! ```

use std::path::Path;

use afterscope_core::ControlEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One scripted control event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Move a slider to a raw position.
    Slider {
        /// Control id.
        control: String,
        /// Raw (control-space) position.
        value: f64,
    },
    /// Pick a selector option by label.
    Select {
        /// Control id.
        control: String,
        /// Option label.
        label: String,
    },
    /// Switch a toggle.
    Toggle {
        /// Control id.
        control: String,
        /// New state.
        enabled: bool,
    },
    /// Make a band visible.
    Show {
        /// Band key.
        series: String,
    },
    /// Hide a band.
    Hide {
        /// Band key.
        series: String,
    },
    /// Flip a band's visibility.
    Flip {
        /// Band key.
        series: String,
    },
    /// Restore every default.
    Reset,
}

impl From<ScriptEvent> for ControlEvent {
    fn from(event: ScriptEvent) -> Self {
        match event {
            ScriptEvent::Slider { control, value } => ControlEvent::slider(control, value),
            ScriptEvent::Select { control, label } => ControlEvent::select(control, label),
            ScriptEvent::Toggle { control, enabled } => ControlEvent::toggle(control, enabled),
            ScriptEvent::Show { series } => ControlEvent::visibility(series, true),
            ScriptEvent::Hide { series } => ControlEvent::visibility(series, false),
            ScriptEvent::Flip { series } => ControlEvent::flip(series),
            ScriptEvent::Reset => ControlEvent::Reset,
        }
    }
}

/// One script step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    /// A single event.
    Single(ScriptEvent),
    /// Events applied together with one recompute.
    Batch(Vec<ScriptEvent>),
}

impl ScriptStep {
    /// Events of this step in order.
    pub fn into_events(self) -> Vec<ControlEvent> {
        match self {
            ScriptStep::Single(event) => vec![event.into()],
            ScriptStep::Batch(events) => events.into_iter().map(Into::into).collect(),
        }
    }
}

/// Errors reading a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The file could not be read.
    #[error("failed to read script '{path}': {source}")]
    Read {
        /// Script path.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid script.
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parses a script from JSON text.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    Ok(serde_json::from_str(text)?)
}

/// Reads and parses a script file.
pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>, ScriptError> {
    let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&text)
}
