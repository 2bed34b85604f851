//! Session validation.
//!
//! Checks cross-references and shapes that the TOML schema cannot express:
//! toggles must point at an existing slider, selector defaults must name one
//! of their options, the time grid must be usable. Domain checks (defaults
//! inside bounds, duplicate names) are left to the engine, which reports
//! them as [`ConfigurationError`](afterscope_core::ConfigurationError)s when
//! the session is assembled.
//!
//! # Example
//!
//! ```rust
//! use afterscope_config::{get_factory_session, validate_session};
//!
//! let session = get_factory_session("multiband").unwrap();
//! validate_session(&session).expect("factory sessions are valid");
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::session::{SessionConfig, TimeGridConfig};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The session has no name.
    #[error("session name is empty")]
    EmptyName,

    /// The session declares no bands.
    #[error("session declares no series")]
    NoSeries,

    /// The time grid cannot be built.
    #[error("invalid time grid: {0}")]
    TimeGrid(String),

    /// A toggle overrides a parameter that no slider drives.
    #[error("toggle '{toggle}' overrides '{param}', which has no slider")]
    UnknownSlider {
        /// Toggle control id.
        toggle: String,
        /// Parameter it refers to.
        param: String,
    },

    /// Two toggles override the same slider.
    #[error("parameter '{0}' is overridden by more than one toggle")]
    DuplicateToggle(String),

    /// A selector has no options.
    #[error("selector '{0}' has no options")]
    EmptyChoice(String),

    /// A selector's default label is not one of its options.
    #[error("selector '{choice}' defaults to '{label}', which is not an option")]
    UnknownDefaultOption {
        /// Selector parameter.
        choice: String,
        /// Missing label.
        label: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a session, collecting every problem found.
pub fn validate_session(session: &SessionConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if session.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if session.series.is_empty() {
        errors.push(ValidationError::NoSeries);
    }
    if let Err(e) = validate_time_grid(&session.time_grid) {
        errors.push(e);
    }

    let mut overridden = HashSet::new();
    for toggle in &session.toggles {
        if session.slider(&toggle.param).is_none() {
            errors.push(ValidationError::UnknownSlider {
                toggle: toggle.control.clone(),
                param: toggle.param.clone(),
            });
        }
        if !overridden.insert(toggle.param.as_str()) {
            errors.push(ValidationError::DuplicateToggle(toggle.param.clone()));
        }
    }

    for choice in &session.choices {
        if choice.options.is_empty() {
            errors.push(ValidationError::EmptyChoice(choice.param.clone()));
        } else if choice.default_tag().is_none() {
            errors.push(ValidationError::UnknownDefaultOption {
                choice: choice.param.clone(),
                label: choice.default.clone(),
            });
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Validate the shape of a time grid specification.
pub fn validate_time_grid(grid: &TimeGridConfig) -> ValidationResult<()> {
    match grid {
        TimeGridConfig::Log {
            start,
            stop,
            points,
        } => {
            if !(start.is_finite() && *start > 0.0) {
                return Err(ValidationError::TimeGrid(format!(
                    "start {start} must be a positive time"
                )));
            }
            if !(stop.is_finite() && stop > start) {
                return Err(ValidationError::TimeGrid(format!(
                    "stop {stop} must be later than start {start}"
                )));
            }
            if *points < 2 {
                return Err(ValidationError::TimeGrid(format!(
                    "need at least 2 points, got {points}"
                )));
            }
        }
        TimeGridConfig::Explicit { times } => {
            if times.is_empty() {
                return Err(ValidationError::TimeGrid("no sample times".to_string()));
            }
        }
    }
    Ok(())
}
