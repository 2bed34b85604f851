//! Error types for the binding and recompute engine.

use thiserror::Error;

/// A control produced a value the parameter's domain does not admit.
///
/// Recovered locally: the write is rejected and the store keeps its prior
/// value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// The parameter is not declared.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// Control value outside the declared bounds.
    ///
    /// `value`, `min` and `max` are in control space (exponents for
    /// log-scaled parameters).
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The rejected value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Label or tag not among the declared variants.
    #[error("parameter '{param}' has no variant '{variant}'")]
    UnknownVariant {
        /// Name of the parameter.
        param: String,
        /// The rejected label or tag.
        variant: String,
    },

    /// Value of the wrong kind (e.g. a flag written to a numeric parameter).
    #[error("parameter '{param}' expects a {expected} value, got {found}")]
    WrongKind {
        /// Name of the parameter.
        param: String,
        /// Kind the domain holds.
        expected: &'static str,
        /// Kind that was written.
        found: &'static str,
    },
}

/// Failure reported by a [`Model`](crate::Model) implementation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// The snapshot lacks a parameter the model needs.
    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    /// The parameter combination is physically invalid.
    #[error("invalid parameter combination: {0}")]
    InvalidParameters(String),

    /// Any other numerical failure.
    #[error("computation failed: {0}")]
    Computation(String),
}

/// Why evaluating one series failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationFailure {
    /// The model rejected the snapshot.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The model returned a series of the wrong length.
    #[error("model returned {found} samples for a {expected}-point time grid")]
    LengthMismatch {
        /// Number of time samples.
        expected: usize,
        /// Number of flux samples returned.
        found: usize,
    },

    /// The model returned NaN or an infinity.
    #[error("model returned a non-finite flux at sample {index}")]
    NonFinite {
        /// Index of the first offending sample.
        index: usize,
    },
}

/// Model evaluation failed for one series.
///
/// Recovered per series: its previous cache stays displayed and other
/// series are unaffected.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("series '{series}': {failure}")]
pub struct ModelEvaluationError {
    /// Key of the series whose evaluation failed.
    pub series: String,
    /// Underlying cause.
    #[source]
    pub failure: EvaluationFailure,
}

/// The default configuration is inconsistent. Fatal at construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Two parameters share a name.
    #[error("duplicate parameter '{0}'")]
    DuplicateParameter(String),

    /// Two series share a key.
    #[error("duplicate series key '{0}'")]
    DuplicateSeries(String),

    /// Two controls share an id.
    #[error("duplicate control id '{0}'")]
    DuplicateControl(String),

    /// A parameter's default lies outside its domain.
    #[error("default {default} for parameter '{param}' is outside its domain")]
    DefaultOutsideDomain {
        /// Name of the parameter.
        param: String,
        /// The offending default, formatted.
        default: String,
    },

    /// A parameter's domain is malformed.
    #[error("invalid domain for parameter '{param}': {reason}")]
    InvalidDomain {
        /// Name of the parameter.
        param: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A control refers to a parameter the store does not declare.
    #[error("control '{control}' is bound to unknown parameter '{param}'")]
    UnboundParameter {
        /// Control id.
        control: String,
        /// Missing parameter name.
        param: String,
    },

    /// A control cannot drive the parameter it is bound to.
    #[error("control '{control}' cannot drive parameter '{param}': {reason}")]
    IncompatibleBinding {
        /// Control id.
        control: String,
        /// Parameter name.
        param: String,
        /// Why the combination is invalid.
        reason: String,
    },

    /// A series frequency is unusable.
    #[error("invalid frequency for series '{series}': {reason}")]
    InvalidFrequency {
        /// Series key.
        series: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The time grid is empty, unsorted, or not finite.
    #[error("invalid time grid: {0}")]
    InvalidTimeGrid(String),
}

/// A control event could not be applied.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BindingError {
    /// No binding owns this control id.
    #[error("unknown control '{0}'")]
    UnknownControl(String),

    /// The control received input of the wrong kind.
    #[error("control '{control}' expects {expected} input, got {found}")]
    WrongKind {
        /// Control id.
        control: String,
        /// Kind the control accepts.
        expected: &'static str,
        /// Kind that was received.
        found: &'static str,
    },

    /// The resulting value was rejected by the store.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
