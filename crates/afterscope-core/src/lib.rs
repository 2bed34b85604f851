//! Afterscope Core - live parameter exploration for afterglow light curves
//!
//! This crate is the engine behind the interactive explorer: it keeps the
//! canonical parameter state, maps heterogeneous controls onto it, and
//! recomputes the plotted bands whenever that state changes.
//!
//! # Core Abstractions
//!
//! ## Parameters
//!
//! - [`ParamDescriptor`] - Name, domain, default and display metadata
//! - [`ParameterStore`] - Canonical state; rejects writes outside the domain
//! - [`ParameterSnapshot`] - Immutable copy handed to the model
//!
//! ## Controls
//!
//! - [`ControlBinding`] - Object-safe trait between a widget and a parameter
//! - [`LinearBinding`], [`LogBinding`] - Sliders (identity and `10^x`)
//! - [`DiscreteBinding`] - Radio selector mapping labels to variant tags
//! - [`OverrideBinding`] - Toggle that substitutes a fixed value for a slider
//! - [`ControlPanel`] - Ordered bindings, lookup by control id
//!
//! ## Bands and Recompute
//!
//! - [`SeriesRegistry`] - Bands, visibility and cached curves
//! - [`Model`] - The external light-curve function
//! - [`Renderer`] - The drawing backend
//! - [`RecomputeController`] - Evaluates stale visible bands and redraws
//! - [`ResetCoordinator`] - Restores defaults with a single recompute
//! - [`Explorer`] - Owns a whole session and dispatches [`ControlEvent`]s
//! - [`BackgroundEvaluator`] - Worker-thread evaluation, newest wins
//!
//! # Example
//!
//! ```rust
//! use afterscope_core::{
//!     ControlEvent, ControlPanel, Explorer, Frequency, LogBinding, ModelError, ParamDescriptor,
//!     ParameterSnapshot, ParameterStore, RecomputeController, RecordingRenderer,
//!     SeriesDescriptor, SeriesRegistry, TimeGrid,
//! };
//!
//! let store = ParameterStore::new([ParamDescriptor::log10("E0", 48.0, 55.0, 51.0)]).unwrap();
//! let mut panel = ControlPanel::new();
//! panel
//!     .add_single(Box::new(LogBinding::new("log10_E0", store.descriptor("E0").unwrap()).unwrap()))
//!     .unwrap();
//! let registry = SeriesRegistry::new([SeriesDescriptor::new("r", Frequency::Single(4.8e14))]).unwrap();
//!
//! let model = |t: &[f64], _: &Frequency, p: &ParameterSnapshot| -> Result<Vec<f64>, ModelError> {
//!     let e0 = p.number("E0").unwrap_or(0.0);
//!     Ok(t.iter().map(|t| e0 * 1e-50 / t).collect())
//! };
//! let controller = RecomputeController::new(model, TimeGrid::log_spaced(1.0, 6.0, 30).unwrap());
//! let mut explorer = Explorer::new(store, panel, registry, controller, RecordingRenderer::new()).unwrap();
//!
//! explorer.refresh();
//! let outcome = explorer.dispatch(ControlEvent::slider("log10_E0", 52.0));
//! assert!(outcome.warnings.is_empty());
//! assert_eq!(explorer.registry().cached("r").len(), 30);
//! ```

pub mod binding;
pub mod error;
pub mod explorer;
pub mod model;
pub mod panel;
pub mod param_info;
pub mod recompute;
pub mod render;
pub mod reset;
pub mod series;
pub mod store;
pub mod worker;

pub use binding::{
    ChoiceOption, ControlBinding, DiscreteBinding, LinearBinding, LogBinding, OverrideBinding,
    RawValue, Slider,
};
pub use error::{
    BindingError, ConfigurationError, DomainError, EvaluationFailure, ModelError,
    ModelEvaluationError,
};
pub use explorer::{ControlEvent, ControlWarning, DispatchOutcome, Explorer};
pub use model::{Model, TimeGrid};
pub use panel::ControlPanel;
pub use param_info::{Domain, LOG_TOLERANCE, ParamDescriptor, ParamScale, ParamUnit, ParamValue};
pub use recompute::{RecomputeController, RecomputeReport, evaluate_series};
pub use render::{AxisBounds, AxisScale, DrawnSeries, NullRenderer, RecordingRenderer, Renderer};
pub use reset::ResetCoordinator;
pub use series::{BandGroup, Frequency, LineStyle, SeriesDescriptor, SeriesRegistry};
pub use store::{ParameterSnapshot, ParameterStore};
pub use worker::{AppliedEvaluation, BackgroundEvaluator};
