//! Recomputing visible bands after a state change.
//!
//! [`RecomputeController::on_change`] is the only place the model is invoked
//! on the interactive path. One call:
//!
//! 1. takes a snapshot of the store and marks it clean,
//! 2. evaluates every visible band whose cache was not computed from that
//!    snapshot,
//! 3. stores each successful result (a failing band keeps its old cache),
//! 4. redraws every band and rescales the axes to the visible caches.
//!
//! Calling it twice without a change in between evaluates nothing the second
//! time and produces identical caches.

use crate::error::{EvaluationFailure, ModelEvaluationError};
use crate::model::{Model, TimeGrid};
use crate::render::{AxisBounds, AxisScale, Renderer};
use crate::series::{Frequency, SeriesRegistry};
use crate::store::{ParameterSnapshot, ParameterStore};

/// Outcome of one [`RecomputeController::on_change`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecomputeReport {
    /// Bands evaluated successfully, in registry order.
    pub computed: Vec<String>,
    /// Visible bands whose cache was already current.
    pub reused: Vec<String>,
    /// Bands whose evaluation failed; their previous cache is kept.
    pub failures: Vec<ModelEvaluationError>,
    /// Bounds handed to the renderer.
    pub bounds: Option<AxisBounds>,
}

impl RecomputeReport {
    /// Returns `true` if no band failed.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure for a band, if it failed.
    pub fn failure(&self, series: &str) -> Option<&ModelEvaluationError> {
        self.failures.iter().find(|f| f.series == series)
    }
}

/// Evaluates one band and pairs the result with the time grid.
///
/// Rejects output of the wrong length or containing NaN/infinity.
pub fn evaluate_series<M: Model + ?Sized>(
    model: &M,
    grid: &TimeGrid,
    key: &str,
    frequency: &Frequency,
    snapshot: &ParameterSnapshot,
) -> Result<Vec<(f64, f64)>, ModelEvaluationError> {
    let tag = |failure: EvaluationFailure| ModelEvaluationError {
        series: key.to_string(),
        failure,
    };

    let times = grid.as_slice();
    let flux = model
        .evaluate(times, frequency, snapshot)
        .map_err(|e| tag(e.into()))?;

    if flux.len() != times.len() {
        return Err(tag(EvaluationFailure::LengthMismatch {
            expected: times.len(),
            found: flux.len(),
        }));
    }
    if let Some(index) = flux.iter().position(|f| !f.is_finite()) {
        return Err(tag(EvaluationFailure::NonFinite { index }));
    }

    Ok(times.iter().copied().zip(flux).collect())
}

/// Drives model evaluation for the visible bands.
#[derive(Debug)]
pub struct RecomputeController<M> {
    model: M,
    grid: TimeGrid,
    y_scale: AxisScale,
    recomputes: u64,
    evaluations: u64,
}

impl<M: Model> RecomputeController<M> {
    /// Creates a controller sampling `model` on `grid`, with a log flux axis.
    pub fn new(model: M, grid: TimeGrid) -> Self {
        Self {
            model,
            grid,
            y_scale: AxisScale::Log,
            recomputes: 0,
            evaluations: 0,
        }
    }

    /// Uses a different flux axis scale for autoscaling.
    pub fn with_y_scale(mut self, scale: AxisScale) -> Self {
        self.y_scale = scale;
        self
    }

    /// The model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Sample times.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Flux axis scale.
    pub fn y_scale(&self) -> AxisScale {
        self.y_scale
    }

    /// Number of [`on_change`](Self::on_change) calls so far.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }

    /// Number of model invocations so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Brings every visible band up to date with the store and redraws.
    pub fn on_change<R: Renderer + ?Sized>(
        &mut self,
        store: &mut ParameterStore,
        registry: &mut SeriesRegistry,
        renderer: &mut R,
    ) -> RecomputeReport {
        self.recomputes += 1;
        let snapshot = store.snapshot();
        store.mark_clean();

        let mut report = RecomputeReport::default();
        let mut results = Vec::new();

        for key in registry.visible_keys() {
            if registry.cache_is_current(key, &snapshot) {
                report.reused.push(key.to_string());
                continue;
            }
            let Some(desc) = registry.descriptor(key) else {
                continue;
            };
            self.evaluations += 1;
            results.push((
                key.to_string(),
                evaluate_series(&self.model, &self.grid, key, &desc.frequency, &snapshot),
            ));
        }

        for (key, result) in results {
            match result {
                Ok(pairs) => {
                    registry.update_cache(&key, pairs, snapshot.clone());
                    report.computed.push(key);
                }
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("recompute: {err}");
                    report.failures.push(err);
                }
            }
        }

        for key in registry.keys() {
            if let Some(desc) = registry.descriptor(key) {
                renderer.draw_series(key, registry.cached(key), registry.is_visible(key), desc.style);
            }
        }

        report.bounds = AxisBounds::from_values(
            registry.visible_keys().flat_map(|k| registry.cached(k)),
            self.y_scale,
        );
        renderer.rescale(report.bounds);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "recompute #{}: {} computed, {} reused, {} failed",
            self.recomputes,
            report.computed.len(),
            report.reused.len(),
            report.failures.len()
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::param_info::ParamDescriptor;
    use crate::render::RecordingRenderer;
    use crate::series::SeriesDescriptor;

    fn flat(t: &[f64], nu: &Frequency, p: &ParameterSnapshot) -> Result<Vec<f64>, ModelError> {
        let a = p.number("a").ok_or(ModelError::MissingParameter("a".into()))?;
        Ok(t.iter().map(|_| a * nu.representative()).collect())
    }

    fn fixture() -> (ParameterStore, SeriesRegistry, TimeGrid) {
        let store = ParameterStore::new([ParamDescriptor::linear("a", 0.0, 10.0, 1.0)]).unwrap();
        let registry = SeriesRegistry::new([
            SeriesDescriptor::new("A", Frequency::Single(1.0)),
            SeriesDescriptor::new("B", Frequency::Single(2.0)),
        ])
        .unwrap();
        (store, registry, TimeGrid::log_spaced(0.0, 2.0, 3).unwrap())
    }

    #[test]
    fn evaluates_then_reuses() {
        let (mut store, mut registry, grid) = fixture();
        let mut ctl = RecomputeController::new(flat, grid);
        let mut r = RecordingRenderer::new();

        let first = ctl.on_change(&mut store, &mut registry, &mut r);
        assert_eq!(first.computed, ["A", "B"]);
        assert!(!store.is_dirty());
        let cache = registry.cached("B").to_vec();

        let second = ctl.on_change(&mut store, &mut registry, &mut r);
        assert!(second.computed.is_empty());
        assert_eq!(second.reused, ["A", "B"]);
        assert_eq!(registry.cached("B"), cache.as_slice());
        assert_eq!((ctl.recomputes(), ctl.evaluations()), (2, 2));
        assert_eq!(r.frames(), 2);
    }

    #[test]
    fn rejects_wrong_length_and_non_finite() {
        let grid = TimeGrid::new(vec![1.0, 2.0]).unwrap();
        let snap = ParameterSnapshot::from_entries([]);
        let nu = Frequency::Single(1.0);

        let short = |_: &[f64], _: &Frequency, _: &ParameterSnapshot| -> Result<Vec<f64>, ModelError> {
            Ok(vec![1.0])
        };
        let err = evaluate_series(&short, &grid, "x", &nu, &snap).unwrap_err();
        assert_eq!(
            err.failure,
            EvaluationFailure::LengthMismatch { expected: 2, found: 1 }
        );

        let nan = |_: &[f64], _: &Frequency, _: &ParameterSnapshot| -> Result<Vec<f64>, ModelError> {
            Ok(vec![1.0, f64::NAN])
        };
        let err = evaluate_series(&nan, &grid, "x", &nu, &snap).unwrap_err();
        assert_eq!(err.failure, EvaluationFailure::NonFinite { index: 1 });
        assert_eq!(err.series, "x");
    }

    #[test]
    fn bounds_ignore_hidden_bands() {
        let (mut store, mut registry, grid) = fixture();
        let mut ctl = RecomputeController::new(flat, grid);
        let mut r = RecordingRenderer::new();
        ctl.on_change(&mut store, &mut registry, &mut r);

        registry.set_visible("B", false);
        let report = ctl.on_change(&mut store, &mut registry, &mut r);
        let b = report.bounds.unwrap();
        assert_eq!((b.y_min, b.y_max), (1.0, 1.0));
        assert!(!registry.cached("B").is_empty());
        assert!(!r.series("B").unwrap().visible);
    }
}
