//! Integration tests for afterscope-core.
//!
//! Drives whole sessions through the [`Explorer`]: control events in,
//! parameter state, caches and the recorded frame out.

use std::cell::RefCell;
use std::collections::HashSet;

use afterscope_core::{
    BindingError, ChoiceOption, ControlEvent, ControlPanel, ControlWarning, DiscreteBinding,
    DomainError, EvaluationFailure, Explorer, Frequency, LinearBinding, LogBinding, Model,
    ModelError, OverrideBinding, ParamDescriptor, ParameterSnapshot, ParameterStore, RawValue,
    RecomputeController, RecordingRenderer, SeriesDescriptor, SeriesRegistry, TimeGrid,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Power-law toy model that records every frequency it is asked for and can
/// be told to fail for one frequency.
#[derive(Default)]
struct ToyModel {
    calls: RefCell<Vec<f64>>,
    fail_at: Option<f64>,
}

impl Model for ToyModel {
    fn evaluate(
        &self,
        times: &[f64],
        frequency: &Frequency,
        params: &ParameterSnapshot,
    ) -> Result<Vec<f64>, ModelError> {
        let nu = frequency.representative();
        self.calls.borrow_mut().push(nu);
        if self.fail_at == Some(nu) {
            return Err(ModelError::InvalidParameters("synthetic failure".into()));
        }
        let e0 = params
            .number("E0")
            .ok_or_else(|| ModelError::MissingParameter("E0".into()))?;
        let l0 = params.number("L0").unwrap_or(0.0);
        let slope = params.number("p").unwrap_or(2.2);
        let jet = match params.variant("jetType") {
            Some("gaussian") => 0.5,
            _ => 1.0,
        };
        Ok(times
            .iter()
            .map(|t| jet * (e0 + l0) * 1e-52 * nu.powf(-0.5) * t.powf(-slope))
            .collect())
    }
}

const NU_A: f64 = 4.8e14;
const NU_B: f64 = 6e9;
const NU_C: f64 = 2.42e18;

fn session(model: ToyModel) -> Explorer<ToyModel, RecordingRenderer> {
    let store = ParameterStore::new([
        ParamDescriptor::log10("E0", 48.0, 55.0, 51.0).with_step(0.01),
        ParamDescriptor::linear("p", 2.0, 3.0, 2.2).with_step(0.01),
        ParamDescriptor::log10("L0", 45.0, 55.0, 47.0)
            .with_step(0.01)
            .with_override(0.0),
        ParamDescriptor::flag("injection", true),
        ParamDescriptor::discrete("jetType", ["tophat", "gaussian"], "tophat"),
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
    let l0 = LogBinding::new("log10_L0", store.descriptor("L0").unwrap()).unwrap();
    let toggle = OverrideBinding::new(
        "Energy Injection",
        store.descriptor("injection").unwrap(),
        store.descriptor("L0").unwrap(),
        Box::new(l0),
    )
    .unwrap();
    panel
        .add(Box::new(toggle), &["Energy Injection", "log10_L0"])
        .unwrap();
    panel
        .add_single(Box::new(
            DiscreteBinding::new(
                "Jet Type",
                store.descriptor("jetType").unwrap(),
                vec![
                    ChoiceOption::new("TopHat", "tophat"),
                    ChoiceOption::new("Gaussian", "gaussian"),
                ],
            )
            .unwrap(),
        ))
        .unwrap();

    let registry = SeriesRegistry::new([
        SeriesDescriptor::new("A", Frequency::Single(NU_A)),
        SeriesDescriptor::new("B", Frequency::Single(NU_B)),
        SeriesDescriptor::new("C", Frequency::Single(NU_C)).hidden(),
    ])
    .unwrap();

    let controller = RecomputeController::new(model, TimeGrid::log_spaced(1.0, 6.0, 30).unwrap());
    Explorer::new(store, panel, registry, controller, RecordingRenderer::new()).unwrap()
}

fn calls(ex: &Explorer<ToyModel, RecordingRenderer>) -> Vec<f64> {
    ex.controller().model().calls.borrow().clone()
}

fn clear_calls(ex: &Explorer<ToyModel, RecordingRenderer>) {
    ex.controller().model().calls.borrow_mut().clear();
}

fn slider(ex: &Explorer<ToyModel, RecordingRenderer>, control: &str) -> f64 {
    ex.position(control).and_then(|r| r.as_number()).unwrap()
}

// ============================================================================
// 1. Visibility and cache reuse
// ============================================================================

#[test]
fn hidden_series_are_not_computed_until_shown() {
    let mut ex = session(ToyModel::default());
    let report = ex.refresh();

    assert_eq!(report.computed, ["A", "B"]);
    assert_eq!(calls(&ex), [NU_A, NU_B]);
    assert!(ex.registry().cached("C").is_empty());

    clear_calls(&ex);
    let out = ex.dispatch(ControlEvent::visibility("C", true));
    let report = out.report.unwrap();
    assert_eq!(report.computed, ["C"]);
    assert_eq!(report.reused, ["A", "B"]);
    assert_eq!(calls(&ex), [NU_C]);
    assert_eq!(ex.registry().cached("C").len(), 30);
}

#[test]
fn reshowing_without_changes_reuses_cache() {
    let mut ex = session(ToyModel::default());
    ex.refresh();
    let before = ex.registry().cached("A").to_vec();

    ex.dispatch(ControlEvent::flip("A"));
    assert!(!ex.renderer().series("A").unwrap().visible);
    clear_calls(&ex);
    ex.dispatch(ControlEvent::flip("A"));

    assert!(calls(&ex).is_empty());
    assert_eq!(ex.registry().cached("A"), before.as_slice());
    assert!(ex.renderer().series("A").unwrap().visible);
}

#[test]
fn hidden_series_keep_cache_and_leave_bounds() {
    let mut ex = session(ToyModel::default());
    ex.refresh();
    let with_b = ex.renderer().bounds().unwrap();

    let report = ex.dispatch(ControlEvent::visibility("B", false)).report.unwrap();
    let without_b = report.bounds.unwrap();

    assert!(!ex.registry().cached("B").is_empty());
    // B sits at a lower frequency, so it is brighter in this toy model.
    assert!(without_b.y_max < with_b.y_max);
}

#[test]
fn hidden_series_go_stale_and_recompute_when_shown() {
    let mut ex = session(ToyModel::default());
    ex.refresh();
    ex.dispatch(ControlEvent::visibility("B", false));
    let stale = ex.registry().cached("B").to_vec();

    ex.dispatch(ControlEvent::slider("p", 2.5));
    assert_eq!(ex.registry().cached("B"), stale.as_slice());

    clear_calls(&ex);
    ex.dispatch(ControlEvent::visibility("B", true));
    assert_eq!(calls(&ex), [NU_B]);
    assert_ne!(ex.registry().cached("B"), stale.as_slice());
}

// ============================================================================
// 2. Recompute semantics
// ============================================================================

#[test]
fn recompute_is_idempotent() {
    let mut ex = session(ToyModel::default());
    ex.refresh();
    let first: Vec<Vec<(f64, f64)>> = ["A", "B"]
        .iter()
        .map(|k| ex.registry().cached(k).to_vec())
        .collect();

    let report = ex.refresh();
    assert!(report.computed.is_empty());
    for (k, cached) in ["A", "B"].iter().zip(&first) {
        assert_eq!(ex.registry().cached(k), cached.as_slice());
    }
}

#[test]
fn failing_series_keeps_prior_cache() {
    let mut ex = session(ToyModel::default());
    ex.refresh();
    let a_before = ex.registry().cached("A").to_vec();
    let b_before = ex.registry().cached("B").to_vec();

    // Rebuild the same session with a model that fails for B only.
    let (store, panel, registry, _, renderer) = ex.into_parts();
    let failing = ToyModel {
        fail_at: Some(NU_B),
        ..ToyModel::default()
    };
    let controller = RecomputeController::new(failing, TimeGrid::log_spaced(1.0, 6.0, 30).unwrap());
    let mut ex = Explorer::new(store, panel, registry, controller, renderer).unwrap();

    let report = ex.dispatch(ControlEvent::slider("p", 2.6)).report.unwrap();
    assert_eq!(report.computed, ["A"]);
    let failure = report.failure("B").unwrap();
    assert!(matches!(
        failure.failure,
        EvaluationFailure::Model(ModelError::InvalidParameters(_))
    ));
    assert_ne!(ex.registry().cached("A"), a_before.as_slice());
    assert_eq!(ex.registry().cached("B"), b_before.as_slice());
}

#[test]
fn one_burst_one_model_pass() {
    let mut ex = session(ToyModel::default());
    ex.refresh();
    clear_calls(&ex);

    let events = (0..50).map(|i| ControlEvent::slider("p", 2.0 + f64::from(i) * 0.02));
    let out = ex.dispatch_batch(events);

    assert!(out.warnings.is_empty());
    assert_eq!(calls(&ex).len(), 2);
    assert!((ex.store().number("p").unwrap() - 2.98).abs() < 1e-9);
}

// ============================================================================
// 3. Controls
// ============================================================================

#[test]
fn log_slider_scenario() {
    let mut ex = session(ToyModel::default());
    ex.dispatch(ControlEvent::slider("log10_E0", 52.0));
    assert!((ex.store().number("E0").unwrap() / 1e52 - 1.0).abs() < 1e-9);

    let out = ex.dispatch(ControlEvent::slider("log10_E0", 55.5));
    assert!(matches!(
        &out.warnings[..],
        [ControlWarning::Rejected {
            error: BindingError::Domain(DomainError::OutOfRange { .. }),
            ..
        }]
    ));
    assert!((ex.store().number("E0").unwrap() / 1e52 - 1.0).abs() < 1e-9);
    assert!((slider(&ex, "log10_E0") - 52.0).abs() < 1e-9);
}

#[test]
fn toggle_forces_override_and_restores_slider() {
    let mut ex = session(ToyModel::default());
    ex.dispatch(ControlEvent::slider("log10_L0", 49.5));

    ex.dispatch(ControlEvent::toggle("Energy Injection", false));
    assert_eq!(ex.store().number("L0"), Some(0.0));
    assert_eq!(ex.store().flag("injection"), Some(false));
    assert!((slider(&ex, "log10_L0") - 49.5).abs() < 1e-9);

    // The disabled slider still moves but does not reach the store.
    ex.dispatch(ControlEvent::slider("log10_L0", 50.0));
    assert_eq!(ex.store().number("L0"), Some(0.0));

    ex.dispatch(ControlEvent::toggle("Energy Injection", true));
    assert!((ex.store().number("L0").unwrap() / 1e50 - 1.0).abs() < 1e-9);
}

#[test]
fn disabled_slider_out_of_range_does_not_lock_toggle() {
    let mut ex = session(ToyModel::default());
    ex.dispatch(ControlEvent::slider("log10_L0", 49.5));
    ex.dispatch(ControlEvent::toggle("Energy Injection", false));

    let out = ex.dispatch(ControlEvent::slider("log10_L0", 60.0));
    assert!(matches!(
        &out.warnings[..],
        [ControlWarning::Rejected {
            error: BindingError::Domain(DomainError::OutOfRange { .. }),
            ..
        }]
    ));
    assert!((slider(&ex, "log10_L0") - 49.5).abs() < 1e-9);
    assert_eq!(ex.store().number("L0"), Some(0.0));

    let out = ex.dispatch(ControlEvent::toggle("Energy Injection", true));
    assert!(out.warnings.is_empty());
    assert_eq!(ex.store().flag("injection"), Some(true));
    assert_eq!(
        ex.position("Energy Injection"),
        Some(RawValue::Flag(true))
    );
    assert!((ex.store().number("L0").unwrap() / 10f64.powf(49.5) - 1.0).abs() < 1e-9);
}

#[test]
fn selector_maps_labels_to_tags() {
    let mut ex = session(ToyModel::default());
    ex.refresh();
    let tophat = ex.registry().cached("A")[0].1;

    ex.dispatch(ControlEvent::select("Jet Type", "Gaussian"));
    assert_eq!(ex.store().variant("jetType"), Some("gaussian"));
    assert!((ex.registry().cached("A")[0].1 / tophat - 0.5).abs() < 1e-12);

    let out = ex.dispatch(ControlEvent::select("Jet Type", "Cone"));
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(ex.store().variant("jetType"), Some("gaussian"));
    assert_eq!(
        ex.position("Jet Type"),
        Some(RawValue::Label("Gaussian".into()))
    );
}

#[test]
fn wrong_kind_is_a_warning() {
    let mut ex = session(ToyModel::default());
    let out = ex.dispatch(ControlEvent::toggle("p", true));
    assert!(matches!(
        &out.warnings[..],
        [ControlWarning::Rejected {
            error: BindingError::WrongKind { .. },
            ..
        }]
    ));
}

// ============================================================================
// 4. Reset
// ============================================================================

#[test]
fn reset_restores_everything_with_one_recompute() {
    let mut ex = session(ToyModel::default());
    ex.refresh();
    ex.dispatch_batch([
        ControlEvent::slider("log10_E0", 53.0),
        ControlEvent::slider("p", 2.8),
        ControlEvent::toggle("Energy Injection", false),
        ControlEvent::select("Jet Type", "Gaussian"),
        ControlEvent::visibility("A", false),
        ControlEvent::visibility("C", true),
    ]);

    let before = ex.controller().recomputes();
    let out = ex.dispatch(ControlEvent::Reset);
    assert!(out.warnings.is_empty());
    assert_eq!(ex.controller().recomputes(), before + 1);

    let store = ex.store();
    assert!((store.number("E0").unwrap() / 1e51 - 1.0).abs() < 1e-9);
    assert_eq!(store.number("p"), Some(2.2));
    assert_eq!(store.flag("injection"), Some(true));
    assert_eq!(store.variant("jetType"), Some("tophat"));
    assert!((slider(&ex, "log10_E0") - 51.0).abs() < 1e-9);
    assert!((slider(&ex, "log10_L0") - 47.0).abs() < 1e-9);
    assert_eq!(ex.position("Energy Injection"), Some(RawValue::Flag(true)));

    let visible: HashSet<&str> = ex.registry().visible_keys().collect();
    assert_eq!(visible, HashSet::from(["A", "B"]));
    assert!(ex.renderer().series("A").unwrap().visible);
    assert!(!ex.renderer().series("C").unwrap().visible);
}

#[test]
fn reset_then_edit_in_one_batch() {
    let mut ex = session(ToyModel::default());
    ex.refresh();
    let before = ex.controller().recomputes();

    ex.dispatch_batch([
        ControlEvent::slider("p", 2.9),
        ControlEvent::Reset,
        ControlEvent::slider("p", 2.5),
    ]);

    assert_eq!(ex.controller().recomputes(), before + 1);
    assert_eq!(ex.store().number("p"), Some(2.5));
    assert!(ex.registry().cache_is_current("A", &ex.snapshot()));
}
