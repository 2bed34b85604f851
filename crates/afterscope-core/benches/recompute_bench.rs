//! Criterion benchmarks for the afterscope-core recompute path
//!
//! Run with: cargo bench -p afterscope-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use afterscope_core::{
    ControlEvent, ControlPanel, Explorer, Frequency, LinearBinding, ModelError, NullRenderer,
    ParamDescriptor, ParamValue, ParameterSnapshot, ParameterStore, RecomputeController,
    SeriesDescriptor, SeriesRegistry, TimeGrid,
};

const GRID_SIZES: &[usize] = &[30, 200, 1000];
const BANDS: &[f64] = &[
    2.8e14, 3.3e14, 4.8e14, 2.4e14, 6.2e14, 4.5e14, 6e9, 1e10, 1.3e9, 2.42e17,
];

type BenchModel = fn(&[f64], &Frequency, &ParameterSnapshot) -> Result<Vec<f64>, ModelError>;

fn broken_power_law(
    t: &[f64],
    nu: &Frequency,
    p: &ParameterSnapshot,
) -> Result<Vec<f64>, ModelError> {
    let slope = p.number("p").ok_or_else(|| ModelError::MissingParameter("p".into()))?;
    let nu = nu.representative();
    Ok(t.iter()
        .map(|t| {
            let rise = (t / 1e3).powf(3.0);
            rise / (1.0 + rise) * (t / 1e3).powf(-0.75 * (slope - 1.0)) * nu.powf(-(slope - 1.0) / 2.0)
        })
        .collect())
}

fn registry() -> SeriesRegistry {
    SeriesRegistry::new(
        BANDS
            .iter()
            .enumerate()
            .map(|(i, nu)| SeriesDescriptor::new(format!("band{i}"), Frequency::Single(*nu))),
    )
    .unwrap()
}

fn bench_on_change(c: &mut Criterion) {
    let mut group = c.benchmark_group("RecomputeController");

    for &size in GRID_SIZES {
        let grid = TimeGrid::log_spaced(1.0, 6.0, size).unwrap();

        group.bench_with_input(BenchmarkId::new("full", size), &size, |b, _| {
            let mut store = ParameterStore::new([ParamDescriptor::linear("p", 2.0, 3.0, 2.2)]).unwrap();
            let mut reg = registry();
            let mut ctl = RecomputeController::new(broken_power_law as BenchModel, grid.clone());
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let p = if flip { 2.3 } else { 2.4 };
                store.set("p", ParamValue::Number(p)).unwrap();
                black_box(ctl.on_change(&mut store, &mut reg, &mut NullRenderer));
            });
        });

        group.bench_with_input(BenchmarkId::new("cached", size), &size, |b, _| {
            let mut store = ParameterStore::new([ParamDescriptor::linear("p", 2.0, 3.0, 2.2)]).unwrap();
            let mut reg = registry();
            let mut ctl = RecomputeController::new(broken_power_law as BenchModel, grid.clone());
            ctl.on_change(&mut store, &mut reg, &mut NullRenderer);
            b.iter(|| black_box(ctl.on_change(&mut store, &mut reg, &mut NullRenderer)));
        });
    }

    group.finish();
}

fn bench_dispatch_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Explorer");

    group.bench_function("slider_burst_64", |b| {
        let store = ParameterStore::new([
            ParamDescriptor::linear("p", 2.0, 3.0, 2.2).with_step(0.01),
        ])
        .unwrap();
        let mut panel = ControlPanel::new();
        panel
            .add_single(Box::new(
                LinearBinding::new("p", store.descriptor("p").unwrap()).unwrap(),
            ))
            .unwrap();
        let ctl = RecomputeController::new(
            broken_power_law as BenchModel,
            TimeGrid::log_spaced(1.0, 6.0, 30).unwrap(),
        );
        let mut explorer = Explorer::new(store, panel, registry(), ctl, NullRenderer).unwrap();

        b.iter(|| {
            let events = (0..64).map(|i| ControlEvent::slider("p", 2.0 + f64::from(i) * 0.01));
            black_box(explorer.dispatch_batch(events));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_on_change, bench_dispatch_batch);
criterion_main!(benches);
