//! Off-thread model evaluation with last-submitted-wins semantics.
//!
//! [`BackgroundEvaluator`] moves the expensive model call onto a worker
//! thread so a front end can keep handling input while a recompute is in
//! flight. Each submission is tagged with a generation number. The worker
//! drops queued requests that a newer submission has superseded, and
//! [`poll`](BackgroundEvaluator::poll) only applies a result whose
//! generation is the newest submitted. An evaluation already running when a
//! newer one arrives finishes and is then discarded.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::Mutex;

use crate::error::ModelEvaluationError;
use crate::model::{Model, TimeGrid};
use crate::recompute::evaluate_series;
use crate::series::{Frequency, SeriesRegistry};
use crate::store::{ParameterSnapshot, ParameterStore};

struct Request {
    generation: u64,
    snapshot: ParameterSnapshot,
    series: Vec<(String, Frequency)>,
}

struct Completed {
    generation: u64,
    snapshot: ParameterSnapshot,
    outcomes: Vec<(String, Result<Vec<(f64, f64)>, ModelEvaluationError>)>,
}

/// A result that was applied to the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedEvaluation {
    /// Generation of the submission this result belongs to.
    pub generation: u64,
    /// Bands whose cache was updated.
    pub computed: Vec<String>,
    /// Bands whose evaluation failed; their cache is untouched.
    pub failures: Vec<ModelEvaluationError>,
}

/// Runs model evaluations on a dedicated thread.
pub struct BackgroundEvaluator {
    requests: Option<Sender<Request>>,
    results: Receiver<Completed>,
    latest: Arc<Mutex<u64>>,
    submitted: u64,
    applied: u64,
    discarded: u64,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for BackgroundEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundEvaluator")
            .field("submitted", &self.submitted)
            .field("applied", &self.applied)
            .field("discarded", &self.discarded)
            .finish_non_exhaustive()
    }
}

impl BackgroundEvaluator {
    /// Starts the worker thread.
    pub fn spawn<M>(model: Arc<M>, grid: TimeGrid) -> std::io::Result<Self>
    where
        M: Model + Send + Sync + ?Sized + 'static,
    {
        let (request_tx, request_rx) = unbounded::<Request>();
        let (result_tx, result_rx) = unbounded::<Completed>();
        let latest = Arc::new(Mutex::new(0u64));
        let worker_latest = Arc::clone(&latest);

        let handle = std::thread::Builder::new()
            .name("afterscope-eval".into())
            .spawn(move || worker_loop(&*model, &grid, &request_rx, &result_tx, &worker_latest))?;

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            latest,
            submitted: 0,
            applied: 0,
            discarded: 0,
            handle: Some(handle),
        })
    }

    /// Queues evaluation of every visible band not current for the store.
    ///
    /// Returns the new generation. The store is marked clean only once the
    /// request reaches the worker; if the worker is gone it stays dirty.
    pub fn submit(&mut self, store: &mut ParameterStore, registry: &SeriesRegistry) -> u64 {
        let snapshot = store.snapshot();
        let series = registry
            .visible_keys()
            .filter(|k| !registry.cache_is_current(k, &snapshot))
            .filter_map(|k| {
                registry
                    .descriptor(k)
                    .map(|d| (k.to_string(), d.frequency.clone()))
            })
            .collect();

        self.submitted += 1;
        let generation = self.submitted;
        *self.latest.lock() = generation;

        let sent = self.requests.as_ref().is_some_and(|tx| {
            tx.send(Request {
                generation,
                snapshot,
                series,
            })
            .is_ok()
        });
        if sent {
            store.mark_clean();
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("background evaluator: worker gone, generation {generation} dropped");
        }
        generation
    }

    /// Newest generation submitted so far (0 before the first submission).
    pub fn latest_generation(&self) -> u64 {
        self.submitted
    }

    /// Generation of the last applied result (0 if none).
    pub fn applied_generation(&self) -> u64 {
        self.applied
    }

    /// Number of results thrown away because a newer submission existed.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Applies the newest finished result, if one is waiting.
    ///
    /// Never blocks. Older results are discarded.
    pub fn poll(&mut self, registry: &mut SeriesRegistry) -> Option<AppliedEvaluation> {
        let mut applied = None;
        while let Ok(done) = self.results.try_recv() {
            if let Some(a) = self.accept(done, registry) {
                applied = Some(a);
            }
        }
        applied
    }

    /// Blocks until the newest submission's result is applied or `timeout`
    /// elapses.
    pub fn wait_for(&mut self, registry: &mut SeriesRegistry, timeout: Duration) -> Option<AppliedEvaluation> {
        let deadline = Instant::now() + timeout;
        while self.applied < self.submitted {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(done) => {
                    if let Some(a) = self.accept(done, registry) {
                        return Some(a);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
        None
    }

    fn accept(&mut self, done: Completed, registry: &mut SeriesRegistry) -> Option<AppliedEvaluation> {
        if done.generation != self.submitted {
            self.discarded += 1;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "background evaluator: discarding generation {} (newest {})",
                done.generation,
                self.submitted
            );
            return None;
        }

        let mut applied = AppliedEvaluation {
            generation: done.generation,
            computed: Vec::new(),
            failures: Vec::new(),
        };
        for (key, outcome) in done.outcomes {
            match outcome {
                Ok(pairs) => {
                    registry.update_cache(&key, pairs, done.snapshot.clone());
                    applied.computed.push(key);
                }
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("background evaluator: {err}");
                    applied.failures.push(err);
                }
            }
        }
        self.applied = done.generation;
        Some(applied)
    }
}

impl Drop for BackgroundEvaluator {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop<M: Model + ?Sized>(
    model: &M,
    grid: &TimeGrid,
    requests: &Receiver<Request>,
    results: &Sender<Completed>,
    latest: &Mutex<u64>,
) {
    while let Ok(mut request) = requests.recv() {
        // Skip everything but the newest queued request.
        while let Ok(newer) = requests.try_recv() {
            request = newer;
        }
        if request.generation < *latest.lock() {
            continue;
        }

        let outcomes = request
            .series
            .into_iter()
            .map(|(key, frequency)| {
                let result = evaluate_series(model, grid, &key, &frequency, &request.snapshot);
                (key, result)
            })
            .collect();

        let done = Completed {
            generation: request.generation,
            snapshot: request.snapshot,
            outcomes,
        };
        if results.send(done).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::param_info::{ParamDescriptor, ParamValue};
    use crate::series::SeriesDescriptor;

    fn scaled(t: &[f64], _: &Frequency, p: &ParameterSnapshot) -> Result<Vec<f64>, ModelError> {
        let a = p.number("a").ok_or(ModelError::MissingParameter("a".into()))?;
        Ok(vec![a; t.len()])
    }

    type ScaledModel = fn(&[f64], &Frequency, &ParameterSnapshot) -> Result<Vec<f64>, ModelError>;

    #[test]
    fn newest_submission_wins() {
        let mut store = ParameterStore::new([ParamDescriptor::linear("a", 0.0, 10.0, 1.0)]).unwrap();
        let mut registry = SeriesRegistry::new([SeriesDescriptor::new("A", Frequency::Single(1.0))]).unwrap();
        let model: Arc<ScaledModel> = Arc::new(scaled);
        let mut eval = BackgroundEvaluator::spawn(model, TimeGrid::new(vec![1.0, 2.0]).unwrap()).unwrap();

        for a in [2.0, 3.0, 4.0] {
            store.set("a", ParamValue::Number(a)).unwrap();
            eval.submit(&mut store, &registry);
        }
        assert_eq!(eval.latest_generation(), 3);

        let applied = eval
            .wait_for(&mut registry, Duration::from_secs(10))
            .unwrap();
        assert_eq!(applied.generation, 3);
        assert_eq!(registry.cached("A"), &[(1.0, 4.0), (2.0, 4.0)]);
        assert!(registry.cache_is_current("A", &store.snapshot()));

        // Anything still in flight is older and must not overwrite the cache.
        std::thread::sleep(Duration::from_millis(20));
        assert!(eval.poll(&mut registry).is_none());
        assert_eq!(registry.cached("A"), &[(1.0, 4.0), (2.0, 4.0)]);
    }

    #[test]
    fn store_stays_dirty_when_worker_is_gone() {
        let mut store = ParameterStore::new([ParamDescriptor::linear("a", 0.0, 10.0, 1.0)]).unwrap();
        let registry = SeriesRegistry::new([SeriesDescriptor::new("A", Frequency::Single(1.0))]).unwrap();
        let model: Arc<ScaledModel> = Arc::new(scaled);
        let mut eval = BackgroundEvaluator::spawn(model, TimeGrid::new(vec![1.0]).unwrap()).unwrap();

        store.set("a", ParamValue::Number(2.0)).unwrap();
        eval.submit(&mut store, &registry);
        assert!(!store.is_dirty());

        // Shut the worker down, then submit again.
        eval.requests.take();
        if let Some(handle) = eval.handle.take() {
            handle.join().unwrap();
        }
        store.set("a", ParamValue::Number(3.0)).unwrap();
        eval.submit(&mut store, &registry);
        assert!(store.is_dirty());
    }

    #[test]
    fn failures_leave_cache_alone() {
        let mut store = ParameterStore::new([ParamDescriptor::linear("b", 0.0, 10.0, 1.0)]).unwrap();
        let mut registry = SeriesRegistry::new([SeriesDescriptor::new("A", Frequency::Single(1.0))]).unwrap();
        let model: Arc<ScaledModel> = Arc::new(scaled);
        let mut eval = BackgroundEvaluator::spawn(model, TimeGrid::new(vec![1.0]).unwrap()).unwrap();

        eval.submit(&mut store, &registry);
        let applied = eval
            .wait_for(&mut registry, Duration::from_secs(10))
            .unwrap();
        assert!(applied.computed.is_empty());
        assert_eq!(applied.failures[0].series, "A");
        assert!(registry.cached("A").is_empty());
    }
}
