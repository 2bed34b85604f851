//! Restoring the whole session to its declared defaults.

use crate::model::Model;
use crate::panel::ControlPanel;
use crate::recompute::{RecomputeController, RecomputeReport};
use crate::render::Renderer;
use crate::series::SeriesRegistry;
use crate::store::ParameterStore;

/// Runs the reset sequence.
///
/// Parameters, control positions and band visibility are restored first;
/// only then does a single recompute run, so no intermediate half-reset state
/// is ever evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetCoordinator {
    resets: u64,
}

impl ResetCoordinator {
    /// Creates a coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resets performed.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Restores store, controls and visibility without recomputing.
    ///
    /// Callers batching several events use this and recompute once at the end.
    pub fn restore(
        &mut self,
        store: &mut ParameterStore,
        panel: &mut ControlPanel,
        registry: &mut SeriesRegistry,
    ) {
        self.resets += 1;
        store.reset_to_defaults();
        panel.sync_from_store(store);
        registry.reset_visibility();

        #[cfg(feature = "tracing")]
        tracing::info!("reset #{}: defaults restored", self.resets);
    }

    /// Restores everything, then recomputes exactly once.
    pub fn reset<M: Model, R: Renderer + ?Sized>(
        &mut self,
        store: &mut ParameterStore,
        panel: &mut ControlPanel,
        registry: &mut SeriesRegistry,
        controller: &mut RecomputeController<M>,
        renderer: &mut R,
    ) -> RecomputeReport {
        self.restore(store, panel, registry);
        controller.on_change(store, registry, renderer)
    }
}
