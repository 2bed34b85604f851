//! The interactive session.
//!
//! An [`Explorer`] owns the parameter store, the control panel, the band
//! registry, the recompute controller and the renderer. Front ends translate
//! widget callbacks into [`ControlEvent`]s and hand them over one at a time
//! or in batches. Every batch applies its writes in order and then runs at
//! most one recompute, so a burst of slider motion costs one model pass.

use thiserror::Error;

use crate::binding::RawValue;
use crate::error::{BindingError, ConfigurationError};
use crate::model::Model;
use crate::panel::ControlPanel;
use crate::recompute::{RecomputeController, RecomputeReport};
use crate::render::Renderer;
use crate::reset::ResetCoordinator;
use crate::series::SeriesRegistry;
use crate::store::{ParameterSnapshot, ParameterStore};

/// A user action on one control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// A slider moved to a raw (control-space) position.
    Slider {
        /// Control id.
        control: String,
        /// New position.
        value: f64,
    },
    /// A selector picked an option by label.
    Select {
        /// Control id.
        control: String,
        /// Option label.
        label: String,
    },
    /// A toggle switched.
    Toggle {
        /// Control id.
        control: String,
        /// New state.
        enabled: bool,
    },
    /// A band checkbox was set.
    Visibility {
        /// Band key.
        series: String,
        /// New visibility.
        visible: bool,
    },
    /// A band checkbox was clicked (flips the current state).
    FlipVisibility {
        /// Band key.
        series: String,
    },
    /// The reset button was pressed.
    Reset,
}

impl ControlEvent {
    /// Slider event.
    pub fn slider(control: impl Into<String>, value: f64) -> Self {
        Self::Slider {
            control: control.into(),
            value,
        }
    }

    /// Selector event.
    pub fn select(control: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Select {
            control: control.into(),
            label: label.into(),
        }
    }

    /// Toggle event.
    pub fn toggle(control: impl Into<String>, enabled: bool) -> Self {
        Self::Toggle {
            control: control.into(),
            enabled,
        }
    }

    /// Visibility event.
    pub fn visibility(series: impl Into<String>, visible: bool) -> Self {
        Self::Visibility {
            series: series.into(),
            visible,
        }
    }

    /// Checkbox click.
    pub fn flip(series: impl Into<String>) -> Self {
        Self::FlipVisibility {
            series: series.into(),
        }
    }
}

/// An event that could not be applied. Processing continues after it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlWarning {
    /// The binding or the store rejected the input; the control was snapped
    /// back to the stored value.
    #[error("control '{control}': {error}")]
    Rejected {
        /// Control id.
        control: String,
        /// Cause.
        #[source]
        error: BindingError,
    },
    /// A visibility event named an undeclared band.
    #[error("unknown series '{0}'")]
    UnknownSeries(String),
}

/// Result of dispatching one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Events that were rejected, in order.
    pub warnings: Vec<ControlWarning>,
    /// The batch's recompute, if anything changed.
    pub report: Option<RecomputeReport>,
}

impl DispatchOutcome {
    /// Returns `true` if the batch triggered a recompute.
    pub fn recomputed(&self) -> bool {
        self.report.is_some()
    }
}

/// One exploration session.
#[derive(Debug)]
pub struct Explorer<M, R> {
    store: ParameterStore,
    panel: ControlPanel,
    registry: SeriesRegistry,
    controller: RecomputeController<M>,
    renderer: R,
    resets: ResetCoordinator,
}

impl<M: Model, R: Renderer> Explorer<M, R> {
    /// Assembles a session.
    ///
    /// Fails if a control drives a parameter the store does not declare.
    /// Controls are positioned from the store; nothing is evaluated until
    /// the first [`refresh`](Self::refresh) or dispatch.
    pub fn new(
        store: ParameterStore,
        mut panel: ControlPanel,
        registry: SeriesRegistry,
        controller: RecomputeController<M>,
        renderer: R,
    ) -> Result<Self, ConfigurationError> {
        panel.validate(&store)?;
        panel.sync_from_store(&store);
        Ok(Self {
            store,
            panel,
            registry,
            controller,
            renderer,
            resets: ResetCoordinator::new(),
        })
    }

    /// Recomputes and redraws unconditionally.
    pub fn refresh(&mut self) -> RecomputeReport {
        self.controller
            .on_change(&mut self.store, &mut self.registry, &mut self.renderer)
    }

    /// Applies one event and recomputes if it changed anything.
    pub fn dispatch(&mut self, event: ControlEvent) -> DispatchOutcome {
        self.dispatch_batch([event])
    }

    /// Applies events in order, then recomputes at most once.
    ///
    /// A reset in the batch restores defaults at its position in the
    /// sequence; later events in the same batch apply on top of it.
    pub fn dispatch_batch(&mut self, events: impl IntoIterator<Item = ControlEvent>) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let mut visibility_changed = false;
        let mut reset = false;

        for event in events {
            let warning = match event {
                ControlEvent::Slider { control, value } => {
                    self.input(control, RawValue::Number(value))
                }
                ControlEvent::Select { control, label } => self.input(control, RawValue::Label(label)),
                ControlEvent::Toggle { control, enabled } => {
                    self.input(control, RawValue::Flag(enabled))
                }
                ControlEvent::Visibility { series, visible } => {
                    if self.registry.set_visible(&series, visible) {
                        visibility_changed = true;
                        None
                    } else {
                        Some(ControlWarning::UnknownSeries(series))
                    }
                }
                ControlEvent::FlipVisibility { series } => {
                    let visible = !self.registry.is_visible(&series);
                    if self.registry.set_visible(&series, visible) {
                        visibility_changed = true;
                        None
                    } else {
                        Some(ControlWarning::UnknownSeries(series))
                    }
                }
                ControlEvent::Reset => {
                    self.resets
                        .restore(&mut self.store, &mut self.panel, &mut self.registry);
                    reset = true;
                    None
                }
            };
            if let Some(w) = warning {
                #[cfg(feature = "tracing")]
                tracing::warn!("{w}");
                outcome.warnings.push(w);
            }
        }

        if reset || visibility_changed || self.store.is_dirty() {
            outcome.report = Some(self.refresh());
        }
        outcome
    }

    fn input(&mut self, control: String, raw: RawValue) -> Option<ControlWarning> {
        self.panel
            .input(&mut self.store, &control, raw)
            .err()
            .map(|error| ControlWarning::Rejected { control, error })
    }

    /// Canonical parameter state.
    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    /// Snapshot of the current parameters.
    pub fn snapshot(&self) -> ParameterSnapshot {
        self.store.snapshot()
    }

    /// Controls.
    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    /// Current position of a control.
    pub fn position(&self, control: &str) -> Option<RawValue> {
        self.panel.position(control)
    }

    /// Bands.
    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    /// Recompute controller.
    pub fn controller(&self) -> &RecomputeController<M> {
        &self.controller
    }

    /// Renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable renderer access.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Number of resets performed.
    pub fn resets(&self) -> u64 {
        self.resets.resets()
    }

    /// Takes the session apart.
    pub fn into_parts(self) -> (ParameterStore, ControlPanel, SeriesRegistry, RecomputeController<M>, R) {
        (self.store, self.panel, self.registry, self.controller, self.renderer)
    }
}
