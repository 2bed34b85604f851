//! Turning a [`SessionConfig`] into live engine objects.

use afterscope_core::{
    ChoiceOption, ControlBinding, ControlPanel, DiscreteBinding, Explorer, Frequency,
    LinearBinding, LogBinding, Model, OverrideBinding, ParamDescriptor, ParameterStore,
    RecomputeController, Renderer, SeriesDescriptor, SeriesRegistry, TimeGrid,
};

use crate::error::ConfigError;
use crate::session::{
    ChoiceConfig, FixedParam, FixedValue, FrequencyConfig, Scale, SeriesConfig, SessionConfig,
    SliderConfig, TimeGridConfig,
};
use crate::validation::validate_session;

/// Engine objects built from a session, ready to hand to an
/// [`Explorer`].
#[derive(Debug)]
pub struct SessionParts {
    /// Parameters at their defaults.
    pub store: ParameterStore,
    /// Controls positioned at the defaults.
    pub panel: ControlPanel,
    /// Bands with empty caches.
    pub registry: SeriesRegistry,
    /// Sample times.
    pub grid: TimeGrid,
}

impl TimeGridConfig {
    /// Builds the sample times.
    pub fn build(&self) -> Result<TimeGrid, ConfigError> {
        let grid = match self {
            TimeGridConfig::Log {
                start,
                stop,
                points,
            } => TimeGrid::log_spaced(start.log10(), stop.log10(), *points)?,
            TimeGridConfig::Explicit { times } => TimeGrid::new(times.clone())?,
        };
        Ok(grid)
    }
}

impl FixedParam {
    /// Descriptor of a constant: a zero-width numeric domain or a single
    /// variant.
    pub fn descriptor(&self) -> ParamDescriptor {
        let desc = match &self.value {
            FixedValue::Number(v) => ParamDescriptor::linear(&self.name, *v, *v, *v),
            FixedValue::Variant(tag) => {
                ParamDescriptor::discrete(&self.name, [tag.as_str()], tag.as_str())
            }
        };
        match self.unit {
            Some(unit) => desc.with_unit(unit.into()),
            None => desc,
        }
    }
}

impl SliderConfig {
    /// Descriptor of the slider's parameter.
    pub fn descriptor(&self) -> ParamDescriptor {
        let mut desc = match self.scale {
            Scale::Linear => ParamDescriptor::linear(&self.param, self.min, self.max, self.default),
            Scale::Log10 => ParamDescriptor::log10(&self.param, self.min, self.max, self.default),
        }
        .with_label(self.control_id())
        .with_group(self.group.clone());
        if let Some(step) = self.step {
            desc = desc.with_step(step);
        }
        if let Some(unit) = self.unit {
            desc = desc.with_unit(unit.into());
        }
        desc
    }

    fn binding(&self, desc: &ParamDescriptor) -> Result<Box<dyn ControlBinding>, ConfigError> {
        let id = self.control_id();
        Ok(match self.scale {
            Scale::Linear => Box::new(LinearBinding::new(id, desc)?),
            Scale::Log10 => Box::new(LogBinding::new(id, desc)?),
        })
    }
}

impl ChoiceConfig {
    /// Descriptor of the selector's parameter; its variants are the option
    /// tags.
    pub fn descriptor(&self) -> ParamDescriptor {
        let default = self.default_tag().unwrap_or(&self.default);
        ParamDescriptor::discrete(
            &self.param,
            self.options.iter().map(|o| o.tag.as_str()),
            default,
        )
        .with_label(self.control_id())
    }

    fn binding(&self, desc: &ParamDescriptor) -> Result<Box<dyn ControlBinding>, ConfigError> {
        let options = self
            .options
            .iter()
            .map(|o| ChoiceOption::new(&o.label, &o.tag))
            .collect();
        Ok(Box::new(DiscreteBinding::new(self.control_id(), desc, options)?))
    }
}

impl SeriesConfig {
    /// Descriptor of the band.
    pub fn descriptor(&self) -> SeriesDescriptor {
        let frequency = match &self.frequency {
            FrequencyConfig::Single(nu) => Frequency::Single(*nu),
            FrequencyConfig::Set(nus) => Frequency::Set(nus.clone()),
        };
        let mut desc = SeriesDescriptor::new(&self.key, frequency).with_group(self.group.into());
        if let Some(style) = self.style {
            desc = desc.with_style(style.into());
        }
        if !self.visible {
            desc = desc.hidden();
        }
        desc
    }
}

impl SessionConfig {
    /// Every parameter the session declares, in store order: fixed values,
    /// sliders, toggle flags, selectors.
    pub fn descriptors(&self) -> Vec<ParamDescriptor> {
        let fixed = self.fixed.iter().map(FixedParam::descriptor);
        let sliders = self.sliders.iter().map(|s| {
            let desc = s.descriptor();
            match self.toggle_for(&s.param) {
                Some(t) => desc.with_override(t.override_value),
                None => desc,
            }
        });
        let flags = self
            .toggles
            .iter()
            .map(|t| ParamDescriptor::flag(&t.flag, t.default).with_label(&t.control));
        let choices = self.choices.iter().map(ChoiceConfig::descriptor);
        fixed.chain(sliders).chain(flags).chain(choices).collect()
    }

    /// Validates the session and builds store, panel, registry and grid.
    pub fn build(&self) -> Result<SessionParts, ConfigError> {
        validate_session(self)?;

        let store = ParameterStore::new(self.descriptors())?;
        let panel = self.build_panel(&store)?;
        panel.validate(&store)?;
        let registry = SeriesRegistry::new(self.series.iter().map(SeriesConfig::descriptor))?;
        let grid = self.time_grid.build()?;

        tracing::debug!(
            session = %self.name,
            params = store.len(),
            controls = panel.control_ids().count(),
            series = registry.len(),
            samples = grid.len(),
            "assembled session"
        );

        Ok(SessionParts {
            store,
            panel,
            registry,
            grid,
        })
    }

    fn build_panel(&self, store: &ParameterStore) -> Result<ControlPanel, ConfigError> {
        let mut panel = ControlPanel::new();

        for slider in &self.sliders {
            let desc = lookup(store, &slider.param, &slider.control_id())?;
            let binding = slider.binding(desc)?;
            let slider_id = slider.control_id();

            match self.toggle_for(&slider.param) {
                Some(toggle) => {
                    let flag = lookup(store, &toggle.flag, &toggle.control)?;
                    let composed = OverrideBinding::new(&toggle.control, flag, desc, binding)?;
                    panel.add(
                        Box::new(composed),
                        &[toggle.control.as_str(), slider_id.as_str()],
                    )?;
                }
                None => panel.add(binding, &[slider_id.as_str()])?,
            }
        }

        for choice in &self.choices {
            let desc = lookup(store, &choice.param, choice.control_id())?;
            panel.add_single(choice.binding(desc)?)?;
        }

        Ok(panel)
    }

    /// Builds a ready-to-run session around `model` and `renderer`.
    pub fn into_explorer<M: Model, R: Renderer>(
        &self,
        model: M,
        renderer: R,
    ) -> Result<Explorer<M, R>, ConfigError> {
        let parts = self.build()?;
        let controller = RecomputeController::new(model, parts.grid);
        Ok(Explorer::new(
            parts.store,
            parts.panel,
            parts.registry,
            controller,
            renderer,
        )?)
    }
}

fn lookup<'a>(
    store: &'a ParameterStore,
    param: &str,
    control: &str,
) -> Result<&'a ParamDescriptor, ConfigError> {
    store.descriptor(param).ok_or_else(|| {
        afterscope_core::ConfigurationError::UnboundParameter {
            control: control.to_string(),
            param: param.to_string(),
        }
        .into()
    })
}
