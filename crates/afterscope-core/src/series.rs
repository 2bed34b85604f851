//! Plotted bands and their cached light curves.
//!
//! [`SeriesRegistry`] keeps one entry per band in declaration order. Each
//! entry holds the band's evaluation frequency, its visibility flag, and the
//! `(time, flux)` pairs from the last successful model evaluation together
//! with the snapshot they were computed from.
//!
//! Visibility changes are pure state changes; deciding whether a newly
//! visible band needs a fresh evaluation is the recompute controller's job.

use std::collections::HashMap;

use crate::error::ConfigurationError;
use crate::store::ParameterSnapshot;

/// Frequency (Hz) at which a band is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Frequency {
    /// One frequency.
    Single(f64),
    /// Several frequencies (e.g. a filter's sample points); the model decides
    /// how to combine them.
    Set(Vec<f64>),
}

impl Frequency {
    /// All frequencies as a slice.
    pub fn values(&self) -> &[f64] {
        match self {
            Frequency::Single(nu) => core::slice::from_ref(nu),
            Frequency::Set(nus) => nus,
        }
    }

    /// Geometric mean of the frequencies, used for display.
    pub fn representative(&self) -> f64 {
        match self {
            Frequency::Single(nu) => *nu,
            Frequency::Set(nus) if nus.is_empty() => 0.0,
            Frequency::Set(nus) => {
                let mean_log = nus.iter().map(|nu| nu.ln()).sum::<f64>() / nus.len() as f64;
                mean_log.exp()
            }
        }
    }

    fn validate(&self, series: &str) -> Result<(), ConfigurationError> {
        let values = self.values();
        if values.is_empty() {
            return Err(ConfigurationError::InvalidFrequency {
                series: series.to_string(),
                reason: "frequency set is empty".to_string(),
            });
        }
        if let Some(nu) = values.iter().find(|nu| !nu.is_finite() || **nu <= 0.0) {
            return Err(ConfigurationError::InvalidFrequency {
                series: series.to_string(),
                reason: format!("{nu} Hz is not a positive finite frequency"),
            });
        }
        Ok(())
    }
}

/// Wavelength regime of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BandGroup {
    /// Optical and near-infrared filters.
    Optical,
    /// X-ray.
    XRay,
    /// Radio.
    Radio,
    /// Anything else.
    #[default]
    Other,
}

impl BandGroup {
    /// Line style used when the band declares none.
    pub const fn default_style(self) -> LineStyle {
        match self {
            BandGroup::Optical | BandGroup::Other => LineStyle::Solid,
            BandGroup::XRay => LineStyle::Dashed,
            BandGroup::Radio => LineStyle::Dotted,
        }
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            BandGroup::Optical => "optical",
            BandGroup::XRay => "xray",
            BandGroup::Radio => "radio",
            BandGroup::Other => "other",
        }
    }
}

/// Stroke pattern of a plotted curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineStyle {
    /// `-`
    #[default]
    Solid,
    /// `--`
    Dashed,
    /// `:`
    Dotted,
    /// `-.`
    DashDot,
}

impl LineStyle {
    /// Matplotlib-style pattern string.
    pub const fn pattern(self) -> &'static str {
        match self {
            LineStyle::Solid => "-",
            LineStyle::Dashed => "--",
            LineStyle::Dotted => ":",
            LineStyle::DashDot => "-.",
        }
    }
}

/// Declared properties of a band.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDescriptor {
    /// Unique key (e.g. `"r"`, `"radio(6GHz)"`).
    pub key: String,
    /// Evaluation frequency.
    pub frequency: Frequency,
    /// Visibility at startup and after reset.
    pub visible: bool,
    /// Wavelength regime.
    pub group: BandGroup,
    /// Stroke pattern.
    pub style: LineStyle,
}

impl SeriesDescriptor {
    /// A visible band in the [`BandGroup::Other`] group.
    pub fn new(key: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            key: key.into(),
            frequency,
            visible: true,
            group: BandGroup::Other,
            style: LineStyle::Solid,
        }
    }

    /// Sets the group and adopts its default style.
    pub fn with_group(mut self, group: BandGroup) -> Self {
        self.group = group;
        self.style = group.default_style();
        self
    }

    /// Overrides the line style.
    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    /// Starts hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Debug, Clone)]
struct SeriesEntry {
    descriptor: SeriesDescriptor,
    visible: bool,
    cache: Vec<(f64, f64)>,
    computed_from: Option<ParameterSnapshot>,
}

/// All bands of the plot, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SeriesRegistry {
    entries: Vec<SeriesEntry>,
    index: HashMap<String, usize>,
}

impl SeriesRegistry {
    /// Builds a registry from declared bands.
    ///
    /// Fails on duplicate keys or unusable frequencies.
    pub fn new(
        descriptors: impl IntoIterator<Item = SeriesDescriptor>,
    ) -> Result<Self, ConfigurationError> {
        let mut registry = Self::default();
        for desc in descriptors {
            registry.insert(desc)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, descriptor: SeriesDescriptor) -> Result<(), ConfigurationError> {
        descriptor.frequency.validate(&descriptor.key)?;
        if self.index.contains_key(&descriptor.key) {
            return Err(ConfigurationError::DuplicateSeries(descriptor.key));
        }
        self.index
            .insert(descriptor.key.clone(), self.entries.len());
        self.entries.push(SeriesEntry {
            visible: descriptor.visible,
            descriptor,
            cache: Vec::new(),
            computed_from: None,
        });
        Ok(())
    }

    fn entry(&self, key: &str) -> Option<&SeriesEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut SeriesEntry> {
        self.index.get(key).map(|&i| &mut self.entries[i])
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no bands are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.descriptor.key.as_str())
    }

    /// Keys of visible bands in insertion order.
    pub fn visible_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.visible)
            .map(|e| e.descriptor.key.as_str())
    }

    /// Declared properties of a band.
    pub fn descriptor(&self, key: &str) -> Option<&SeriesDescriptor> {
        self.entry(key).map(|e| &e.descriptor)
    }

    /// Shows or hides a band. Returns `false` for an unknown key.
    pub fn set_visible(&mut self, key: &str, visible: bool) -> bool {
        match self.entry_mut(key) {
            Some(e) => {
                e.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Whether a band is visible. Unknown keys are not visible.
    pub fn is_visible(&self, key: &str) -> bool {
        self.entry(key).is_some_and(|e| e.visible)
    }

    /// Restores every band's declared visibility.
    pub fn reset_visibility(&mut self) {
        for e in &mut self.entries {
            e.visible = e.descriptor.visible;
        }
    }

    /// Replaces a band's cache. Returns `false` for an unknown key.
    pub fn update_cache(
        &mut self,
        key: &str,
        pairs: Vec<(f64, f64)>,
        snapshot: ParameterSnapshot,
    ) -> bool {
        match self.entry_mut(key) {
            Some(e) => {
                e.cache = pairs;
                e.computed_from = Some(snapshot);
                true
            }
            None => false,
        }
    }

    /// Last computed `(time, flux)` pairs; empty if never computed.
    pub fn cached(&self, key: &str) -> &[(f64, f64)] {
        self.entry(key).map_or(&[], |e| e.cache.as_slice())
    }

    /// Snapshot the cache was computed from.
    pub fn computed_from(&self, key: &str) -> Option<&ParameterSnapshot> {
        self.entry(key).and_then(|e| e.computed_from.as_ref())
    }

    /// Returns `true` if the cache was computed from exactly `snapshot`.
    pub fn cache_is_current(&self, key: &str, snapshot: &ParameterSnapshot) -> bool {
        self.computed_from(key).is_some_and(|s| s == snapshot)
    }
}
