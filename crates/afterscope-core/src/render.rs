//! Rendering backend seam.
//!
//! The engine hands every band to a [`Renderer`] after each recompute and
//! then asks it to rescale the axes. Backends decide how (or whether) to
//! draw; [`RecordingRenderer`] keeps the last frame in memory for tests and
//! headless front ends.

use std::collections::HashMap;

use crate::series::LineStyle;

/// Y-axis scale used to derive autoscale bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    /// Any finite value counts.
    Linear,
    /// Only positive finite values count.
    #[default]
    Log,
}

impl AxisScale {
    fn accepts(self, value: f64) -> bool {
        match self {
            AxisScale::Linear => value.is_finite(),
            AxisScale::Log => value.is_finite() && value > 0.0,
        }
    }
}

/// Data extent of the plotted curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    /// Smallest time.
    pub x_min: f64,
    /// Largest time.
    pub x_max: f64,
    /// Smallest flux.
    pub y_min: f64,
    /// Largest flux.
    pub y_max: f64,
}

impl AxisBounds {
    /// Extent of `(time, flux)` pairs whose values suit `scale`.
    ///
    /// Returns `None` when no pair qualifies.
    pub fn from_values<'a>(
        pairs: impl IntoIterator<Item = &'a (f64, f64)>,
        scale: AxisScale,
    ) -> Option<Self> {
        pairs
            .into_iter()
            .filter(|(t, f)| scale.accepts(*t) && scale.accepts(*f))
            .fold(None, |acc, &(t, f)| {
                Some(match acc {
                    None => AxisBounds {
                        x_min: t,
                        x_max: t,
                        y_min: f,
                        y_max: f,
                    },
                    Some(b) => AxisBounds {
                        x_min: b.x_min.min(t),
                        x_max: b.x_max.max(t),
                        y_min: b.y_min.min(f),
                        y_max: b.y_max.max(f),
                    },
                })
            })
    }
}

/// Drawing backend.
pub trait Renderer {
    /// Replaces the drawn curve of one band.
    fn draw_series(&mut self, key: &str, pairs: &[(f64, f64)], visible: bool, style: LineStyle);

    /// Fits the axes to `bounds`; `None` means nothing visible to fit.
    fn rescale(&mut self, bounds: Option<AxisBounds>);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn draw_series(&mut self, key: &str, pairs: &[(f64, f64)], visible: bool, style: LineStyle) {
        (**self).draw_series(key, pairs, visible, style);
    }

    fn rescale(&mut self, bounds: Option<AxisBounds>) {
        (**self).rescale(bounds);
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn draw_series(&mut self, key: &str, pairs: &[(f64, f64)], visible: bool, style: LineStyle) {
        (**self).draw_series(key, pairs, visible, style);
    }

    fn rescale(&mut self, bounds: Option<AxisBounds>) {
        (**self).rescale(bounds);
    }
}

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_series(&mut self, _: &str, _: &[(f64, f64)], _: bool, _: LineStyle) {}

    fn rescale(&mut self, _: Option<AxisBounds>) {}
}

/// One band as last drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnSeries {
    /// `(time, flux)` pairs.
    pub pairs: Vec<(f64, f64)>,
    /// Whether the curve is shown.
    pub visible: bool,
    /// Stroke pattern.
    pub style: LineStyle,
}

/// Renderer that remembers the last frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    order: Vec<String>,
    series: HashMap<String, DrawnSeries>,
    bounds: Option<AxisBounds>,
    frames: usize,
}

impl RecordingRenderer {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last drawn state of a band.
    pub fn series(&self, key: &str) -> Option<&DrawnSeries> {
        self.series.get(key)
    }

    /// Bands in first-drawn order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Bounds passed to the last [`Renderer::rescale`].
    pub fn bounds(&self) -> Option<AxisBounds> {
        self.bounds
    }

    /// Number of completed frames (rescale calls).
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Renderer for RecordingRenderer {
    fn draw_series(&mut self, key: &str, pairs: &[(f64, f64)], visible: bool, style: LineStyle) {
        let drawn = DrawnSeries {
            pairs: pairs.to_vec(),
            visible,
            style,
        };
        if self.series.insert(key.to_string(), drawn).is_none() {
            self.order.push(key.to_string());
        }
    }

    fn rescale(&mut self, bounds: Option<AxisBounds>) {
        self.bounds = bounds;
        self.frames += 1;
    }
}
