//! The physical model seam and the time grid it is sampled on.
//!
//! The engine treats the light-curve model as an opaque pure function of
//! `(times, frequency, parameters)`. Anything implementing [`Model`] can be
//! plugged in, including plain closures:
//!
//! ```rust
//! use afterscope_core::{Frequency, Model, ModelError, ParameterSnapshot};
//!
//! let power_law = |t: &[f64], _nu: &Frequency, p: &ParameterSnapshot| -> Result<Vec<f64>, ModelError> {
//!     let slope = p.number("alpha").ok_or(ModelError::MissingParameter("alpha".into()))?;
//!     Ok(t.iter().map(|t| t.powf(-slope)).collect())
//! };
//!
//! let snapshot = ParameterSnapshot::from_entries([(
//!     "alpha".to_string(),
//!     afterscope_core::ParamValue::Number(1.2),
//! )]);
//! let flux = power_law
//!     .evaluate(&[1.0, 10.0], &Frequency::Single(1e14), &snapshot)
//!     .unwrap();
//! assert_eq!(flux[0], 1.0);
//! ```

use crate::error::{ConfigurationError, ModelError};
use crate::series::Frequency;
use crate::store::ParameterSnapshot;

/// A deterministic light-curve model.
///
/// Implementations must be pure: the same inputs always give the same
/// output. They may fail for physically invalid parameter combinations.
pub trait Model {
    /// Returns one flux value per entry of `times`.
    fn evaluate(
        &self,
        times: &[f64],
        frequency: &Frequency,
        params: &ParameterSnapshot,
    ) -> Result<Vec<f64>, ModelError>;
}

impl<F> Model for F
where
    F: Fn(&[f64], &Frequency, &ParameterSnapshot) -> Result<Vec<f64>, ModelError>,
{
    fn evaluate(
        &self,
        times: &[f64],
        frequency: &Frequency,
        params: &ParameterSnapshot,
    ) -> Result<Vec<f64>, ModelError> {
        self(times, frequency, params)
    }
}

impl<M: Model + ?Sized> Model for std::sync::Arc<M> {
    fn evaluate(
        &self,
        times: &[f64],
        frequency: &Frequency,
        params: &ParameterSnapshot,
    ) -> Result<Vec<f64>, ModelError> {
        (**self).evaluate(times, frequency, params)
    }
}

/// Strictly increasing, finite sample times (seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Wraps explicit sample times.
    pub fn new(times: Vec<f64>) -> Result<Self, ConfigurationError> {
        if times.is_empty() {
            return Err(ConfigurationError::InvalidTimeGrid(
                "no sample times".to_string(),
            ));
        }
        if let Some(t) = times.iter().find(|t| !t.is_finite()) {
            return Err(ConfigurationError::InvalidTimeGrid(format!(
                "sample time {t} is not finite"
            )));
        }
        if let Some(w) = times.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ConfigurationError::InvalidTimeGrid(format!(
                "sample times not strictly increasing at {} -> {}",
                w[0], w[1]
            )));
        }
        Ok(Self { times })
    }

    /// `count` points evenly spaced in log10 between `10^start_exp` and
    /// `10^stop_exp` inclusive.
    pub fn log_spaced(start_exp: f64, stop_exp: f64, count: usize) -> Result<Self, ConfigurationError> {
        if count < 2 {
            return Err(ConfigurationError::InvalidTimeGrid(format!(
                "log-spaced grid needs at least 2 points, got {count}"
            )));
        }
        let span = stop_exp - start_exp;
        let times = (0..count)
            .map(|i| 10f64.powf(start_exp + span * i as f64 / (count - 1) as f64))
            .collect();
        Self::new(times)
    }

    /// Sample times.
    pub fn as_slice(&self) -> &[f64] {
        &self.times
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`; a grid holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_spaced_endpoints() {
        let grid = TimeGrid::log_spaced(1.0, 6.0, 30).unwrap();
        assert_eq!(grid.len(), 30);
        let t = grid.as_slice();
        assert!((t[0] - 10.0).abs() < 1e-9);
        assert!((t[29] / 1e6 - 1.0).abs() < 1e-12);
        assert!(t.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn rejects_bad_grids() {
        assert!(TimeGrid::new(vec![]).is_err());
        assert!(TimeGrid::new(vec![1.0, 1.0]).is_err());
        assert!(TimeGrid::new(vec![1.0, f64::NAN]).is_err());
        assert!(TimeGrid::log_spaced(1.0, 6.0, 1).is_err());
        assert!(TimeGrid::log_spaced(6.0, 1.0, 5).is_err());
    }

    #[test]
    fn closures_are_models() {
        let model = |t: &[f64], _: &Frequency, _: &ParameterSnapshot| -> Result<Vec<f64>, ModelError> {
            Ok(vec![1.0; t.len()])
        };
        let shared: std::sync::Arc<dyn Model> = std::sync::Arc::new(model);
        let out = shared
            .evaluate(&[1.0, 2.0], &Frequency::Single(1.0), &ParameterSnapshot::from_entries([]))
            .unwrap();
        assert_eq!(out, vec![1.0, 1.0]);
    }
}
