//! Built-in analytic afterglow model.
//!
//! A closed-form forward-shock synchrotron light curve: a broken power-law
//! spectrum in the slow- or fast-cooling regime, a smoothed jet break,
//! Doppler suppression for off-axis observers and continuous energy
//! injection. It is far cruder than a hydrodynamic simulation but responds
//! to every parameter the factory sessions expose, so sessions can be run
//! without an external model.
//!
//! Times are observer-frame seconds and fluxes are in mJy.

use std::f64::consts::FRAC_PI_2;

use afterscope_core::{Frequency, Model, ModelError, ParameterSnapshot};

const DAY: f64 = 86_400.0;
const HOUR: f64 = 3_600.0;

/// Angular energy distribution of the jet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JetStructure {
    /// Uniform core, sharp edge, spreads after the break.
    TopHat,
    /// Uniform core, sharp edge, no lateral spreading.
    Cone,
    /// Gaussian falloff from the axis.
    Gaussian,
    /// Power-law falloff from the axis.
    PowerLaw,
    /// Flat core with a Gaussian wing.
    GaussianCore,
    /// Flat core with a power-law wing.
    PowerLawCore,
    /// Isotropic blast wave.
    Spherical,
}

impl JetStructure {
    /// Parses a `jetType` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "tophat" => Self::TopHat,
            "cone" => Self::Cone,
            "gaussian" => Self::Gaussian,
            "powerlaw" => Self::PowerLaw,
            "gaussian_core" => Self::GaussianCore,
            "powerlaw_core" => Self::PowerLawCore,
            "spherical" => Self::Spherical,
            _ => return None,
        })
    }

    const fn has_sharp_edge(self) -> bool {
        matches!(self, Self::TopHat | Self::Cone)
    }

    /// Fraction of the core energy carried at angle `theta`.
    fn energy_fraction(self, theta: f64, core: f64, wing: f64, b: f64) -> f64 {
        let gaussian = |x: f64| (-0.5 * (x / core).powi(2)).exp();
        let power_law = |x: f64| (1.0 + x * x / (b * core * core)).powf(-0.5 * b);
        match self {
            Self::Spherical => 1.0,
            Self::TopHat | Self::Cone => f64::from(u8::from(theta <= core)),
            _ if theta > wing => 0.0,
            Self::Gaussian => gaussian(theta),
            Self::PowerLaw => power_law(theta),
            Self::GaussianCore if theta <= core => 1.0,
            Self::GaussianCore => gaussian(theta - core),
            Self::PowerLawCore if theta <= core => 1.0,
            Self::PowerLawCore => power_law(theta - core),
        }
    }
}

/// Electron spectrum treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumKind {
    /// Broken power law; `epsilon_e` scaled by `(p-2)/(p-1)`.
    Simple,
    /// `nu_m` stops falling once the shock turns Newtonian.
    DeepNewtonian,
    /// `epsilon_e` is taken as the already-scaled `epsilon_e_bar`.
    EpsEBar,
    /// Synchrotron self-Compton lowers the cooling break.
    IcCooling,
}

impl SpectrumKind {
    /// Parses a `specType` tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "simple" => Self::Simple,
            "deep_newtonian" => Self::DeepNewtonian,
            "eps_e_bar" => Self::EpsEBar,
            "ic_cooling" => Self::IcCooling,
            _ => return None,
        })
    }
}

/// Physical inputs read from a snapshot.
#[derive(Debug, Clone, PartialEq)]
struct Inputs {
    e0: f64,
    n0: f64,
    eps_e: f64,
    eps_b: f64,
    p: f64,
    theta_obs: f64,
    theta_core: f64,
    theta_wing: f64,
    b: f64,
    xi_n: f64,
    l0: f64,
    ts: f64,
    q: f64,
    z: f64,
    d_l: f64,
    jet: JetStructure,
    spectrum: SpectrumKind,
}

impl Inputs {
    fn from_snapshot(params: &ParameterSnapshot) -> Result<Self, ModelError> {
        let required = |name: &str| {
            params
                .number(name)
                .ok_or_else(|| ModelError::MissingParameter(name.to_string()))
        };
        let invalid = |msg: String| Err(ModelError::InvalidParameters(msg));

        let jet = match params.variant("jetType") {
            None => JetStructure::TopHat,
            Some(tag) => JetStructure::from_tag(tag)
                .ok_or_else(|| ModelError::InvalidParameters(format!("unknown jetType '{tag}'")))?,
        };
        let spectrum = match params.variant("specType") {
            None => SpectrumKind::Simple,
            Some(tag) => SpectrumKind::from_tag(tag).ok_or_else(|| {
                ModelError::InvalidParameters(format!("unknown specType '{tag}'"))
            })?,
        };

        let theta_core = required("thetaCore")?;
        let inputs = Self {
            e0: required("E0")?,
            n0: required("n0")?,
            eps_e: required("epsilon_e")?,
            eps_b: required("epsilon_B")?,
            p: required("p")?,
            theta_obs: required("thetaObs")?,
            theta_core,
            theta_wing: params.number("thetaWing").unwrap_or(4.0 * theta_core),
            b: params.number("b").unwrap_or(6.0),
            xi_n: params.number("xi_N").unwrap_or(1.0),
            l0: params.number("L0").unwrap_or(0.0),
            ts: params.number("ts").unwrap_or(1.0),
            q: params.number("q").unwrap_or(2.0),
            z: required("z")?,
            d_l: required("d_L")?,
            jet,
            spectrum,
        };

        if !(inputs.e0 > 0.0 && inputs.n0 > 0.0) {
            return invalid("E0 and n0 must be positive".to_string());
        }
        if !(inputs.eps_e > 0.0 && inputs.eps_e <= 1.0 && inputs.eps_b > 0.0 && inputs.eps_b <= 1.0)
        {
            return invalid("epsilon_e and epsilon_B must lie in (0, 1]".to_string());
        }
        if inputs.p < 2.0 {
            return invalid(format!("p = {} must be at least 2", inputs.p));
        }
        if !(0.0..=FRAC_PI_2).contains(&inputs.theta_obs) {
            return invalid(format!("thetaObs = {} exceeds pi/2", inputs.theta_obs));
        }
        if inputs.theta_core <= 0.0 || inputs.theta_wing < inputs.theta_core {
            return invalid("need 0 < thetaCore <= thetaWing".to_string());
        }
        if !(inputs.xi_n > 0.0 && inputs.xi_n <= 1.0) {
            return invalid(format!("xi_N = {} must lie in (0, 1]", inputs.xi_n));
        }
        if inputs.l0 < 0.0 || inputs.ts <= 0.0 || inputs.b <= 0.0 {
            return invalid("L0 must be non-negative, ts and b positive".to_string());
        }
        if inputs.z <= -1.0 || inputs.d_l <= 0.0 {
            return invalid("need z > -1 and d_L > 0".to_string());
        }
        Ok(inputs)
    }

    /// Energy injected by a source-frame time `t`, with luminosity `L0`
    /// up to `ts` and `L0 (t/ts)^-q` after.
    fn injected_energy(&self, t: f64) -> f64 {
        if self.l0 == 0.0 {
            return 0.0;
        }
        let plateau = t.min(self.ts);
        let tail = if t <= self.ts {
            0.0
        } else if (self.q - 1.0).abs() < 1e-9 {
            self.ts * (t / self.ts).ln()
        } else {
            self.ts * (1.0 - (t / self.ts).powf(1.0 - self.q)) / (self.q - 1.0)
        };
        self.l0 * (plateau + tail)
    }

    /// Flux (mJy) of a blast wave of `energy` seen `offset` radians outside
    /// its edge.
    fn component(&self, t: f64, nu: f64, energy: f64, offset: f64) -> f64 {
        if energy <= 0.0 {
            return 0.0;
        }
        let zp1 = 1.0 + self.z;
        let p = self.p;
        let e52 = energy / 1e52;
        let td = t / DAY;

        let eps_e_bar = match self.spectrum {
            SpectrumKind::EpsEBar => self.eps_e,
            _ => self.eps_e * (p - 2.0).max(1e-3) / (p - 1.0),
        };

        let mut nu_m = 5.7e14
            * (3.0 * eps_e_bar / self.xi_n).powi(2)
            * self.eps_b.sqrt()
            * e52.sqrt()
            * td.powf(-1.5)
            * zp1.sqrt();
        let mut nu_c =
            2.7e12 * self.eps_b.powf(-1.5) * e52.powf(-0.5) / self.n0 * td.powf(-0.5) / zp1.sqrt();
        let f_max = 110.0
            * self.xi_n
            * self.eps_b.sqrt()
            * e52
            * self.n0.sqrt()
            * zp1
            * (self.d_l / 1e28).powi(-2);

        match self.spectrum {
            SpectrumKind::DeepNewtonian => {
                let t_nr = 970.0 * DAY * (e52 / self.n0).cbrt() * zp1;
                if t > t_nr {
                    nu_m *= (t / t_nr).powf(1.5);
                }
            }
            SpectrumKind::IcCooling => {
                let eta = if nu_c > nu_m {
                    (nu_c / nu_m).powf(-(p - 2.0) / 2.0)
                } else {
                    1.0
                };
                let y = 0.5 * ((1.0 + 4.0 * eta * self.eps_e / self.eps_b).sqrt() - 1.0);
                nu_c /= (1.0 + y).powi(2);
            }
            SpectrumKind::Simple | SpectrumKind::EpsEBar => {}
        }

        let mut flux = f_max * synchrotron(nu, nu_m, nu_c, p);

        if self.jet != JetStructure::Spherical {
            let t_jet = 6.2 * HOUR
                * (e52 / self.n0).cbrt()
                * (self.theta_core / 0.1).powf(8.0 / 3.0)
                * zp1;
            let steepening = match self.jet {
                JetStructure::Cone => 0.75,
                _ => (p + 3.0) / 4.0,
            };
            flux *= (1.0 + (t / t_jet).powi(2)).powf(-0.5 * steepening);

            if offset > 0.0 {
                let lorentz = ((t / t_jet).powf(-3.0 / 8.0) / self.theta_core).max(1.0);
                let doppler = 1.0 / (1.0 + (lorentz * offset).powi(2));
                flux *= doppler.powi(3);
            }
        }
        flux
    }

    fn flux(&self, t: f64, nu: f64) -> f64 {
        let energy = self.e0 + self.injected_energy(t / (1.0 + self.z));
        let edge = (self.theta_obs - self.theta_core).max(0.0);

        if self.jet == JetStructure::Spherical {
            return self.component(t, nu, energy, 0.0);
        }
        if self.jet.has_sharp_edge() {
            return self.component(t, nu, energy, edge);
        }

        let along = self
            .jet
            .energy_fraction(self.theta_obs, self.theta_core, self.theta_wing, self.b);
        self.component(t, nu, energy * along, 0.0)
            + (1.0 - along) * self.component(t, nu, energy, edge)
    }
}

/// Broken power-law synchrotron spectrum normalised to its peak.
fn synchrotron(nu: f64, nu_m: f64, nu_c: f64, p: f64) -> f64 {
    if nu_m < nu_c {
        if nu < nu_m {
            (nu / nu_m).cbrt()
        } else if nu < nu_c {
            (nu / nu_m).powf(-(p - 1.0) / 2.0)
        } else {
            (nu_c / nu_m).powf(-(p - 1.0) / 2.0) * (nu / nu_c).powf(-p / 2.0)
        }
    } else if nu < nu_c {
        (nu / nu_c).cbrt()
    } else if nu < nu_m {
        (nu / nu_c).powf(-0.5)
    } else {
        (nu_m / nu_c).powf(-0.5) * (nu / nu_m).powf(-p / 2.0)
    }
}

/// Forward-shock afterglow in closed form.
///
/// Reads `E0`, `n0`, `epsilon_e`, `epsilon_B`, `p`, `thetaObs`,
/// `thetaCore`, `z` and `d_L`; `jetType`, `specType`, `thetaWing`, `b`,
/// `xi_N`, `L0`, `ts` and `q` are optional. A frequency set is averaged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticAfterglow;

impl Model for AnalyticAfterglow {
    fn evaluate(
        &self,
        times: &[f64],
        frequency: &Frequency,
        params: &ParameterSnapshot,
    ) -> Result<Vec<f64>, ModelError> {
        let inputs = Inputs::from_snapshot(params)?;
        let nus = frequency.values();
        #[allow(clippy::cast_precision_loss)]
        let count = nus.len() as f64;

        Ok(times
            .iter()
            .map(|&t| nus.iter().map(|&nu| inputs.flux(t, nu)).sum::<f64>() / count)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afterscope_core::ParamValue;

    fn params(overrides: &[(&str, ParamValue)]) -> ParameterSnapshot {
        let mut entries: Vec<(String, ParamValue)> = [
            ("E0", 1e52),
            ("n0", 1e-2),
            ("epsilon_e", 0.1),
            ("epsilon_B", 1e-3),
            ("p", 2.2),
            ("thetaObs", 0.0),
            ("thetaCore", 0.05),
            ("xi_N", 1.0),
            ("z", 0.661),
            ("d_L", 1.2622654e28),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), ParamValue::Number(v)))
        .collect();
        for (k, v) in overrides {
            entries.retain(|(name, _)| name != k);
            entries.push(((*k).to_string(), v.clone()));
        }
        ParameterSnapshot::from_entries(entries)
    }

    fn grid() -> Vec<f64> {
        (0..30).map(|i| 10f64.powf(1.0 + 5.0 * f64::from(i) / 29.0)).collect()
    }

    fn optical() -> Frequency {
        Frequency::Single(4.8e14)
    }

    #[test]
    fn output_is_positive_and_finite() {
        let out = AnalyticAfterglow
            .evaluate(&grid(), &optical(), &params(&[]))
            .unwrap();
        assert_eq!(out.len(), 30);
        assert!(out.iter().all(|f| f.is_finite() && *f > 0.0));
    }

    #[test]
    fn on_axis_optical_fades() {
        let out = AnalyticAfterglow
            .evaluate(&grid(), &optical(), &params(&[]))
            .unwrap();
        assert!(out[29] < out[10]);
    }

    #[test]
    fn more_energy_is_brighter() {
        let t = [1e4];
        let low = AnalyticAfterglow.evaluate(&t, &optical(), &params(&[])).unwrap();
        let high = AnalyticAfterglow
            .evaluate(&t, &optical(), &params(&[("E0", ParamValue::Number(1e53))]))
            .unwrap();
        assert!(high[0] > low[0]);
    }

    #[test]
    fn off_axis_tophat_rises_then_fades() {
        let out = AnalyticAfterglow
            .evaluate(&grid(), &optical(), &params(&[("thetaObs", ParamValue::Number(0.4))]))
            .unwrap();
        let peak = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert!(peak > 0 && peak < 29, "peak index {peak}");
    }

    #[test]
    fn injection_brightens_late_times() {
        let t = [1e5];
        let base = AnalyticAfterglow.evaluate(&t, &optical(), &params(&[])).unwrap();
        let injected = AnalyticAfterglow
            .evaluate(
                &t,
                &optical(),
                &params(&[("L0", ParamValue::Number(1e48)), ("ts", ParamValue::Number(5e4))]),
            )
            .unwrap();
        assert!(injected[0] > base[0]);
    }

    #[test]
    fn zero_injection_matches_none() {
        let t = grid();
        let base = AnalyticAfterglow.evaluate(&t, &optical(), &params(&[])).unwrap();
        let off = AnalyticAfterglow
            .evaluate(&t, &optical(), &params(&[("L0", ParamValue::Number(0.0))]))
            .unwrap();
        assert_eq!(base, off);
    }

    #[test]
    fn every_tag_evaluates() {
        for jet in [
            "tophat",
            "cone",
            "gaussian",
            "powerlaw",
            "gaussian_core",
            "powerlaw_core",
            "spherical",
        ] {
            for spec in ["simple", "deep_newtonian", "eps_e_bar", "ic_cooling"] {
                let p = params(&[
                    ("jetType", ParamValue::Variant(jet.into())),
                    ("specType", ParamValue::Variant(spec.into())),
                    ("thetaObs", ParamValue::Number(0.1)),
                ]);
                let out = AnalyticAfterglow.evaluate(&grid(), &optical(), &p).unwrap();
                assert!(out.iter().all(|f| f.is_finite()), "{jet}/{spec}");
            }
        }
    }

    #[test]
    fn frequency_set_is_averaged() {
        let t = [1e4];
        let p = params(&[]);
        let a = AnalyticAfterglow.evaluate(&t, &Frequency::Single(6e9), &p).unwrap()[0];
        let b = AnalyticAfterglow.evaluate(&t, &Frequency::Single(1e10), &p).unwrap()[0];
        let set = AnalyticAfterglow
            .evaluate(&t, &Frequency::Set(vec![6e9, 1e10]), &p)
            .unwrap()[0];
        assert!((set - 0.5 * (a + b)).abs() <= 1e-12 * set.abs());
    }

    #[test]
    fn rejects_bad_inputs() {
        let t = [1e3];
        assert!(matches!(
            AnalyticAfterglow.evaluate(
                &t,
                &optical(),
                &ParameterSnapshot::from_entries([("E0".to_string(), ParamValue::Number(1e52))])
            ),
            Err(ModelError::MissingParameter(_))
        ));
        assert!(matches!(
            AnalyticAfterglow.evaluate(&t, &optical(), &params(&[("thetaObs", ParamValue::Number(2.0))])),
            Err(ModelError::InvalidParameters(_))
        ));
        assert!(matches!(
            AnalyticAfterglow.evaluate(
                &t,
                &optical(),
                &params(&[("jetType", ParamValue::Variant("ring".into()))])
            ),
            Err(ModelError::InvalidParameters(_))
        ));
    }
}
