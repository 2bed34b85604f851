//! Factory sessions bundled with afterscope.
//!
//! These sessions are always available without external files. `multiband`
//! is the full explorer: nine sliders, energy injection, jet and spectrum
//! selectors, ten bands. `single_band` is a lighter layout with one optical
//! band on a finer grid and no selectors.

use crate::session::SessionConfig;

/// Array of factory session names for external access.
pub static FACTORY_SESSION_NAMES: &[&str] = &["multiband", "single_band"];

/// TOML content for factory sessions, embedded at compile time.
static FACTORY_SESSIONS_TOML: &[(&str, &str)] = &[
    ("multiband", MULTIBAND_SESSION),
    ("single_band", SINGLE_BAND_SESSION),
];

/// Multiband explorer.
const MULTIBAND_SESSION: &str = r#"
name = "multiband"
description = "Optical, radio and X-ray light curves with energy injection"

[time_grid]
kind = "log"
start = 10.0
stop = 1e6
points = 30

[[fixed]]
name = "xi_N"
value = 1.0

[[fixed]]
name = "q"
value = 2.0

[[fixed]]
name = "z"
value = 0.661

[[fixed]]
name = "d_L"
value = 1.2622654e28
unit = "cm"

[[sliders]]
param = "E0"
scale = "log10"
min = 48.0
max = 55.0
default = 51.0
step = 0.01
unit = "erg"
group = "energetics"

[[sliders]]
param = "thetaObs"
min = 0.0
max = 0.8
default = 0.05
step = 0.01
unit = "rad"
group = "geometry"

[[sliders]]
param = "thetaCore"
min = 0.001
max = 0.8
default = 0.06
step = 0.01
unit = "rad"
group = "geometry"

[[sliders]]
param = "n0"
scale = "log10"
min = -5.0
max = 3.0
default = -3.0
step = 0.01
unit = "cm^-3"
group = "environment"

[[sliders]]
param = "p"
min = 2.0
max = 3.0
default = 2.2
step = 0.01
group = "microphysics"

[[sliders]]
param = "epsilon_e"
control = "log10_eps_e"
scale = "log10"
min = -3.0
max = -0.3
default = -1.0
step = 0.01
group = "microphysics"

[[sliders]]
param = "epsilon_B"
control = "log10_eps_B"
scale = "log10"
min = -6.0
max = -1.0
default = -2.0
step = 0.01
group = "microphysics"

[[sliders]]
param = "L0"
scale = "log10"
min = 45.0
max = 55.0
default = 47.0
step = 0.01
unit = "erg/s"
group = "injection"

[[sliders]]
param = "ts"
scale = "log10"
min = 2.0
max = 7.0
default = 4.698970004336019
step = 0.01
unit = "s"
group = "injection"

[[toggles]]
control = "Energy Injection"
flag = "energy_injection"
param = "L0"
override_value = 0.0

[[choices]]
param = "jetType"
control = "Jet Type"
default = "TopHat"
options = [
    { label = "TopHat", tag = "tophat" },
    { label = "Cone", tag = "cone" },
    { label = "Gaussian", tag = "gaussian" },
    { label = "PowerLaw", tag = "powerlaw" },
    { label = "GaussianCore", tag = "gaussian_core" },
    { label = "PowerLawCore", tag = "powerlaw_core" },
    { label = "Spherical", tag = "spherical" },
]

[[choices]]
param = "specType"
control = "Spectrum"
default = "SimpleSpec"
options = [
    { label = "SimpleSpec", tag = "simple" },
    { label = "DeepNewtonian", tag = "deep_newtonian" },
    { label = "EpsEBar", tag = "eps_e_bar" },
    { label = "ICCooling", tag = "ic_cooling" },
]

[[series]]
key = "i"
frequency = 393170436721311.5
group = "optical"

[[series]]
key = "z"
frequency = 328215960148894.2
group = "optical"

[[series]]
key = "r"
frequency = 481130569731985.2
group = "optical"

[[series]]
key = "J"
frequency = 2.4e14
group = "optical"

[[series]]
key = "g"
frequency = 628495719077568.1
group = "optical"

[[series]]
key = "R"
frequency = 468671768303359.2
group = "optical"

[[series]]
key = "radio(6GHz)"
frequency = 6e9
group = "radio"

[[series]]
key = "radio(10GHz)"
frequency = 1e10
group = "radio"

[[series]]
key = "radio(1.3GHz)"
frequency = 1.3e9
group = "radio"

[[series]]
key = "X-ray(10keV)"
frequency = 2.42e18
group = "xray"
"#;

/// Single optical band on a 200-point grid.
const SINGLE_BAND_SESSION: &str = r#"
name = "single_band"
description = "One optical band, top-hat jet, continuous sliders"

[time_grid]
kind = "log"
start = 100.0
stop = 1e6
points = 200

[[fixed]]
name = "jetType"
value = "tophat"

[[fixed]]
name = "specType"
value = "simple"

[[fixed]]
name = "xi_N"
value = 1.0

[[fixed]]
name = "q"
value = 2.0

[[fixed]]
name = "z"
value = 0.661

[[fixed]]
name = "d_L"
value = 1.2622654e28
unit = "cm"

[[sliders]]
param = "E0"
control = "logE0"
scale = "log10"
min = 47.0
max = 56.0
default = 52.0
unit = "erg"

[[sliders]]
param = "thetaCore"
control = "thc"
min = 1e-4
max = 0.3
default = 0.05
unit = "rad"

[[sliders]]
param = "thetaObs"
control = "thv"
min = 0.0
max = 0.3
default = 0.09
unit = "rad"

[[sliders]]
param = "thetaWing"
control = "thw"
min = 0.01
max = 0.4
default = 0.2
unit = "rad"

[[sliders]]
param = "n0"
control = "logn0"
scale = "log10"
min = -4.0
max = 3.0
default = -2.0
unit = "cm^-3"

[[sliders]]
param = "p"
min = 2.001
max = 3.0
default = 2.2

[[sliders]]
param = "epsilon_B"
control = "logeps_B"
scale = "log10"
min = -6.0
max = -1.0
default = -3.0

[[sliders]]
param = "epsilon_e"
control = "logeps_e"
scale = "log10"
min = -4.0
max = 0.0
default = -1.0

[[sliders]]
param = "b"
min = 2.0
max = 7.0
default = 6.0

[[sliders]]
param = "L0"
control = "logl0"
scale = "log10"
min = 43.0
max = 51.0
default = 47.0
unit = "erg/s"

[[sliders]]
param = "ts"
control = "logts"
scale = "log10"
min = 2.0
max = 6.0
default = 3.0
unit = "s"

[[series]]
key = "r"
frequency = 4.811305697319852e14
group = "optical"
"#;

/// Get all factory sessions.
pub fn factory_sessions() -> Vec<SessionConfig> {
    FACTORY_SESSIONS_TOML
        .iter()
        .filter_map(|(_, toml)| SessionConfig::from_toml(toml).ok())
        .collect()
}

/// Get a factory session by name (case-insensitive).
///
/// # Example
///
/// ```rust
/// use afterscope_config::get_factory_session;
///
/// let session = get_factory_session("single_band").unwrap();
/// assert_eq!(session.series.len(), 1);
/// ```
pub fn get_factory_session(name: &str) -> Option<SessionConfig> {
    FACTORY_SESSIONS_TOML
        .iter()
        .find(|(session_name, _)| session_name.eq_ignore_ascii_case(name))
        .and_then(|(_, toml)| SessionConfig::from_toml(toml).ok())
}

/// Check if a name refers to a factory session (case-insensitive).
pub fn is_factory_session(name: &str) -> bool {
    FACTORY_SESSION_NAMES
        .iter()
        .any(|n| n.eq_ignore_ascii_case(name))
}
