//! Session configuration for the afterscope light-curve explorer.
//!
//! A session describes one exploration layout: which parameters exist, which
//! controls drive them, which bands are plotted and on what time grid. This
//! crate loads and saves sessions as TOML, validates them, ships the
//! built-in factory sessions, and assembles them into
//! [`afterscope_core`] engine objects.
//!
//! # Features
//!
//! - **Session files**: Load and save sessions from TOML
//! - **Validation**: Cross-reference checks with every problem reported
//! - **Factory sessions**: `multiband` and `single_band`, always available
//! - **Assembly**: Store, panel, registry and grid from one call
//!
//! # Example
//!
//! ```rust
//! use afterscope_config::get_factory_session;
//!
//! let session = get_factory_session("multiband").unwrap();
//! let parts = session.build().unwrap();
//! assert_eq!(parts.registry.len(), 10);
//! assert_eq!(parts.store.variant("jetType"), Some("tophat"));
//! ```

mod assemble;
mod error;
mod session;

/// Session validation.
pub mod validation;

/// Factory sessions bundled with the library.
pub mod factory;

pub use assemble::SessionParts;
pub use error::ConfigError;
pub use factory::{
    FACTORY_SESSION_NAMES, factory_sessions, get_factory_session, is_factory_session,
};
pub use session::{
    ChoiceConfig, FixedParam, FixedValue, FrequencyConfig, Group, OptionConfig, Scale,
    SeriesConfig, SessionConfig, SliderConfig, Style, TimeGridConfig, ToggleConfig, Unit,
};
pub use validation::{ValidationError, ValidationResult, validate_session, validate_time_grid};
