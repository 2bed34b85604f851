//! CLI command implementations.

pub mod common;
pub mod config;
pub mod eval;
pub mod params;
pub mod replay;
pub mod series;
pub mod sweep;
