//! Gestalt squad DPS calculator: library entry point.
//!
//! Exposes the combat engine (model, unit, damage, effect, squad, reaper)
//! plus config, report, and util for use by the CLI and tests.

pub mod config;
pub mod damage;
pub mod effect;
pub mod error;
pub mod model;
pub mod reaper;
pub mod report;
pub mod squad;
pub mod unit;
pub mod util;

pub use error::EngineError;
