//! Triode preamp stage.
//!
//! - [`StageConfig`] - component values and cathode auto-adjustment
//! - [`StageMode`] - single/pre/follower port layout
//! - [`TriodeStage`] - buffer processor driving the per-sample solver

mod config;
mod mode;
mod processor;

pub use config::{StageConfig, DEFAULT_CI, DEFAULT_CO, DEFAULT_RG, DEFAULT_RI};
pub use mode::StageMode;
pub use processor::TriodeStage;
