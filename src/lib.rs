//! # Triode Core
//!
//! A per-sample model of a common-cathode triode preamplifier stage.
//!
//! This library provides:
//! - Reference tube tables for the ECC82 (12AU7) and ECC83 (12AX7)
//! - A stage processor solving grid, anode and cathode voltages every sample
//! - Cascading of stages with signal-dependent output resistance
//! - Audio processing pipeline for offline rendering (CLI only)
//!
//! ## Architecture
//!
//! - [`tube`] - Tube table and transfer curve
//! - [`stage`] - Stage configuration, mode and buffer processor
//! - [`solver`] - Per-sample Newton solve and runtime state
//! - [`chain`] - Linear cascades of stages
//! - [`audio`] - Audio I/O and processing (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! ffmpeg -i input.wav -f f32le -ac 1 -ar 48000 - | triode --tube ecc83 --tube ecc82 | ffmpeg -f f32le -ac 1 -ar 48000 -i - output.wav
//! ```
//!
//! ### Library
//!
//! ```
//! use triode_core::{StageChain, TubeType};
//!
//! let mut chain = StageChain::<f32>::with_tubes(&[TubeType::Ecc83, TubeType::Ecc82], 48000.0)?;
//! let input = vec![0.0f32; 256];
//! let mut output = vec![0.0f32; 256];
//! chain.process_buffer(&input, &mut output);
//! # Ok::<(), triode_core::TriodeError>(())
//! ```
//!
//! ## Circuit
//!
//! The input passes a coupling capacitor Ci into the grid, loaded by the grid
//! leak Rg. The anode hangs from the supply Vb through Ra, the cathode sits
//! on Rk bypassed by Ck, and the output is taken from the anode through Co
//! into Rg. Capacitors are discretized with backward Euler at dt =
//! 1/sample_rate; the anode voltage is found with a fixed number of Newton
//! iterations per sample.

pub mod chain;
pub mod error;
pub mod sample;
pub mod solver;
pub mod stage;
pub mod tube;

#[cfg(feature = "cli")]
pub mod audio;

// Re-export main types for convenience
pub use chain::{connect_stage, StageChain};
pub use error::{Result, TriodeError};
pub use sample::Sample;
pub use stage::{StageConfig, StageMode, TriodeStage};
pub use tube::{lookup, TubeParams, TubeType};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmTriodeChain;

/// Default sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0;

/// Corner frequency of the cathode Rk/Ck low-pass kept by auto-adjustment, in Hz
pub const CATHODE_LP_CUTOFF: f64 = 2.0;

/// Grid-cathode voltage above which the grid conducts
pub const DEFAULT_GRID_THRESHOLD: f64 = 0.6;
