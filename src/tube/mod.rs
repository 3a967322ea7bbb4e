//! Tube model registry.
//!
//! This module holds the fixed table of triode parameter sets ([`TUBE_MAP`])
//! keyed by [`TubeType`], and the transfer curve ([`TubeModel`]) evaluated by
//! the per-sample solver. The table is `'static` and shared by every stage
//! built from the same tube type.

mod model;
mod types;

pub use model::TubeModel;
pub use types::{lookup, TubeParams, TubeType, TUBE_MAP};
