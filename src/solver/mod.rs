//! Per-sample solver for the triode stage.
//!
//! Each sample is solved in three steps:
//!
//! 1. The input coupling network (Ri, Ci, Rg) is a single-pole high-pass,
//!    discretized with backward Euler, giving the grid voltage Vg.
//! 2. The anode-cathode voltage is found from the implicit load-line
//!    equation
//!    ```text
//!    Vak + Ra * Ia(Vgk, Vak) = Vb - Vk
//!    ```
//!    with a fixed number of Newton-Raphson iterations started at the
//!    previous sample's solution.
//! 3. The cathode network (Rk || Ck) integrates the new anode and grid
//!    currents, giving the next cathode voltage.
//!
//! The iteration count is pinned. There is no convergence test and no error
//! path: the rendered signal is defined by exactly these iterations.

mod newton;
mod state;
mod step;

pub use newton::{anode_residual, solve_vak};
pub use state::StageState;
pub use step::{step, OutputKind, StageOutput};

/// Newton-Raphson iterations per sample.
pub const NEWTON_ITERATIONS: usize = 6;
