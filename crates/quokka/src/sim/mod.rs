//! The force simulation: aggregate accumulation, Barnes-Hut repulsion, Verlet integration and
//! the alpha annealing controller that sequences them.

pub mod accumulate;
pub mod driver;
pub mod integrate;
pub mod repulse;
mod simulation;

pub use accumulate::{Aggregate, Jitter, accumulate};
pub use driver::{Blocking, Driver, FrameBudget};
pub use integrate::integrate;
pub use repulse::repulse;
pub use simulation::{Activation, Simulation, Tick};

/// Alpha used by `start`/`resume`.
pub const ALPHA_RESTART: f64 = 0.1;
/// Per-tick alpha multiplier.
pub const ALPHA_DECAY: f64 = 0.99;
/// Ticking stops once alpha falls below this.
pub const ALPHA_MIN: f64 = 0.05;
/// Per-axis bound on the displacement a single interaction can contribute.
pub const MAX_STEP: f64 = 0.1;
/// Magnitude of the nudge applied to points sharing a region with coincident neighbours.
pub const JITTER: f64 = 0.01;
