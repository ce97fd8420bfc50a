#![forbid(unsafe_code)]

//! Headless force-directed graph layout.
//!
//! Nodes repel each other under an inverse-square charge law. Each tick builds a quadtree over
//! the current positions, accumulates charge bottom-up, applies Barnes-Hut approximated repulsion
//! and advances positions with friction-damped position Verlet. A decaying `alpha` anneals the
//! forces until the layout settles.
//!
//! Use [`layout`] for a one-shot run, or drive a [`Simulation`] tick by tick to animate.

pub mod error;
pub mod node;
pub mod options;
pub mod sim;

pub use error::{Error, Result};
pub use node::{LayoutResult, Node, Point};
pub use options::{Charge, ForceOptions};
pub use sim::{Activation, Blocking, Driver, FrameBudget, Simulation, Tick};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest coordinate magnitude [`layout`] accepts. Charge-weighted sums over coordinates past
/// this overflow `f64`.
pub const MAX_COORDINATE: f64 = 1.0e100;

/// Largest per-node charge magnitude [`layout`] accepts.
pub const MAX_CHARGE: f64 = 1.0e100;

/// Checks that every node position is finite and within [`MAX_COORDINATE`].
pub fn check_nodes(nodes: &[Node]) -> Result<()> {
    for (index, n) in nodes.iter().enumerate() {
        if !(n.x.is_finite() && n.y.is_finite()) {
            return Err(Error::NonFiniteCoordinate { index });
        }
        if n.x.abs() > MAX_COORDINATE || n.y.abs() > MAX_COORDINATE {
            return Err(Error::CoordinateOutOfRange { index });
        }
    }
    Ok(())
}

/// Checks captured charges the way [`check_nodes`] checks positions.
pub fn check_charges(charges: &[f64]) -> Result<()> {
    for (index, c) in charges.iter().enumerate() {
        if !c.is_finite() {
            return Err(Error::NonFiniteCharge { index });
        }
        if c.abs() > MAX_CHARGE {
            return Err(Error::ChargeOutOfRange { index });
        }
    }
    Ok(())
}

/// Runs a fresh simulation over `nodes` to convergence with a uniform charge.
pub fn layout(nodes: &[Node], opts: &ForceOptions) -> Result<LayoutResult> {
    layout_with_charge(nodes, opts, Charge::constant(opts.charge))
}

/// Like [`layout`], with an explicit per-node charge provider (`opts.charge` is ignored).
pub fn layout_with_charge(
    nodes: &[Node],
    opts: &ForceOptions,
    charge: Charge,
) -> Result<LayoutResult> {
    opts.validate()?;
    check_nodes(nodes)?;

    let mut sim = Simulation::new(opts.clone()).with_nodes(nodes.to_vec());
    sim.set_charge(charge);
    sim.start();
    check_charges(sim.charges())?;
    let ticks = sim.run_to_convergence();

    Ok(LayoutResult {
        positions: sim.nodes().iter().map(Node::point).collect(),
        ticks,
    })
}
