use super::{ALPHA_DECAY, ALPHA_MIN, ALPHA_RESTART, Driver, Jitter, accumulate, integrate, repulse};
use crate::node::Node;
use crate::options::{Charge, ForceOptions};
use quokka_quadtree::Quadtree;

/// Outcome of a single [`Simulation::step_once`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Alpha dropped below the threshold; nothing moved and the simulation is idle again.
    Converged,
    /// Nodes moved; `alpha` is the decayed value passed to the tick callback.
    Moved { alpha: f64 },
}

impl Tick {
    pub fn is_converged(&self) -> bool {
        matches!(self, Tick::Converged)
    }
}

/// What a call to [`Simulation::set_alpha`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Idle → running. Drive it with `run_to_convergence`, `step_once` or `drive`.
    Started,
    /// Already running; alpha was replaced.
    Reheated,
    /// Already running; alpha set to zero, the next tick reports convergence.
    Stopping,
    /// Idle and a non-positive alpha was requested.
    Ignored,
}

type TickCallback = Box<dyn FnMut(f64, &[Node])>;

/// Annealed Barnes-Hut force simulation over an owned node collection.
///
/// The simulation is idle while alpha is zero. `start` prepares the nodes and raises alpha;
/// ticking then happens through one of two explicit entry points:
///
/// - [`run_to_convergence`](Self::run_to_convergence) blocks until alpha decays below the
///   threshold;
/// - [`step_once`](Self::step_once) performs a single tick, for an external driver (see
///   [`drive`](Self::drive)).
pub struct Simulation {
    nodes: Vec<Node>,
    friction: f64,
    gravity: f64,
    theta: f64,
    charge: Charge,
    charges: Vec<f64>,
    alpha: f64,
    jitter: Jitter,
    ticks: usize,
    on_tick: Option<TickCallback>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(ForceOptions::default())
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("nodes", &self.nodes.len())
            .field("friction", &self.friction)
            .field("gravity", &self.gravity)
            .field("theta", &self.theta)
            .field("alpha", &self.alpha)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    pub fn new(opts: ForceOptions) -> Self {
        Self {
            nodes: Vec::new(),
            friction: opts.friction,
            gravity: opts.gravity,
            theta: opts.theta,
            charge: Charge::constant(opts.charge),
            charges: Vec::new(),
            alpha: 0.0,
            jitter: Jitter::default(),
            ticks: 0,
            on_tick: None,
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Replaces the node collection and assigns indices and unset previous positions.
    ///
    /// The charge snapshot is dropped: the new nodes exert no charge until the next
    /// [`start`](Self::start).
    pub fn set_nodes(&mut self, nodes: Vec<Node>) -> &mut Self {
        self.nodes = nodes;
        self.prepare_nodes();
        self.charges.clear();
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn set_friction(&mut self, friction: f64) -> &mut Self {
        self.friction = friction;
        self
    }

    pub fn charge(&self) -> &Charge {
        &self.charge
    }

    /// Takes effect on the next `start`.
    pub fn set_charge(&mut self, charge: impl Into<Charge>) -> &mut Self {
        self.charge = charge.into();
        self
    }

    /// Charges captured by the last `start`, by node index.
    pub fn charges(&self) -> &[f64] {
        &self.charges
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: f64) -> &mut Self {
        self.gravity = gravity;
        self
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn set_theta(&mut self, theta: f64) -> &mut Self {
        self.theta = theta;
        self
    }

    /// Called after every tick that moved nodes, with the current alpha.
    pub fn on_tick<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(f64, &[Node]) + 'static,
    {
        self.on_tick = Some(Box::new(f));
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.alpha > 0.0
    }

    /// Ticks performed since the simulation last went from idle to running.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Assigns indices, seeds unset previous positions, snapshots charges and resumes.
    pub fn start(&mut self) -> Activation {
        self.prepare_nodes();

        let charge = &self.charge;
        self.charges = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| charge.of(n, i))
            .collect();

        tracing::debug!(
            nodes = self.nodes.len(),
            pinned = self.nodes.iter().filter(|n| n.fixed).count(),
            "force simulation start"
        );
        self.resume()
    }

    fn prepare_nodes(&mut self) {
        for (i, n) in self.nodes.iter_mut().enumerate() {
            n.index = i;
            if n.px.is_nan() {
                n.px = n.x;
            }
            if n.py.is_nan() {
                n.py = n.y;
            }
        }
    }

    pub fn resume(&mut self) -> Activation {
        self.set_alpha(ALPHA_RESTART)
    }

    pub fn stop(&mut self) -> Activation {
        self.set_alpha(0.0)
    }

    pub fn set_alpha(&mut self, value: f64) -> Activation {
        if self.alpha != 0.0 {
            if value > 0.0 {
                tracing::debug!(from = self.alpha, to = value, "force simulation reheated");
                self.alpha = value;
                Activation::Reheated
            } else {
                tracing::debug!(ticks = self.ticks, "force simulation stopping");
                self.alpha = 0.0;
                Activation::Stopping
            }
        } else if value > 0.0 {
            self.alpha = value;
            self.ticks = 0;
            Activation::Started
        } else {
            Activation::Ignored
        }
    }

    /// One annealing step: decay alpha, then accumulate, repulse, integrate and notify.
    pub fn step_once(&mut self) -> Tick {
        self.alpha *= ALPHA_DECAY;
        if self.alpha < ALPHA_MIN {
            if self.alpha != 0.0 {
                tracing::debug!(ticks = self.ticks, "force simulation converged");
            }
            self.alpha = 0.0;
            return Tick::Converged;
        }
        let alpha = self.alpha;

        if self.charges.iter().any(|&c| c != 0.0) {
            let tree = Quadtree::build(self.nodes.iter().map(|n| (n.x, n.y)));
            let aggregates =
                accumulate(&tree, &mut self.nodes, &self.charges, alpha, &mut self.jitter);
            for (i, node) in self.nodes.iter_mut().enumerate() {
                if !node.fixed {
                    repulse(&tree, &aggregates, i, node, self.theta);
                }
            }
        }

        integrate(&mut self.nodes, self.friction);
        self.ticks += 1;
        tracing::trace!(tick = self.ticks, alpha, "force simulation tick");

        if let Some(cb) = self.on_tick.as_mut() {
            cb(alpha, &self.nodes);
        }
        Tick::Moved { alpha }
    }

    /// Ticks until convergence and returns the number of ticks that moved nodes.
    pub fn run_to_convergence(&mut self) -> usize {
        let before = self.ticks;
        while !self.step_once().is_converged() {}
        self.ticks - before
    }

    /// Hands the tick to `driver`. Returns `true` once the simulation has converged.
    pub fn drive(&mut self, driver: &mut dyn Driver) -> bool {
        driver.run(&mut || self.step_once().is_converged())
    }
}
