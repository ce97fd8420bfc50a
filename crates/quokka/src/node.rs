/// A point moved by the simulation.
///
/// `px`/`py` hold the previous position used by the Verlet step. They are `NaN` until
/// [`Simulation::start`](crate::Simulation::start) seeds them from `x`/`y`, which makes the first
/// step start from rest. Setting them before `start` gives the node an initial velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub px: f64,
    pub py: f64,
    /// Pinned nodes hold their position but still repel others.
    pub fixed: bool,
    /// Position in the node collection, reassigned on every `start` and `set_nodes`.
    pub index: usize,
}

impl Node {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn pinned(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            fixed: true,
            ..Default::default()
        }
    }

    pub fn point(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            px: f64::NAN,
            py: f64::NAN,
            fixed: false,
            index: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
pub struct LayoutResult {
    /// Final positions, in input order.
    pub positions: Vec<Point>,
    /// Number of ticks that moved nodes before alpha fell below the threshold.
    pub ticks: usize,
}
