use crate::error::{Error, Result};
use crate::node::Node;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ForceOptions {
    /// Fraction of the previous step's velocity kept on each tick.
    pub friction: f64,
    /// Uniform charge strength; negative values repel.
    pub charge: f64,
    /// Accepted and reported, but the simulation applies no gravity force.
    pub gravity: f64,
    /// Barnes-Hut opening threshold (region width / distance).
    pub theta: f64,
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            friction: 0.9,
            charge: -30.0,
            gravity: 0.1,
            theta: 0.8,
        }
    }
}

impl ForceOptions {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("friction", self.friction),
            ("charge", self.charge),
            ("gravity", self.gravity),
            ("theta", self.theta),
        ];
        for (name, value) in checks {
            if !value.is_finite() {
                return Err(Error::InvalidOption { name, value });
            }
        }
        if self.theta < 0.0 {
            return Err(Error::InvalidOption {
                name: "theta",
                value: self.theta,
            });
        }
        Ok(())
    }
}

/// Per-node charge provider, evaluated once per node on every `start`.
///
/// A uniform charge is just the constant provider.
#[derive(Clone)]
pub struct Charge(Arc<dyn Fn(&Node, usize) -> f64 + Send + Sync>);

impl Charge {
    pub fn constant(value: f64) -> Self {
        Self(Arc::new(move |_, _| value))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Node, usize) -> f64 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn of(&self, node: &Node, index: usize) -> f64 {
        (self.0)(node, index)
    }
}

impl Default for Charge {
    fn default() -> Self {
        Self::constant(ForceOptions::default().charge)
    }
}

impl From<f64> for Charge {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl std::fmt::Debug for Charge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Charge(..)")
    }
}
