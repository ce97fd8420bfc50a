use super::JITTER;
use crate::node::Node;
use quokka_quadtree::Quadtree;

/// Charge totals for one quadtree region.
///
/// `cx`/`cy` are not finite when `charge` is zero; callers must not read them in that case.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregate {
    pub charge: f64,
    pub cx: f64,
    pub cy: f64,
    /// Contribution of the point held directly by the region (`0` if none).
    pub point_charge: f64,
}

/// Alternating `+JITTER`/`-JITTER` source.
#[derive(Debug, Clone, Default)]
pub struct Jitter {
    positive: bool,
}

impl Jitter {
    pub fn next_offset(&mut self) -> f64 {
        self.positive = !self.positive;
        if self.positive { JITTER } else { -JITTER }
    }
}

/// Computes per-region charge and charge-weighted centroid, children before parents.
///
/// `tree` must have been built over `nodes` in order, so a point id is a node position. A point
/// that shares its region with children (a coincident pile-up) is nudged by `jitter` before it is
/// counted. Returns one [`Aggregate`] per region id.
pub fn accumulate(
    tree: &Quadtree,
    nodes: &mut [Node],
    charges: &[f64],
    alpha: f64,
    jitter: &mut Jitter,
) -> Vec<Aggregate> {
    let mut out = vec![Aggregate::default(); tree.len()];

    for id in tree.post_order() {
        let region = tree.region(id);
        let mut charge = 0.0;
        let mut sx = 0.0;
        let mut sy = 0.0;

        for &child in region.children().iter().flatten() {
            let c = out[child];
            charge += c.charge;
            // A chargeless child has no centroid and adds nothing to ours.
            if c.charge != 0.0 {
                sx += c.charge * c.cx;
                sy += c.charge * c.cy;
            }
        }

        let mut point_charge = 0.0;
        if let Some(p) = region.point() {
            let node = &mut nodes[p];
            if !region.is_leaf() {
                node.x += jitter.next_offset();
                node.y += jitter.next_offset();
            }
            let k = alpha * charges.get(p).copied().unwrap_or(0.0);
            charge += k;
            point_charge = k;
            sx += k * node.x;
            sy += k * node.y;
        }

        out[id] = Aggregate {
            charge,
            cx: sx / charge,
            cy: sy / charge,
            point_charge,
        };
    }

    out
}
