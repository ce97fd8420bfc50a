use super::{Aggregate, MAX_STEP};
use crate::node::Node;
use quokka_quadtree::Quadtree;

fn clamp_step(v: f64) -> f64 {
    v.clamp(-MAX_STEP, MAX_STEP)
}

/// Walks `tree` from the root and applies charge from every region onto `node` (point id
/// `target`).
///
/// Regions far enough away (`width / distance < theta`) act as one aggregate charge and are not
/// descended. Closer regions contribute their own point individually and are opened. The result
/// A region whose charges cancel out (or are all zero) exerts nothing. The result
/// is written to `px`/`py`, so the next Verlet step turns it into velocity; `x`/`y` are left
/// untouched, and the walk is unaffected by updates already applied to other nodes.
pub fn repulse(
    tree: &Quadtree,
    aggregates: &[Aggregate],
    target: usize,
    node: &mut Node,
    theta: f64,
) {
    let (x, y) = (node.x, node.y);
    tree.visit(|id, region, bounds| {
        let agg = &aggregates[id];
        // No centroid to measure from; the region and everything under it is skipped.
        if agg.charge == 0.0 {
            return true;
        }
        if region.point() != Some(target) {
            let dx = agg.cx - x;
            let dy = agg.cy - y;
            let dn = 1.0 / (dx * dx + dy * dy).sqrt();

            if bounds.width() * dn < theta {
                let k = agg.charge * dn * dn;
                node.px -= clamp_step(dx * k);
                node.py -= clamp_step(dy * k);
                return true;
            }

            if region.point().is_some() && dn.is_finite() {
                let k = agg.point_charge * dn * dn;
                node.px -= clamp_step(dx * k);
                node.py -= clamp_step(dy * k);
            }
        }
        false
    });
}
