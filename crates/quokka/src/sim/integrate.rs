use crate::node::Node;

/// Position Verlet with friction, in index order.
///
/// Pinned nodes snap back to `px`/`py`; free nodes move by `(x - px) * friction`.
pub fn integrate(nodes: &mut [Node], friction: f64) {
    for n in nodes.iter_mut() {
        if n.fixed {
            n.x = n.px;
            n.y = n.py;
        } else {
            let (tx, ty) = (n.x, n.y);
            n.x -= (n.px - n.x) * friction;
            n.y -= (n.py - n.y) * friction;
            n.px = tx;
            n.py = ty;
        }
    }
}
