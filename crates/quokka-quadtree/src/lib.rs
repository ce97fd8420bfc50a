#![forbid(unsafe_code)]

//! Point quadtree used by `quokka`.
//!
//! The tree is built once over a snapshot of point positions and is immutable afterwards. Regions
//! live in an arena (`RegionId` indexes into it, the root is always `0`), so callers can attach
//! per-region data in a parallel `Vec` instead of mutating the tree.
//!
//! Coincident points are kept apart by leaving the first point on the region and pushing the
//! newcomer into a child. A region can therefore hold a point *and* children; such a region is
//! not a pure leaf.

pub type RegionId = usize;

/// Two points closer than this (L1 distance) are treated as coincident during insertion.
const COINCIDENT_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    fn mid(&self) -> (f64, f64) {
        ((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    /// Bounds of child quadrant `slot` (`0` top-left, `1` top-right, `2` bottom-left, `3`
    /// bottom-right).
    pub fn quadrant(&self, slot: usize) -> Bounds {
        let (sx, sy) = self.mid();
        let right = slot & 1 == 1;
        let bottom = slot & 2 == 2;
        Bounds {
            x1: if right { sx } else { self.x1 },
            y1: if bottom { sy } else { self.y1 },
            x2: if right { self.x2 } else { sx },
            y2: if bottom { self.y2 } else { sy },
        }
    }

    /// `false` once float precision no longer lets the midpoint fall strictly inside.
    fn can_split(&self) -> bool {
        let (sx, sy) = self.mid();
        self.x1 < sx && sx < self.x2 && self.y1 < sy && sy < self.y2
    }

    fn slot_for(&self, x: f64, y: f64) -> usize {
        let (sx, sy) = self.mid();
        let right = x >= sx;
        let bottom = y >= sy;
        ((bottom as usize) << 1) + right as usize
    }
}

#[derive(Debug, Clone)]
pub struct Region {
    leaf: bool,
    point: Option<usize>,
    children: [Option<RegionId>; 4],
}

impl Region {
    fn empty_leaf() -> Self {
        Self {
            leaf: true,
            point: None,
            children: [None; 4],
        }
    }

    /// `true` until a point has been pushed below this region.
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Id of the point held directly by this region, if any.
    pub fn point(&self) -> Option<usize> {
        self.point
    }

    pub fn children(&self) -> &[Option<RegionId>; 4] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Quadtree {
    regions: Vec<Region>,
    points: Vec<(f64, f64)>,
    bounds: Bounds,
}

impl Quadtree {
    /// Builds a tree over `points`. A point's id is its position in the iterator; points with a
    /// non-finite coordinate keep their id but are not inserted.
    pub fn build<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let points: Vec<(f64, f64)> = points.into_iter().collect();

        let mut x1 = f64::INFINITY;
        let mut y1 = f64::INFINITY;
        let mut x2 = f64::NEG_INFINITY;
        let mut y2 = f64::NEG_INFINITY;
        for &(x, y) in points.iter().filter(|p| is_finite_point(**p)) {
            x1 = x1.min(x);
            y1 = y1.min(y);
            x2 = x2.max(x);
            y2 = y2.max(y);
        }
        let bounds = if x1 > x2 {
            Bounds {
                x1: 0.0,
                y1: 0.0,
                x2: 0.0,
                y2: 0.0,
            }
        } else {
            // Square the extent so every quadrant split keeps a 1:1 aspect.
            let dx = x2 - x1;
            let dy = y2 - y1;
            if dx > dy {
                y2 = y1 + dx;
            } else {
                x2 = x1 + dy;
            }
            Bounds { x1, y1, x2, y2 }
        };

        let mut tree = Self {
            regions: vec![Region::empty_leaf()],
            points,
            bounds,
        };
        for id in 0..tree.points.len() {
            if is_finite_point(tree.points[id]) {
                tree.insert(id);
            }
        }
        tree
    }

    fn insert(&mut self, id: usize) {
        // Pending (region, bounds, point) insertions. Splitting a leaf re-inserts its old point,
        // so a single call can fan out into two descents.
        let mut pending: Vec<(RegionId, Bounds, usize)> = vec![(0, self.bounds, id)];
        while let Some((region, bounds, p)) = pending.pop() {
            if !self.regions[region].leaf {
                self.push_into_child(region, bounds, p, &mut pending);
                continue;
            }
            match self.regions[region].point {
                None => self.regions[region].point = Some(p),
                Some(existing) => {
                    let (vx, vy) = self.points[existing];
                    let (px, py) = self.points[p];
                    if (vx - px).abs() + (vy - py).abs() < COINCIDENT_EPSILON
                        || !bounds.can_split()
                    {
                        self.push_into_child(region, bounds, p, &mut pending);
                    } else {
                        self.regions[region].point = None;
                        // Popped in reverse: the old point goes down first.
                        self.push_into_child(region, bounds, p, &mut pending);
                        self.push_into_child(region, bounds, existing, &mut pending);
                    }
                }
            }
        }
    }

    fn push_into_child(
        &mut self,
        region: RegionId,
        bounds: Bounds,
        p: usize,
        pending: &mut Vec<(RegionId, Bounds, usize)>,
    ) {
        let (x, y) = self.points[p];
        let slot = bounds.slot_for(x, y);
        self.regions[region].leaf = false;
        let child = match self.regions[region].children[slot] {
            Some(child) => child,
            None => {
                let child = self.regions.len();
                self.regions.push(Region::empty_leaf());
                self.regions[region].children[slot] = Some(child);
                child
            }
        };
        pending.push((child, bounds.quadrant(slot), p));
    }

    pub fn root(&self) -> RegionId {
        0
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id]
    }

    /// Number of regions in the tree (never zero: the root always exists).
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// `true` when no point was inserted.
    pub fn is_empty(&self) -> bool {
        self.regions[0].leaf && self.regions[0].point.is_none()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Position of point `id` as captured at build time.
    pub fn point(&self, id: usize) -> (f64, f64) {
        self.points[id]
    }

    /// Pre-order traversal. Children are visited in slot order; returning `true` from `f` skips
    /// the children of that region.
    pub fn visit<F>(&self, mut f: F)
    where
        F: FnMut(RegionId, &Region, Bounds) -> bool,
    {
        let mut stack: Vec<(RegionId, Bounds)> = vec![(0, self.bounds)];
        while let Some((id, bounds)) = stack.pop() {
            let region = &self.regions[id];
            if f(id, region, bounds) {
                continue;
            }
            for slot in (0..4).rev() {
                if let Some(child) = region.children[slot] {
                    stack.push((child, bounds.quadrant(slot)));
                }
            }
        }
    }

    /// Region ids with every child listed before its parent, children in slot order.
    pub fn post_order(&self) -> Vec<RegionId> {
        let mut out = Vec::with_capacity(self.regions.len());
        // (region, expanded)
        let mut stack: Vec<(RegionId, bool)> = vec![(0, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                out.push(id);
                continue;
            }
            stack.push((id, true));
            for slot in (0..4).rev() {
                if let Some(child) = self.regions[id].children[slot] {
                    stack.push((child, false));
                }
            }
        }
        out
    }
}

fn is_finite_point((x, y): (f64, f64)) -> bool {
    x.is_finite() && y.is_finite()
}
