//! Placement bounds: rectangles on axis-aligned planar faces.

use serde::{Deserialize, Serialize};
use synth_types::*;

/// Tolerance for "lies on the stock boundary" tests.
const BOUNDARY_TOL: f64 = 1e-6;

/// Four ordered corners on a planar face plus the face's outward normal.
///
/// `p1` is the frame origin; width runs along `p2 - p1`, height along
/// `p0 - p1`, and `(p2 - p1) × (p0 - p1)` points along `normal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub corners: [[f64; 3]; 4],
    pub normal: [f64; 3],
    /// Index of the host face in the enumeration it was derived from.
    pub face: usize,
    /// The host face lies on the stock's bounding box.
    pub on_stock_boundary: bool,
    /// Sides that lie on the stock boundary: `p1p2`, `p2p3`, `p3p0`, `p0p1`.
    pub open_sides: [bool; 4],
}

impl Bound {
    pub fn width(&self) -> f64 {
        distance(self.corners[2], self.corners[1])
    }

    pub fn height(&self) -> f64 {
        distance(self.corners[0], self.corners[1])
    }

    pub fn frame(&self) -> BoundFrame {
        let w = self.width();
        let h = self.height();
        BoundFrame {
            origin: self.corners[1],
            u: normalize(sub(self.corners[2], self.corners[1])),
            v: normalize(sub(self.corners[0], self.corners[1])),
            n: self.normal,
            w,
            h,
        }
    }

    pub fn rect(&self) -> Aabb {
        Aabb::from_points(self.corners.iter())
    }
}

/// Orthonormal frame of a bound: `origin + a·u + b·v`, `u × v = n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundFrame {
    pub origin: [f64; 3],
    pub u: [f64; 3],
    pub v: [f64; 3],
    pub n: [f64; 3],
    pub w: f64,
    pub h: f64,
}

impl BoundFrame {
    /// Point at `(a, b)` in the frame, raised `lift` along the normal.
    pub fn at(&self, a: f64, b: f64, lift: f64) -> [f64; 3] {
        add(plane_point(self.origin, self.u, a, self.v, b), scale(self.n, lift))
    }

    /// The same rectangle re-based so that `side` becomes the `b = 0` side.
    pub fn rotated(&self, side: usize) -> BoundFrame {
        match side % 4 {
            0 => *self,
            1 => BoundFrame {
                origin: plane_point(self.origin, self.u, self.w, self.v, 0.0),
                u: self.v,
                v: neg(self.u),
                n: self.n,
                w: self.h,
                h: self.w,
            },
            2 => BoundFrame {
                origin: plane_point(self.origin, self.u, self.w, self.v, self.h),
                u: neg(self.u),
                v: neg(self.v),
                n: self.n,
                w: self.w,
                h: self.h,
            },
            _ => BoundFrame {
                origin: plane_point(self.origin, self.u, 0.0, self.v, self.h),
                u: neg(self.v),
                v: self.u,
                n: self.n,
                w: self.h,
                h: self.w,
            },
        }
    }
}

/// Distance from the host plane to the opposite stock boundary, measured
/// against the outward normal.
pub fn extent_below(bound: &Bound, stock: &Aabb) -> f64 {
    match axis_of(bound.normal) {
        Some((k, s)) => {
            let c = bound.corners[1][k];
            if s > 0.0 {
                c - stock.min[k]
            } else {
                stock.max[k] - c
            }
        }
        None => 0.0,
    }
}

fn on_boundary(coord: f64, axis: usize, sign: f64, stock: &Aabb) -> bool {
    let target = if sign > 0.0 {
        stock.max[axis]
    } else {
        stock.min[axis]
    };
    (coord - target).abs() < BOUNDARY_TOL
}

/// True when the face's plane is one of the six stock box planes.
pub fn face_on_stock_boundary(fp: &FaceFingerprint, stock: &Aabb) -> bool {
    match fp.plane().and_then(|(n, _)| axis_of(n)) {
        Some((k, s)) => on_boundary(fp.anchor[k], k, s, stock),
        None => false,
    }
}

/// Bounds for every axis-aligned planar face whose rectangle leaves room
/// inside `clearance` on both sides.
pub fn derive_bounds(faces: &[FaceFingerprint], stock: &Aabb, clearance: f64) -> Vec<Bound> {
    let mut bounds = Vec::new();
    for (index, fp) in faces.iter().enumerate() {
        let Some((n, _)) = fp.plane() else {
            continue;
        };
        let Some((k, s)) = axis_of(n) else {
            continue;
        };
        let (i, j) = ((k + 1) % 3, (k + 2) % 3);
        // u × v must equal the outward normal
        let (ia, ib) = if s > 0.0 { (i, j) } else { (j, i) };
        let c = fp.anchor[k];
        let corner = |a: f64, b: f64| {
            let mut p = [0.0; 3];
            p[k] = c;
            p[ia] = a;
            p[ib] = b;
            p
        };
        let (a0, a1) = (fp.bbox.min[ia], fp.bbox.max[ia]);
        let (b0, b1) = (fp.bbox.min[ib], fp.bbox.max[ib]);
        if a1 - a0 <= 2.0 * clearance || b1 - b0 <= 2.0 * clearance {
            continue;
        }
        let open_sides = [
            on_boundary(b0, ib, -1.0, stock),
            on_boundary(a1, ia, 1.0, stock),
            on_boundary(b1, ib, 1.0, stock),
            on_boundary(a0, ia, -1.0, stock),
        ];
        bounds.push(Bound {
            corners: [corner(a0, b1), corner(a0, b0), corner(a1, b0), corner(a1, b1)],
            normal: unit_axis(k, s),
            face: index,
            on_stock_boundary: on_boundary(c, k, s, stock),
            open_sides,
        });
    }
    bounds
}
