//! Convex stock edges that host chamfers and rounds.

use crate::bound::face_on_stock_boundary;
use serde::{Deserialize, Serialize};
use synth_types::*;

/// A straight convex edge between two perpendicular planar faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCandidate {
    pub start: [f64; 3],
    pub end: [f64; 3],
    /// Outward normals of the two adjacent faces.
    pub n1: [f64; 3],
    pub n2: [f64; 3],
    /// Largest transition size the adjacent faces can take.
    pub limit: f64,
}

impl EdgeCandidate {
    pub fn direction(&self) -> [f64; 3] {
        normalize(sub(self.end, self.start))
    }

    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    pub fn midpoint(&self) -> [f64; 3] {
        scale(add(self.start, self.end), 0.5)
    }
}

/// Extent of a face's box along the axis of `dir`.
fn extent_along(fp: &FaceFingerprint, dir: [f64; 3]) -> f64 {
    match axis_of(dir) {
        Some((k, _)) => fp.bbox.size()[k],
        None => 0.0,
    }
}

/// Convex edges between perpendicular planar faces on the stock boundary.
pub fn convex_edges(
    faces: &[FaceFingerprint],
    edges: &[EdgeRecord],
    stock: &Aabb,
) -> Vec<EdgeCandidate> {
    edges
        .iter()
        .filter(|e| e.straight && e.faces.len() == 2 && e.length() > GEOM_EPS)
        .filter_map(|e| {
            let f1 = faces.get(e.faces[0])?;
            let f2 = faces.get(e.faces[1])?;
            let (n1, _) = f1.plane()?;
            let (n2, _) = f2.plane()?;
            if dot(n1, n2).abs() > GEOM_EPS {
                return None;
            }
            if !face_on_stock_boundary(f1, stock) || !face_on_stock_boundary(f2, stock) {
                return None;
            }
            // face 1 lies behind face 2's plane
            if dot(sub(f1.centroid, e.midpoint()), n2) >= 0.0 {
                return None;
            }
            let limit = 0.5 * extent_along(f1, n2).min(extent_along(f2, n1));
            Some(EdgeCandidate {
                start: e.start,
                end: e.end,
                n1,
                n2,
                limit,
            })
        })
        .collect()
}
