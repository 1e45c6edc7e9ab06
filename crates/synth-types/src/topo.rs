use serde::{Deserialize, Serialize};

use crate::geom::{dot, Aabb, GEOM_EPS};

/// Surface classification of a face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceKind {
    /// Plane `normal · x = offset`, normal pointing out of the material.
    Planar { normal: [f64; 3], offset: f64 },
    /// Any non-planar surface (cylinders, NURBS, intersection patches).
    Curved,
}

/// Geometric signature of one face in one solid generation.
///
/// Kernels report these in a stable enumeration order. The order is the
/// index space of every per-face label array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceFingerprint {
    pub surface: SurfaceKind,
    /// Area-weighted centroid. May lie off the surface for curved faces.
    pub centroid: [f64; 3],
    /// Area-weighted mean outward normal.
    pub normal: [f64; 3],
    pub area: f64,
    pub bbox: Aabb,
    /// A point lying on the face.
    pub anchor: [f64; 3],
    /// Outward normal at `anchor`.
    pub anchor_normal: [f64; 3],
}

impl FaceFingerprint {
    pub fn is_planar(&self) -> bool {
        matches!(self.surface, SurfaceKind::Planar { .. })
    }

    pub fn plane(&self) -> Option<([f64; 3], f64)> {
        match self.surface {
            SurfaceKind::Planar { normal, offset } => Some((normal, offset)),
            SurfaceKind::Curved => None,
        }
    }

    /// True when both faces lie on the same oriented plane.
    pub fn coplanar_with(&self, other: &FaceFingerprint, tol: f64) -> bool {
        match (self.plane(), other.plane()) {
            (Some((n1, d1)), Some((n2, d2))) => {
                dot(n1, n2) > 1.0 - GEOM_EPS && (d1 - d2).abs() < tol
            }
            _ => false,
        }
    }
}

/// One edge of a solid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub start: [f64; 3],
    pub end: [f64; 3],
    /// True when the edge curve is a straight segment between its endpoints.
    pub straight: bool,
    /// Indices into the solid's face enumeration.
    pub faces: Vec<usize>,
}

impl EdgeRecord {
    pub fn midpoint(&self) -> [f64; 3] {
        [
            0.5 * (self.start[0] + self.end[0]),
            0.5 * (self.start[1] + self.end[1]),
            0.5 * (self.start[2] + self.end[2]),
        ]
    }

    pub fn length(&self) -> f64 {
        crate::geom::distance(self.start, self.end)
    }
}
