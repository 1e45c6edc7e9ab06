//! Solid builders on top of truck's sweep API.
//!
//! truck has no built-in box or prism: everything is successive sweeps.

use crate::types::*;
use truck_modeling::builder;
use truck_modeling::geometry::Surface;
use truck_modeling::topology::{Edge, Face, Solid, Vertex, Wire};
use truck_modeling::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};

pub(crate) fn point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

pub(crate) fn vector(v: [f64; 3]) -> Vector3 {
    Vector3::new(v[0], v[1], v[2])
}

/// Box via successive translational sweeps, minimum corner at `origin`.
pub fn make_box(origin: [f64; 3], size: [f64; 3]) -> Solid {
    let v = builder::vertex(point(origin));
    let edge = builder::tsweep(&v, Vector3::new(size[0], 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, size[1], 0.0));
    builder::tsweep(&face, Vector3::new(0.0, 0.0, size[2]))
}

/// Closed wire for one profile loop. Consecutive segments share vertices.
fn loop_wire(segments: &[Segment]) -> Wire {
    let vertices: Vec<Vertex> = segments
        .iter()
        .map(|s| builder::vertex(point(s.start())))
        .collect();
    let n = vertices.len();
    let edges: Vec<Edge> = segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let (v0, v1) = (&vertices[i], &vertices[(i + 1) % n]);
            match *seg {
                Segment::Line { .. } => builder::line(v0, v1),
                Segment::Arc { mid, .. } => builder::circle_arc(v0, v1, point(mid)),
            }
        })
        .collect();
    Wire::from_iter(edges)
}

/// Planar face bounded by the profile's outer loop, with inner loops as holes.
pub fn profile_face(profile: &Profile) -> Result<Face, KernelError> {
    if !profile.is_closed(1e-7) {
        return Err(KernelError::InvalidProfile {
            reason: "profile loops are not closed".to_string(),
        });
    }
    let wires: Vec<Wire> = profile.loops().map(|lp| loop_wire(lp)).collect();
    builder::try_attach_plane(&wires).map_err(|e| KernelError::InvalidProfile {
        reason: format!("failed to create planar face: {}", e),
    })
}

/// Extrude a profile along `direction`. The face is flipped first when its
/// plane normal opposes the sweep, so the result is always outward-oriented.
pub fn extrude(profile: &Profile, direction: [f64; 3], length: f64) -> Result<Solid, KernelError> {
    let dir = vector(direction);
    if dir.magnitude() < 1e-12 || length <= 0.0 {
        return Err(KernelError::InvalidProfile {
            reason: "extrusion has zero length".to_string(),
        });
    }
    let sweep = dir.normalize() * length;
    let mut face = profile_face(profile)?;
    if let Surface::Plane(plane) = face.oriented_surface() {
        if plane.normal().dot(sweep) < 0.0 {
            face.invert();
        }
    }
    Ok(builder::tsweep(&face, sweep))
}

/// Matrix for `RigidTransform`: rotate about the line through `center`, then translate.
pub fn placement_matrix(placement: &RigidTransform) -> Matrix4 {
    let translation = Matrix4::from_translation(vector(placement.translation));
    if placement.angle.abs() < 1e-15 {
        return translation;
    }
    let center = point(placement.center).to_vec();
    translation
        * Matrix4::from_translation(center)
        * Matrix4::from_axis_angle(vector(placement.axis).normalize(), Rad(placement.angle))
        * Matrix4::from_translation(-center)
}
