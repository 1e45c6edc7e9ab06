//! Per-face triangulation for fingerprinting.
//!
//! Wraps truck-meshalgo. Each face is meshed as part of the solid and the
//! meshed faces are walked in the same order as the source faces, so the
//! n-th mesh belongs to the n-th face of the enumeration.

use crate::types::*;
use synth_types::{add, cross, dot, norm, normalize, scale, sub, Aabb};
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::MeshableShape;
use truck_modeling::geometry::Surface;

type TruckSolid = truck_modeling::Solid;
type TruckFace = truck_modeling::Face;

/// Fingerprints of every face of `solid`, shells in order, faces in order.
pub fn face_fingerprints(solid: &TruckSolid, tolerance: f64) -> Vec<FaceFingerprint> {
    let meshed = solid.triangulation(tolerance);
    let mut out = Vec::new();
    for (shell, meshed_shell) in solid.boundaries().iter().zip(meshed.boundaries().iter()) {
        for (face, meshed_face) in shell.face_iter().zip(meshed_shell.face_iter()) {
            let maybe_mesh: Option<PolygonMesh> = meshed_face.surface();
            let mesh = maybe_mesh.map(|m| {
                // If face is inverted, the mesh needs inversion too
                if meshed_face.orientation() {
                    m
                } else {
                    let mut m = m;
                    m.invert();
                    m
                }
            });
            out.push(fingerprint_face(face, mesh.as_ref()));
        }
    }
    out
}

fn fingerprint_face(face: &TruckFace, mesh: Option<&PolygonMesh>) -> FaceFingerprint {
    let stats = mesh.map(mesh_stats).unwrap_or_default();

    let (centroid, normal, area, anchor, anchor_normal, bbox) = if stats.area > 0.0 {
        (
            scale(stats.weighted_centroid, 1.0 / stats.area),
            normalize(stats.weighted_normal),
            stats.area,
            stats.anchor,
            stats.anchor_normal,
            stats.bbox,
        )
    } else {
        // Degenerate or unmeshable face: fall back to the boundary vertices.
        let mut pts: Vec<[f64; 3]> = Vec::new();
        for wire in face.boundaries().iter() {
            for v in wire.vertex_iter() {
                let p = v.point();
                pts.push([p[0], p[1], p[2]]);
            }
        }
        let bbox = Aabb::from_points(pts.iter());
        let c = if pts.is_empty() { [0.0; 3] } else { bbox.center() };
        (c, [0.0; 3], 0.0, c, [0.0; 3], bbox)
    };

    let surface = match face.oriented_surface() {
        Surface::Plane(plane) => {
            let n = plane.normal();
            let mut n = normalize([n[0], n[1], n[2]]);
            if dot(n, normal) < 0.0 {
                n = [-n[0], -n[1], -n[2]];
            }
            SurfaceKind::Planar {
                normal: n,
                offset: dot(n, anchor),
            }
        }
        _ => SurfaceKind::Curved,
    };

    FaceFingerprint {
        surface,
        centroid,
        normal,
        area,
        bbox,
        anchor,
        anchor_normal,
    }
}

#[derive(Default)]
struct MeshStats {
    area: f64,
    weighted_centroid: [f64; 3],
    weighted_normal: [f64; 3],
    anchor: [f64; 3],
    anchor_normal: [f64; 3],
    bbox: Aabb,
}

fn mesh_stats(mesh: &PolygonMesh) -> MeshStats {
    let positions = mesh.positions();
    let mut stats = MeshStats::default();
    let mut largest = 0.0;
    for tri in mesh.tri_faces() {
        let p: Vec<[f64; 3]> = tri
            .iter()
            .map(|v| {
                let q = positions[v.pos];
                [q[0], q[1], q[2]]
            })
            .collect();
        let c = cross(sub(p[1], p[0]), sub(p[2], p[0]));
        let a = 0.5 * norm(c);
        let center = scale(add(add(p[0], p[1]), p[2]), 1.0 / 3.0);
        stats.area += a;
        stats.weighted_centroid = add(stats.weighted_centroid, scale(center, a));
        stats.weighted_normal = add(stats.weighted_normal, scale(c, 0.5));
        if a > largest {
            largest = a;
            stats.anchor = center;
            stats.anchor_normal = normalize(c);
        }
    }
    for q in positions {
        stats.bbox.include([q[0], q[1], q[2]]);
    }
    stats
}

/// Every edge once, with the indices of the faces whose boundary uses it.
pub fn edge_records(solid: &TruckSolid, tolerance: f64) -> Vec<EdgeRecord> {
    use std::collections::HashMap;
    use truck_modeling::{BoundedCurve, ParameterDivision1D};

    let mut records: Vec<EdgeRecord> = Vec::new();
    let mut index_of = HashMap::new();
    let mut face_index = 0usize;

    for shell in solid.boundaries().iter() {
        for face in shell.face_iter() {
            for wire in face.boundaries().iter() {
                for edge in wire.edge_iter() {
                    // Each edge appears in two faces
                    let slot = *index_of.entry(edge.id()).or_insert_with(|| {
                        let curve = edge.oriented_curve();
                        let (_params, points) = curve.parameter_division(curve.range_tuple(), tolerance);
                        let front = edge.front().point();
                        let back = edge.back().point();
                        let start = [front[0], front[1], front[2]];
                        let end = [back[0], back[1], back[2]];
                        let pts: Vec<[f64; 3]> = points.iter().map(|p| [p[0], p[1], p[2]]).collect();
                        records.push(EdgeRecord {
                            start,
                            end,
                            straight: is_straight(start, end, &pts, tolerance),
                            faces: Vec::new(),
                        });
                        records.len() - 1
                    });
                    if !records[slot].faces.contains(&face_index) {
                        records[slot].faces.push(face_index);
                    }
                }
            }
            face_index += 1;
        }
    }
    records
}

fn is_straight(start: [f64; 3], end: [f64; 3], samples: &[[f64; 3]], tolerance: f64) -> bool {
    let axis = sub(end, start);
    let len = norm(axis);
    if len < 1e-9 {
        return false;
    }
    let dir = scale(axis, 1.0 / len);
    samples.iter().all(|&p| {
        let v = sub(p, start);
        norm(sub(v, scale(dir, dot(v, dir)))) < tolerance.min(len * 1e-3).max(1e-7)
    })
}
