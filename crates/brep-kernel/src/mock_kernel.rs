//! MockKernel: deterministic test double implementing Kernel + KernelIntrospect.
//!
//! Every solid is a union of extruded prisms minus a list of removed prisms.
//! Faces carry a grid of surface samples; subtraction clips samples against
//! the tool, splits faces into connected sample clusters and adds the tool's
//! samples that lie strictly inside the material. Fingerprints are computed
//! from the samples, so they approximate the exact values to within a cell.

use crate::step;
use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use synth_types::*;

/// Samples across each face direction.
const GRID: usize = 16;
/// Polyline resolution of arcs in membership tests.
const ARC_STEPS: usize = 24;
const EPS: f64 = 1e-6;

/// Extruded 2D region: polygon in the (x, y) frame at `origin`, swept along `dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Prism {
    origin: [f64; 3],
    x: [f64; 3],
    y: [f64; 3],
    dir: [f64; 3],
    length: f64,
    outer: Vec<[f64; 2]>,
    holes: Vec<Vec<[f64; 2]>>,
}

impl Prism {
    fn local(&self, p: [f64; 3]) -> (f64, f64, f64) {
        let q = sub(p, self.origin);
        (dot(q, self.x), dot(q, self.y), dot(q, self.dir))
    }

    fn world(&self, u: f64, v: f64, s: f64) -> [f64; 3] {
        add(plane_point(self.origin, self.x, u, self.y, v), scale(self.dir, s))
    }

    fn boundary_distance(&self, u: f64, v: f64) -> f64 {
        std::iter::once(&self.outer)
            .chain(self.holes.iter())
            .map(|poly| polygon_distance(poly, u, v))
            .fold(f64::MAX, f64::min)
    }

    fn contains_2d(&self, u: f64, v: f64, strict: bool) -> bool {
        let inside = point_in_polygon(&self.outer, u, v)
            && !self.holes.iter().any(|h| point_in_polygon(h, u, v));
        let d = self.boundary_distance(u, v);
        if strict {
            inside && d > EPS
        } else {
            inside || d <= EPS
        }
    }

    fn contains(&self, p: [f64; 3], strict: bool) -> bool {
        let (u, v, s) = self.local(p);
        let along = if strict {
            s > EPS && s < self.length - EPS
        } else {
            s >= -EPS && s <= self.length + EPS
        };
        along && self.contains_2d(u, v, strict)
    }

    fn transformed(&self, t: &RigidTransform) -> Prism {
        Prism {
            origin: t.apply_point(self.origin),
            x: t.apply_vector(self.x),
            y: t.apply_vector(self.y),
            dir: t.apply_vector(self.dir),
            ..self.clone()
        }
    }
}

fn point_in_polygon(poly: &[[f64; 2]], u: f64, v: f64) -> bool {
    let mut inside = false;
    let n = poly.len();
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        if (a[1] > v) != (b[1] > v) {
            let t = (v - a[1]) / (b[1] - a[1]);
            if u < a[0] + t * (b[0] - a[0]) {
                inside = !inside;
            }
        }
    }
    inside
}

fn segment_distance(a: [f64; 2], b: [f64; 2], u: f64, v: f64) -> f64 {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let len2 = dx * dx + dy * dy;
    let t = if len2 < 1e-24 {
        0.0
    } else {
        (((u - a[0]) * dx + (v - a[1]) * dy) / len2).clamp(0.0, 1.0)
    };
    let (px, py) = (a[0] + t * dx - u, a[1] + t * dy - v);
    (px * px + py * py).sqrt()
}

fn polygon_distance(poly: &[[f64; 2]], u: f64, v: f64) -> f64 {
    let n = poly.len();
    (0..n)
        .map(|i| segment_distance(poly[i], poly[(i + 1) % n], u, v))
        .fold(f64::MAX, f64::min)
}

/// One surface sample: position, outward normal, grid cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FaceSample {
    p: [f64; 3],
    n: [f64; 3],
    cell: (i32, i32),
}

/// A mock face: its surface and the samples still on the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MockFace {
    surface: SurfaceKind,
    samples: Vec<FaceSample>,
    cell_area: f64,
    /// Half a grid cell along each sampling direction.
    half_u: [f64; 3],
    half_v: [f64; 3],
}

impl MockFace {
    fn fingerprint(&self) -> FaceFingerprint {
        let count = self.samples.len().max(1) as f64;
        let mut centroid = [0.0; 3];
        let mut normal = [0.0; 3];
        let mut bbox = Aabb::empty();
        for s in &self.samples {
            centroid = add(centroid, s.p);
            normal = add(normal, s.n);
            bbox.include(s.p);
        }
        let centroid = scale(centroid, 1.0 / count);
        let anchor_sample = self
            .samples
            .iter()
            .min_by(|a, b| {
                distance(a.p, centroid)
                    .partial_cmp(&distance(b.p, centroid))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        let (anchor, anchor_normal) = anchor_sample
            .map(|s| (s.p, s.n))
            .unwrap_or((centroid, normal));
        // Cells extend half a step beyond their centers.
        let grow = match self.surface {
            SurfaceKind::Planar { .. } => {
                [0, 1, 2].map(|i| self.half_u[i].abs() + self.half_v[i].abs())
            }
            SurfaceKind::Curved => [norm(self.half_u) + norm(self.half_v); 3],
        };
        if !bbox.is_empty() {
            for i in 0..3 {
                bbox.min[i] -= grow[i];
                bbox.max[i] += grow[i];
            }
        }
        FaceFingerprint {
            surface: self.surface,
            centroid,
            normal: normalize(normal),
            area: self.samples.len() as f64 * self.cell_area,
            bbox,
            anchor,
            anchor_normal,
        }
    }

    fn flipped(mut self) -> MockFace {
        if let SurfaceKind::Planar { normal, offset } = self.surface {
            self.surface = SurfaceKind::Planar {
                normal: neg(normal),
                offset: -offset,
            };
        }
        for s in &mut self.samples {
            s.n = neg(s.n);
        }
        self
    }

    fn with_samples(&self, samples: Vec<FaceSample>) -> MockFace {
        MockFace {
            surface: self.surface,
            samples,
            cell_area: self.cell_area,
            half_u: self.half_u,
            half_v: self.half_v,
        }
    }

    /// Split into faces of 4-connected sample cells.
    fn split_connected(&self, samples: Vec<FaceSample>) -> Vec<MockFace> {
        let index: HashMap<(i32, i32), usize> = samples
            .iter()
            .enumerate()
            .map(|(i, s)| (s.cell, i))
            .collect();
        let mut component = vec![usize::MAX; samples.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for start in 0..samples.len() {
            if component[start] != usize::MAX {
                continue;
            }
            let id = groups.len();
            let mut members = Vec::new();
            let mut queue = VecDeque::from([start]);
            component[start] = id;
            while let Some(i) = queue.pop_front() {
                members.push(i);
                let (cu, cv) = samples[i].cell;
                for nb in [(cu + 1, cv), (cu - 1, cv), (cu, cv + 1), (cu, cv - 1)] {
                    if let Some(&j) = index.get(&nb) {
                        if component[j] == usize::MAX {
                            component[j] = id;
                            queue.push_back(j);
                        }
                    }
                }
            }
            members.sort_unstable();
            groups.push(members);
        }
        groups
            .into_iter()
            .map(|members| self.with_samples(members.into_iter().map(|i| samples[i].clone()).collect()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MockEdge {
    start: [f64; 3],
    end: [f64; 3],
}

/// A synthetic solid: material prisms minus removed prisms.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MockSolid {
    faces: Vec<MockFace>,
    edges: Vec<MockEdge>,
    volumes: Vec<Prism>,
    voids: Vec<Prism>,
}

impl MockSolid {
    fn material_contains(&self, p: [f64; 3]) -> bool {
        self.volumes.iter().any(|v| v.contains(p, true))
            && !self.voids.iter().any(|v| v.contains(p, false))
    }
}

/// Build the prism and its faces for an extruded profile.
fn prism_solid(profile: &Profile, direction: [f64; 3], length: f64) -> Result<MockSolid, KernelError> {
    if !profile.is_closed(1e-7) {
        return Err(KernelError::InvalidProfile {
            reason: "profile loops are not closed".to_string(),
        });
    }
    if length <= 0.0 || norm(direction) < 1e-12 {
        return Err(KernelError::InvalidProfile {
            reason: "extrusion has zero length".to_string(),
        });
    }
    let dir = normalize(direction);
    let n = profile.plane_normal().ok_or_else(|| KernelError::InvalidProfile {
        reason: "profile is degenerate".to_string(),
    })?;
    if dot(n, dir).abs() < 1.0 - 1e-6 {
        return Err(KernelError::NotSupported {
            operation: "oblique extrusion".to_string(),
        });
    }
    let origin = profile.outer[0].start();
    let first = sub(profile.outer[0].end(), origin);
    let x = normalize(sub(first, scale(dir, dot(first, dir))));
    let y = cross(dir, x);
    let to_2d = |p: [f64; 3]| {
        let q = sub(p, origin);
        [dot(q, x), dot(q, y)]
    };
    let loop_2d = |lp: &Vec<Segment>| -> Vec<[f64; 2]> {
        lp.iter().flat_map(|s| s.polyline(ARC_STEPS)).map(to_2d).collect()
    };
    let prism = Prism {
        origin,
        x,
        y,
        dir,
        length,
        outer: loop_2d(&profile.outer),
        holes: profile.holes.iter().map(loop_2d).collect(),
    };

    let mut faces = vec![cap_face(&prism, 0.0, neg(dir)), cap_face(&prism, length, dir)];
    let mut edges = Vec::new();
    for lp in profile.loops() {
        for (i, seg) in lp.iter().enumerate() {
            match seg {
                Segment::Line { start, end } => {
                    faces.push(line_face(&prism, to_2d(*start), to_2d(*end)));
                    for s in [0.0, length] {
                        edges.push(MockEdge {
                            start: add(*start, scale(dir, s)),
                            end: add(*end, scale(dir, s)),
                        });
                    }
                    let prev = &lp[(i + lp.len() - 1) % lp.len()];
                    if matches!(prev, Segment::Line { .. }) {
                        edges.push(MockEdge {
                            start: *start,
                            end: add(*start, scale(dir, length)),
                        });
                    }
                }
                Segment::Arc { .. } => {
                    let arc = seg.arc_geometry().ok_or_else(|| KernelError::InvalidProfile {
                        reason: "arc points are collinear".to_string(),
                    })?;
                    faces.push(arc_face(&prism, &arc));
                }
            }
        }
    }
    Ok(MockSolid {
        faces,
        edges,
        volumes: vec![prism],
        voids: Vec::new(),
    })
}

fn planar(normal: [f64; 3], on_plane: [f64; 3]) -> SurfaceKind {
    SurfaceKind::Planar {
        normal,
        offset: dot(normal, on_plane),
    }
}

fn cap_face(prism: &Prism, s: f64, normal: [f64; 3]) -> MockFace {
    let (mut lo, mut hi) = ([f64::MAX; 2], [f64::MIN; 2]);
    for p in &prism.outer {
        for i in 0..2 {
            lo[i] = lo[i].min(p[i]);
            hi[i] = hi[i].max(p[i]);
        }
    }
    let (cu, cv) = ((hi[0] - lo[0]) / GRID as f64, (hi[1] - lo[1]) / GRID as f64);
    let mut samples = Vec::new();
    for i in 0..GRID as i32 {
        for j in 0..GRID as i32 {
            let u = lo[0] + (i as f64 + 0.5) * cu;
            let v = lo[1] + (j as f64 + 0.5) * cv;
            if prism.contains_2d(u, v, false) {
                samples.push(FaceSample {
                    p: prism.world(u, v, s),
                    n: normal,
                    cell: (i, j),
                });
            }
        }
    }
    MockFace {
        surface: planar(normal, prism.world(0.0, 0.0, s)),
        samples,
        cell_area: cu * cv,
        half_u: scale(prism.x, 0.5 * cu),
        half_v: scale(prism.y, 0.5 * cv),
    }
}

/// Outward in-plane direction at 2D point `m` along candidate `n2`.
fn outward_sign(prism: &Prism, m: [f64; 2], n2: [f64; 2], scale_hint: f64) -> f64 {
    let d = 1e-4 * scale_hint.max(1e-3);
    if prism.contains_2d(m[0] + n2[0] * d, m[1] + n2[1] * d, true) {
        -1.0
    } else {
        1.0
    }
}

fn line_face(prism: &Prism, a: [f64; 2], b: [f64; 2]) -> MockFace {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let len = (dx * dx + dy * dy).sqrt();
    let mut n2 = [dy / len, -dx / len];
    let sign = outward_sign(prism, [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1])], n2, len);
    n2 = [n2[0] * sign, n2[1] * sign];
    let normal = normalize(add(scale(prism.x, n2[0]), scale(prism.y, n2[1])));
    let (su, sv) = (len / GRID as f64, prism.length / GRID as f64);
    let mut samples = Vec::with_capacity(GRID * GRID);
    for i in 0..GRID {
        for j in 0..GRID {
            let t = (i as f64 + 0.5) / GRID as f64;
            samples.push(FaceSample {
                p: prism.world(a[0] + t * dx, a[1] + t * dy, (j as f64 + 0.5) * sv),
                n: normal,
                cell: (i as i32, j as i32),
            });
        }
    }
    MockFace {
        surface: planar(normal, prism.world(a[0], a[1], 0.0)),
        samples,
        cell_area: su * sv,
        half_u: scale(sub(prism.world(b[0], b[1], 0.0), prism.world(a[0], a[1], 0.0)), 0.5 / GRID as f64),
        half_v: scale(prism.dir, 0.5 * sv),
    }
}

fn arc_face(prism: &Prism, arc: &ArcGeometry) -> MockFace {
    let mid = arc.point_at(0.5 * arc.sweep);
    let radial_mid = normalize(sub(mid, arc.center));
    let (mu, mv, _) = prism.local(mid);
    let n2 = [dot(radial_mid, prism.x), dot(radial_mid, prism.y)];
    let sign = outward_sign(prism, [mu, mv], n2, arc.radius);
    let (su, sv) = (arc.radius * arc.sweep / GRID as f64, prism.length / GRID as f64);
    let mut samples = Vec::with_capacity(GRID * GRID);
    for i in 0..GRID {
        let t = arc.sweep * (i as f64 + 0.5) / GRID as f64;
        let on_arc = arc.point_at(t);
        let n = scale(normalize(sub(on_arc, arc.center)), sign);
        for j in 0..GRID {
            samples.push(FaceSample {
                p: add(on_arc, scale(prism.dir, (j as f64 + 0.5) * sv)),
                n,
                cell: (i as i32, j as i32),
            });
        }
    }
    MockFace {
        surface: SurfaceKind::Curved,
        samples,
        cell_area: su * sv,
        half_u: scale(arc.e1, 0.5 * su),
        half_v: scale(prism.dir, 0.5 * sv),
    }
}

/// Deterministic test double for the geometry kernel.
/// Implements both Kernel and KernelIntrospect.
pub struct MockKernel {
    next_handle: u64,
    solids: HashMap<u64, MockSolid>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> SolidHandle {
        let h = SolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn store(&mut self, solid: MockSolid) -> SolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn get(&self, handle: &SolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or_else(|| KernelError::missing(handle))
    }

    /// Number of solids currently held.
    pub fn live_solids(&self) -> usize {
        self.solids.len()
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for MockKernel {
    fn make_box(&mut self, origin: [f64; 3], size: [f64; 3]) -> Result<SolidHandle, KernelError> {
        if size.iter().any(|&s| s <= 0.0) {
            return Err(KernelError::InvalidProfile {
                reason: format!("box size must be positive, got {:?}", size),
            });
        }
        let [x0, y0, z0] = origin;
        let [x1, y1] = [x0 + size[0], y0 + size[1]];
        let base = Profile::polygon(&[[x0, y0, z0], [x1, y0, z0], [x1, y1, z0], [x0, y1, z0]]);
        let solid = prism_solid(&base, [0.0, 0.0, 1.0], size[2])?;
        Ok(self.store(solid))
    }

    fn extrude_profile(
        &mut self,
        profile: &Profile,
        direction: [f64; 3],
        length: f64,
    ) -> Result<SolidHandle, KernelError> {
        let solid = prism_solid(profile, direction, length)?;
        Ok(self.store(solid))
    }

    fn boolean_subtract(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let solid_a = self.get(a)?;
        let solid_b = self.get(b)?;
        let tool = match (solid_b.volumes.as_slice(), solid_b.voids.is_empty()) {
            ([tool], true) => tool.clone(),
            _ => {
                return Err(KernelError::NotSupported {
                    operation: "mock subtraction of a non-prism tool".to_string(),
                })
            }
        };

        let mut faces = Vec::new();
        for face in &solid_a.faces {
            let kept: Vec<FaceSample> = face
                .samples
                .iter()
                .filter(|s| !tool.contains(s.p, true))
                .cloned()
                .collect();
            faces.extend(face.split_connected(kept));
        }
        for face in &solid_b.faces {
            let kept: Vec<FaceSample> = face
                .samples
                .iter()
                .filter(|s| solid_a.material_contains(s.p))
                .cloned()
                .collect();
            let flipped = face.clone().flipped();
            let kept = kept
                .into_iter()
                .map(|mut s| {
                    s.n = neg(s.n);
                    s
                })
                .collect();
            faces.extend(flipped.split_connected(kept));
        }
        faces.retain(|f| !f.samples.is_empty());
        if faces.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "subtraction removed the whole solid".to_string(),
            });
        }

        let mut edges: Vec<MockEdge> = solid_a
            .edges
            .iter()
            .filter(|e| !tool.contains(scale(add(e.start, e.end), 0.5), true))
            .cloned()
            .collect();
        edges.extend(
            solid_b
                .edges
                .iter()
                .filter(|e| solid_a.material_contains(scale(add(e.start, e.end), 0.5)))
                .cloned(),
        );

        let mut voids = solid_a.voids.clone();
        voids.push(tool);
        let result = MockSolid {
            faces,
            edges,
            volumes: solid_a.volumes.clone(),
            voids,
        };
        Ok(self.store(result))
    }

    fn combine(&mut self, parts: &[SolidHandle]) -> Result<SolidHandle, KernelError> {
        let mut combined = MockSolid {
            faces: Vec::new(),
            edges: Vec::new(),
            volumes: Vec::new(),
            voids: Vec::new(),
        };
        for part in parts {
            let solid = self.get(part)?;
            combined.faces.extend(solid.faces.iter().cloned());
            combined.edges.extend(solid.edges.iter().cloned());
            combined.volumes.extend(solid.volumes.iter().cloned());
            combined.voids.extend(solid.voids.iter().cloned());
        }
        Ok(self.store(combined))
    }

    fn transform(
        &mut self,
        solid: &SolidHandle,
        placement: &RigidTransform,
    ) -> Result<SolidHandle, KernelError> {
        let source = self.get(solid)?;
        let t = placement;
        let faces = source
            .faces
            .iter()
            .map(|f| {
                let surface = match f.surface {
                    SurfaceKind::Planar { normal, offset } => {
                        let n = t.apply_vector(normal);
                        planar(n, t.apply_point(scale(normal, offset)))
                    }
                    SurfaceKind::Curved => SurfaceKind::Curved,
                };
                MockFace {
                    surface,
                    samples: f
                        .samples
                        .iter()
                        .map(|s| FaceSample {
                            p: t.apply_point(s.p),
                            n: t.apply_vector(s.n),
                            cell: s.cell,
                        })
                        .collect(),
                    cell_area: f.cell_area,
                    half_u: t.apply_vector(f.half_u),
                    half_v: t.apply_vector(f.half_v),
                }
            })
            .collect();
        let moved = MockSolid {
            faces,
            edges: source
                .edges
                .iter()
                .map(|e| MockEdge {
                    start: t.apply_point(e.start),
                    end: t.apply_point(e.end),
                })
                .collect(),
            volumes: source.volumes.iter().map(|v| v.transformed(t)).collect(),
            voids: source.voids.iter().map(|v| v.transformed(t)).collect(),
        };
        Ok(self.store(moved))
    }

    fn import_solid(&mut self, path: &Path) -> Result<SolidHandle, KernelError> {
        let text = std::fs::read_to_string(path).map_err(|e| KernelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let solid: MockSolid = serde_json::from_str(&text).map_err(|e| KernelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(self.store(solid))
    }

    fn save_solid(&self, solid: &SolidHandle, path: &Path) -> Result<(), KernelError> {
        let text = serde_json::to_string(self.get(solid)?).map_err(|e| KernelError::Other {
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|e| KernelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn export_step(
        &self,
        solid: &SolidHandle,
        face_names: &[String],
    ) -> Result<String, KernelError> {
        let source = self.get(solid)?;
        let mut text = String::from(
            "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION(('mock solid'), '2;1');\n\
             FILE_NAME('', '', (''), (''), '', 'feature-synth', '');\n\
             FILE_SCHEMA(('CONFIG_CONTROL_DESIGN'));\nENDSEC;\nDATA;\n",
        );
        // Each face is bounded by a single vertex loop and written as the
        // plane through its anchor.
        for (i, face) in source.faces.iter().enumerate() {
            let fp = face.fingerprint();
            let (p, n) = (fp.anchor, fp.anchor_normal);
            let b = 8 * i + 1;
            text.push_str(&format!(
                "#{b} = ADVANCED_FACE('', (#{}), #{}, .T.);\n\
                 #{} = FACE_OUTER_BOUND('', #{}, .T.);\n\
                 #{} = VERTEX_LOOP('', #{});\n\
                 #{} = VERTEX_POINT('', #{});\n\
                 #{} = PLANE('', #{});\n\
                 #{} = CARTESIAN_POINT('', ({:.6}, {:.6}, {:.6}));\n\
                 #{} = AXIS2_PLACEMENT_3D('', #{}, #{}, $);\n\
                 #{} = DIRECTION('', ({:.6}, {:.6}, {:.6}));\n",
                b + 1,
                b + 4,
                b + 1,
                b + 2,
                b + 2,
                b + 3,
                b + 3,
                b + 5,
                b + 4,
                b + 6,
                b + 5,
                p[0],
                p[1],
                p[2],
                b + 6,
                b + 5,
                b + 7,
                b + 7,
                n[0],
                n[1],
                n[2],
            ));
        }
        text.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
        step::bind_face_names(&text, face_names)
    }

    fn release(&mut self, solid: &SolidHandle) {
        self.solids.remove(&solid.id());
    }
}

impl KernelIntrospect for MockKernel {
    fn face_fingerprints(&self, solid: &SolidHandle) -> Result<Vec<FaceFingerprint>, KernelError> {
        Ok(self.get(solid)?.faces.iter().map(MockFace::fingerprint).collect())
    }

    /// Adjacency is geometric: a planar face is adjacent to an edge when the
    /// edge lies in its plane and the edge midpoint falls inside its bounds.
    fn edges(&self, solid: &SolidHandle) -> Result<Vec<EdgeRecord>, KernelError> {
        let source = self.get(solid)?;
        let fps: Vec<FaceFingerprint> = source.faces.iter().map(MockFace::fingerprint).collect();
        Ok(source
            .edges
            .iter()
            .map(|e| {
                let mid = scale(add(e.start, e.end), 0.5);
                let faces = fps
                    .iter()
                    .enumerate()
                    .filter(|(_, fp)| match fp.plane() {
                        Some((n, d)) => {
                            (dot(n, e.start) - d).abs() < 1e-6
                                && (dot(n, e.end) - d).abs() < 1e-6
                                && fp.bbox.contains(mid, 1e-6)
                        }
                        None => false,
                    })
                    .map(|(i, _)| i)
                    .collect();
                EdgeRecord {
                    start: e.start,
                    end: e.end,
                    straight: true,
                    faces,
                }
            })
            .collect())
    }

    fn face_count(&self, solid: &SolidHandle) -> Result<usize, KernelError> {
        Ok(self.get(solid)?.faces.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pocket_tool(kernel: &mut MockKernel) -> SolidHandle {
        let z = 10.5;
        let profile = Profile::polygon(&[[3.0, 3.0, z], [7.0, 3.0, z], [7.0, 7.0, z], [3.0, 7.0, z]]);
        kernel.extrude_profile(&profile, [0.0, 0.0, -1.0], 4.5).unwrap()
    }

    #[test]
    fn test_box_topology() {
        let mut kernel = MockKernel::new();
        let h = kernel.make_box([0.0; 3], [10.0, 20.0, 30.0]).unwrap();
        let fps = kernel.face_fingerprints(&h).unwrap();
        assert_eq!(fps.len(), 6);
        let total: f64 = fps.iter().map(|f| f.area).sum();
        assert!((total - 2.0 * (200.0 + 300.0 + 600.0)).abs() < 1e-6);
        let edges = kernel.edges(&h).unwrap();
        assert_eq!(edges.len(), 12);
        assert!(edges.iter().all(|e| e.faces.len() == 2));
    }

    #[test]
    fn test_box_normals_point_outward() {
        let mut kernel = MockKernel::new();
        let h = kernel.make_box([0.0; 3], [10.0, 10.0, 10.0]).unwrap();
        for fp in kernel.face_fingerprints(&h).unwrap() {
            let (n, d) = fp.plane().unwrap();
            assert!(dot(n, [5.0, 5.0, 5.0]) < d);
            assert!(dot(n, fp.normal) > 0.999);
        }
    }

    #[test]
    fn test_subtract_pocket_adds_walls_and_floor() {
        let mut kernel = MockKernel::new();
        let stock = kernel.make_box([0.0; 3], [10.0, 10.0, 10.0]).unwrap();
        let tool = pocket_tool(&mut kernel);
        let result = kernel.boolean_subtract(&stock, &tool).unwrap();
        let fps = kernel.face_fingerprints(&result).unwrap();
        assert_eq!(fps.len(), 11);
        let floor = fps
            .iter()
            .find(|f| matches!(f.plane(), Some((n, d)) if n[2] > 0.99 && (d - 6.0).abs() < 1e-9))
            .expect("floor at z = 6");
        assert!((floor.area - 16.0).abs() < 1.0);
    }

    #[test]
    fn test_through_cut_splits_face() {
        let mut kernel = MockKernel::new();
        let stock = kernel.make_box([0.0; 3], [10.0, 10.0, 10.0]).unwrap();
        // slab across the whole part at x in [4, 6], from above
        let profile = Profile::polygon(&[
            [4.0, -1.0, 11.0],
            [6.0, -1.0, 11.0],
            [6.0, 11.0, 11.0],
            [4.0, 11.0, 11.0],
        ]);
        let tool = kernel.extrude_profile(&profile, [0.0, 0.0, -1.0], 5.0).unwrap();
        let result = kernel.boolean_subtract(&stock, &tool).unwrap();
        let fps = kernel.face_fingerprints(&result).unwrap();
        let tops = fps
            .iter()
            .filter(|f| matches!(f.plane(), Some((n, d)) if n[2] > 0.99 && (d - 10.0).abs() < 1e-9))
            .count();
        assert_eq!(tops, 2, "the top face is split in two");
    }

    #[test]
    fn test_subtract_everything_fails() {
        let mut kernel = MockKernel::new();
        let stock = kernel.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        let profile = Profile::polygon(&[
            [-1.0, -1.0, 2.0],
            [2.0, -1.0, 2.0],
            [2.0, 2.0, 2.0],
            [-1.0, 2.0, 2.0],
        ]);
        let tool = kernel.extrude_profile(&profile, [0.0, 0.0, -1.0], 3.0).unwrap();
        assert!(matches!(
            kernel.boolean_subtract(&stock, &tool),
            Err(KernelError::BooleanFailed { .. })
        ));
    }

    #[test]
    fn test_transform_rotates_planes() {
        let mut kernel = MockKernel::new();
        let h = kernel.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        let placement = RigidTransform {
            center: [0.0; 3],
            axis: [0.0, 1.0, 0.0],
            angle: std::f64::consts::PI,
            translation: [0.0, 0.0, 5.0],
        };
        let moved = kernel.transform(&h, &placement).unwrap();
        for fp in kernel.face_fingerprints(&moved).unwrap() {
            let (n, d) = fp.plane().unwrap();
            assert!((dot(n, fp.anchor) - d).abs() < 1e-9);
            assert!(fp.bbox.min[2] > 3.9 - 1e-9);
        }
    }

    #[test]
    fn test_export_names_every_face() {
        let mut kernel = MockKernel::new();
        let h = kernel.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        let names: Vec<String> = (0..6).map(|i| format!("{}", 24 - i)).collect();
        let text = kernel.export_step(&h, &names).unwrap();
        assert_eq!(step::read_face_names(&text).unwrap(), names);
        assert!(kernel.export_step(&h, &names[..3]).is_err());
    }
}
