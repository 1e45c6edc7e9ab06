use serde::{Deserialize, Serialize};

use crate::geom::*;

/// One boundary segment of a planar profile, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Segment {
    Line { start: [f64; 3], end: [f64; 3] },
    /// Circular arc from `start` to `end` passing through `mid`. Sweep below 2π.
    Arc {
        start: [f64; 3],
        mid: [f64; 3],
        end: [f64; 3],
    },
}

/// Circle through an arc's three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: [f64; 3],
    pub radius: f64,
    /// Rotation axis taking `start` towards `end` through `mid`.
    pub axis: [f64; 3],
    /// Unit vector from the center to `start`.
    pub e1: [f64; 3],
    /// `axis × e1`.
    pub e2: [f64; 3],
    /// Swept angle in radians, in `(0, 2π)`.
    pub sweep: f64,
}

impl ArcGeometry {
    pub fn point_at(&self, t: f64) -> [f64; 3] {
        let (s, c) = t.sin_cos();
        add(self.center, add(scale(self.e1, self.radius * c), scale(self.e2, self.radius * s)))
    }
}

impl Segment {
    pub fn line(start: [f64; 3], end: [f64; 3]) -> Self {
        Segment::Line { start, end }
    }

    pub fn arc(start: [f64; 3], mid: [f64; 3], end: [f64; 3]) -> Self {
        Segment::Arc { start, mid, end }
    }

    pub fn start(&self) -> [f64; 3] {
        match *self {
            Segment::Line { start, .. } | Segment::Arc { start, .. } => start,
        }
    }

    pub fn end(&self) -> [f64; 3] {
        match *self {
            Segment::Line { end, .. } | Segment::Arc { end, .. } => end,
        }
    }

    pub fn reversed(&self) -> Segment {
        match *self {
            Segment::Line { start, end } => Segment::Line { start: end, end: start },
            Segment::Arc { start, mid, end } => Segment::Arc {
                start: end,
                mid,
                end: start,
            },
        }
    }

    /// Circle data for arcs; `None` for lines and collinear arcs.
    pub fn arc_geometry(&self) -> Option<ArcGeometry> {
        let Segment::Arc { start, mid, end } = *self else {
            return None;
        };
        let a = sub(start, end);
        let b = sub(mid, end);
        let axb = cross(a, b);
        let denom = 2.0 * dot(axb, axb);
        if denom < 1e-18 {
            return None;
        }
        let num = cross(sub(scale(b, dot(a, a)), scale(a, dot(b, b))), axb);
        let center = add(end, scale(num, 1.0 / denom));
        let radius = distance(center, start);
        let axis = normalize(cross(sub(start, center), sub(mid, center)));
        let e1 = normalize(sub(start, center));
        let e2 = cross(axis, e1);
        let to_end = sub(end, center);
        let mut sweep = dot(to_end, e2).atan2(dot(to_end, e1));
        if sweep <= 1e-12 {
            sweep += std::f64::consts::TAU;
        }
        Some(ArcGeometry {
            center,
            radius,
            axis,
            e1,
            e2,
            sweep,
        })
    }

    /// Points along the segment, `start` included, `end` excluded.
    pub fn polyline(&self, arc_steps: usize) -> Vec<[f64; 3]> {
        match self.arc_geometry() {
            Some(arc) => {
                let n = arc_steps.max(2);
                (0..n)
                    .map(|i| arc.point_at(arc.sweep * i as f64 / n as f64))
                    .collect()
            }
            None => vec![self.start()],
        }
    }
}

/// Closed planar profile: one outer loop and optional inner loops.
///
/// Inner loops run opposite to the outer loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub outer: Vec<Segment>,
    #[serde(default)]
    pub holes: Vec<Vec<Segment>>,
}

impl Profile {
    pub fn new(outer: Vec<Segment>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Closed polygon through `points`, in order.
    pub fn polygon(points: &[[f64; 3]]) -> Self {
        let n = points.len();
        let outer = (0..n)
            .map(|i| Segment::line(points[i], points[(i + 1) % n]))
            .collect();
        Self::new(outer)
    }

    pub fn with_hole(mut self, hole: Vec<Segment>) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn loops(&self) -> impl Iterator<Item = &Vec<Segment>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Every loop has at least two segments and closes on itself.
    pub fn is_closed(&self, tol: f64) -> bool {
        self.loops().all(|lp| {
            lp.len() >= 2
                && lp
                    .iter()
                    .zip(lp.iter().cycle().skip(1))
                    .all(|(a, b)| distance(a.end(), b.start()) < tol)
        })
    }

    /// Unit normal of the profile plane, oriented by the outer loop's winding.
    pub fn plane_normal(&self) -> Option<[f64; 3]> {
        let pts: Vec<[f64; 3]> = self.outer.iter().flat_map(|s| s.polyline(8)).collect();
        if pts.len() < 3 {
            return None;
        }
        // Newell's method
        let mut n = [0.0; 3];
        for i in 0..pts.len() {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            n[0] += (a[1] - b[1]) * (a[2] + b[2]);
            n[1] += (a[2] - b[2]) * (a[0] + b[0]);
            n[2] += (a[0] - b[0]) * (a[1] + b[1]);
        }
        if norm(n) < 1e-12 {
            None
        } else {
            Some(normalize(n))
        }
    }

    pub fn outer_polyline(&self, arc_steps: usize) -> Vec<[f64; 3]> {
        self.outer.iter().flat_map(|s| s.polyline(arc_steps)).collect()
    }

    pub fn bbox(&self, arc_steps: usize) -> Aabb {
        let pts: Vec<[f64; 3]> = self
            .loops()
            .flat_map(|lp| lp.iter().flat_map(|s| s.polyline(arc_steps)))
            .collect();
        Aabb::from_points(pts.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn arc_geometry_of_half_circle() {
        let seg = Segment::arc([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]);
        let arc = seg.arc_geometry().unwrap();
        assert!(distance(arc.center, [0.0; 3]) < 1e-12);
        assert!((arc.radius - 1.0).abs() < 1e-12);
        assert!((arc.sweep - PI).abs() < 1e-9);
        assert!(distance(arc.point_at(arc.sweep), [-1.0, 0.0, 0.0]) < 1e-9);
    }

    #[test]
    fn polygon_profile_is_closed_and_oriented() {
        let p = Profile::polygon(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]);
        assert!(p.is_closed(1e-9));
        let n = p.plane_normal().unwrap();
        assert!(distance(n, [0.0, 0.0, 1.0]) < 1e-12);
    }
}
