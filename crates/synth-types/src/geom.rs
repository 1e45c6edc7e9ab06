use serde::{Deserialize, Serialize};

/// Tolerance used for coplanarity and axis-alignment checks.
pub const GEOM_EPS: f64 = 1e-6;

pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

pub fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    norm(sub(a, b))
}

/// Unit vector along `a`. Returns `a` unchanged when it has zero length.
pub fn normalize(a: [f64; 3]) -> [f64; 3] {
    let n = norm(a);
    if n < 1e-12 {
        a
    } else {
        scale(a, 1.0 / n)
    }
}

pub fn neg(a: [f64; 3]) -> [f64; 3] {
    [-a[0], -a[1], -a[2]]
}

/// `origin + u * a + v * b`
pub fn plane_point(origin: [f64; 3], a: [f64; 3], u: f64, b: [f64; 3], v: f64) -> [f64; 3] {
    add(origin, add(scale(a, u), scale(b, v)))
}

/// If `n` is aligned with a coordinate axis, returns `(axis index, sign)`.
pub fn axis_of(n: [f64; 3]) -> Option<(usize, f64)> {
    let n = normalize(n);
    (0..3).find_map(|i| {
        if (n[i].abs() - 1.0).abs() < 1e-6 {
            Some((i, n[i].signum()))
        } else {
            None
        }
    })
}

pub fn unit_axis(axis: usize, sign: f64) -> [f64; 3] {
    let mut v = [0.0; 3];
    v[axis] = sign;
    v
}

/// Rotate `p` about the line through `center` along unit `axis` by `angle` radians.
pub fn rotate_about(p: [f64; 3], center: [f64; 3], axis: [f64; 3], angle: f64) -> [f64; 3] {
    let k = normalize(axis);
    let v = sub(p, center);
    let (s, c) = angle.sin_cos();
    // Rodrigues
    let rotated = add(
        add(scale(v, c), scale(cross(k, v), s)),
        scale(k, dot(k, v) * (1.0 - c)),
    );
    add(center, rotated)
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// An inverted box that any `include` call replaces.
    pub fn empty() -> Self {
        Self {
            min: [f64::MAX; 3],
            max: [f64::MIN; 3],
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f64; 3]>) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.include(*p);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn include(&mut self, p: [f64; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut b = *self;
        b.include(other.min);
        b.include(other.max);
        b
    }

    pub fn expanded(&self, margin: f64) -> Aabb {
        Aabb {
            min: [self.min[0] - margin, self.min[1] - margin, self.min[2] - margin],
            max: [self.max[0] + margin, self.max[1] + margin, self.max[2] + margin],
        }
    }

    /// Common part of two boxes; empty when they are disjoint.
    pub fn intersection(&self, other: &Aabb) -> Aabb {
        let mut b = Aabb::empty();
        for i in 0..3 {
            b.min[i] = self.min[i].max(other.min[i]);
            b.max[i] = self.max[i].min(other.max[i]);
        }
        b
    }

    pub fn size(&self) -> [f64; 3] {
        sub(self.max, self.min)
    }

    pub fn center(&self) -> [f64; 3] {
        scale(add(self.min, self.max), 0.5)
    }

    pub fn contains(&self, p: [f64; 3], tol: f64) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - tol && p[i] <= self.max[i] + tol)
    }

    /// True when the interiors overlap by more than `tol` on every axis.
    /// Boxes that only touch along a face do not overlap.
    pub fn overlaps(&self, other: &Aabb, tol: f64) -> bool {
        (0..3).all(|i| self.min[i] < other.max[i] - tol && other.min[i] < self.max[i] - tol)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Aabb::new([0.0; 3], [1.0; 3]);
        let b = Aabb::new([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        assert!(!a.overlaps(&b, 1e-9));
        let c = Aabb::new([0.5, 0.5, 0.5], [2.0, 2.0, 2.0]);
        assert!(a.overlaps(&c, 1e-9));
    }

    #[test]
    fn axis_detection() {
        assert_eq!(axis_of([0.0, 0.0, -2.0]), Some((2, -1.0)));
        assert_eq!(axis_of([1.0, 1.0, 0.0]), None);
    }

    #[test]
    fn rotate_quarter_turn_about_z() {
        let p = rotate_about([1.0, 0.0, 0.0], [0.0; 3], [0.0, 0.0, 1.0], std::f64::consts::FRAC_PI_2);
        assert!(distance(p, [0.0, 1.0, 0.0]) < 1e-12);
    }
}
