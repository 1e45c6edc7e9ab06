//! Face provenance across one cut.
//!
//! Each face of the result is classified as swept by the tool, surviving
//! from a face of the previous solid, or unmatched. Matching is purely
//! geometric so it works the same for every kernel.

use crate::tool::RemovalTool;
use crate::types::{Support, SurfaceRole, ToolSurface};
use synth_types::*;

/// Where a face of the cut result came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaceOrigin {
    /// Lies on a surface of the removal tool.
    Tool {
        surface: usize,
        role: SurfaceRole,
        bottom: bool,
    },
    /// Part of face `before` of the previous solid.
    Survivor { before: usize },
    Unmatched,
}

impl FaceOrigin {
    pub fn is_tool(&self) -> bool {
        matches!(self, FaceOrigin::Tool { .. })
    }
}

/// True when the face lies on the tool surface.
pub fn on_tool_surface(fp: &FaceFingerprint, surface: &ToolSurface, tol: f64) -> bool {
    if !surface.extent.contains(fp.anchor, tol) {
        return false;
    }
    match surface.support {
        Support::Plane { normal, offset } => match fp.plane() {
            Some((n, d)) => dot(n, normal) > 1.0 - 1e-6 && (d - offset).abs() < tol,
            None => false,
        },
        Support::Cylinder {
            center,
            axis,
            radius,
        } => {
            if fp.is_planar() {
                return false;
            }
            let v = sub(fp.anchor, center);
            let radial = norm(sub(v, scale(axis, dot(v, axis))));
            (radial - radius).abs() < tol
        }
    }
}

fn survivor_of(fp: &FaceFingerprint, before: &[FaceFingerprint], tol: f64) -> Option<usize> {
    before
        .iter()
        .enumerate()
        .filter(|(_, b)| {
            let same_support = match (fp.is_planar(), b.is_planar()) {
                (true, true) => fp.coplanar_with(b, tol),
                (false, false) => true,
                _ => false,
            };
            same_support && b.bbox.contains(fp.anchor, tol)
        })
        .min_by(|(_, a), (_, b)| {
            distance(a.centroid, fp.centroid)
                .partial_cmp(&distance(b.centroid, fp.centroid))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}

/// Classify every face of `after`. Tool surfaces take precedence.
pub fn classify(
    before: &[FaceFingerprint],
    after: &[FaceFingerprint],
    tool: &RemovalTool,
    tol: f64,
) -> Vec<FaceOrigin> {
    let surfaces = tool.surfaces();
    after
        .iter()
        .map(|fp| {
            if let Some((i, s)) = surfaces
                .iter()
                .enumerate()
                .find(|(_, s)| on_tool_surface(fp, s, tol))
            {
                return FaceOrigin::Tool {
                    surface: i,
                    role: s.role,
                    bottom: tool.bottom.is_bottom(s.role),
                };
            }
            match survivor_of(fp, before, tol) {
                Some(before) => FaceOrigin::Survivor { before },
                None => FaceOrigin::Unmatched,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BottomRule;

    fn planar(normal: [f64; 3], min: [f64; 3], max: [f64; 3]) -> FaceFingerprint {
        let bbox = Aabb::new(min, max);
        let anchor = bbox.center();
        FaceFingerprint {
            surface: SurfaceKind::Planar {
                normal,
                offset: dot(normal, anchor),
            },
            centroid: anchor,
            normal,
            area: 1.0,
            bbox,
            anchor,
            anchor_normal: normal,
        }
    }

    #[test]
    fn floor_is_bottom_and_top_survives() {
        let z = 10.5;
        let profile = Profile::polygon(&[[3.0, 3.0, z], [7.0, 3.0, z], [7.0, 7.0, z], [3.0, 7.0, z]]);
        let tool = RemovalTool::new(profile, [0.0, 0.0, -1.0], 4.5)
            .with_entry_offset(0.5)
            .with_bottom(BottomRule::FarCap);
        let before = vec![planar([0.0, 0.0, 1.0], [0.0, 0.0, 10.0], [10.0, 10.0, 10.0])];
        let mut ring = planar([0.0, 0.0, 1.0], [0.0, 0.0, 10.0], [10.0, 10.0, 10.0]);
        ring.anchor = [1.0, 1.0, 10.0];
        let after = vec![
            ring,
            planar([0.0, 0.0, 1.0], [3.0, 3.0, 6.0], [7.0, 7.0, 6.0]),
            planar([1.0, 0.0, 0.0], [3.0, 3.0, 6.0], [3.0, 7.0, 10.0]),
            planar([0.0, 1.0, 0.0], [20.0, 0.0, 0.0], [30.0, 0.0, 5.0]),
        ];
        let origins = classify(&before, &after, &tool, 1e-3);
        assert_eq!(origins[0], FaceOrigin::Survivor { before: 0 });
        assert!(matches!(
            origins[1],
            FaceOrigin::Tool {
                role: SurfaceRole::Floor,
                bottom: true,
                ..
            }
        ));
        assert!(matches!(
            origins[2],
            FaceOrigin::Tool {
                role: SurfaceRole::Wall { .. },
                bottom: false,
                ..
            }
        ));
        assert_eq!(origins[3], FaceOrigin::Unmatched);
    }
}
