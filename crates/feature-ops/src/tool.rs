//! Removal tools: profiles swept into prisms, with their analytic surfaces.

use crate::types::{BottomRule, Support, SurfaceRole, ToolSurface};
use serde::{Deserialize, Serialize};
use synth_types::*;

const ARC_STEPS: usize = 32;

/// A profile swept along `direction` by `length`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalTool {
    pub profile: Profile,
    /// Unit sweep direction.
    pub direction: [f64; 3],
    pub length: f64,
    /// Distance from the profile plane to the host surface. The part of the
    /// prism before it lies outside the material.
    pub entry_offset: f64,
    pub bottom: BottomRule,
}

impl RemovalTool {
    pub fn new(profile: Profile, direction: [f64; 3], length: f64) -> Self {
        Self {
            profile,
            direction: normalize(direction),
            length,
            entry_offset: 0.0,
            bottom: BottomRule::None,
        }
    }

    pub fn with_entry_offset(mut self, offset: f64) -> Self {
        self.entry_offset = offset;
        self
    }

    pub fn with_bottom(mut self, bottom: BottomRule) -> Self {
        self.bottom = bottom;
        self
    }

    fn swept_box(&self, from: f64, to: f64) -> Aabb {
        let base = self.profile.bbox(ARC_STEPS);
        let a = Aabb::new(
            add(base.min, scale(self.direction, from)),
            add(base.max, scale(self.direction, from)),
        );
        let b = Aabb::new(
            add(base.min, scale(self.direction, to)),
            add(base.max, scale(self.direction, to)),
        );
        a.union(&b)
    }

    /// Box of the whole prism.
    pub fn bbox(&self) -> Aabb {
        self.swept_box(0.0, self.length)
    }

    /// Box of the volume this tool removes from the stock: the prism past the
    /// host surface, clipped to the stock box. Empty when nothing is removed.
    pub fn material_box(&self, stock: &Aabb) -> Aabb {
        self.swept_box(self.entry_offset, self.length)
            .intersection(stock)
    }

    /// Depth removed below the host surface.
    pub fn depth(&self) -> f64 {
        self.length - self.entry_offset
    }

    /// Analytic surfaces of the prism, oriented as faces of the cut part.
    pub fn surfaces(&self) -> Vec<ToolSurface> {
        let d = self.direction;
        let Some(pn) = self.profile.plane_normal() else {
            return Vec::new();
        };
        let sweep = scale(d, self.length);
        let cap = self.profile.bbox(ARC_STEPS);
        let p0 = self.profile.outer[0].start();
        let mut surfaces = vec![
            ToolSurface {
                support: Support::Plane {
                    normal: d,
                    offset: dot(d, p0),
                },
                extent: cap,
                role: SurfaceRole::Entry,
            },
            ToolSurface {
                support: Support::Plane {
                    normal: neg(d),
                    offset: -dot(d, add(p0, sweep)),
                },
                extent: Aabb::new(add(cap.min, sweep), add(cap.max, sweep)),
                role: SurfaceRole::Floor,
            },
        ];
        for (loop_index, lp) in self.profile.loops().enumerate() {
            for (segment, seg) in lp.iter().enumerate() {
                let pts = seg
                    .polyline(ARC_STEPS)
                    .into_iter()
                    .chain(std::iter::once(seg.end()))
                    .collect::<Vec<_>>();
                let mut extent = Aabb::from_points(pts.iter());
                extent = extent.union(&Aabb::new(add(extent.min, sweep), add(extent.max, sweep)));
                let support = match seg.arc_geometry() {
                    Some(arc) => Support::Cylinder {
                        center: arc.center,
                        axis: d,
                        radius: arc.radius,
                    },
                    None => {
                        // outward from the tool for a loop wound about pn
                        let out = normalize(cross(sub(seg.end(), seg.start()), pn));
                        let normal = neg(out);
                        Support::Plane {
                            normal,
                            offset: dot(normal, seg.start()),
                        }
                    }
                };
                surfaces.push(ToolSurface {
                    support,
                    extent,
                    role: SurfaceRole::Wall {
                        loop_index,
                        segment,
                    },
                });
            }
        }
        surfaces
    }
}
