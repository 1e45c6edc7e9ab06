//! Profile generators: turn a host (bound or edge) into a removal tool.
//!
//! Profiles are drawn `margin` outside the host surface and swept into the
//! part, so the kernel never sees a tool face coplanar with a part face.

pub mod inner;
pub mod slot;
pub mod step;
pub mod transition;

pub use inner::{sketch_inner, InnerShape};
pub use slot::{sketch_slot, SlotShape};
pub use step::{sketch_step, StepShape};
pub use transition::{sketch_chamfer, sketch_round};

use crate::bound::{extent_below, Bound, BoundFrame};
use crate::tool::RemovalTool;
use crate::types::{BottomRule, FeatureParams, SketchError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use synth_types::*;

/// Size and clearance rules shared by every generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchParams {
    /// Minimum distance between a profile and the bound rectangle's sides.
    pub clearance: f64,
    /// Smallest feature dimension drawn.
    pub min_len: f64,
    /// Tool overshoot past host and exit faces.
    pub margin: f64,
    /// Blind depths stay below this fraction of the material under the host.
    pub blind_depth_fraction: f64,
}

impl Default for SketchParams {
    fn default() -> Self {
        Self {
            clearance: 2.0,
            min_len: 2.0,
            margin: 0.5,
            blind_depth_fraction: 0.6,
        }
    }
}

/// What a generator needs besides the host.
#[derive(Debug, Clone, Copy)]
pub struct SketchContext<'a> {
    pub params: &'a SketchParams,
    pub stock: Aabb,
    /// Depth below the host at which through tools stop, instead of the
    /// full stock extent.
    pub through_depth: Option<f64>,
}

/// A generated tool with the parameters it was drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct Sketch {
    pub tool: RemovalTool,
    pub params: FeatureParams,
}

/// Uniform draw in `[lo, hi]`; fails when the range is empty.
pub(crate) fn draw<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> Result<f64, SketchError> {
    if hi < lo {
        return Err(SketchError::DoesNotFit { size: lo, limit: hi });
    }
    if hi - lo < 1e-12 {
        return Ok(lo);
    }
    Ok(rng.gen_range(lo..=hi))
}

/// Largest profile size the bound accepts: `min(w, h) / 2 - clearance`.
pub fn size_limit(frame: &BoundFrame, params: &SketchParams) -> Result<f64, SketchError> {
    let c = params.clearance;
    if frame.w <= 2.0 * c || frame.h <= 2.0 * c {
        return Err(SketchError::BoundTooSmall {
            width: frame.w,
            height: frame.h,
            clearance: c,
        });
    }
    Ok(0.5 * frame.w.min(frame.h) - c)
}

/// Tool depth for the depth class of a face-hosted feature.
pub(crate) fn face_tool<R: Rng + ?Sized>(
    profile: Profile,
    bound: &Bound,
    ctx: &SketchContext<'_>,
    through: bool,
    bottom: BottomRule,
    rng: &mut R,
) -> Result<RemovalTool, SketchError> {
    let m = ctx.params.margin;
    let extent = extent_below(bound, &ctx.stock);
    let depth = if through {
        ctx.through_depth.unwrap_or(extent + m)
    } else {
        let p = ctx.params;
        let hi = (extent * p.blind_depth_fraction).min(extent - p.clearance);
        draw(rng, p.min_len, hi)?
    };
    let bottom = if through { BottomRule::None } else { bottom };
    Ok(RemovalTool::new(profile, neg(bound.normal), m + depth)
        .with_entry_offset(m)
        .with_bottom(bottom))
}

/// Draws 2D frame coordinates onto a lifted bound plane.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pen {
    frame: BoundFrame,
    lift: f64,
}

fn signed_area(pts: &[[f64; 2]]) -> f64 {
    let n = pts.len();
    (0..n)
        .map(|i| {
            let (a, b) = (pts[i], pts[(i + 1) % n]);
            a[0] * b[1] - b[0] * a[1]
        })
        .sum::<f64>()
        * 0.5
}

impl Pen {
    pub(crate) fn new(frame: BoundFrame, lift: f64) -> Self {
        Self { frame, lift }
    }

    pub(crate) fn p(&self, q: [f64; 2]) -> [f64; 3] {
        self.frame.at(q[0], q[1], self.lift)
    }

    pub(crate) fn line(&self, a: [f64; 2], b: [f64; 2]) -> Segment {
        Segment::line(self.p(a), self.p(b))
    }

    pub(crate) fn arc(&self, a: [f64; 2], mid: [f64; 2], b: [f64; 2]) -> Segment {
        Segment::arc(self.p(a), self.p(mid), self.p(b))
    }

    /// Counter-clockwise polygon in frame coordinates.
    pub(crate) fn polygon(&self, pts: &[[f64; 2]]) -> Profile {
        let mut pts = pts.to_vec();
        if signed_area(&pts) < 0.0 {
            pts.reverse();
        }
        let world: Vec<[f64; 3]> = pts.iter().map(|&q| self.p(q)).collect();
        Profile::polygon(&world)
    }

    /// Counter-clockwise circle as two half arcs.
    pub(crate) fn circle(&self, c: [f64; 2], r: f64) -> Vec<Segment> {
        let east = [c[0] + r, c[1]];
        let west = [c[0] - r, c[1]];
        vec![
            self.arc(east, [c[0], c[1] + r], west),
            self.arc(west, [c[0], c[1] - r], east),
        ]
    }
}
