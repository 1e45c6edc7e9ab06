//! Chamfer and round tools swept along a convex edge.
//!
//! Profiles live in the plane across the edge, in coordinates `(x, y)`
//! along the two face normals. The material occupies `x <= 0, y <= 0`.

use super::{draw, Sketch, SketchContext};
use crate::edges::EdgeCandidate;
use crate::tool::RemovalTool;
use crate::types::{FeatureParams, SketchError};
use rand::Rng;
use std::f64::consts::FRAC_1_SQRT_2;
use synth_types::*;

struct EdgeFrame {
    origin: [f64; 3],
    n1: [f64; 3],
    n2: [f64; 3],
}

impl EdgeFrame {
    fn p(&self, x: f64, y: f64) -> [f64; 3] {
        plane_point(self.origin, self.n1, x, self.n2, y)
    }
}

fn transition_size<R: Rng + ?Sized>(
    edge: &EdgeCandidate,
    ctx: &SketchContext<'_>,
    rng: &mut R,
) -> Result<f64, SketchError> {
    let p = ctx.params;
    draw(rng, p.min_len, edge.limit - p.clearance)
}

fn sweep(edge: &EdgeCandidate, ctx: &SketchContext<'_>, kind: FeatureKind, size: f64, profile: impl FnOnce(&EdgeFrame) -> Profile) -> Sketch {
    let m = ctx.params.margin;
    let t = edge.direction();
    let frame = EdgeFrame {
        origin: sub(edge.start, scale(t, m)),
        n1: edge.n1,
        n2: edge.n2,
    };
    let tool = RemovalTool::new(profile(&frame), t, edge.length() + 2.0 * m);
    Sketch {
        params: FeatureParams {
            kind,
            anchor: edge.midpoint(),
            size,
            depth: size,
            axis: t,
            fastener: None,
        },
        tool,
    }
}

/// Triangular prism that bevels the edge at distance `d` on both faces.
pub fn sketch_chamfer<R: Rng + ?Sized>(
    edge: &EdgeCandidate,
    ctx: &SketchContext<'_>,
    rng: &mut R,
) -> Result<Sketch, SketchError> {
    let d = transition_size(edge, ctx, rng)?;
    let m = ctx.params.margin;
    Ok(sweep(edge, ctx, FeatureKind::Chamfer, d, |f| {
        Profile::polygon(&[f.p(m, m), f.p(m, -(d + m)), f.p(-(d + m), m)])
    }))
}

/// Corner region minus a quarter disc of radius `r`, leaving a fillet.
pub fn sketch_round<R: Rng + ?Sized>(
    edge: &EdgeCandidate,
    ctx: &SketchContext<'_>,
    rng: &mut R,
) -> Result<Sketch, SketchError> {
    let r = transition_size(edge, ctx, rng)?;
    let m = ctx.params.margin;
    let c = -r + r * FRAC_1_SQRT_2;
    Ok(sweep(edge, ctx, FeatureKind::Round, r, |f| {
        Profile::new(vec![
            Segment::line(f.p(m, -r), f.p(m, m)),
            Segment::line(f.p(m, m), f.p(-r, m)),
            Segment::line(f.p(-r, m), f.p(-r, 0.0)),
            Segment::arc(f.p(-r, 0.0), f.p(c, c), f.p(0.0, -r)),
            Segment::line(f.p(0.0, -r), f.p(m, -r)),
        ])
    }))
}
