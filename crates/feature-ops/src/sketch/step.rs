//! Steps cut at a corner of a stock face where two open sides meet.

use super::{draw, face_tool, size_limit, Pen, Sketch, SketchContext};
use crate::bound::Bound;
use crate::types::{BottomRule, FeatureParams, SketchError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::f64::consts::FRAC_1_SQRT_2;
use synth_types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepShape {
    Rectangle,
    /// Two stacked rectangles.
    Staircase,
    /// Right triangle; the hypotenuse becomes a slanted wall.
    Slanted,
    QuarterDisc,
}

pub fn step_shape(kind: FeatureKind) -> Option<StepShape> {
    use FeatureKind::*;
    Some(match kind {
        RectangularThroughStep | RectangularBlindStep => StepShape::Rectangle,
        TwoSidesThroughStep => StepShape::Staircase,
        SlantedThroughStep | TriangularBlindStep => StepShape::Slanted,
        CircularBlindStep => StepShape::QuarterDisc,
        _ => return None,
    })
}

/// Draw a step at a corner of `bound` whose two sides are both open.
pub fn sketch_step<R: Rng + ?Sized>(
    kind: FeatureKind,
    shape: StepShape,
    bound: &Bound,
    ctx: &SketchContext<'_>,
    rng: &mut R,
) -> Result<Sketch, SketchError> {
    if !bound.on_stock_boundary {
        return Err(SketchError::NoOpenSide);
    }
    // rotated(s) puts side s at b = 0 and side s + 3 at a = 0
    let corners: Vec<usize> = (0..4)
        .filter(|&s| bound.open_sides[s] && bound.open_sides[(s + 3) % 4])
        .collect();
    let side = *corners.choose(rng).ok_or(SketchError::NoOpenSide)?;
    let frame = bound.frame().rotated(side);
    let p = ctx.params;
    let m = p.margin;
    let limit = size_limit(&frame, p)?;
    let sa = draw(rng, p.min_len, limit)?;
    let sb = draw(rng, p.min_len, limit)?;
    let pen = Pen::new(frame, m);

    let profile = match shape {
        StepShape::Rectangle => pen.polygon(&[[-m, -m], [sa, -m], [sa, sb], [-m, sb]]),
        StepShape::Staircase => {
            let sa2 = sa * rng.gen_range(0.35..=0.65);
            let sb1 = sb * rng.gen_range(0.35..=0.65);
            pen.polygon(&[
                [-m, -m],
                [sa, -m],
                [sa, sb1],
                [sa2, sb1],
                [sa2, sb],
                [-m, sb],
            ])
        }
        StepShape::Slanted => pen.polygon(&[
            [-m, -m],
            [sa * (1.0 + m / sb), -m],
            [-m, sb * (1.0 + m / sa)],
        ]),
        StepShape::QuarterDisc => {
            let r = sa;
            let d = r * FRAC_1_SQRT_2;
            Profile::new(vec![
                pen.line([-m, -m], [r, -m]),
                pen.line([r, -m], [r, 0.0]),
                pen.arc([r, 0.0], [d, d], [0.0, r]),
                pen.line([0.0, r], [-m, r]),
                pen.line([-m, r], [-m, -m]),
            ])
        }
    };

    let through = kind.depth() == DepthKind::Through;
    let tool = face_tool(profile, bound, ctx, through, BottomRule::FarCap, rng)?;
    Ok(Sketch {
        params: FeatureParams {
            kind,
            anchor: frame.at(0.0, 0.0, 0.0),
            size: sa.max(sb),
            depth: tool.depth(),
            axis: bound.normal,
            fastener: None,
        },
        tool,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::derive_bounds;
    use crate::sketch::SketchParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stock_top(stock: &Aabb) -> Bound {
        let bbox = Aabb::new([stock.min[0], stock.min[1], stock.max[2]], stock.max);
        let anchor = bbox.center();
        let fp = FaceFingerprint {
            surface: SurfaceKind::Planar {
                normal: [0.0, 0.0, 1.0],
                offset: anchor[2],
            },
            centroid: anchor,
            normal: [0.0, 0.0, 1.0],
            area: 1.0,
            bbox,
            anchor,
            anchor_normal: [0.0, 0.0, 1.0],
        };
        derive_bounds(&[fp], stock, 1.0).remove(0)
    }

    #[test]
    fn steps_sit_on_a_stock_corner() {
        let stock = Aabb::new([0.0; 3], [70.0, 50.0, 40.0]);
        let bound = stock_top(&stock);
        let params = SketchParams::default();
        let ctx = SketchContext {
            params: &params,
            stock,
            through_depth: None,
        };
        let mut rng = StdRng::seed_from_u64(4);
        for kind in [
            FeatureKind::RectangularThroughStep,
            FeatureKind::TwoSidesThroughStep,
            FeatureKind::SlantedThroughStep,
            FeatureKind::TriangularBlindStep,
            FeatureKind::CircularBlindStep,
            FeatureKind::RectangularBlindStep,
        ] {
            let sketch = sketch_step(kind, step_shape(kind).unwrap(), &bound, &ctx, &mut rng).unwrap();
            let a = sketch.params.anchor;
            let on_corner = (a[0] == 0.0 || a[0] == 70.0) && (a[1] == 0.0 || a[1] == 50.0);
            assert!(on_corner, "{kind} anchored at {a:?}");
            let b = sketch.tool.bbox();
            let through = kind.depth() == DepthKind::Through;
            assert_eq!(b.min[2] < 0.0, through, "{kind}");
        }
    }

    #[test]
    fn floors_need_two_open_sides() {
        let stock = Aabb::new([0.0; 3], [70.0, 50.0, 40.0]);
        let mut bound = stock_top(&stock);
        bound.open_sides = [true, false, true, false];
        let params = SketchParams::default();
        let ctx = SketchContext {
            params: &params,
            stock,
            through_depth: None,
        };
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(
            sketch_step(FeatureKind::RectangularBlindStep, StepShape::Rectangle, &bound, &ctx, &mut rng),
            Err(SketchError::NoOpenSide)
        );
    }
}
