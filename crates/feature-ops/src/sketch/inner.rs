//! Closed profiles placed inside a bound: holes, passages, pockets, O-rings.

use super::{draw, face_tool, size_limit, Pen, Sketch, SketchContext};
use crate::bound::Bound;
use crate::types::{BottomRule, FeatureParams, SketchError};
use rand::Rng;
use std::f64::consts::{FRAC_PI_3, FRAC_PI_6, TAU};
use synth_types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InnerShape {
    Circle,
    Triangle,
    Rectangle,
    Hexagon,
    /// Two half discs joined by straight sides.
    Obround,
    /// Ring between two concentric circles.
    Annulus,
}

fn regular_polygon(c: [f64; 2], r: f64, sides: usize, phase: f64) -> Vec<[f64; 2]> {
    (0..sides)
        .map(|k| {
            let t = phase + TAU * k as f64 / sides as f64;
            [c[0] + r * t.cos(), c[1] + r * t.sin()]
        })
        .collect()
}

fn obround(pen: &Pen, c: [f64; 2], s: f64, ratio: f64, along_u: bool) -> Profile {
    let r = s * ratio;
    let l = s - r;
    // rotating by 90° keeps the winding
    let q = |x: f64, y: f64| {
        if along_u {
            [c[0] + x, c[1] + y]
        } else {
            [c[0] - y, c[1] + x]
        }
    };
    Profile::new(vec![
        pen.line(q(-l, -r), q(l, -r)),
        pen.arc(q(l, -r), q(l + r, 0.0), q(l, r)),
        pen.line(q(l, r), q(-l, r)),
        pen.arc(q(-l, r), q(-l - r, 0.0), q(-l, -r)),
    ])
}

/// Draw an inner feature of `shape` centered inside `bound`.
///
/// `radius` fixes the size (catalog-sized holes); otherwise it is drawn from
/// `[min_len, min(w, h)/2 - clearance]`.
pub fn sketch_inner<R: Rng + ?Sized>(
    kind: FeatureKind,
    shape: InnerShape,
    bound: &Bound,
    ctx: &SketchContext<'_>,
    radius: Option<f64>,
    rng: &mut R,
) -> Result<Sketch, SketchError> {
    let p = ctx.params;
    let frame = bound.frame();
    let limit = size_limit(&frame, p)?;
    let s = match radius {
        Some(r) if r > limit => return Err(SketchError::DoesNotFit { size: r, limit }),
        Some(r) => r,
        None => draw(rng, p.min_len, limit)?,
    };
    let ca = draw(rng, p.clearance + s, frame.w - p.clearance - s)?;
    let cb = draw(rng, p.clearance + s, frame.h - p.clearance - s)?;
    let c = [ca, cb];
    let pen = Pen::new(frame, p.margin);

    let profile = match shape {
        InnerShape::Circle => Profile::new(pen.circle(c, s)),
        InnerShape::Triangle => pen.polygon(&regular_polygon(c, s, 3, rng.gen_range(0.0..TAU))),
        InnerShape::Hexagon => pen.polygon(&regular_polygon(c, s, 6, rng.gen_range(0.0..FRAC_PI_3))),
        InnerShape::Rectangle => {
            let phi = rng.gen_range(FRAC_PI_6..=FRAC_PI_3);
            let (hx, hy) = (s * phi.cos(), s * phi.sin());
            pen.polygon(&[
                [ca - hx, cb - hy],
                [ca + hx, cb - hy],
                [ca + hx, cb + hy],
                [ca - hx, cb + hy],
            ])
        }
        InnerShape::Obround => obround(&pen, c, s, rng.gen_range(0.35..=0.6), rng.gen_bool(0.5)),
        InnerShape::Annulus => {
            let inner = s * rng.gen_range(0.45..=0.75);
            let hole = pen.circle(c, inner).iter().rev().map(Segment::reversed).collect();
            Profile::new(pen.circle(c, s)).with_hole(hole)
        }
    };

    let through = kind.depth() == DepthKind::Through;
    let tool = face_tool(profile, bound, ctx, through, BottomRule::FarCap, rng)?;
    Ok(Sketch {
        params: FeatureParams {
            kind,
            anchor: frame.at(ca, cb, 0.0),
            size: s,
            depth: tool.depth(),
            axis: bound.normal,
            fastener: None,
        },
        tool,
    })
}

/// Shape drawn for each inner kind.
pub fn inner_shape(kind: FeatureKind) -> Option<InnerShape> {
    use FeatureKind::*;
    Some(match kind {
        ThroughHole | BlindHole => InnerShape::Circle,
        TriangularPassage | TriangularPocket => InnerShape::Triangle,
        RectangularPassage | RectangularPocket => InnerShape::Rectangle,
        SixSidesPassage | SixSidesPocket => InnerShape::Hexagon,
        CircularEndPocket => InnerShape::Obround,
        ORing => InnerShape::Annulus,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::derive_bounds;
    use crate::sketch::SketchParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn top_bound(stock: &Aabb) -> Bound {
        let bbox = Aabb::new([stock.min[0], stock.min[1], stock.max[2]], stock.max);
        let anchor = bbox.center();
        let top = FaceFingerprint {
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
        derive_bounds(&[top], stock, 1.0).remove(0)
    }

    #[test]
    fn oversized_catalog_radius_does_not_fit() {
        let stock = Aabb::new([0.0; 3], [12.0, 12.0, 10.0]);
        let bound = top_bound(&stock);
        let params = SketchParams::default();
        let ctx = SketchContext {
            params: &params,
            stock,
            through_depth: None,
        };
        let mut rng = StdRng::seed_from_u64(3);
        // limit = 12 / 2 - 2 = 4
        let err = sketch_inner(FeatureKind::ThroughHole, InnerShape::Circle, &bound, &ctx, Some(5.0), &mut rng)
            .unwrap_err();
        assert_eq!(err, SketchError::DoesNotFit { size: 5.0, limit: 4.0 });
        assert!(sketch_inner(FeatureKind::ThroughHole, InnerShape::Circle, &bound, &ctx, Some(4.0), &mut rng).is_ok());
    }

    #[test]
    fn blind_tools_stop_inside_and_through_tools_exit() {
        let stock = Aabb::new([0.0; 3], [60.0, 50.0, 20.0]);
        let bound = top_bound(&stock);
        let params = SketchParams::default();
        let ctx = SketchContext {
            params: &params,
            stock,
            through_depth: None,
        };
        let mut rng = StdRng::seed_from_u64(11);
        for kind in [FeatureKind::BlindHole, FeatureKind::RectangularPocket, FeatureKind::ORing] {
            let sketch = sketch_inner(kind, inner_shape(kind).unwrap(), &bound, &ctx, None, &mut rng).unwrap();
            let b = sketch.tool.bbox();
            assert!(b.min[2] > 0.0, "{kind} must not break through");
            assert!((b.max[2] - 20.5).abs() < 1e-9);
            assert!(sketch.tool.profile.is_closed(1e-9));
        }
        let sketch = sketch_inner(
            FeatureKind::RectangularPassage,
            InnerShape::Rectangle,
            &bound,
            &ctx,
            None,
            &mut rng,
        )
        .unwrap();
        assert!(sketch.tool.bbox().min[2] < 0.0);
    }

    #[test]
    fn profiles_keep_clearance_from_the_bound_sides() {
        let stock = Aabb::new([0.0; 3], [30.0, 30.0, 10.0]);
        let bound = top_bound(&stock);
        let params = SketchParams::default();
        let ctx = SketchContext {
            params: &params,
            stock,
            through_depth: None,
        };
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let sketch =
                sketch_inner(FeatureKind::CircularEndPocket, InnerShape::Obround, &bound, &ctx, None, &mut rng).unwrap();
            let b = sketch.tool.profile.bbox(64);
            assert!(b.min[0] >= 2.0 - 1e-6 && b.max[0] <= 28.0 + 1e-6);
            assert!(b.min[1] >= 2.0 - 1e-6 && b.max[1] <= 28.0 + 1e-6);
        }
    }
}
