//! Slots attached to one open side of a stock face.

use super::{draw, face_tool, size_limit, Pen, Sketch, SketchContext};
use crate::bound::Bound;
use crate::types::{BottomRule, FeatureParams, SketchError};
use rand::seq::SliceRandom;
use rand::Rng;
use synth_types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotShape {
    /// V notch narrowing into the face.
    Triangular,
    Rectangular,
    /// Half-disc notch centered on the open side.
    Semicircle,
    /// Straight slot running across the face between two opposite open sides.
    Across,
    /// Slot with a round closed end in plan.
    RoundEnd,
    /// Round-ended slot whose curved wall is the bottom.
    UChannel,
}

pub fn slot_shape(kind: FeatureKind) -> Option<SlotShape> {
    use FeatureKind::*;
    Some(match kind {
        TriangularThroughSlot => SlotShape::Triangular,
        RectangularThroughSlot => SlotShape::Rectangular,
        CircularThroughSlot => SlotShape::Semicircle,
        RectangularBlindSlot => SlotShape::Across,
        VCircularEndBlindSlot => SlotShape::RoundEnd,
        HCircularEndBlindSlot => SlotShape::UChannel,
        _ => return None,
    })
}

/// Index of the arc in round-ended outlines.
const ROUND_END_ARC: usize = 2;

/// Draw a slot entering `bound` through one of its open sides.
pub fn sketch_slot<R: Rng + ?Sized>(
    kind: FeatureKind,
    shape: SlotShape,
    bound: &Bound,
    ctx: &SketchContext<'_>,
    rng: &mut R,
) -> Result<Sketch, SketchError> {
    if !bound.on_stock_boundary {
        return Err(SketchError::NoOpenSide);
    }
    let sides: Vec<usize> = (0..4)
        .filter(|&s| {
            bound.open_sides[s] && (shape != SlotShape::Across || bound.open_sides[(s + 2) % 4])
        })
        .collect();
    let side = *sides.choose(rng).ok_or(SketchError::NoOpenSide)?;
    let frame = bound.frame().rotated(side);
    let p = ctx.params;
    let m = p.margin;
    let limit = size_limit(&frame, p)?;
    let hw = draw(rng, p.min_len, limit)?;
    let ac = draw(rng, p.clearance + hw, frame.w - p.clearance - hw)?;
    let pen = Pen::new(frame, m);

    let round_end = |len: f64| {
        Profile::new(vec![
            pen.line([ac - hw, -m], [ac + hw, -m]),
            pen.line([ac + hw, -m], [ac + hw, len - hw]),
            pen.arc([ac + hw, len - hw], [ac, len], [ac - hw, len - hw]),
            pen.line([ac - hw, len - hw], [ac - hw, -m]),
        ])
    };

    let (profile, bottom) = match shape {
        SlotShape::Triangular => {
            let len = draw(rng, p.min_len.max(hw), frame.h - p.clearance)?;
            let half = hw * (len + m) / len;
            (
                pen.polygon(&[[ac - half, -m], [ac + half, -m], [ac, len]]),
                BottomRule::None,
            )
        }
        SlotShape::Rectangular => {
            let len = draw(rng, p.min_len.max(hw), frame.h - p.clearance)?;
            (
                pen.polygon(&[[ac - hw, -m], [ac + hw, -m], [ac + hw, len], [ac - hw, len]]),
                BottomRule::None,
            )
        }
        SlotShape::Semicircle => (
            Profile::new(vec![
                pen.line([ac - hw, -m], [ac + hw, -m]),
                pen.line([ac + hw, -m], [ac + hw, 0.0]),
                pen.arc([ac + hw, 0.0], [ac, hw], [ac - hw, 0.0]),
                pen.line([ac - hw, 0.0], [ac - hw, -m]),
            ]),
            BottomRule::None,
        ),
        SlotShape::Across => (
            pen.polygon(&[
                [ac - hw, -m],
                [ac + hw, -m],
                [ac + hw, frame.h + m],
                [ac - hw, frame.h + m],
            ]),
            BottomRule::FarCap,
        ),
        SlotShape::RoundEnd => {
            let len = draw(rng, hw + p.min_len, frame.h - p.clearance)?;
            (round_end(len), BottomRule::FarCap)
        }
        SlotShape::UChannel => {
            let len = draw(rng, hw + p.min_len, frame.h - p.clearance)?;
            (round_end(len), BottomRule::Segments(vec![ROUND_END_ARC]))
        }
    };

    let through = kind.depth() == DepthKind::Through;
    let tool = face_tool(profile, bound, ctx, through, bottom, rng)?;
    Ok(Sketch {
        params: FeatureParams {
            kind,
            anchor: frame.at(ac, 0.0, 0.0),
            size: hw,
            depth: tool.depth(),
            axis: bound.normal,
            fastener: None,
        },
        tool,
    })
}
