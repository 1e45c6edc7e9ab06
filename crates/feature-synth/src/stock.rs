//! Stock extents and the auxiliary plate cut.

use rand::Rng;
use synth_types::*;

use crate::config::SynthesisConfig;

/// Sides an auxiliary slab can be cut parallel to, as (axis, sign).
///
/// Sign `+1` keeps the plate at the low end of the axis, `-1` at the high end.
pub const AUX_SIDES: [(usize, f64); 6] = [
    (0, 1.0),
    (0, -1.0),
    (1, -1.0),
    (1, 1.0),
    (2, 1.0),
    (2, -1.0),
];

/// A thin slab removed parallel to one stock face, leaving a plate that
/// hosts the through hole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxSlab {
    pub axis: usize,
    pub sign: f64,
    /// Coordinate of the plate face that borders the slab.
    pub position: f64,
    /// Plate thickness along `axis`.
    pub plate: f64,
    pub gap: f64,
}

impl AuxSlab {
    /// Box of the removed slab, extended past the stock sideways.
    pub fn slab_box(&self, stock: &Aabb, margin: f64) -> Aabb {
        let mut min = sub(stock.min, [margin; 3]);
        let mut max = add(stock.max, [margin; 3]);
        if self.sign > 0.0 {
            min[self.axis] = self.position;
            max[self.axis] = self.position + self.gap;
        } else {
            min[self.axis] = self.position - self.gap;
            max[self.axis] = self.position;
        }
        Aabb::new(min, max)
    }

    /// Outward normal of the plate's outer face.
    pub fn host_normal(&self) -> [f64; 3] {
        unit_axis(self.axis, -self.sign)
    }

    /// Depth at which a through hole in the plate stops: past the plate,
    /// halfway into the gap.
    pub fn through_depth(&self) -> f64 {
        self.plate + self.gap * 0.5
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Draw stock extents. Minimums are doubled for large combinations and
/// scaled by `growth`, never past the maximums.
pub fn draw_stock_size<R: Rng + ?Sized>(
    config: &SynthesisConfig,
    large: bool,
    growth: f64,
    rng: &mut R,
) -> [f64; 3] {
    let min = config.stock_min();
    let max = config.stock_max();
    let factor = if large { 2.0 } else { 1.0 } * growth;
    let mut size = [0.0; 3];
    for k in 0..3 {
        let lo = (min[k] * factor).min(max[k]);
        size[k] = uniform(rng, lo, max[k]);
    }
    size
}

/// Draw the slab for one side of a stock box with its minimum corner at the
/// origin. `None` when the stock is too thin on that axis for a plate.
pub fn draw_aux<R: Rng + ?Sized>(
    config: &SynthesisConfig,
    size: [f64; 3],
    side: (usize, f64),
    rng: &mut R,
) -> Option<AuxSlab> {
    let (axis, sign) = side;
    let [lo, hi] = config.aux_offset;
    let ext = size[axis];
    if ext <= hi + config.aux_gap {
        return None;
    }
    let (position, plate) = if sign > 0.0 {
        let pos = uniform(rng, lo, hi);
        (pos, pos)
    } else {
        let pos = uniform(rng, ext - hi, ext - lo);
        (pos, ext - pos)
    };
    Some(AuxSlab {
        axis,
        sign,
        position,
        plate,
        gap: config.aux_gap,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn large_combinations_double_the_minimums() {
        let config = SynthesisConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            let size = draw_stock_size(&config, true, 1.0, &mut rng);
            assert!(size.iter().all(|&s| (100.0..=100.0 + 1e-9).contains(&s)));
        }
    }

    #[test]
    fn growth_is_clamped_to_the_maximums() {
        let config = SynthesisConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let size = draw_stock_size(&config, false, 10.0, &mut rng);
        assert_eq!(size, config.stock_max());
    }

    #[test]
    fn plate_sits_on_the_drawn_side() {
        let config = SynthesisConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let size = [80.0, 60.0, 50.0];
        let stock = Aabb::new([0.0; 3], size);

        let low = draw_aux(&config, size, (2, 1.0), &mut rng).unwrap();
        assert!((10.0..15.0).contains(&low.plate));
        assert_eq!(low.host_normal(), [0.0, 0.0, -1.0]);
        let slab = low.slab_box(&stock, 0.5);
        assert_eq!(slab.min[2], low.position);
        assert!(slab.min[0] < 0.0 && slab.max[0] > 80.0);

        let high = draw_aux(&config, size, (0, -1.0), &mut rng).unwrap();
        assert!((10.0..=15.0).contains(&high.plate));
        assert_eq!(high.host_normal(), [1.0, 0.0, 0.0]);
        assert!((high.through_depth() - high.plate - 0.5).abs() < 1e-12);
    }

    #[test]
    fn thin_stock_has_no_plate() {
        let config = SynthesisConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(draw_aux(&config, [12.0, 80.0, 80.0], (0, 1.0), &mut rng).is_none());
    }
}
