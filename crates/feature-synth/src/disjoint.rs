//! Spatial independence of placed fasteners.

use synth_types::distance as point_distance;

use crate::fastener::{FastenerRecord, FastenerRegistry};

/// Extra spacing required between two fastener footprints.
pub const COMPANION_MARGIN: f64 = 6.0;

/// Circular footprint of a fastener on its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub anchor: [f64; 3],
    pub radius: f64,
}

impl From<&FastenerRecord> for Footprint {
    fn from(record: &FastenerRecord) -> Self {
        Footprint {
            anchor: record.anchor,
            radius: record.radius,
        }
    }
}

/// Gap between two footprints after the margin. Positive means independent.
pub fn distance(a: &Footprint, b: &Footprint) -> f64 {
    point_distance(a.anchor, b.anchor) - (a.radius + b.radius + COMPANION_MARGIN)
}

pub fn independent(a: &Footprint, b: &Footprint) -> bool {
    distance(a, b) > 0.0
}

/// Companions exported for `placed` fasteners: one up to two placed, two up
/// to five, three beyond.
pub fn companion_cap(placed: usize) -> usize {
    match placed {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        _ => 3,
    }
}

/// Registry indices of the companions to export: the last placed fastener,
/// then earlier ones in placement order that are independent of all already
/// chosen. At most `companion_cap(len)` and `max` entries.
pub fn select_companions(registry: &FastenerRegistry, max: usize) -> Vec<usize> {
    let records = registry.records();
    let Some(last) = records.len().checked_sub(1) else {
        return Vec::new();
    };
    let cap = companion_cap(records.len()).min(max);
    if cap == 0 {
        return Vec::new();
    }
    let mut chosen = vec![last];
    for (i, record) in records[..last].iter().enumerate() {
        if chosen.len() >= cap {
            break;
        }
        let candidate = Footprint::from(record);
        if chosen
            .iter()
            .all(|&j| independent(&candidate, &Footprint::from(&records[j])))
        {
            chosen.push(i);
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use brep_kernel::{Kernel, MockKernel};
    use proptest::prelude::*;

    fn footprint(x: f64, r: f64) -> Footprint {
        Footprint {
            anchor: [x, 0.0, 0.0],
            radius: r,
        }
    }

    #[test]
    fn overlap_threshold_is_radii_plus_margin() {
        let a = footprint(0.0, 4.0);
        assert!(!independent(&a, &footprint(15.0, 5.0)));
        assert!(independent(&a, &footprint(15.5, 5.0)));
        assert_eq!(distance(&a, &footprint(15.0, 5.0)), 0.0);
    }

    fn registry_at(kernel: &mut MockKernel, xs: &[f64]) -> FastenerRegistry {
        let mut registry = FastenerRegistry::new();
        for (i, &x) in xs.iter().enumerate() {
            let companion = kernel.make_box([x, 0.0, 0.0], [1.0; 3]).unwrap();
            registry.push(FastenerRecord {
                anchor: [x, 0.0, 0.0],
                radius: 3.0,
                head_diameter: 8.0,
                origin: [0.0; 3],
                axis: [0.0, 0.0, 1.0],
                catalog_id: 26,
                instance: i,
                companion,
            });
        }
        registry
    }

    #[test]
    fn selection_starts_from_the_last_fastener() {
        let mut kernel = MockKernel::new();
        // 1 and 3 sit within reach of each other.
        let registry = registry_at(&mut kernel, &[100.0, 45.0, 0.0, 50.0]);
        assert_eq!(select_companions(&registry, 3), vec![3, 0]);
        assert_eq!(select_companions(&registry, 1), vec![3]);
        assert!(select_companions(&registry, 0).is_empty());
        assert!(select_companions(&FastenerRegistry::new(), 3).is_empty());
    }

    #[test]
    fn few_fasteners_export_only_the_last() {
        let mut kernel = MockKernel::new();
        let registry = registry_at(&mut kernel, &[0.0, 100.0]);
        assert_eq!(select_companions(&registry, 3), vec![1]);
    }

    #[test]
    fn earlier_fasteners_are_scanned_in_placement_order() {
        let mut kernel = MockKernel::new();
        let registry = registry_at(&mut kernel, &[0.0, 100.0, 200.0, 300.0]);
        assert_eq!(select_companions(&registry, 3), vec![3, 0]);

        let registry = registry_at(&mut kernel, &[0.0, 5.0, 100.0, 200.0, 300.0, 400.0]);
        assert_eq!(select_companions(&registry, 3), vec![5, 0, 2]);
        assert_eq!(select_companions(&registry, 2), vec![5, 0]);
    }

    #[test]
    fn cap_grows_with_placed_fasteners() {
        let caps: Vec<usize> = (0..8).map(companion_cap).collect();
        assert_eq!(caps, vec![0, 1, 1, 2, 2, 2, 3, 3]);
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(
            ax in -100.0f64..100.0, ay in -100.0f64..100.0, ar in 0.5f64..10.0,
            bx in -100.0f64..100.0, by in -100.0f64..100.0, br in 0.5f64..10.0,
        ) {
            let a = Footprint { anchor: [ax, ay, 0.0], radius: ar };
            let b = Footprint { anchor: [bx, by, 0.0], radius: br };
            prop_assert_eq!(distance(&a, &b), distance(&b, &a));
        }
    }
}
