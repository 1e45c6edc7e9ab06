//! Fastener companions placed into through holes.
//!
//! A companion is read from `<catalog id>.json` in the template directory
//! when that file exists, and otherwise built as a head and shank pair of
//! cylinders. Template frame: shank along +Z from the catalog origin, head
//! along -Z.

use std::f64::consts::{FRAC_PI_2, PI};
use std::path::Path;

use brep_kernel::{Kernel, KernelError, RigidTransform, SolidHandle};
use feature_ops::{FastenerSpec, KernelBundle};
use synth_types::*;
use tracing::debug;

/// Head height as a fraction of the shank radius.
const HEAD_HEIGHT_RATIO: f64 = 0.7;
/// Shank length in radii when the catalog gives none.
const DEFAULT_SHANK_RADII: f64 = 4.0;

/// One placed through hole and its companion solid.
#[derive(Debug, Clone, PartialEq)]
pub struct FastenerRecord {
    /// Hole center on the host face.
    pub anchor: [f64; 3],
    pub radius: f64,
    pub head_diameter: f64,
    /// Catalog template origin.
    pub origin: [f64; 3],
    /// Outward normal of the host face.
    pub axis: [f64; 3],
    pub catalog_id: u32,
    /// Instance index of the hole.
    pub instance: usize,
    pub companion: SolidHandle,
}

/// Placed fasteners of one attempt, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FastenerRegistry {
    records: Vec<FastenerRecord>,
}

impl FastenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FastenerRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[FastenerRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&FastenerRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Release every companion solid.
    pub fn release_all<K: Kernel + ?Sized>(&mut self, kernel: &mut K) {
        for record in self.records.drain(..) {
            kernel.release(&record.companion);
        }
    }
}

/// Rotation that turns the template's +Z shank into the hole along `axis`,
/// about a line through the catalog origin. Returns (rotation axis, angle).
pub fn companion_rotation(axis: [f64; 3]) -> ([f64; 3], f64) {
    if axis[0].abs() > GEOM_EPS {
        ([0.0, -axis[0], 0.0], FRAC_PI_2)
    } else if axis[1].abs() > GEOM_EPS {
        ([axis[1], 0.0, 0.0], FRAC_PI_2)
    } else if axis[2] > 0.0 {
        ([0.0, 1.0, 0.0], PI)
    } else {
        ([0.0, 0.0, 1.0], 0.0)
    }
}

/// Placement of a template whose origin lands on `anchor`.
pub fn companion_placement(spec: &FastenerSpec, anchor: [f64; 3], axis: [f64; 3]) -> RigidTransform {
    let (rot_axis, angle) = companion_rotation(axis);
    RigidTransform {
        center: spec.origin,
        axis: rot_axis,
        angle,
        translation: sub(anchor, spec.origin),
    }
}

fn circle(center: [f64; 3], r: f64) -> Profile {
    let east = add(center, [r, 0.0, 0.0]);
    let west = add(center, [-r, 0.0, 0.0]);
    Profile::new(vec![
        Segment::arc(east, add(center, [0.0, r, 0.0]), west),
        Segment::arc(west, add(center, [0.0, -r, 0.0]), east),
    ])
}

/// Head and shank cylinders in the template frame.
fn procedural_template<K: Kernel + ?Sized>(
    kernel: &mut K,
    spec: &FastenerSpec,
) -> Result<SolidHandle, KernelError> {
    let r = spec.radius;
    let head = kernel.extrude_profile(
        &circle(spec.origin, spec.head_diameter * 0.5),
        [0.0, 0.0, -1.0],
        HEAD_HEIGHT_RATIO * r,
    )?;
    let shank = match kernel.extrude_profile(
        &circle(spec.origin, r),
        [0.0, 0.0, 1.0],
        spec.length.unwrap_or(DEFAULT_SHANK_RADII * r),
    ) {
        Ok(shank) => shank,
        Err(e) => {
            kernel.release(&head);
            return Err(e);
        }
    };
    let body = kernel.combine(&[head.clone(), shank.clone()]);
    kernel.release(&head);
    kernel.release(&shank);
    body
}

/// Build the companion for `spec` seated in a hole at `anchor` whose host
/// face points along `axis`.
pub fn build_companion(
    kb: &mut dyn KernelBundle,
    spec: &FastenerSpec,
    template_dir: Option<&Path>,
    anchor: [f64; 3],
    axis: [f64; 3],
) -> Result<SolidHandle, KernelError> {
    let template_path = template_dir
        .map(|dir| dir.join(format!("{}.json", spec.id)))
        .filter(|p| p.is_file());
    let template = match template_path {
        Some(path) => {
            debug!(path = %path.display(), "fastener template");
            kb.import_solid(&path)?
        }
        None => procedural_template(kb, spec)?,
    };
    let placed = kb.transform(&template, &companion_placement(spec, anchor, axis));
    kb.release(&template);
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use brep_kernel::{KernelIntrospect, MockKernel};
    use feature_ops::FASTENER_CATALOG;

    fn assert_close(a: [f64; 3], b: [f64; 3]) {
        assert!(distance(a, b) < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn shank_points_into_the_material() {
        let spec = FASTENER_CATALOG[0];
        for axis in [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ] {
            let t = companion_placement(&spec, [5.0, 6.0, 7.0], axis);
            assert_close(t.apply_point(spec.origin), [5.0, 6.0, 7.0]);
            assert_close(t.apply_vector([0.0, 0.0, 1.0]), neg(axis));
        }
    }

    #[test]
    fn procedural_companion_sits_on_the_anchor() {
        let mut kernel = MockKernel::new();
        let spec = FASTENER_CATALOG[1];
        let anchor = [20.0, 30.0, 50.0];
        let solid = build_companion(&mut kernel, &spec, None, anchor, [0.0, 0.0, 1.0]).unwrap();
        assert_eq!(kernel.live_solids(), 1);

        let faces = kernel.face_fingerprints(&solid).unwrap();
        let caps: Vec<[f64; 3]> = faces
            .iter()
            .filter(|f| f.is_planar())
            .map(|f| f.centroid)
            .collect();
        // Shank of 34 below the host, head of 3.5 above.
        assert!(caps.iter().any(|c| (c[2] - 16.0).abs() < 1e-6));
        assert!(caps.iter().any(|c| (c[2] - 53.5).abs() < 1e-6));
        assert!(caps.iter().all(|c| (c[0] - 20.0).abs() < 0.5));
    }

    #[test]
    fn release_all_drops_companions() {
        let mut kernel = MockKernel::new();
        let spec = FASTENER_CATALOG[2];
        let mut registry = FastenerRegistry::new();
        for i in 0..2 {
            let anchor = [10.0 + 40.0 * i as f64, 10.0, 0.0];
            let axis = [0.0, 0.0, -1.0];
            let companion = build_companion(&mut kernel, &spec, None, anchor, axis).unwrap();
            registry.push(FastenerRecord {
                anchor,
                radius: spec.radius,
                head_diameter: spec.head_diameter,
                origin: spec.origin,
                axis,
                catalog_id: spec.id,
                instance: i,
                companion,
            });
        }
        assert_eq!(registry.len(), 2);
        registry.release_all(&mut kernel);
        assert!(registry.is_empty());
        assert_eq!(kernel.live_solids(), 0);
    }
}
