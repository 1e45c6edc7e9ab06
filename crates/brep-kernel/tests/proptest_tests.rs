//! Property-based tests for kernel invariants using the `proptest` crate.

use proptest::prelude::*;

use brep_kernel::step::read_face_names;
use brep_kernel::{Kernel, KernelIntrospect, MockKernel, RigidTransform};
use synth_types::distance;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_point() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-1000.0f64..1000.0)
}

/// Box extents away from degenerate zero size.
fn arb_size() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(0.5f64..200.0)
}

fn arb_axis() -> impl Strategy<Value = [f64; 3]> {
    prop_oneof![
        Just([1.0, 0.0, 0.0]),
        Just([0.0, 1.0, 0.0]),
        Just([0.0, 0.0, 1.0]),
        Just([0.0, 0.0, -1.0]),
    ]
}

fn arb_angle() -> impl Strategy<Value = f64> {
    -std::f64::consts::PI..std::f64::consts::PI
}

const TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Rigid placements preserve distances
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn placement_preserves_distance(
        a in arb_point(),
        b in arb_point(),
        center in arb_point(),
        axis in arb_axis(),
        angle in arb_angle(),
        translation in arb_point(),
    ) {
        let t = RigidTransform { center, axis, angle, translation };
        let before = distance(a, b);
        let after = distance(t.apply_point(a), t.apply_point(b));
        prop_assert!((before - after).abs() < TOL * before.max(1.0),
            "distance {} became {}", before, after);
    }
}

// ---------------------------------------------------------------------------
// Boxes have six faces and the right surface area
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn box_faces_cover_the_surface(origin in arb_point(), size in arb_size()) {
        let mut kernel = MockKernel::new();
        let h = kernel.make_box(origin, size).unwrap();
        let faces = kernel.face_fingerprints(&h).unwrap();
        prop_assert_eq!(faces.len(), 6);

        let [x, y, z] = size;
        let expected = 2.0 * (x * y + y * z + x * z);
        let total: f64 = faces.iter().map(|f| f.area).sum();
        prop_assert!((total - expected).abs() < TOL * expected);

        let edges = kernel.edges(&h).unwrap();
        prop_assert_eq!(edges.len(), 12);
        prop_assert!(edges.iter().all(|e| e.faces.len() == 2));
    }
}

// ---------------------------------------------------------------------------
// Combined bodies keep part order and face counts
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn combine_concatenates_faces(a in arb_size(), b in arb_size(), offset in arb_point()) {
        let mut kernel = MockKernel::new();
        let first = kernel.make_box([0.0; 3], a).unwrap();
        let second = kernel.make_box(offset, b).unwrap();
        let both = kernel.combine(&[first.clone(), second.clone()]).unwrap();

        let combined = kernel.face_fingerprints(&both).unwrap();
        let head = kernel.face_fingerprints(&first).unwrap();
        prop_assert_eq!(combined.len(), 12);
        for (c, h) in combined.iter().zip(&head) {
            prop_assert_eq!(c.centroid, h.centroid);
            prop_assert_eq!(c.normal, h.normal);
        }

        kernel.release(&both);
        kernel.release(&first);
        kernel.release(&second);
        prop_assert_eq!(kernel.live_solids(), 0);
    }
}

// ---------------------------------------------------------------------------
// Exported face names read back in order
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn step_face_names_round_trip(names in prop::collection::vec("[a-z0-9]{0,6}", 6)) {
        let mut kernel = MockKernel::new();
        let h = kernel.make_box([0.0; 3], [1.0, 2.0, 3.0]).unwrap();
        let text = kernel.export_step(&h, &names).unwrap();
        prop_assert_eq!(read_face_names(&text).unwrap(), names);
    }
}
