//! Scenarios against the truck kernel. Boolean results depend on
//! truck-shapeops tolerances, so these run on demand.

use brep_kernel::KernelIntrospect;
use synth_types::{FeatureKind, STOCK_LABEL};
use test_harness::assertions::*;
use test_harness::oracle::*;
use test_harness::{block_config, Scenario};

#[test]
#[ignore = "truck-shapeops: boolean robustness depends on tolerance"]
fn truck_chamfer_on_block() {
    let mut s = Scenario::truck(block_config()).unwrap();
    let sample = s.run(&[FeatureKind::Chamfer], 3).unwrap();
    let labels = sample.labels.semantic_labels();

    assert_all_pass(&label_oracles(&sample), "truck chamfer").unwrap();
    assert!(check_kernel_face_count(s.kernel(), &sample.solid, &labels).passed);
    assert_class_count(&labels, FeatureKind::Chamfer.id(), 1, "truck chamfer").unwrap();
    assert_class_count(&labels, STOCK_LABEL, 6, "truck chamfer").unwrap();
}

#[test]
#[ignore = "truck-shapeops: boolean robustness depends on tolerance"]
fn truck_blind_hole_bottom() {
    let mut s = Scenario::truck(block_config()).unwrap();
    let sample = s.run(&[FeatureKind::BlindHole], 8).unwrap();

    assert_all_pass(&label_oracles(&sample), "truck blind hole").unwrap();
    assert_bottom_count(&sample.labels.bottom_labels(), 1, "truck blind hole").unwrap();
    assert_eq!(
        s.kernel().face_count(&sample.solid).unwrap(),
        sample.labels.face_count()
    );
}

#[test]
#[ignore = "truck-shapeops: boolean robustness depends on tolerance"]
fn truck_pocket_then_through_hole() {
    let mut s = Scenario::truck(block_config()).unwrap();
    let kinds = [FeatureKind::RectangularPocket, FeatureKind::ThroughHole];
    let sample = s.run(&kinds, 11).unwrap();
    assert_all_pass(&label_oracles(&sample), "truck pocket").unwrap();
    assert_eq!(sample.records.len(), 2);
    assert_eq!(sample.fasteners.len(), 1);
}
