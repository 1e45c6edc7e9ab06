//! End-to-end scenarios against the mock kernel.

use brep_kernel::MockKernel;
use dataset_io::{assemble, read_labels, read_step_labels, write_sample, DatasetLayout};
use feature_synth::disjoint::{companion_cap, distance, independent, select_companions, Footprint};
use feature_synth::SynthesisConfig;
use synth_types::{FeatureKind, FASTENED_HOLE_LABEL, STOCK_LABEL};
use test_harness::assertions::*;
use test_harness::oracle::*;
use test_harness::{block_config, fixed_config, Scenario};

#[test]
fn scenario_chamfer_on_block() {
    let mut s = Scenario::mock(block_config()).unwrap();
    let sample = s.run(&[FeatureKind::Chamfer], 3).unwrap();
    let labels = sample.labels.semantic_labels();

    assert_all_pass(&label_oracles(&sample), "chamfer").unwrap();
    assert!(check_kernel_face_count(s.kernel(), &sample.solid, &labels).passed);
    assert_eq!(labels.len(), 7);
    assert_class_count(&labels, FeatureKind::Chamfer.id(), 1, "chamfer").unwrap();
    assert_class_count(&labels, STOCK_LABEL, 6, "chamfer").unwrap();

    sample.release(s.kernel_mut());
    assert_eq!(s.kernel().live_solids(), 0);
}

#[test]
fn scenario_through_hole_walls() {
    let mut s = Scenario::mock(block_config()).unwrap();
    let sample = s.run(&[FeatureKind::ThroughHole], 21).unwrap();
    let labels = sample.labels.semantic_labels();

    assert_all_pass(&label_oracles(&sample), "through hole").unwrap();
    assert_class_count(&labels, FeatureKind::ThroughHole.id(), 2, "through hole").unwrap();
    assert_eq!(sample.labels.group_indices(0).len(), 2);
    assert_bottom_count(&sample.labels.bottom_labels(), 0, "through hole").unwrap();

    sample.release(s.kernel_mut());
}

#[test]
fn scenario_blind_hole_bottom() {
    let mut s = Scenario::mock(block_config()).unwrap();
    let sample = s.run(&[FeatureKind::BlindHole], 8).unwrap();
    let bottom = sample.labels.bottom_labels();

    assert_all_pass(&label_oracles(&sample), "blind hole").unwrap();
    assert_bottom_count(&bottom, 1, "blind hole").unwrap();
    let index = bottom.iter().position(|&b| b).unwrap();
    assert!(sample.labels.group_indices(0).contains(&index));

    sample.release(s.kernel_mut());
}

#[test]
fn scenario_failed_placement_grows_the_stock() {
    // Any placement failure lifts every axis straight to its maximum.
    let config = SynthesisConfig {
        stock_min_x: 1.0,
        stock_min_y: 1.0,
        stock_min_z: 1.0,
        retry_growth: 1000.0,
        ..block_config()
    };
    let max = config.stock_max();
    let kinds = [
        FeatureKind::RectangularPocket,
        FeatureKind::BlindHole,
        FeatureKind::ThroughHole,
    ];
    let mut s = Scenario::mock(config).unwrap();
    let mut grown = 0;
    for seed in 0..32 {
        if let Some(sample) = s.try_run(&kinds, seed).unwrap() {
            assert!(sample.attempts <= kinds.len() + 1, "seed {seed}");
            assert_all_pass(&label_oracles(&sample), "grown stock").unwrap();
            if sample.attempts > 1 && sample.stock.size() == max {
                grown += 1;
            }
            sample.release(s.kernel_mut());
        }
        assert_eq!(s.kernel().live_solids(), 0, "seed {seed}");
    }
    assert!(grown > 0, "no sample was retried on a grown stock");
}

#[test]
fn scenario_degenerate_stock_gives_up() {
    let mut s = Scenario::mock(fixed_config([1.0, 1.0, 1.0])).unwrap();
    let kinds = [FeatureKind::RectangularPocket, FeatureKind::BlindHole];
    for seed in 0..4 {
        assert!(s.try_run(&kinds, seed).unwrap().is_none(), "seed {seed}");
        assert_eq!(s.kernel().live_solids(), 0, "seed {seed}");
    }
}

#[test]
fn scenario_footprint_overlap() {
    let a = Footprint { anchor: [0.0, 0.0, 0.0], radius: 3.0 };
    let near = Footprint { anchor: [10.0, 0.0, 0.0], radius: 2.0 };
    let far = Footprint { anchor: [0.0, 12.0, 0.0], radius: 2.0 };

    // 3 + 2 + margin 6 = 11
    assert!(!independent(&a, &near));
    assert!(independent(&a, &far));
    assert_eq!(distance(&a, &far), distance(&far, &a));
}

#[test]
fn selected_companions_are_disjoint() {
    let mut s = Scenario::mock(block_config()).unwrap();
    let kinds = [FeatureKind::ThroughHole, FeatureKind::ThroughHole, FeatureKind::ThroughHole];
    let sample = (0..8)
        .find_map(|seed| s.try_run(&kinds, seed).unwrap())
        .expect("three through holes fit the block");
    assert_eq!(sample.fasteners.len(), 3);
    let selected = select_companions(&sample.fasteners, s.config().max_companions);
    assert!(!selected.is_empty());
    assert!(selected.len() <= companion_cap(3));
    assert_eq!(selected[0], sample.fasteners.len() - 1);
    assert!(check_companions_disjoint(&sample.fasteners, &selected).passed);
    sample.release(s.kernel_mut());
}

#[test]
fn exported_sample_stays_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DatasetLayout::new(dir.path());
    layout.create().unwrap();

    let mut s = Scenario::mock(block_config()).unwrap();
    let sample = s.run(&[FeatureKind::ThroughHole], 21).unwrap();
    let max = s.config().max_companions;
    let kernel: &mut MockKernel = s.kernel_mut();
    let assembly = assemble(kernel, &sample, max).unwrap();
    write_sample(kernel, &layout, "round_trip", &assembly).unwrap();

    let step = read_step_labels(&layout.step_path("round_trip")).unwrap();
    let json = read_labels(&layout.labels_path("round_trip")).unwrap();
    assert!(check_export_alignment(&step, &json).passed);
    assert_eq!(json, assembly.labels.seg);
    assert!(check_relation_symmetric(&assembly.labels.inst).passed);
    assert_eq!(assembly.companions.len(), 1);
    assert_class_count(&json, FASTENED_HOLE_LABEL, 2, "round trip").unwrap();

    assembly.release(kernel);
    sample.release(kernel);
    assert_eq!(kernel.live_solids(), 0);
}
