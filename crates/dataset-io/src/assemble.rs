//! The exported body: the machined part followed by the selected fastener
//! companions, with one label per face in export order.

use brep_kernel::SolidHandle;
use feature_ops::KernelBundle;
use feature_synth::{select_companions, Synthesized};
use synth_types::FASTENED_HOLE_LABEL;
use tracing::debug;

use crate::error::DatasetError;
use crate::writer::SampleLabels;

#[derive(Debug)]
pub struct Assembly {
    pub solid: SolidHandle,
    /// The solid was built for export and must be released with it.
    owned: bool,
    pub labels: SampleLabels,
    /// Registry indices of the exported companions.
    pub companions: Vec<usize>,
}

impl Assembly {
    pub fn face_names(&self) -> Vec<String> {
        self.labels.seg.iter().map(u32::to_string).collect()
    }

    pub fn release(self, kb: &mut dyn KernelBundle) {
        if self.owned {
            kb.release(&self.solid);
        }
    }
}

/// Combine the part with up to `max_companions` independent companions.
///
/// Faces of each hole hosting an exported companion become fastened-hole
/// faces; companion faces carry the catalog id. Companion faces belong to no
/// instance and are never bottoms.
pub fn assemble(
    kb: &mut dyn KernelBundle,
    sample: &Synthesized,
    max_companions: usize,
) -> Result<Assembly, DatasetError> {
    let mut seg = sample.labels.semantic_labels();
    let mut inst = sample.labels.relation_matrix();
    let mut bottom: Vec<u8> = sample
        .labels
        .bottom_labels()
        .into_iter()
        .map(u8::from)
        .collect();

    let companions = select_companions(&sample.fasteners, max_companions);
    let mut parts = vec![sample.solid.clone()];
    for &index in &companions {
        let Some(record) = sample.fasteners.get(index) else {
            continue;
        };
        for face in sample.labels.group_indices(record.instance) {
            seg[face] = FASTENED_HOLE_LABEL;
        }
        let count = kb.as_introspect().face_count(&record.companion)?;
        seg.extend(std::iter::repeat(record.catalog_id).take(count));
        parts.push(record.companion.clone());
    }

    let total = seg.len();
    for row in &mut inst {
        row.resize(total, 0);
    }
    inst.resize(total, vec![0; total]);
    bottom.resize(total, 0);

    let (solid, owned) = if parts.len() > 1 {
        (kb.combine(&parts)?, true)
    } else {
        (sample.solid.clone(), false)
    };
    debug!(faces = total, companions = companions.len(), "sample assembled");
    Ok(Assembly {
        solid,
        owned,
        labels: SampleLabels { seg, inst, bottom },
        companions,
    })
}
