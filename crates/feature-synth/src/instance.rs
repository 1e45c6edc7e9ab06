//! Adding one feature to the current solid.

use brep_kernel::SolidHandle;
use feature_ops::{
    derive_bounds, Bound, CutResult, EdgeCandidate, FaceOrigin, FeatureParams, Host,
    KernelBundle, MachiningFeature, OpError, Sketch, SketchContext,
};
use rand::seq::SliceRandom;
use rand::RngCore;
use synth_types::*;
use tracing::{debug, instrument};

use crate::config::SynthesisConfig;
use crate::error::SynthesisError;
use crate::labels::{FaceId, LabelMaps};

/// One applied feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub kind: FeatureKind,
    pub params: FeatureParams,
    pub host: Host,
    /// Box of the material the cut removed.
    pub removal_box: Aabb,
    pub instance: usize,
    /// Faces the feature owned right after its cut.
    pub faces: Vec<FaceId>,
}

/// The solid being machined with everything tracked about it.
#[derive(Debug)]
pub struct Workpiece {
    pub solid: SolidHandle,
    pub faces: Vec<FaceFingerprint>,
    pub labels: LabelMaps,
    pub bounds: Vec<Bound>,
    pub records: Vec<FeatureRecord>,
    pub stock: Aabb,
}

impl Workpiece {
    /// Take ownership of `solid`, labeling every face stock. The solid is
    /// released when its faces cannot be read.
    pub fn new(
        kb: &mut dyn KernelBundle,
        solid: SolidHandle,
        stock: Aabb,
        clearance: f64,
    ) -> Result<Self, SynthesisError> {
        let faces = match kb.face_fingerprints(&solid) {
            Ok(faces) => faces,
            Err(e) => {
                kb.release(&solid);
                return Err(e.into());
            }
        };
        let bounds = derive_bounds(&faces, &stock, clearance);
        Ok(Self {
            labels: LabelMaps::stock(faces.len()),
            solid,
            faces,
            bounds,
            records: Vec::new(),
            stock,
        })
    }

    /// Instance owning the face at `index`, if any.
    pub fn owner_of(&self, index: usize) -> Option<usize> {
        let id = self.labels.id_at(index)?;
        (0..self.labels.instance_count()).find(|&i| self.labels.group(i).contains(&id))
    }

    pub fn release(self, kb: &mut dyn KernelBundle) {
        kb.release(&self.solid);
    }
}

/// How one feature is placed.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    /// Required outward normal of the host face.
    pub hint: Option<[f64; 3]>,
    /// Re-derive bounds from the new solid instead of filtering the old list.
    pub find_new_bounds: bool,
    /// Edge candidates for transitions.
    pub edges: &'a [EdgeCandidate],
    /// Depth at which through tools stop.
    pub through_depth: Option<f64>,
}

/// Removal regions of earlier features must stay clear of the new one,
/// except the feature whose face hosts it.
fn collides(work: &Workpiece, host: &Host, removal: &Aabb, clearance: f64) -> bool {
    let owner = match host {
        Host::Face(bound) => work.owner_of(bound.face),
        Host::Edge(_) => None,
    };
    let grown = removal.expanded(clearance);
    work.records
        .iter()
        .filter(|r| Some(r.instance) != owner)
        .any(|r| grown.overlaps(&r.removal_box, 0.0))
}

/// Carry bounds the cut did not touch over to the new face enumeration.
fn remap_bounds(bounds: &[Bound], origins: &[FaceOrigin], removal: &Aabb) -> Vec<Bound> {
    bounds
        .iter()
        .filter(|b| !b.rect().overlaps(removal, 0.0))
        .filter_map(|b| {
            let face = origins
                .iter()
                .position(|o| *o == FaceOrigin::Survivor { before: b.face })?;
            Some(Bound { face, ..b.clone() })
        })
        .collect()
}

/// Place `feature` on the workpiece.
///
/// Hosts are tried in random order; a host is skipped when no profile fits,
/// when the removal region collides with an earlier feature, or when the cut
/// removes nothing. The solid is replaced only by a successful cut.
#[instrument(skip_all, fields(kind = %feature.kind()))]
pub fn add_feature(
    kb: &mut dyn KernelBundle,
    work: &mut Workpiece,
    feature: &dyn MachiningFeature,
    placement: &Placement<'_>,
    config: &SynthesisConfig,
    rng: &mut dyn RngCore,
) -> Result<FeatureRecord, SynthesisError> {
    let kind = feature.kind();
    let mut hosts = feature.find_bounds(&work.bounds, placement.edges, placement.hint);
    if hosts.is_empty() {
        return Err(SynthesisError::NoPlacement { kind });
    }
    hosts.shuffle(&mut *rng);

    let params = config.sketch_params();
    let ctx = SketchContext {
        params: &params,
        stock: work.stock,
        through_depth: placement.through_depth,
    };
    for host in hosts {
        let sketch = match feature.build_profile(&host, &ctx, &mut *rng) {
            Ok(sketch) => sketch,
            Err(e) => {
                debug!(error = %e, "host rejected");
                continue;
            }
        };
        let removal = sketch.tool.material_box(&work.stock);
        if removal.is_empty() || collides(work, &host, &removal, config.clearance) {
            debug!("removal region unavailable");
            continue;
        }
        let cut = match feature.cut(kb, &work.solid, &sketch, config.match_tolerance) {
            Ok(cut) => cut,
            Err(OpError::NoEffect) => continue,
            Err(e) => return Err(e.into()),
        };
        return commit(kb, work, feature, sketch, host, removal, cut, placement, config);
    }
    Err(SynthesisError::NoPlacement { kind })
}

#[allow(clippy::too_many_arguments)]
fn commit(
    kb: &mut dyn KernelBundle,
    work: &mut Workpiece,
    feature: &dyn MachiningFeature,
    sketch: Sketch,
    host: Host,
    removal_box: Aabb,
    cut: CutResult,
    placement: &Placement<'_>,
    config: &SynthesisConfig,
) -> Result<FeatureRecord, SynthesisError> {
    let previous = std::mem::replace(&mut work.solid, cut.handle.clone());
    kb.release(&previous);

    work.labels.rebind(&cut.origins, &cut.faces);
    let owned = feature.label_faces(&cut);
    let instance = work.labels.apply_feature(feature.kind().id(), &owned);
    work.labels.validate(cut.faces.len())?;

    work.bounds = if placement.find_new_bounds {
        derive_bounds(&cut.faces, &work.stock, config.clearance)
    } else {
        remap_bounds(&work.bounds, &cut.origins, &removal_box)
    };
    work.faces = cut.faces;

    let record = FeatureRecord {
        kind: feature.kind(),
        params: sketch.params,
        host,
        removal_box,
        instance,
        faces: work.labels.group(instance).to_vec(),
    };
    debug!(
        instance,
        faces = record.faces.len(),
        bounds = work.bounds.len(),
        "feature applied"
    );
    work.records.push(record.clone());
    Ok(record)
}
