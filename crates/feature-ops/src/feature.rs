//! Per-kind placement behavior behind one trait, and the registry that maps
//! every [`FeatureKind`] to it.

use std::collections::BTreeMap;

use brep_kernel::SolidHandle;
use rand::RngCore;
use synth_types::*;

use crate::bound::Bound;
use crate::catalog;
use crate::cut::{execute_cut, CutResult};
use crate::diff::FaceOrigin;
use crate::edges::EdgeCandidate;
use crate::kernel_ext::KernelBundle;
use crate::sketch::inner::inner_shape;
use crate::sketch::slot::slot_shape;
use crate::sketch::step::step_shape;
use crate::sketch::{
    sketch_chamfer, sketch_inner, sketch_round, sketch_slot, sketch_step, InnerShape, Sketch,
    SketchContext, SlotShape, StepShape,
};
use crate::types::{OpError, SketchError};

/// Where a feature is placed.
#[derive(Debug, Clone, PartialEq)]
pub enum Host {
    Face(Bound),
    Edge(EdgeCandidate),
}

fn matches_hint(bound: &Bound, hint: Option<[f64; 3]>) -> bool {
    hint.map_or(true, |h| dot(bound.normal, normalize(h)) > 1.0 - GEOM_EPS)
}

/// One machining feature kind.
pub trait MachiningFeature: Send + Sync {
    fn kind(&self) -> FeatureKind;

    /// Candidate hosts. `hint` restricts face hosts to one outward normal.
    fn find_bounds(
        &self,
        bounds: &[Bound],
        _edges: &[EdgeCandidate],
        hint: Option<[f64; 3]>,
    ) -> Vec<Host> {
        bounds
            .iter()
            .filter(|b| matches_hint(b, hint))
            .cloned()
            .map(Host::Face)
            .collect()
    }

    /// Draw the removal tool on `host`.
    fn build_profile(
        &self,
        host: &Host,
        ctx: &SketchContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Sketch, SketchError>;

    fn cut(
        &self,
        kb: &mut dyn KernelBundle,
        solid: &SolidHandle,
        sketch: &Sketch,
        tol: f64,
    ) -> Result<CutResult, OpError> {
        execute_cut(kb, solid, &sketch.tool, tol)
    }

    /// Faces of the cut result this feature owns, with their bottom flag.
    fn label_faces(&self, cut: &CutResult) -> Vec<(usize, bool)> {
        cut.origins
            .iter()
            .enumerate()
            .filter_map(|(i, o)| match o {
                FaceOrigin::Tool { bottom, .. } => Some((i, *bottom)),
                _ => None,
            })
            .collect()
    }
}

fn face_host(kind: FeatureKind, host: &Host) -> Result<&Bound, SketchError> {
    match host {
        Host::Face(b) => Ok(b),
        Host::Edge(_) => Err(SketchError::WrongHost { kind }),
    }
}

/// Holes, passages, pockets and O-rings drawn inside a face.
pub struct InnerFeature {
    kind: FeatureKind,
    shape: InnerShape,
}

impl MachiningFeature for InnerFeature {
    fn kind(&self) -> FeatureKind {
        self.kind
    }

    fn build_profile(
        &self,
        host: &Host,
        ctx: &SketchContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Sketch, SketchError> {
        let bound = face_host(self.kind, host)?;
        sketch_inner(self.kind, self.shape, bound, ctx, None, rng)
    }
}

/// Through hole sized from the fastener catalog.
pub struct ThroughHoleFeature;

impl MachiningFeature for ThroughHoleFeature {
    fn kind(&self) -> FeatureKind {
        FeatureKind::ThroughHole
    }

    fn build_profile(
        &self,
        host: &Host,
        ctx: &SketchContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Sketch, SketchError> {
        let bound = face_host(FeatureKind::ThroughHole, host)?;
        let spec = catalog::choose(rng);
        let mut sketch = sketch_inner(
            FeatureKind::ThroughHole,
            InnerShape::Circle,
            bound,
            ctx,
            Some(spec.radius),
            rng,
        )?;
        sketch.params.fastener = Some(spec.id);
        Ok(sketch)
    }
}

/// Faces on the stock boundary with at least one side on it.
fn boundary_hosts(bounds: &[Bound], hint: Option<[f64; 3]>) -> Vec<Host> {
    bounds
        .iter()
        .filter(|b| b.on_stock_boundary && b.open_sides.iter().any(|&o| o))
        .filter(|b| matches_hint(b, hint))
        .cloned()
        .map(Host::Face)
        .collect()
}

pub struct SlotFeature {
    kind: FeatureKind,
    shape: SlotShape,
}

impl MachiningFeature for SlotFeature {
    fn kind(&self) -> FeatureKind {
        self.kind
    }

    fn find_bounds(
        &self,
        bounds: &[Bound],
        _edges: &[EdgeCandidate],
        hint: Option<[f64; 3]>,
    ) -> Vec<Host> {
        boundary_hosts(bounds, hint)
    }

    fn build_profile(
        &self,
        host: &Host,
        ctx: &SketchContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Sketch, SketchError> {
        let bound = face_host(self.kind, host)?;
        sketch_slot(self.kind, self.shape, bound, ctx, rng)
    }
}

pub struct StepFeature {
    kind: FeatureKind,
    shape: StepShape,
}

impl MachiningFeature for StepFeature {
    fn kind(&self) -> FeatureKind {
        self.kind
    }

    fn find_bounds(
        &self,
        bounds: &[Bound],
        _edges: &[EdgeCandidate],
        hint: Option<[f64; 3]>,
    ) -> Vec<Host> {
        boundary_hosts(bounds, hint)
            .into_iter()
            .filter(|h| match h {
                Host::Face(b) => (0..4).any(|s| b.open_sides[s] && b.open_sides[(s + 3) % 4]),
                Host::Edge(_) => false,
            })
            .collect()
    }

    fn build_profile(
        &self,
        host: &Host,
        ctx: &SketchContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Sketch, SketchError> {
        let bound = face_host(self.kind, host)?;
        sketch_step(self.kind, self.shape, bound, ctx, rng)
    }
}

/// Chamfer or round on a convex stock edge.
pub struct TransitionFeature {
    kind: FeatureKind,
}

impl MachiningFeature for TransitionFeature {
    fn kind(&self) -> FeatureKind {
        self.kind
    }

    fn find_bounds(
        &self,
        _bounds: &[Bound],
        edges: &[EdgeCandidate],
        _hint: Option<[f64; 3]>,
    ) -> Vec<Host> {
        edges.iter().cloned().map(Host::Edge).collect()
    }

    fn build_profile(
        &self,
        host: &Host,
        ctx: &SketchContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<Sketch, SketchError> {
        let Host::Edge(edge) = host else {
            return Err(SketchError::WrongHost { kind: self.kind });
        };
        match self.kind {
            FeatureKind::Round => sketch_round(edge, ctx, rng),
            _ => sketch_chamfer(edge, ctx, rng),
        }
    }
}

/// Maps every feature kind to its implementation.
pub struct FeatureRegistry {
    features: BTreeMap<FeatureKind, Box<dyn MachiningFeature>>,
}

impl FeatureRegistry {
    pub fn empty() -> Self {
        Self {
            features: BTreeMap::new(),
        }
    }

    /// Registry covering all 24 machining kinds.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for kind in FeatureKind::ALL {
            let feature: Box<dyn MachiningFeature> = if kind == FeatureKind::ThroughHole {
                Box::new(ThroughHoleFeature)
            } else if kind.is_transition() {
                Box::new(TransitionFeature { kind })
            } else if let Some(shape) = inner_shape(kind) {
                Box::new(InnerFeature { kind, shape })
            } else if let Some(shape) = slot_shape(kind) {
                Box::new(SlotFeature { kind, shape })
            } else if let Some(shape) = step_shape(kind) {
                Box::new(StepFeature { kind, shape })
            } else {
                continue;
            };
            registry.register(feature);
        }
        registry
    }

    /// Add or replace the implementation for its kind.
    pub fn register(&mut self, feature: Box<dyn MachiningFeature>) {
        self.features.insert(feature.kind(), feature);
    }

    pub fn get(&self, kind: FeatureKind) -> Option<&dyn MachiningFeature> {
        self.features.get(&kind).map(|f| f.as_ref())
    }

    pub fn kinds(&self) -> impl Iterator<Item = FeatureKind> + '_ {
        self.features.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::derive_bounds;
    use crate::sketch::SketchParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn face(normal: [f64; 3], min: [f64; 3], max: [f64; 3]) -> FaceFingerprint {
        let bbox = Aabb::new(min, max);
        let anchor = bbox.center();
        FaceFingerprint {
            surface: SurfaceKind::Planar {
                normal,
                offset: dot(normal, anchor),
            },
            centroid: anchor,
            normal,
            area: 1.0,
            bbox,
            anchor,
            anchor_normal: normal,
        }
    }

    #[test]
    fn standard_registry_covers_every_kind() {
        let registry = FeatureRegistry::standard();
        assert_eq!(registry.len(), 24);
        for kind in FeatureKind::ALL {
            assert_eq!(registry.get(kind).map(|f| f.kind()), Some(kind));
        }
    }

    #[test]
    fn through_hole_records_its_fastener() {
        let stock = Aabb::new([0.0; 3], [100.0, 80.0, 50.0]);
        let top = face([0.0, 0.0, 1.0], [0.0, 0.0, 50.0], [100.0, 80.0, 50.0]);
        let bounds = derive_bounds(&[top], &stock, 2.0);
        let params = SketchParams::default();
        let ctx = SketchContext {
            params: &params,
            stock,
            through_depth: None,
        };
        let registry = FeatureRegistry::standard();
        let hole = registry.get(FeatureKind::ThroughHole).unwrap();
        let hosts = hole.find_bounds(&bounds, &[], None);
        let mut rng = StdRng::seed_from_u64(21);
        let sketch = hole.build_profile(&hosts[0], &ctx, &mut rng).unwrap();
        let id = sketch.params.fastener.unwrap();
        let spec = catalog::lookup(id).unwrap();
        assert_eq!(sketch.params.size, spec.radius);
        assert!(sketch.tool.bbox().min[2] < 0.0);
    }

    #[test]
    fn hosts_follow_the_feature_family() {
        let stock = Aabb::new([0.0; 3], [100.0, 80.0, 50.0]);
        let faces = [
            face([0.0, 0.0, 1.0], [0.0, 0.0, 50.0], [100.0, 80.0, 50.0]),
            face([0.0, 0.0, 1.0], [20.0, 20.0, 30.0], [60.0, 60.0, 30.0]),
            face([0.0, -1.0, 0.0], [0.0, 0.0, 0.0], [100.0, 0.0, 50.0]),
        ];
        let bounds = derive_bounds(&faces, &stock, 2.0);
        let edge = EdgeCandidate {
            start: [0.0, 0.0, 50.0],
            end: [100.0, 0.0, 50.0],
            n1: [0.0, 0.0, 1.0],
            n2: [0.0, -1.0, 0.0],
            limit: 25.0,
        };
        let registry = FeatureRegistry::standard();
        let edges = [edge];

        let pocket = registry.get(FeatureKind::RectangularPocket).unwrap();
        assert_eq!(pocket.find_bounds(&bounds, &edges, None).len(), 3);
        assert_eq!(
            pocket
                .find_bounds(&bounds, &edges, Some([0.0, -1.0, 0.0]))
                .len(),
            1
        );

        let slot = registry.get(FeatureKind::RectangularThroughSlot).unwrap();
        assert_eq!(slot.find_bounds(&bounds, &edges, None).len(), 2);

        let chamfer = registry.get(FeatureKind::Chamfer).unwrap();
        let hosts = chamfer.find_bounds(&bounds, &edges, None);
        assert!(matches!(hosts.as_slice(), [Host::Edge(_)]));
    }

    #[test]
    fn wrong_host_is_rejected() {
        let params = SketchParams::default();
        let ctx = SketchContext {
            params: &params,
            stock: Aabb::new([0.0; 3], [10.0; 3]),
            through_depth: None,
        };
        let edge = Host::Edge(EdgeCandidate {
            start: [0.0, 0.0, 10.0],
            end: [10.0, 0.0, 10.0],
            n1: [0.0, 0.0, 1.0],
            n2: [0.0, -1.0, 0.0],
            limit: 5.0,
        });
        let registry = FeatureRegistry::standard();
        let mut rng = StdRng::seed_from_u64(0);
        let err = registry
            .get(FeatureKind::BlindHole)
            .unwrap()
            .build_profile(&edge, &ctx, &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            SketchError::WrongHost {
                kind: FeatureKind::BlindHole
            }
        );
    }
}
