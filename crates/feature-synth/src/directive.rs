//! Sequence orchestration: stock, ordering, the per-feature loop and the
//! bounded retry around it.

use brep_kernel::{KernelError, SolidHandle};
use feature_ops::catalog;
use feature_ops::{convex_edges, EdgeCandidate, FeatureRegistry, Host, KernelBundle};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use synth_types::*;
use tracing::{debug, info, instrument, warn};

use crate::config::{SequenceOrder, SynthesisConfig};
use crate::error::{ConfigError, SynthesisError};
use crate::fastener::{build_companion, FastenerRecord, FastenerRegistry};
use crate::instance::{add_feature, FeatureRecord, Placement, Workpiece};
use crate::labels::LabelMaps;
use crate::stock::{draw_aux, draw_stock_size, AuxSlab, AUX_SIDES};

/// Golden-ratio increment separating attempt seeds.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed of one attempt of a sample.
pub fn attempt_seed(base: u64, attempt: usize) -> u64 {
    base.wrapping_add((attempt as u64 + 1).wrapping_mul(SEED_STRIDE))
}

/// Class ids, highest first.
pub fn sort_descending(combination: &[FeatureKind]) -> Vec<FeatureKind> {
    let mut ordered = combination.to_vec();
    ordered.sort_by(|a, b| b.cmp(a));
    ordered
}

/// Steps, slots, through, blind, O-rings, then transitions; descending ids
/// within a category.
pub fn rearrange_by_category(combination: &[FeatureKind]) -> Vec<FeatureKind> {
    let mut ordered = sort_descending(combination);
    ordered.sort_by_key(|k| k.category());
    ordered
}

/// A finished sample. The caller owns the solid and the companions.
#[derive(Debug)]
pub struct Synthesized {
    pub solid: SolidHandle,
    pub faces: Vec<FaceFingerprint>,
    pub labels: LabelMaps,
    pub records: Vec<FeatureRecord>,
    pub fasteners: FastenerRegistry,
    pub stock: Aabb,
    pub aux: Option<AuxSlab>,
    /// Attempts used, including the successful one.
    pub attempts: usize,
    pub seed: u64,
}

impl Synthesized {
    pub fn release(mut self, kb: &mut dyn KernelBundle) {
        kb.release(&self.solid);
        self.fasteners.release_all(&mut *kb);
    }
}

pub struct Synthesizer {
    config: SynthesisConfig,
    registry: FeatureRegistry,
}

impl Synthesizer {
    pub fn new(config: SynthesisConfig) -> Result<Self, ConfigError> {
        Self::with_registry(config, FeatureRegistry::standard())
    }

    pub fn with_registry(
        config: SynthesisConfig,
        registry: FeatureRegistry,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn order(&self, combination: &[FeatureKind]) -> Vec<FeatureKind> {
        match self.config.ordering {
            SequenceOrder::Descending => sort_descending(combination),
            SequenceOrder::ByCategory => rearrange_by_category(combination),
        }
    }

    /// Synthesize one sample.
    ///
    /// Placement and kernel failures restart from fresh stock, at most
    /// `combination.len() + 1` times; `Ok(None)` when every attempt failed.
    /// Label and configuration errors end the sample with `Err`.
    #[instrument(skip(self, kb, combination), fields(features = combination.len()))]
    pub fn synthesize(
        &self,
        kb: &mut dyn KernelBundle,
        combination: &[FeatureKind],
        sample_seed: u64,
    ) -> Result<Option<Synthesized>, SynthesisError> {
        if let Some(&kind) = combination.iter().find(|&&k| self.registry.get(k).is_none()) {
            return Err(SynthesisError::Unregistered { kind });
        }
        let ordered = self.order(combination);

        // The plate side is drawn once per sample.
        let mut sample_rng = StdRng::seed_from_u64(sample_seed);
        let side = *AUX_SIDES.choose(&mut sample_rng).unwrap_or(&AUX_SIDES[0]);

        let mut growth = 1.0;
        for attempt in 0..=ordered.len() {
            let seed = attempt_seed(sample_seed, attempt);
            info!(attempt, seed, growth, "synthesis attempt");
            let mut rng = StdRng::seed_from_u64(seed);
            match self.attempt(kb, &ordered, side, growth, &mut rng) {
                Ok(mut done) => {
                    done.attempts = attempt + 1;
                    done.seed = seed;
                    info!(
                        attempt,
                        faces = done.faces.len(),
                        fasteners = done.fasteners.len(),
                        "sample synthesized"
                    );
                    return Ok(Some(done));
                }
                Err(e) if e.is_fatal() => {
                    warn!(attempt, error = %e, "sample discarded");
                    return Err(e);
                }
                Err(e) => {
                    if e.is_placement_failure() {
                        growth *= self.config.retry_growth;
                    }
                    warn!(attempt, error = %e, "attempt failed");
                }
            }
        }
        warn!(attempts = ordered.len() + 1, "retries exhausted");
        Ok(None)
    }

    fn attempt(
        &self,
        kb: &mut dyn KernelBundle,
        ordered: &[FeatureKind],
        side: (usize, f64),
        growth: f64,
        rng: &mut StdRng,
    ) -> Result<Synthesized, SynthesisError> {
        let large = ordered.len() >= self.config.large_combination;
        let size = draw_stock_size(&self.config, large, growth, rng);
        let stock = Aabb::new([0.0; 3], size);
        let aux = if self.config.aux_plate {
            draw_aux(&self.config, size, side, rng)
        } else {
            None
        };
        debug!(?size, ?aux, "stock drawn");

        let mut solid = kb.make_box([0.0; 3], size)?;
        if let Some(slab) = &aux {
            solid = cut_slab(kb, solid, slab, &stock, self.config.margin)?;
        }
        let mut work = Workpiece::new(kb, solid, stock, self.config.clearance)?;
        let mut fasteners = FastenerRegistry::new();

        let hint = unit_axis(side.0, -side.1);
        match self.apply_all(kb, &mut work, &mut fasteners, ordered, hint, aux, rng) {
            Ok(()) => Ok(Synthesized {
                solid: work.solid,
                faces: work.faces,
                labels: work.labels,
                records: work.records,
                fasteners,
                stock,
                aux,
                attempts: 0,
                seed: 0,
            }),
            Err(e) => {
                work.release(kb);
                fasteners.release_all(&mut *kb);
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_all(
        &self,
        kb: &mut dyn KernelBundle,
        work: &mut Workpiece,
        fasteners: &mut FastenerRegistry,
        ordered: &[FeatureKind],
        through_hint: [f64; 3],
        aux: Option<AuxSlab>,
        rng: &mut StdRng,
    ) -> Result<(), SynthesisError> {
        let mut pool: Vec<EdgeCandidate> = Vec::new();
        let mut pool_filled = false;
        for &kind in ordered {
            let feature = self
                .registry
                .get(kind)
                .ok_or(SynthesisError::Unregistered { kind })?;

            if kind.is_transition() {
                if kind == FeatureKind::Chamfer || !pool_filled {
                    pool = edge_pool(kb, work)?;
                    pool_filled = true;
                }
                if pool.is_empty() {
                    return Err(SynthesisError::EdgesExhausted { kind });
                }
            }
            let through = kind == FeatureKind::ThroughHole;
            let placement = Placement {
                hint: through.then_some(through_hint),
                find_new_bounds: true,
                edges: if kind.is_transition() { &pool[..] } else { &[] },
                through_depth: aux.filter(|_| through).map(|a| a.through_depth()),
            };
            let record = add_feature(kb, work, feature, &placement, &self.config, rng)?;

            if let Host::Edge(edge) = &record.host {
                pool.retain(|c| c != edge);
            }
            if let Some(id) = record.params.fastener {
                if let Some(spec) = catalog::lookup(id) {
                    let companion = build_companion(
                        kb,
                        spec,
                        self.config.template_dir.as_deref(),
                        record.params.anchor,
                        record.params.axis,
                    )?;
                    fasteners.push(FastenerRecord {
                        anchor: record.params.anchor,
                        radius: spec.radius,
                        head_diameter: spec.head_diameter,
                        origin: spec.origin,
                        axis: record.params.axis,
                        catalog_id: spec.id,
                        instance: record.instance,
                        companion,
                    });
                }
            }
        }
        Ok(())
    }
}

fn edge_pool(kb: &mut dyn KernelBundle, work: &Workpiece) -> Result<Vec<EdgeCandidate>, KernelError> {
    let edges = kb.edges(&work.solid)?;
    Ok(convex_edges(&work.faces, &edges, &work.stock))
}

/// Remove the slab from `base`, consuming it.
fn cut_slab(
    kb: &mut dyn KernelBundle,
    base: SolidHandle,
    slab: &AuxSlab,
    stock: &Aabb,
    margin: f64,
) -> Result<SolidHandle, KernelError> {
    let b = slab.slab_box(stock, margin);
    let tool = match kb.make_box(b.min, b.size()) {
        Ok(tool) => tool,
        Err(e) => {
            kb.release(&base);
            return Err(e);
        }
    };
    let result = kb.boolean_subtract(&base, &tool);
    kb.release(&tool);
    kb.release(&base);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_seeds_differ_and_are_stable() {
        let seeds: Vec<u64> = (0..4).map(|a| attempt_seed(7, a)).collect();
        assert_eq!(seeds, (0..4).map(|a| attempt_seed(7, a)).collect::<Vec<_>>());
        for i in 0..4 {
            for j in i + 1..4 {
                assert_ne!(seeds[i], seeds[j]);
            }
        }
        assert_ne!(attempt_seed(7, 0), attempt_seed(8, 0));
    }

    #[test]
    fn default_order_is_descending() {
        use FeatureKind::*;
        let ordered = sort_descending(&[ThroughHole, Round, BlindHole, Chamfer]);
        assert_eq!(ordered, vec![Round, BlindHole, ThroughHole, Chamfer]);
    }

    #[test]
    fn category_order_puts_steps_first_and_transitions_last() {
        use FeatureKind::*;
        let ordered =
            rearrange_by_category(&[Chamfer, BlindHole, RectangularThroughStep, ORing, ThroughHole]);
        assert_eq!(
            ordered,
            vec![RectangularThroughStep, ThroughHole, BlindHole, ORing, Chamfer]
        );
    }

    #[test]
    fn unknown_kinds_are_fatal() {
        let synth =
            Synthesizer::with_registry(SynthesisConfig::default(), FeatureRegistry::empty()).unwrap();
        let mut kernel = brep_kernel::MockKernel::new();
        let err = synth
            .synthesize(&mut kernel, &[FeatureKind::BlindHole], 1)
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
