//! Synthesis configuration.
//!
//! One value is built (defaults, a preset, or a JSON file), validated once and
//! then passed explicitly to every synthesis call. Field names follow the
//! parameter file of the dataset generator (`stock_min_x`, `clearance`, ...),
//! and every field may be omitted from JSON.

use std::path::{Path, PathBuf};

use feature_ops::SketchParams;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use synth_types::{FeatureKind, FEATURE_NAMES};

use crate::error::ConfigError;

/// Order in which a combination's features are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceOrder {
    /// Class ids sorted descending.
    #[default]
    Descending,
    /// Steps, slots, through, blind, O-ring, then transitions.
    ByCategory,
}

/// How combinations are drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinationSpec {
    /// Candidate class ids.
    pub candidates: Vec<u32>,
    /// Weight per candidate. Empty means uniform.
    pub weights: Vec<f64>,
    /// Inclusive range of the number of drawn features.
    pub range: [usize; 2],
    /// Append one through hole to every combination.
    pub append_through_hole: bool,
}

impl CombinationSpec {
    /// Common features only: through hole, through step, blind hole,
    /// blind slot, blind step; every sample also gets a through hole.
    pub fn tiny() -> Self {
        Self {
            candidates: vec![1, 8, 12, 17, 22],
            weights: vec![0.2, 0.2, 0.3, 0.3, 0.2],
            range: [3, 5],
            append_through_hole: true,
        }
    }

    /// Uniform over all 24 machining classes.
    pub fn large() -> Self {
        Self {
            candidates: FeatureKind::ALL.iter().map(|k| k.id()).collect(),
            weights: Vec::new(),
            range: [3, 5],
            append_through_hole: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.candidates.is_empty() {
            return Err(invalid("combination.candidates", "no candidate classes"));
        }
        if let Some(id) = self.candidates.iter().find(|&&id| FeatureKind::from_id(id).is_none()) {
            return Err(invalid(
                "combination.candidates",
                format!("{id} is not a machining class"),
            ));
        }
        if !self.weights.is_empty() {
            if self.weights.len() != self.candidates.len() {
                return Err(invalid(
                    "combination.weights",
                    format!(
                        "{} weights for {} candidates",
                        self.weights.len(),
                        self.candidates.len()
                    ),
                ));
            }
            if self.weights.iter().any(|w| !(*w >= 0.0)) || self.weights.iter().sum::<f64>() <= 0.0 {
                return Err(invalid("combination.weights", "weights must be non-negative with a positive sum"));
            }
        }
        if self.range[0] > self.range[1] {
            return Err(invalid(
                "combination.range",
                format!("{} > {}", self.range[0], self.range[1]),
            ));
        }
        Ok(())
    }

    /// Draw one combination.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<FeatureKind>, ConfigError> {
        self.validate()?;
        let count = rng.gen_range(self.range[0]..=self.range[1]);
        let mut ids = Vec::with_capacity(count + 1);
        if self.weights.is_empty() {
            for _ in 0..count {
                ids.push(self.candidates[rng.gen_range(0..self.candidates.len())]);
            }
        } else {
            let dist = WeightedIndex::new(&self.weights)
                .map_err(|e| invalid("combination.weights", e.to_string()))?;
            for _ in 0..count {
                ids.push(self.candidates[dist.sample(rng)]);
            }
        }
        if self.append_through_hole {
            ids.push(FeatureKind::ThroughHole.id());
        }
        Ok(ids.into_iter().filter_map(FeatureKind::from_id).collect())
    }
}

impl Default for CombinationSpec {
    fn default() -> Self {
        Self::tiny()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub stock_min_x: f64,
    pub stock_min_y: f64,
    pub stock_min_z: f64,
    pub stock_max_x: f64,
    pub stock_max_y: f64,
    pub stock_max_z: f64,
    /// Minimum distance between a profile and the sides of its bound.
    pub clearance: f64,
    /// Smallest feature dimension drawn.
    pub min_len: f64,
    /// Tool overshoot past host and exit faces.
    pub margin: f64,
    /// Blind depths stay below this fraction of the material under the host.
    pub blind_depth_fraction: f64,
    /// Class names indexed by class id; the last entry is the stock label.
    pub feat_names: Vec<String>,
    /// Combinations at least this long double the stock minimums.
    pub large_combination: usize,
    /// Factor applied to the stock minimums after each placement failure.
    pub retry_growth: f64,
    pub ordering: SequenceOrder,
    /// Cut a thin slab off one stock side so through holes host a plate.
    pub aux_plate: bool,
    /// Range of the plate thickness.
    pub aux_offset: [f64; 2],
    /// Thickness of the removed slab.
    pub aux_gap: f64,
    /// Directory holding fastener templates named `<catalog id>.json`.
    pub template_dir: Option<PathBuf>,
    /// Most fasteners exported with one sample.
    pub max_companions: usize,
    /// Distance tolerance when matching faces across a cut.
    pub match_tolerance: f64,
    /// Base seed; each sample and attempt derives its own.
    pub seed: u64,
    pub combination: CombinationSpec,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            stock_min_x: 50.0,
            stock_min_y: 50.0,
            stock_min_z: 50.0,
            stock_max_x: 100.0,
            stock_max_y: 100.0,
            stock_max_z: 100.0,
            clearance: 2.0,
            min_len: 2.0,
            margin: 0.5,
            blind_depth_fraction: 0.6,
            feat_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            large_combination: 10,
            retry_growth: 1.5,
            ordering: SequenceOrder::Descending,
            aux_plate: true,
            aux_offset: [10.0, 15.0],
            aux_gap: 1.0,
            template_dir: None,
            max_companions: 3,
            match_tolerance: 0.1,
            seed: 0,
            combination: CombinationSpec::tiny(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl SynthesisConfig {
    pub fn tiny() -> Self {
        Self::default()
    }

    pub fn large() -> Self {
        Self {
            combination: CombinationSpec::large(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SynthesisConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    pub fn stock_min(&self) -> [f64; 3] {
        [self.stock_min_x, self.stock_min_y, self.stock_min_z]
    }

    pub fn stock_max(&self) -> [f64; 3] {
        [self.stock_max_x, self.stock_max_y, self.stock_max_z]
    }

    pub fn sketch_params(&self) -> SketchParams {
        SketchParams {
            clearance: self.clearance,
            min_len: self.min_len,
            margin: self.margin,
            blind_depth_fraction: self.blind_depth_fraction,
        }
    }

    /// Configured name of a class id, falling back to the built-in table.
    pub fn class_name(&self, id: u32) -> &str {
        self.feat_names
            .get(id as usize)
            .map(String::as_str)
            .or_else(|| FEATURE_NAMES.get(id as usize).copied())
            .unwrap_or("unknown")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = (self.stock_min(), self.stock_max());
        for axis in 0..3 {
            if !(lo[axis] > 0.0) {
                return Err(invalid("stock_min", format!("axis {axis} minimum must be positive")));
            }
            if lo[axis] > hi[axis] {
                return Err(invalid(
                    "stock_max",
                    format!("axis {axis}: {} < minimum {}", hi[axis], lo[axis]),
                ));
            }
        }
        if !(self.clearance >= 0.0) {
            return Err(invalid("clearance", "must be non-negative"));
        }
        if !(self.min_len > 0.0) {
            return Err(invalid("min_len", "must be positive"));
        }
        if !(self.margin > 0.0) {
            return Err(invalid("margin", "must be positive"));
        }
        if !(self.blind_depth_fraction > 0.0 && self.blind_depth_fraction <= 1.0) {
            return Err(invalid("blind_depth_fraction", "must lie in (0, 1]"));
        }
        if self.feat_names.len() != FEATURE_NAMES.len() {
            return Err(invalid(
                "feat_names",
                format!("expected {} names, got {}", FEATURE_NAMES.len(), self.feat_names.len()),
            ));
        }
        if !(self.retry_growth >= 1.0) {
            return Err(invalid("retry_growth", "must be at least 1"));
        }
        if self.aux_plate {
            let [a, b] = self.aux_offset;
            if !(a > 0.0 && a <= b) {
                return Err(invalid("aux_offset", format!("bad range [{a}, {b}]")));
            }
            if !(self.aux_gap > 0.0) {
                return Err(invalid("aux_gap", "must be positive"));
            }
            let smallest = lo.iter().copied().fold(f64::MAX, f64::min);
            if b + self.aux_gap >= smallest {
                return Err(invalid(
                    "aux_offset",
                    format!("plate and gap ({}) do not fit the smallest stock side {smallest}", b + self.aux_gap),
                ));
            }
        }
        if !(self.match_tolerance > 0.0) {
            return Err(invalid("match_tolerance", "must be positive"));
        }
        self.combination.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn presets_validate() {
        SynthesisConfig::default().validate().unwrap();
        SynthesisConfig::large().validate().unwrap();
        assert_eq!(SynthesisConfig::large().combination.candidates.len(), 24);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SynthesisConfig::from_json(r#"{"stock_min_x": 60.0, "clearance": 1.5}"#).unwrap();
        assert_eq!(config.stock_min_x, 60.0);
        assert_eq!(config.clearance, 1.5);
        assert_eq!(config.min_len, 2.0);
        assert_eq!(config.class_name(24), "stock");
    }

    #[test]
    fn inverted_stock_range_is_rejected() {
        let config = SynthesisConfig {
            stock_min_y: 120.0,
            ..SynthesisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "stock_max", .. })
        ));
    }

    #[test]
    fn weights_must_match_candidates() {
        let mut spec = CombinationSpec::tiny();
        spec.weights.pop();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn tiny_combinations_end_with_a_through_hole() {
        let spec = CombinationSpec::tiny();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..20 {
            let combo = spec.sample(&mut rng).unwrap();
            assert!((4..=6).contains(&combo.len()));
            assert_eq!(combo.last(), Some(&FeatureKind::ThroughHole));
            assert!(combo.iter().all(|k| spec.candidates.contains(&k.id())));
        }
    }

    #[test]
    fn load_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synth.json");
        std::fs::write(&path, r#"{"seed": 42, "ordering": "by_category"}"#).unwrap();
        let config = SynthesisConfig::load(&path).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.ordering, SequenceOrder::ByCategory);
        assert!(matches!(
            SynthesisConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
