//! Structured text reports of synthesized samples.

use std::collections::BTreeMap;
use std::fmt;

use feature_synth::{SynthesisConfig, Synthesized};

use crate::oracle::{label_oracles, OracleVerdict};

/// One applied feature.
pub struct FeatureEntry {
    pub instance: usize,
    pub kind: String,
    pub faces: usize,
    pub depth: f64,
    pub fastener: Option<u32>,
}

pub struct SampleReport {
    pub stock: [f64; 3],
    pub attempts: usize,
    pub seed: u64,
    pub face_count: usize,
    /// Face count per class name.
    pub classes: BTreeMap<String, usize>,
    pub features: Vec<FeatureEntry>,
    pub oracle_results: Vec<OracleVerdict>,
}

impl SampleReport {
    pub fn from_sample(sample: &Synthesized, config: &SynthesisConfig) -> Self {
        let mut classes = BTreeMap::new();
        for label in sample.labels.semantic_labels() {
            *classes.entry(config.class_name(label).to_string()).or_insert(0) += 1;
        }
        let features = sample
            .records
            .iter()
            .map(|r| FeatureEntry {
                instance: r.instance,
                kind: config.class_name(r.kind.id()).to_string(),
                faces: sample.labels.group_indices(r.instance).len(),
                depth: r.params.depth,
                fastener: r.params.fastener,
            })
            .collect();
        Self {
            stock: sample.stock.size(),
            attempts: sample.attempts,
            seed: sample.seed,
            face_count: sample.faces.len(),
            classes,
            features,
            oracle_results: label_oracles(sample),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.oracle_results.iter().all(|v| v.passed)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Sample Report ===\n\n");
        out.push_str(&format!(
            "Stock {:.1} x {:.1} x {:.1}, {} faces, attempt {} (seed {})\n\n",
            self.stock[0], self.stock[1], self.stock[2], self.face_count, self.attempts, self.seed,
        ));

        out.push_str(&format!("Features ({}):\n", self.features.len()));
        for f in &self.features {
            out.push_str(&format!(
                "  [{}] {} faces={} depth={:.2}",
                f.instance, f.kind, f.faces, f.depth
            ));
            if let Some(id) = f.fastener {
                out.push_str(&format!(" fastener={id}"));
            }
            out.push('\n');
        }

        out.push_str("\nClasses:\n");
        for (name, count) in &self.classes {
            out.push_str(&format!("  {name}: {count}\n"));
        }

        let passed = self.oracle_results.iter().filter(|v| v.passed).count();
        out.push_str(&format!(
            "\nOracles ({}/{} passed):\n",
            passed,
            self.oracle_results.len()
        ));
        for v in &self.oracle_results {
            let status = if v.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
        }
        out
    }
}

impl fmt::Display for SampleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
