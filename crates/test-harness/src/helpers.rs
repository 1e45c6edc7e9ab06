//! Helper functions: error type, fixed-stock configurations, scenario runner.

use brep_kernel::{MockKernel, TruckKernel};
use feature_ops::KernelBundle;
use feature_synth::{SynthesisConfig, Synthesized, Synthesizer};
use synth_types::FeatureKind;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("synthesis error: {0}")]
    Synthesis(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("no sample: {reason}")]
    NoSample { reason: String },
}

// ── Configurations ──────────────────────────────────────────────────────────

/// Default configuration with the stock pinned to `size` and no plate cut.
pub fn fixed_config(size: [f64; 3]) -> SynthesisConfig {
    SynthesisConfig {
        stock_min_x: size[0],
        stock_max_x: size[0],
        stock_min_y: size[1],
        stock_max_y: size[1],
        stock_min_z: size[2],
        stock_max_z: size[2],
        aux_plate: false,
        ..SynthesisConfig::default()
    }
}

/// The 100 x 80 x 50 block most scenarios start from.
pub fn block_config() -> SynthesisConfig {
    fixed_config([100.0, 80.0, 50.0])
}

// ── Scenario Runner ─────────────────────────────────────────────────────────

/// One kernel plus a synthesizer, for scripted scenarios.
pub struct Scenario<K: KernelBundle> {
    kernel: K,
    synth: Synthesizer,
}

impl Scenario<MockKernel> {
    pub fn mock(config: SynthesisConfig) -> Result<Self, HarnessError> {
        Self::with_kernel(MockKernel::new(), config)
    }
}

impl Scenario<TruckKernel> {
    pub fn truck(config: SynthesisConfig) -> Result<Self, HarnessError> {
        Self::with_kernel(TruckKernel::new(), config)
    }
}

impl<K: KernelBundle> Scenario<K> {
    pub fn with_kernel(kernel: K, config: SynthesisConfig) -> Result<Self, HarnessError> {
        let synth = Synthesizer::new(config).map_err(|e| HarnessError::Synthesis(e.to_string()))?;
        Ok(Self { kernel, synth })
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    pub fn config(&self) -> &SynthesisConfig {
        self.synth.config()
    }

    /// Synthesize; `Ok(None)` when every attempt failed.
    pub fn try_run(
        &mut self,
        kinds: &[FeatureKind],
        seed: u64,
    ) -> Result<Option<Synthesized>, HarnessError> {
        self.synth
            .synthesize(&mut self.kernel, kinds, seed)
            .map_err(|e| HarnessError::Synthesis(e.to_string()))
    }

    /// Synthesize and require a sample.
    pub fn run(&mut self, kinds: &[FeatureKind], seed: u64) -> Result<Synthesized, HarnessError> {
        self.try_run(kinds, seed)?.ok_or_else(|| HarnessError::NoSample {
            reason: format!("{kinds:?} with seed {seed} exhausted its retries"),
        })
    }
}

/// Number of faces labeled `class`.
pub fn class_count(labels: &[u32], class: u32) -> usize {
    labels.iter().filter(|&&l| l == class).count()
}
