//! Parallel dataset generation.
//!
//! Samples run on a rayon pool; every sample builds its own kernel, so the
//! only shared state is the read-only synthesizer.

use std::path::PathBuf;

use feature_ops::KernelBundle;
use feature_synth::{SynthesisError, Synthesized, Synthesizer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::assemble::assemble;
use crate::error::DatasetError;
use crate::writer::{write_sample, DatasetLayout};

/// Whole-sample retries after synthesis gives up.
pub const SAMPLE_RETRIES: usize = 3;

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub output: PathBuf,
    pub samples: usize,
    /// Worker threads; rayon's default when `None`.
    pub threads: Option<usize>,
    pub sample_retries: usize,
    /// Name prefix; the current local time when `None`.
    pub timestamp: Option<String>,
}

impl DriverOptions {
    pub fn new(output: impl Into<PathBuf>, samples: usize) -> Self {
        Self {
            output: output.into(),
            samples,
            threads: None,
            sample_retries: SAMPLE_RETRIES,
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written(String),
    /// Every retry ran out of attempts.
    Abandoned,
    /// A fatal synthesis error.
    Discarded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverReport {
    pub written: Vec<String>,
    pub abandoned: usize,
    pub discarded: usize,
    /// Samples whose files could not be written.
    pub failed: usize,
}

pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn sample_name(stamp: &str, index: usize) -> String {
    format!("{stamp}_{index}")
}

/// Seed of one try of one sample.
pub fn sample_seed(base: u64, index: usize, retry: usize) -> u64 {
    base.wrapping_mul(0x5851_F42D_4C95_7F2D)
        .wrapping_add((index as u64) << 8)
        .wrapping_add(retry as u64)
}

fn export(
    kb: &mut dyn KernelBundle,
    layout: &DatasetLayout,
    name: &str,
    sample: &Synthesized,
    max_companions: usize,
) -> Result<(), DatasetError> {
    let assembly = assemble(kb, sample, max_companions)?;
    let written = write_sample(kb, layout, name, &assembly);
    assembly.release(kb);
    written
}

/// Synthesize and write one sample, retrying the whole sample with a new
/// combination when synthesis gives up.
#[instrument(skip(kb, synth, layout))]
pub fn generate_sample(
    kb: &mut dyn KernelBundle,
    synth: &Synthesizer,
    layout: &DatasetLayout,
    name: &str,
    index: usize,
    retries: usize,
) -> Result<Outcome, DatasetError> {
    let config = synth.config();
    for retry in 0..retries {
        let seed = sample_seed(config.seed, index, retry);
        let mut rng = StdRng::seed_from_u64(seed);
        let combination = config
            .combination
            .sample(&mut rng)
            .map_err(SynthesisError::from)?;
        match synth.synthesize(kb, &combination, seed) {
            Ok(Some(sample)) => {
                let exported = export(kb, layout, name, &sample, config.max_companions);
                sample.release(kb);
                exported?;
                return Ok(Outcome::Written(name.to_string()));
            }
            Ok(None) => warn!(retry, "sample gave up, retrying"),
            Err(e) => {
                warn!(error = %e, "sample discarded");
                return Ok(Outcome::Discarded);
            }
        }
    }
    warn!(retries, "sample abandoned");
    Ok(Outcome::Abandoned)
}

/// Generate `options.samples` samples into `options.output`.
pub fn run<K, F>(
    synth: &Synthesizer,
    options: &DriverOptions,
    make_kernel: F,
) -> Result<DriverReport, DatasetError>
where
    K: KernelBundle,
    F: Fn() -> K + Sync,
{
    let layout = DatasetLayout::new(&options.output);
    layout.create()?;
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = options.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|e| DatasetError::Pool(e.to_string()))?;
    let stamp = options.timestamp.clone().unwrap_or_else(timestamp);
    info!(samples = options.samples, output = %options.output.display(), "generating");

    let outcomes: Vec<Result<Outcome, DatasetError>> = pool.install(|| {
        (0..options.samples)
            .into_par_iter()
            .map(|index| {
                let mut kernel = make_kernel();
                let name = sample_name(&stamp, index);
                generate_sample(&mut kernel, synth, &layout, &name, index, options.sample_retries)
            })
            .collect()
    });

    let mut report = DriverReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(Outcome::Written(name)) => report.written.push(name),
            Ok(Outcome::Abandoned) => report.abandoned += 1,
            Ok(Outcome::Discarded) => report.discarded += 1,
            Err(e) => {
                warn!(error = %e, "sample failed");
                report.failed += 1;
            }
        }
    }
    report.written.sort();
    info!(
        written = report.written.len(),
        abandoned = report.abandoned,
        discarded = report.discarded,
        failed = report.failed,
        "generation finished"
    );
    Ok(report)
}
