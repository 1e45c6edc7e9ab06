//! synth-dataset: generate labeled machining-feature samples.
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`):
//!
//! ```bash
//! RUST_LOG=feature_synth=debug synth-dataset generate -o data -n 100
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use brep_kernel::{MockKernel, TruckKernel};
use clap::{Parser, Subcommand, ValueEnum};
use dataset_io::{relabel_dir, run, write_split, DatasetLayout, DriverOptions, RelabelMap};
use feature_synth::{SynthesisConfig, Synthesizer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "synth-dataset")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Weighted five-kind catalog plus a through hole
    Tiny,
    /// Uniform over all 24 kinds
    Large,
}

#[derive(Clone, Copy, ValueEnum)]
enum KernelChoice {
    /// B-rep kernel
    Truck,
    /// Approximate sampling kernel, for dry runs
    Mock,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize samples and write STEP and label files
    Generate {
        /// Dataset root
        #[arg(short, long)]
        output: PathBuf,

        /// Number of samples
        #[arg(short = 'n', long, default_value = "600")]
        samples: usize,

        /// JSON configuration; overrides the preset
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "tiny")]
        preset: Preset,

        /// Base seed
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Directory of fastener templates named `<catalog id>.json`
        #[arg(long)]
        templates: Option<PathBuf>,

        #[arg(long, default_value = "truck")]
        kernel: KernelChoice,
    },

    /// Remap class ids of label files (26->2, 25->3, 1->4, else 0)
    Relabel {
        /// Directory of label JSON files
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write train.txt and test.txt for a dataset root
    Split {
        /// Dataset root
        root: PathBuf,

        /// Fraction of samples for training
        #[arg(long, default_value = "0.8")]
        ratio: f64,

        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn generate(
    output: PathBuf,
    samples: usize,
    config: Option<PathBuf>,
    preset: Preset,
    seed: Option<u64>,
    threads: Option<usize>,
    templates: Option<PathBuf>,
    kernel: KernelChoice,
) -> Result<()> {
    let mut config = match config {
        Some(path) => SynthesisConfig::load(&path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => match preset {
            Preset::Tiny => SynthesisConfig::tiny(),
            Preset::Large => SynthesisConfig::large(),
        },
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if templates.is_some() {
        config.template_dir = templates;
    }
    let synth = Synthesizer::new(config).context("invalid configuration")?;

    let options = DriverOptions {
        threads,
        ..DriverOptions::new(&output, samples)
    };
    let report = match kernel {
        KernelChoice::Truck => run(&synth, &options, TruckKernel::new),
        KernelChoice::Mock => run(&synth, &options, MockKernel::new),
    }
    .with_context(|| format!("generation into {} failed", output.display()))?;

    println!(
        "{} written, {} abandoned, {} discarded, {} failed",
        report.written.len(),
        report.abandoned,
        report.discarded,
        report.failed
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Generate {
            output,
            samples,
            config,
            preset,
            seed,
            threads,
            templates,
            kernel,
        } => generate(output, samples, config, preset, seed, threads, templates, kernel),
        Commands::Relabel { input, output } => {
            let n = relabel_dir(&input, &output, &RelabelMap::default())
                .with_context(|| format!("failed to relabel {}", input.display()))?;
            println!("{n} label files written to {}", output.display());
            Ok(())
        }
        Commands::Split { root, ratio, seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let (train, test) = write_split(&DatasetLayout::new(&root), ratio, &mut rng)
                .with_context(|| format!("failed to split {}", root.display()))?;
            println!("{train} train, {test} test");
            Ok(())
        }
    }
}
