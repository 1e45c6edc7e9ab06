use std::path::Path;

use brep_kernel::KernelError;
use feature_synth::SynthesisError;

/// Errors while assembling, writing or reading dataset files.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DatasetError {
    #[error("i/o error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed JSON in {path}: {message}")]
    Json { path: String, message: String },

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("{step} STEP faces but {labels} labels")]
    Misaligned { step: usize, labels: usize },

    #[error("unreadable STEP file {path}: {message}")]
    Step { path: String, message: String },

    #[error("face name {name:?} is not a class id")]
    BadFaceName { name: String },

    #[error("thread pool: {0}")]
    Pool(String),
}

impl DatasetError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        DatasetError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn json(path: &Path, err: serde_json::Error) -> Self {
        DatasetError::Json {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
