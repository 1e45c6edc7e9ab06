use brep_kernel::KernelError;
use feature_ops::OpError;
use synth_types::FeatureKind;

/// Violations of the label-map invariants. Always fatal for a sample.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LabelError {
    #[error("{labels} labels for {faces} faces")]
    CardinalityMismatch { labels: usize, faces: usize },

    #[error("face {index} has no semantic label")]
    MissingLabel { index: usize },

    #[error("face {index} belongs to more than one instance group")]
    OverlappingGroups { index: usize },

    #[error("instance relation is not symmetric at ({a}, {b})")]
    AsymmetricRelation { a: usize, b: usize },

    #[error("faces {a} and {b} are related but their groups differ")]
    NotAClique { a: usize, b: usize },

    #[error("bottom face {index} belongs to no instance group")]
    OrphanBottom { index: usize },
}

/// Invalid or unreadable configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

/// Errors from synthesizing one sample.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SynthesisError {
    #[error("label error: {0}")]
    Label(#[from] LabelError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("no implementation registered for {kind}")]
    Unregistered { kind: FeatureKind },

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("feature operation failed: {0}")]
    Op(#[from] OpError),

    #[error("no valid placement for {kind}")]
    NoPlacement { kind: FeatureKind },

    #[error("no convex edge left for {kind}")]
    EdgesExhausted { kind: FeatureKind },
}

impl SynthesisError {
    /// Fatal errors discard the sample; the rest end one attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SynthesisError::Label(_) | SynthesisError::Config(_) | SynthesisError::Unregistered { .. }
        )
    }

    /// Failures that a larger stock may fix.
    pub fn is_placement_failure(&self) -> bool {
        matches!(
            self,
            SynthesisError::NoPlacement { .. } | SynthesisError::EdgesExhausted { .. }
        )
    }
}
