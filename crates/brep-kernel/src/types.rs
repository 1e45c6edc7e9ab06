// Re-export shared types from synth-types
pub use synth_types::{EdgeRecord, FaceFingerprint, Profile, Segment, SurfaceKind};

use synth_types::{add, rotate_about};

/// Opaque handle to a solid in the geometry kernel.
/// Valid only for the kernel instance that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolidHandle(pub(crate) u64);

impl SolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Rigid placement: rotation about the line through `center` along `axis`,
/// followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub center: [f64; 3],
    pub axis: [f64; 3],
    /// Rotation angle in radians.
    pub angle: f64,
    pub translation: [f64; 3],
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            center: [0.0; 3],
            axis: [0.0, 0.0, 1.0],
            angle: 0.0,
            translation: [0.0; 3],
        }
    }

    pub fn translation(v: [f64; 3]) -> Self {
        Self {
            translation: v,
            ..Self::identity()
        }
    }

    pub fn apply_point(&self, p: [f64; 3]) -> [f64; 3] {
        add(rotate_about(p, self.center, self.axis, self.angle), self.translation)
    }

    pub fn apply_vector(&self, v: [f64; 3]) -> [f64; 3] {
        rotate_about(v, [0.0; 3], self.axis, self.angle)
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("invalid profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("solid not found: {handle}")]
    SolidNotFound { handle: u64 },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("i/o error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}

impl KernelError {
    pub(crate) fn missing(handle: &SolidHandle) -> Self {
        KernelError::SolidNotFound { handle: handle.id() }
    }
}
