use crate::types::*;
use std::path::Path;

/// Core geometry kernel trait. Provides the shape construction and
/// modification operations the synthesis engine needs.
/// Implemented by TruckKernel (wraps real truck) and MockKernel (deterministic test double).
pub trait Kernel {
    /// Axis-aligned box with its minimum corner at `origin`.
    fn make_box(&mut self, origin: [f64; 3], size: [f64; 3]) -> Result<SolidHandle, KernelError>;

    /// Sweep a closed planar profile along `direction` by `length`.
    fn extrude_profile(
        &mut self,
        profile: &Profile,
        direction: [f64; 3],
        length: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn boolean_subtract(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Gather the boundaries of several solids into one multi-body solid
    /// without any Boolean. Face order follows `parts` order.
    fn combine(&mut self, parts: &[SolidHandle]) -> Result<SolidHandle, KernelError>;

    /// Rigidly place a copy of `solid`.
    fn transform(
        &mut self,
        solid: &SolidHandle,
        placement: &RigidTransform,
    ) -> Result<SolidHandle, KernelError>;

    /// Read a solid previously written with `save_solid`.
    fn import_solid(&mut self, path: &Path) -> Result<SolidHandle, KernelError>;

    /// Persist a solid so `import_solid` can read it back.
    fn save_solid(&self, solid: &SolidHandle, path: &Path) -> Result<(), KernelError>;

    /// Serialize to STEP text, naming face entities in enumeration order.
    fn export_step(&self, solid: &SolidHandle, face_names: &[String])
        -> Result<String, KernelError>;

    /// Drop a solid that is no longer needed.
    fn release(&mut self, solid: &SolidHandle);
}

/// Topology introspection trait. Provides read-only queries on kernel geometry.
///
/// Enumeration order is stable for a given solid; per-face label arrays
/// are indexed by it.
pub trait KernelIntrospect {
    /// Fingerprints of all faces, in enumeration order.
    fn face_fingerprints(&self, solid: &SolidHandle) -> Result<Vec<FaceFingerprint>, KernelError>;

    /// All edges, each once, with adjacent face indices.
    fn edges(&self, solid: &SolidHandle) -> Result<Vec<EdgeRecord>, KernelError>;

    fn face_count(&self, solid: &SolidHandle) -> Result<usize, KernelError> {
        Ok(self.face_fingerprints(solid)?.len())
    }
}
