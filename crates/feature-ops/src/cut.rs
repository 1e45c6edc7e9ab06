use brep_kernel::SolidHandle;
use synth_types::FaceFingerprint;
use tracing::{debug, instrument};

use crate::diff::{self, FaceOrigin};
use crate::kernel_ext::KernelBundle;
use crate::tool::RemovalTool;
use crate::types::OpError;

/// Outcome of one subtraction with per-face provenance.
#[derive(Debug, Clone)]
pub struct CutResult {
    pub handle: SolidHandle,
    /// Faces of the new solid in enumeration order.
    pub faces: Vec<FaceFingerprint>,
    /// Origin of each entry of `faces`.
    pub origins: Vec<FaceOrigin>,
}

impl CutResult {
    /// Indices of faces swept by the tool.
    pub fn tool_faces(&self) -> impl Iterator<Item = usize> + '_ {
        self.origins
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_tool())
            .map(|(i, _)| i)
    }

    /// Indices of tool faces marked as bottoms by the tool's rule.
    pub fn bottom_faces(&self) -> impl Iterator<Item = usize> + '_ {
        self.origins
            .iter()
            .enumerate()
            .filter(|(_, o)| matches!(o, FaceOrigin::Tool { bottom: true, .. }))
            .map(|(i, _)| i)
    }
}

/// Execute a cut.
///
/// Extrudes the tool, subtracts it from `solid` and classifies every face
/// of the result against the tool surfaces and the faces of `solid`. The
/// input solid is left alive; the caller releases it once the cut is
/// accepted.
#[instrument(skip(kb, tool), fields(solid = ?solid))]
pub fn execute_cut(
    kb: &mut dyn KernelBundle,
    solid: &SolidHandle,
    tool: &RemovalTool,
    tol: f64,
) -> Result<CutResult, OpError> {
    let before = kb.as_introspect().face_fingerprints(solid)?;
    let tool_handle = kb.extrude_profile(&tool.profile, tool.direction, tool.length)?;
    let result = kb.boolean_subtract(solid, &tool_handle);
    kb.release(&tool_handle);
    let handle = result?;

    let faces = match kb.as_introspect().face_fingerprints(&handle) {
        Ok(faces) => faces,
        Err(e) => {
            kb.release(&handle);
            return Err(e.into());
        }
    };
    let origins = diff::classify(&before, &faces, tool, tol);
    let cut = CutResult {
        handle,
        faces,
        origins,
    };
    if cut.tool_faces().next().is_none() {
        kb.release(&cut.handle);
        return Err(OpError::NoEffect);
    }
    debug!(
        before = before.len(),
        after = cut.faces.len(),
        tool_faces = cut.tool_faces().count(),
        "cut classified"
    );
    Ok(cut)
}
