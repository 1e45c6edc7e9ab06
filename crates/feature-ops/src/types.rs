use brep_kernel::KernelError;
use serde::{Deserialize, Serialize};
use synth_types::{Aabb, FeatureKind};

/// Errors from drawing a profile on one host.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SketchError {
    #[error("bound {width:.3} x {height:.3} leaves no room inside clearance {clearance}")]
    BoundTooSmall {
        width: f64,
        height: f64,
        clearance: f64,
    },

    #[error("profile size {size:.3} exceeds limit {limit:.3}")]
    DoesNotFit { size: f64, limit: f64 },

    #[error("host face has no open side for this feature")]
    NoOpenSide,

    #[error("feature {kind} cannot be placed on this host")]
    WrongHost { kind: FeatureKind },
}

/// Errors from feature operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("sketch error: {0}")]
    Sketch(#[from] SketchError),

    #[error("no valid placement for {kind}")]
    NoPlacement { kind: FeatureKind },

    #[error("no convex edge left for {kind}")]
    NoEdges { kind: FeatureKind },

    #[error("cut produced no face on the tool surfaces")]
    NoEffect,
}

/// Analytic support of one tool surface.
///
/// Plane normals are oriented the way the face bounds the part after
/// subtraction, i.e. pointing into the removed volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Support {
    Plane { normal: [f64; 3], offset: f64 },
    Cylinder {
        center: [f64; 3],
        axis: [f64; 3],
        radius: f64,
    },
}

/// Where a tool surface sits on the removal prism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceRole {
    /// The cap on the profile plane.
    Entry,
    /// A lateral face swept from one profile segment.
    Wall { loop_index: usize, segment: usize },
    /// The cap at the far end of the sweep.
    Floor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSurface {
    pub support: Support,
    /// Box enclosing the whole surface patch.
    pub extent: Aabb,
    pub role: SurfaceRole,
}

/// Which tool surfaces become bottom faces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BottomRule {
    #[default]
    None,
    /// The far cap (blind floors).
    FarCap,
    /// Lateral faces swept from these outer-loop segments.
    Segments(Vec<usize>),
}

impl BottomRule {
    pub fn is_bottom(&self, role: SurfaceRole) -> bool {
        match (self, role) {
            (BottomRule::FarCap, SurfaceRole::Floor) => true,
            (BottomRule::Segments(ids), SurfaceRole::Wall { loop_index: 0, segment }) => {
                ids.contains(&segment)
            }
            _ => false,
        }
    }
}

/// Parameters chosen for one placed feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureParams {
    pub kind: FeatureKind,
    /// Center (inner features), attachment point (slots, steps) or edge
    /// midpoint (transitions), on the host surface.
    pub anchor: [f64; 3],
    /// Characteristic size: radius, half width or chamfer distance.
    pub size: f64,
    /// Removal depth below the host surface.
    pub depth: f64,
    /// Outward normal of the host face; edge direction for transitions.
    pub axis: [f64; 3],
    /// Catalog id of the fastener sized into a through hole.
    pub fastener: Option<u32>,
}
