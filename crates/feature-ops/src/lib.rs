pub mod bound;
pub mod catalog;
pub mod cut;
pub mod diff;
pub mod edges;
pub mod feature;
pub mod kernel_ext;
pub mod sketch;
pub mod tool;
pub mod types;

pub use bound::{derive_bounds, extent_below, face_on_stock_boundary, Bound, BoundFrame};
pub use catalog::{FastenerSpec, FASTENER_CATALOG};
pub use cut::{execute_cut, CutResult};
pub use diff::{classify, FaceOrigin};
pub use edges::{convex_edges, EdgeCandidate};
pub use feature::{FeatureRegistry, Host, MachiningFeature};
pub use kernel_ext::KernelBundle;
pub use sketch::{Sketch, SketchContext, SketchParams};
pub use tool::RemovalTool;
pub use types::*;
