pub mod config;
pub mod directive;
pub mod disjoint;
pub mod error;
pub mod fastener;
pub mod instance;
pub mod labels;
pub mod stock;

pub use config::{CombinationSpec, SequenceOrder, SynthesisConfig};
pub use directive::{attempt_seed, rearrange_by_category, sort_descending, Synthesized, Synthesizer};
pub use disjoint::{companion_cap, select_companions, Footprint, COMPANION_MARGIN};
pub use error::{ConfigError, LabelError, SynthesisError};
pub use fastener::{build_companion, companion_placement, FastenerRecord, FastenerRegistry};
pub use instance::{add_feature, FeatureRecord, Placement, Workpiece};
pub use labels::{FaceId, LabelMaps};
pub use stock::{draw_aux, draw_stock_size, AuxSlab, AUX_SIDES};
