pub mod feature;
pub mod geom;
pub mod sketch;
pub mod topo;

pub use feature::*;
pub use geom::*;
pub use sketch::*;
pub use topo::*;
