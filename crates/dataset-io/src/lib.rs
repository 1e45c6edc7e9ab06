pub mod assemble;
pub mod driver;
pub mod error;
pub mod reader;
pub mod relabel;
pub mod split;
pub mod writer;

pub use assemble::{assemble, Assembly};
pub use driver::{generate_sample, run, DriverOptions, DriverReport, Outcome};
pub use error::DatasetError;
pub use reader::{check_sample, read_label1s, read_labels, read_step_labels};
pub use relabel::{relabel_dir, RelabelMap};
pub use split::{split_names, write_split, DEFAULT_TRAIN_RATIO};
pub use writer::{write_sample, DatasetLayout, SampleLabels};
