//! Test harness for dataset synthesis.
//!
//! # Key Components
//!
//! - [`Scenario`]: a kernel plus synthesizer for scripted runs
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`report`]: structured text sample descriptions
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;

pub use helpers::{block_config, fixed_config, HarnessError, Scenario};
pub use oracle::OracleVerdict;
pub use report::SampleReport;
