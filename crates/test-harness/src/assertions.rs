//! Assertion helpers with diagnostic output.

use crate::helpers::{class_count, HarnessError};
use crate::oracle::OracleVerdict;

/// Fail with the first failing verdict, naming the context.
pub fn assert_all_pass(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    match verdicts.iter().find(|v| !v.passed) {
        Some(v) => Err(HarnessError::OracleFailure {
            oracle: v.oracle_name.clone(),
            detail: format!("[{ctx}] {}", v.detail),
        }),
        None => Ok(()),
    }
}

/// Assert exactly `expected` faces carry `class`.
pub fn assert_class_count(
    labels: &[u32],
    class: u32,
    expected: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let actual = class_count(labels, class);
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{ctx}] expected {expected} faces of class {class}, got {actual} in {labels:?}"
            ),
        })
    }
}

/// Assert exactly `expected` faces are flagged bottom.
pub fn assert_bottom_count(bottom: &[bool], expected: usize, ctx: &str) -> Result<(), HarnessError> {
    let actual = bottom.iter().filter(|&&b| b).count();
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!("[{ctx}] expected {expected} bottom faces, got {actual}"),
        })
    }
}
