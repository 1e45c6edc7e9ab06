//! Reading written samples back.

use std::fs;
use std::path::Path;

use brep_kernel::step::read_face_names;
use serde::de::DeserializeOwned;

use crate::error::DatasetError;
use crate::writer::{DatasetLayout, SampleLabels};

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let text = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| DatasetError::json(path, e))
}

/// Face labels from the face entity names of a STEP file, ordered by
/// entity id.
pub fn read_step_labels(path: &Path) -> Result<Vec<u32>, DatasetError> {
    let text = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    read_face_names(&text)
        .map_err(|e| DatasetError::Step {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
        .into_iter()
        .map(|name| {
            name.trim()
                .parse()
                .map_err(|_| DatasetError::BadFaceName { name })
        })
        .collect()
}

pub fn read_labels(path: &Path) -> Result<Vec<u32>, DatasetError> {
    read_json(path)
}

pub fn read_label1s(path: &Path) -> Result<Vec<(String, SampleLabels)>, DatasetError> {
    read_json(path)
}

/// Check that a sample's STEP face names and label array agree face by face.
pub fn check_sample(layout: &DatasetLayout, name: &str) -> Result<Vec<u32>, DatasetError> {
    let step = read_step_labels(&layout.step_path(name))?;
    let labels = read_labels(&layout.labels_path(name))?;
    if step != labels {
        return Err(DatasetError::Misaligned {
            step: step.len(),
            labels: labels.len(),
        });
    }
    Ok(labels)
}
