//! Dataset layout and per-sample writers.
//!
//! ```text
//! <root>/steps/<name>.step     faces named by their label
//! <root>/labels/<name>.json    flat label array
//! <root>/label1s/<name>.json   [[name, {"seg", "inst", "bottom"}]]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use feature_ops::KernelBundle;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assemble::Assembly;
use crate::error::DatasetError;

pub const STEPS_DIR: &str = "steps";
pub const LABELS_DIR: &str = "labels";
pub const LABEL1S_DIR: &str = "label1s";

/// Full per-face annotation of one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleLabels {
    /// Semantic class per face.
    pub seg: Vec<u32>,
    /// Instance relation matrix.
    pub inst: Vec<Vec<u8>>,
    /// Bottom flag per face.
    pub bottom: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn steps_dir(&self) -> PathBuf {
        self.root.join(STEPS_DIR)
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.root.join(LABELS_DIR)
    }

    pub fn label1s_dir(&self) -> PathBuf {
        self.root.join(LABEL1S_DIR)
    }

    pub fn create(&self) -> Result<(), DatasetError> {
        for dir in [self.steps_dir(), self.labels_dir(), self.label1s_dir()] {
            fs::create_dir_all(&dir).map_err(|e| DatasetError::io(&dir, e))?;
        }
        Ok(())
    }

    pub fn step_path(&self, name: &str) -> PathBuf {
        self.steps_dir().join(format!("{name}.step"))
    }

    pub fn labels_path(&self, name: &str) -> PathBuf {
        self.labels_dir().join(format!("{name}.json"))
    }

    pub fn label1s_path(&self, name: &str) -> PathBuf {
        self.label1s_dir().join(format!("{name}.json"))
    }

    /// Sample names that have a STEP file, sorted.
    pub fn sample_names(&self) -> Result<Vec<String>, DatasetError> {
        let dir = self.steps_dir();
        let entries = fs::read_dir(&dir).map_err(|e| DatasetError::io(&dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| DatasetError::io(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("step") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<(), DatasetError> {
    fs::write(path, text).map_err(|e| DatasetError::io(path, e))
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DatasetError> {
    let json = serde_json::to_string(value).map_err(|e| DatasetError::json(path, e))?;
    write_text(path, &json)
}

/// Write the three files of one sample.
pub fn write_sample(
    kb: &mut dyn KernelBundle,
    layout: &DatasetLayout,
    name: &str,
    assembly: &Assembly,
) -> Result<(), DatasetError> {
    let step = kb.export_step(&assembly.solid, &assembly.face_names())?;
    write_text(&layout.step_path(name), &step)?;
    write_json(&layout.labels_path(name), &assembly.labels.seg)?;
    write_json(&layout.label1s_path(name), &[(name, &assembly.labels)])?;
    debug!(name, faces = assembly.labels.seg.len(), "sample written");
    Ok(())
}
