//! Remapping class ids of written label files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DatasetError;
use crate::reader::read_labels;
use crate::writer::write_json;

/// Marks one face of every exported companion after remapping.
///
/// Companions are the trailing faces of a sample, `faces` each. When the
/// remapped array holds exactly `n * faces` faces of `class` (one to three
/// companions), the face `offset` from the end of each companion block
/// becomes `mark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionMark {
    pub class: u32,
    pub mark: u32,
    pub faces: usize,
    pub offset: usize,
}

/// Most companion blocks a sample can carry.
const MAX_MARKED: usize = 3;

impl CompanionMark {
    pub fn apply(&self, labels: &mut [u32]) {
        if self.faces == 0 {
            return;
        }
        let count = labels.iter().filter(|&&l| l == self.class).count();
        if count == 0 || count % self.faces != 0 || count / self.faces > MAX_MARKED {
            return;
        }
        for block in 0..count / self.faces {
            let Some(index) = labels.len().checked_sub(self.offset + block * self.faces) else {
                continue;
            };
            if let Some(label) = labels.get_mut(index).filter(|l| **l == self.class) {
                *label = self.mark;
            }
        }
    }
}

/// Class remap with a fallback for unlisted ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelabelMap {
    pub map: BTreeMap<u32, u32>,
    pub fallback: u32,
    pub companion: Option<CompanionMark>,
}

impl Default for RelabelMap {
    /// Fastener, fastened hole and through hole to 2, 3 and 4; the rest to 0.
    /// The fourth face from the end of each five-face fastener becomes 1.
    fn default() -> Self {
        Self {
            map: BTreeMap::from([(26, 2), (25, 3), (1, 4)]),
            fallback: 0,
            companion: Some(CompanionMark {
                class: 2,
                mark: 1,
                faces: 5,
                offset: 4,
            }),
        }
    }
}

impl RelabelMap {
    pub fn apply(&self, label: u32) -> u32 {
        self.map.get(&label).copied().unwrap_or(self.fallback)
    }

    /// Remap every label, then mark companion faces.
    pub fn apply_all(&self, labels: &[u32]) -> Vec<u32> {
        let mut out: Vec<u32> = labels.iter().map(|&l| self.apply(l)).collect();
        if let Some(mark) = &self.companion {
            mark.apply(&mut out);
        }
        out
    }
}

/// Remap every `*.json` label file in `input` into `output`. Returns the
/// number of files written.
pub fn relabel_dir(input: &Path, output: &Path, map: &RelabelMap) -> Result<usize, DatasetError> {
    fs::create_dir_all(output).map_err(|e| DatasetError::io(output, e))?;
    let entries = fs::read_dir(input).map_err(|e| DatasetError::io(input, e))?;
    let mut written = 0;
    for entry in entries {
        let path = entry.map_err(|e| DatasetError::io(input, e))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let labels = read_labels(&path)?;
        write_json(&output.join(file_name), &map.apply_all(&labels))?;
        written += 1;
    }
    info!(written, input = %input.display(), "label files remapped");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_keeps_fastener_classes() {
        let map = RelabelMap::default();
        assert_eq!(map.apply_all(&[26, 25, 1, 24, 0, 30]), vec![2, 3, 4, 0, 0, 0]);
    }

    #[test]
    fn one_fastener_gets_a_marked_face() {
        let map = RelabelMap::default();
        let labels = [24, 25, 25, 26, 26, 26, 26, 26];
        assert_eq!(map.apply_all(&labels), vec![0, 3, 3, 2, 1, 2, 2, 2]);
    }

    #[test]
    fn two_fasteners_get_one_marked_face_each() {
        let map = RelabelMap::default();
        let mut labels = vec![24, 1];
        labels.extend([26; 5]);
        labels.extend([27; 5]);
        // the marked position falls on the remapped 27 block
        assert_eq!(map.apply_all(&labels)[2..7], [2, 2, 2, 2, 2]);

        let mut labels = vec![24, 1];
        labels.extend([26; 10]);
        let out = map.apply_all(&labels);
        assert_eq!(out.len(), 12);
        assert_eq!(out[12 - 4], 1);
        assert_eq!(out[12 - 9], 1);
        assert_eq!(out.iter().filter(|&&l| l == 1).count(), 2);
        assert_eq!(out.iter().filter(|&&l| l == 2).count(), 8);
    }

    #[test]
    fn other_fastener_counts_are_left_alone() {
        let map = RelabelMap::default();
        assert_eq!(map.apply_all(&[26, 26, 26, 26]), vec![2, 2, 2, 2]);
        let unmarked = RelabelMap {
            companion: None,
            ..RelabelMap::default()
        };
        assert_eq!(unmarked.apply_all(&[26; 5]), vec![2; 5]);
    }

    #[test]
    fn relabels_a_directory() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::write(src.path().join("a.json"), "[1,24,25]").unwrap();
        fs::write(src.path().join("notes.txt"), "skip").unwrap();

        let n = relabel_dir(src.path(), &dst.path().join("out"), &RelabelMap::default()).unwrap();
        assert_eq!(n, 1);
        let out = read_labels(&dst.path().join("out").join("a.json")).unwrap();
        assert_eq!(out, vec![4, 0, 3]);
    }
}
