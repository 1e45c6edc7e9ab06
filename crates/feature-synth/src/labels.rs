//! Per-face labels with stable synthetic face ids.
//!
//! Kernel face objects do not survive a Boolean, so every face gets a
//! [`FaceId`] that is re-bound after each cut from the cut's face
//! provenance. Semantic class, bottom flag and instance membership are keyed
//! by that id.

use std::collections::{BTreeMap, BTreeSet};

use feature_ops::FaceOrigin;
use serde::{Deserialize, Serialize};
use synth_types::{FaceFingerprint, STOCK_LABEL};

use crate::error::LabelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u32);

#[derive(Debug, Clone, Default)]
pub struct LabelMaps {
    /// Id of each face in current enumeration order.
    faces: Vec<FaceId>,
    semantic: BTreeMap<FaceId, u32>,
    bottom: BTreeMap<FaceId, bool>,
    /// Instance groups, indexed by instance.
    groups: Vec<Vec<FaceId>>,
    next_id: u32,
}

impl LabelMaps {
    /// Maps for a fresh solid whose faces are all stock.
    pub fn stock(face_count: usize) -> Self {
        let mut maps = Self::default();
        let faces: Vec<FaceId> = (0..face_count).map(|_| maps.fresh_stock()).collect();
        maps.faces = faces;
        maps
    }

    fn fresh_stock(&mut self) -> FaceId {
        let id = FaceId(self.next_id);
        self.next_id += 1;
        self.semantic.insert(id, STOCK_LABEL);
        self.bottom.insert(id, false);
        id
    }

    /// Fresh id carrying the labels and group membership of `from`.
    fn fresh_copy(&mut self, from: FaceId) -> FaceId {
        let id = FaceId(self.next_id);
        self.next_id += 1;
        let semantic = self.semantic.get(&from).copied().unwrap_or(STOCK_LABEL);
        let bottom = self.bottom.get(&from).copied().unwrap_or(false);
        self.semantic.insert(id, semantic);
        self.bottom.insert(id, bottom);
        for group in &mut self.groups {
            if group.contains(&from) {
                group.push(id);
            }
        }
        id
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn id_at(&self, index: usize) -> Option<FaceId> {
        self.faces.get(index).copied()
    }

    pub fn index_of(&self, id: FaceId) -> Option<usize> {
        self.faces.iter().position(|&f| f == id)
    }

    pub fn instance_count(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, instance: usize) -> &[FaceId] {
        self.groups.get(instance).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Current face indices of one instance, ascending.
    pub fn group_indices(&self, instance: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .group(instance)
            .iter()
            .filter_map(|&id| self.index_of(id))
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Re-bind ids after a cut.
    ///
    /// A surviving face keeps its id; when it was split, the largest piece
    /// keeps it and the others get fresh ids with the same labels. Faces
    /// without a source start as stock. Ids absent from the new enumeration
    /// are dropped everywhere.
    pub fn rebind(&mut self, origins: &[FaceOrigin], faces: &[FaceFingerprint]) {
        let mut pieces: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, origin) in origins.iter().enumerate() {
            if let FaceOrigin::Survivor { before } = origin {
                pieces.entry(*before).or_default().push(i);
            }
        }

        let mut ids: Vec<Option<FaceId>> = vec![None; origins.len()];
        for (before, members) in pieces {
            let Some(old) = self.id_at(before) else {
                continue;
            };
            let keeper = members.iter().copied().fold(members[0], |best, i| {
                if faces[i].area > faces[best].area {
                    i
                } else {
                    best
                }
            });
            ids[keeper] = Some(old);
            for i in members {
                if i != keeper {
                    ids[i] = Some(self.fresh_copy(old));
                }
            }
        }
        let faces: Vec<FaceId> = ids
            .into_iter()
            .map(|id| match id {
                Some(id) => id,
                None => self.fresh_stock(),
            })
            .collect();

        let live: BTreeSet<FaceId> = faces.iter().copied().collect();
        self.semantic.retain(|id, _| live.contains(id));
        self.bottom.retain(|id, _| live.contains(id));
        for group in &mut self.groups {
            group.retain(|id| live.contains(id));
        }
        self.faces = faces;
    }

    /// Give the faces at `owned` (index, bottom) one new instance group and
    /// the class `label`. Returns the instance index.
    pub fn apply_feature(&mut self, label: u32, owned: &[(usize, bool)]) -> usize {
        let mut group = Vec::with_capacity(owned.len());
        for &(index, bottom) in owned {
            let Some(id) = self.id_at(index) else {
                continue;
            };
            self.semantic.insert(id, label);
            self.bottom.insert(id, bottom);
            group.push(id);
        }
        self.groups.push(group);
        self.groups.len() - 1
    }

    /// Semantic class per face, in enumeration order.
    pub fn semantic_labels(&self) -> Vec<u32> {
        self.faces
            .iter()
            .map(|id| self.semantic.get(id).copied().unwrap_or(STOCK_LABEL))
            .collect()
    }

    /// Bottom flag per face, in enumeration order.
    pub fn bottom_labels(&self) -> Vec<bool> {
        self.faces
            .iter()
            .map(|id| self.bottom.get(id).copied().unwrap_or(false))
            .collect()
    }

    /// `m[i][j] = 1` when faces `i` and `j` belong to one instance.
    pub fn relation_matrix(&self) -> Vec<Vec<u8>> {
        let n = self.faces.len();
        let mut m = vec![vec![0u8; n]; n];
        for group in &self.groups {
            let indices: Vec<usize> = group.iter().filter_map(|&id| self.index_of(id)).collect();
            for &i in &indices {
                for &j in &indices {
                    m[i][j] = 1;
                }
            }
        }
        m
    }

    /// Check every invariant against a solid with `face_count` faces.
    pub fn validate(&self, face_count: usize) -> Result<(), LabelError> {
        if self.faces.len() != face_count || self.semantic.len() != face_count {
            return Err(LabelError::CardinalityMismatch {
                labels: self.semantic.len().min(self.faces.len()),
                faces: face_count,
            });
        }
        if let Some(index) = self.faces.iter().position(|id| !self.semantic.contains_key(id)) {
            return Err(LabelError::MissingLabel { index });
        }

        let mut membership = vec![0usize; face_count];
        for group in &self.groups {
            for &id in group {
                if let Some(i) = self.index_of(id) {
                    membership[i] += 1;
                }
            }
        }
        if let Some(index) = membership.iter().position(|&c| c > 1) {
            return Err(LabelError::OverlappingGroups { index });
        }

        let m = self.relation_matrix();
        for a in 0..face_count {
            for b in 0..face_count {
                if m[a][b] != m[b][a] {
                    return Err(LabelError::AsymmetricRelation { a, b });
                }
                if a != b && m[a][b] == 1 && m[a] != m[b] {
                    return Err(LabelError::NotAClique { a, b });
                }
            }
        }

        for (index, id) in self.faces.iter().enumerate() {
            if self.bottom.get(id).copied().unwrap_or(false) && membership[index] == 0 {
                return Err(LabelError::OrphanBottom { index });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synth_types::{Aabb, SurfaceKind};

    fn fp(area: f64) -> FaceFingerprint {
        FaceFingerprint {
            surface: SurfaceKind::Curved,
            centroid: [0.0; 3],
            normal: [0.0, 0.0, 1.0],
            area,
            bbox: Aabb::new([0.0; 3], [1.0; 3]),
            anchor: [0.0; 3],
            anchor_normal: [0.0, 0.0, 1.0],
        }
    }

    fn tool(bottom: bool) -> FaceOrigin {
        FaceOrigin::Tool {
            surface: 0,
            role: feature_ops::SurfaceRole::Floor,
            bottom,
        }
    }

    #[test]
    fn stock_maps_are_valid() {
        let maps = LabelMaps::stock(6);
        maps.validate(6).unwrap();
        assert_eq!(maps.semantic_labels(), vec![STOCK_LABEL; 6]);
        assert!(maps.relation_matrix().iter().flatten().all(|&v| v == 0));
    }

    #[test]
    fn split_face_keeps_id_on_the_largest_piece() {
        let mut maps = LabelMaps::stock(2);
        maps.apply_feature(12, &[(1, true)]);
        let old = maps.id_at(1).unwrap();

        let origins = [
            FaceOrigin::Survivor { before: 0 },
            FaceOrigin::Survivor { before: 1 },
            FaceOrigin::Survivor { before: 1 },
        ];
        maps.rebind(&origins, &[fp(4.0), fp(1.0), fp(3.0)]);
        assert_eq!(maps.id_at(2), Some(old));
        assert_ne!(maps.id_at(1), Some(old));
        assert_eq!(maps.semantic_labels(), vec![STOCK_LABEL, 12, 12]);
        assert_eq!(maps.bottom_labels(), vec![false, true, true]);
        assert_eq!(maps.group_indices(0), vec![1, 2]);
        maps.validate(3).unwrap();
    }

    #[test]
    fn vanished_faces_leave_every_map() {
        let mut maps = LabelMaps::stock(3);
        maps.apply_feature(14, &[(1, false), (2, true)]);
        maps.rebind(
            &[FaceOrigin::Survivor { before: 0 }, FaceOrigin::Survivor { before: 2 }, tool(false)],
            &[fp(1.0), fp(1.0), fp(1.0)],
        );
        assert_eq!(maps.semantic_labels(), vec![STOCK_LABEL, 14, STOCK_LABEL]);
        assert_eq!(maps.group_indices(0), vec![1]);
        maps.validate(3).unwrap();
    }

    #[test]
    fn relation_matrix_is_symmetric_with_cliques() {
        let mut maps = LabelMaps::stock(5);
        maps.apply_feature(1, &[(1, false), (3, false)]);
        maps.apply_feature(12, &[(2, false), (4, true)]);
        let m = maps.relation_matrix();
        assert_eq!(m[1][3], 1);
        assert_eq!(m[3][1], 1);
        assert_eq!(m[1][2], 0);
        assert_eq!(m[0], vec![0; 5]);
        maps.validate(5).unwrap();
    }

    #[test]
    fn cardinality_mismatch_is_reported() {
        let maps = LabelMaps::stock(6);
        assert_eq!(
            maps.validate(7),
            Err(LabelError::CardinalityMismatch { labels: 6, faces: 7 })
        );
    }

    #[test]
    fn bottom_outside_any_group_is_rejected() {
        let mut maps = LabelMaps::stock(2);
        let id = maps.id_at(0).unwrap();
        maps.bottom.insert(id, true);
        assert_eq!(maps.validate(2), Err(LabelError::OrphanBottom { index: 0 }));
    }
}
