//! TruckKernel: real geometry kernel wrapping truck's API.

use crate::primitives;
use crate::step;
use crate::traits::Kernel;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, instrument};
// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::{Shell, Solid};
use truck_stepio::out;

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    solids: HashMap<u64, Solid>,
    /// Tolerance handed to truck-shapeops for Boolean operations.
    boolean_tolerance: f64,
    /// Chordal tolerance for the meshes behind face fingerprints.
    pub(crate) mesh_tolerance: f64,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self::with_tolerances(0.01, 0.05)
    }

    pub fn with_tolerances(boolean_tolerance: f64, mesh_tolerance: f64) -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
            boolean_tolerance,
            mesh_tolerance,
        }
    }

    fn alloc_handle(&mut self) -> SolidHandle {
        let h = SolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> SolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &SolidHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or_else(|| KernelError::missing(handle))
    }

    /// Number of solids currently held.
    pub fn live_solids(&self) -> usize {
        self.solids.len()
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    #[instrument(skip(self))]
    fn make_box(&mut self, origin: [f64; 3], size: [f64; 3]) -> Result<SolidHandle, KernelError> {
        if size.iter().any(|&s| s <= 0.0) {
            return Err(KernelError::InvalidProfile {
                reason: format!("box size must be positive, got {:?}", size),
            });
        }
        debug!("creating box primitive");
        Ok(self.store_solid(primitives::make_box(origin, size)))
    }

    fn extrude_profile(
        &mut self,
        profile: &Profile,
        direction: [f64; 3],
        length: f64,
    ) -> Result<SolidHandle, KernelError> {
        let solid = primitives::extrude(profile, direction, length)?;
        Ok(self.store_solid(solid))
    }

    fn boolean_subtract(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let solid_a = self.get_solid(a)?.clone();
        let mut solid_b = self.get_solid(b)?.clone();

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = truck_shapeops::and(&solid_a, &solid_b, self.boolean_tolerance)
            .ok_or_else(|| KernelError::BooleanFailed {
                reason: "truck and() returned None for subtraction".to_string(),
            })?;
        if result.boundaries().iter().all(|shell| shell.face_iter().next().is_none()) {
            return Err(KernelError::BooleanFailed {
                reason: "subtraction produced an empty solid".to_string(),
            });
        }
        Ok(self.store_solid(result))
    }

    fn combine(&mut self, parts: &[SolidHandle]) -> Result<SolidHandle, KernelError> {
        let mut shells: Vec<Shell> = Vec::new();
        for part in parts {
            shells.extend(self.get_solid(part)?.boundaries().iter().cloned());
        }
        let solid = Solid::try_new(shells).map_err(|e| KernelError::Other {
            message: format!("failed to combine solids: {}", e),
        })?;
        Ok(self.store_solid(solid))
    }

    fn transform(
        &mut self,
        solid: &SolidHandle,
        placement: &RigidTransform,
    ) -> Result<SolidHandle, KernelError> {
        let moved = builder::transformed(self.get_solid(solid)?, primitives::placement_matrix(placement));
        Ok(self.store_solid(moved))
    }

    fn import_solid(&mut self, path: &Path) -> Result<SolidHandle, KernelError> {
        let text = std::fs::read_to_string(path).map_err(|e| KernelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let compressed = serde_json::from_str(&text).map_err(|e| KernelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let solid = Solid::extract(compressed).map_err(|e| KernelError::Other {
            message: format!("invalid solid in {}: {}", path.display(), e),
        })?;
        Ok(self.store_solid(solid))
    }

    fn save_solid(&self, solid: &SolidHandle, path: &Path) -> Result<(), KernelError> {
        let compressed = self.get_solid(solid)?.compress();
        let text = serde_json::to_string(&compressed).map_err(|e| KernelError::Other {
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|e| KernelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn export_step(
        &self,
        solid: &SolidHandle,
        face_names: &[String],
    ) -> Result<String, KernelError> {
        let compressed = self.get_solid(solid)?.compress();
        let text = out::CompleteStepDisplay::new(
            out::StepModel::from(&compressed),
            out::StepHeaderDescriptor {
                organization_system: "feature-synth".to_owned(),
                ..Default::default()
            },
        )
        .to_string();
        step::bind_face_names(&text, face_names)
    }

    fn release(&mut self, solid: &SolidHandle) {
        self.solids.remove(&solid.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::KernelIntrospect;
    use synth_types::Segment;

    fn square(z: f64, lo: f64, hi: f64) -> Profile {
        Profile::polygon(&[[lo, lo, z], [hi, lo, z], [hi, hi, z], [lo, hi, z]])
    }

    #[test]
    fn test_truck_kernel_box_and_release() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], [1.0, 2.0, 3.0]).unwrap();
        assert_eq!(kernel.face_count(&handle).unwrap(), 6);
        kernel.release(&handle);
        assert_eq!(kernel.live_solids(), 0);
        assert!(matches!(
            kernel.face_fingerprints(&handle),
            Err(KernelError::SolidNotFound { .. })
        ));
    }

    #[test]
    fn test_truck_kernel_rejects_degenerate_box() {
        let mut kernel = TruckKernel::new();
        assert!(kernel.make_box([0.0; 3], [1.0, 0.0, 1.0]).is_err());
    }

    #[test]
    #[ignore = "truck-shapeops: boolean robustness depends on tolerance"]
    fn test_truck_kernel_subtract_pocket() {
        let mut kernel = TruckKernel::new();
        let stock = kernel.make_box([0.0; 3], [10.0, 10.0, 10.0]).unwrap();
        let tool = kernel
            .extrude_profile(&square(10.5, 3.0, 7.0), [0.0, 0.0, -1.0], 4.5)
            .unwrap();
        let result = kernel.boolean_subtract(&stock, &tool).unwrap();
        // 6 stock faces + 4 walls + 1 floor
        assert_eq!(kernel.face_count(&result).unwrap(), 11);
    }

    #[test]
    fn test_truck_kernel_transform_moves_faces() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        let moved = kernel
            .transform(&handle, &RigidTransform::translation([5.0, 0.0, 0.0]))
            .unwrap();
        let fps = kernel.face_fingerprints(&moved).unwrap();
        assert!(fps.iter().all(|f| f.bbox.min[0] >= 5.0 - 1e-9));
    }

    #[test]
    fn test_truck_kernel_combine_and_export_names() {
        let mut kernel = TruckKernel::new();
        let a = kernel.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();
        let disc = Profile::new(vec![
            Segment::arc([4.0, 0.0, 0.0], [3.0, 1.0, 0.0], [2.0, 0.0, 0.0]),
            Segment::arc([2.0, 0.0, 0.0], [3.0, -1.0, 0.0], [4.0, 0.0, 0.0]),
        ]);
        let b = kernel.extrude_profile(&disc, [0.0, 0.0, 1.0], 2.0).unwrap();
        let both = kernel.combine(&[a, b]).unwrap();
        let n = kernel.face_count(&both).unwrap();
        assert_eq!(n, 10);
        let names: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        let text = kernel.export_step(&both, &names).unwrap();
        assert_eq!(step::read_face_names(&text).unwrap(), names);
    }

    #[test]
    fn test_truck_kernel_save_and_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("box.json");
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], [1.0, 2.0, 3.0]).unwrap();
        kernel.save_solid(&handle, &path).unwrap();
        let back = kernel.import_solid(&path).unwrap();
        assert_eq!(kernel.face_count(&back).unwrap(), 6);
    }
}
