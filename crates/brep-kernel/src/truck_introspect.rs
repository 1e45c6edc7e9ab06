//! KernelIntrospect implementation on TruckKernel.
//!
//! Implemented directly on the kernel so TruckKernel satisfies the
//! KernelBundle blanket impl (Kernel + KernelIntrospect).

use crate::tessellation;
use crate::traits::KernelIntrospect;
use crate::truck_kernel::TruckKernel;
use crate::types::*;

impl KernelIntrospect for TruckKernel {
    fn face_fingerprints(&self, solid: &SolidHandle) -> Result<Vec<FaceFingerprint>, KernelError> {
        let truck_solid = self.get_solid(solid)?;
        Ok(tessellation::face_fingerprints(truck_solid, self.mesh_tolerance))
    }

    fn edges(&self, solid: &SolidHandle) -> Result<Vec<EdgeRecord>, KernelError> {
        let truck_solid = self.get_solid(solid)?;
        Ok(tessellation::edge_records(truck_solid, self.mesh_tolerance))
    }

    fn face_count(&self, solid: &SolidHandle) -> Result<usize, KernelError> {
        let truck_solid = self.get_solid(solid)?;
        Ok(truck_solid
            .boundaries()
            .iter()
            .map(|shell| shell.face_iter().count())
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Kernel;

    #[test]
    fn test_introspect_box_faces_and_edges() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([0.0; 3], [1.0, 1.0, 1.0]).unwrap();

        let faces = kernel.face_fingerprints(&handle).unwrap();
        let edges = kernel.edges(&handle).unwrap();

        assert_eq!(faces.len(), 6, "Box should have 6 faces");
        assert_eq!(edges.len(), 12, "Box should have 12 edges");
        assert!(faces.iter().all(|f| f.is_planar()));
        for e in &edges {
            for &fi in &e.faces {
                assert!(fi < faces.len());
            }
        }
    }

    #[test]
    fn test_introspect_cylinder_walls_are_curved() {
        let mut kernel = TruckKernel::new();
        let disc = Profile::new(vec![
            Segment::arc([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]),
            Segment::arc([-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0]),
        ]);
        let handle = kernel.extrude_profile(&disc, [0.0, 0.0, 1.0], 3.0).unwrap();
        let faces = kernel.face_fingerprints(&handle).unwrap();
        assert_eq!(faces.iter().filter(|f| !f.is_planar()).count(), 2);
        assert_eq!(faces.iter().filter(|f| f.is_planar()).count(), 2);
    }
}
