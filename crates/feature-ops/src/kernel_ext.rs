use brep_kernel::{Kernel, KernelIntrospect};

/// A kernel that can both cut and report faces.
///
/// Cuts take the kernel as `&mut dyn KernelBundle`; the before/after face
/// queries go through `as_introspect()` on the same object.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;
}

impl<K: Kernel + KernelIntrospect> KernelBundle for K {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}
