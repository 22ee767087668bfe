use chamber_types::{Point2, Profile};

use crate::types::*;

/// Core geometry kernel trait. Provides all shape construction and modification operations.
/// Implemented by TruckKernel (wraps real truck) and MockKernel (deterministic test double).
///
/// Solids are immutable: every operation returns a new handle.
pub trait Kernel {
    /// Planar face bounded by `profile` in the plane `x = 0`, normal along +X.
    fn make_face(&mut self, profile: &Profile) -> Result<KernelId, KernelError>;

    /// Extrude a planar face along a direction vector. The face stays available.
    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Ruled loft from `start` at `x = 0` to `end` at `x = length`, with the
    /// end outline displaced by `end_offset`.
    fn loft(
        &mut self,
        start: &Profile,
        end: &Profile,
        length: f64,
        end_offset: Point2,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Axis-aligned box with one corner at `corner`.
    fn make_box(&mut self, size: [f64; 3], corner: [f64; 3])
        -> Result<KernelSolidHandle, KernelError>;

    /// Cylinder whose base disc is centred on `base`, extending along `axis`.
    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Torus centred on `centre` with its symmetry axis along `axis`.
    fn make_torus(
        &mut self,
        major_radius: f64,
        minor_radius: f64,
        centre: [f64; 3],
        axis: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError>;

    fn translate(
        &mut self,
        solid: &KernelSolidHandle,
        offset: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Right-handed rotation about the line through `centre` along `axis`.
    fn rotate(
        &mut self,
        solid: &KernelSolidHandle,
        centre: [f64; 3],
        axis: [f64; 3],
        degrees: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean union of two solids.
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Tessellate a solid to a triangle mesh. `tolerance` is in millimetres.
    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError>;

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<BoundingBox, KernelError>;

    /// One STEP document holding every named solid.
    fn export_step(
        &self,
        parts: &[(String, KernelSolidHandle)],
        file_name: &str,
    ) -> Result<String, KernelError>;
}
