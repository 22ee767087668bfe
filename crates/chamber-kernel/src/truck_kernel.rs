//! TruckKernel: real geometry kernel wrapping truck's API.

use std::collections::HashMap;

use chamber_types::{Point2, Profile};
use tracing::{debug, info, instrument};

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::{Face, Solid};
use truck_modeling::{BoundedCurve, InnerSpace, ParameterDivision1D, Point3, Rad, Vector3};

use crate::loft;
use crate::primitives;
use crate::step;
use crate::tessellation;
use crate::traits::Kernel;
use crate::types::*;
use crate::wire::{orient_face, planar_face, profile_wire};

/// Tolerance handed to truck-shapeops for surface intersections (mm).
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Chord tolerance used when sampling edges for bounding boxes (mm).
const BOUNDS_TOLERANCE: f64 = 0.01;

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    next_id: u64,
    solids: HashMap<u64, Solid>,
    /// Planar faces created by make_face, awaiting extrude.
    faces: HashMap<u64, Face>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            next_id: 1,
            solids: HashMap::new(),
            faces: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &KernelSolidHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    /// Number of solids currently held.
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn vector(v: [f64; 3]) -> Vector3 {
    Vector3::new(v[0], v[1], v[2])
}

fn point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

impl Kernel for TruckKernel {
    #[instrument(skip(self, profile), fields(segments = profile.segments.len()))]
    fn make_face(&mut self, profile: &Profile) -> Result<KernelId, KernelError> {
        let wire = profile_wire(profile, 0.0)?;
        let face = orient_face(planar_face(wire)?, Vector3::unit_x());
        let id = self.alloc_id();
        self.faces.insert(id.0, face);
        Ok(id)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let truck_face = self
            .faces
            .get(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?
            .clone();

        let dir = vector(direction);
        if dir.magnitude() < 1e-12 || depth.abs() < 1e-12 {
            return Err(KernelError::ConstructionFailed {
                reason: "extrusion has zero length".to_string(),
            });
        }
        let sweep_vec = dir.normalize() * depth;
        let oriented = orient_face(truck_face, sweep_vec);
        debug!(?direction, depth, "extruding face");
        let solid = builder::tsweep(&oriented, sweep_vec);
        Ok(self.store_solid(solid))
    }

    #[instrument(skip(self, start, end))]
    fn loft(
        &mut self,
        start: &Profile,
        end: &Profile,
        length: f64,
        end_offset: Point2,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid = loft::loft_solid(start, end, length, end_offset)?;
        Ok(self.store_solid(solid))
    }

    fn make_box(
        &mut self,
        size: [f64; 3],
        corner: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid = primitives::make_box(size, corner)?;
        Ok(self.store_solid(solid))
    }

    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid = primitives::make_cylinder(radius, height, base, axis)?;
        Ok(self.store_solid(solid))
    }

    fn make_torus(
        &mut self,
        major_radius: f64,
        minor_radius: f64,
        centre: [f64; 3],
        axis: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid = primitives::make_torus(major_radius, minor_radius, centre, axis)?;
        Ok(self.store_solid(solid))
    }

    fn translate(
        &mut self,
        solid: &KernelSolidHandle,
        offset: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError> {
        let moved = builder::translated(self.get_solid(solid)?, vector(offset));
        Ok(self.store_solid(moved))
    }

    fn rotate(
        &mut self,
        solid: &KernelSolidHandle,
        centre: [f64; 3],
        axis: [f64; 3],
        degrees: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let axis = vector(axis);
        if axis.magnitude() < 1e-12 {
            return Err(KernelError::ConstructionFailed {
                reason: "rotation axis has zero length".to_string(),
            });
        }
        let turned = builder::rotated(
            self.get_solid(solid)?,
            point(centre),
            axis.normalize(),
            Rad(degrees.to_radians()),
        );
        Ok(self.store_solid(turned))
    }

    #[instrument(skip(self))]
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.get_solid(a)?;
        let solid_b = self.get_solid(b)?;
        let result = truck_shapeops::or(solid_a, solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck or() returned None".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    #[instrument(skip(self))]
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.get_solid(a)?;
        let mut solid_b = self.get_solid(b)?.clone();

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = truck_shapeops::and(solid_a, &solid_b, BOOLEAN_TOLERANCE).ok_or_else(|| {
            KernelError::BooleanFailed {
                reason: "truck and() returned None for subtraction".to_string(),
            }
        })?;
        Ok(self.store_solid(result))
    }

    #[instrument(skip(self))]
    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError> {
        let truck_solid = self
            .solids
            .get(&solid.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(solid.id()),
            })?;
        let mesh = tessellation::tessellate_solid(truck_solid, tolerance, &mut self.next_id)?;
        info!(triangles = mesh.triangle_count(), "tessellated solid");
        Ok(mesh)
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<BoundingBox, KernelError> {
        let truck_solid = self.get_solid(solid)?;
        let mut bb = BoundingBox::empty();
        for shell in truck_solid.boundaries() {
            for v in shell.vertex_iter() {
                let p = v.point();
                bb.include([p.x, p.y, p.z]);
            }
            for edge in shell.edge_iter() {
                let curve = edge.oriented_curve();
                let (_, points) = curve.parameter_division(curve.range_tuple(), BOUNDS_TOLERANCE);
                for p in points {
                    bb.include([p.x, p.y, p.z]);
                }
            }
        }
        if bb.is_empty() {
            return Err(KernelError::Other {
                message: "solid has no vertices".to_string(),
            });
        }
        Ok(bb)
    }

    fn export_step(
        &self,
        parts: &[(String, KernelSolidHandle)],
        file_name: &str,
    ) -> Result<String, KernelError> {
        let solids = parts
            .iter()
            .map(|(name, handle)| Ok((name.as_str(), self.get_solid(handle)?)))
            .collect::<Result<Vec<_>, KernelError>>()?;
        info!(parts = parts.len(), file_name, "writing STEP document");
        step::write_step(&solids, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chamber_types::Segment;

    fn square(side: f64) -> Profile {
        let s = side / 2.0;
        Profile::polygon(&[
            Point2::new(s, -s),
            Point2::new(s, s),
            Point2::new(-s, s),
            Point2::new(-s, -s),
        ])
    }

    #[test]
    fn test_make_face_and_extrude() {
        let mut kernel = TruckKernel::new();
        let face = kernel.make_face(&square(2.0)).unwrap();
        let handle = kernel.extrude_face(face, [1.0, 0.0, 0.0], 5.0).unwrap();

        let solid = kernel.get_solid(&handle).unwrap();
        let boundaries = solid.boundaries();
        assert_eq!(boundaries.len(), 1);
        let faces: Vec<_> = boundaries[0].face_iter().collect();
        assert_eq!(faces.len(), 6, "Extruded square should have 6 faces");

        let bb = kernel.bounding_box(&handle).unwrap();
        assert!((bb.min[0]).abs() < 1e-9 && (bb.max[0] - 5.0).abs() < 1e-9);
        assert!((bb.size()[1] - 2.0).abs() < 1e-9 && (bb.size()[2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_face_can_be_extruded_twice() {
        let mut kernel = TruckKernel::new();
        let face = kernel.make_face(&square(1.0)).unwrap();
        kernel.extrude_face(face, [1.0, 0.0, 0.0], 1.0).unwrap();
        let back = kernel.extrude_face(face, [-1.0, 0.0, 0.0], 2.0).unwrap();
        let bb = kernel.bounding_box(&back).unwrap();
        assert!((bb.min[0] + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_face_extrudes_to_cylinder_bounds() {
        let mut kernel = TruckKernel::new();
        let face = kernel
            .make_face(&Profile::circle(Point2::new(0.0, 0.0), 3.0))
            .unwrap();
        let handle = kernel.extrude_face(face, [1.0, 0.0, 0.0], 4.0).unwrap();
        let bb = kernel.bounding_box(&handle).unwrap();
        assert!((bb.size()[1] - 6.0).abs() < 0.05, "got {:?}", bb);
        assert!((bb.size()[2] - 6.0).abs() < 0.05, "got {:?}", bb);
    }

    #[test]
    fn test_translate_and_rotate() {
        let mut kernel = TruckKernel::new();
        let b = kernel.make_box([2.0, 1.0, 1.0], [0.0, 0.0, 0.0]).unwrap();
        let moved = kernel.translate(&b, [10.0, 0.0, 0.0]).unwrap();
        assert!((kernel.bounding_box(&moved).unwrap().min[0] - 10.0).abs() < 1e-9);
        let turned = kernel
            .rotate(&b, [0.0; 3], [0.0, 0.0, 1.0], 90.0)
            .unwrap();
        let bb = kernel.bounding_box(&turned).unwrap();
        assert!((bb.max[1] - 2.0).abs() < 1e-9, "x extent should map to +y");
        assert_eq!(kernel.solid_count(), 3);
    }

    #[test]
    fn test_store_and_tessellate_box() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box([1.0, 1.0, 1.0], [0.0; 3]).unwrap();

        let mesh = kernel.tessellate(&handle, 0.1).unwrap();

        assert!(!mesh.vertices.is_empty(), "Mesh should have vertices");
        assert!(!mesh.indices.is_empty(), "Mesh should have indices");
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
        assert_eq!(mesh.face_ranges.len(), 6, "Box should have 6 face ranges");

        let covered: u32 = mesh
            .face_ranges
            .iter()
            .map(|r| r.end_index - r.start_index)
            .sum();
        assert_eq!(
            covered,
            mesh.indices.len() as u32,
            "Face ranges should cover all indices"
        );
    }

    #[test]
    fn test_union_of_overlapping_boxes() {
        let mut kernel = TruckKernel::new();
        let a = kernel.make_box([2.0, 2.0, 2.0], [0.0; 3]).unwrap();
        let b = kernel.make_box([2.0, 2.0, 2.0], [1.0, 1.0, 1.0]).unwrap();
        let u = kernel.boolean_union(&a, &b).unwrap();
        let bb = kernel.bounding_box(&u).unwrap();
        assert!((bb.max[0] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_subtract_hole_through_box() {
        let mut kernel = TruckKernel::new();
        let block = kernel.make_box([4.0, 4.0, 4.0], [0.0; 3]).unwrap();
        let cutter = kernel.make_box([2.0, 2.0, 6.0], [1.0, 1.0, -1.0]).unwrap();
        let cut = kernel.boolean_subtract(&block, &cutter).unwrap();
        let bb = kernel.bounding_box(&cut).unwrap();
        assert!((bb.size()[2] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_handles_and_faces() {
        let mut kernel = TruckKernel::new();
        assert!(matches!(
            kernel.extrude_face(KernelId(42), [1.0, 0.0, 0.0], 1.0),
            Err(KernelError::EntityNotFound { .. })
        ));
        let open = Profile::new(vec![Segment::line(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
        )]);
        assert!(kernel.make_face(&open).is_err());
    }

    #[test]
    fn test_export_step_of_named_parts() {
        let mut kernel = TruckKernel::new();
        let a = kernel.make_box([1.0, 1.0, 1.0], [0.0; 3]).unwrap();
        let text = kernel
            .export_step(&[("pillbox-vac".to_string(), a)], "block.step")
            .unwrap();
        assert!(text.starts_with("ISO-10303-21;"));
        assert!(text.contains("PRODUCT('pillbox-vac','pillbox-vac',''"));
    }
}
