//! MockKernel: deterministic test double implementing Kernel.
//!
//! Solids are tracked as axis-aligned bounding boxes. Every call is
//! recorded in an operation log, and any operation can be made to fail.
//! Used by modeling-ops, chamber-models and the runner for unit testing.

use std::collections::{HashMap, HashSet};

use chamber_types::{Bounds2, Point2, Profile};

use crate::traits::Kernel;
use crate::types::*;

/// Deterministic test double for the geometry kernel.
#[derive(Debug, Default)]
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    solids: HashMap<u64, BoundingBox>,
    faces: HashMap<u64, Bounds2>,
    log: Vec<String>,
    failing: HashSet<String>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            ..Default::default()
        }
    }

    /// Make every later call of `operation` (e.g. `"boolean_subtract"`) fail.
    pub fn fail_on(&mut self, operation: &str) {
        self.failing.insert(operation.to_string());
    }

    /// Names of all operations called so far, in order.
    pub fn operations(&self) -> &[String] {
        &self.log
    }

    pub fn count(&self, operation: &str) -> usize {
        self.log.iter().filter(|op| *op == operation).count()
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn record(&mut self, operation: &str) -> Result<(), KernelError> {
        self.log.push(operation.to_string());
        if self.failing.contains(operation) {
            return Err(KernelError::Injected {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn store(&mut self, bounds: BoundingBox) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        self.solids.insert(h.id(), bounds);
        h
    }

    fn bounds_of(&self, solid: &KernelSolidHandle) -> Result<BoundingBox, KernelError> {
        self.solids
            .get(&solid.id())
            .copied()
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(solid.id()),
            })
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn outline_corners(b: &Bounds2, x: f64) -> [[f64; 3]; 4] {
    [
        [x, b.min.v, b.min.h],
        [x, b.max.v, b.min.h],
        [x, b.min.v, b.max.h],
        [x, b.max.v, b.max.h],
    ]
}

fn unit(v: [f64; 3]) -> Result<[f64; 3], KernelError> {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len < 1e-12 {
        return Err(KernelError::ConstructionFailed {
            reason: "direction has zero length".to_string(),
        });
    }
    Ok([v[0] / len, v[1] / len, v[2] / len])
}

/// Rodrigues rotation of `p` about the line through `c` along unit `k`.
fn rotate_point(p: [f64; 3], c: [f64; 3], k: [f64; 3], radians: f64) -> [f64; 3] {
    let v = [p[0] - c[0], p[1] - c[1], p[2] - c[2]];
    let (s, co) = radians.sin_cos();
    let cross = [
        k[1] * v[2] - k[2] * v[1],
        k[2] * v[0] - k[0] * v[2],
        k[0] * v[1] - k[1] * v[0],
    ];
    let dot = k[0] * v[0] + k[1] * v[1] + k[2] * v[2];
    let mut out = [0.0; 3];
    for i in 0..3 {
        out[i] = c[i] + v[i] * co + cross[i] * s + k[i] * dot * (1.0 - co);
    }
    out
}

/// Extent of a disc of radius `r` with normal `a` along each axis.
fn disc_extent(a: [f64; 3], r: f64) -> [f64; 3] {
    a.map(|ai| r * (1.0 - ai * ai).max(0.0).sqrt())
}

impl Kernel for MockKernel {
    fn make_face(&mut self, profile: &Profile) -> Result<KernelId, KernelError> {
        self.record("make_face")?;
        profile.validate()?;
        let id = self.alloc_id();
        self.faces.insert(id.0, profile.bounds());
        Ok(id)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("extrude_face")?;
        let outline = *self
            .faces
            .get(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;
        let d = unit(direction)?;
        let mut bb = BoundingBox::empty();
        for p in outline_corners(&outline, 0.0) {
            bb.include(p);
            bb.include([p[0] + d[0] * depth, p[1] + d[1] * depth, p[2] + d[2] * depth]);
        }
        Ok(self.store(bb))
    }

    fn loft(
        &mut self,
        start: &Profile,
        end: &Profile,
        length: f64,
        end_offset: Point2,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("loft")?;
        start.validate()?;
        end.validate()?;
        if length <= 0.0 {
            return Err(KernelError::ConstructionFailed {
                reason: format!("loft length must be positive, got {length}"),
            });
        }
        let end_bounds = end.translated(end_offset.h, end_offset.v).bounds();
        let mut bb = BoundingBox::empty();
        for p in outline_corners(&start.bounds(), 0.0) {
            bb.include(p);
        }
        for p in outline_corners(&end_bounds, length) {
            bb.include(p);
        }
        Ok(self.store(bb))
    }

    fn make_box(
        &mut self,
        size: [f64; 3],
        corner: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("make_box")?;
        if size.iter().any(|&s| s <= 0.0) {
            return Err(KernelError::ConstructionFailed {
                reason: format!("box size must be positive, got {size:?}"),
            });
        }
        let far = [corner[0] + size[0], corner[1] + size[1], corner[2] + size[2]];
        Ok(self.store(BoundingBox::from_points([&corner, &far])))
    }

    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
        base: [f64; 3],
        axis: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("make_cylinder")?;
        if radius <= 0.0 || height <= 0.0 {
            return Err(KernelError::ConstructionFailed {
                reason: format!("cylinder needs positive radius and height, got r={radius} h={height}"),
            });
        }
        let a = unit(axis)?;
        let top = [
            base[0] + a[0] * height,
            base[1] + a[1] * height,
            base[2] + a[2] * height,
        ];
        let e = disc_extent(a, radius);
        let mut bb = BoundingBox::empty();
        for c in [base, top] {
            bb.include([c[0] - e[0], c[1] - e[1], c[2] - e[2]]);
            bb.include([c[0] + e[0], c[1] + e[1], c[2] + e[2]]);
        }
        Ok(self.store(bb))
    }

    fn make_torus(
        &mut self,
        major_radius: f64,
        minor_radius: f64,
        centre: [f64; 3],
        axis: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("make_torus")?;
        if minor_radius <= 0.0 || major_radius <= minor_radius {
            return Err(KernelError::ConstructionFailed {
                reason: format!(
                    "torus needs 0 < minor < major, got major={major_radius} minor={minor_radius}"
                ),
            });
        }
        let a = unit(axis)?;
        let ring = disc_extent(a, major_radius + minor_radius);
        let mut bb = BoundingBox::empty();
        for i in 0..3 {
            let half = ring[i].max(minor_radius * a[i].abs());
            let mut lo = centre;
            let mut hi = centre;
            lo[i] -= half;
            hi[i] += half;
            bb.include(lo);
            bb.include(hi);
        }
        Ok(self.store(bb))
    }

    fn translate(
        &mut self,
        solid: &KernelSolidHandle,
        offset: [f64; 3],
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("translate")?;
        let bb = self.bounds_of(solid)?;
        let moved = BoundingBox {
            min: [bb.min[0] + offset[0], bb.min[1] + offset[1], bb.min[2] + offset[2]],
            max: [bb.max[0] + offset[0], bb.max[1] + offset[1], bb.max[2] + offset[2]],
        };
        Ok(self.store(moved))
    }

    fn rotate(
        &mut self,
        solid: &KernelSolidHandle,
        centre: [f64; 3],
        axis: [f64; 3],
        degrees: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("rotate")?;
        let bb = self.bounds_of(solid)?;
        let k = unit(axis)?;
        let corners = bb
            .corners()
            .map(|p| rotate_point(p, centre, k, degrees.to_radians()));
        Ok(self.store(BoundingBox::from_points(corners.iter())))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("boolean_union")?;
        let merged = self.bounds_of(a)?.union(&self.bounds_of(b)?);
        Ok(self.store(merged))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.record("boolean_subtract")?;
        self.bounds_of(b)?;
        let kept = self.bounds_of(a)?;
        Ok(self.store(kept))
    }

    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError> {
        self.record("tessellate")?;
        if tolerance.is_nan() || tolerance <= 0.0 {
            return Err(KernelError::TessellationFailed {
                reason: format!("tolerance must be positive, got {tolerance}"),
            });
        }
        let bb = self.bounds_of(solid)?;
        let vertices: Vec<f32> = bb
            .corners()
            .iter()
            .flat_map(|p| p.map(|c| c as f32))
            .collect();
        // Outward winding over the corner order of `BoundingBox::corners`.
        let indices: Vec<u32> = vec![
            0, 2, 1, 1, 2, 3, // -z
            4, 5, 6, 5, 7, 6, // +z
            0, 1, 4, 1, 5, 4, // -y
            2, 6, 3, 3, 6, 7, // +y
            0, 4, 2, 2, 4, 6, // -x
            1, 3, 5, 3, 7, 5, // +x
        ];
        let face_ranges = (0..6)
            .map(|f| FaceRange {
                face_id: self.alloc_id(),
                start_index: f * 6,
                end_index: f * 6 + 6,
            })
            .collect();
        Ok(RenderMesh {
            normals: vec![0.0; vertices.len()],
            vertices,
            indices,
            face_ranges,
        })
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<BoundingBox, KernelError> {
        self.bounds_of(solid)
    }

    fn export_step(
        &self,
        parts: &[(String, KernelSolidHandle)],
        file_name: &str,
    ) -> Result<String, KernelError> {
        if self.failing.contains("export_step") {
            return Err(KernelError::Injected {
                operation: "export_step".to_string(),
            });
        }
        if parts.is_empty() {
            return Err(KernelError::ExportFailed {
                reason: "no solids to export".to_string(),
            });
        }
        let mut out = String::from("ISO-10303-21;\nHEADER;\n");
        out.push_str(&format!("FILE_NAME('{file_name}');\nENDSEC;\nDATA;\n"));
        for (i, (name, handle)) in parts.iter().enumerate() {
            let bb = self.bounds_of(handle)?;
            out.push_str(&format!(
                "#{} = MOCK_SOLID('{}', ({:?}), ({:?}));\n",
                i + 1,
                name,
                bb.min,
                bb.max
            ));
        }
        out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
        Ok(out)
    }
}
