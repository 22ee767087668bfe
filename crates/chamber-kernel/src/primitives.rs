//! Higher-level primitive builders on top of truck's sweep API.
//!
//! truck has no built-in box/cylinder/torus; everything is successive sweeps.

use std::f64::consts::{PI, TAU};

use truck_modeling::builder;
use truck_modeling::topology::Solid;
use truck_modeling::{EuclideanSpace, InnerSpace, Point3, Rad, Vector3};

use crate::types::KernelError;
use crate::wire::{orient_face, planar_face};

/// Create a box solid via successive translational sweeps.
/// One corner at `corner`, extending by `size` along +X, +Y and +Z.
pub fn make_box(size: [f64; 3], corner: [f64; 3]) -> Result<Solid, KernelError> {
    let [w, h, d] = size;
    if w <= 0.0 || h <= 0.0 || d <= 0.0 {
        return Err(KernelError::ConstructionFailed {
            reason: format!("box size must be positive, got {size:?}"),
        });
    }
    let v = builder::vertex(Point3::new(corner[0], corner[1], corner[2]));
    let edge = builder::tsweep(&v, Vector3::new(w, 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, h, 0.0));
    Ok(builder::tsweep(&face, Vector3::new(0.0, 0.0, d)))
}

/// Create a cylinder: circle wire, planar face, translational sweep.
/// The base disc is centred on `base` and the solid extends along `axis`.
pub fn make_cylinder(
    radius: f64,
    height: f64,
    base: [f64; 3],
    axis: [f64; 3],
) -> Result<Solid, KernelError> {
    if radius <= 0.0 || height <= 0.0 {
        return Err(KernelError::ConstructionFailed {
            reason: format!("cylinder needs positive radius and height, got r={radius} h={height}"),
        });
    }
    let v = builder::vertex(Point3::new(radius, 0.0, 0.0));
    let wire = builder::rsweep(&v, Point3::origin(), Vector3::unit_z(), Rad(TAU));
    let face = orient_face(planar_face(wire)?, Vector3::unit_z());
    let solid = builder::tsweep(&face, Vector3::new(0.0, 0.0, height));
    place_along(&solid, base, axis)
}

/// Create a torus: a circular face revolved a full turn.
/// Centred on `centre` with its symmetry axis along `axis`.
pub fn make_torus(
    major: f64,
    minor: f64,
    centre: [f64; 3],
    axis: [f64; 3],
) -> Result<Solid, KernelError> {
    if minor <= 0.0 || major <= minor {
        return Err(KernelError::ConstructionFailed {
            reason: format!("torus needs 0 < minor < major, got major={major} minor={minor}"),
        });
    }
    let tube_centre = Point3::new(major, 0.0, 0.0);
    let v = builder::vertex(Point3::new(major + minor, 0.0, 0.0));
    let wire = builder::rsweep(&v, tube_centre, Vector3::unit_y(), Rad(TAU));
    // The revolution about +Z carries the section towards +Y.
    let section = orient_face(planar_face(wire)?, Vector3::unit_y());
    let solid = builder::rsweep(&section, Point3::origin(), Vector3::unit_z(), Rad(TAU));
    place_along(&solid, centre, axis)
}

/// Rotate a solid built along +Z so that +Z maps onto `axis`, then move
/// its origin to `origin`.
fn place_along(solid: &Solid, origin: [f64; 3], axis: [f64; 3]) -> Result<Solid, KernelError> {
    let a = Vector3::new(axis[0], axis[1], axis[2]);
    if a.magnitude() < 1e-12 {
        return Err(KernelError::ConstructionFailed {
            reason: "axis has zero length".to_string(),
        });
    }
    let a = a.normalize();
    let z = Vector3::unit_z();
    let turned = if a.dot(z) > 1.0 - 1e-12 {
        solid.clone()
    } else if a.dot(z) < -1.0 + 1e-12 {
        builder::rotated(solid, Point3::origin(), Vector3::unit_x(), Rad(PI))
    } else {
        let pivot = z.cross(a).normalize();
        let angle = z.dot(a).clamp(-1.0, 1.0).acos();
        builder::rotated(solid, Point3::origin(), pivot, Rad(angle))
    };
    Ok(builder::translated(
        &turned,
        Vector3::new(origin[0], origin[1], origin[2]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex_bounds(solid: &Solid) -> ([f64; 3], [f64; 3]) {
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for shell in solid.boundaries() {
            for v in shell.vertex_iter() {
                let p = v.point();
                for i in 0..3 {
                    min[i] = min[i].min(p[i]);
                    max[i] = max[i].max(p[i]);
                }
            }
        }
        (min, max)
    }

    #[test]
    fn test_make_box_topology() {
        let solid = make_box([1.0, 2.0, 3.0], [0.0, 0.0, 0.0]).unwrap();

        let boundaries = solid.boundaries();
        assert_eq!(boundaries.len(), 1, "Box should have 1 shell");

        let shell = &boundaries[0];
        let faces: Vec<_> = shell.face_iter().collect();

        let mut edge_ids = std::collections::HashSet::new();
        for edge in shell.edge_iter() {
            edge_ids.insert(edge.id());
        }
        let mut vert_ids = std::collections::HashSet::new();
        for v in shell.vertex_iter() {
            vert_ids.insert(v.id());
        }

        assert_eq!(faces.len(), 6, "Box should have 6 faces");
        assert_eq!(edge_ids.len(), 12, "Box should have 12 edges");
        assert_eq!(vert_ids.len(), 8, "Box should have 8 vertices");
    }

    #[test]
    fn test_make_box_at_corner() {
        let solid = make_box([2.0, 3.0, 4.0], [-1.0, 5.0, 0.5]).unwrap();
        let (min, max) = vertex_bounds(&solid);
        let eps = 1e-10;
        assert!((min[0] + 1.0).abs() < eps && (max[0] - 1.0).abs() < eps);
        assert!((min[1] - 5.0).abs() < eps && (max[1] - 8.0).abs() < eps);
        assert!((min[2] - 0.5).abs() < eps && (max[2] - 4.5).abs() < eps);
    }

    #[test]
    fn test_box_rejects_flat_size() {
        assert!(make_box([1.0, 0.0, 1.0], [0.0; 3]).is_err());
    }

    #[test]
    fn test_cylinder_along_x() {
        let solid = make_cylinder(2.0, 10.0, [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]).unwrap();
        let (min, max) = vertex_bounds(&solid);
        assert!((min[0] - 1.0).abs() < 1e-9, "base should sit at x=1, got {}", min[0]);
        assert!((max[0] - 11.0).abs() < 1e-9, "top should sit at x=11, got {}", max[0]);
    }

    #[test]
    fn test_cylinder_along_negative_z() {
        let solid = make_cylinder(1.0, 4.0, [0.0, 0.0, 0.0], [0.0, 0.0, -1.0]).unwrap();
        let (min, max) = vertex_bounds(&solid);
        assert!((min[2] + 4.0).abs() < 1e-9);
        assert!(max[2].abs() < 1e-9);
    }

    #[test]
    fn test_torus_has_one_shell() {
        let solid = make_torus(5.0, 1.0, [0.0; 3], [1.0, 0.0, 0.0]).unwrap();
        assert_eq!(solid.boundaries().len(), 1);
        assert!(make_torus(1.0, 2.0, [0.0; 3], [0.0, 0.0, 1.0]).is_err());
    }
}
