//! Aperture outlines to truck wires and planar faces.
//!
//! Outlines sit in the plane `x = const`; an outline point `(h, v)` is
//! placed at `(x, v, h)`.

use std::f64::consts::TAU;

use chamber_types::{Point2, Profile, Segment};
use truck_modeling::builder;
use truck_modeling::geometry::Surface;
use truck_modeling::topology::{Edge, Face, Vertex, Wire};
use truck_modeling::{EuclideanSpace, InnerSpace, Point3, Rad, Vector3};

use crate::types::KernelError;

pub(crate) fn to_point3(p: Point2, x: f64) -> Point3 {
    Point3::new(x, p.v, p.h)
}

/// Build the boundary wire of `profile` in the plane at `x`.
pub(crate) fn profile_wire(profile: &Profile, x: f64) -> Result<Wire, KernelError> {
    profile.validate()?;
    match profile.segments.as_slice() {
        [Segment::Circle { centre, radius }] => {
            let start = builder::vertex(to_point3(centre.translated(*radius, 0.0), x));
            Ok(builder::rsweep(
                &start,
                to_point3(*centre, x),
                Vector3::unit_x(),
                Rad(TAU),
            ))
        }
        [Segment::Ellipse {
            centre,
            semi_h,
            semi_v,
            angle,
        }] => {
            let start = builder::vertex(Point3::new(0.0, 0.0, 1.0));
            let unit = builder::rsweep(&start, Point3::origin(), Vector3::unit_x(), Rad(TAU));
            let stretched = builder::scaled(
                &unit,
                Point3::origin(),
                Vector3::new(1.0, *semi_v, *semi_h),
            );
            // Rotating about +X turns (h, v) clockwise, hence the sign.
            let turned = builder::rotated(
                &stretched,
                Point3::origin(),
                Vector3::unit_x(),
                Rad(-angle.to_radians()),
            );
            Ok(builder::translated(
                &turned,
                Vector3::new(x, centre.v, centre.h),
            ))
        }
        segments => {
            let vertices: Vec<Vertex> = segments
                .iter()
                .map(|s| builder::vertex(to_point3(s.start(), x)))
                .collect();
            let n = segments.len();
            let edges: Vec<Edge> = segments
                .iter()
                .enumerate()
                .map(|(i, segment)| {
                    let (a, b) = (&vertices[i], &vertices[(i + 1) % n]);
                    match segment {
                        Segment::Arc { through, .. } => {
                            builder::circle_arc(a, b, to_point3(*through, x))
                        }
                        _ => builder::line(a, b),
                    }
                })
                .collect();
            Ok(Wire::from_iter(edges))
        }
    }
}

/// Closed polygon wire through `points` in the plane at `x`.
pub(crate) fn polygon_wire(points: &[Point2], x: f64) -> Wire {
    let vertices: Vec<Vertex> = points
        .iter()
        .map(|p| builder::vertex(to_point3(*p, x)))
        .collect();
    let n = vertices.len();
    (0..n)
        .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % n]))
        .collect()
}

/// Planar face bounded by `wire`.
pub(crate) fn planar_face(wire: Wire) -> Result<Face, KernelError> {
    builder::try_attach_plane(&[wire]).map_err(|e| KernelError::ConstructionFailed {
        reason: format!("failed to create planar face: {e}"),
    })
}

/// Flip `face` if its plane normal points away from `direction`.
pub(crate) fn orient_face(face: Face, direction: Vector3) -> Face {
    match face.oriented_surface() {
        Surface::Plane(plane) if plane.normal().dot(direction) < 0.0 => face.inverse(),
        _ => face,
    }
}
