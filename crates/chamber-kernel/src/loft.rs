//! Ruled loft between two aperture outlines.
//!
//! Both outlines are resampled to rings with the same number of points.
//! Every segment boundary of either outline becomes a sample position on
//! both, so corners survive the resampling. Rings start at the point
//! closest to the +h direction from their bounding-box centre and share
//! the same winding.

use chamber_types::{Point2, Profile};
use truck_modeling::builder;
use truck_modeling::topology::{Shell, Solid};

use crate::types::KernelError;
use crate::wire::polygon_wire;

/// Uniform samples added on top of the segment boundaries.
pub const LOFT_SAMPLES: usize = 64;

const FRACTION_EPS: f64 = 1e-6;

/// Resample two outlines onto rings with matching point counts.
pub fn matched_rings(
    start: &Profile,
    end: &Profile,
    samples: usize,
) -> Result<(Vec<Point2>, Vec<Point2>), KernelError> {
    start.validate()?;
    end.validate()?;
    let a = start.with_positive_winding();
    let b = end.with_positive_winding();
    let a0 = start_fraction(&a);
    let b0 = start_fraction(&b);

    let mut fractions: Vec<f64> = (0..samples.max(3))
        .map(|i| i as f64 / samples.max(3) as f64)
        .collect();
    for f in a.breakpoints() {
        fractions.push((f - a0).rem_euclid(1.0));
    }
    for f in b.breakpoints() {
        fractions.push((f - b0).rem_euclid(1.0));
    }
    fractions.sort_by(f64::total_cmp);
    fractions.dedup_by(|x, y| (*x - *y).abs() < FRACTION_EPS);
    if let Some(&last) = fractions.last() {
        if 1.0 - last < FRACTION_EPS {
            fractions.pop();
        }
    }

    let ring_a = fractions.iter().map(|f| a.point_at_fraction(a0 + f)).collect();
    let ring_b = fractions.iter().map(|f| b.point_at_fraction(b0 + f)).collect();
    Ok((ring_a, ring_b))
}

/// Length fraction of the sample closest to the +h ray from the centre.
fn start_fraction(profile: &Profile) -> f64 {
    let centre = profile.bounds().centre();
    let probes = 720;
    (0..probes)
        .map(|i| i as f64 / probes as f64)
        .min_by(|x, y| {
            let ax = profile.point_at_fraction(*x).angle_from(centre).abs();
            let ay = profile.point_at_fraction(*y).angle_from(centre).abs();
            ax.total_cmp(&ay)
        })
        .unwrap_or(0.0)
}

/// Build the lofted solid: start ring at `x = 0`, end ring at `x = length`
/// displaced by `end_offset`.
pub fn loft_solid(
    start: &Profile,
    end: &Profile,
    length: f64,
    end_offset: Point2,
) -> Result<Solid, KernelError> {
    if length <= 0.0 {
        return Err(KernelError::ConstructionFailed {
            reason: format!("loft length must be positive, got {length}"),
        });
    }
    let (ring_a, ring_b) = matched_rings(start, end, LOFT_SAMPLES)?;
    let ring_b: Vec<Point2> = ring_b
        .iter()
        .map(|p| p.translated(end_offset.h, end_offset.v))
        .collect();

    let w0 = polygon_wire(&ring_a, 0.0);
    let w1 = polygon_wire(&ring_b, length);
    let mut shell: Shell =
        builder::try_wire_homotopy(&w0, &w1).map_err(|e| KernelError::ConstructionFailed {
            reason: format!("loft side faces: {e}"),
        })?;
    let start_cap = builder::try_attach_plane(&[w0.inverse()]).map_err(|e| {
        KernelError::ConstructionFailed {
            reason: format!("loft start cap: {e}"),
        }
    })?;
    let end_cap =
        builder::try_attach_plane(&[w1]).map_err(|e| KernelError::ConstructionFailed {
            reason: format!("loft end cap: {e}"),
        })?;
    shell.push(start_cap);
    shell.push(end_cap);
    Solid::try_new(vec![shell]).map_err(|e| KernelError::ConstructionFailed {
        reason: format!("loft shell is not a closed solid: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chamber_types::Segment;

    fn rect(h: f64, w: f64) -> Profile {
        Profile::polygon(&[
            Point2::new(w / 2.0, -h / 2.0),
            Point2::new(w / 2.0, h / 2.0),
            Point2::new(-w / 2.0, h / 2.0),
            Point2::new(-w / 2.0, -h / 2.0),
        ])
    }

    #[test]
    fn rings_have_equal_length() {
        let (a, b) = matched_rings(
            &rect(10.0, 20.0),
            &Profile::circle(Point2::default(), 8.0),
            32,
        )
        .unwrap();
        assert_eq!(a.len(), b.len());
        assert!(a.len() >= 32);
    }

    #[test]
    fn rings_keep_rectangle_corners() {
        let (a, _) = matched_rings(
            &rect(10.0, 20.0),
            &Profile::circle(Point2::default(), 8.0),
            16,
        )
        .unwrap();
        for corner in [
            Point2::new(10.0, 5.0),
            Point2::new(-10.0, 5.0),
            Point2::new(-10.0, -5.0),
            Point2::new(10.0, -5.0),
        ] {
            assert!(
                a.iter().any(|p| p.distance(corner) < 1e-6),
                "corner {corner:?} missing from ring"
            );
        }
    }

    #[test]
    fn rings_start_on_plus_h_side() {
        let (a, b) = matched_rings(
            &rect(10.0, 20.0),
            &Profile::circle(Point2::new(0.0, 0.0), 8.0),
            64,
        )
        .unwrap();
        assert!(a[0].h > 9.9 && a[0].v.abs() < 0.5, "got {:?}", a[0]);
        assert!(b[0].h > 7.9 && b[0].v.abs() < 0.5, "got {:?}", b[0]);
    }

    #[test]
    fn rings_are_positively_wound() {
        let reversed = rect(4.0, 4.0).reversed();
        let (a, _) = matched_rings(&reversed, &rect(2.0, 2.0), 16).unwrap();
        let ring = Profile::polygon(&a);
        assert!(ring.signed_area() > 0.0);
    }

    #[test]
    fn loft_builds_closed_solid() {
        let arc_end = Profile::new(vec![
            Segment::arc(
                Point2::new(3.0, 0.0),
                Point2::new(0.0, 3.0),
                Point2::new(-3.0, 0.0),
            ),
            Segment::line(Point2::new(-3.0, 0.0), Point2::new(3.0, 0.0)),
        ]);
        let solid = loft_solid(&rect(4.0, 4.0), &arc_end, 10.0, Point2::default()).unwrap();
        assert_eq!(solid.boundaries().len(), 1);
        assert!(loft_solid(&rect(1.0, 1.0), &arc_end, 0.0, Point2::default()).is_err());
    }
}
