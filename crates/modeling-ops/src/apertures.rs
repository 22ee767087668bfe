//! Aperture outlines: the transverse cross-sections of pipes, cavities and
//! stripline blades, all centred on the beam axis.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, SQRT_2};

use chamber_types::{ArcGeometry, Point2, Profile, Segment};

use crate::elements::rotate_cartesian;
use crate::types::OpError;

fn positive(what: &str, value: f64) -> Result<(), OpError> {
    if value.is_nan() || value <= 0.0 {
        return Err(OpError::invalid(format!(
            "{what} must be positive, got {value}"
        )));
    }
    Ok(())
}

fn closed(segments: Vec<Segment>) -> Result<Profile, OpError> {
    let profile = Profile::new(segments);
    profile.validate()?;
    Ok(profile)
}

fn line(a: Point2, b: Point2) -> Segment {
    Segment::line(a, b)
}

fn arc(a: Point2, through: Point2, b: Point2) -> Segment {
    Segment::arc(a, through, b)
}

/// Replace a three-point arc that sweeps more than half a turn with the
/// complementary arc between the same end points.
pub fn force_short_arc(segment: Segment) -> Segment {
    let Segment::Arc { start, through, end } = segment else {
        return segment;
    };
    match ArcGeometry::from_points(start, through, end) {
        Some(geom) if geom.sweep.abs() > PI => {
            let short = if geom.sweep > 0.0 {
                geom.sweep - 2.0 * PI
            } else {
                geom.sweep + 2.0 * PI
            };
            let mid = geom.start_angle + short / 2.0;
            let through = Point2::new(
                geom.centre.h + geom.radius * mid.cos(),
                geom.centre.v + geom.radius * mid.sin(),
            );
            Segment::arc(start, through, end)
        }
        _ => segment,
    }
}

/// Stadium with semicircular ends. `height` and `width` are the full
/// extents, as for a rectangle.
pub fn make_racetrack_aperture(height: f64, width: f64) -> Result<Profile, OpError> {
    positive("racetrack height", height)?;
    positive("racetrack width", width)?;
    if width < height {
        return Err(OpError::invalid(format!(
            "racetrack width {width} is smaller than its height {height}"
        )));
    }
    let r = height / 2.0;
    let c = (width - height) / 2.0;
    if c < 1e-9 {
        return Ok(Profile::circle(Point2::default(), r));
    }
    closed(vec![
        line(Point2::new(-c, r), Point2::new(c, r)),
        arc(Point2::new(c, r), Point2::new(c + r, 0.0), Point2::new(c, -r)),
        line(Point2::new(c, -r), Point2::new(-c, -r)),
        arc(Point2::new(-c, -r), Point2::new(-c - r, 0.0), Point2::new(-c, r)),
    ])
}

pub fn make_rectangle_aperture(height: f64, width: f64) -> Result<Profile, OpError> {
    positive("rectangle height", height)?;
    positive("rectangle width", width)?;
    let (h, v) = (width / 2.0, height / 2.0);
    closed(vec![
        line(Point2::new(-h, v), Point2::new(h, v)),
        line(Point2::new(h, v), Point2::new(h, -v)),
        line(Point2::new(h, -v), Point2::new(-h, -v)),
        line(Point2::new(-h, -v), Point2::new(-h, v)),
    ])
}

/// Circular pipe with a slot on the +h side ending in a rounded tip.
/// `keyhole_width` is measured from where the slot meets the pipe.
pub fn make_keyhole_aperture(
    pipe_radius: f64,
    keyhole_height: f64,
    keyhole_width: f64,
) -> Result<Profile, OpError> {
    positive("pipe radius", pipe_radius)?;
    positive("keyhole height", keyhole_height)?;
    if keyhole_height >= 2.0 * pipe_radius {
        return Err(OpError::invalid(format!(
            "keyhole height {keyhole_height} does not fit a pipe of radius {pipe_radius}"
        )));
    }
    let half = keyhole_height / 2.0;
    if keyhole_width <= half {
        return Err(OpError::invalid(format!(
            "keyhole width {keyhole_width} must exceed half the keyhole height"
        )));
    }
    let meet = (pipe_radius * pipe_radius - half * half).sqrt();
    let straight_end = meet + keyhole_width - half;
    closed(vec![
        arc(
            Point2::new(meet, -half),
            Point2::new(-pipe_radius, 0.0),
            Point2::new(meet, half),
        ),
        line(Point2::new(meet, half), Point2::new(straight_end, half)),
        arc(
            Point2::new(straight_end, half),
            Point2::new(meet + keyhole_width, 0.0),
            Point2::new(straight_end, -half),
        ),
        line(Point2::new(straight_end, -half), Point2::new(meet, -half)),
    ])
}

/// Annular sector centred on +h spanning `arc_length` degrees.
/// A non-zero `blend_radius` rounds all four corners.
pub fn make_arc_aperture(
    inner_radius: f64,
    outer_radius: f64,
    arc_length: f64,
    blend_radius: f64,
) -> Result<Profile, OpError> {
    positive("arc inner radius", inner_radius)?;
    if outer_radius <= inner_radius {
        return Err(OpError::invalid(format!(
            "arc outer radius {outer_radius} must exceed inner radius {inner_radius}"
        )));
    }
    if !(arc_length > 0.0 && arc_length < 360.0) {
        return Err(OpError::invalid(format!(
            "arc length must lie in (0, 360) degrees, got {arc_length}"
        )));
    }
    if blend_radius.is_nan() || blend_radius < 0.0 {
        return Err(OpError::invalid(format!(
            "blend radius must not be negative, got {blend_radius}"
        )));
    }

    let (s, c) = (arc_length / 2.0).to_radians().sin_cos();
    // Corner coordinates: `a*` across the sector, `r*` along its axis.
    let (ao, ro) = (outer_radius * s, outer_radius * c);
    let (ai, ri) = (inner_radius * s, inner_radius * c);
    let at = |across: f64, radial: f64| Point2::new(radial, across);
    let outer_mid = at(0.0, outer_radius);
    let inner_mid = at(0.0, inner_radius);

    if blend_radius == 0.0 {
        let (p1, p2) = (at(-ao, ro), at(ao, ro));
        let (p3, p4) = (at(-ai, ri), at(ai, ri));
        return closed(vec![
            arc(p1, outer_mid, p2),
            line(p2, p4),
            arc(p4, inner_mid, p3),
            line(p3, p1),
        ]);
    }

    let b = blend_radius;
    let side = ((ro - ri).abs() / (ao - ai).abs()).atan();
    let (hp, vp) = (b * side.cos(), b * side.sin());
    let (hap, vap) = (b * (FRAC_PI_2 - side).cos(), b * (FRAC_PI_2 - side).sin());
    let k = b * (SQRT_2 - 1.0);
    let corner = |angle: f64| (k * angle.sin(), k * angle.cos());
    let (hm1, vm1) = corner(-FRAC_PI_4 - side + PI);
    let (hm2, vm2) = corner(-FRAC_PI_4 - side);
    let (hm3, vm3) = corner(-FRAC_PI_2 - side);

    let p1_1 = at(-ao + hp, ro - vp);
    let p1_2 = at(-ao + hap, ro + vap);
    let p2_1 = at(ao - hap, ro + vap);
    let p2_2 = at(ao - hp, ro - vp);
    let p3_1 = at(-ai + hap, ri + vap);
    let p3_2 = at(-ai - hp, ri + vp);
    let p4_1 = at(ai + hp, ri + vp);
    let p4_2 = at(ai - hap, ri + vap);
    let c1 = at(-ao + hm1, ro - vm1);
    let c2 = at(ao + hm2, ro + vm2);
    let c3 = at(-ai - hm3, ri - vm3);
    let c4 = at(ai + hm3, ri - vm3);

    closed(vec![
        arc(p1_2, outer_mid, p2_1),
        arc(p2_1, c2, p2_2),
        line(p2_2, p4_1),
        arc(p4_1, c4, p4_2),
        arc(p4_2, inner_mid, p3_1),
        arc(p3_1, c3, p3_2),
        line(p3_2, p1_1),
        arc(p1_1, c1, p1_2),
    ])
}

/// Sagitta of a circular arc of `radius` over a chord of `chord`.
fn sagitta(radius: f64, chord: f64) -> Result<f64, OpError> {
    if radius < chord / 2.0 {
        return Err(OpError::invalid(format!(
            "arc radius {radius} is smaller than half the chord {chord}"
        )));
    }
    Ok(radius - (radius * radius - chord * chord / 4.0).sqrt())
}

/// Rectangle whose bottom edge bows upwards along a circular arc.
pub fn make_arched_base_aperture(
    height: f64,
    width: f64,
    arc_radius: f64,
) -> Result<Profile, OpError> {
    make_arched_base_trapezoid_aperture(height, width, width, arc_radius)
}

/// Trapezoid (wide `base_width` at the bottom) whose bottom edge bows upwards.
pub fn make_arched_base_trapezoid_aperture(
    height: f64,
    base_width: f64,
    top_width: f64,
    arc_radius: f64,
) -> Result<Profile, OpError> {
    positive("aperture height", height)?;
    positive("base width", base_width)?;
    positive("top width", top_width)?;
    let rise = sagitta(arc_radius, base_width)?;
    if rise >= height {
        return Err(OpError::invalid(format!(
            "arched base rises {rise} which exceeds the aperture height {height}"
        )));
    }
    let v = height / 2.0;
    let top_left = Point2::new(-top_width / 2.0, v);
    let top_right = Point2::new(top_width / 2.0, v);
    let base_right = Point2::new(base_width / 2.0, -v);
    let base_left = Point2::new(-base_width / 2.0, -v);
    closed(vec![
        line(base_left, top_left),
        line(top_left, top_right),
        line(top_right, base_right),
        arc(base_right, Point2::new(0.0, -v + rise), base_left),
    ])
}

/// Circle of `outer_radius` pinched to `inner_radius` over `±insert_angle`
/// degrees around the top and bottom.
pub fn make_cylinder_with_inserts(
    outer_radius: f64,
    inner_radius: f64,
    insert_angle: f64,
    blend_radius: f64,
) -> Result<Profile, OpError> {
    positive("insert radius", inner_radius)?;
    if outer_radius <= inner_radius {
        return Err(OpError::invalid(format!(
            "outer radius {outer_radius} must exceed insert radius {inner_radius}"
        )));
    }
    if !(insert_angle > 0.0 && insert_angle < 90.0) {
        return Err(OpError::invalid(format!(
            "insert angle must lie in (0, 90) degrees, got {insert_angle}"
        )));
    }
    if blend_radius.is_nan() || blend_radius < 0.0 {
        return Err(OpError::invalid(format!(
            "blend radius must not be negative, got {blend_radius}"
        )));
    }
    let (s, c) = insert_angle.to_radians().sin_cos();
    // `at(v, h)`: the corner tables read most naturally vertical-first.
    let at = |v: f64, h: f64| Point2::new(h, v);
    let (vo, ho) = (outer_radius * c, outer_radius * s);
    let (vi, hi) = (inner_radius * c, inner_radius * s);
    let right = at(0.0, outer_radius);
    let left = at(0.0, -outer_radius);
    let bottom = at(-inner_radius, 0.0);
    let top = at(inner_radius, 0.0);

    if blend_radius == 0.0 {
        let p1 = at(vo, ho);
        let p2 = at(-vo, ho);
        let p3 = at(-vi, hi);
        let p4 = at(-vi, -hi);
        let p5 = at(-vo, -ho);
        let p6 = at(vo, -ho);
        let p7 = at(vi, -hi);
        let p8 = at(vi, hi);
        return closed(vec![
            arc(p1, right, p2),
            line(p2, p3),
            arc(p3, bottom, p4),
            line(p4, p5),
            arc(p5, left, p6),
            line(p6, p7),
            arc(p7, top, p8),
            line(p8, p1),
        ]);
    }

    let (bv, bh) = (blend_radius * c, blend_radius * s);
    let p1_1 = at(vo - bv, ho - bh);
    let c1 = at(vo - bv / 1.8, ho);
    let p1_2 = at(vo - bv, ho + bh);
    let p2_1 = at(-vo + bv, ho + bh);
    let c2 = at(-vo + bv / 1.8, ho);
    let p2_2 = at(-vo + bv, ho - bh);
    let p3_1 = at(-vi - bv, hi + bh);
    let c3 = at(-vi - bv / 2.5, hi);
    let p3_2 = at(-vi - bv / 2.0, hi - bh);
    let p4_1 = at(-vi - bv / 2.0, -hi + bh);
    let c4 = at(-vi - bv / 2.5, -hi);
    let p4_2 = at(-vi - bv, -hi - bh);
    let p5_1 = at(-vo + bv, -ho + bh);
    let c5 = at(-vo + bv / 1.8, -ho);
    let p5_2 = at(-vo + bv, -ho - bh);
    let p6_1 = at(vo - bv, -ho - bh);
    let c6 = at(vo - bv / 1.8, -ho);
    let p6_2 = at(vo - bv, -ho + bh);
    let p7_1 = at(vi + bv, -hi - bh);
    let c7 = at(vi + bv / 2.5, -hi);
    let p7_2 = at(vi + bv / 2.0, -hi + bh);
    let p8_1 = at(vi + bv / 2.0, hi - bh);
    let c8 = at(vi + bv / 2.5, hi);
    let p8_2 = at(vi + bv, hi + bh);

    closed(vec![
        arc(p1_1, c1, p1_2),
        arc(p1_2, right, p2_1),
        arc(p2_1, c2, p2_2),
        line(p2_2, p3_1),
        arc(p3_1, c3, p3_2),
        arc(p3_2, bottom, p4_1),
        arc(p4_1, c4, p4_2),
        line(p4_2, p5_1),
        arc(p5_1, c5, p5_2),
        arc(p5_2, left, p6_1),
        arc(p6_1, c6, p6_2),
        line(p6_2, p7_1),
        arc(p7_1, c7, p7_2),
        arc(p7_2, top, p8_1),
        arc(p8_1, c8, p8_2),
        line(p8_2, p1_1),
    ])
}

fn check_lists(what: &str, lengths: &[usize]) -> Result<(), OpError> {
    match lengths.first() {
        Some(0) | None => Err(OpError::invalid(format!("{what}: no entries given"))),
        Some(&n) if lengths.iter().any(|&l| l != n) => Err(OpError::invalid(format!(
            "{what}: list lengths disagree ({lengths:?})"
        ))),
        _ => Ok(()),
    }
}

/// Point at `radius` and `angle` degrees, measured from +v towards +h.
fn spoke_point(radius: f64, angle: f64) -> Point2 {
    let (s, c) = angle.to_radians().sin_cos();
    Point2::new(radius * s, radius * c)
}

/// Circle of `inner_radius` with spokes reaching out to `outer_radius`.
/// Spoke `i` is centred on `insert_angles[i]` and spans `spoke_extents[i]`.
/// Angles are in degrees, measured from +v towards +h, and must increase.
pub fn make_spoked_cylinder(
    outer_radius: f64,
    inner_radius: f64,
    insert_angles: &[f64],
    spoke_extents: &[f64],
) -> Result<Profile, OpError> {
    check_lists("spoked cylinder", &[insert_angles.len(), spoke_extents.len()])?;
    positive("inner radius", inner_radius)?;
    if outer_radius <= inner_radius {
        return Err(OpError::invalid(format!(
            "outer radius {outer_radius} must exceed inner radius {inner_radius}"
        )));
    }
    for &extent in spoke_extents {
        positive("spoke extent", extent)?;
    }

    let n = insert_angles.len();
    let mut segments = Vec::with_capacity(4 * n);
    let first = spoke_point(inner_radius, insert_angles[0] - spoke_extents[0] / 2.0);
    let mut gap: Option<(Point2, Point2)> = None;
    for i in 0..n {
        let (angle, extent) = (insert_angles[i], spoke_extents[i]);
        let inner_start = spoke_point(inner_radius, angle - extent / 2.0);
        if let Some((from, through)) = gap {
            segments.push(arc(from, through, inner_start));
        }
        let outer_start = spoke_point(outer_radius, angle - extent / 2.0);
        let outer_end = spoke_point(outer_radius, angle + extent / 2.0);
        let inner_end = spoke_point(inner_radius, angle + extent / 2.0);
        segments.push(line(inner_start, outer_start));
        segments.push(arc(outer_start, spoke_point(outer_radius, angle), outer_end));
        segments.push(line(outer_end, inner_end));
        let next = if i + 1 < n {
            insert_angles[i + 1]
        } else {
            insert_angles[0] + 360.0
        };
        gap = Some((inner_end, spoke_point(inner_radius, (angle + next) / 2.0)));
    }
    if let Some((from, through)) = gap {
        segments.push(arc(from, through, first));
    }
    closed(segments)
}

/// Point `offset` across and `radial` out along a tag centred on `angle`
/// degrees. A tag at 0 points along +h; angles turn from +h towards -v.
fn tag_point(offset: f64, radial: f64, angle: f64) -> Point2 {
    let (across, out) = rotate_cartesian(offset, radial, angle);
    Point2::new(out, across)
}

/// Half-chord height of a chord of `width` across a circle of `radius`.
fn chord_height(radius: f64, width: f64) -> Result<f64, OpError> {
    if width >= 2.0 * radius {
        return Err(OpError::invalid(format!(
            "tag width {width} does not fit a radius of {radius}"
        )));
    }
    Ok((radius * radius - width * width / 4.0).sqrt())
}

/// Circle of `inner_radius` with flat-sided tags reaching `outer_radius`.
pub fn make_cylinder_with_tags(
    outer_radius: f64,
    inner_radius: f64,
    insert_angles: &[f64],
    tag_widths: &[f64],
) -> Result<Profile, OpError> {
    let radii = vec![outer_radius; insert_angles.len()];
    tagged_outline(inner_radius, &radii, insert_angles, tag_widths, true)
}

/// Polygon through the inner corners of tags of individual radii.
pub fn make_polygon_with_tags(
    inner_radius: f64,
    tag_radii: &[f64],
    insert_angles: &[f64],
    tag_widths: &[f64],
) -> Result<Profile, OpError> {
    tagged_outline(inner_radius, tag_radii, insert_angles, tag_widths, false)
}

fn tagged_outline(
    inner_radius: f64,
    tag_radii: &[f64],
    insert_angles: &[f64],
    tag_widths: &[f64],
    round_between: bool,
) -> Result<Profile, OpError> {
    check_lists(
        "tagged outline",
        &[insert_angles.len(), tag_widths.len(), tag_radii.len()],
    )?;
    positive("inner radius", inner_radius)?;
    for (&radius, &width) in tag_radii.iter().zip(tag_widths) {
        positive("tag width", width)?;
        if radius <= inner_radius {
            return Err(OpError::invalid(format!(
                "tag radius {radius} must exceed inner radius {inner_radius}"
            )));
        }
    }

    let n = insert_angles.len();
    let mut segments = Vec::with_capacity(4 * n);
    let mut first = None;
    let mut gap: Option<(Point2, f64)> = None;
    for i in 0..n {
        let (angle, width, radius) = (insert_angles[i], tag_widths[i], tag_radii[i]);
        let bottom = chord_height(inner_radius, width)?;
        let top = chord_height(radius, width)?;
        let p1 = tag_point(width / 2.0, bottom, angle);
        let p2 = tag_point(width / 2.0, top, angle);
        let p4 = tag_point(-width / 2.0, top, angle);
        let p5 = tag_point(-width / 2.0, bottom, angle);
        first.get_or_insert(p1);
        if let Some((from, mid_angle)) = gap {
            segments.push(between(from, mid_angle, p1, inner_radius, round_between));
        }
        segments.push(line(p1, p2));
        segments.push(force_short_arc(arc(p2, tag_point(0.0, radius, angle), p4)));
        segments.push(line(p4, p5));
        let next = if i + 1 < n {
            insert_angles[i + 1]
        } else {
            insert_angles[0] + 360.0
        };
        gap = Some((p5, (angle + next) / 2.0));
    }
    if let (Some((from, mid_angle)), Some(p0)) = (gap, first) {
        segments.push(between(from, mid_angle, p0, inner_radius, round_between));
    }
    closed(segments)
}

fn between(from: Point2, mid_angle: f64, to: Point2, radius: f64, round: bool) -> Segment {
    if round {
        force_short_arc(arc(from, tag_point(0.0, radius, mid_angle), to))
    } else {
        line(from, to)
    }
}

pub fn make_circular_aperture(radius: f64) -> Result<Profile, OpError> {
    positive("aperture radius", radius)?;
    Ok(Profile::circle(Point2::default(), radius))
}

/// Symmetric octagon. `side_length` is the vertical edge on each side,
/// `tb_length` the horizontal edge top and bottom.
pub fn make_octagonal_aperture(
    height: f64,
    width: f64,
    side_length: f64,
    tb_length: f64,
) -> Result<Profile, OpError> {
    positive("octagon height", height)?;
    positive("octagon width", width)?;
    positive("octagon side length", side_length)?;
    positive("octagon top/bottom length", tb_length)?;
    if side_length >= height || tb_length >= width {
        return Err(OpError::invalid(
            "octagon edges must be shorter than the overall height and width",
        ));
    }
    let (w, h) = (width / 2.0, height / 2.0);
    let (s, t) = (side_length / 2.0, tb_length / 2.0);
    Ok(Profile::polygon(&[
        Point2::new(-t, h),
        Point2::new(t, h),
        Point2::new(w, s),
        Point2::new(w, -s),
        Point2::new(t, -h),
        Point2::new(-t, -h),
        Point2::new(-w, -s),
        Point2::new(-w, s),
    ]))
}

/// Dimensions of an octagonal chamber with keyhole slots on both sides
/// and an antichamber beyond the inboard slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyholeOctagon {
    pub aperture_height: f64,
    pub tb_width: f64,
    pub ib_oct_width: f64,
    pub ob_oct_width: f64,
    pub ib_keyhole_height: f64,
    pub ib_keyhole_width: f64,
    pub ob_keyhole_height: f64,
    pub ob_keyhole_width: f64,
    pub antichamber_taper_width: f64,
    pub antichamber_height: f64,
    pub antichamber_width: f64,
}

pub fn make_octagonal_aperture_with_keyholes_and_antichamber(
    dims: &KeyholeOctagon,
) -> Result<Profile, OpError> {
    let d = dims;
    for (what, value) in [
        ("aperture height", d.aperture_height),
        ("top/bottom width", d.tb_width),
        ("inboard octagon width", d.ib_oct_width),
        ("outboard octagon width", d.ob_oct_width),
        ("inboard keyhole height", d.ib_keyhole_height),
        ("inboard keyhole width", d.ib_keyhole_width),
        ("outboard keyhole height", d.ob_keyhole_height),
        ("outboard keyhole width", d.ob_keyhole_width),
        ("antichamber taper width", d.antichamber_taper_width),
        ("antichamber height", d.antichamber_height),
        ("antichamber width", d.antichamber_width),
    ] {
        positive(what, value)?;
    }
    if d.ib_keyhole_height >= d.aperture_height || d.ob_keyhole_height >= d.aperture_height {
        return Err(OpError::invalid(
            "keyhole slots must be lower than the octagon",
        ));
    }

    let x1 = -d.tb_width / 2.0 - d.ob_oct_width - d.ob_keyhole_width;
    let x2 = -d.tb_width / 2.0 - d.ob_oct_width;
    let x3 = -d.tb_width / 2.0;
    let x4 = d.tb_width / 2.0;
    let x5 = x4 + d.ib_oct_width;
    let x6 = x5 + d.ib_keyhole_width;
    let x7 = x6 + d.antichamber_taper_width;
    let x8 = x7 + d.antichamber_width;
    let y1 = d.ob_keyhole_height / 2.0;
    let y2 = d.aperture_height / 2.0;
    let y3 = d.ib_keyhole_height / 2.0;
    let y4 = d.antichamber_height / 2.0;

    Ok(Profile::polygon(&[
        Point2::new(x1, y1),
        Point2::new(x2, y1),
        Point2::new(x3, y2),
        Point2::new(x4, y2),
        Point2::new(x5, y3),
        Point2::new(x6, y3),
        Point2::new(x7, y4),
        Point2::new(x8, y4),
        Point2::new(x8, -y4),
        Point2::new(x7, -y4),
        Point2::new(x6, -y3),
        Point2::new(x5, -y3),
        Point2::new(x4, -y2),
        Point2::new(x3, -y2),
        Point2::new(x2, -y1),
        Point2::new(x1, -y1),
    ]))
}

pub fn make_elliptical_aperture(height: f64, width: f64) -> Result<Profile, OpError> {
    positive("ellipse height", height)?;
    positive("ellipse width", width)?;
    Ok(Profile::ellipse(Point2::default(), width / 2.0, height / 2.0))
}
