//! Building blocks shared by the models: pipes, tapers, placement and
//! boolean chains.

use std::fmt;
use std::str::FromStr;

use chamber_kernel::{Kernel, KernelId, KernelSolidHandle};
use chamber_types::{Point2, Profile};
use tracing::debug;

use crate::types::OpError;

pub const ORIGIN: [f64; 3] = [0.0; 3];
pub const NO_ROTATION: [f64; 3] = [0.0; 3];

const X_AXIS: [f64; 3] = [1.0, 0.0, 0.0];
const Y_AXIS: [f64; 3] = [0.0, 1.0, 0.0];
const Z_AXIS: [f64; 3] = [0.0, 0.0, 1.0];

/// Rotate `solid` about `centre` by the degree triple `(rx, ry, rz)`.
/// The rotations are applied about Z first, then X, then Y.
pub fn rotate_at(
    kernel: &mut dyn Kernel,
    solid: &KernelSolidHandle,
    centre: [f64; 3],
    rotation: [f64; 3],
) -> Result<KernelSolidHandle, OpError> {
    let mut current = solid.clone();
    for (axis, degrees) in [(Z_AXIS, rotation[2]), (X_AXIS, rotation[0]), (Y_AXIS, rotation[1])] {
        if degrees != 0.0 {
            current = kernel.rotate(&current, centre, axis, degrees)?;
        }
    }
    Ok(current)
}

/// Rotate about the origin, then move by `loc`.
fn place(
    kernel: &mut dyn Kernel,
    solid: &KernelSolidHandle,
    loc: [f64; 3],
    rotation: [f64; 3],
) -> Result<KernelSolidHandle, OpError> {
    let rotated = rotate_at(kernel, solid, ORIGIN, rotation)?;
    if loc == ORIGIN {
        return Ok(rotated);
    }
    Ok(kernel.translate(&rotated, loc)?)
}

fn require_length(what: &str, length: f64) -> Result<(), OpError> {
    if length.is_nan() || length <= 0.0 {
        return Err(OpError::invalid(format!(
            "{what} must be positive, got {length}"
        )));
    }
    Ok(())
}

/// Extrude an aperture face into a pipe centred on `loc`.
/// Rotation happens about the pipe centre before the move.
pub fn make_beampipe(
    kernel: &mut dyn Kernel,
    face: KernelId,
    length: f64,
    loc: [f64; 3],
    rotation: [f64; 3],
) -> Result<KernelSolidHandle, OpError> {
    require_length("pipe length", length)?;
    let pipe = kernel.extrude_face(face, X_AXIS, length)?;
    let centred = kernel.translate(&pipe, [-length / 2.0, 0.0, 0.0])?;
    place(kernel, &centred, loc, rotation)
}

/// Extrude an aperture face into a pipe whose first end sits on `loc`.
pub fn make_beampipe_from_end(
    kernel: &mut dyn Kernel,
    face: KernelId,
    length: f64,
    loc: [f64; 3],
    rotation: [f64; 3],
) -> Result<KernelSolidHandle, OpError> {
    require_length("pipe length", length)?;
    let pipe = kernel.extrude_face(face, X_AXIS, length)?;
    place(kernel, &pipe, loc, rotation)
}

/// Loft from `start` to `end` over `length`. The centre of the start
/// outline ends up on `loc`; `xy_offset` shifts the end outline sideways.
pub fn make_taper(
    kernel: &mut dyn Kernel,
    start: &Profile,
    end: &Profile,
    length: f64,
    loc: [f64; 3],
    rotation: [f64; 3],
    xy_offset: Point2,
) -> Result<KernelSolidHandle, OpError> {
    require_length("taper length", length)?;
    let taper = kernel.loft(start, end, length, xy_offset)?;
    place(kernel, &taper, loc, rotation)
}

/// Rotate the point `(x, y)` anticlockwise by `degrees` about the origin.
pub fn rotate_cartesian(x: f64, y: f64, degrees: f64) -> (f64, f64) {
    let r = x.hypot(y);
    let a = y.atan2(x) + degrees.to_radians();
    (r * a.cos(), r * a.sin())
}

/// Half-height of an ellipse of the given full `height` and `width` at
/// horizontal position `x`. Zero outside the ellipse.
pub fn ellipse_track(height: f64, width: f64, x: f64) -> f64 {
    let a = width / 2.0;
    let b = height / 2.0;
    (b * b - (b / a * x).powi(2)).max(0.0).sqrt()
}

/// Which wall of the pipe a shadowing bump sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpSide {
    /// The -Y wall (`"ib"`).
    Inboard,
    /// The +Y wall (`"ob"`).
    Outboard,
}

impl FromStr for BumpSide {
    type Err = OpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ib" => Ok(BumpSide::Inboard),
            "ob" => Ok(BumpSide::Outboard),
            other => Err(OpError::invalid(format!(
                "bump side must be \"ib\" or \"ob\", got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for BumpSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpSide::Inboard => f.write_str("ib"),
            BumpSide::Outboard => f.write_str("ob"),
        }
    }
}

/// A trapezoidal ridge on one pipe wall that shadows downstream surfaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowingBump {
    pub pipe_width: f64,
    /// Extent along Z, centred on `z = 0`.
    pub thickness: f64,
    /// How far the flat top stands off the wall.
    pub height: f64,
    pub top_length: f64,
    pub us_length: f64,
    pub ds_length: f64,
    pub side: BumpSide,
    /// Beam-axis position of the centre of the flat top.
    pub position: f64,
}

/// Build the bump as a solid in pipe coordinates.
pub fn add_shadowing_bump(
    kernel: &mut dyn Kernel,
    bump: &ShadowingBump,
) -> Result<KernelSolidHandle, OpError> {
    require_length("bump thickness", bump.thickness)?;
    require_length("bump height", bump.height)?;
    require_length("bump top length", bump.top_length)?;
    if bump.us_length < 0.0 || bump.ds_length < 0.0 {
        return Err(OpError::invalid("bump ramp lengths must not be negative"));
    }
    let (wall, top) = match bump.side {
        BumpSide::Inboard => (-bump.pipe_width / 2.0, -bump.pipe_width / 2.0 + bump.height),
        BumpSide::Outboard => (bump.pipe_width / 2.0, bump.pipe_width / 2.0 - bump.height),
    };
    let us_top = bump.position - bump.top_length / 2.0;
    let ds_top = bump.position + bump.top_length / 2.0;
    // Drawn with h along the beam, then turned into the XY plane.
    let outline = Profile::polygon(&[
        Point2::new(ds_top + bump.ds_length, wall),
        Point2::new(us_top - bump.us_length, wall),
        Point2::new(us_top, top),
        Point2::new(ds_top, top),
    ]);
    outline.validate()?;
    let face = kernel.make_face(&outline)?;
    let slab = kernel.extrude_face(face, X_AXIS, bump.thickness)?;
    let turned = kernel.rotate(&slab, ORIGIN, Y_AXIS, 90.0)?;
    debug!(side = %bump.side, position = bump.position, "shadowing bump");
    Ok(kernel.translate(&turned, [0.0, 0.0, bump.thickness / 2.0])?)
}

/// Union of every solid in order.
pub fn fuse_all(
    kernel: &mut dyn Kernel,
    solids: &[KernelSolidHandle],
) -> Result<KernelSolidHandle, OpError> {
    let (first, rest) = solids
        .split_first()
        .ok_or_else(|| OpError::invalid("nothing to fuse"))?;
    let mut acc = first.clone();
    for solid in rest {
        acc = kernel.boolean_union(&acc, solid)?;
    }
    Ok(acc)
}

/// `base` minus every tool in order.
pub fn cut_all(
    kernel: &mut dyn Kernel,
    base: &KernelSolidHandle,
    tools: &[KernelSolidHandle],
) -> Result<KernelSolidHandle, OpError> {
    let mut acc = base.clone();
    for tool in tools {
        acc = kernel.boolean_subtract(&acc, tool)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotate_cartesian_quarter_turn() {
        let (x, y) = rotate_cartesian(1.0, 0.0, 90.0);
        assert_relative_eq!(x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ellipse_track_edges() {
        assert_relative_eq!(ellipse_track(10.0, 40.0, 0.0), 5.0);
        assert_relative_eq!(ellipse_track(10.0, 40.0, 20.0), 0.0, epsilon = 1e-12);
        assert_eq!(ellipse_track(10.0, 40.0, 30.0), 0.0);
    }

    #[test]
    fn bump_side_parses_only_ib_and_ob() {
        assert_eq!("ib".parse::<BumpSide>().unwrap(), BumpSide::Inboard);
        assert_eq!("ob".parse::<BumpSide>().unwrap(), BumpSide::Outboard);
        assert!(matches!(
            "top".parse::<BumpSide>(),
            Err(OpError::InvalidParameter { .. })
        ));
    }
}
