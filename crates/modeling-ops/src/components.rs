//! Reusable hardware: coaxial feedthroughs, re-entrant noses and stripline
//! blades.

use chamber_kernel::{Kernel, KernelSolidHandle};
use chamber_types::Point2;
use tracing::debug;

use crate::apertures::make_arc_aperture;
use crate::elements::{fuse_all, make_beampipe, make_taper, rotate_at, NO_ROTATION, ORIGIN};
use crate::types::OpError;

const X_AXIS: [f64; 3] = [1.0, 0.0, 0.0];
const Y_AXIS: [f64; 3] = [0.0, 1.0, 0.0];

/// Inner radius of the N-type outer conductor.
pub const NTYPE_OUTER_INNER_RADIUS: f64 = 4.015;
/// Outer radius of the N-type outer conductor.
pub const NTYPE_OUTER_RADIUS: f64 = 4.5;
const NTYPE_PIN_RADIUS: f64 = 1.5;
/// Corner blend on stripline blades.
pub const STRIPLINE_BLEND_RADIUS: f64 = 0.75;

/// Solids making up a coaxial vacuum feedthrough.
#[derive(Debug, Clone)]
pub struct ConnectorParts {
    pub pin: KernelSolidHandle,
    pub ceramic: KernelSolidHandle,
    pub outer: KernelSolidHandle,
}

struct CoaxDims {
    pin_radius: f64,
    ceramic_radius: f64,
    ceramic_thickness: f64,
    shell_upper_radius: f64,
    shell_upper_thickness: f64,
    shell_upper_inner_radius: f64,
    shell_lower_radius: f64,
    shell_lower_thickness: f64,
    shell_lower_inner_radius: f64,
}

const SMA: CoaxDims = CoaxDims {
    pin_radius: 0.62,
    ceramic_radius: 1.5,
    ceramic_thickness: 2.5,
    shell_upper_radius: 3.0,
    shell_upper_thickness: 5.0,
    shell_upper_inner_radius: 1.75,
    shell_lower_radius: 2.0,
    shell_lower_thickness: 5.0,
    shell_lower_inner_radius: 1.75,
};

const NTYPE: CoaxDims = CoaxDims {
    pin_radius: NTYPE_PIN_RADIUS,
    ceramic_radius: 3.5,
    ceramic_thickness: 5.0,
    shell_upper_radius: 8.0,
    shell_upper_thickness: 10.0,
    shell_upper_inner_radius: NTYPE_OUTER_INNER_RADIUS,
    shell_lower_radius: NTYPE_OUTER_RADIUS,
    shell_lower_thickness: 5.0,
    shell_lower_inner_radius: NTYPE_OUTER_INNER_RADIUS,
};

fn unit(axis: [f64; 3]) -> Result<[f64; 3], OpError> {
    let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
    if len.is_nan() || len < 1e-12 {
        return Err(OpError::invalid("connector axis has zero length"));
    }
    Ok([axis[0] / len, axis[1] / len, axis[2] / len])
}

fn along(loc: [f64; 3], axis: [f64; 3], distance: f64) -> [f64; 3] {
    [
        loc[0] + axis[0] * distance,
        loc[1] + axis[1] * distance,
        loc[2] + axis[2] * distance,
    ]
}

/// The ceramic's vacuum-side face sits on `location`; `axis` points away
/// from the vacuum. `pin_length` is how far the pin reaches into the vacuum.
fn coax_connector(
    kernel: &mut dyn Kernel,
    dims: &CoaxDims,
    pin_length: f64,
    axis: [f64; 3],
    location: [f64; 3],
) -> Result<ConnectorParts, OpError> {
    if pin_length.is_nan() || pin_length < 0.0 {
        return Err(OpError::invalid(format!(
            "pin length must not be negative, got {pin_length}"
        )));
    }
    let axis = unit(axis)?;
    let d = dims;
    let pin = kernel.make_cylinder(
        d.pin_radius,
        pin_length + d.ceramic_thickness + d.shell_upper_thickness,
        along(location, axis, -pin_length),
        axis,
    )?;
    let ceramic1 = kernel.make_cylinder(d.ceramic_radius, d.ceramic_thickness, location, axis)?;
    let upper_base = along(location, axis, d.ceramic_thickness);
    let upper1 = kernel.make_cylinder(d.shell_upper_radius, d.shell_upper_thickness, upper_base, axis)?;
    let upper2 =
        kernel.make_cylinder(d.shell_upper_inner_radius, d.shell_upper_thickness, upper_base, axis)?;
    let middle1 = kernel.make_cylinder(d.shell_upper_radius, d.ceramic_thickness, location, axis)?;
    let lower_base = along(location, axis, -d.shell_lower_thickness);
    let lower1 = kernel.make_cylinder(d.shell_lower_radius, d.shell_lower_thickness, lower_base, axis)?;
    let lower2 =
        kernel.make_cylinder(d.shell_lower_inner_radius, d.shell_lower_thickness, lower_base, axis)?;

    let middle = kernel.boolean_subtract(&middle1, &ceramic1)?;
    let ceramic = kernel.boolean_subtract(&ceramic1, &pin)?;
    let lower_ring = kernel.boolean_subtract(&lower1, &lower2)?;
    let lower = kernel.boolean_union(&lower_ring, &middle)?;
    let upper = kernel.boolean_subtract(&upper1, &upper2)?;
    let outer = kernel.boolean_union(&upper, &lower)?;
    Ok(ConnectorParts { pin, ceramic, outer })
}

pub fn sma_connector(
    kernel: &mut dyn Kernel,
    pin_length: f64,
    axis: [f64; 3],
    location: [f64; 3],
) -> Result<ConnectorParts, OpError> {
    coax_connector(kernel, &SMA, pin_length, axis, location)
}

pub fn ntype_connector(
    kernel: &mut dyn Kernel,
    pin_length: f64,
    axis: [f64; 3],
    location: [f64; 3],
) -> Result<ConnectorParts, OpError> {
    coax_connector(kernel, &NTYPE, pin_length, axis, location)
}

/// Pin, outer ring and the vacuum inside the ring of a bare N-type stub.
#[derive(Debug, Clone)]
pub struct StubParts {
    pub pin: KernelSolidHandle,
    pub outer: KernelSolidHandle,
    pub vac: KernelSolidHandle,
}

/// N-type stub hanging down (-Y) from `location`: a pin of `pin_length`
/// and an outer ring of `ring_length`. The stub is turned by `rotation`
/// about `location` and then by `rotate_around_zero` about the origin.
pub fn ntype_connector_stub(
    kernel: &mut dyn Kernel,
    pin_length: f64,
    ring_length: f64,
    rotation: [f64; 3],
    location: [f64; 3],
    rotate_around_zero: [f64; 3],
) -> Result<StubParts, OpError> {
    for (what, value) in [("pin length", pin_length), ("ring length", ring_length)] {
        if value.is_nan() || value <= 0.0 {
            return Err(OpError::invalid(format!("stub {what} must be positive, got {value}")));
        }
    }
    let pin_base = along(location, Y_AXIS, -pin_length);
    let ring_base = along(location, Y_AXIS, -ring_length);
    let pin = kernel.make_cylinder(NTYPE_PIN_RADIUS, pin_length, pin_base, Y_AXIS)?;
    let ring_outer = kernel.make_cylinder(NTYPE_OUTER_RADIUS, ring_length, ring_base, Y_AXIS)?;
    let ring_inner = kernel.make_cylinder(NTYPE_OUTER_INNER_RADIUS, ring_length, ring_base, Y_AXIS)?;
    let ring = kernel.boolean_subtract(&ring_outer, &ring_inner)?;

    let mut place = |solid: &KernelSolidHandle| -> Result<KernelSolidHandle, OpError> {
        let local = rotate_at(kernel, solid, location, rotation)?;
        rotate_at(kernel, &local, ORIGIN, rotate_around_zero)
    };
    Ok(StubParts {
        pin: place(&pin)?,
        outer: place(&ring)?,
        vac: place(&ring_inner)?,
    })
}

/// Re-entrant nose: a tube of wall `ring_width` around `aperture_radius`
/// ending in a rounded lip, blended into the wall it stands on.
/// The nose points along +X from `loc` before `rot` is applied about `loc`.
pub fn make_nose(
    kernel: &mut dyn Kernel,
    aperture_radius: f64,
    ring_width: f64,
    ring_length: f64,
    blend: f64,
    loc: [f64; 3],
    rot: [f64; 3],
) -> Result<KernelSolidHandle, OpError> {
    if ring_length <= ring_width / 2.0 {
        return Err(OpError::invalid(format!(
            "nose length {ring_length} must exceed half the ring width {ring_width}"
        )));
    }
    if blend <= 0.0 || ring_width <= 0.0 || aperture_radius <= 0.0 {
        return Err(OpError::invalid("nose radii and blend must be positive"));
    }
    let straight = ring_length - ring_width / 2.0;
    let inner = kernel.make_cylinder(aperture_radius, straight, loc, X_AXIS)?;
    let outer = kernel.make_cylinder(aperture_radius + ring_width, straight, loc, X_AXIS)?;
    let blending = kernel.make_cylinder(aperture_radius + ring_width + blend, blend, loc, X_AXIS)?;
    let ring = kernel.boolean_subtract(&outer, &inner)?;
    let blend_ring = kernel.boolean_subtract(&blending, &outer)?;
    let tip = kernel.make_torus(
        aperture_radius + ring_width / 2.0,
        ring_width / 2.0,
        along(loc, X_AXIS, straight),
        X_AXIS,
    )?;
    let blend_curve = kernel.make_torus(
        aperture_radius + ring_width + blend,
        blend,
        along(loc, X_AXIS, blend),
        X_AXIS,
    )?;
    let nose = fuse_all(kernel, &[ring, tip, blend_ring])?;
    let nose = kernel.boolean_subtract(&nose, &blend_curve)?;
    rotate_at(kernel, &nose, loc, rot)
}

/// Dimensions shared by the stripline blades and their feedthroughs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StriplineDims {
    pub pipe_radius: f64,
    pub pipe_thickness: f64,
    pub cavity_radius: f64,
    pub total_stripline_length: f64,
    pub stripline_taper_length: f64,
    /// Radius of the inner face of the blade.
    pub stripline_offset: f64,
    pub stripline_thickness: f64,
    /// Angular width of the blade, degrees.
    pub stripline_width: f64,
    /// Angular width at the tapered ends, degrees.
    pub stripline_taper_end_width: f64,
    /// Extra cavity length beyond each end of the blades.
    pub additional_cavity_length: f64,
    /// Distance of the feedthrough axis from each blade end.
    pub feedthrough_offset: f64,
}

impl StriplineDims {
    /// Length of the untapered middle of a blade.
    pub fn mid_section_length(&self) -> f64 {
        self.total_stripline_length - 2.0 * self.stripline_taper_length
    }

    pub fn total_cavity_length(&self) -> f64 {
        self.total_stripline_length + 2.0 * self.additional_cavity_length
    }

    pub fn port_offset(&self) -> f64 {
        self.total_stripline_length / 2.0 - self.feedthrough_offset
    }

    /// Check the dimensions describe a buildable blade set.
    pub fn validate(&self) -> Result<(), OpError> {
        if self.mid_section_length() <= 0.0 {
            return Err(OpError::invalid(format!(
                "stripline tapers ({} each) leave no middle section in a blade of {}",
                self.stripline_taper_length, self.total_stripline_length
            )));
        }
        if self.stripline_offset + self.stripline_thickness >= self.cavity_radius {
            return Err(OpError::invalid(format!(
                "stripline at radius {} does not fit a cavity of radius {}",
                self.stripline_offset + self.stripline_thickness,
                self.cavity_radius
            )));
        }
        if self.pipe_radius >= self.cavity_radius {
            return Err(OpError::invalid("pipe radius must be smaller than the cavity radius"));
        }
        if self.stripline_taper_end_width > self.stripline_width {
            return Err(OpError::invalid(
                "stripline taper end is wider than the blade",
            ));
        }
        if self.port_offset() <= 0.0 {
            return Err(OpError::invalid("feedthrough offset is larger than half the blade"));
        }
        Ok(())
    }
}

/// Which end of the structure a feedthrough sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortEnd {
    Upstream,
    Downstream,
}

impl PortEnd {
    fn sign(self) -> f64 {
        match self {
            PortEnd::Upstream => -1.0,
            PortEnd::Downstream => 1.0,
        }
    }
}

/// A blade curved on the stripline radius with tapered ends, centred on +Z
/// before being turned `xyrotation` degrees about the beam axis.
pub fn make_stripline(
    kernel: &mut dyn Kernel,
    dims: &StriplineDims,
    xyrotation: f64,
) -> Result<KernelSolidHandle, OpError> {
    dims.validate()?;
    let inner = dims.stripline_offset;
    let outer = inner + dims.stripline_thickness;
    let main = make_arc_aperture(inner, outer, dims.stripline_width, STRIPLINE_BLEND_RADIUS)?;
    let end = make_arc_aperture(
        inner,
        outer,
        dims.stripline_taper_end_width,
        STRIPLINE_BLEND_RADIUS,
    )?;
    let mid = dims.mid_section_length();
    let taper = dims.stripline_taper_length;

    let face = kernel.make_face(&main)?;
    let body = make_beampipe(kernel, face, mid, ORIGIN, NO_ROTATION)?;
    let taper_us = make_taper(
        kernel,
        &end,
        &main,
        taper,
        [-taper - mid / 2.0, 0.0, 0.0],
        NO_ROTATION,
        Point2::default(),
    )?;
    let taper_ds = make_taper(
        kernel,
        &main,
        &end,
        taper,
        [mid / 2.0, 0.0, 0.0],
        NO_ROTATION,
        Point2::default(),
    )?;
    let blade = fuse_all(kernel, &[body, taper_us, taper_ds])?;
    debug!(xyrotation, "stripline blade");
    rotate_at(kernel, &blade, ORIGIN, [xyrotation, 0.0, 0.0])
}

/// Solids of one stripline feedthrough.
#[derive(Debug, Clone)]
pub struct FeedthroughParts {
    pub pin: KernelSolidHandle,
    pub outer: KernelSolidHandle,
    /// Vacuum inside the outer ring.
    pub ring_vacuum: KernelSolidHandle,
    /// Vacuum bore from the beam axis out through the wall.
    pub bore: KernelSolidHandle,
}

/// N-type feedthrough on the +Y wall at one end of the blades, turned
/// `xyrotation` degrees about the beam axis. A blade built with rotation
/// `b` meets the feedthrough built with `b + 90`.
pub fn make_stripline_feedthrough(
    kernel: &mut dyn Kernel,
    dims: &StriplineDims,
    end: PortEnd,
    xyrotation: f64,
) -> Result<FeedthroughParts, OpError> {
    dims.validate()?;
    let mid = dims.mid_section_length();
    let port_offset = dims.port_offset();
    let outer_x = port_offset + NTYPE_OUTER_RADIUS;
    // Radius of the taper wall where the outer conductor meets it.
    let slope = (dims.cavity_radius - dims.pipe_radius)
        / (dims.total_cavity_length() / 2.0 - mid / 2.0);
    let outer_y = dims.cavity_radius - slope * (outer_x - mid / 2.0).max(0.0);
    // The pin stops half way through the blade.
    let pin_length = dims.cavity_radius - dims.stripline_offset + dims.pipe_thickness
        - dims.stripline_thickness / 2.0;
    let ring_start_y = dims.cavity_radius + dims.pipe_thickness;
    let ring_length = ring_start_y - outer_y + 2.0;
    let x = end.sign() * port_offset;
    let turn = [xyrotation, 0.0, 0.0];

    let stub = ntype_connector_stub(
        kernel,
        pin_length,
        ring_length,
        NO_ROTATION,
        [x, ring_start_y, 0.0],
        turn,
    )?;
    let bore = kernel.make_cylinder(NTYPE_OUTER_INNER_RADIUS, ring_start_y, [x, 0.0, 0.0], Y_AXIS)?;
    let bore = rotate_at(kernel, &bore, ORIGIN, turn)?;
    debug!(?end, xyrotation, ring_length, "stripline feedthrough");
    Ok(FeedthroughParts {
        pin: stub.pin,
        outer: stub.outer,
        ring_vacuum: stub.vac,
        bore,
    })
}
