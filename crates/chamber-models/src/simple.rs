//! Box-and-cylinder test geometries with no lofted sections.

use chamber_kernel::Kernel;
use chamber_types::{InputParameters, ParseError, Parameters};
use modeling_ops::{cut_all, fuse_all, make_beampipe, make_circular_aperture, Parts, NO_ROTATION, ORIGIN};

use crate::types::{Model, ModelError};

/// Two flat plates either side of the beam, fused into a single part.
pub struct SimpleParallelPlates;

struct PlateParams {
    plate_length: f64,
    plate_width: f64,
    plate_thickness: f64,
    plate_offset: f64,
}

impl PlateParams {
    fn from_parameters(p: &Parameters) -> Result<Self, ParseError> {
        Ok(Self {
            plate_length: p.length("plate_length")?,
            plate_width: p.length("plate_width")?,
            plate_thickness: p.length("plate_thickness")?,
            plate_offset: p.length("plate_offset")?,
        })
    }
}

impl Model for SimpleParallelPlates {
    fn name(&self) -> &'static str {
        "simple_parallel_plates"
    }

    fn default_parameters(&self) -> InputParameters {
        InputParameters::new()
            .scalar("plate_length", "150mm")
            .scalar("plate_width", "14mm")
            .scalar("plate_thickness", "1.75mm")
            .scalar("plate_offset", "7mm")
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = PlateParams::from_parameters(params)?;
        let size = [p.plate_length, p.plate_thickness, p.plate_width];
        let y = p.plate_offset + p.plate_thickness / 2.0;
        let upper = kernel.make_box(size, [-p.plate_length / 2.0, y, -p.plate_width / 2.0])?;
        let lower = kernel.make_box(size, [-p.plate_length / 2.0, -y, -p.plate_width / 2.0])?;
        let plates = kernel.boolean_union(&upper, &lower)?;

        let mut parts = Parts::new();
        parts.insert("plates", plates);
        Ok(parts)
    }
}

/// Length of the feedthrough hole cylinders, long enough to clear any wall.
const HOLE_LENGTH: f64 = 100.0;
/// Gap between the stripline face and the start of the feedthrough hole.
const HOLE_CLEARANCE: f64 = 5.0;
const STRIPLINE_THICKNESS: f64 = 2.0;

/// Pillbox-like cavity holding two flat striplines above and below the
/// beam, each fed by a pin at both ends.
pub struct SimpleStripline;

struct SimpleStriplineParams {
    cavity_radius: f64,
    cavity_length: f64,
    pipe_radius: f64,
    pipe_length: f64,
    port_offset: f64,
    stripline_length: f64,
    stripline_width: f64,
    stripline_offset: f64,
    feedthrough_hole_radius: f64,
    feedthrough_pin_radius: f64,
}

impl SimpleStriplineParams {
    fn from_parameters(p: &Parameters) -> Result<Self, ParseError> {
        Ok(Self {
            cavity_radius: p.length("cavity_radius")?,
            cavity_length: p.length("cavity_length")?,
            pipe_radius: p.length("pipe_radius")?,
            pipe_length: p.length("pipe_length")?,
            port_offset: p.length("port_offset")?,
            stripline_length: p.length("stripline_length")?,
            stripline_width: p.length("stripline_width")?,
            stripline_offset: p.length("stripline_offset")?,
            feedthrough_hole_radius: p.length("feedthrough_hole_radius")?,
            feedthrough_pin_radius: p.length("feedthrough_pin_radius")?,
        })
    }
}

impl Model for SimpleStripline {
    fn name(&self) -> &'static str {
        "simple_stripline"
    }

    fn default_parameters(&self) -> InputParameters {
        InputParameters::new()
            .scalar("cavity_radius", "80mm")
            .scalar("cavity_length", "100mm")
            .scalar("pipe_radius", "10mm")
            .scalar("pipe_length", "80mm")
            .scalar("port_offset", "30mm")
            .scalar("stripline_length", "70mm")
            .scalar("stripline_width", "10mm")
            .scalar("stripline_offset", "30mm")
            .scalar("feedthrough_hole_radius", "5mm")
            .scalar("feedthrough_pin_radius", "1mm")
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = SimpleStriplineParams::from_parameters(params)?;
        let pipe_centre = p.pipe_length / 2.0 + p.cavity_length / 2.0;
        let pipe = kernel.make_face(&make_circular_aperture(p.pipe_radius)?)?;
        let cavity = kernel.make_face(&make_circular_aperture(p.cavity_radius)?)?;
        let body = [
            make_beampipe(kernel, pipe, p.pipe_length, [-pipe_centre, 0.0, 0.0], NO_ROTATION)?,
            make_beampipe(kernel, cavity, p.cavity_length, ORIGIN, NO_ROTATION)?,
            make_beampipe(kernel, pipe, p.pipe_length, [pipe_centre, 0.0, 0.0], NO_ROTATION)?,
        ];
        let outer = fuse_all(kernel, &body)?;

        let hole_start = p.stripline_offset + HOLE_CLEARANCE;
        let pin_length = p.cavity_radius - p.stripline_offset;
        let mut holes = Vec::with_capacity(4);
        let mut pins = Vec::with_capacity(4);
        for side in [-1.0, 1.0] {
            let axis = [0.0, side, 0.0];
            for end in [-1.0, 1.0] {
                let x = end * p.port_offset;
                holes.push(kernel.make_cylinder(
                    p.feedthrough_hole_radius,
                    HOLE_LENGTH,
                    [x, side * hole_start, 0.0],
                    axis,
                )?);
                pins.push(kernel.make_cylinder(
                    p.feedthrough_pin_radius,
                    pin_length,
                    [x, side * p.stripline_offset, 0.0],
                    axis,
                )?);
            }
        }
        let cavity = cut_all(kernel, &outer, &holes)?;
        let pins = fuse_all(kernel, &pins)?;

        let size = [p.stripline_length, STRIPLINE_THICKNESS, p.stripline_width];
        let x0 = -p.stripline_length / 2.0;
        let z0 = -p.stripline_width / 2.0;
        let upper = kernel.make_box(size, [x0, p.stripline_offset, z0])?;
        let lower = kernel.make_box(size, [x0, -p.stripline_offset, z0])?;
        let striplines = kernel.boolean_union(&upper, &lower)?;

        let mut parts = Parts::new();
        parts.insert("cavity", cavity);
        parts.insert("striplines", striplines);
        parts.insert("pins", pins);
        Ok(parts)
    }
}
