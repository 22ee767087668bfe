//! Button pickup block on an elliptical beam pipe.

use chamber_kernel::{Kernel, KernelSolidHandle};
use chamber_types::{InputParameters, ParseError, Parameters};
use modeling_ops::{
    cut_all, ellipse_track, fuse_all, make_beampipe, make_elliptical_aperture, rotate_at, Parts,
    NO_ROTATION, ORIGIN,
};
use tracing::debug;

use crate::types::{sweeps, Model, ModelError, Sweep};

/// Four buttons set into a cylindrical block around an elliptical pipe,
/// one per transverse quadrant, each tilted towards the vertical.
pub struct SimpleButtons;

const HOLE_LENGTH: f64 = 100.0;
/// (radius, start above the pipe wall) of each step of the stepped hole.
/// The first step starts below the wall so the hole breaks through cleanly.
const HOLE_STEPS: [(Option<f64>, f64); 4] = [
    (None, -2.0),
    (Some(5.25), 5.0),
    (Some(6.5), 8.5),
    (Some(8.7), 18.0),
];

/// Extra length of the vacuum pipe so it pokes out of both pipe ends.
const VAC_OVERHANG: f64 = 2.0;

/// Sign of each button position as (horizontal, vertical, along the beam).
const QUADRANTS: [[f64; 3]; 4] = [
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0],
];

struct ButtonParams {
    pipe_width: f64,
    pipe_height: f64,
    pipe_length: f64,
    pipe_thickness: f64,
    block_radius: f64,
    block_s: f64,
    button_hole_radius: f64,
    button_horizontal_offset: f64,
    button_s_offset: f64,
    button_angle: f64,
    button_radius: f64,
    button_thickness: f64,
    button_offset: f64,
    button_ring_inner_radius: f64,
    button_ring_outer_radius: f64,
    pin_radius: f64,
    pin_height: f64,
    ceramic_radius: f64,
    ceramic_thickness: f64,
    ceramic_offset: f64,
    shell_upper_radius: f64,
    shell_upper_thickness: f64,
    shell_upper_inner_radius: f64,
    shell_lower_radius: f64,
    shell_lower_thickness: f64,
    shell_lower_inner_radius: f64,
}

impl ButtonParams {
    fn from_parameters(p: &Parameters) -> Result<Self, ParseError> {
        Ok(Self {
            pipe_width: p.length("pipe_width")?,
            pipe_height: p.length("pipe_height")?,
            pipe_length: p.length("pipe_length")?,
            pipe_thickness: p.length("pipe_thickness")?,
            block_radius: p.length("block_radius")?,
            block_s: p.length("block_s")?,
            button_hole_radius: p.length("button_hole_radius")?,
            button_horizontal_offset: p.length("button_horizontal_offset")?,
            button_s_offset: p.length("button_s_offset")?,
            button_angle: p.angle("button_angle")?,
            button_radius: p.length("button_radius")?,
            button_thickness: p.length("button_thickness")?,
            button_offset: p.length("button_offset")?,
            button_ring_inner_radius: p.length("button_ring_inner_radius")?,
            button_ring_outer_radius: p.length("button_ring_outer_radius")?,
            pin_radius: p.length("pin_radius")?,
            pin_height: p.length("pin_height")?,
            ceramic_radius: p.length("ceramic_radius")?,
            ceramic_thickness: p.length("ceramic_thickness")?,
            ceramic_offset: p.length("ceramic_offset")?,
            shell_upper_radius: p.length("shell_upper_radius")?,
            shell_upper_thickness: p.length("shell_upper_thickness")?,
            shell_upper_inner_radius: p.length("shell_upper_inner_radius")?,
            shell_lower_radius: p.length("shell_lower_radius")?,
            shell_lower_thickness: p.length("shell_lower_thickness")?,
            shell_lower_inner_radius: p.length("shell_lower_inner_radius")?,
        })
    }
}

/// Where one button sits. Heights are measured outwards from the beam axis.
struct Placement {
    s: f64,
    h: f64,
    /// +1 above the beam, -1 below.
    v: f64,
    wall: f64,
    tilt: f64,
}

impl Placement {
    fn new(p: &ButtonParams, q: [f64; 3]) -> Self {
        let h = q[0] * p.button_horizontal_offset;
        Self {
            s: q[2] * p.button_s_offset,
            h,
            v: q[1],
            wall: ellipse_track(p.pipe_height, p.pipe_width, h),
            tilt: q[0] * q[1] * p.button_angle,
        }
    }

    fn base(&self, height: f64) -> [f64; 3] {
        [self.s, self.v * height, self.h]
    }

    fn axis(&self) -> [f64; 3] {
        [0.0, self.v, 0.0]
    }

    fn cylinder(
        &self,
        kernel: &mut dyn Kernel,
        radius: f64,
        length: f64,
        height: f64,
    ) -> Result<KernelSolidHandle, ModelError> {
        Ok(kernel.make_cylinder(radius, length, self.base(height), self.axis())?)
    }

    /// Tilt about the point where the button axis meets the pipe wall.
    fn tilt(
        &self,
        kernel: &mut dyn Kernel,
        solid: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, ModelError> {
        Ok(rotate_at(kernel, solid, self.base(self.wall), [self.tilt, 0.0, 0.0])?)
    }
}

fn button_hole(
    kernel: &mut dyn Kernel,
    p: &ButtonParams,
    at: &Placement,
) -> Result<KernelSolidHandle, ModelError> {
    let mut steps = Vec::with_capacity(HOLE_STEPS.len());
    for (radius, start) in HOLE_STEPS {
        let radius = radius.unwrap_or(p.button_hole_radius);
        steps.push(at.cylinder(kernel, radius, HOLE_LENGTH, at.wall + start)?);
    }
    let hole = fuse_all(kernel, &steps)?;
    at.tilt(kernel, &hole)
}

struct Button {
    button: KernelSolidHandle,
    pin: KernelSolidHandle,
    ceramic: KernelSolidHandle,
    shell: KernelSolidHandle,
}

fn button(kernel: &mut dyn Kernel, p: &ButtonParams, at: &Placement) -> Result<Button, ModelError> {
    let height = at.wall + p.button_offset;
    let ring_length = p.ceramic_offset - p.button_thickness;
    let ceramic_height = height + p.ceramic_offset;
    let upper_height = ceramic_height + p.shell_lower_thickness;

    let pin = at.cylinder(kernel, p.pin_radius, p.pin_height, height)?;
    let face = at.cylinder(kernel, p.button_radius, p.button_thickness, height)?;
    let ring_inner = at.cylinder(
        kernel,
        p.button_ring_inner_radius,
        ring_length,
        height + p.button_thickness,
    )?;
    let ring_outer = at.cylinder(
        kernel,
        p.button_ring_outer_radius,
        ring_length,
        height + p.button_thickness,
    )?;
    let ceramic = at.cylinder(kernel, p.ceramic_radius, p.ceramic_thickness, ceramic_height)?;
    let upper_outer = at.cylinder(kernel, p.shell_upper_radius, p.shell_upper_thickness, upper_height)?;
    let upper_inner = at.cylinder(
        kernel,
        p.shell_upper_inner_radius,
        p.shell_upper_thickness,
        upper_height,
    )?;
    let lower_outer = at.cylinder(kernel, p.shell_lower_radius, p.shell_lower_thickness, ceramic_height)?;
    let lower_inner = at.cylinder(
        kernel,
        p.shell_lower_inner_radius,
        p.shell_lower_thickness,
        ceramic_height,
    )?;

    let ring = kernel.boolean_subtract(&ring_outer, &ring_inner)?;
    let button = kernel.boolean_union(&face, &ring)?;
    let upper = kernel.boolean_subtract(&upper_outer, &upper_inner)?;
    let lower = kernel.boolean_subtract(&lower_outer, &lower_inner)?;
    let shell = kernel.boolean_union(&upper, &lower)?;
    let shell = kernel.boolean_subtract(&shell, &ceramic)?;
    let ceramic = kernel.boolean_subtract(&ceramic, &pin)?;
    let button = kernel.boolean_subtract(&button, &pin)?;

    Ok(Button {
        button: at.tilt(kernel, &button)?,
        pin: at.tilt(kernel, &pin)?,
        ceramic: at.tilt(kernel, &ceramic)?,
        shell: at.tilt(kernel, &shell)?,
    })
}

impl Model for SimpleButtons {
    fn name(&self) -> &'static str {
        "simple_buttons"
    }

    fn default_parameters(&self) -> InputParameters {
        InputParameters::new()
            .scalar("pipe_width", "27mm")
            .scalar("pipe_height", "18.4mm")
            .scalar("pipe_length", "40mm")
            .scalar("pipe_thickness", "2mm")
            .scalar("block_radius", "30mm")
            .scalar("block_s", "20mm")
            .scalar("button_hole_radius", "3.25mm")
            .scalar("button_horizontal_offset", "6mm")
            .scalar("button_s_offset", "0mm")
            .scalar("button_angle", "18.65deg")
            .scalar("button_radius", "3mm")
            .scalar("button_thickness", "4mm")
            .scalar("button_offset", "0.5mm")
            .scalar("button_ring_inner_radius", "1.2mm")
            .scalar("button_ring_outer_radius", "2.1mm")
            .scalar("pin_radius", "0.5mm")
            .scalar("pin_height", "100mm")
            .scalar("ceramic_radius", "4.5mm")
            .scalar("ceramic_thickness", "2.4mm")
            .scalar("ceramic_offset", "5mm")
            .scalar("shell_upper_radius", "6.5mm")
            .scalar("shell_upper_thickness", "9.5mm")
            .scalar("shell_upper_inner_radius", "2.5mm")
            .scalar("shell_lower_radius", "5mm")
            .scalar("shell_lower_thickness", "3mm")
            .scalar("shell_lower_inner_radius", "4.3mm")
    }

    fn default_sweeps(&self) -> Vec<Sweep> {
        sweeps(&[("button_radius", &["2mm", "2.5mm"])])
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = ButtonParams::from_parameters(params)?;
        let t = p.pipe_thickness;
        let vac_face = kernel.make_face(&make_elliptical_aperture(p.pipe_height, p.pipe_width)?)?;
        let wall_face =
            kernel.make_face(&make_elliptical_aperture(p.pipe_height + t, p.pipe_width + t)?)?;
        let beampipe_vac =
            make_beampipe(kernel, vac_face, p.pipe_length + VAC_OVERHANG, ORIGIN, NO_ROTATION)?;
        let beampipe = make_beampipe(kernel, wall_face, p.pipe_length, ORIGIN, NO_ROTATION)?;
        let block = kernel.make_cylinder(
            p.block_radius,
            p.block_s,
            [-p.block_s / 2.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
        )?;

        let placements: Vec<Placement> = QUADRANTS.iter().map(|q| Placement::new(&p, *q)).collect();
        let mut vac_parts = vec![beampipe_vac.clone()];
        for at in &placements {
            vac_parts.push(button_hole(kernel, &p, at)?);
        }
        let vac = fuse_all(kernel, &vac_parts)?;
        let block = kernel.boolean_subtract(&block, &vac)?;
        let beampipe = cut_all(kernel, &beampipe, &[block.clone(), beampipe_vac])?;

        let mut parts = Parts::new();
        parts.insert("vac", vac);
        parts.insert("block", block);
        parts.insert("beampipe", beampipe);
        for (i, at) in placements.iter().enumerate() {
            debug!(index = i + 1, wall = at.wall, tilt = at.tilt, "button");
            let b = button(kernel, &p, at)?;
            let n = i + 1;
            parts.insert(format!("button{n}"), b.button);
            parts.insert(format!("pin{n}"), b.pin);
            parts.insert(format!("ceramic{n}"), b.ceramic);
            parts.insert(format!("shell{n}"), b.shell);
        }
        Ok(parts)
    }
}
