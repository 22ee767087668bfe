use chamber_kernel::Kernel;
use chamber_types::{InputParameters, ParseError, Parameters};
use modeling_ops::{fuse_all, make_beampipe, make_circular_aperture, Parts, NO_ROTATION, ORIGIN};

use crate::types::{sweeps, Model, ModelError, Sweep};

/// Cylindrical cavity between two round beam pipes, with a constant wall.
pub struct PillboxCavity;

#[derive(Debug, Clone, Copy)]
struct PillboxParams {
    cavity_radius: f64,
    cavity_length: f64,
    pipe_radius: f64,
    pipe_length: f64,
    wall_thickness: f64,
}

impl PillboxParams {
    fn from_parameters(p: &Parameters) -> Result<Self, ParseError> {
        Ok(Self {
            cavity_radius: p.length("cavity_radius")?,
            cavity_length: p.length("cavity_length")?,
            pipe_radius: p.length("pipe_radius")?,
            pipe_length: p.length("pipe_length")?,
            wall_thickness: p.length("wall_thickness")?,
        })
    }
}

impl Model for PillboxCavity {
    fn name(&self) -> &'static str {
        "pillbox_cavity"
    }

    fn default_parameters(&self) -> InputParameters {
        InputParameters::new()
            .scalar("cavity_radius", "20mm")
            .scalar("cavity_length", "20mm")
            .scalar("pipe_radius", "10mm")
            .scalar("pipe_length", "80mm")
            .scalar("wall_thickness", "2mm")
    }

    fn default_sweeps(&self) -> Vec<Sweep> {
        sweeps(&[
            ("cavity_radius", &["10mm", "30mm", "40mm", "50mm"]),
            ("pipe_radius", &["15mm", "20mm", "25mm"]),
            ("cavity_length", &["10mm", "30mm", "40mm", "50mm"]),
            ("pipe_length", &["40mm", "60mm", "100mm"]),
        ])
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = PillboxParams::from_parameters(params)?;
        let pipe_centre = p.pipe_length / 2.0 + p.cavity_length / 2.0;

        let pipe = kernel.make_face(&make_circular_aperture(p.pipe_radius)?)?;
        let cavity = kernel.make_face(&make_circular_aperture(p.cavity_radius)?)?;
        let vac = [
            make_beampipe(kernel, pipe, p.pipe_length, [-pipe_centre, 0.0, 0.0], NO_ROTATION)?,
            make_beampipe(kernel, cavity, p.cavity_length, ORIGIN, NO_ROTATION)?,
            make_beampipe(kernel, pipe, p.pipe_length, [pipe_centre, 0.0, 0.0], NO_ROTATION)?,
        ];
        let vac = fuse_all(kernel, &vac)?;

        let wall = p.wall_thickness;
        let pipe_shell = kernel.make_face(&make_circular_aperture(p.pipe_radius + wall)?)?;
        let cavity_shell = kernel.make_face(&make_circular_aperture(p.cavity_radius + wall)?)?;
        let shell = [
            make_beampipe(kernel, pipe_shell, p.pipe_length, [-pipe_centre, 0.0, 0.0], NO_ROTATION)?,
            make_beampipe(kernel, cavity_shell, p.cavity_length + 2.0 * wall, ORIGIN, NO_ROTATION)?,
            make_beampipe(kernel, pipe_shell, p.pipe_length, [pipe_centre, 0.0, 0.0], NO_ROTATION)?,
        ];
        let shell = fuse_all(kernel, &shell)?;
        let shell = kernel.boolean_subtract(&shell, &vac)?;

        let mut parts = Parts::new();
        parts.insert("vac", vac);
        parts.insert("shell", shell);
        Ok(parts)
    }
}
