//! Pipes joined to larger sections through lofted tapers.

use chamber_kernel::{Kernel, KernelSolidHandle};
use chamber_types::{InputParameters, ParseError, Parameters, Point2, Profile};
use modeling_ops::{
    fuse_all, make_beampipe, make_circular_aperture, make_elliptical_aperture,
    make_octagonal_aperture, make_racetrack_aperture, make_taper, Parts, NO_ROTATION, ORIGIN,
};

use crate::types::{sweeps, Model, ModelError, Sweep};

/// Turns a taper round so it runs towards -X from its location.
const FLIPPED: [f64; 3] = [0.0, 180.0, 0.0];

/// Elliptical cavity tapering down to elliptical pipes on both sides.
/// The single part is the vacuum volume.
pub struct EllipticalTaper;

struct EllipticalTaperParams {
    pipe_height: f64,
    pipe_width: f64,
    pipe_length: f64,
    cavity_height: f64,
    cavity_width: f64,
    cavity_length: f64,
    taper_length: f64,
}

impl EllipticalTaperParams {
    fn from_parameters(p: &Parameters) -> Result<Self, ParseError> {
        Ok(Self {
            pipe_height: p.length("pipe_height")?,
            pipe_width: p.length("pipe_width")?,
            pipe_length: p.length("pipe_length")?,
            cavity_height: p.length("cavity_height")?,
            cavity_width: p.length("cavity_width")?,
            cavity_length: p.length("cavity_length")?,
            taper_length: p.length("taper_length")?,
        })
    }
}

impl Model for EllipticalTaper {
    fn name(&self) -> &'static str {
        "elliptical_taper"
    }

    fn default_parameters(&self) -> InputParameters {
        InputParameters::new()
            .scalar("pipe_height", "10mm")
            .scalar("pipe_width", "40mm")
            .scalar("pipe_length", "80mm")
            .scalar("cavity_height", "20mm")
            .scalar("cavity_width", "60mm")
            .scalar("cavity_length", "20mm")
            .scalar("taper_length", "30mm")
    }

    fn default_sweeps(&self) -> Vec<Sweep> {
        sweeps(&[
            ("cavity_height", &["5mm", "10mm", "15mm", "25mm", "30mm"]),
            ("cavity_width", &["40mm", "80mm", "100mm", "120mm"]),
            ("taper_length", &["10mm", "20mm", "40mm", "50mm", "60mm"]),
            ("cavity_length", &["40mm", "60mm", "80mm"]),
            (
                "pipe_height",
                &["15mm", "20mm", "25mm", "30mm", "35mm", "40mm", "45mm", "50mm"],
            ),
            (
                "pipe_length",
                &["50mm", "100mm", "150mm", "200mm", "250mm", "300mm"],
            ),
            ("pipe_width", &["30mm", "50mm", "60mm", "70mm"]),
        ])
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = EllipticalTaperParams::from_parameters(params)?;
        let pipe = make_elliptical_aperture(p.pipe_height, p.pipe_width)?;
        let cavity = make_elliptical_aperture(p.cavity_height, p.cavity_width)?;
        let pipe_face = kernel.make_face(&pipe)?;
        let cavity_face = kernel.make_face(&cavity)?;
        let pipe_centre = p.pipe_length / 2.0 + p.taper_length + p.cavity_length / 2.0;
        let half_cavity = p.cavity_length / 2.0;

        let sections = [
            make_beampipe(kernel, pipe_face, p.pipe_length, [-pipe_centre, 0.0, 0.0], NO_ROTATION)?,
            make_taper(
                kernel,
                &cavity,
                &pipe,
                p.taper_length,
                [-half_cavity, 0.0, 0.0],
                FLIPPED,
                Point2::default(),
            )?,
            make_beampipe(kernel, cavity_face, p.cavity_length, ORIGIN, NO_ROTATION)?,
            make_taper(
                kernel,
                &cavity,
                &pipe,
                p.taper_length,
                [half_cavity, 0.0, 0.0],
                NO_ROTATION,
                Point2::default(),
            )?,
            make_beampipe(kernel, pipe_face, p.pipe_length, [pipe_centre, 0.0, 0.0], NO_ROTATION)?,
        ];
        let all = fuse_all(kernel, &sections)?;

        let mut parts = Parts::new();
        parts.insert("all", all);
        Ok(parts)
    }
}

/// Octagonal pipe tapering into a racetrack pipe, with a wall of
/// `pipe_thickness` added to both transverse sizes.
pub struct OctagonalToRacetrackTaper;

struct OctagonalToRacetrackParams {
    racetrack_height: f64,
    racetrack_width: f64,
    racetrack_length: f64,
    octagon_height: f64,
    octagon_width: f64,
    octagon_length: f64,
    octagon_side_length: f64,
    octagon_tb_length: f64,
    taper_length: f64,
    pipe_thickness: f64,
}

impl OctagonalToRacetrackParams {
    fn from_parameters(p: &Parameters) -> Result<Self, ParseError> {
        Ok(Self {
            racetrack_height: p.length("racetrack_height")?,
            racetrack_width: p.length("racetrack_width")?,
            racetrack_length: p.length("racetrack_length")?,
            octagon_height: p.length("octagon_height")?,
            octagon_width: p.length("octagon_width")?,
            octagon_length: p.length("octagon_length")?,
            octagon_side_length: p.length("octagon_side_length")?,
            octagon_tb_length: p.length("octagon_tb_length")?,
            taper_length: p.length("taper_length")?,
            pipe_thickness: p.length("pipe_thickness")?,
        })
    }
}

impl Model for OctagonalToRacetrackTaper {
    fn name(&self) -> &'static str {
        "octagonal_to_racetrack_taper"
    }

    fn default_parameters(&self) -> InputParameters {
        InputParameters::new()
            .scalar("racetrack_height", "10mm")
            .scalar("racetrack_width", "40mm")
            .scalar("racetrack_length", "80mm")
            .scalar("octagon_height", "20mm")
            .scalar("octagon_width", "60mm")
            .scalar("octagon_length", "20mm")
            .scalar("octagon_side_length", "8mm")
            .scalar("octagon_tb_length", "20mm")
            .scalar("taper_length", "30mm")
            .scalar("pipe_thickness", "2mm")
    }

    fn default_sweeps(&self) -> Vec<Sweep> {
        sweeps(&[
            ("octagon_height", &["5mm", "10mm", "15mm", "25mm", "30mm"]),
            ("octagon_width", &["40mm", "80mm", "100mm", "120mm"]),
            ("taper_length", &["10mm", "20mm", "40mm", "50mm", "60mm"]),
            (
                "racetrack_height",
                &["15mm", "20mm", "25mm", "30mm", "35mm", "40mm", "45mm", "50mm"],
            ),
            ("racetrack_width", &["20mm", "30mm", "50mm", "60mm", "70mm"]),
            (
                "racetrack_length",
                &["50mm", "100mm", "150mm", "200mm", "250mm", "300mm"],
            ),
            ("octagon_side_length", &["4mm", "6mm", "10mm", "12mm"]),
            ("octagon_tb_length", &["10mm", "30mm"]),
        ])
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = OctagonalToRacetrackParams::from_parameters(params)?;
        let t = p.pipe_thickness;
        let octagon = make_octagonal_aperture(
            p.octagon_height,
            p.octagon_width,
            p.octagon_side_length,
            p.octagon_tb_length,
        )?;
        let racetrack = make_racetrack_aperture(p.racetrack_height, p.racetrack_width)?;
        let octagon_wall = make_octagonal_aperture(
            p.octagon_height + t,
            p.octagon_width + t,
            p.octagon_side_length,
            p.octagon_tb_length,
        )?;
        let racetrack_wall = make_racetrack_aperture(p.racetrack_height + t, p.racetrack_width + t)?;

        let octagon_centre = -(p.octagon_length / 2.0 + p.taper_length + p.racetrack_length / 2.0);
        let taper_start = [-p.racetrack_length / 2.0, 0.0, 0.0];

        let mut run = |inner: &Profile, outer: &Profile| -> Result<KernelSolidHandle, ModelError> {
            let octagon_face = kernel.make_face(outer)?;
            let racetrack_face = kernel.make_face(inner)?;
            let sections = [
                make_beampipe(
                    kernel,
                    octagon_face,
                    p.octagon_length,
                    [octagon_centre, 0.0, 0.0],
                    NO_ROTATION,
                )?,
                make_taper(
                    kernel,
                    inner,
                    outer,
                    p.taper_length,
                    taper_start,
                    FLIPPED,
                    Point2::default(),
                )?,
                make_beampipe(kernel, racetrack_face, p.racetrack_length, ORIGIN, NO_ROTATION)?,
            ];
            Ok(fuse_all(kernel, &sections)?)
        };
        let vac = run(&racetrack, &octagon)?;
        let outer = run(&racetrack_wall, &octagon_wall)?;
        let pipe = kernel.boolean_subtract(&outer, &vac)?;

        let mut parts = Parts::new();
        parts.insert("pipe", pipe);
        parts.insert("vac", vac);
        Ok(parts)
    }
}

/// Circular cavity between two racetrack pipes, joined by tapers.
pub struct RacetrackTaperedCavity;

struct RacetrackTaperedCavityParams {
    racetrack_height: f64,
    racetrack_width: f64,
    racetrack_length: f64,
    cavity_radius: f64,
    cavity_length: f64,
    taper_length: f64,
    pipe_thickness: f64,
}

impl RacetrackTaperedCavityParams {
    fn from_parameters(p: &Parameters) -> Result<Self, ParseError> {
        Ok(Self {
            racetrack_height: p.length("racetrack_height")?,
            racetrack_width: p.length("racetrack_width")?,
            racetrack_length: p.length("racetrack_length")?,
            cavity_radius: p.length("cavity_radius")?,
            cavity_length: p.length("cavity_length")?,
            taper_length: p.length("taper_length")?,
            pipe_thickness: p.length("pipe_thickness")?,
        })
    }
}

impl Model for RacetrackTaperedCavity {
    fn name(&self) -> &'static str {
        "racetrack_tapered_cavity"
    }

    fn default_parameters(&self) -> InputParameters {
        InputParameters::new()
            .scalar("racetrack_height", "10mm")
            .scalar("racetrack_width", "40mm")
            .scalar("racetrack_length", "80mm")
            .scalar("cavity_radius", "20mm")
            .scalar("cavity_length", "20mm")
            .scalar("taper_length", "30mm")
            .scalar("pipe_thickness", "2mm")
    }

    fn default_sweeps(&self) -> Vec<Sweep> {
        sweeps(&[
            ("cavity_radius", &["5mm", "10mm", "15mm", "25mm", "30mm"]),
            ("taper_length", &["10mm", "20mm", "40mm", "50mm", "60mm"]),
            (
                "racetrack_height",
                &["15mm", "20mm", "25mm", "30mm", "35mm", "40mm", "45mm", "50mm"],
            ),
            ("racetrack_width", &["20mm", "30mm", "50mm", "60mm", "70mm"]),
            (
                "racetrack_length",
                &["50mm", "100mm", "150mm", "200mm", "250mm", "300mm"],
            ),
            ("cavity_length", &["10mm", "30mm"]),
        ])
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = RacetrackTaperedCavityParams::from_parameters(params)?;
        let t = p.pipe_thickness;
        let racetrack = make_racetrack_aperture(p.racetrack_height, p.racetrack_width)?;
        let cavity = make_circular_aperture(p.cavity_radius)?;
        let racetrack_wall = make_racetrack_aperture(p.racetrack_height + t, p.racetrack_width + t)?;
        let cavity_wall = make_circular_aperture(p.cavity_radius + t)?;

        let pipe_centre = p.racetrack_length / 2.0 + p.taper_length + p.cavity_length / 2.0;
        let half_cavity = p.cavity_length / 2.0;

        let mut run = |pipe: &Profile, cavity: &Profile| -> Result<KernelSolidHandle, ModelError> {
            let pipe_face = kernel.make_face(pipe)?;
            let cavity_face = kernel.make_face(cavity)?;
            let sections = [
                make_beampipe(
                    kernel,
                    pipe_face,
                    p.racetrack_length,
                    [-pipe_centre, 0.0, 0.0],
                    NO_ROTATION,
                )?,
                make_taper(
                    kernel,
                    cavity,
                    pipe,
                    p.taper_length,
                    [-half_cavity, 0.0, 0.0],
                    FLIPPED,
                    Point2::default(),
                )?,
                make_beampipe(kernel, cavity_face, p.cavity_length, ORIGIN, NO_ROTATION)?,
                make_taper(
                    kernel,
                    cavity,
                    pipe,
                    p.taper_length,
                    [half_cavity, 0.0, 0.0],
                    NO_ROTATION,
                    Point2::default(),
                )?,
                make_beampipe(
                    kernel,
                    pipe_face,
                    p.racetrack_length,
                    [pipe_centre, 0.0, 0.0],
                    NO_ROTATION,
                )?,
            ];
            Ok(fuse_all(kernel, &sections)?)
        };
        let vac = run(&racetrack, &cavity)?;
        let outer = run(&racetrack_wall, &cavity_wall)?;
        let pipe = kernel.boolean_subtract(&outer, &vac)?;

        let mut parts = Parts::new();
        parts.insert("pipe", pipe);
        parts.insert("vac", vac);
        Ok(parts)
    }
}
