//! Stripline pickups: curved tapered blades in a cavity that tapers down to
//! round pipes, each blade fed by an N-type feedthrough at both ends.

use chamber_kernel::{Kernel, KernelSolidHandle};
use chamber_types::{InputParameters, ParseError, Parameters, Point2};
use modeling_ops::{
    cut_all, fuse_all, make_beampipe, make_circular_aperture, make_cylinder_with_inserts,
    make_stripline, make_stripline_feedthrough, make_taper, rotate_at, FeedthroughParts, Parts,
    PortEnd, StriplineDims, NO_ROTATION, ORIGIN,
};
use tracing::debug;

use crate::types::{Model, ModelError};

/// Radial step between the pipe wall and the outside of the tapers.
const TAPER_WALL_STEP: f64 = 2.0;
/// Turns the two-blade cavity so its wide lobes face the blades on ±Y.
const LOBES_VERTICAL: [f64; 3] = [-90.0, 0.0, 0.0];

const FOUR_BLADES: [(&str, f64); 4] = [
    ("upper", -90.0),
    ("right", 0.0),
    ("lower", 90.0),
    ("left", 180.0),
];
const TWO_BLADES: [(&str, f64); 2] = [("upper", -90.0), ("lower", 90.0)];

#[derive(Debug, Clone, Copy)]
struct StriplineParams {
    dims: StriplineDims,
    pipe_length: f64,
    pipe_stub_length: f64,
}

impl StriplineParams {
    fn from_parameters(p: &Parameters) -> Result<Self, ParseError> {
        Ok(Self {
            dims: StriplineDims {
                pipe_radius: p.length("pipe_radius")?,
                pipe_thickness: p.length("pipe_thickness")?,
                cavity_radius: p.length("cavity_radius")?,
                total_stripline_length: p.length("total_stripline_length")?,
                stripline_taper_length: p.length("stripline_taper_length")?,
                stripline_offset: p.length("stripline_offset")?,
                stripline_thickness: p.length("stripline_thickness")?,
                stripline_width: p.angle("stripline_width")?,
                stripline_taper_end_width: p.angle("stripline_taper_end_width")?,
                additional_cavity_length: p.length("additional_cavity_length")?,
                feedthrough_offset: p.length("feedthrough_offset")?,
            },
            pipe_length: p.length("pipe_length")?,
            pipe_stub_length: p.length("pipe_stub_length")?,
        })
    }

    fn taper_length(&self) -> f64 {
        (self.dims.total_cavity_length() - self.dims.mid_section_length()) / 2.0
    }
}

fn baseline_parameters() -> InputParameters {
    InputParameters::new()
        .scalar("pipe_radius", "12mm")
        .scalar("pipe_thickness", "2mm")
        .scalar("pipe_length", "50mm")
        .scalar("pipe_stub_length", "10mm")
        .scalar("cavity_radius", "25mm")
        .scalar("total_stripline_length", "150mm")
        .scalar("stripline_taper_length", "20mm")
        .scalar("stripline_offset", "14mm")
        .scalar("stripline_thickness", "2mm")
        .scalar("stripline_width", "30deg")
        .scalar("stripline_taper_end_width", "15deg")
        .scalar("additional_cavity_length", "10mm")
        .scalar("feedthrough_offset", "5mm")
}

/// A blade and the feedthroughs feeding each of its ends.
struct Blade {
    name: &'static str,
    blade: KernelSolidHandle,
    upstream: FeedthroughParts,
    downstream: FeedthroughParts,
}

/// Build each blade with its pair of feedthroughs. The feedthrough meeting a
/// blade turned by `b` is turned by `b + 90`: an unturned blade lies on +Z
/// while an unturned feedthrough stub hangs along -Y. In a frame where both
/// start on the same axis the two would share the angle `b`.
fn make_blades(
    kernel: &mut dyn Kernel,
    dims: &StriplineDims,
    layout: &[(&'static str, f64)],
) -> Result<Vec<Blade>, ModelError> {
    let mut blades = Vec::with_capacity(layout.len());
    for &(name, rotation) in layout {
        let blade = make_stripline(kernel, dims, rotation)?;
        let upstream = make_stripline_feedthrough(kernel, dims, PortEnd::Upstream, rotation + 90.0)?;
        let downstream =
            make_stripline_feedthrough(kernel, dims, PortEnd::Downstream, rotation + 90.0)?;
        debug!(name, rotation, "stripline blade and feedthroughs");
        blades.push(Blade {
            name,
            blade,
            upstream,
            downstream,
        });
    }
    Ok(blades)
}

/// Feedthroughs in output order: every upstream one, then every downstream one.
fn feedthroughs(blades: &[Blade]) -> impl Iterator<Item = &FeedthroughParts> {
    blades
        .iter()
        .map(|b| &b.upstream)
        .chain(blades.iter().map(|b| &b.downstream))
}

/// Striplines, then upstream pins, then downstream pins.
fn insert_blades(
    kernel: &mut dyn Kernel,
    parts: &mut Parts,
    blades: Vec<Blade>,
) -> Result<(), ModelError> {
    for b in &blades {
        let pins = [b.upstream.pin.clone(), b.downstream.pin.clone()];
        let blade = cut_all(kernel, &b.blade, &pins)?;
        parts.insert(format!("stripline_{}", b.name), blade);
    }
    for b in &blades {
        parts.insert(format!("pin_us_{}", b.name), b.upstream.pin.clone());
    }
    for b in &blades {
        parts.insert(format!("pin_ds_{}", b.name), b.downstream.pin.clone());
    }
    Ok(())
}

/// Four blades on a round cavity.
pub struct StriplineCurvedTapered4Blade;

impl Model for StriplineCurvedTapered4Blade {
    fn name(&self) -> &'static str {
        "stripline_curved_tapered_4_blade"
    }

    fn default_parameters(&self) -> InputParameters {
        baseline_parameters()
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = StriplineParams::from_parameters(params)?;
        let d = p.dims;
        d.validate()?;
        let mid = d.mid_section_length();
        let total = d.total_cavity_length();
        let taper = p.taper_length();
        let (pl, stub, t) = (p.pipe_length, p.pipe_stub_length, d.pipe_thickness);

        let pipe_vac = make_circular_aperture(d.pipe_radius)?;
        let cavity_vac = make_circular_aperture(d.cavity_radius)?;
        let pipe_vac_face = kernel.make_face(&pipe_vac)?;
        let cavity_vac_face = kernel.make_face(&cavity_vac)?;
        let vac = [
            make_beampipe(kernel, pipe_vac_face, total + 2.0 * pl + 2.0 * stub, ORIGIN, NO_ROTATION)?,
            make_taper(
                kernel,
                &pipe_vac,
                &cavity_vac,
                taper,
                [-total / 2.0, 0.0, 0.0],
                NO_ROTATION,
                Point2::default(),
            )?,
            make_taper(
                kernel,
                &cavity_vac,
                &pipe_vac,
                taper,
                [mid / 2.0, 0.0, 0.0],
                NO_ROTATION,
                Point2::default(),
            )?,
            make_beampipe(kernel, cavity_vac_face, mid, ORIGIN, NO_ROTATION)?,
        ];
        let chamber_vac = fuse_all(kernel, &vac)?;

        let pipe = make_circular_aperture(d.pipe_radius + t)?;
        let pipe_taper = make_circular_aperture(d.pipe_radius + t + TAPER_WALL_STEP)?;
        let cavity = make_circular_aperture(d.cavity_radius + t)?;
        let pipe_face = kernel.make_face(&pipe)?;
        let cavity_face = kernel.make_face(&cavity)?;
        let extension_centre = (pl + total) / 2.0 + stub;
        let stub_centre = (total + stub) / 2.0;
        let us_extension =
            make_beampipe(kernel, pipe_face, pl, [-extension_centre, 0.0, 0.0], NO_ROTATION)?;
        let ds_extension =
            make_beampipe(kernel, pipe_face, pl, [extension_centre, 0.0, 0.0], NO_ROTATION)?;
        let outer = [
            make_taper(
                kernel,
                &pipe_taper,
                &cavity,
                taper,
                [-total / 2.0, 0.0, 0.0],
                NO_ROTATION,
                Point2::default(),
            )?,
            make_taper(
                kernel,
                &cavity,
                &pipe_taper,
                taper,
                [mid / 2.0, 0.0, 0.0],
                NO_ROTATION,
                Point2::default(),
            )?,
            make_beampipe(kernel, cavity_face, mid, ORIGIN, NO_ROTATION)?,
            make_beampipe(kernel, pipe_face, stub, [-stub_centre, 0.0, 0.0], NO_ROTATION)?,
            make_beampipe(kernel, pipe_face, stub, [stub_centre, 0.0, 0.0], NO_ROTATION)?,
        ];
        let outer = fuse_all(kernel, &outer)?;

        let blades = make_blades(kernel, &d, &FOUR_BLADES)?;
        let stub_outers: Vec<_> = feedthroughs(&blades).map(|f| f.outer.clone()).collect();
        let bores: Vec<_> = feedthroughs(&blades).map(|f| f.bore.clone()).collect();
        let trimmed_outers = fuse_all(kernel, &stub_outers)?;
        let trimmed_outers = kernel.boolean_subtract(&trimmed_outers, &chamber_vac)?;

        let mut vac = vec![chamber_vac];
        vac.extend(bores);
        let vac = fuse_all(kernel, &vac)?;

        let us_pipe = kernel.boolean_subtract(&us_extension, &vac)?;
        let ds_pipe = kernel.boolean_subtract(&ds_extension, &vac)?;
        let cavity = kernel.boolean_subtract(&outer, &vac)?;
        let cavity = kernel.boolean_union(&cavity, &trimmed_outers)?;

        let mut parts = Parts::new();
        parts.insert("us_pipe", us_pipe);
        parts.insert("ds_pipe", ds_pipe);
        parts.insert("cavity", cavity);
        parts.insert("vac", vac);
        insert_blades(kernel, &mut parts, blades)?;
        Ok(parts)
    }
}

/// Two blades, above and below the beam, in a cavity pinched down to the
/// pipe radius either side so the blades sit in wide lobes.
pub struct StriplineCurvedTapered2Blade;

/// Step left at the narrow end of the vacuum tapers so the loft never
/// closes to a point.
const TAPER_END_STEP: f64 = 0.02;
const TAPER_END_BLEND: f64 = TAPER_END_STEP / 4.0;
const CAVITY_VAC_BLEND: f64 = 2.0;
/// Narrows the outer lobes so the wall keeps some thickness at the sides.
const OUTER_INSERT_MARGIN: f64 = 3.0;

impl Model for StriplineCurvedTapered2Blade {
    fn name(&self) -> &'static str {
        "stripline_curved_tapered_2_blade"
    }

    fn default_parameters(&self) -> InputParameters {
        baseline_parameters().scalar("cavity_insert_angle", "45deg")
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = StriplineParams::from_parameters(params)?;
        let insert_angle = params.angle("cavity_insert_angle")?;
        let d = p.dims;
        d.validate()?;
        let mid = d.mid_section_length();
        let total = d.total_cavity_length();
        let taper = p.taper_length();
        let (pl, stub, t) = (p.pipe_length, p.pipe_stub_length, d.pipe_thickness);
        let (pipe_r, cavity_r) = (d.pipe_radius, d.cavity_radius);

        let pipe_vac = make_circular_aperture(pipe_r)?;
        let pipe_vac_taper =
            make_cylinder_with_inserts(pipe_r + TAPER_END_STEP, pipe_r, insert_angle, TAPER_END_BLEND)?;
        let cavity_vac = make_cylinder_with_inserts(cavity_r, pipe_r, insert_angle, CAVITY_VAC_BLEND)?;
        let pipe_vac_face = kernel.make_face(&pipe_vac)?;
        let cavity_vac_face = kernel.make_face(&cavity_vac)?;
        let pipe_vac_centre = (total + pl) / 2.0;
        let us_pipe_vac =
            make_beampipe(kernel, pipe_vac_face, pl, [-pipe_vac_centre, 0.0, 0.0], NO_ROTATION)?;
        let ds_pipe_vac =
            make_beampipe(kernel, pipe_vac_face, pl, [pipe_vac_centre, 0.0, 0.0], NO_ROTATION)?;
        let us_taper_vac = make_taper(
            kernel,
            &pipe_vac_taper,
            &cavity_vac,
            taper,
            [-total / 2.0, 0.0, 0.0],
            NO_ROTATION,
            Point2::default(),
        )?;
        let ds_taper_vac = make_taper(
            kernel,
            &cavity_vac,
            &pipe_vac_taper,
            taper,
            [mid / 2.0, 0.0, 0.0],
            NO_ROTATION,
            Point2::default(),
        )?;
        let cavity_vac = make_beampipe(kernel, cavity_vac_face, mid, ORIGIN, NO_ROTATION)?;

        let outer_angle = insert_angle - OUTER_INSERT_MARGIN;
        let pipe = make_circular_aperture(pipe_r + t)?;
        let pipe_taper =
            make_cylinder_with_inserts(pipe_r + t + TAPER_WALL_STEP, pipe_r + t, outer_angle, 0.0)?;
        let cavity = make_cylinder_with_inserts(cavity_r + t, pipe_r + t, outer_angle, 0.0)?;
        let pipe_face = kernel.make_face(&pipe)?;
        let cavity_face = kernel.make_face(&cavity)?;
        let extension_centre = (pl + total) / 2.0 + stub / 2.0;
        let stub_centre = (total + stub) / 2.0;
        let us_extension = make_beampipe(
            kernel,
            pipe_face,
            pl - stub,
            [-extension_centre, 0.0, 0.0],
            NO_ROTATION,
        )?;
        let ds_extension = make_beampipe(
            kernel,
            pipe_face,
            pl - stub,
            [extension_centre, 0.0, 0.0],
            NO_ROTATION,
        )?;
        let us_stub = make_beampipe(kernel, pipe_face, stub, [-stub_centre, 0.0, 0.0], NO_ROTATION)?;
        let ds_stub = make_beampipe(kernel, pipe_face, stub, [stub_centre, 0.0, 0.0], NO_ROTATION)?;
        let us_taper = make_taper(
            kernel,
            &pipe_taper,
            &cavity,
            taper,
            [-total / 2.0, 0.0, 0.0],
            NO_ROTATION,
            Point2::default(),
        )?;
        let ds_taper = make_taper(
            kernel,
            &cavity,
            &pipe_taper,
            taper,
            [mid / 2.0, 0.0, 0.0],
            NO_ROTATION,
            Point2::default(),
        )?;
        let cavity_body = make_beampipe(kernel, cavity_face, mid, ORIGIN, NO_ROTATION)?;

        let chamber_vac = fuse_all(
            kernel,
            &[
                us_taper_vac.clone(),
                ds_taper_vac.clone(),
                cavity_vac.clone(),
                us_pipe_vac.clone(),
                ds_pipe_vac.clone(),
            ],
        )?;
        let chamber_vac = rotate_at(kernel, &chamber_vac, ORIGIN, LOBES_VERTICAL)?;

        let walls = [
            kernel.boolean_subtract(&us_taper, &us_taper_vac)?,
            kernel.boolean_subtract(&ds_taper, &ds_taper_vac)?,
            kernel.boolean_subtract(&cavity_body, &cavity_vac)?,
            kernel.boolean_subtract(&us_stub, &us_pipe_vac)?,
            kernel.boolean_subtract(&ds_stub, &ds_pipe_vac)?,
        ];
        let outer = fuse_all(kernel, &walls)?;
        let outer = rotate_at(kernel, &outer, ORIGIN, LOBES_VERTICAL)?;

        let blades = make_blades(kernel, &d, &TWO_BLADES)?;
        let stub_outers: Vec<_> = feedthroughs(&blades).map(|f| f.outer.clone()).collect();
        let bores: Vec<_> = feedthroughs(&blades).map(|f| f.bore.clone()).collect();
        let mut vac = vec![chamber_vac.clone()];
        vac.extend(bores);
        let vac = fuse_all(kernel, &vac)?;

        let outer = kernel.boolean_subtract(&outer, &vac)?;
        let trimmed_outers = fuse_all(kernel, &stub_outers)?;
        let trimmed_outers = kernel.boolean_subtract(&trimmed_outers, &chamber_vac)?;
        let cavity = kernel.boolean_union(&outer, &trimmed_outers)?;
        let us_pipe = kernel.boolean_subtract(&us_extension, &us_pipe_vac)?;
        let ds_pipe = kernel.boolean_subtract(&ds_extension, &ds_pipe_vac)?;

        let mut parts = Parts::new();
        parts.insert("us_pipe", us_pipe);
        parts.insert("ds_pipe", ds_pipe);
        parts.insert("cavity", cavity);
        parts.insert("vac", vac);
        insert_blades(kernel, &mut parts, blades)?;
        Ok(parts)
    }
}
