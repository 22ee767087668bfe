//! Every aperture outline as a short extruded pipe.

use chamber_kernel::Kernel;
use chamber_types::{InputParameters, ParseError, Parameters, Profile};
use modeling_ops::{
    make_arc_aperture, make_arched_base_aperture, make_arched_base_trapezoid_aperture,
    make_beampipe, make_circular_aperture, make_cylinder_with_inserts, make_cylinder_with_tags,
    make_elliptical_aperture, make_keyhole_aperture, make_octagonal_aperture,
    make_octagonal_aperture_with_keyholes_and_antichamber, make_polygon_with_tags,
    make_racetrack_aperture, make_rectangle_aperture, make_spoked_cylinder, KeyholeOctagon, Parts,
    NO_ROTATION,
};
use tracing::debug;

use crate::types::{Model, ModelError};

/// Every aperture outline extruded into a short pipe, laid out along the
/// beam axis so the shapes can be checked side by side.
pub struct ApertureGallery;

struct GalleryParams {
    section_length: f64,
    spacing: f64,
    aperture_height: f64,
    aperture_width: f64,
    cavity_radius: f64,
    pipe_radius: f64,
    cavity_insert_angle: f64,
    insert_blend_radius: f64,
    stripline_width: f64,
    stripline_thickness: f64,
    stripline_offset: f64,
    stripline_blend_radius: f64,
    keyhole_height: f64,
    keyhole_width: f64,
    arched_base_radius: f64,
    trapezoid_top_width: f64,
    octagon_side_length: f64,
    octagon_tb_length: f64,
    octagon_slope_width: f64,
    antichamber_taper_width: f64,
    antichamber_height: f64,
    antichamber_width: f64,
    insert_angles: Vec<f64>,
    spoke_extents: Vec<f64>,
    tag_widths: Vec<f64>,
    tag_radii: Vec<f64>,
}

impl GalleryParams {
    fn from_parameters(p: &Parameters) -> Result<Self, ParseError> {
        Ok(Self {
            section_length: p.length("section_length")?,
            spacing: p.length("spacing")?,
            aperture_height: p.length("aperture_height")?,
            aperture_width: p.length("aperture_width")?,
            cavity_radius: p.length("cavity_radius")?,
            pipe_radius: p.length("pipe_radius")?,
            cavity_insert_angle: p.angle("cavity_insert_angle")?,
            insert_blend_radius: p.length("insert_blend_radius")?,
            stripline_width: p.angle("stripline_width")?,
            stripline_thickness: p.length("stripline_thickness")?,
            stripline_offset: p.length("stripline_offset")?,
            stripline_blend_radius: p.length("stripline_blend_radius")?,
            keyhole_height: p.length("keyhole_height")?,
            keyhole_width: p.length("keyhole_width")?,
            arched_base_radius: p.length("arched_base_radius")?,
            trapezoid_top_width: p.length("trapezoid_top_width")?,
            octagon_side_length: p.length("octagon_side_length")?,
            octagon_tb_length: p.length("octagon_tb_length")?,
            octagon_slope_width: p.length("octagon_slope_width")?,
            antichamber_taper_width: p.length("antichamber_taper_width")?,
            antichamber_height: p.length("antichamber_height")?,
            antichamber_width: p.length("antichamber_width")?,
            insert_angles: p.angles("insert_angles")?,
            spoke_extents: p.angles("spoke_extents")?,
            tag_widths: p.lengths("tag_widths")?,
            tag_radii: p.lengths("tag_radii")?,
        })
    }

    /// Outlines in display order, keyed by the part name they are written as.
    fn outlines(&self) -> Result<Vec<(&'static str, Profile)>, ModelError> {
        let (h, w) = (self.aperture_height, self.aperture_width);
        let keyhole_octagon = KeyholeOctagon {
            aperture_height: h,
            tb_width: self.octagon_tb_length,
            ib_oct_width: self.octagon_slope_width,
            ob_oct_width: self.octagon_slope_width,
            ib_keyhole_height: self.keyhole_height,
            ib_keyhole_width: self.keyhole_width,
            ob_keyhole_height: self.keyhole_height,
            ob_keyhole_width: self.keyhole_width,
            antichamber_taper_width: self.antichamber_taper_width,
            antichamber_height: self.antichamber_height,
            antichamber_width: self.antichamber_width,
        };
        Ok(vec![
            ("circular", make_circular_aperture(self.pipe_radius)?),
            ("elliptical", make_elliptical_aperture(h, w)?),
            ("racetrack", make_racetrack_aperture(h, w)?),
            ("rectangle", make_rectangle_aperture(h, w)?),
            (
                "keyhole",
                make_keyhole_aperture(self.pipe_radius, self.keyhole_height, self.keyhole_width)?,
            ),
            (
                "arc",
                make_arc_aperture(
                    self.stripline_offset,
                    self.stripline_offset + self.stripline_thickness,
                    self.stripline_width,
                    self.stripline_blend_radius,
                )?,
            ),
            ("arched_base", make_arched_base_aperture(h, w, self.arched_base_radius)?),
            (
                "arched_base_trapezoid",
                make_arched_base_trapezoid_aperture(
                    h,
                    w,
                    self.trapezoid_top_width,
                    self.arched_base_radius,
                )?,
            ),
            (
                "cylinder_with_inserts",
                make_cylinder_with_inserts(
                    self.cavity_radius,
                    self.pipe_radius,
                    self.cavity_insert_angle,
                    self.insert_blend_radius,
                )?,
            ),
            (
                "spoked_cylinder",
                make_spoked_cylinder(
                    self.cavity_radius,
                    self.pipe_radius,
                    &self.insert_angles,
                    &self.spoke_extents,
                )?,
            ),
            (
                "cylinder_with_tags",
                make_cylinder_with_tags(
                    self.cavity_radius,
                    self.pipe_radius,
                    &self.insert_angles,
                    &self.tag_widths,
                )?,
            ),
            (
                "polygon_with_tags",
                make_polygon_with_tags(
                    self.pipe_radius,
                    &self.tag_radii,
                    &self.insert_angles,
                    &self.tag_widths,
                )?,
            ),
            (
                "octagonal",
                make_octagonal_aperture(h, w, self.octagon_side_length, self.octagon_tb_length)?,
            ),
            (
                "octagonal_with_keyholes_and_antichamber",
                make_octagonal_aperture_with_keyholes_and_antichamber(&keyhole_octagon)?,
            ),
        ])
    }
}

impl Model for ApertureGallery {
    fn name(&self) -> &'static str {
        "aperture_gallery"
    }

    fn default_parameters(&self) -> InputParameters {
        InputParameters::new()
            .scalar("section_length", "10mm")
            .scalar("spacing", "100mm")
            .scalar("aperture_height", "10mm")
            .scalar("aperture_width", "40mm")
            .scalar("cavity_radius", "25mm")
            .scalar("pipe_radius", "10mm")
            .scalar("cavity_insert_angle", "20deg")
            .scalar("insert_blend_radius", "2mm")
            .scalar("stripline_width", "90deg")
            .scalar("stripline_thickness", "1.75mm")
            .scalar("stripline_offset", "7mm")
            .scalar("stripline_blend_radius", "0.75mm")
            .scalar("keyhole_height", "4mm")
            .scalar("keyhole_width", "8mm")
            .scalar("arched_base_radius", "30mm")
            .scalar("trapezoid_top_width", "30mm")
            .scalar("octagon_side_length", "4mm")
            .scalar("octagon_tb_length", "20mm")
            .scalar("octagon_slope_width", "5mm")
            .scalar("antichamber_taper_width", "3mm")
            .scalar("antichamber_height", "6mm")
            .scalar("antichamber_width", "15mm")
            .list("insert_angles", &["0deg", "90deg", "180deg", "270deg"])
            .list("spoke_extents", &["20deg", "20deg", "20deg", "20deg"])
            .list("tag_widths", &["4mm", "4mm", "4mm", "4mm"])
            .list("tag_radii", &["14mm", "16mm", "14mm", "16mm"])
    }

    fn default_accuracy(&self) -> u32 {
        25
    }

    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError> {
        let p = GalleryParams::from_parameters(params)?;
        let mut parts = Parts::new();
        for (i, (name, outline)) in p.outlines()?.into_iter().enumerate() {
            let face = kernel.make_face(&outline)?;
            let x = i as f64 * p.spacing;
            debug!(name, x, "gallery section");
            let section = make_beampipe(kernel, face, p.section_length, [x, 0.0, 0.0], NO_ROTATION)?;
            parts.insert(name, section);
        }
        Ok(parts)
    }
}
