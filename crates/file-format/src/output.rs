use std::fs;
use std::path::{Path, PathBuf};

use chamber_kernel::{clean_mesh, Kernel, KernelSolidHandle};
use chamber_types::InputParameters;
use modeling_ops::Parts;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::document::write_document;
use crate::errors::OutputError;
use crate::layout::OutputLayout;
use crate::sidecar::write_sidecar;
use crate::stl::{export_ascii_stl, export_binary_stl};

/// Deflection relative to the part size used by the standard mesher.
const STANDARD_RELATIVE_DEFLECTION: f64 = 0.01;
/// Points of a tessellated part closer than this (mm) are welded together.
const WELD_TOLERANCE: f32 = 1e-5;

/// How mesh density is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mesher {
    /// Fixed deflection relative to each part's size.
    #[default]
    Standard,
    /// Density scales with `accuracy`; bigger is finer.
    Fineness,
}

impl Mesher {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Mesher::Standard),
            "fineness" => Some(Mesher::Fineness),
            _ => None,
        }
    }

    /// Chordal tolerance in mm for a part whose bounding box has `diagonal`.
    pub fn tolerance(self, diagonal: f64, accuracy: u32) -> f64 {
        match self {
            Mesher::Standard => diagonal * STANDARD_RELATIVE_DEFLECTION,
            Mesher::Fineness => diagonal / (20.0 * f64::from(accuracy.max(1))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub mesher: Mesher,
    pub accuracy: u32,
    /// Write only the CAD document and sidecar, no STL files.
    pub just_cad: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            mesher: Mesher::Standard,
            accuracy: 10,
            just_cad: false,
        }
    }
}

/// What one call of [`generate_output_files`] wrote.
#[derive(Debug, Clone, Default)]
pub struct OutputReport {
    pub dir: PathBuf,
    pub document: PathBuf,
    pub sidecar: PathBuf,
    pub stl_files: Vec<PathBuf>,
    pub triangles: usize,
}

/// Write the CAD document, the STL files (unless `just_cad`) and the
/// parameter sidecar for one model run into `<root>/<model>_<tag>/`.
#[instrument(skip_all, fields(model = model, tag = tag))]
pub fn generate_output_files(
    kernel: &mut dyn Kernel,
    root: &Path,
    model: &str,
    parts: &Parts,
    params: &InputParameters,
    tag: &str,
    settings: &OutputSettings,
) -> Result<OutputReport, OutputError> {
    let layout = OutputLayout::new(root, model, tag);
    layout.create()?;
    write_document(kernel, &layout, parts)?;

    let mut report = OutputReport {
        dir: layout.dir().to_path_buf(),
        document: layout.document(),
        sidecar: layout.sidecar(),
        ..Default::default()
    };
    if !settings.just_cad {
        for (part, handle) in parts.iter() {
            let triangles = write_part_meshes(kernel, &layout, part, handle, settings)?;
            report.triangles += triangles;
            report.stl_files.push(layout.ascii_stl(part));
            report.stl_files.push(layout.binary_stl(part));
        }
    }
    write_sidecar(&layout, params)?;
    info!(
        dir = %report.dir.display(),
        stl_files = report.stl_files.len(),
        "output written"
    );
    Ok(report)
}

fn write_part_meshes(
    kernel: &mut dyn Kernel,
    layout: &OutputLayout,
    part: &str,
    handle: &KernelSolidHandle,
    settings: &OutputSettings,
) -> Result<usize, OutputError> {
    let diagonal = kernel.bounding_box(handle)?.diagonal();
    let tolerance = settings.mesher.tolerance(diagonal, settings.accuracy);
    let mut mesh = kernel.tessellate(handle, tolerance)?;
    let cleanup = clean_mesh(&mut mesh, WELD_TOLERANCE);
    if mesh.triangle_count() == 0 {
        return Err(OutputError::EmptyMesh {
            part: part.to_string(),
        });
    }
    debug!(
        part,
        tolerance,
        triangles = mesh.triangle_count(),
        fixes = cleanup.total_fixes(),
        "meshed part"
    );

    let solid_name = format!("{} (Meshed)", layout.part_name(part));
    let ascii = layout.ascii_stl(part);
    fs::write(&ascii, export_ascii_stl(&mesh, &solid_name)?).map_err(OutputError::io(&ascii))?;
    let binary = layout.binary_stl(part);
    fs::write(&binary, export_binary_stl(&mesh, &solid_name)?)
        .map_err(OutputError::io(&binary))?;
    Ok(mesh.triangle_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fineness_gets_finer_with_accuracy() {
        let coarse = Mesher::Fineness.tolerance(100.0, 2);
        let fine = Mesher::Fineness.tolerance(100.0, 20);
        assert!(fine < coarse);
        assert_eq!(Mesher::Standard.tolerance(100.0, 2), 1.0);
    }

    #[test]
    fn mesher_names() {
        assert_eq!(Mesher::from_name("fineness"), Some(Mesher::Fineness));
        assert_eq!(Mesher::from_name("netgen"), None);
    }
}
