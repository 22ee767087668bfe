//! On-disk artefacts of a model run: STL meshes, the STEP document and the
//! parameter sidecar.

pub mod document;
pub mod errors;
pub mod layout;
pub mod output;
pub mod sidecar;
pub mod stl;

pub use errors::OutputError;
pub use layout::OutputLayout;
pub use output::{generate_output_files, Mesher, OutputReport, OutputSettings};
pub use sidecar::render_sidecar;
pub use stl::{export_ascii_stl, export_binary_stl};
