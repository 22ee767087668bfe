use chamber_kernel::Kernel;
use modeling_ops::Parts;
use tracing::info;

use crate::errors::OutputError;
use crate::layout::{write_then_rename, OutputLayout, DOCUMENT_TEMP_NAME};

/// Write every part into one STEP document, each solid labelled
/// `<model>-<part>`.
pub fn write_document(
    kernel: &dyn Kernel,
    layout: &OutputLayout,
    parts: &Parts,
) -> Result<(), OutputError> {
    let labelled: Vec<_> = parts
        .iter()
        .map(|(name, handle)| (layout.part_name(name), handle.clone()))
        .collect();
    let target = layout.document();
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let step = kernel.export_step(&labelled, &file_name)?;
    write_then_rename(layout.dir(), DOCUMENT_TEMP_NAME, &target, step.as_bytes())?;
    info!(path = %target.display(), parts = labelled.len(), "wrote CAD document");
    Ok(())
}
