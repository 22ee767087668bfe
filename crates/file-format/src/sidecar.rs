use chamber_types::{breakup_lists, InputParameters};

use crate::errors::OutputError;
use crate::layout::{write_then_rename, OutputLayout, SIDECAR_TEMP_NAME};

/// One `name : value` line per parameter, with lists expanded into
/// numbered entries, in input order.
pub fn render_sidecar(params: &InputParameters) -> String {
    breakup_lists(params)
        .into_iter()
        .map(|(name, value)| format!("{name} : {value}\n"))
        .collect()
}

pub fn write_sidecar(layout: &OutputLayout, params: &InputParameters) -> Result<(), OutputError> {
    write_then_rename(
        layout.dir(),
        SIDECAR_TEMP_NAME,
        &layout.sidecar(),
        render_sidecar(params).as_bytes(),
    )
}
