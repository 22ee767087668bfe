//! STEP (ISO 10303-21) document output through truck-stepio.

use truck_modeling::topology::Solid;
use truck_stepio::out;

use crate::types::KernelError;

const ORIGINATION_SYSTEM: &str = "chamber-cad";
/// truck-stepio leaves every product unnamed.
const UNNAMED_PRODUCT: &str = "= PRODUCT('','',''";

/// STEP string literals double their apostrophes.
fn step_string(text: &str) -> String {
    text.replace('\'', "''")
}

/// Give the unnamed PRODUCT records their names, in document order.
fn label_products(text: &str, names: &[&str]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    for name in names {
        let Some(at) = rest.find(UNNAMED_PRODUCT) else {
            break;
        };
        let name = step_string(name);
        out.push_str(&rest[..at]);
        out.push_str(&format!("= PRODUCT('{name}','{name}',''"));
        rest = &rest[at + UNNAMED_PRODUCT.len()..];
    }
    out.push_str(rest);
    out
}

/// Write all `solids` into one STEP document, one named product each.
pub fn write_step(solids: &[(&str, &Solid)], file_name: &str) -> Result<String, KernelError> {
    if solids.is_empty() {
        return Err(KernelError::ExportFailed {
            reason: "no solids to export".to_string(),
        });
    }
    let compressed: Vec<_> = solids.iter().map(|(_, s)| s.compress()).collect();
    let models: out::StepModels<_, _, _> = compressed.iter().collect();
    let header = out::StepHeaderDescriptor {
        file_name: file_name.to_string(),
        organization_system: ORIGINATION_SYSTEM.to_string(),
        ..Default::default()
    };
    let text = out::CompleteStepDisplay::new(models, header).to_string();
    let names: Vec<&str> = solids.iter().map(|(name, _)| *name).collect();
    Ok(label_products(&text, &names))
}
