use chamber_kernel::{Kernel, KernelError};
use chamber_types::{InputParameters, ParseError, Parameters};
use modeling_ops::{OpError, Parts};

/// Errors raised while building a model. Any of these aborts the build of
/// the current parameter set only.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("parameter error: {0}")]
    Parameter(#[from] ParseError),

    #[error("geometry error: {0}")]
    Geometry(#[from] OpError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
}

/// Named sweep: a parameter and the raw values it takes in turn.
pub type Sweep = (String, Vec<String>);

/// A parametric chamber geometry.
pub trait Model {
    /// Used for output directory and file names.
    fn name(&self) -> &'static str;

    /// Baseline parameter values, with units.
    fn default_parameters(&self) -> InputParameters;

    /// The parameter sweeps run when no sweep is given explicitly.
    fn default_sweeps(&self) -> Vec<Sweep> {
        Vec::new()
    }

    /// Mesh accuracy used when the caller does not choose one.
    fn default_accuracy(&self) -> u32 {
        10
    }

    /// Build every part of the model. Part order is output order.
    fn build(&self, kernel: &mut dyn Kernel, params: &Parameters) -> Result<Parts, ModelError>;
}

pub(crate) fn sweeps(table: &[(&str, &[&str])]) -> Vec<Sweep> {
    table
        .iter()
        .map(|(name, values)| {
            (
                name.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}
