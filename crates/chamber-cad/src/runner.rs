//! Baseline and sweep runs. A failing parameter set is logged and recorded,
//! and the remaining runs carry on.

use std::path::Path;

use chamber_kernel::Kernel;
use chamber_models::{Model, ModelError};
use chamber_types::{model_tag, parse_input_parameters, InputParameters, ParamValue};
use file_format::{generate_output_files, OutputError, OutputReport, OutputSettings};
use tracing::{error, info, instrument};

/// Tag of the baseline run's output directory.
pub const BASE_TAG: &str = "Base";

/// Makes a fresh kernel for every run, so no run sees another's solids.
pub type KernelFactory<'a> = &'a dyn Fn() -> Box<dyn Kernel>;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("sweep variable '{variable}' is not a parameter of {model}")]
    UnknownSweepVariable { model: String, variable: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Tags that were written, and tags that failed with their error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl RunReport {
    pub fn absorb(&mut self, other: RunReport) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

fn run_one(
    new_kernel: KernelFactory<'_>,
    model: &dyn Model,
    params: &InputParameters,
    output: &Path,
    tag: &str,
    settings: &OutputSettings,
) -> Result<OutputReport, RunError> {
    let parsed = parse_input_parameters(params).map_err(ModelError::from)?;
    let mut kernel = new_kernel();
    let parts = model.build(kernel.as_mut(), &parsed)?;
    Ok(generate_output_files(
        kernel.as_mut(),
        output,
        model.name(),
        &parts,
        params,
        tag,
        settings,
    )?)
}

/// Build and write the model with its baseline parameters.
#[instrument(skip_all, fields(model = model.name()))]
pub fn base_model(
    new_kernel: KernelFactory<'_>,
    model: &dyn Model,
    params: &InputParameters,
    output: &Path,
    settings: &OutputSettings,
) -> RunReport {
    let mut report = RunReport::default();
    match run_one(new_kernel, model, params, output, BASE_TAG, settings) {
        Ok(written) => {
            info!(dir = %written.dir.display(), "base model written");
            report.succeeded.push(BASE_TAG.to_string());
        }
        Err(e) => {
            error!("problem with base model: {e}");
            report.failed.push((BASE_TAG.to_string(), e.to_string()));
        }
    }
    report
}

/// Build and write one model per value of `variable`, each starting from a
/// fresh copy of `params`.
#[instrument(skip_all, fields(model = model.name(), variable = variable))]
pub fn parameter_sweep(
    new_kernel: KernelFactory<'_>,
    model: &dyn Model,
    params: &InputParameters,
    output: &Path,
    variable: &str,
    values: &[ParamValue],
    settings: &OutputSettings,
) -> Result<RunReport, RunError> {
    if !params.contains(variable) {
        return Err(RunError::UnknownSweepVariable {
            model: model.name().to_string(),
            variable: variable.to_string(),
        });
    }
    let mut report = RunReport::default();
    for value in values {
        let swept = params.with_override(variable, value.clone());
        let tag = model_tag(variable, value);
        match run_one(new_kernel, model, &swept, output, &tag, settings) {
            Ok(_) => {
                info!(%value, "sweep value written");
                report.succeeded.push(tag);
            }
            Err(e) => {
                error!("problem with model {variable}_sweep_value_{value}: {e}");
                report.failed.push((tag, e.to_string()));
            }
        }
    }
    Ok(report)
}
