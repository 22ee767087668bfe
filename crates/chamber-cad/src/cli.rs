//! Command line front end. Arguments are read by hand; the flag set is small
//! and fixed.

use std::path::{Path, PathBuf};

use chamber_models::{find_model, Model};
use chamber_types::{InputParameters, ParamValue, ParseError};
use file_format::{Mesher, OutputSettings};
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::runner::{base_model, parameter_sweep, KernelFactory, RunError, RunReport};

pub const USAGE: &str = "\
usage: chamber-cad <model> <output_dir> [options]
       chamber-cad --list

options:
  --params <file.json>        parameter overrides, sweeps and output options
  --sweep <name>=<v1>,<v2>    sweep one parameter (repeatable)
  --default-sweeps            also run the model's built-in sweeps
  --accuracy <N>              mesh accuracy used by the fineness mesher
  --mesher <standard|fineness>
  --just-cad                  write the CAD document and sidecar only
  --list                      print the available models";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("unknown model '{name}' (try --list)")]
    UnknownModel { name: String },

    #[error("missing {what}")]
    MissingArgument { what: &'static str },

    #[error("unexpected argument '{arg}'")]
    UnexpectedArgument { arg: String },

    #[error("bad value '{value}' for {flag}")]
    BadValue { flag: &'static str, value: String },

    #[error("unknown mesher '{name}', expected standard or fineness")]
    UnknownMesher { name: String },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid run file: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Parameter(#[from] ParseError),

    #[error(transparent)]
    Run(#[from] RunError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Help,
    Run(RunArgs),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunArgs {
    pub model: String,
    pub output: PathBuf,
    pub params: Option<PathBuf>,
    pub sweeps: Vec<(String, Vec<ParamValue>)>,
    pub default_sweeps: bool,
    pub accuracy: Option<u32>,
    pub mesher: Option<Mesher>,
    pub just_cad: bool,
}

fn next_value(
    args: &mut impl Iterator<Item = String>,
    what: &'static str,
) -> Result<String, CliError> {
    args.next().ok_or(CliError::MissingArgument { what })
}

fn parse_sweep(text: &str) -> Result<(String, Vec<ParamValue>), CliError> {
    let bad = || CliError::BadValue {
        flag: "--sweep",
        value: text.to_string(),
    };
    let (name, values) = text.split_once('=').ok_or_else(bad)?;
    let values: Vec<ParamValue> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ParamValue::scalar)
        .collect();
    if name.trim().is_empty() || values.is_empty() {
        return Err(bad());
    }
    Ok((name.trim().to_string(), values))
}

/// Read the arguments that follow the program name.
pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut positional = Vec::new();
    let mut run = RunArgs::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--list" => return Ok(Command::List),
            "-h" | "--help" => return Ok(Command::Help),
            "--params" => run.params = Some(next_value(&mut args, "file after --params")?.into()),
            "--sweep" => run.sweeps.push(parse_sweep(&next_value(&mut args, "sweep after --sweep")?)?),
            "--default-sweeps" => run.default_sweeps = true,
            "--just-cad" => run.just_cad = true,
            "--accuracy" => {
                let value = next_value(&mut args, "number after --accuracy")?;
                match value.parse::<u32>() {
                    Ok(n) if n > 0 => run.accuracy = Some(n),
                    _ => return Err(CliError::BadValue { flag: "--accuracy", value }),
                }
            }
            "--mesher" => {
                let name = next_value(&mut args, "name after --mesher")?;
                run.mesher = Some(Mesher::from_name(&name).ok_or(CliError::UnknownMesher { name })?);
            }
            flag if flag.starts_with("--") => {
                return Err(CliError::UnexpectedArgument { arg });
            }
            _ => positional.push(arg),
        }
    }
    let mut positional = positional.into_iter();
    run.model = positional.next().ok_or(CliError::MissingArgument { what: "model name" })?;
    run.output = positional
        .next()
        .ok_or(CliError::MissingArgument { what: "output directory" })?
        .into();
    if let Some(arg) = positional.next() {
        return Err(CliError::UnexpectedArgument { arg });
    }
    Ok(Command::Run(run))
}

/// Everything a run needs, resolved before any model is built.
pub struct RunPlan {
    pub model: &'static dyn Model,
    pub params: InputParameters,
    pub sweeps: Vec<(String, Vec<ParamValue>)>,
    pub settings: OutputSettings,
}

impl RunPlan {
    pub fn resolve(args: &RunArgs) -> Result<Self, CliError> {
        let model = find_model(&args.model).ok_or_else(|| CliError::UnknownModel {
            name: args.model.clone(),
        })?;
        let config = match &args.params {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };

        let baseline = model.default_parameters();
        let overrides = config.overrides()?;
        for (name, _) in overrides.iter() {
            if !baseline.contains(name) {
                warn!(model = model.name(), name, "override is not a parameter of this model");
            }
        }
        let params = baseline.merged(&overrides);

        let mut settings = OutputSettings {
            accuracy: model.default_accuracy(),
            ..OutputSettings::default()
        };
        config.output.apply(&mut settings);
        if let Some(accuracy) = args.accuracy {
            settings.accuracy = accuracy;
        }
        if let Some(mesher) = args.mesher {
            settings.mesher = mesher;
        }
        settings.just_cad |= args.just_cad;

        let mut sweeps = args.sweeps.clone();
        sweeps.extend(config.sweeps()?);
        if args.default_sweeps {
            sweeps.extend(model.default_sweeps().into_iter().map(|(variable, values)| {
                (variable, values.into_iter().map(ParamValue::scalar).collect())
            }));
        }
        if let Some((variable, _)) = sweeps.iter().find(|(v, _)| !params.contains(v)) {
            return Err(RunError::UnknownSweepVariable {
                model: model.name().to_string(),
                variable: variable.clone(),
            }
            .into());
        }

        Ok(Self {
            model,
            params,
            sweeps,
            settings,
        })
    }

    /// Baseline first, then every sweep in order.
    pub fn execute(&self, new_kernel: KernelFactory<'_>, output: &Path) -> Result<RunReport, CliError> {
        let mut report = base_model(new_kernel, self.model, &self.params, output, &self.settings);
        for (variable, values) in &self.sweeps {
            report.absorb(parameter_sweep(
                new_kernel,
                self.model,
                &self.params,
                output,
                variable,
                values,
                &self.settings,
            )?);
        }
        info!(
            model = self.model.name(),
            written = report.succeeded.len(),
            failed = report.failed.len(),
            "run finished"
        );
        Ok(report)
    }
}

pub fn run(args: &RunArgs, new_kernel: KernelFactory<'_>) -> Result<RunReport, CliError> {
    RunPlan::resolve(args)?.execute(new_kernel, &args.output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, CliError> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn reads_model_output_and_flags() {
        let Command::Run(run) = parse(&[
            "pillbox_cavity",
            "out",
            "--sweep",
            "pipe_radius=8mm, 12mm",
            "--accuracy",
            "15",
            "--mesher",
            "fineness",
            "--just-cad",
        ])
        .unwrap() else {
            panic!("expected a run");
        };
        assert_eq!(run.model, "pillbox_cavity");
        assert_eq!(run.output, PathBuf::from("out"));
        assert_eq!(
            run.sweeps,
            vec![(
                "pipe_radius".to_string(),
                vec![ParamValue::scalar("8mm"), ParamValue::scalar("12mm")]
            )]
        );
        assert_eq!(run.accuracy, Some(15));
        assert_eq!(run.mesher, Some(Mesher::Fineness));
        assert!(run.just_cad);
        assert!(!run.default_sweeps);
    }

    #[test]
    fn list_wins_over_everything_else() {
        assert_eq!(parse(&["pillbox_cavity", "--list"]).unwrap(), Command::List);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            parse(&["pillbox_cavity"]),
            Err(CliError::MissingArgument { what: "output directory" })
        ));
        assert!(matches!(
            parse(&["a", "b", "c"]),
            Err(CliError::UnexpectedArgument { .. })
        ));
        assert!(matches!(
            parse(&["a", "b", "--accuracy", "0"]),
            Err(CliError::BadValue { flag: "--accuracy", .. })
        ));
        assert!(matches!(
            parse(&["a", "b", "--mesher", "coarse"]),
            Err(CliError::UnknownMesher { .. })
        ));
        assert!(matches!(
            parse(&["a", "b", "--sweep", "pipe_radius"]),
            Err(CliError::BadValue { flag: "--sweep", .. })
        ));
        assert!(matches!(
            parse(&["a", "b", "--verbose"]),
            Err(CliError::UnexpectedArgument { .. })
        ));
    }

    #[test]
    fn plan_uses_the_model_accuracy_unless_told_otherwise() {
        let mut args = RunArgs {
            model: "aperture_gallery".into(),
            output: "out".into(),
            ..RunArgs::default()
        };
        assert_eq!(RunPlan::resolve(&args).unwrap().settings.accuracy, 25);
        args.accuracy = Some(4);
        assert_eq!(RunPlan::resolve(&args).unwrap().settings.accuracy, 4);
    }

    #[test]
    fn plan_checks_sweeps_before_running() {
        let args = RunArgs {
            model: "pillbox_cavity".into(),
            output: "out".into(),
            sweeps: vec![("no_such".into(), vec![ParamValue::scalar("1mm")])],
            ..RunArgs::default()
        };
        assert!(matches!(
            RunPlan::resolve(&args),
            Err(CliError::Run(RunError::UnknownSweepVariable { .. }))
        ));
    }

    #[test]
    fn plan_rejects_unknown_models() {
        let args = RunArgs {
            model: "teapot".into(),
            ..RunArgs::default()
        };
        assert!(matches!(RunPlan::resolve(&args), Err(CliError::UnknownModel { .. })));
    }
}
