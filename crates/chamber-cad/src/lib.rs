//! Drives the chamber models: builds a baseline and any parameter sweeps,
//! and writes each result through `file-format`.

pub mod cli;
pub mod config;
pub mod runner;

pub use cli::{parse_args, run, CliError, Command, RunArgs, RunPlan, USAGE};
pub use config::{OutputOverrides, RunConfig, SweepConfig};
pub use runner::{base_model, parameter_sweep, KernelFactory, RunError, RunReport, BASE_TAG};
