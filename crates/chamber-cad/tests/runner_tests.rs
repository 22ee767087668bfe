use std::fs;
use std::path::PathBuf;

use chamber_cad::{
    base_model, parameter_sweep, run, CliError, RunArgs, RunError, RunPlan, BASE_TAG,
};
use chamber_kernel::{Kernel, MockKernel};
use chamber_models::find_model;
use chamber_types::ParamValue;
use file_format::{Mesher, OutputSettings};
use uuid::Uuid;

// ── Helper Functions ─────────────────────────────────────────────────────

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("chamber-cad-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn file(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn mock() -> Box<dyn Kernel> {
    Box::new(MockKernel::new())
}

fn mock_without_step() -> Box<dyn Kernel> {
    let mut kernel = MockKernel::new();
    kernel.fail_on("export_step");
    Box::new(kernel)
}

fn values(items: &[&str]) -> Vec<ParamValue> {
    items.iter().map(|v| ParamValue::scalar(*v)).collect()
}

// ── Baseline ─────────────────────────────────────────────────────────────

#[test]
fn base_run_writes_the_base_directory() {
    let scratch = ScratchDir::new();
    let model = find_model("pillbox_cavity").unwrap();
    let report = base_model(
        &mock,
        model,
        &model.default_parameters(),
        &scratch.0,
        &OutputSettings::default(),
    );
    assert_eq!(report.succeeded, [BASE_TAG]);
    assert!(report.is_clean());
    let dir = scratch.file("pillbox_cavity_Base");
    assert!(dir.join("pillbox_cavity_Base.step").is_file());
    assert!(dir.join("pillbox_cavity_Base_parameters.txt").is_file());
    assert!(dir.join("ascii/pillbox_cavity-vac.stl").is_file());
    assert!(dir.join("binary/pillbox_cavity-shell.stl").is_file());
}

#[test]
fn base_failure_is_recorded_not_raised() {
    let scratch = ScratchDir::new();
    let model = find_model("pillbox_cavity").unwrap();
    let report = base_model(
        &mock_without_step,
        model,
        &model.default_parameters(),
        &scratch.0,
        &OutputSettings::default(),
    );
    assert!(report.succeeded.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, BASE_TAG);
}

// ── Sweeps ───────────────────────────────────────────────────────────────

#[test]
fn sweep_tags_each_value() {
    let scratch = ScratchDir::new();
    let model = find_model("pillbox_cavity").unwrap();
    let report = parameter_sweep(
        &mock,
        model,
        &model.default_parameters(),
        &scratch.0,
        "pipe_radius",
        &values(&["15mm", "7.5mm"]),
        &OutputSettings::default(),
    )
    .unwrap();
    assert_eq!(
        report.succeeded,
        ["pipe_radius_sweep_value_15mm", "pipe_radius_sweep_value_7p5mm"]
    );
    let sidecar = fs::read_to_string(scratch.file(
        "pillbox_cavity_pipe_radius_sweep_value_15mm/pillbox_cavity_pipe_radius_sweep_value_15mm_parameters.txt",
    ))
    .unwrap();
    assert!(sidecar.contains("pipe_radius : 15mm\n"));
    assert!(sidecar.contains("cavity_radius : 20mm\n"));
}

#[test]
fn sweep_carries_on_past_a_bad_value() {
    let scratch = ScratchDir::new();
    let model = find_model("pillbox_cavity").unwrap();
    let report = parameter_sweep(
        &mock,
        model,
        &model.default_parameters(),
        &scratch.0,
        "cavity_radius",
        &values(&["30mm", "wide", "40mm"]),
        &OutputSettings::default(),
    )
    .unwrap();
    assert_eq!(
        report.succeeded,
        ["cavity_radius_sweep_value_30mm", "cavity_radius_sweep_value_40mm"]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "cavity_radius_sweep_value_wide");
    assert!(!scratch.file("pillbox_cavity_cavity_radius_sweep_value_wide").exists());
}

#[test]
fn sweep_values_do_not_leak_into_each_other() {
    let scratch = ScratchDir::new();
    let model = find_model("pillbox_cavity").unwrap();
    let params = model.default_parameters();
    parameter_sweep(
        &mock,
        model,
        &params,
        &scratch.0,
        "pipe_length",
        &values(&["40mm"]),
        &OutputSettings::default(),
    )
    .unwrap();
    assert_eq!(params.get("pipe_length"), Some(&ParamValue::scalar("80mm")));
}

#[test]
fn unknown_sweep_variable_fails_before_any_work() {
    let scratch = ScratchDir::new();
    let model = find_model("pillbox_cavity").unwrap();
    let err = parameter_sweep(
        &mock,
        model,
        &model.default_parameters(),
        &scratch.0,
        "beam_energy",
        &values(&["1GeV"]),
        &OutputSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        RunError::UnknownSweepVariable { ref variable, .. } if variable == "beam_energy"
    ));
    assert_eq!(fs::read_dir(&scratch.0).unwrap().count(), 0);
}

// ── Command line runs ────────────────────────────────────────────────────

#[test]
fn run_file_overrides_parameters_and_adds_sweeps() {
    let scratch = ScratchDir::new();
    let config = scratch.file("run.json");
    fs::write(
        &config,
        r#"{
            "parameters": {"cavity_radius": "35mm"},
            "sweeps": [{"variable": "wall_thickness", "values": ["1mm", "3mm"]}],
            "output": {"mesher": "fineness", "just_cad": true}
        }"#,
    )
    .unwrap();
    let out = scratch.file("out");
    let args = RunArgs {
        model: "pillbox_cavity".into(),
        output: out.clone(),
        params: Some(config),
        sweeps: vec![("pipe_radius".into(), values(&["12mm"]))],
        ..RunArgs::default()
    };

    let plan = RunPlan::resolve(&args).unwrap();
    assert_eq!(plan.params.get("cavity_radius"), Some(&ParamValue::scalar("35mm")));
    assert_eq!(plan.settings.mesher, Mesher::Fineness);
    assert!(plan.settings.just_cad);
    assert_eq!(plan.sweeps.len(), 2);

    let report = run(&args, &mock).unwrap();
    assert_eq!(
        report.succeeded,
        [
            "Base",
            "pipe_radius_sweep_value_12mm",
            "wall_thickness_sweep_value_1mm",
            "wall_thickness_sweep_value_3mm",
        ]
    );
    assert!(!out.join("pillbox_cavity_Base/ascii/pillbox_cavity-vac.stl").exists());
    let sidecar =
        fs::read_to_string(out.join("pillbox_cavity_Base/pillbox_cavity_Base_parameters.txt")).unwrap();
    assert!(sidecar.starts_with("cavity_radius : 35mm\n"));
}

#[test]
fn default_sweeps_run_after_the_base() {
    let scratch = ScratchDir::new();
    let args = RunArgs {
        model: "simple_buttons".into(),
        output: scratch.0.clone(),
        default_sweeps: true,
        just_cad: true,
        ..RunArgs::default()
    };
    let report = run(&args, &mock).unwrap();
    assert_eq!(
        report.succeeded,
        [
            "Base",
            "button_radius_sweep_value_2mm",
            "button_radius_sweep_value_2p5mm",
        ]
    );
}

#[test]
fn missing_run_file_is_an_io_error() {
    let scratch = ScratchDir::new();
    let args = RunArgs {
        model: "pillbox_cavity".into(),
        output: scratch.0.clone(),
        params: Some(scratch.file("absent.json")),
        ..RunArgs::default()
    };
    assert!(matches!(run(&args, &mock), Err(CliError::Io { .. })));
}
