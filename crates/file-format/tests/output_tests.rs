use std::fs;
use std::path::PathBuf;

use chamber_kernel::{Kernel, MockKernel};
use chamber_types::InputParameters;
use file_format::{generate_output_files, Mesher, OutputError, OutputSettings};
use modeling_ops::Parts;
use uuid::Uuid;

// ── Helper Functions ─────────────────────────────────────────────────────

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("file-format-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn two_boxes(kernel: &mut MockKernel) -> Parts {
    let mut parts = Parts::new();
    parts.insert("vac", kernel.make_box([10.0, 4.0, 4.0], [-5.0, -2.0, -2.0]).unwrap());
    parts.insert("shell", kernel.make_box([10.0, 6.0, 6.0], [-5.0, -3.0, -3.0]).unwrap());
    parts
}

fn params() -> InputParameters {
    InputParameters::new()
        .scalar("pipe_radius", "10mm")
        .list("insert_angles", &["0deg", "90deg"])
}

// ── Layout ───────────────────────────────────────────────────────────────

#[test]
fn writes_document_meshes_and_sidecar() {
    let scratch = ScratchDir::new();
    let mut kernel = MockKernel::new();
    let parts = two_boxes(&mut kernel);
    let report = generate_output_files(
        &mut kernel,
        &scratch.0,
        "pillbox_cavity",
        &parts,
        &params(),
        "Base",
        &OutputSettings::default(),
    )
    .unwrap();

    let dir = scratch.0.join("pillbox_cavity_Base");
    assert_eq!(report.dir, dir);
    assert!(dir.join("pillbox_cavity_Base.step").is_file());
    assert!(dir.join("ascii/pillbox_cavity-vac.stl").is_file());
    assert!(dir.join("binary/pillbox_cavity-shell.stl").is_file());
    assert_eq!(report.stl_files.len(), 4);
    assert_eq!(report.triangles, 24);

    // Temporary names are gone after the rename.
    assert!(!dir.join("A.step").exists());
    assert!(!dir.join("A.txt").exists());

    let sidecar = fs::read_to_string(dir.join("pillbox_cavity_Base_parameters.txt")).unwrap();
    assert_eq!(
        sidecar,
        "pipe_radius : 10mm\ninsert_angles1 : 0deg\ninsert_angles2 : 90deg\n"
    );
}

#[test]
fn ascii_stl_names_the_meshed_solid() {
    let scratch = ScratchDir::new();
    let mut kernel = MockKernel::new();
    let parts = two_boxes(&mut kernel);
    generate_output_files(
        &mut kernel,
        &scratch.0,
        "demo",
        &parts,
        &params(),
        "Base",
        &OutputSettings::default(),
    )
    .unwrap();
    let text = fs::read_to_string(scratch.0.join("demo_Base/ascii/demo-vac.stl")).unwrap();
    assert!(text.starts_with("solid demo-vac (Meshed)\n"));
    assert_eq!(text.matches("endfacet").count(), 12);

    let bytes = fs::read(scratch.0.join("demo_Base/binary/demo-vac.stl")).unwrap();
    assert_eq!(bytes.len(), 84 + 12 * 50);
}

#[test]
fn just_cad_skips_meshing() {
    let scratch = ScratchDir::new();
    let mut kernel = MockKernel::new();
    let parts = two_boxes(&mut kernel);
    let settings = OutputSettings {
        just_cad: true,
        ..OutputSettings::default()
    };
    let report = generate_output_files(
        &mut kernel,
        &scratch.0,
        "demo",
        &parts,
        &params(),
        "Base",
        &settings,
    )
    .unwrap();
    assert!(report.stl_files.is_empty());
    assert_eq!(kernel.count("tessellate"), 0);
    assert!(report.document.is_file());
    assert!(report.sidecar.is_file());
}

#[test]
fn rerun_replaces_existing_files() {
    let scratch = ScratchDir::new();
    let mut kernel = MockKernel::new();
    let parts = two_boxes(&mut kernel);
    let settings = OutputSettings {
        mesher: Mesher::Fineness,
        accuracy: 5,
        just_cad: false,
    };
    for radius in ["10mm", "12mm"] {
        let params = InputParameters::new().scalar("pipe_radius", radius);
        generate_output_files(&mut kernel, &scratch.0, "demo", &parts, &params, "Base", &settings)
            .unwrap();
    }
    let sidecar = fs::read_to_string(scratch.0.join("demo_Base/demo_Base_parameters.txt")).unwrap();
    assert_eq!(sidecar, "pipe_radius : 12mm\n");
}

// ── Failures ─────────────────────────────────────────────────────────────

#[test]
fn tessellation_failure_is_a_kernel_error() {
    let scratch = ScratchDir::new();
    let mut kernel = MockKernel::new();
    let parts = two_boxes(&mut kernel);
    kernel.fail_on("tessellate");
    let err = generate_output_files(
        &mut kernel,
        &scratch.0,
        "demo",
        &parts,
        &params(),
        "Base",
        &OutputSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, OutputError::Kernel(_)));
}

#[test]
fn settings_read_from_json_with_defaults() {
    let settings: OutputSettings = serde_json::from_str(r#"{"mesher": "fineness"}"#).unwrap();
    assert_eq!(settings.mesher, Mesher::Fineness);
    assert_eq!(settings.accuracy, 10);
    assert!(!settings.just_cad);
}
