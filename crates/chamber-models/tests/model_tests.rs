use approx::assert_relative_eq;
use chamber_kernel::{Kernel, KernelError, MockKernel};
use chamber_models::{all_models, find_model, Model, ModelError};
use chamber_types::{parse_input_parameters, InputParameters, ParamValue, ParseError};
use modeling_ops::{OpError, Parts};

fn build_with(model: &dyn Model, params: &InputParameters) -> Result<(Parts, MockKernel), ModelError> {
    let mut kernel = MockKernel::new();
    let parsed = parse_input_parameters(params)?;
    let parts = model.build(&mut kernel, &parsed)?;
    Ok((parts, kernel))
}

fn build_default(name: &str) -> (Parts, MockKernel) {
    let model = find_model(name).unwrap();
    build_with(model, &model.default_parameters()).unwrap()
}

fn names(parts: &Parts) -> Vec<&str> {
    parts.names().collect()
}

// ── Registry and defaults ───────────────────────────────────────────────

#[test]
fn every_model_builds_from_its_defaults() {
    for model in all_models() {
        let (parts, _) = build_with(model, &model.default_parameters())
            .unwrap_or_else(|e| panic!("{} failed: {e}", model.name()));
        assert!(!parts.is_empty(), "{} produced no parts", model.name());
    }
}

#[test]
fn default_sweeps_name_known_parameters() {
    for model in all_models() {
        let defaults = model.default_parameters();
        for (variable, values) in model.default_sweeps() {
            assert!(
                defaults.contains(&variable),
                "{}: sweep over unknown '{variable}'",
                model.name()
            );
            assert!(!values.is_empty());
        }
    }
}

#[test]
fn every_sweep_value_builds() {
    let model = find_model("pillbox_cavity").unwrap();
    for (variable, values) in model.default_sweeps() {
        for value in values {
            let params = model
                .default_parameters()
                .with_override(&variable, ParamValue::scalar(value.as_str()));
            build_with(model, &params)
                .unwrap_or_else(|e| panic!("{variable}={value} failed: {e}"));
        }
    }
}

#[test]
fn gallery_asks_for_a_finer_mesh() {
    assert_eq!(find_model("aperture_gallery").unwrap().default_accuracy(), 25);
    assert_eq!(find_model("pillbox_cavity").unwrap().default_accuracy(), 10);
}

// ── Part layout ─────────────────────────────────────────────────────────

#[test]
fn pillbox_parts_and_extent() {
    let (parts, kernel) = build_default("pillbox_cavity");
    assert_eq!(names(&parts), ["vac", "shell"]);
    let bb = kernel.bounding_box(parts.get("vac").unwrap()).unwrap();
    assert_relative_eq!(bb.min[0], -90.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[0], 90.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[1], 20.0, epsilon = 1e-6);
}

#[test]
fn parallel_plates_span_the_plate_length() {
    let (parts, kernel) = build_default("simple_parallel_plates");
    assert_eq!(names(&parts), ["plates"]);
    let bb = kernel.bounding_box(parts.get("plates").unwrap()).unwrap();
    assert_relative_eq!(bb.size()[0], 150.0, epsilon = 1e-9);
    assert_relative_eq!(bb.min[2], -7.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[2], 7.0, epsilon = 1e-9);
}

#[test]
fn simple_stripline_parts() {
    let (parts, kernel) = build_default("simple_stripline");
    assert_eq!(names(&parts), ["cavity", "striplines", "pins"]);
    assert_eq!(kernel.count("make_cylinder"), 8);
    assert_eq!(kernel.count("make_box"), 2);
    let pins = kernel.bounding_box(parts.get("pins").unwrap()).unwrap();
    assert_relative_eq!(pins.max[1], 80.0, epsilon = 1e-9);
    assert_relative_eq!(pins.min[1], -80.0, epsilon = 1e-9);
}

#[test]
fn buttons_parts_in_quadrant_order() {
    let (parts, _) = build_default("simple_buttons");
    let mut expected = vec!["vac".to_string(), "block".into(), "beampipe".into()];
    for i in 1..=4 {
        for kind in ["button", "pin", "ceramic", "shell"] {
            expected.push(format!("{kind}{i}"));
        }
    }
    assert_eq!(names(&parts), expected);
}

#[test]
fn buttons_tilt_towards_the_vertical() {
    let (_, kernel) = build_default("simple_buttons");
    // Four holes and four buttons, each turned once about X.
    assert_eq!(kernel.count("rotate"), 4 + 4 * 4);
}

#[test]
fn four_blade_stripline_parts() {
    let (parts, _) = build_default("stripline_curved_tapered_4_blade");
    assert_eq!(
        names(&parts),
        [
            "us_pipe",
            "ds_pipe",
            "cavity",
            "vac",
            "stripline_upper",
            "stripline_right",
            "stripline_lower",
            "stripline_left",
            "pin_us_upper",
            "pin_us_right",
            "pin_us_lower",
            "pin_us_left",
            "pin_ds_upper",
            "pin_ds_right",
            "pin_ds_lower",
            "pin_ds_left",
        ]
    );
}

#[test]
fn four_blade_pins_meet_their_blades() {
    let (parts, kernel) = build_default("stripline_curved_tapered_4_blade");
    let pin = kernel.bounding_box(parts.get("pin_us_upper").unwrap()).unwrap();
    // Upper blade sits on +Y; its upstream pin hangs down towards it.
    assert!(pin.min[1] > 0.0);
    assert!(pin.min[1] < 16.0);
    assert!(pin.centre()[0] < 0.0);
    let pin = kernel.bounding_box(parts.get("pin_ds_right").unwrap()).unwrap();
    assert!(pin.min[2] > 0.0);
    assert!(pin.centre()[0] > 0.0);
}

#[test]
fn two_blade_stripline_parts() {
    let (parts, _) = build_default("stripline_curved_tapered_2_blade");
    assert_eq!(
        names(&parts),
        [
            "us_pipe",
            "ds_pipe",
            "cavity",
            "vac",
            "stripline_upper",
            "stripline_lower",
            "pin_us_upper",
            "pin_us_lower",
            "pin_ds_upper",
            "pin_ds_lower",
        ]
    );
}

#[test]
fn gallery_has_one_section_per_aperture() {
    let (parts, kernel) = build_default("aperture_gallery");
    assert_eq!(parts.len(), 14);
    assert_eq!(kernel.count("extrude_face"), 14);
    let first = kernel.bounding_box(parts.get("circular").unwrap()).unwrap();
    let second = kernel.bounding_box(parts.get("elliptical").unwrap()).unwrap();
    assert_relative_eq!(second.centre()[0] - first.centre()[0], 100.0, epsilon = 1e-9);
}

// ── Failures ────────────────────────────────────────────────────────────

#[test]
fn missing_parameter_is_reported_by_name() {
    let model = find_model("elliptical_taper").unwrap();
    let mut params = InputParameters::new();
    for (name, value) in model.default_parameters().iter() {
        if name != "taper_length" {
            params.insert(name, value.clone());
        }
    }
    match build_with(model, &params) {
        Err(ModelError::Parameter(ParseError::MissingParameter { name })) => {
            assert_eq!(name, "taper_length")
        }
        other => panic!("expected a missing parameter, got {:?}", other.map(|(p, _)| p.len())),
    }
}

#[test]
fn lengths_given_as_angles_are_rejected() {
    let model = find_model("stripline_curved_tapered_4_blade").unwrap();
    let params = model
        .default_parameters()
        .with_override("stripline_width", ParamValue::scalar("30mm"));
    assert!(matches!(
        build_with(model, &params),
        Err(ModelError::Parameter(ParseError::WrongDimension { .. }))
    ));
}

#[test]
fn unbuildable_blade_is_a_geometry_error() {
    let model = find_model("stripline_curved_tapered_4_blade").unwrap();
    let params = model
        .default_parameters()
        .with_override("stripline_taper_length", ParamValue::scalar("80mm"));
    assert!(matches!(
        build_with(model, &params),
        Err(ModelError::Geometry(OpError::InvalidParameter { .. }))
    ));
}

#[test]
fn kernel_failure_aborts_the_build() {
    let model = find_model("racetrack_tapered_cavity").unwrap();
    let parsed = parse_input_parameters(&model.default_parameters()).unwrap();
    let mut kernel = MockKernel::new();
    kernel.fail_on("loft");
    let err = model.build(&mut kernel, &parsed).unwrap_err();
    let injected = match err {
        ModelError::Kernel(e) | ModelError::Geometry(OpError::Kernel(e)) => e,
        other => panic!("unexpected error {other}"),
    };
    assert!(matches!(injected, KernelError::Injected { .. }));
}
