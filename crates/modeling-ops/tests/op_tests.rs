use approx::assert_relative_eq;
use chamber_kernel::{Kernel, KernelError, MockKernel};
use chamber_types::Point2;
use modeling_ops::*;
use proptest::prelude::*;

fn blade_dims() -> StriplineDims {
    StriplineDims {
        pipe_radius: 12.0,
        pipe_thickness: 2.0,
        cavity_radius: 25.0,
        total_stripline_length: 150.0,
        stripline_taper_length: 20.0,
        stripline_offset: 14.0,
        stripline_thickness: 2.0,
        stripline_width: 30.0,
        stripline_taper_end_width: 15.0,
        additional_cavity_length: 10.0,
        feedthrough_offset: 5.0,
    }
}

// ── Elements ────────────────────────────────────────────────────────────

#[test]
fn beampipe_is_centred_on_its_location() {
    let mut k = MockKernel::new();
    let face = k.make_face(&make_circular_aperture(10.0).unwrap()).unwrap();
    let pipe = make_beampipe(&mut k, face, 80.0, [100.0, 0.0, 0.0], NO_ROTATION).unwrap();
    let bb = k.bounding_box(&pipe).unwrap();
    assert_relative_eq!(bb.min[0], 60.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[0], 140.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[1], 10.0, epsilon = 1e-6);
}

#[test]
fn beampipe_from_end_starts_at_location() {
    let mut k = MockKernel::new();
    let face = k.make_face(&make_rectangle_aperture(4.0, 6.0).unwrap()).unwrap();
    let pipe = make_beampipe_from_end(&mut k, face, 30.0, [5.0, 0.0, 0.0], NO_ROTATION).unwrap();
    let bb = k.bounding_box(&pipe).unwrap();
    assert_relative_eq!(bb.min[0], 5.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[0], 35.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[2], 3.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[1], 2.0, epsilon = 1e-9);
}

#[test]
fn non_positive_pipe_length_is_rejected() {
    let mut k = MockKernel::new();
    let face = k.make_face(&make_circular_aperture(10.0).unwrap()).unwrap();
    let err = make_beampipe(&mut k, face, 0.0, ORIGIN, NO_ROTATION).unwrap_err();
    assert!(matches!(err, OpError::InvalidParameter { .. }));
}

#[test]
fn flipped_taper_runs_upstream_from_its_location() {
    let mut k = MockKernel::new();
    let start = make_elliptical_aperture(20.0, 60.0).unwrap();
    let end = make_elliptical_aperture(10.0, 40.0).unwrap();
    let taper = make_taper(
        &mut k,
        &start,
        &end,
        30.0,
        [-10.0, 0.0, 0.0],
        [0.0, 180.0, 0.0],
        Point2::default(),
    )
    .unwrap();
    let bb = k.bounding_box(&taper).unwrap();
    assert_relative_eq!(bb.min[0], -40.0, epsilon = 1e-6);
    assert_relative_eq!(bb.max[0], -10.0, epsilon = 1e-6);
}

#[test]
fn taper_offset_moves_the_far_end() {
    let mut k = MockKernel::new();
    let ap = make_circular_aperture(5.0).unwrap();
    let taper = make_taper(
        &mut k,
        &ap,
        &ap,
        10.0,
        ORIGIN,
        NO_ROTATION,
        Point2::new(0.0, 3.0),
    )
    .unwrap();
    let bb = k.bounding_box(&taper).unwrap();
    assert_relative_eq!(bb.max[1], 8.0, epsilon = 1e-6);
    assert_relative_eq!(bb.min[1], -5.0, epsilon = 1e-6);
}

#[test]
fn rotate_at_applies_z_before_x() {
    let mut k = MockKernel::new();
    let bar = k.make_box([10.0, 1.0, 1.0], [0.0, 0.0, 0.0]).unwrap();
    // Z by 90 turns the bar onto +Y, X by 90 then carries it onto +Z.
    let turned = rotate_at(&mut k, &bar, ORIGIN, [90.0, 0.0, 90.0]).unwrap();
    let bb = k.bounding_box(&turned).unwrap();
    assert_relative_eq!(bb.max[2], 10.0, epsilon = 1e-6);
    assert_relative_eq!(bb.size()[0], 1.0, epsilon = 1e-6);
    assert_eq!(k.count("rotate"), 2);
}

#[test]
fn zero_rotation_does_not_touch_the_kernel() {
    let mut k = MockKernel::new();
    let bar = k.make_box([1.0, 1.0, 1.0], ORIGIN).unwrap();
    rotate_at(&mut k, &bar, ORIGIN, NO_ROTATION).unwrap();
    assert_eq!(k.count("rotate"), 0);
}

#[test]
fn outboard_bump_stands_on_the_positive_wall() {
    let mut k = MockKernel::new();
    let bump = ShadowingBump {
        pipe_width: 40.0,
        thickness: 10.0,
        height: 3.0,
        top_length: 8.0,
        us_length: 4.0,
        ds_length: 6.0,
        side: "ob".parse().unwrap(),
        position: 20.0,
    };
    let solid = add_shadowing_bump(&mut k, &bump).unwrap();
    let bb = k.bounding_box(&solid).unwrap();
    assert_relative_eq!(bb.min[0], 12.0, epsilon = 1e-6);
    assert_relative_eq!(bb.max[0], 30.0, epsilon = 1e-6);
    assert_relative_eq!(bb.min[1], 17.0, epsilon = 1e-6);
    assert_relative_eq!(bb.max[1], 20.0, epsilon = 1e-6);
    assert_relative_eq!(bb.min[2], -5.0, epsilon = 1e-6);
    assert_relative_eq!(bb.max[2], 5.0, epsilon = 1e-6);
}

#[test]
fn fuse_all_needs_at_least_one_solid() {
    let mut k = MockKernel::new();
    assert!(matches!(
        fuse_all(&mut k, &[]),
        Err(OpError::InvalidParameter { .. })
    ));
}

#[test]
fn cut_all_chains_subtractions() {
    let mut k = MockKernel::new();
    let base = k.make_box([10.0, 10.0, 10.0], ORIGIN).unwrap();
    let a = k.make_box([1.0, 1.0, 1.0], ORIGIN).unwrap();
    let b = k.make_box([1.0, 1.0, 1.0], [5.0, 5.0, 5.0]).unwrap();
    cut_all(&mut k, &base, &[a, b]).unwrap();
    assert_eq!(k.count("boolean_subtract"), 2);
}

// ── Components ──────────────────────────────────────────────────────────

#[test]
fn sma_pin_reaches_into_the_vacuum() {
    let mut k = MockKernel::new();
    let parts = sma_connector(&mut k, 20.0, [0.0, 1.0, 0.0], [0.0, 5.0, 0.0]).unwrap();
    let pin = k.bounding_box(&parts.pin).unwrap();
    assert_relative_eq!(pin.min[1], -15.0, epsilon = 1e-9);
    assert_relative_eq!(pin.max[1], 12.5, epsilon = 1e-9);
    let outer = k.bounding_box(&parts.outer).unwrap();
    assert_relative_eq!(outer.max[2], 3.0, epsilon = 1e-9);
}

#[test]
fn ntype_connector_follows_its_axis() {
    let mut k = MockKernel::new();
    let parts = ntype_connector(&mut k, 10.0, [0.0, 0.0, -1.0], ORIGIN).unwrap();
    let pin = k.bounding_box(&parts.pin).unwrap();
    assert_relative_eq!(pin.max[2], 10.0, epsilon = 1e-9);
    assert_relative_eq!(pin.min[2], -15.0, epsilon = 1e-9);
}

#[test]
fn zero_axis_connector_is_rejected() {
    let mut k = MockKernel::new();
    assert!(ntype_connector(&mut k, 10.0, [0.0; 3], ORIGIN).is_err());
}

#[test]
fn stub_turns_about_the_origin() {
    let mut k = MockKernel::new();
    let stub =
        ntype_connector_stub(&mut k, 12.0, 5.0, NO_ROTATION, [0.0, 27.0, 0.0], [180.0, 0.0, 0.0])
            .unwrap();
    let pin = k.bounding_box(&stub.pin).unwrap();
    assert_relative_eq!(pin.max[1], -15.0, epsilon = 1e-6);
    assert_relative_eq!(pin.min[1], -27.0, epsilon = 1e-6);
    let vac = k.bounding_box(&stub.vac).unwrap();
    assert_relative_eq!(vac.size()[0], 2.0 * NTYPE_OUTER_INNER_RADIUS, epsilon = 1e-6);
}

#[test]
fn nose_runs_along_x() {
    let mut k = MockKernel::new();
    let nose = make_nose(&mut k, 10.0, 2.0, 15.0, 1.0, ORIGIN, NO_ROTATION).unwrap();
    let bb = k.bounding_box(&nose).unwrap();
    assert_relative_eq!(bb.min[0], 0.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[0], 15.0, epsilon = 1e-9);
    assert_eq!(k.count("make_torus"), 2);
}

#[test]
fn nose_shorter_than_its_lip_is_rejected() {
    let mut k = MockKernel::new();
    assert!(make_nose(&mut k, 10.0, 4.0, 1.0, 1.0, ORIGIN, NO_ROTATION).is_err());
}

#[test]
fn stripline_blade_spans_the_full_length_on_positive_z() {
    let mut k = MockKernel::new();
    let blade = make_stripline(&mut k, &blade_dims(), 0.0).unwrap();
    let bb = k.bounding_box(&blade).unwrap();
    assert_relative_eq!(bb.min[0], -75.0, epsilon = 1e-6);
    assert_relative_eq!(bb.max[0], 75.0, epsilon = 1e-6);
    assert!(bb.min[2] > 10.0);
    assert!(bb.max[2] <= 16.0 + 1e-6);
    assert_eq!(k.count("loft"), 2);
}

#[test]
fn stripline_rotation_turns_about_the_beam() {
    let mut k = MockKernel::new();
    let blade = make_stripline(&mut k, &blade_dims(), 90.0).unwrap();
    let bb = k.bounding_box(&blade).unwrap();
    assert!(bb.max[1] < -10.0);
    assert!(bb.min[1] >= -16.0 - 1e-6);
}

#[test]
fn tapers_longer_than_the_blade_are_rejected() {
    let mut k = MockKernel::new();
    let dims = StriplineDims {
        stripline_taper_length: 80.0,
        ..blade_dims()
    };
    assert!(matches!(
        make_stripline(&mut k, &dims, 0.0),
        Err(OpError::InvalidParameter { .. })
    ));
}

#[test]
fn feedthrough_pin_stops_in_the_middle_of_the_blade() {
    let mut k = MockKernel::new();
    let parts = make_stripline_feedthrough(&mut k, &blade_dims(), PortEnd::Upstream, 0.0).unwrap();
    let pin = k.bounding_box(&parts.pin).unwrap();
    assert_relative_eq!(pin.min[1], 15.0, epsilon = 1e-6);
    assert_relative_eq!(pin.max[1], 27.0, epsilon = 1e-6);
    assert_relative_eq!(pin.centre()[0], -70.0, epsilon = 1e-6);

    let bore = k.bounding_box(&parts.bore).unwrap();
    assert_relative_eq!(bore.min[1], 0.0, epsilon = 1e-6);
    assert_relative_eq!(bore.max[1], 27.0, epsilon = 1e-6);
}

#[test]
fn quarter_turned_feedthrough_meets_the_unturned_blade() {
    let mut k = MockKernel::new();
    let dims = blade_dims();
    let blade = make_stripline(&mut k, &dims, 0.0).unwrap();
    let port = make_stripline_feedthrough(&mut k, &dims, PortEnd::Downstream, 90.0).unwrap();
    let blade_bb = k.bounding_box(&blade).unwrap();
    let pin = k.bounding_box(&port.pin).unwrap();
    assert_relative_eq!(pin.centre()[0], 70.0, epsilon = 1e-6);
    assert!(pin.min[2] > blade_bb.min[2] && pin.min[2] < blade_bb.max[2]);
    assert!(pin.centre()[1].abs() < 1e-6);
}

#[test]
fn kernel_failures_surface_as_op_errors() {
    let mut k = MockKernel::new();
    k.fail_on("boolean_subtract");
    let err = sma_connector(&mut k, 5.0, [0.0, 1.0, 0.0], ORIGIN).unwrap_err();
    assert!(matches!(
        err,
        OpError::Kernel(KernelError::Injected { .. })
    ));
}

// ── Apertures ───────────────────────────────────────────────────────────

#[test]
fn every_aperture_makes_a_face() {
    let dims = KeyholeOctagon {
        aperture_height: 20.0,
        tb_width: 10.0,
        ib_oct_width: 5.0,
        ob_oct_width: 4.0,
        ib_keyhole_height: 6.0,
        ib_keyhole_width: 8.0,
        ob_keyhole_height: 5.0,
        ob_keyhole_width: 7.0,
        antichamber_taper_width: 3.0,
        antichamber_height: 12.0,
        antichamber_width: 15.0,
    };
    let profiles = [
        make_racetrack_aperture(10.0, 40.0).unwrap(),
        make_rectangle_aperture(10.0, 40.0).unwrap(),
        make_keyhole_aperture(10.0, 4.0, 8.0).unwrap(),
        make_arc_aperture(14.0, 16.0, 30.0, 0.75).unwrap(),
        make_arched_base_aperture(10.0, 20.0, 30.0).unwrap(),
        make_arched_base_trapezoid_aperture(10.0, 20.0, 14.0, 30.0).unwrap(),
        make_cylinder_with_inserts(25.0, 10.0, 30.0, 2.0).unwrap(),
        make_spoked_cylinder(20.0, 10.0, &[0.0, 120.0, 240.0], &[20.0; 3]).unwrap(),
        make_cylinder_with_tags(20.0, 10.0, &[0.0, 90.0, 180.0, 270.0], &[4.0; 4]).unwrap(),
        make_polygon_with_tags(10.0, &[14.0, 16.0], &[0.0, 180.0], &[3.0, 3.0]).unwrap(),
        make_circular_aperture(10.0).unwrap(),
        make_octagonal_aperture(20.0, 60.0, 8.0, 20.0).unwrap(),
        make_octagonal_aperture_with_keyholes_and_antichamber(&dims).unwrap(),
        make_elliptical_aperture(10.0, 40.0).unwrap(),
    ];
    let mut k = MockKernel::new();
    for p in &profiles {
        k.make_face(p).unwrap();
    }
    assert_eq!(k.count("make_face"), profiles.len());
}

proptest! {
    #[test]
    fn racetracks_are_closed_and_sized(h in 1.0f64..50.0, extra in 0.0f64..50.0) {
        let w = h + extra;
        let p = make_racetrack_aperture(h, w).unwrap();
        prop_assert!(p.validate().is_ok());
        let b = p.bounds();
        prop_assert!((b.width() - w).abs() < 1e-6);
        prop_assert!((b.height() - h).abs() < 1e-6);
    }

    #[test]
    fn blended_arcs_are_symmetric_about_their_axis(
        inner in 5.0f64..30.0,
        thickness in 1.5f64..5.0,
        span in 30.0f64..120.0,
    ) {
        let p = make_arc_aperture(inner, inner + thickness, span, 0.5).unwrap();
        prop_assert!(p.validate().is_ok());
        let b = p.bounds();
        prop_assert!(b.centre().v.abs() < 1e-6);
        prop_assert!(b.min.h > 0.0);
        prop_assert!(b.max.h <= inner + thickness + 0.5);
    }

    #[test]
    fn octagons_fit_their_box(
        h in 5.0f64..50.0,
        w in 5.0f64..50.0,
        side_frac in 0.1f64..0.9,
        tb_frac in 0.1f64..0.9,
    ) {
        let p = make_octagonal_aperture(h, w, h * side_frac, w * tb_frac).unwrap();
        let b = p.bounds();
        prop_assert!((b.width() - w).abs() < 1e-9);
        prop_assert!((b.height() - h).abs() < 1e-9);
        prop_assert!(p.signed_area().abs() < h * w);
    }
}
