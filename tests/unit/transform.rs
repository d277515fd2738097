use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn face() -> FaceRect {
    FaceRect::new(100.0, 50.0, 80.0, 80.0).unwrap()
}

fn hat_size() -> ImageSize {
    ImageSize::new(160, 40).unwrap()
}

#[test]
fn first_iteration_scenario() {
    let cal = Calibration::default();
    let p = compute_transform(face(), TransformKnobs::for_iteration(1), hat_size(), cal);
    assert!(approx(p.width, 80.0));
    assert!(approx(p.height, 80.0));
    assert!(approx(p.rotation_deg, 10.0));
    assert!(approx(p.x, 85.6));
    assert!(approx(p.y, 50.0 - 80.0 * cal.vertical_offset_ratio));
    assert!(approx(p.y, -14.0));
}

#[test]
fn pixel_box_calibration_lifts_higher() {
    let cal = Calibration {
        vertical_offset_ratio: PIXEL_BOX_VERTICAL_OFFSET_RATIO,
    };
    let p = compute_transform(face(), TransformKnobs::for_iteration(1), hat_size(), cal);
    assert!(approx(p.y, 50.0 - 96.0));
}

#[test]
fn drift_and_rotation_scale_with_iteration() {
    let cal = Calibration::default();
    for i in [1u32, 5, 10] {
        let p = compute_transform(face(), TransformKnobs::for_iteration(i), hat_size(), cal);
        assert!(approx(p.rotation_deg, f64::from(i) * 10.0));
        assert!(approx(p.x, 100.0 - 80.0 * f64::from(i) * 0.18));
    }
}

#[test]
fn is_deterministic() {
    let knobs = TransformKnobs::for_iteration(4);
    let a = compute_transform(face(), knobs, hat_size(), Calibration::default());
    let b = compute_transform(face(), knobs, hat_size(), Calibration::default());
    assert_eq!(a, b);
}

#[test]
fn reports_scale_against_native_size() {
    let p = compute_transform(
        face(),
        TransformKnobs::for_iteration(1),
        hat_size(),
        Calibration::default(),
    );
    assert!(approx(p.scale_x, 0.5));
    assert!(approx(p.scale_y, 2.0));
}

#[test]
fn pixel_size_rounds_and_never_hits_zero() {
    let mut p = compute_transform(
        face(),
        TransformKnobs::for_iteration(1),
        hat_size(),
        Calibration::default(),
    );
    p.width = 12.6;
    p.height = 0.2;
    assert_eq!(p.pixel_size(), (13, 1));
}
