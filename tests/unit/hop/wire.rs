use super::*;

#[test]
fn png_response_uses_final_baby_field() {
    let resp = HopResponse::from_png(&ImageBuffer::new(vec![1u8, 2, 3]));
    assert_eq!(
        resp.as_json()["finalBaby"],
        serde_json::json!("data:image/png;base64,AQID")
    );
    assert_eq!(resp.final_image().unwrap().as_bytes(), &[1, 2, 3]);
}

#[test]
fn bare_string_body_is_accepted() {
    let resp = HopResponse::from_json(serde_json::json!("data:image/png;base64,AQID"));
    assert_eq!(resp.final_image().unwrap().as_bytes(), &[1, 2, 3]);
}

#[test]
fn missing_field_is_malformed() {
    let resp = HopResponse::from_json(serde_json::json!({ "other": 1 }));
    assert!(matches!(resp.final_image(), Err(HatError::MalformedImage(_))));
    let resp = HopResponse::from_json(serde_json::json!(42));
    assert!(matches!(resp.final_image(), Err(HatError::MalformedImage(_))));
}

#[test]
fn params_from_knobs() {
    let p = HopParams::from(TransformKnobs::for_iteration(3));
    assert!((p.translate - 1.8).abs() < 1e-9);
    assert_eq!(p.rotate, 30.0);
}

#[test]
fn error_body_maps_to_taxonomy() {
    let body = serde_json::to_vec(&HatError::no_face("empty beach").payload()).unwrap();
    assert!(matches!(
        error_from_body(422, &body),
        HatError::NoFaceDetected(_)
    ));
    assert!(matches!(
        error_from_body(502, b"Bad Gateway"),
        HatError::BackendUnavailable(_)
    ));
}
