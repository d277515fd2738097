use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn knobs_follow_iteration_index() {
    for i in [1u32, 5, 10] {
        let k = TransformKnobs::for_iteration(i);
        assert_eq!(k.iteration, i);
        assert!(approx(k.rotate_degrees, f64::from(i) * 10.0));
        assert!(approx(k.translate_factor, f64::from(i) * 0.6));
        assert!(approx(k.horizontal_shift(), f64::from(i) * 0.18));
    }
}

#[test]
fn knobs_clamp_iteration_zero_to_one() {
    assert_eq!(TransformKnobs::for_iteration(0), TransformKnobs::for_iteration(1));
}

#[test]
fn face_rect_rejects_empty_boxes() {
    assert!(FaceRect::new(0.0, 0.0, 10.0, 10.0).is_some());
    assert!(FaceRect::new(0.0, 0.0, 0.0, 10.0).is_none());
    assert!(FaceRect::new(0.0, 0.0, 10.0, -1.0).is_none());
    assert!(FaceRect::new(f64::INFINITY, 0.0, 10.0, 10.0).is_none());
}

#[test]
fn hat_count_parse_defaults_and_rejects() {
    assert_eq!(HatCount::parse(None).unwrap().get(), 1);
    assert_eq!(HatCount::parse(Some("  ")).unwrap().get(), 1);
    assert_eq!(HatCount::parse(Some("3")).unwrap().get(), 3);
    assert!(HatCount::parse(Some("0")).is_err());
    assert!(HatCount::parse(Some("two")).is_err());
    assert!(HatCount::parse(Some("-2")).is_err());
}

#[test]
fn image_buffer_sniffs_png() {
    let png = [0x89u8, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let buf = ImageBuffer::new(png.to_vec());
    assert_eq!(buf.format(), Some(image::ImageFormat::Png));
    assert_eq!(buf.len(), 8);
    assert!(ImageBuffer::new(Vec::new()).is_empty());
}

#[test]
fn image_size_must_be_non_zero() {
    assert!(ImageSize::new(0, 4).is_err());
    assert_eq!(ImageSize::new(3, 4).unwrap().width, 3);
}
