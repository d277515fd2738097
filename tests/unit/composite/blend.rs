use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> PremulImage {
    PremulImage {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
    }
}

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn default_source_opacity_lets_photo_show_through() {
    let dst = [0, 0, 255, 255];
    let src = [255, 0, 0, 255];
    let out = over(dst, src, BlendOpts::default().source_opacity);
    assert_eq!(out[3], 255);
    assert!(out[0] > 200);
    assert!(out[2] > 0 && out[2] < 40);
}

#[test]
fn fade_full_opacity_is_identity() {
    assert_eq!(fade([10, 20, 30, 40], 1.0), [10, 20, 30, 40]);
    assert_eq!(fade([10, 20, 30, 40], 0.0), [0, 0, 0, 0]);
}

#[test]
fn composite_at_clips_negative_offsets() {
    let mut dst = solid(4, 4, [0, 0, 0, 255]);
    let src = solid(2, 2, [255, 255, 255, 255]);
    let opts = BlendOpts {
        source_opacity: 1.0,
        dest_opacity: 1.0,
    };
    composite_at(&mut dst, &src, -1, -1, opts);

    assert_eq!(dst.pixel(0, 0), [255, 255, 255, 255]);
    assert_eq!(dst.pixel(1, 0), [0, 0, 0, 255]);
    assert_eq!(dst.pixel(0, 1), [0, 0, 0, 255]);
    assert_eq!((dst.width, dst.height), (4, 4));
}

#[test]
fn composite_at_fully_outside_is_noop() {
    let mut dst = solid(3, 3, [5, 5, 5, 255]);
    let before = dst.clone();
    composite_at(
        &mut dst,
        &solid(2, 2, [255, 0, 0, 255]),
        10,
        -20,
        BlendOpts::default(),
    );
    assert_eq!(dst, before);
}

#[test]
fn composite_at_places_inside() {
    let mut dst = solid(5, 5, [0, 0, 0, 255]);
    let src = solid(1, 1, [0, 255, 0, 255]);
    composite_at(
        &mut dst,
        &src,
        3,
        2,
        BlendOpts {
            source_opacity: 1.0,
            dest_opacity: 1.0,
        },
    );
    assert_eq!(dst.pixel(3, 2), [0, 255, 0, 255]);
    assert_eq!(dst.pixel(2, 2), [0, 0, 0, 255]);
}
