use crate::codec::raster::PremulImage;

/// Rotate counter-clockwise by `degrees`, growing the canvas to hold the rotated corners.
///
/// Pixels are bilinearly sampled; uncovered areas are transparent. The rotation pivots on the
/// image centre, which stays at the centre of the expanded canvas.
pub fn rotate_expand(img: &PremulImage, degrees: f64) -> PremulImage {
    let turn = degrees.rem_euclid(360.0);
    if turn.abs() < 1e-9 || (360.0 - turn).abs() < 1e-9 {
        return img.clone();
    }

    let (sin, cos) = turn.to_radians().sin_cos();
    let (w, h) = (f64::from(img.width), f64::from(img.height));
    let out_w = expanded_extent(w * cos.abs() + h * sin.abs());
    let out_h = expanded_extent(w * sin.abs() + h * cos.abs());

    let mut out = PremulImage::transparent(out_w, out_h);
    let (src_cx, src_cy) = (w / 2.0, h / 2.0);
    let (dst_cx, dst_cy) = (f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);

    for oy in 0..out_h {
        for ox in 0..out_w {
            let rx = f64::from(ox) + 0.5 - dst_cx;
            let ry = f64::from(oy) + 0.5 - dst_cy;
            // Inverse of the y-down counter-clockwise rotation.
            let sx = rx * cos - ry * sin + src_cx - 0.5;
            let sy = rx * sin + ry * cos + src_cy - 0.5;

            let px = sample_bilinear(img, sx, sy);
            let idx = ((oy as usize) * (out_w as usize) + (ox as usize)) * 4;
            out.data[idx..idx + 4].copy_from_slice(&px);
        }
    }
    out
}

fn expanded_extent(v: f64) -> u32 {
    (v - 1e-6).ceil().max(1.0) as u32
}

fn sample_bilinear(img: &PremulImage, x: f64, y: f64) -> [u8; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = img.pixel(x0, y0);
    let p10 = img.pixel(x0 + 1, y0);
    let p01 = img.pixel(x0, y0 + 1);
    let p11 = img.pixel(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
        let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/composite/rotate.rs"]
mod tests;
