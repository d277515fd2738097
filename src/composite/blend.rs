use crate::codec::raster::PremulImage;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Opacities applied to each side of a source-over composite.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlendOpts {
    /// Multiplier on the overlay (hat). Slightly below 1 so hair shows through the hat's edges.
    pub source_opacity: f32,
    /// Multiplier on the photo underneath.
    pub dest_opacity: f32,
}

impl Default for BlendOpts {
    fn default() -> Self {
        Self {
            source_opacity: 0.9,
            dest_opacity: 1.0,
        }
    }
}

/// Porter-Duff source-over of `src` scaled by `opacity` onto `dst`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Scale every channel of a premultiplied pixel.
pub fn fade(px: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity >= 1.0 {
        return px;
    }
    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    px.map(|c| mul_div255(u16::from(c), op))
}

/// Composite `src` onto `dst` with its top-left corner at `(left, top)`.
///
/// Parts of `src` that fall outside `dst` are clipped; `dst` keeps its size.
pub fn composite_at(dst: &mut PremulImage, src: &PremulImage, left: i64, top: i64, opts: BlendOpts) {
    if opts.dest_opacity < 1.0 {
        for px in dst.data.chunks_exact_mut(4) {
            let out = fade([px[0], px[1], px[2], px[3]], opts.dest_opacity);
            px.copy_from_slice(&out);
        }
    }

    let dst_w = i64::from(dst.width);
    let dst_h = i64::from(dst.height);
    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = (left + i64::from(src.width)).min(dst_w);
    let y1 = (top + i64::from(src.height)).min(dst_h);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for y in y0..y1 {
        for x in x0..x1 {
            let s = src.pixel(x - left, y - top);
            if s[3] == 0 {
                continue;
            }
            let idx = ((y as usize) * (dst.width as usize) + (x as usize)) * 4;
            let d = [
                dst.data[idx],
                dst.data[idx + 1],
                dst.data[idx + 2],
                dst.data[idx + 3],
            ];
            let out = over(d, s, opts.source_opacity);
            dst.data[idx..idx + 4].copy_from_slice(&out);
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
