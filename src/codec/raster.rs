use std::io::Cursor;

use crate::foundation::core::{ImageBuffer, ImageSize};
use crate::foundation::error::{HatError, HatResult};

/// Decoded RGBA8 raster with premultiplied alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PremulImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl PremulImage {
    /// Fully transparent image of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    /// Size of this image.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Premultiplied pixel at `(x, y)`; out-of-bounds reads are transparent.
    pub fn pixel(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return [0, 0, 0, 0];
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Resample to exactly `width` x `height` (no aspect-ratio preservation).
    ///
    /// Filtering premultiplied channels independently is exact, so no unpremultiply round trip.
    pub fn resize_exact(&self, width: u32, height: u32) -> HatResult<Self> {
        if width == 0 || height == 0 {
            return Err(HatError::validation("resize target must be non-zero"));
        }
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let src = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| HatError::validation("premultiplied buffer does not match its size"))?;
        let resized =
            image::imageops::resize(&src, width, height, image::imageops::FilterType::Triangle);
        Ok(Self {
            width,
            height,
            data: resized.into_raw(),
        })
    }
}

/// Read the pixel dimensions from the image header without decoding pixels.
pub fn image_dimensions(buf: &ImageBuffer) -> HatResult<ImageSize> {
    let (width, height) = image::ImageReader::new(Cursor::new(buf.as_bytes()))
        .with_guessed_format()
        .map_err(|e| HatError::malformed(format!("read image header: {e}")))?
        .into_dimensions()
        .map_err(|e| HatError::malformed(format!("read image dimensions: {e}")))?;
    ImageSize::new(width, height).map_err(|_| HatError::malformed("image has zero area"))
}

/// Decode any supported raster into premultiplied RGBA8.
pub fn decode_premul(buf: &ImageBuffer) -> HatResult<PremulImage> {
    let dyn_img = image::load_from_memory(buf.as_bytes())
        .map_err(|e| HatError::malformed(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(HatError::malformed("image has zero area"));
    }

    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);

    Ok(PremulImage {
        width,
        height,
        data,
    })
}

/// Encode a premultiplied image as PNG (straight alpha on disk).
pub fn encode_png(img: &PremulImage) -> HatResult<ImageBuffer> {
    let mut straight = img.data.clone();
    unpremultiply_rgba8_in_place(&mut straight);
    let rgba = image::RgbaImage::from_raw(img.width, img.height, straight)
        .ok_or_else(|| HatError::validation("premultiplied buffer does not match its size"))?;

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| HatError::Other(anyhow::Error::new(e).context("encode png")))?;
    Ok(ImageBuffer::new(out))
}

/// Multiply colour channels by alpha.
pub fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Inverse of [`premultiply_rgba8_in_place`] (lossy for low alpha).
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/raster.rs"]
mod tests;
