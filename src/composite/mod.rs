//! One compositing hop: find the face, place the hat, blend, encode.

use std::sync::{Arc, Mutex};

use crate::codec::raster::{PremulImage, decode_premul, encode_png, image_dimensions};
use crate::foundation::core::{FaceRect, HatAsset, ImageBuffer, ImageSize, TransformKnobs};
use crate::foundation::error::{HatError, HatResult};
use crate::hop::wire::HopResponse;
use crate::locate::FaceLocator;
use crate::transform::{HatPlacement, compute_transform};

/// Source-over blending with opacities.
pub mod blend;
/// Canvas-expanding rotation.
pub mod rotate;

use blend::{BlendOpts, composite_at};
use rotate::rotate_expand;

/// A single compositing call, local or remote.
#[async_trait::async_trait]
pub trait Compositor: Send + Sync {
    /// Put `hat` on the face found in `face` using `knobs`, returning the encoded hop response.
    async fn composite(
        &self,
        face: ImageBuffer,
        hat: &HatAsset,
        knobs: TransformKnobs,
    ) -> HatResult<HopResponse>;
}

/// Largest face box accepted, as a multiple of the photo's size on each axis.
pub const MAX_FACE_TO_PHOTO_RATIO: f64 = 4.0;

/// In-process compositor backed by a face locator.
pub struct LocalCompositor {
    locator: Box<dyn FaceLocator>,
    blend: BlendOpts,
    // Every hop of a run carries the same hat; keep the last one decoded.
    hat_cache: Mutex<Option<(ImageBuffer, Arc<PremulImage>)>>,
}

impl LocalCompositor {
    /// Composite with the default opacities (source 0.9, destination 1.0).
    pub fn new(locator: Box<dyn FaceLocator>) -> Self {
        Self::with_blend(locator, BlendOpts::default())
    }

    /// Composite with explicit opacities.
    pub fn with_blend(locator: Box<dyn FaceLocator>, blend: BlendOpts) -> Self {
        Self {
            locator,
            blend,
            hat_cache: Mutex::new(None),
        }
    }

    /// Run one hop and return the bare PNG.
    pub async fn composite_png(
        &self,
        face: ImageBuffer,
        hat: &HatAsset,
        knobs: TransformKnobs,
    ) -> HatResult<ImageBuffer> {
        // Header reads only; undecodable uploads fail before the detector is called.
        let photo_size = image_dimensions(&face)?;
        let hat_size = image_dimensions(&hat.image)?;

        let rect = self.locator.locate(&face).await?.ok_or_else(|| {
            HatError::no_face(format!(
                "{:?} detector found no face in the {}x{} image",
                self.locator.kind(),
                photo_size.width,
                photo_size.height
            ))
        })?;
        check_face_rect(rect, photo_size)?;

        let placement = compute_transform(rect, knobs, hat_size, self.locator.calibration());
        tracing::debug!(
            iteration = knobs.iteration,
            face = ?rect,
            placement = ?placement,
            "hat placement"
        );

        let cached = self.cached_hat(&hat.image);
        let hat_bytes = hat.image.clone();
        let blend = self.blend;
        let (png, hat_img) = tokio::task::spawn_blocking(move || {
            let photo = decode_premul(&face)?;
            let hat_img = match cached {
                Some(img) => img,
                None => Arc::new(decode_premul(&hat_bytes)?),
            };
            let canvas = overlay_hat(photo, &hat_img, &placement, blend)?;
            Ok::<_, HatError>((encode_png(&canvas)?, hat_img))
        })
        .await
        .map_err(|e| HatError::Other(anyhow::Error::new(e).context("compositing task failed")))??;

        self.store_hat(&hat.image, hat_img);
        Ok(png)
    }

    /// Decoded hat from an earlier hop, when `image` is the same hat.
    pub(crate) fn cached_hat(&self, image: &ImageBuffer) -> Option<Arc<PremulImage>> {
        let slot = self.hat_cache.lock().ok()?;
        slot.as_ref()
            .filter(|(bytes, _)| bytes == image)
            .map(|(_, img)| Arc::clone(img))
    }

    fn store_hat(&self, image: &ImageBuffer, decoded: Arc<PremulImage>) {
        if let Ok(mut slot) = self.hat_cache.lock() {
            *slot = Some((image.clone(), decoded));
        }
    }
}

/// Reject detector boxes that miss the photo or dwarf it.
pub fn check_face_rect(rect: FaceRect, photo: ImageSize) -> HatResult<()> {
    let (w, h) = (f64::from(photo.width), f64::from(photo.height));
    let overlaps =
        rect.x < w && rect.y < h && rect.x + rect.width > 0.0 && rect.y + rect.height > 0.0;
    if !overlaps {
        return Err(HatError::no_face(format!(
            "detector box {rect:?} lies outside the {}x{} photo",
            photo.width, photo.height
        )));
    }
    if rect.width > w * MAX_FACE_TO_PHOTO_RATIO || rect.height > h * MAX_FACE_TO_PHOTO_RATIO {
        return Err(HatError::no_face(format!(
            "detector box {rect:?} is far larger than the {}x{} photo",
            photo.width, photo.height
        )));
    }
    Ok(())
}

#[async_trait::async_trait]
impl Compositor for LocalCompositor {
    #[tracing::instrument(level = "debug", skip_all, fields(iteration = knobs.iteration))]
    async fn composite(
        &self,
        face: ImageBuffer,
        hat: &HatAsset,
        knobs: TransformKnobs,
    ) -> HatResult<HopResponse> {
        let png = self.composite_png(face, hat, knobs).await?;
        Ok(HopResponse::from_png(&png))
    }
}

/// Resize, rotate and blend the hat onto the photo.
///
/// The rotated hat keeps the centre the unrotated hat would have had at `placement`; the result
/// has the photo's size.
pub fn overlay_hat(
    mut photo: PremulImage,
    hat: &PremulImage,
    placement: &HatPlacement,
    blend: BlendOpts,
) -> HatResult<PremulImage> {
    let (w, h) = placement.pixel_size();
    let limit = |side: u32| f64::from(side) * MAX_FACE_TO_PHOTO_RATIO;
    if f64::from(w) > limit(photo.width) || f64::from(h) > limit(photo.height) {
        return Err(HatError::validation(format!(
            "hat of {w}x{h} is too large for the {}x{} photo",
            photo.width, photo.height
        )));
    }
    let sized = hat.resize_exact(w, h)?;
    let rotated = rotate_expand(&sized, placement.rotation_deg);

    let grow_x = f64::from(rotated.width) - f64::from(sized.width);
    let grow_y = f64::from(rotated.height) - f64::from(sized.height);
    let left = (placement.x - grow_x / 2.0).round() as i64;
    let top = (placement.y - grow_y / 2.0).round() as i64;

    composite_at(&mut photo, &rotated, left, top, blend);
    Ok(photo)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/mod.rs"]
mod tests;
