//! Hat placement derived from face geometry.
//!
//! Pure functions only: no IO, no randomness.

use crate::foundation::core::{FaceRect, ImageSize, TransformKnobs};

/// Vertical offset (in face heights) for detectors reporting ratio boxes.
pub const CLOUD_VISION_VERTICAL_OFFSET_RATIO: f64 = 0.8;
/// Vertical offset (in face heights) for detectors reporting pixel boxes.
pub const PIXEL_BOX_VERTICAL_OFFSET_RATIO: f64 = 1.2;

/// Backend-specific placement calibration.
///
/// Detectors disagree on how tightly their boxes hug the forehead, so the lift that puts the hat
/// above the eyes is a per-backend constant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Calibration {
    /// Hat is lifted by `face.height * vertical_offset_ratio` above the face box top.
    pub vertical_offset_ratio: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            vertical_offset_ratio: CLOUD_VISION_VERTICAL_OFFSET_RATIO,
        }
    }
}

/// Where and how to draw the hat for one hop.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HatPlacement {
    /// Hat width after resize, equal to the face width.
    pub width: f64,
    /// Hat height after resize, equal to the face height.
    pub height: f64,
    /// Counter-clockwise rotation in degrees.
    pub rotation_deg: f64,
    /// Left edge of the unrotated hat on the photo.
    pub x: f64,
    /// Top edge of the unrotated hat on the photo.
    pub y: f64,
    /// Horizontal scale relative to the hat's native width.
    pub scale_x: f64,
    /// Vertical scale relative to the hat's native height.
    pub scale_y: f64,
}

impl HatPlacement {
    /// Integer resize target, at least one pixel per axis.
    pub fn pixel_size(&self) -> (u32, u32) {
        fn px(v: f64) -> u32 {
            v.round().clamp(1.0, f64::from(u32::MAX)) as u32
        }
        (px(self.width), px(self.height))
    }
}

/// Compute the hat placement for a face.
///
/// The hat is stretched to the face box, rotated by the knobs, shifted left by
/// `face.width * knobs.horizontal_shift()` and lifted by `face.height * vertical_offset_ratio`.
pub fn compute_transform(
    face: FaceRect,
    knobs: TransformKnobs,
    hat_native: ImageSize,
    calibration: Calibration,
) -> HatPlacement {
    HatPlacement {
        width: face.width,
        height: face.height,
        rotation_deg: knobs.rotate_degrees,
        x: face.x - face.width * knobs.horizontal_shift(),
        y: face.y - face.height * calibration.vertical_offset_ratio,
        scale_x: face.width / f64::from(hat_native.width.max(1)),
        scale_y: face.height / f64::from(hat_native.height.max(1)),
    }
}

#[cfg(test)]
#[path = "../tests/unit/transform.rs"]
mod tests;
