use std::num::NonZeroU32;
use std::sync::Arc;

use crate::foundation::error::{HatError, HatResult};

/// Rotation applied per iteration, in degrees.
pub const ROTATE_DEGREES_PER_ITERATION: f64 = 10.0;
/// Raw translate factor applied per iteration (before compositor damping).
pub const TRANSLATE_PER_ITERATION: f64 = 0.6;
/// Damping the compositor applies to the raw translate factor.
pub const TRANSLATE_DAMPING: f64 = 0.3;

/// Opaque encoded raster bytes (PNG or JPEG).
///
/// Cloning is cheap; stages never mutate a buffer they were handed and produce a new one instead.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBuffer(Arc<[u8]>);

impl ImageBuffer {
    /// Wrap encoded bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    /// Borrow the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Copy the encoded bytes into an owned vector (for transports that need ownership).
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no bytes are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raster format sniffed from the magic bytes, if recognizable.
    pub fn format(&self) -> Option<image::ImageFormat> {
        image::guess_format(&self.0).ok()
    }
}

impl std::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("len", &self.0.len())
            .field("format", &self.format())
            .finish()
    }
}

impl From<Vec<u8>> for ImageBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Pixel dimensions of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Create a validated, non-empty size.
    pub fn new(width: u32, height: u32) -> HatResult<Self> {
        if width == 0 || height == 0 {
            return Err(HatError::validation("image size must be non-zero"));
        }
        Ok(Self { width, height })
    }
}

/// Hat graphic plus where it came from.
///
/// Fetched once per orchestration and shared by every hop.
#[derive(Clone, Debug)]
pub struct HatAsset {
    /// Catalog style the hat was filed under, if known.
    pub style: Option<String>,
    /// Where the bytes were fetched from, if known.
    pub source_url: Option<String>,
    /// Encoded hat image (usually PNG with alpha).
    pub image: ImageBuffer,
}

impl HatAsset {
    /// Build an asset from bare bytes with no catalog metadata.
    pub fn from_image(image: ImageBuffer) -> Self {
        Self {
            style: None,
            source_url: None,
            image,
        }
    }
}

/// Pixel-space bounding box of a detected face.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FaceRect {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    /// Width in pixels, > 0.
    pub width: f64,
    /// Height in pixels, > 0.
    pub height: f64,
}

impl FaceRect {
    /// Create a validated rectangle.
    ///
    /// Returns `None` when the box is empty or non-finite, which callers treat as "no face".
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        let finite = [x, y, width, height].iter().all(|v| v.is_finite());
        if !finite || width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }
}

/// Per-iteration transform parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformKnobs {
    /// 1-based iteration index; the orchestrator counts down from the hat count to 1.
    pub iteration: u32,
    /// Raw horizontal translate factor (`iteration * 0.6`).
    pub translate_factor: f64,
    /// Hat rotation in degrees (`iteration * 10`).
    pub rotate_degrees: f64,
}

impl TransformKnobs {
    /// Derive the knobs for iteration `i` (clamped to at least 1).
    pub fn for_iteration(i: u32) -> Self {
        let i = i.max(1);
        Self {
            iteration: i,
            translate_factor: f64::from(i) * TRANSLATE_PER_ITERATION,
            rotate_degrees: f64::from(i) * ROTATE_DEGREES_PER_ITERATION,
        }
    }

    /// Effective horizontal shift factor after compositor damping (`iteration * 0.18`).
    pub fn horizontal_shift(self) -> f64 {
        self.translate_factor * TRANSLATE_DAMPING
    }
}

/// Number of hats to apply, always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct HatCount(NonZeroU32);

impl HatCount {
    /// A single hat.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a validated count.
    pub fn new(n: u32) -> HatResult<Self> {
        NonZeroU32::new(n)
            .map(Self)
            .ok_or_else(|| HatError::validation("hat count must be >= 1"))
    }

    /// Normalize a raw client-supplied count (query string, form field).
    ///
    /// Absent or blank input means one hat.
    pub fn parse(raw: Option<&str>) -> HatResult<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::ONE);
        };
        let n: u32 = raw
            .parse()
            .map_err(|_| HatError::validation(format!("hat count '{raw}' is not an integer")))?;
        Self::new(n)
    }

    /// Count as a plain integer.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for HatCount {
    fn default() -> Self {
        Self::ONE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
