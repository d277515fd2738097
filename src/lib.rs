//! Hatme puts hats on faces, and can stack several of them.
//!
//! A run takes a face photo, one hat image and a hat count `n`. It performs `n` strictly
//! sequential compositing hops. Each hop detects the face again on the previous hop's output and
//! places the hat with a little more rotation and horizontal shift than the hop after it, so the
//! hats fan out into a stack.
//!
//! # Pipeline overview
//!
//! 1. **Locate**: `ImageBuffer -> FaceRect` via a pluggable [`FaceLocator`] backend
//! 2. **Place**: `FaceRect + TransformKnobs -> HatPlacement` ([`compute_transform`])
//! 3. **Composite**: resize, rotate and blend the hat, then encode a PNG ([`Compositor`])
//! 4. **Orchestrate**: run hops `n..=1` and return the terminal hop's body ([`Orchestrator`])
//!
//! Hops run either in-process ([`LocalCompositor`]) or against a remote compositor over HTTP
//! ([`HttpCompositor`]). Both speak the same `{"finalBaby": "<data URI>"}` response shape.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod catalog;
mod codec;
mod composite;
mod config;
mod foundation;
mod hop;
mod locate;
mod orchestrate;
mod service;

/// Hat placement geometry.
pub mod transform;

pub use catalog::{HatCatalog, HatEntry, ManifestCatalog, StyleRequest, fetch_image};
pub use codec::data_uri::{PNG_DATA_URI_PREFIX, from_data_uri, to_png_data_uri};
pub use codec::raster::{
    PremulImage, decode_premul, encode_png, image_dimensions, premultiply_rgba8_in_place,
    unpremultiply_rgba8_in_place,
};
pub use composite::blend::{BlendOpts, PremulRgba8, composite_at, fade, over};
pub use composite::rotate::rotate_expand;
pub use composite::{
    Compositor, LocalCompositor, MAX_FACE_TO_PHOTO_RATIO, check_face_rect, overlay_hat,
};
pub use config::{
    DEFAULT_FACE_URL, ENV_DETECTOR_ENDPOINT, ENV_DETECTOR_KEY, ENV_DETECTOR_KIND,
    ENV_HOP_TIMEOUT_MS, ENV_MANIPULATE_ENDPOINT, HatmeConfig,
};
pub use foundation::core::{
    FaceRect, HatAsset, HatCount, ImageBuffer, ImageSize, ROTATE_DEGREES_PER_ITERATION,
    TRANSLATE_DAMPING, TRANSLATE_PER_ITERATION, TransformKnobs,
};
pub use foundation::error::{ErrorKind, ErrorPayload, HatError, HatResult};
pub use hop::client::{HttpCompositor, normalize_endpoint};
pub use hop::wire::{FACE_PART, FINAL_IMAGE_FIELD, HAT_PART, HopParams, HopResponse, error_from_body};
pub use locate::cloud_vision::{
    CloudFaceDetail, CloudVisionResponse, RatioBox, RatioScale, normalize_ratio_response,
};
pub use locate::local_infer::{LocalBox, LocalDetection, normalize_local_detection};
pub use locate::rect_api::{
    PixelRect, RectDetection, SUBSCRIPTION_KEY_HEADER, normalize_rect_response,
};
pub use locate::{
    CloudVisionLocator, DetectorSettings, FaceLocator, LocalInferenceLocator, LocatorKind,
    RectApiLocator, create_locator,
};
pub use orchestrate::{CompositeResult, HopState, Orchestrator};
pub use service::{FaceInput, HatRequest, HatService};
pub use transform::{Calibration, HatPlacement, compute_transform};
