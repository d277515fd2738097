//! Face detection backends.
//!
//! Every backend speaks its own coordinate convention; adapters normalize to a pixel-space
//! [`FaceRect`]. When a provider lists several faces the first one wins, which is not necessarily
//! the largest or most central face.

use std::time::Duration;

use crate::foundation::core::{FaceRect, ImageBuffer};
use crate::foundation::error::{HatError, HatResult};
use crate::transform::{
    CLOUD_VISION_VERTICAL_OFFSET_RATIO, Calibration, PIXEL_BOX_VERTICAL_OFFSET_RATIO,
};

/// Ratio-box cloud vision adapter.
pub mod cloud_vision;
/// Local inference sidecar adapter.
pub mod local_infer;
/// Pixel-rectangle face API adapter.
pub mod rect_api;

pub use cloud_vision::CloudVisionLocator;
pub use local_infer::LocalInferenceLocator;
pub use rect_api::RectApiLocator;

/// Contract shared by all face detection backends.
#[async_trait::async_trait]
pub trait FaceLocator: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> LocatorKind;

    /// Placement calibration matching this backend's boxes.
    fn calibration(&self) -> Calibration;

    /// Find one face in `image`, `Ok(None)` when the provider reports no face.
    async fn locate(&self, image: &ImageBuffer) -> HatResult<Option<FaceRect>>;
}

/// Selectable detection backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    /// Ratio bounding boxes (fractions of the image size).
    CloudVision,
    /// Pixel rectangles (`left/top/width/height`).
    RectApi,
    /// Local inference sidecar (`_x/_y/_width/_height`).
    LocalInference,
}

impl LocatorKind {
    /// Vertical offset ratio calibrated for this backend's boxes.
    pub fn default_calibration(self) -> Calibration {
        let vertical_offset_ratio = match self {
            Self::CloudVision => CLOUD_VISION_VERTICAL_OFFSET_RATIO,
            Self::RectApi | Self::LocalInference => PIXEL_BOX_VERTICAL_OFFSET_RATIO,
        };
        Calibration {
            vertical_offset_ratio,
        }
    }
}

impl std::str::FromStr for LocatorKind {
    type Err = HatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cloud_vision" | "rekognition" => Ok(Self::CloudVision),
            "rect_api" | "azure" => Ok(Self::RectApi),
            "local_inference" | "local" => Ok(Self::LocalInference),
            other => Err(HatError::validation(format!(
                "unknown detector kind '{other}'"
            ))),
        }
    }
}

/// Deployment settings for the face detection backend.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Backend to use.
    pub kind: LocatorKind,
    /// Detection endpoint URL.
    pub endpoint: String,
    /// API key sent to hosted backends.
    pub api_key: Option<String>,
    /// Fixed pixel scale for ratio boxes; when unset the image's own dimensions are used.
    pub ratio_scale: Option<f64>,
    /// Override for the backend's vertical offset ratio.
    pub vertical_offset_ratio: Option<f64>,
    /// Request timeout for one detection call, in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            kind: LocatorKind::LocalInference,
            endpoint: "http://127.0.0.1:8501/detect".to_string(),
            api_key: None,
            ratio_scale: None,
            vertical_offset_ratio: None,
            timeout_ms: None,
        }
    }
}

impl DetectorSettings {
    /// Calibration after applying the configured override.
    pub fn calibration(&self) -> Calibration {
        match self.vertical_offset_ratio {
            Some(vertical_offset_ratio) => Calibration {
                vertical_offset_ratio,
            },
            None => self.kind.default_calibration(),
        }
    }

    /// Reject settings no backend could work with.
    pub fn validate(&self) -> HatResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(HatError::validation("detector endpoint must be set"));
        }
        if let Some(scale) = self.ratio_scale
            && !(scale.is_finite() && scale > 0.0)
        {
            return Err(HatError::validation("detector ratio_scale must be > 0"));
        }
        if let Some(ratio) = self.vertical_offset_ratio
            && !ratio.is_finite()
        {
            return Err(HatError::validation(
                "detector vertical_offset_ratio must be finite",
            ));
        }
        Ok(())
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Build the configured backend.
pub fn create_locator(
    settings: &DetectorSettings,
    client: reqwest::Client,
) -> HatResult<Box<dyn FaceLocator>> {
    settings.validate()?;
    let locator: Box<dyn FaceLocator> = match settings.kind {
        LocatorKind::CloudVision => Box::new(CloudVisionLocator::new(client, settings.clone())),
        LocatorKind::RectApi => Box::new(RectApiLocator::new(client, settings.clone())),
        LocatorKind::LocalInference => {
            Box::new(LocalInferenceLocator::new(client, settings.clone()))
        }
    };
    tracing::debug!(kind = ?settings.kind, endpoint = %settings.endpoint, "face locator ready");
    Ok(locator)
}

/// POST the raw image bytes and return the response body.
///
/// Transport errors and non-success statuses are reported as [`HatError::BackendUnavailable`].
pub(crate) async fn post_image(
    request: reqwest::RequestBuilder,
    image: &ImageBuffer,
    settings: &DetectorSettings,
) -> HatResult<Vec<u8>> {
    let mut request = request
        .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
        .body(image.to_vec());
    if let Some(timeout) = settings.timeout() {
        request = request.timeout(timeout);
    }

    let response = request.send().await.map_err(|e| {
        HatError::backend(format!(
            "face detector '{}' unreachable: {e}",
            settings.endpoint
        ))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HatError::backend(format!(
            "face detector '{}' answered {status}: {}",
            settings.endpoint,
            body.trim()
        )));
    }

    let bytes = response.bytes().await.map_err(|e| {
        HatError::backend(format!(
            "read face detector '{}' response: {e}",
            settings.endpoint
        ))
    })?;
    Ok(bytes.to_vec())
}

/// Parse a detector JSON body, reporting shape mismatches as backend failures.
pub(crate) fn parse_detector_json<T: serde::de::DeserializeOwned>(
    body: &[u8],
    kind: LocatorKind,
) -> HatResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| HatError::backend(format!("unexpected {kind:?} detector response: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/locate/mod.rs"]
mod tests;
