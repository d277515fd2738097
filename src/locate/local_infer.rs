use crate::foundation::core::{FaceRect, ImageBuffer};
use crate::foundation::error::HatResult;
use crate::locate::{DetectorSettings, FaceLocator, LocatorKind, parse_detector_json, post_image};
use crate::transform::Calibration;

/// Detector running next to the service (single-face inference sidecar).
///
/// The sidecar answers with one detection object, or `null` when nothing was found.
pub struct LocalInferenceLocator {
    client: reqwest::Client,
    settings: DetectorSettings,
}

impl LocalInferenceLocator {
    /// Create an adapter for `settings.endpoint`.
    pub fn new(client: reqwest::Client, settings: DetectorSettings) -> Self {
        Self { client, settings }
    }
}

/// Detection object with the model's internal field names.
#[derive(Debug, serde::Deserialize)]
pub struct LocalDetection {
    /// Face box.
    #[serde(rename = "_box")]
    pub bbox: LocalBox,
    /// Model score, informational only.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
}

/// Face box in pixels, underscore-prefixed fields.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct LocalBox {
    /// Left edge.
    #[serde(rename = "_x")]
    pub x: f64,
    /// Top edge.
    #[serde(rename = "_y")]
    pub y: f64,
    /// Width.
    #[serde(rename = "_width")]
    pub width: f64,
    /// Height.
    #[serde(rename = "_height")]
    pub height: f64,
}

/// Rename the sidecar's box fields onto the shared contract.
pub fn normalize_local_detection(det: Option<&LocalDetection>) -> Option<FaceRect> {
    let b = det?.bbox;
    FaceRect::new(b.x, b.y, b.width, b.height)
}

#[async_trait::async_trait]
impl FaceLocator for LocalInferenceLocator {
    fn kind(&self) -> LocatorKind {
        LocatorKind::LocalInference
    }

    fn calibration(&self) -> Calibration {
        self.settings.calibration()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(bytes = image.len()))]
    async fn locate(&self, image: &ImageBuffer) -> HatResult<Option<FaceRect>> {
        let request = self.client.post(&self.settings.endpoint);
        let body = post_image(request, image, &self.settings).await?;
        let det: Option<LocalDetection> = parse_detector_json(&body, self.kind())?;

        let face = normalize_local_detection(det.as_ref());
        tracing::debug!(score = ?det.as_ref().and_then(|d| d.score), face = ?face, "local detection");
        Ok(face)
    }
}
