use crate::foundation::core::{FaceRect, ImageBuffer};
use crate::foundation::error::HatResult;
use crate::locate::{DetectorSettings, FaceLocator, LocatorKind, parse_detector_json, post_image};
use crate::transform::Calibration;

/// Header carrying the subscription key for rectangle-API services.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Detector answering with pixel rectangles.
pub struct RectApiLocator {
    client: reqwest::Client,
    settings: DetectorSettings,
}

impl RectApiLocator {
    /// Create an adapter for `settings.endpoint`.
    pub fn new(client: reqwest::Client, settings: DetectorSettings) -> Self {
        Self { client, settings }
    }
}

/// One entry of the `[{"faceRectangle": {...}}]` response.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectDetection {
    /// Pixel box.
    pub face_rectangle: PixelRect,
}

/// Pixel rectangle as reported by the service.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct PixelRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// Map the first rectangle onto the shared contract.
pub fn normalize_rect_response(resp: &[RectDetection]) -> Option<FaceRect> {
    let r = resp.first()?.face_rectangle;
    FaceRect::new(r.left, r.top, r.width, r.height)
}

#[async_trait::async_trait]
impl FaceLocator for RectApiLocator {
    fn kind(&self) -> LocatorKind {
        LocatorKind::RectApi
    }

    fn calibration(&self) -> Calibration {
        self.settings.calibration()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(bytes = image.len()))]
    async fn locate(&self, image: &ImageBuffer) -> HatResult<Option<FaceRect>> {
        let mut request = self.client.post(&self.settings.endpoint);
        if let Some(key) = &self.settings.api_key {
            request = request.header(SUBSCRIPTION_KEY_HEADER, key);
        }
        let body = post_image(request, image, &self.settings).await?;
        let resp: Vec<RectDetection> = parse_detector_json(&body, self.kind())?;

        let face = normalize_rect_response(&resp);
        tracing::debug!(detections = resp.len(), face = ?face, "rect api detection");
        Ok(face)
    }
}
