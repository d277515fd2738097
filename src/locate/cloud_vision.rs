use crate::codec::raster::image_dimensions;
use crate::foundation::core::{FaceRect, ImageBuffer, ImageSize};
use crate::foundation::error::HatResult;
use crate::locate::{DetectorSettings, FaceLocator, LocatorKind, parse_detector_json, post_image};
use crate::transform::Calibration;

/// Detector answering with ratio boxes (fractions of the image width/height).
pub struct CloudVisionLocator {
    client: reqwest::Client,
    settings: DetectorSettings,
}

impl CloudVisionLocator {
    /// Create an adapter for `settings.endpoint`.
    pub fn new(client: reqwest::Client, settings: DetectorSettings) -> Self {
        Self { client, settings }
    }
}

/// Response body: `{"FaceDetails": [{"BoundingBox": {...}, "Confidence": ..}]}`.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudVisionResponse {
    /// Detections in provider order.
    #[serde(default)]
    pub face_details: Vec<CloudFaceDetail>,
}

/// One detection.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloudFaceDetail {
    /// Ratio box.
    pub bounding_box: RatioBox,
    /// Provider confidence (0–100), informational only.
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Bounding box as fractions of the image size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatioBox {
    /// Left edge, fraction of width.
    pub left: f64,
    /// Top edge, fraction of height.
    pub top: f64,
    /// Width, fraction of width.
    pub width: f64,
    /// Height, fraction of height.
    pub height: f64,
}

/// Pixel scale applied to ratio boxes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RatioScale {
    /// Multiply each axis by the image's own size.
    Image(ImageSize),
    /// Multiply both axes by one fixed constant.
    Fixed(f64),
}

/// Convert the first ratio box into pixel space.
pub fn normalize_ratio_response(resp: &CloudVisionResponse, scale: RatioScale) -> Option<FaceRect> {
    let b = resp.face_details.first()?.bounding_box;
    let (sx, sy) = match scale {
        RatioScale::Image(size) => (f64::from(size.width), f64::from(size.height)),
        RatioScale::Fixed(k) => (k, k),
    };
    FaceRect::new(b.left * sx, b.top * sy, b.width * sx, b.height * sy)
}

#[async_trait::async_trait]
impl FaceLocator for CloudVisionLocator {
    fn kind(&self) -> LocatorKind {
        LocatorKind::CloudVision
    }

    fn calibration(&self) -> Calibration {
        self.settings.calibration()
    }

    #[tracing::instrument(level = "debug", skip_all, fields(bytes = image.len()))]
    async fn locate(&self, image: &ImageBuffer) -> HatResult<Option<FaceRect>> {
        let scale = match self.settings.ratio_scale {
            Some(k) => RatioScale::Fixed(k),
            None => RatioScale::Image(image_dimensions(image)?),
        };

        let mut request = self.client.post(&self.settings.endpoint);
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }
        let body = post_image(request, image, &self.settings).await?;
        let resp: CloudVisionResponse = parse_detector_json(&body, self.kind())?;

        let face = normalize_ratio_response(&resp, scale);
        tracing::debug!(
            detections = resp.face_details.len(),
            confidence = ?resp.face_details.first().and_then(|d| d.confidence),
            face = ?face,
            "cloud vision detection"
        );
        Ok(face)
    }
}
