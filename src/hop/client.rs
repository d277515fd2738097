use std::time::Duration;

use crate::composite::Compositor;
use crate::foundation::core::{HatAsset, ImageBuffer, TransformKnobs};
use crate::foundation::error::{HatError, HatResult};
use crate::hop::wire::{FACE_PART, HAT_PART, HopParams, HopResponse, error_from_body};

/// Compositor reached over HTTP (`POST <endpoint>?translate=..&rotate=..`).
pub struct HttpCompositor {
    client: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpCompositor {
    /// Target `endpoint`; a bare `host:port` is treated as `http://host:port/manipulate`.
    pub fn new(client: reqwest::Client, endpoint: &str) -> HatResult<Self> {
        Ok(Self {
            client,
            endpoint: normalize_endpoint(endpoint)?,
            timeout: None,
        })
    }

    /// Per-request timeout applied by the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fully qualified endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(face: ImageBuffer, hat: &HatAsset) -> HatResult<reqwest::multipart::Form> {
        fn part(name: &str, bytes: Vec<u8>) -> HatResult<reqwest::multipart::Part> {
            reqwest::multipart::Part::bytes(bytes)
                .file_name(name.to_string())
                .mime_str("application/octet-stream")
                .map_err(|e| HatError::Other(anyhow::Error::new(e).context("build hop part")))
        }
        Ok(reqwest::multipart::Form::new()
            .part(FACE_PART, part(FACE_PART, face.to_vec())?)
            .part(HAT_PART, part(HAT_PART, hat.image.to_vec())?))
    }
}

/// Expand a `host[:port]` shorthand into a full `/manipulate` URL.
pub fn normalize_endpoint(endpoint: &str) -> HatResult<String> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(HatError::validation("compositor endpoint must be set"));
    }
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return Ok(endpoint.to_string());
    }
    Ok(format!("http://{}/manipulate", endpoint.trim_end_matches('/')))
}

#[async_trait::async_trait]
impl Compositor for HttpCompositor {
    #[tracing::instrument(level = "debug", skip_all, fields(iteration = knobs.iteration, endpoint = %self.endpoint))]
    async fn composite(
        &self,
        face: ImageBuffer,
        hat: &HatAsset,
        knobs: TransformKnobs,
    ) -> HatResult<HopResponse> {
        let params = HopParams::from(knobs);
        let mut request = self
            .client
            .post(&self.endpoint)
            .query(&params)
            .multipart(Self::form(face, hat)?);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(translate = params.translate, rotate = params.rotate, "POST hop");
        let response = request.send().await.map_err(|e| {
            HatError::backend(format!("compositor '{}' unreachable: {e}", self.endpoint))
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            HatError::backend(format!("read compositor '{}' response: {e}", self.endpoint))
        })?;
        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        let json: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            HatError::backend(format!("compositor '{}' sent non-JSON body: {e}", self.endpoint))
        })?;
        Ok(HopResponse::from_json(json))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/hop/client.rs"]
mod tests;
