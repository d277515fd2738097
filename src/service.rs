//! Request handling in front of the orchestrator.
//!
//! Normalizes client input, resolves the face and the hat, then runs every hop with the same
//! hat asset.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{HatCatalog, HatEntry, StyleRequest, fetch_image};
use crate::composite::Compositor;
use crate::foundation::core::{HatCount, ImageBuffer};
use crate::foundation::error::{HatError, HatResult};
use crate::orchestrate::{CompositeResult, Orchestrator};

/// Where the face photo comes from.
#[derive(Clone, Debug)]
pub enum FaceInput {
    /// Bytes uploaded with the request.
    Upload(ImageBuffer),
    /// The configured stand-in face.
    Default,
}

/// One client request, as received.
#[derive(Clone, Debug)]
pub struct HatRequest {
    /// Face photo.
    pub face: FaceInput,
    /// Requested hat style; absent means any approved hat.
    pub style: Option<String>,
    /// Requested hat count, unparsed; absent means one hat.
    pub count: Option<String>,
}

/// Hat service: catalog plus compositor.
pub struct HatService {
    catalog: Arc<dyn HatCatalog>,
    compositor: Arc<dyn Compositor>,
    client: reqwest::Client,
    default_face_url: String,
    hop_timeout: Option<Duration>,
}

impl HatService {
    /// Build a service.
    pub fn new(
        catalog: Arc<dyn HatCatalog>,
        compositor: Arc<dyn Compositor>,
        client: reqwest::Client,
        default_face_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            compositor,
            client,
            default_face_url: default_face_url.into(),
            hop_timeout: None,
        }
    }

    /// Per-hop deadline for every run.
    pub fn with_hop_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.hop_timeout = timeout;
        self
    }

    /// Approved catalog entries.
    pub async fn list_hats(&self) -> HatResult<Vec<HatEntry>> {
        self.catalog.list().await
    }

    /// Validate `req`, then put the hats on.
    #[tracing::instrument(level = "info", skip_all, fields(style = ?req.style, count = ?req.count))]
    pub async fn handle(&self, req: HatRequest) -> HatResult<CompositeResult> {
        let count = HatCount::parse(req.count.as_deref())?;
        let style = StyleRequest::from_raw(req.style.as_deref());

        let face = match req.face {
            FaceInput::Upload(bytes) if bytes.is_empty() => {
                return Err(HatError::malformed("uploaded face image is empty"));
            }
            FaceInput::Upload(bytes) => bytes,
            FaceInput::Default => {
                tracing::debug!(url = %self.default_face_url, "using default face");
                fetch_image(&self.client, &self.default_face_url, std::path::Path::new(".")).await?
            }
        };

        let hat = self.catalog.lookup(&style).await?;
        Orchestrator::new(self.compositor.as_ref())
            .with_hop_timeout(self.hop_timeout)
            .apply_hats(face, &hat, count)
            .await
    }
}

#[cfg(test)]
#[path = "../tests/unit/service.rs"]
mod tests;
