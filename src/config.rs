//! Deployment configuration.
//!
//! Settings load from an optional JSON file, then environment variables override individual
//! fields. Everything is validated once, before any backend is built.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::composite::blend::BlendOpts;
use crate::composite::{Compositor, LocalCompositor};
use crate::foundation::error::{HatError, HatResult};
use crate::hop::client::HttpCompositor;
use crate::locate::{DetectorSettings, create_locator};

/// Stand-in face used when a request carries no upload.
pub const DEFAULT_FACE_URL: &str = "https://user-images.githubusercontent.com/69332964/128645143-86405a62-691b-4de9-8500-b9362675e1db.png";

/// Environment variable selecting the detector backend.
pub const ENV_DETECTOR_KIND: &str = "HATME_DETECTOR_KIND";
/// Environment variable overriding the detector endpoint.
pub const ENV_DETECTOR_ENDPOINT: &str = "HATME_DETECTOR_ENDPOINT";
/// Environment variable carrying the detector API key.
pub const ENV_DETECTOR_KEY: &str = "HATME_DETECTOR_KEY";
/// Environment variable pointing at a remote compositor.
pub const ENV_MANIPULATE_ENDPOINT: &str = "MANIPULATE_ENDPOINT";
/// Environment variable setting the per-hop deadline in milliseconds.
pub const ENV_HOP_TIMEOUT_MS: &str = "HATME_HOP_TIMEOUT_MS";

/// Top-level settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HatmeConfig {
    /// Face detection backend used by the in-process compositor.
    pub detector: DetectorSettings,
    /// Remote compositor; when set, hops are sent there instead of running in-process.
    pub manipulate_endpoint: Option<String>,
    /// Deadline for one hop, in milliseconds.
    pub hop_timeout_ms: Option<u64>,
    /// Face fetched when a request has no upload.
    pub default_face_url: String,
    /// Hat catalog manifest.
    pub catalog: Option<PathBuf>,
    /// Compositing opacities.
    pub blend: BlendOpts,
}

impl Default for HatmeConfig {
    fn default() -> Self {
        Self {
            detector: DetectorSettings::default(),
            manipulate_endpoint: None,
            hop_timeout_ms: None,
            default_face_url: DEFAULT_FACE_URL.to_string(),
            catalog: None,
            blend: BlendOpts::default(),
        }
    }
}

impl HatmeConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> HatResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg = serde_json::from_str(&text)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        Ok(cfg)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> HatResult<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; blank values are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> HatResult<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(kind) = get(ENV_DETECTOR_KIND) {
            self.detector.kind = kind.parse()?;
        }
        if let Some(endpoint) = get(ENV_DETECTOR_ENDPOINT) {
            self.detector.endpoint = endpoint;
        }
        if let Some(key) = get(ENV_DETECTOR_KEY) {
            self.detector.api_key = Some(key);
        }
        if let Some(endpoint) = get(ENV_MANIPULATE_ENDPOINT) {
            self.manipulate_endpoint = Some(endpoint);
        }
        if let Some(ms) = get(ENV_HOP_TIMEOUT_MS) {
            let ms = ms.trim().parse::<u64>().map_err(|_| {
                HatError::validation(format!("{ENV_HOP_TIMEOUT_MS} must be milliseconds, got '{ms}'"))
            })?;
            self.hop_timeout_ms = Some(ms);
        }
        Ok(())
    }

    /// Reject settings that cannot produce a working pipeline.
    pub fn validate(&self) -> HatResult<()> {
        self.detector.validate()?;
        for (name, v) in [
            ("blend.source_opacity", self.blend.source_opacity),
            ("blend.dest_opacity", self.blend.dest_opacity),
        ] {
            if !(v.is_finite() && (0.0..=1.0).contains(&v)) {
                return Err(HatError::validation(format!("{name} must be in [0, 1]")));
            }
        }
        if self.hop_timeout_ms == Some(0) {
            return Err(HatError::validation("hop_timeout_ms must be > 0"));
        }
        if self.default_face_url.trim().is_empty() {
            return Err(HatError::validation("default_face_url must be set"));
        }
        Ok(())
    }

    /// Per-hop deadline, if configured.
    pub fn hop_timeout(&self) -> Option<Duration> {
        self.hop_timeout_ms.map(Duration::from_millis)
    }

    /// Build the compositor this deployment uses.
    pub fn build_compositor(&self, client: reqwest::Client) -> HatResult<Arc<dyn Compositor>> {
        self.validate()?;
        match self.manipulate_endpoint.as_deref() {
            Some(endpoint) => {
                let remote = HttpCompositor::new(client, endpoint)?;
                tracing::info!(endpoint = remote.endpoint(), "using remote compositor");
                Ok(Arc::new(remote))
            }
            None => {
                let locator = create_locator(&self.detector, client)?;
                tracing::info!(detector = ?self.detector.kind, "using in-process compositor");
                Ok(Arc::new(LocalCompositor::with_blend(locator, self.blend)))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
