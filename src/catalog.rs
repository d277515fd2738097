//! Hat asset lookup.
//!
//! The catalog is an external collaborator; [`ManifestCatalog`] is a read-only rendition over a
//! JSON manifest of approved entries, fetching bytes over HTTP(S) or from local paths.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{HatAsset, ImageBuffer};
use crate::foundation::error::{HatError, HatResult};

/// Which hat the client asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StyleRequest {
    /// No style given: any approved hat.
    Any,
    /// A named style (trimmed, lower-cased).
    Named(String),
}

impl StyleRequest {
    /// Normalize raw client input; absent or blank means [`StyleRequest::Any`].
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(style) => Self::Named(style.to_lowercase()),
            None => Self::Any,
        }
    }
}

/// One catalog row.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HatEntry {
    /// Style name the hat is filed under.
    pub description: String,
    /// Where the hat image lives (URL or path).
    pub url: String,
    /// Only approved entries are served.
    #[serde(default)]
    pub approve: bool,
}

/// Lookup contract used by the request service.
#[async_trait::async_trait]
pub trait HatCatalog: Send + Sync {
    /// Approved entries, in catalog order.
    async fn list(&self) -> HatResult<Vec<HatEntry>>;

    /// Fetch one hat for `style`.
    ///
    /// An unknown style is [`HatError::InvalidStyle`]; several matches are chosen between at random.
    /// A catalog that cannot serve any hat is [`HatError::BackendUnavailable`].
    async fn lookup(&self, style: &StyleRequest) -> HatResult<HatAsset>;
}

/// Catalog read from a manifest of [`HatEntry`] rows.
pub struct ManifestCatalog {
    entries: Vec<HatEntry>,
    base_dir: PathBuf,
    client: reqwest::Client,
}

impl ManifestCatalog {
    /// Build from in-memory entries; relative paths resolve against `base_dir`.
    pub fn new(entries: Vec<HatEntry>, base_dir: impl Into<PathBuf>, client: reqwest::Client) -> Self {
        Self {
            entries,
            base_dir: base_dir.into(),
            client,
        }
    }

    /// Load a JSON array of entries; relative paths resolve against the manifest's directory.
    pub fn from_json_file(path: &Path, client: reqwest::Client) -> HatResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read hat manifest '{}'", path.display()))?;
        let entries: Vec<HatEntry> = serde_json::from_str(&text)
            .with_context(|| format!("parse hat manifest '{}'", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        Ok(Self::new(entries, base_dir, client))
    }

    fn approved(&self) -> impl Iterator<Item = &HatEntry> {
        self.entries.iter().filter(|e| e.approve)
    }

    /// Approved entries matching `style`.
    pub fn candidates(&self, style: &StyleRequest) -> Vec<&HatEntry> {
        match style {
            StyleRequest::Any => self.approved().collect(),
            StyleRequest::Named(name) => self
                .approved()
                .filter(|e| e.description.to_lowercase() == *name)
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl HatCatalog for ManifestCatalog {
    async fn list(&self) -> HatResult<Vec<HatEntry>> {
        Ok(self.approved().cloned().collect())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn lookup(&self, style: &StyleRequest) -> HatResult<HatAsset> {
        let candidates = self.candidates(style);
        if candidates.is_empty() {
            return Err(match style {
                StyleRequest::Named(name) => HatError::invalid_style(format!(
                    "hat style '{name}' does not exist; if you want this style, try submitting it"
                )),
                StyleRequest::Any => HatError::backend("hat catalog has no approved hats"),
            });
        }

        let entry = candidates[fastrand::usize(..candidates.len())];
        tracing::info!(style = %entry.description, url = %entry.url, "selected hat");
        let image = fetch_image(&self.client, &entry.url, &self.base_dir).await?;
        Ok(HatAsset {
            style: Some(entry.description.clone()),
            source_url: Some(entry.url.clone()),
            image,
        })
    }
}

/// Download `location` over HTTP(S), or read it from disk (relative to `base_dir`).
///
/// Any failure to produce the bytes is the catalog's problem, reported as
/// [`HatError::BackendUnavailable`].
pub async fn fetch_image(
    client: &reqwest::Client,
    location: &str,
    base_dir: &Path,
) -> HatResult<ImageBuffer> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let response = client
            .get(location)
            .send()
            .await
            .map_err(|e| HatError::backend(format!("download '{location}': {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(HatError::backend(format!(
                "download '{location}' answered {status}"
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| HatError::backend(format!("read '{location}': {e}")))?;
        return Ok(ImageBuffer::new(bytes.to_vec()));
    }

    let path = location.strip_prefix("file://").unwrap_or(location);
    let path = base_dir.join(path);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| HatError::backend(format!("read image '{}': {e}", path.display())))?;
    Ok(ImageBuffer::new(bytes))
}

#[cfg(test)]
#[path = "../tests/unit/catalog.rs"]
mod tests;
