//! Artwork fetching.

use async_trait::async_trait;

use super::AssetError;
use super::resolution::AssetTarget;

/// Downloaded artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAsset {
    /// URL that actually answered (may be a fallback)
    pub url: String,
    /// Image bytes
    pub data: Vec<u8>,
    /// MIME type reported by the server
    pub mime_type: String,
}

/// Fetches a single artwork URL.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<LoadedAsset, AssetError>;
}

/// Try the primary URL, then each fallback. First success wins.
///
/// Returns `None` once the chain is exhausted; the slot keeps its
/// placeholder.
pub async fn load_with_fallbacks(
    loader: &dyn AssetLoader,
    target: &AssetTarget,
) -> Option<LoadedAsset> {
    for url in target.urls() {
        match loader.fetch(url).await {
            Ok(asset) => return Some(asset),
            Err(e) => tracing::trace!("Artwork {} failed: {}", url, e),
        }
    }
    tracing::debug!("No artwork variant loaded for {}", target.primary);
    None
}

/// Artwork loader over HTTP.
pub struct HttpAssetLoader {
    http_client: reqwest::Client,
}

impl HttpAssetLoader {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpAssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn fetch(&self, url: &str) -> Result<LoadedAsset, AssetError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AssetError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            return Err(AssetError::Status(status.as_u16()));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let data = response
            .bytes()
            .await
            .map_err(|e| AssetError::Network(e.to_string()))?
            .to_vec();

        Ok(LoadedAsset {
            url: url.to_string(),
            data,
            mime_type,
        })
    }
}
