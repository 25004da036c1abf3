//! Catalog HTTP client
//!
//! Fetches collections from the catalog service. Continuations are passed
//! back as a query parameter; the service decides the page boundaries.

use std::path::PathBuf;

use async_trait::async_trait;

use super::dto::CollectionResponse;
use super::{CatalogApi, CatalogError, CollectionKind, CollectionPage};

/// Catalog service client
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
    page_size: usize,
}

impl CatalogClient {
    /// Create a client for the given service root.
    pub fn new(base_url: impl Into<String>, page_size: usize) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size,
        }
    }

    /// Build the request URL for a collection page.
    fn collection_url(&self, kind: CollectionKind, id: &str, page_token: Option<&str>) -> String {
        let mut url = format!(
            "{}/{}/{}?limit={}",
            self.base_url,
            kind.path_segment(),
            urlencoding::encode(id),
            self.page_size
        );
        if let Some(token) = page_token {
            url.push_str("&continuation=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn fetch_collection(
        &self,
        kind: CollectionKind,
        id: &str,
        page_token: Option<&str>,
    ) -> Result<CollectionPage, CatalogError> {
        let url = self.collection_url(kind, id, page_token);
        tracing::debug!("Fetching {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        let body = response
            .json::<CollectionResponse>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(body.into_page(kind))
    }
}

/// Catalog backed by a JSON file on disk.
///
/// The file holds a single [`CollectionResponse`]; every request returns it,
/// so it only ever yields one page.
pub struct FixtureCatalog {
    path: PathBuf,
}

impl FixtureCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogApi for FixtureCatalog {
    async fn fetch_collection(
        &self,
        kind: CollectionKind,
        _id: &str,
        _page_token: Option<&str>,
    ) -> Result<CollectionPage, CatalogError> {
        let path = self.path.clone();
        let contents = tokio::task::spawn_blocking(move || std::fs::read_to_string(path))
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?
            .map_err(|e| CatalogError::NotFound(format!("{}: {}", self.path.display(), e)))?;

        let mut response: CollectionResponse =
            serde_json::from_str(&contents).map_err(|e| CatalogError::Parse(e.to_string()))?;
        response.continuation = None;
        Ok(response.into_page(kind))
    }
}
