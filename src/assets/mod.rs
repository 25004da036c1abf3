//! Artwork loading for the carousel.
//!
//! - [`resolution`]: URL variants and fallback chains
//! - [`loader`]: the fetch seam and the fallback walk
//! - [`window`]: which slots around the cursor hold loaded artwork

mod loader;
pub mod resolution;
mod window;

pub use loader::{AssetLoader, HttpAssetLoader, LoadedAsset, load_with_fallbacks};
pub use resolution::AssetTarget;
pub use window::{AssetRef, LoadRequest, Priority, WindowedPrefetcher};

/// Slots on each side of the center that keep artwork loaded.
pub const DEFAULT_WINDOW_RADIUS: usize = 5;

/// Artwork fetch errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Asset not found: {0}")]
    NotFound(String),
}
