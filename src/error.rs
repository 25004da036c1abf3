//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! - [`Error`]: Top-level error enum
//! - Module-specific errors ([`CatalogError`], [`PlayerError`], ...) for
//!   detailed handling

use crate::assets::AssetError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::player::PlayerError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog request failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Artwork fetch failed
    #[error("Artwork error: {0}")]
    Asset(#[from] AssetError),

    /// Playback engine error
    #[error("Playback error: {0}")]
    Playback(#[from] PlayerError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input the command line could not make sense of
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, CatalogError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Catalog(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, ConfigError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Config(e).context(ctx))
    }
}
