//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\playdeck\config.toml
//! - macOS: ~/Library/Application Support/playdeck/config.toml
//! - Linux: ~/.config/playdeck/config.toml
//!
//! Every key is optional; missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cursor and queue synchronization
    pub sync: SyncConfig,

    /// Artwork prefetching
    pub prefetch: PrefetchConfig,

    /// Collection paging
    pub pagination: PaginationConfig,

    /// Catalog service
    pub catalog: CatalogConfig,
}

/// Cursor/queue synchronization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Time for a programmatic scroll to settle before input is accepted again
    pub settle_delay_ms: u64,

    /// Distance from a whole slot that still counts as settled
    pub slot_epsilon: f64,

    /// Minimum horizontal fling velocity that skips tracks
    pub swipe_min_velocity: f64,

    /// Minimum time between two fling skips
    pub swipe_cooldown_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 200,
            slot_epsilon: crate::sync::SLOT_EPSILON,
            swipe_min_velocity: 200.0,
            swipe_cooldown_ms: 500,
        }
    }
}

impl SyncConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn swipe_cooldown(&self) -> Duration {
        Duration::from_millis(self.swipe_cooldown_ms)
    }
}

/// Artwork prefetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Slots on each side of the center that keep artwork loaded
    pub window_radius: usize,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            window_radius: crate::assets::DEFAULT_WINDOW_RADIUS,
        }
    }
}

/// Collection paging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Distance from the end of the list that triggers the next page
    pub load_more_threshold: f64,

    /// Scroll offset past which the header title is shown in the toolbar
    pub header_title_threshold: f64,

    /// Tracks requested per page
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            load_more_threshold: crate::pagination::DEFAULT_LOAD_MORE_THRESHOLD,
            header_title_threshold: crate::pagination::DEFAULT_HEADER_TITLE_THRESHOLD,
            page_size: 100,
        }
    }
}

/// Catalog service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root URL of the catalog HTTP API
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api".to_string(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playdeck"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to a specific file
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

/// Save configuration on the blocking pool
pub async fn save_async(config: Config) -> Result<(), ConfigError> {
    tokio::task::spawn_blocking(move || save(&config))
        .await
        .map_err(|e| ConfigError::TaskJoin(e.to_string()))?
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

// ============================================================================
// Tests
// ============================================================================
