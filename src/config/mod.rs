pub mod settings;

pub use settings::{
    LatencyConfig, ServerConfig, SlizzConfig, DEFAULT_ASSET_PATH, DEFAULT_SHADER_SOURCE,
    DEFAULT_VERSION,
};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors for configuration file loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
}

// ============================================================================
// SBIO: I/O wrapper - thin layer over pure functions
// ============================================================================

/// Expand a leading `~` in a config path
pub fn expand_config_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}

/// Load and parse a configuration file from disk.
pub fn try_load_config(path: &Path) -> Result<SlizzConfig, ConfigError> {
    let path = expand_config_path(path);
    if !path.exists() {
        return Err(ConfigError::NotFound(path));
    }
    let content = std::fs::read_to_string(&path)?;
    let config = SlizzConfig::from_str(&content)?;
    Ok(config)
}

/// Load a configuration file, falling back to defaults on any failure.
pub fn load_config(path: &Path) -> SlizzConfig {
    match try_load_config(path) {
        Ok(config) => {
            info!("Configuration loaded successfully from {}", path.display());
            config
        }
        Err(ConfigError::NotFound(missing)) => {
            info!(
                "No configuration file found at {}. Using default settings.",
                missing.display()
            );
            SlizzConfig::default()
        }
        Err(e) => {
            warn!("Error loading configuration {}: {}", path.display(), e);
            SlizzConfig::default()
        }
    }
}
