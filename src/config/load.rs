use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::{AtlasConfig, CONFIG_VERSION};
use crate::error::SpriteError;

/// A loaded configuration file with its associated directory.
///
/// Local sprite paths in the config are relative to the config file
/// location, so we need to track where the config was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: AtlasConfig,
    /// The directory containing the config file
    pub config_dir: PathBuf,
}

impl LoadedConfig {
    /// Load and validate a config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: AtlasConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        validate(&config)
            .with_context(|| format!("invalid config file: {}", path.display()))?;

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self { config, config_dir })
    }

    /// Resolve the sprite URL.
    ///
    /// Remote URLs and absolute paths are returned as-is; relative local
    /// paths are joined onto the config file directory.
    pub fn resolve_url(&self) -> String {
        resolve_url(&self.config.url, &self.config_dir)
    }
}

/// Reject settings the loader cannot work with
pub fn validate(config: &AtlasConfig) -> Result<(), SpriteError> {
    if config.version != CONFIG_VERSION {
        return Err(SpriteError::InvalidConfig(format!(
            "unsupported config version {}, expected {}",
            config.version, CONFIG_VERSION
        )));
    }
    if !(config.pixel_ratio.is_finite() && config.pixel_ratio > 0.0) {
        return Err(SpriteError::InvalidConfig(format!(
            "pixel_ratio must be positive, got {}",
            config.pixel_ratio
        )));
    }
    if config.decode_threads == 0 {
        return Err(SpriteError::InvalidConfig(
            "decode_threads must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn resolve_url(url: &str, base: &Path) -> String {
    if url.is_empty() || url.contains("://") || Path::new(url).is_absolute() {
        url.to_string()
    } else {
        base.join(url).to_string_lossy().into_owned()
    }
}
