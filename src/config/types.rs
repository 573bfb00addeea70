use serde::{Deserialize, Serialize};

/// The only config file version this build understands
pub const CONFIG_VERSION: u32 = 1;

/// Sprite loader configuration file structure.
///
/// A relative local `url` is resolved against the config file location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtlasConfig {
    /// Config file version, must equal [`CONFIG_VERSION`]
    pub version: u32,
    /// Sprite base URL, without the `.json`/`.png` suffix. Empty means no sprite.
    pub url: String,
    /// Screen density used to pick the sprite variant (>1 selects @2x)
    pub pixel_ratio: f32,
    /// Threads in the decode pool
    pub decode_threads: usize,
    /// Give up waiting for a load after this many seconds
    pub timeout_secs: u64,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            url: String::new(),
            pixel_ratio: 1.0,
            decode_threads: 1,
            timeout_secs: 30,
        }
    }
}
