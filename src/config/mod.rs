mod load;
mod save;
mod types;

pub use load::{LoadedConfig, validate};
pub use save::save_config;
pub use types::{AtlasConfig, CONFIG_VERSION};
