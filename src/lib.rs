pub mod atlas;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod sprite;
pub mod storage;
#[cfg(test)]
mod test_log;

pub use atlas::{AtlasObserver, DecodeWorker, ImageStore, Images, SpriteAtlas};
pub use cli::{CliArgs, Command, CommonArgs};
pub use error::{DecodeError, SpriteError};
pub use sprite::{DecodedImages, SpriteDecoder, SpriteSheetDecoder, StyleImage};
pub use storage::{FetchHandle, FileSource, LocalFileSource, Resource, Response};
