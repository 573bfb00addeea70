use std::path::PathBuf;
use thiserror::Error;

/// Failure of the external decode step
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode sprite image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Sprite JSON root must be an object")]
    InvalidRoot,
}

#[derive(Error, Debug)]
pub enum SpriteError {
    /// A fetch failed; the transport message is kept verbatim
    #[error("{0}")]
    Transport(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Failed to start decode workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to save image '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to compress PNG '{path}': {message}")]
    PngCompress { path: PathBuf, message: String },

    #[error("Sprite did not finish loading within {0} seconds")]
    Timeout(u64),
}
