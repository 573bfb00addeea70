use std::collections::HashMap;

use image::{RgbaImage, imageops};
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use super::StyleImage;
use crate::error::DecodeError;

/// Largest width or height accepted for a single sprite
const MAX_SPRITE_DIMENSION: u32 = 1024;

/// Images produced by one decode, keyed by sprite id
pub type DecodedImages = HashMap<String, StyleImage>;

/// Turns a metadata buffer and an image buffer into named images.
///
/// Implementations must be stateless: the loader calls `decode` from a
/// worker thread and relies on it touching nothing but its arguments.
/// Decoding two empty buffers must succeed with an empty set.
pub trait SpriteDecoder: Send + Sync {
    fn decode(&self, metadata: &[u8], image: &[u8]) -> Result<DecodedImages, DecodeError>;
}

impl<F> SpriteDecoder for F
where
    F: Fn(&[u8], &[u8]) -> Result<DecodedImages, DecodeError> + Send + Sync,
{
    fn decode(&self, metadata: &[u8], image: &[u8]) -> Result<DecodedImages, DecodeError> {
        self(metadata, image)
    }
}

/// One entry of a sprite index document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpriteEntry {
    #[serde(default)]
    x: u32,
    #[serde(default)]
    y: u32,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    pixel_ratio: Option<f32>,
    #[serde(default)]
    sdf: bool,
}

/// Decoder for the JSON index + PNG sheet sprite format.
///
/// Entries without an explicit `pixelRatio` get the ratio the decoder
/// was created with.
#[derive(Debug, Clone, Copy)]
pub struct SpriteSheetDecoder {
    pixel_ratio: f32,
}

impl SpriteSheetDecoder {
    pub fn new(pixel_ratio: f32) -> Self {
        Self { pixel_ratio }
    }
}

impl Default for SpriteSheetDecoder {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SpriteDecoder for SpriteSheetDecoder {
    fn decode(&self, metadata: &[u8], sheet_png: &[u8]) -> Result<DecodedImages, DecodeError> {
        if metadata.is_empty() && sheet_png.is_empty() {
            return Ok(DecodedImages::new());
        }

        let sheet = image::load_from_memory(sheet_png)?.into_rgba8();

        let document: Value = serde_json::from_slice(metadata)?;
        let Value::Object(entries) = document else {
            return Err(DecodeError::InvalidRoot);
        };

        let mut images = DecodedImages::with_capacity(entries.len());
        for (id, value) in entries {
            let entry = match SpriteEntry::deserialize(&value) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping sprite '{}': {}", id, e);
                    continue;
                }
            };
            if let Some(image) = self.cut(&sheet, &id, &entry) {
                images.insert(id, image);
            }
        }

        Ok(images)
    }
}

impl SpriteSheetDecoder {
    fn cut(&self, sheet: &RgbaImage, id: &str, entry: &SpriteEntry) -> Option<StyleImage> {
        let pixel_ratio = entry.pixel_ratio.unwrap_or(self.pixel_ratio);

        let valid_size = entry.width > 0
            && entry.height > 0
            && entry.width <= MAX_SPRITE_DIMENSION
            && entry.height <= MAX_SPRITE_DIMENSION;
        let fits = u64::from(entry.x) + u64::from(entry.width) <= u64::from(sheet.width())
            && u64::from(entry.y) + u64::from(entry.height) <= u64::from(sheet.height());
        let valid_ratio = pixel_ratio.is_finite() && pixel_ratio > 0.0;

        if !(valid_size && fits && valid_ratio) {
            warn!("Can't create sprite '{}' with invalid metrics", id);
            return None;
        }

        let pixels = imageops::crop_imm(sheet, entry.x, entry.y, entry.width, entry.height).to_image();
        Some(StyleImage::new(pixels, pixel_ratio).with_sdf(entry.sdf))
    }
}
