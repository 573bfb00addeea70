use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::atlas::Images;
use crate::error::SpriteError;
use crate::output::sprite_png_filenames;

/// Name of the index written next to extracted sprites
pub const INDEX_FILENAME: &str = "sprites.json";

#[derive(Serialize)]
struct JsonOutput {
    meta: Meta,
    sprites: Vec<JsonSprite>,
}

#[derive(Serialize)]
struct Meta {
    app: &'static str,
    version: &'static str,
    format: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSprite {
    name: String,
    image: String,
    width: u32,
    height: u32,
    pixel_ratio: f32,
    sdf: bool,
}

/// Write the index describing every extracted sprite, sorted by id
pub fn write_index(images: &Images, output_dir: &Path) -> Result<()> {
    let filenames = sprite_png_filenames(images.keys().map(String::as_str));
    let mut sprites: Vec<JsonSprite> = images
        .iter()
        .map(|(id, sprite)| JsonSprite {
            name: id.clone(),
            image: filenames[id.as_str()].clone(),
            width: sprite.width(),
            height: sprite.height(),
            pixel_ratio: sprite.pixel_ratio,
            sdf: sprite.sdf,
        })
        .collect();
    sprites.sort_by(|a, b| a.name.cmp(&b.name));

    let output = JsonOutput {
        meta: Meta {
            app: "sprite-atlas",
            version: env!("CARGO_PKG_VERSION"),
            format: "rgba8888",
        },
        sprites,
    };

    let json_path = output_dir.join(INDEX_FILENAME);
    let content = serde_json::to_string_pretty(&output)?;

    fs::write(&json_path, content).map_err(|e| SpriteError::OutputWrite {
        path: json_path,
        source: e,
    })?;

    Ok(())
}
