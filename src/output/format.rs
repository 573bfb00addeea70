use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::Result;
use image::ImageFormat;

use crate::cli::CompressionLevel;
use crate::error::SpriteError;
use crate::sprite::StyleImage;

/// Save a sprite as PNG, optionally with compression
pub fn save_sprite_image(
    sprite: &StyleImage,
    path: &Path,
    compress: Option<CompressionLevel>,
) -> Result<()> {
    // Encode to PNG in memory
    let mut png_data = Cursor::new(Vec::new());
    sprite
        .image
        .write_to(&mut png_data, ImageFormat::Png)
        .map_err(|e| SpriteError::ImageSave {
            path: path.to_path_buf(),
            source: e,
        })?;

    let output_data = if let Some(level) = compress {
        let opts = match level {
            CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
            CompressionLevel::Max => oxipng::Options::max_compression(),
        };
        oxipng::optimize_from_memory(&png_data.into_inner(), &opts).map_err(|e| {
            SpriteError::PngCompress {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?
    } else {
        png_data.into_inner()
    };

    fs::write(path, output_data).map_err(|e| SpriteError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// File name stem for a sprite id. Ids may contain path separators or
/// other characters that are not safe in a single path component.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Assign every sprite id its own PNG file name.
///
/// Ids are visited in sorted order so the result is stable across runs.
/// When two ids sanitize to the same name (`icons/bus` and `icons_bus`), or
/// to names differing only in case, the later one gets a numeric suffix.
pub fn sprite_png_filenames<'a, I>(ids: I) -> BTreeMap<&'a str, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ids: Vec<&str> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let mut taken = HashSet::new();
    let mut filenames = BTreeMap::new();
    for id in ids {
        let stem = sanitize_id(id);
        let mut filename = format!("{}.png", stem);
        let mut n = 2;
        while !taken.insert(filename.to_lowercase()) {
            filename = format!("{}-{}.png", stem, n);
            n += 1;
        }
        filenames.insert(id, filename);
    }
    filenames
}
