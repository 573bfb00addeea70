/// Which half of a sprite a request fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    SpriteJson,
    SpriteImage,
}

/// Descriptor handed to a [`FileSource`](super::FileSource)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub url: String,
}

impl Resource {
    /// Sprite index document, e.g. `sprite@2x.json` for high-density screens
    pub fn sprite_json(base_url: &str, pixel_ratio: f32) -> Self {
        Self {
            kind: ResourceKind::SpriteJson,
            url: format!("{}{}.json", base_url, density_suffix(pixel_ratio)),
        }
    }

    /// Sprite sheet image, e.g. `sprite@2x.png` for high-density screens
    pub fn sprite_image(base_url: &str, pixel_ratio: f32) -> Self {
        Self {
            kind: ResourceKind::SpriteImage,
            url: format!("{}{}.png", base_url, density_suffix(pixel_ratio)),
        }
    }
}

fn density_suffix(pixel_ratio: f32) -> &'static str {
    if pixel_ratio > 1.0 { "@2x" } else { "" }
}
