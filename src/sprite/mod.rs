mod decoder;
mod style_image;

pub use decoder::{DecodedImages, SpriteDecoder, SpriteSheetDecoder};
pub use style_image::StyleImage;
