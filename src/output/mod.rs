mod format;
mod json;

pub use format::{save_sprite_image, sprite_png_filenames};
pub use json::{INDEX_FILENAME, write_index};
