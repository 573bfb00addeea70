use image::RgbaImage;

/// A decoded sprite: pixel data plus the density it was authored for.
///
/// Never mutated once built; the store replaces entries wholesale so that
/// readers holding an `Arc<StyleImage>` always see a complete image.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleImage {
    /// RGBA pixel data
    pub image: RgbaImage,
    /// Logical scale factor (1.0 for standard, 2.0 for @2x assets)
    pub pixel_ratio: f32,
    /// Whether the image is a signed distance field (recolorable icon)
    pub sdf: bool,
}

impl StyleImage {
    pub fn new(image: RgbaImage, pixel_ratio: f32) -> Self {
        Self {
            image,
            pixel_ratio,
            sdf: false,
        }
    }

    pub fn with_sdf(mut self, sdf: bool) -> Self {
        self.sdf = sdf;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Two images are interchangeable in an atlas slot iff their pixel
    /// buffers have the same size. The pixel ratio is not compared.
    pub fn is_dimension_compatible(&self, other: &StyleImage) -> bool {
        self.dimensions() == other.dimensions()
    }
}
