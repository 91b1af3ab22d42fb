//! Bounded-size preview thumbnails for the review list.

use std::path::Path;

use image::ImageError;

/// Largest edge of a review thumbnail, in pixels.
pub const THUMBNAIL_SIZE: u32 = 100;

/// A small decoded preview of an image, RGBA8 pixel data.
#[derive(Debug, Clone, Default)]
pub struct Thumbnail {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Thumbnail {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Decodes `path` and scales it down to fit within `max_dim` on the longest
/// edge, preserving aspect ratio. Images already smaller than the bound are
/// kept at their native size.
pub fn render_thumbnail(path: &Path, max_dim: u32) -> Result<Thumbnail, ImageError> {
    let img = image::open(path)?;
    let thumb = img.thumbnail(max_dim, max_dim);
    let rgba = thumb.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Thumbnail {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
