//! Decoding of embedded slide media into raw RGB samples.

use slidepdf_core::{Error, Result};

/// Points per pixel at the conventional 96 DPI screen resolution.
pub const POINTS_PER_PIXEL: f64 = 0.75;

/// 8-bit RGB pixels ready to embed as a PDF image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl DecodedImage {
    /// Size in points at 96 DPI.
    pub fn natural_size(&self) -> (f64, f64) {
        (
            self.width as f64 * POINTS_PER_PIXEL,
            self.height as f64 * POINTS_PER_PIXEL,
        )
    }
}

/// Decode PNG, JPEG, GIF, or BMP bytes. Transparent pixels are flattened
/// onto white.
pub fn decode_image(data: &[u8]) -> Result<DecodedImage> {
    if data.is_empty() {
        return Err(Error::ImageError("no image data".to_string()));
    }

    let decoded = image::load_from_memory(data).map_err(|e| Error::ImageError(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::ImageError("image has no pixels".to_string()));
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend([over_white(r, a), over_white(g, a), over_white(b, a)]);
    }

    Ok(DecodedImage { width, height, rgb })
}

fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u32, alpha as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}
