/// Listing photo module
///
/// This module handles:
/// - Talking to the remote photo service (client.rs)
/// - Fetching and caching table thumbnails on a bounded pool (thumbnail.rs)
/// - Loading every photo of one listing for the detail view (gallery.rs)

pub mod client;
pub mod gallery;
pub mod thumbnail;

use iced::widget::image::Handle;
use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};

use client::FetchError;

/// Shown while a thumbnail is still downloading
pub const PENDING_COLOR: [u8; 3] = [211, 211, 211];

/// Cached when a photo could not be fetched or decoded
pub const FAILED_COLOR: [u8; 3] = [128, 128, 128];

/// A decoded photo ready for display
#[derive(Debug, Clone)]
pub struct Photo {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
    /// True for the solid-color stand-ins
    pub is_placeholder: bool,
}

impl Photo {
    fn from_rgba(image: RgbaImage, is_placeholder: bool) -> Self {
        let (width, height) = image.dimensions();
        Self {
            handle: Handle::from_rgba(width, height, image.into_raw()),
            width,
            height,
            is_placeholder,
        }
    }

    /// Solid-color square placeholder
    pub fn placeholder(size: u32, color: [u8; 3]) -> Self {
        let [r, g, b] = color;
        let image = ImageBuffer::from_pixel(size, size, Rgba([r, g, b, 255]));
        Self::from_rgba(image, true)
    }

    /// Decode a raster image body, scaling it down to fit inside `max`×`max`
    pub fn decode(bytes: &[u8], max: u32) -> Result<Self, FetchError> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_image(fit_within(image, max)))
    }

    fn from_image(image: DynamicImage) -> Self {
        Self::from_rgba(image.to_rgba8(), false)
    }
}

/// Shrink an image to fit a square box, keeping its aspect ratio.
/// Images already inside the box are left alone.
fn fit_within(image: DynamicImage, max: u32) -> DynamicImage {
    if image.width() > max || image.height() > max {
        image.thumbnail(max, max)
    } else {
        image
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    /// PNG-encoded solid image for fake photo responses
    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200])));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }
}
