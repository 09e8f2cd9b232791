use std::path::Path;

use image::io::Reader;
use image::{DynamicImage, GenericImageView};

use skeleton::{DecodeError, DecodedImage, ImageDecoder};

/// Decodes whatever the `image` crate can read. 8-bit images with 1 to 4 channels are kept as
/// they are; anything else is converted to RGBA8.
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        let io_error = |e: std::io::Error| DecodeError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let image = Reader::open(path)
            .map_err(io_error)?
            .with_guessed_format()
            .map_err(io_error)?
            .decode()
            .map_err(|e| DecodeError::Format { path: path.to_path_buf(), reason: e.to_string() })?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty { path: path.to_path_buf(), width, height });
        }

        let (pixels, channels) = match image {
            DynamicImage::ImageLuma8(buf) => (buf.into_raw(), 1),
            DynamicImage::ImageLumaA8(buf) => (buf.into_raw(), 2),
            DynamicImage::ImageRgb8(buf) => (buf.into_raw(), 3),
            DynamicImage::ImageRgba8(buf) => (buf.into_raw(), 4),
            other => (other.into_rgba8().into_raw(), 4),
        };

        Ok(DecodedImage { pixels, width, height, channels })
    }
}
