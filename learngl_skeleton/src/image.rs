use std::path::Path;

use crate::error::DecodeError;

/// Pixels handed back by the decoder, tightly packed 8-bit channels, rows top to bottom. The
/// buffer is owned here, so dropping the image is what releases it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;
}
