use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat};

use crate::error::InputError;

/// An uploaded image, re-encoded as JPEG and ready for transport.
///
/// Lives for a single request.
#[derive(Clone)]
pub struct EncodedImage {
    base64: String,
    width: u32,
    height: u32,
}

impl EncodedImage {
    /// Decodes any supported format and re-encodes it as JPEG.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InputError> {
        if bytes.is_empty() {
            return Err(InputError::MissingImage);
        }

        let decoded = image::load_from_memory(bytes)
            .map_err(|e| InputError::InvalidImage(e.to_string()))?;
        Self::from_image(&decoded)
    }

    pub fn from_image(image: &DynamicImage) -> Result<Self, InputError> {
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

        let mut jpeg_bytes = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut jpeg_bytes), ImageFormat::Jpeg)
            .map_err(|e| InputError::InvalidImage(e.to_string()))?;

        Ok(Self {
            base64: general_purpose::STANDARD.encode(&jpeg_bytes),
            width: rgb.width(),
            height: rgb.height(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => InputError::MissingImage,
            _ => InputError::InvalidImage(format!("{}: {}", path.display(), e)),
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.base64)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("base64_len", &self.base64.len())
            .finish()
    }
}
