//! Image dimension and format detection.

use std::io::Cursor;

use image::ImageReader;

use assetdeck_core::error::{AppError, ErrorKind};
use assetdeck_core::result::AppResult;
use assetdeck_core::traits::metadata::{ImageMetadata, MetadataProbe};

/// [`MetadataProbe`] backed by the `image` crate. Only headers are decoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProbe;

impl MetadataProbe for ImageProbe {
    fn probe(&self, data: &[u8]) -> AppResult<ImageMetadata> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| AppError::with_source(ErrorKind::Validation, "Unreadable image", e))?;

        let format = reader
            .format()
            .and_then(|f| f.extensions_str().first().copied())
            .ok_or_else(|| AppError::validation("Unrecognized image format"))?
            .to_string();

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| AppError::with_source(ErrorKind::Validation, "Unreadable image", e))?;

        Ok(ImageMetadata {
            width,
            height,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_probe_png() {
        let meta = ImageProbe.probe(&png(16, 8)).unwrap();
        assert_eq!(meta.width, 16);
        assert_eq!(meta.height, 8);
        assert_eq!(meta.format, "png");
    }

    #[test]
    fn test_probe_rejects_garbage() {
        let err = ImageProbe.probe(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
