use std::io::Cursor;

use billsplit_application::{AppConfig, ImageError, ImageNormalizer, NormalizedImage, RawImage};
use image::{
    DynamicImage, ImageDecoder, ImageReader, codecs::jpeg::JpegEncoder, imageops::FilterType,
};

const CONTRAST: f32 = 12.0;
const UNSHARPEN_SIGMA: f32 = 1.0;
const UNSHARPEN_THRESHOLD: i32 = 2;
const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// Decodes a photo, rotates it upright, boosts legibility, bounds its size
/// and re-encodes it as JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptImageNormalizer {
    max_long_edge: u32,
    jpeg_quality: u8,
}

impl ReceiptImageNormalizer {
    pub fn new(max_long_edge: u32, jpeg_quality: u8) -> Self {
        Self {
            max_long_edge: max_long_edge.max(1),
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.max_long_edge, config.jpeg_quality)
    }

    fn decode_upright(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|err| ImageError::Decode(Box::new(err)))?;
        let mut decoder = reader
            .into_decoder()
            .map_err(|err| ImageError::Decode(Box::new(err)))?;
        let orientation = decoder
            .orientation()
            .map_err(|err| ImageError::Decode(Box::new(err)))?;
        let mut image =
            DynamicImage::from_decoder(decoder).map_err(|err| ImageError::Decode(Box::new(err)))?;
        image.apply_orientation(orientation);
        Ok(image)
    }

    fn bound_size(&self, image: DynamicImage) -> DynamicImage {
        let long_edge = image.width().max(image.height());
        if long_edge <= self.max_long_edge {
            return image;
        }
        image.resize(self.max_long_edge, self.max_long_edge, FilterType::Triangle)
    }
}

impl ImageNormalizer for ReceiptImageNormalizer {
    fn normalize(&self, raw: &RawImage) -> Result<NormalizedImage, ImageError> {
        if raw.bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        let image = Self::decode_upright(&raw.bytes)?;
        let (source_width, source_height) = (image.width(), image.height());
        let image = self
            .bound_size(image)
            .adjust_contrast(CONTRAST)
            .unsharpen(UNSHARPEN_SIGMA, UNSHARPEN_THRESHOLD);
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality);
        DynamicImage::ImageRgb8(rgb)
            .write_with_encoder(encoder)
            .map_err(|err| ImageError::Encode(Box::new(err)))?;

        tracing::debug!(
            source_width,
            source_height,
            width,
            height,
            bytes = bytes.len(),
            quality = self.jpeg_quality,
            "Normalized receipt image"
        );

        Ok(NormalizedImage {
            bytes,
            width,
            height,
            content_type: OUTPUT_CONTENT_TYPE.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use rstest::rstest;

    fn png(width: u32, height: u32) -> RawImage {
        let image = RgbImage::from_fn(width, height, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgb([240, 240, 240])
            } else {
                Rgb([20, 20, 20])
            }
        });
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .expect("png encoding");
        RawImage {
            bytes: bytes.into_inner(),
            content_type: Some("image/png".to_owned()),
        }
    }

    #[rstest]
    #[case::landscape(400, 100, (200, 50))]
    #[case::portrait(100, 400, (50, 200))]
    #[case::already_small(120, 80, (120, 80))]
    fn long_edge_is_bounded(#[case] width: u32, #[case] height: u32, #[case] expected: (u32, u32)) {
        let normalizer = ReceiptImageNormalizer::new(200, 80);

        let normalized = normalizer.normalize(&png(width, height)).expect("normalized");

        assert_eq!((normalized.width, normalized.height), expected);
        assert_eq!(normalized.content_type, "image/jpeg");
        assert_eq!(&normalized.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn empty_input_is_rejected() {
        let raw = RawImage {
            bytes: Vec::new(),
            content_type: None,
        };
        assert!(matches!(
            ReceiptImageNormalizer::new(200, 80).normalize(&raw),
            Err(ImageError::Empty)
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let raw = RawImage {
            bytes: b"definitely not an image".to_vec(),
            content_type: None,
        };
        assert!(matches!(
            ReceiptImageNormalizer::new(200, 80).normalize(&raw),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn settings_are_sanitized() {
        let normalizer = ReceiptImageNormalizer::new(0, 0);
        assert_eq!(normalizer, ReceiptImageNormalizer::new(1, 1));
    }
}
