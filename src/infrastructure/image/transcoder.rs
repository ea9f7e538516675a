//! Bounded lossy transcoding.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::{debug, trace};

use crate::domain::{CachePolicy, TranscodeError, TranscoderPort};

/// Decodes any supported format, fits it into a bounding box and re-encodes as JPEG.
///
/// Output is always re-encoded, even when the input is already a JPEG inside
/// the box, so every stored payload has the same format and bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegTranscoder {
    max_width: u32,
    max_height: u32,
    quality: u8,
}

impl JpegTranscoder {
    /// Creates a transcoder with an explicit box and quality (1-100).
    #[must_use]
    pub fn new(max_width: u32, max_height: u32, quality: u8) -> Self {
        Self {
            max_width: max_width.max(1),
            max_height: max_height.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    /// Creates a transcoder from the pipeline limits.
    #[must_use]
    pub fn from_policy(policy: &CachePolicy) -> Self {
        Self::new(policy.max_width, policy.max_height, policy.quality)
    }

    /// Returns true if an image of this size must be scaled down.
    #[must_use]
    pub const fn exceeds_bounds(&self, width: u32, height: u32) -> bool {
        width > self.max_width || height > self.max_height
    }
}

impl Default for JpegTranscoder {
    fn default() -> Self {
        Self::from_policy(&CachePolicy::default())
    }
}

impl TranscoderPort for JpegTranscoder {
    fn transcode(&self, bytes: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        let img = image::load_from_memory(bytes).map_err(|e| TranscodeError::decode(e.to_string()))?;
        let (width, height) = (img.width(), img.height());

        let img = if self.exceeds_bounds(width, height) {
            let resized = img.resize(self.max_width, self.max_height, FilterType::Lanczos3);
            debug!(
                from_width = width,
                from_height = height,
                to_width = resized.width(),
                to_height = resized.height(),
                "Resized image into bounding box"
            );
            resized
        } else {
            img
        };

        let rgb = img.to_rgb8();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .encode_image(&rgb)
            .map_err(|e| TranscodeError::encode(e.to_string()))?;

        trace!(input = bytes.len(), output = out.len(), "Transcoded image");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use test_case::test_case;

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode(&DynamicImage::new_rgb8(width, height), ImageFormat::Png)
    }

    #[test_case(1600, 900, 800, 450 ; "wide")]
    #[test_case(1000, 1000, 600, 600 ; "square")]
    #[test_case(300, 2000, 90, 600 ; "tall")]
    #[test_case(900, 500, 800, 444 ; "slightly_wide")]
    fn test_oversized_images_fit_the_box(w: u32, h: u32, expect_w: u32, expect_h: u32) {
        let transcoder = JpegTranscoder::default();

        let out = transcoder.transcode(&png(w, h)).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();

        assert!(decoded.width() <= 800 && decoded.height() <= 600);
        assert!(decoded.width().abs_diff(expect_w) <= 1);
        assert!(decoded.height().abs_diff(expect_h) <= 1);
    }

    #[test]
    fn test_aspect_ratio_preserved() {
        let transcoder = JpegTranscoder::default();

        let out = transcoder.transcode(&png(2400, 1000)).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();

        let source_ratio = 2400.0 / 1000.0;
        let ratio = f64::from(decoded.width()) / f64::from(decoded.height());
        assert!((ratio - source_ratio).abs() < 0.02);
    }

    #[test_case(640, 480 ; "inside")]
    #[test_case(800, 600 ; "exact_box")]
    #[test_case(1, 1 ; "single_pixel")]
    fn test_images_within_bounds_keep_dimensions(w: u32, h: u32) {
        let transcoder = JpegTranscoder::default();

        let out = transcoder.transcode(&png(w, h)).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (w, h));
    }

    #[test]
    fn test_output_is_always_jpeg() {
        let transcoder = JpegTranscoder::default();
        let jpeg_input = encode(&DynamicImage::new_rgb8(64, 64), ImageFormat::Jpeg);
        let rgba_png = encode(&DynamicImage::new_rgba8(64, 64), ImageFormat::Png);

        for input in [png(64, 64), jpeg_input, rgba_png] {
            let out = transcoder.transcode(&input).unwrap();
            assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        }
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let transcoder = JpegTranscoder::default();

        let err = transcoder.transcode(b"<html>not an image</html>").unwrap_err();

        assert!(matches!(err, TranscodeError::DecodeFailed { .. }));
    }

    #[test]
    fn test_empty_input_fails_to_decode() {
        let err = JpegTranscoder::default().transcode(&[]).unwrap_err();
        assert!(matches!(err, TranscodeError::DecodeFailed { .. }));
    }
}
