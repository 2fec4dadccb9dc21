//! Throttled, downsized JPEG previews for the host UI.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use handsoff_common::clock::{secs_to_ns, RateController};
use handsoff_common::config::OutputConfig;
use handsoff_common::error::{HandsoffError, HandsoffResult};
use handsoff_pose_model::source::Frame;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};

/// Encode a frame as JPEG at the given quality (1-100).
pub fn encode_jpeg(frame: &Frame, quality: u8) -> HandsoffResult<Vec<u8>> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(frame)
        .map_err(|e| HandsoffError::image(format!("JPEG encoding failed: {e}")))?;
    Ok(bytes)
}

/// Scale `frame` to `width`, keeping the aspect ratio.
pub fn resize_to_width(frame: &Frame, width: u32) -> Frame {
    if width == 0 || frame.width() == 0 || frame.width() == width {
        return frame.clone();
    }
    let height = (frame.height() as f64 * width as f64 / frame.width() as f64).round() as u32;
    imageops::resize(frame, width, height.max(1), FilterType::Triangle)
}

/// Produces `debug_frame` payloads at no more than the configured rate.
#[derive(Debug)]
pub struct DebugFrameEncoder {
    rate: RateController,
    width: u32,
    quality: u8,
}

impl DebugFrameEncoder {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            rate: RateController::new(output.debug_frame_hz),
            width: output.debug_frame_width,
            quality: output.jpeg_quality,
        }
    }

    /// Encode `frame` if a preview is due at `timestamp_secs`.
    pub fn encode_if_due(
        &mut self,
        timestamp_secs: f64,
        frame: &Frame,
    ) -> HandsoffResult<Option<String>> {
        if !self.rate.should_tick(secs_to_ns(timestamp_secs)) {
            return Ok(None);
        }
        self.encode(frame).map(Some)
    }

    /// Resize, JPEG-encode and base64-encode one frame.
    pub fn encode(&self, frame: &Frame) -> HandsoffResult<String> {
        let scaled = resize_to_width(frame, self.width);
        let jpeg = encode_jpeg(&scaled, self.quality)?;
        Ok(STANDARD.encode(jpeg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn encoder(hz: u32, width: u32) -> DebugFrameEncoder {
        DebugFrameEncoder::new(&OutputConfig {
            debug_frame_hz: hz,
            debug_frame_width: width,
            ..Default::default()
        })
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let frame = Frame::from_pixel(640, 480, Rgb([10, 20, 30]));
        let scaled = resize_to_width(&frame, 320);
        assert_eq!(scaled.dimensions(), (320, 240));
        assert_eq!(resize_to_width(&frame, 640).dimensions(), (640, 480));
    }

    #[test]
    fn test_payload_decodes_to_scaled_jpeg() {
        let frame = Frame::from_pixel(160, 120, Rgb([200, 50, 50]));
        let b64 = encoder(5, 80).encode(&frame).unwrap();

        let bytes = STANDARD.decode(b64).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (80, 60));
    }

    #[test]
    fn test_throttles_to_configured_rate() {
        let frame = Frame::from_pixel(8, 8, Rgb([0, 0, 0]));
        let mut encoder = encoder(5, 8);

        let emitted = (0..30)
            .filter(|i| {
                let t = *i as f64 / 30.0;
                encoder.encode_if_due(t, &frame).unwrap().is_some()
            })
            .count();
        // One second at 30 fps, 200 ms apart.
        assert_eq!(emitted, 5);
    }
}
