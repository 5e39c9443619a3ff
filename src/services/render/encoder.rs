use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::FilterType;
use image::{Delay, Frame};

use crate::capture::screenshot::{decode_data_url, encode_data_url};
use crate::error::GifawayError;

/// Stitches stills into one animated image.
pub trait AnimationEncoder: Send + Sync {
    /// Returns the animation as a `data:image/gif;base64,...` URL.
    fn encode(
        &self,
        stills: &[String],
        width: u32,
        height: u32,
        frame_interval_secs: f32,
    ) -> Result<String, GifawayError>;
}

/// Looping GIF encoder backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageGifEncoder;

impl AnimationEncoder for ImageGifEncoder {
    fn encode(
        &self,
        stills: &[String],
        width: u32,
        height: u32,
        frame_interval_secs: f32,
    ) -> Result<String, GifawayError> {
        if stills.is_empty() {
            return Err(GifawayError::EncodeFailed("no stills to encode".into()));
        }
        if width == 0 || height == 0 {
            return Err(GifawayError::EncodeFailed(format!(
                "invalid output size {}x{}",
                width, height
            )));
        }
        if !frame_interval_secs.is_finite() || frame_interval_secs <= 0.0 {
            return Err(GifawayError::EncodeFailed(format!(
                "invalid frame interval {}",
                frame_interval_secs
            )));
        }

        let delay_ms = (frame_interval_secs * 1000.0).round() as u32;
        let delay = Delay::from_numer_denom_ms(delay_ms, 1);

        let mut frames = Vec::with_capacity(stills.len());
        for still in stills {
            let bytes = decode_data_url(still)?;
            let rgba = image::load_from_memory(&bytes)?
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgba8();
            frames.push(Frame::from_parts(rgba, 0, 0, delay));
        }

        let mut gif = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut gif);
            encoder.set_repeat(Repeat::Infinite)?;
            encoder.encode_frames(frames)?;
        }
        log::debug!("Encoded {} stills into {} bytes of GIF", stills.len(), gif.len());
        Ok(encode_data_url(&gif, "image/gif"))
    }
}
