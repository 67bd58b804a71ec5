use std::path::Path;

use crate::{
    assets::{
        media::{FfmpegDecoder, VideoDecoder},
        pixels::PixelBuffer,
    },
    foundation::{
        core::{Fps, PixelSize},
        error::{LayerError, LayerResult},
    },
    layers::Layer,
};

/// A video clip sampled at its native frame rate.
///
/// Time `t` maps to frame `floor(t * fps)` for `t` in `[0, duration]`. Frames are not
/// cached here; every evaluation goes through the decoder.
pub struct FrameRateVideoLayer {
    decoder: Box<dyn VideoDecoder>,
    fps: Fps,
    frame_count: u64,
    size: PixelSize,
    duration: f64,
}

impl FrameRateVideoLayer {
    /// Open `path` with the ffmpeg-backed decoder and read its stream metadata.
    pub fn open(path: impl AsRef<Path>) -> LayerResult<Self> {
        let decoder = FfmpegDecoder::open(path.as_ref())?;
        Self::from_decoder(Box::new(decoder))
    }

    pub fn from_decoder(decoder: Box<dyn VideoDecoder>) -> LayerResult<Self> {
        let info = decoder.metadata();
        if !info.duration_sec.is_finite() || info.duration_sec < 0.0 {
            return Err(LayerError::unreadable_media(format!(
                "'{}' reports an invalid duration ({})",
                info.source_path.display(),
                info.duration_sec
            )));
        }
        let (fps, frame_count, size, duration) =
            (info.fps, info.frame_count, info.size, info.duration_sec);
        Ok(Self {
            decoder,
            fps,
            frame_count,
            size,
            duration,
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps.as_f64()
    }

    pub fn frame_rate(&self) -> Fps {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }
}

impl Layer for FrameRateVideoLayer {
    type Key = Option<u64>;

    fn get_key(&self, time: f64) -> Option<u64> {
        if time.is_nan() || time < 0.0 || self.duration < time {
            return None;
        }
        Some(self.fps.secs_to_frames_floor(time))
    }

    /// Decode the frame for `time`, clamped to the last frame the stream holds.
    fn evaluate(&mut self, time: f64) -> LayerResult<Option<PixelBuffer>> {
        let Some(frame) = self.get_key(time) else {
            return Ok(None);
        };
        let Some(last) = self.frame_count.checked_sub(1) else {
            return Err(LayerError::decode(format!(
                "'{}' has no frames",
                self.decoder.metadata().source_path.display()
            )));
        };
        let index = frame.min(last);
        if index != frame {
            tracing::trace!(frame, index, "clamped frame index");
        }
        self.decoder.read_frame(index).map(Some)
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}

impl std::fmt::Debug for FrameRateVideoLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRateVideoLayer")
            .field("source", &self.decoder.metadata().source_path)
            .field("fps", &self.fps)
            .field("frame_count", &self.frame_count)
            .field("size", &self.size)
            .field("duration", &self.duration)
            .finish()
    }
}
