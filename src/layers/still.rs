use std::sync::Arc;

use crate::{
    assets::{
        decode::{ImageCodec, ImageCrateCodec},
        pixels::PixelBuffer,
        source::{AssetSlot, AssetSource},
    },
    foundation::{
        core::PixelSize,
        error::{LayerError, LayerResult},
    },
    layers::Layer,
};

/// Visible window used when no duration is given; long enough for any composition.
pub const DEFAULT_STILL_DURATION_SECS: f64 = 1e6;

/// A single image visible over `[0, duration)`.
///
/// Content never changes with time; only visibility does. A path source is decoded
/// on the first [`Layer::evaluate`] or [`StillImageLayer::size`] call and reused
/// afterwards.
pub struct StillImageLayer {
    slot: AssetSlot,
    duration: f64,
    codec: Arc<dyn ImageCodec>,
}

impl StillImageLayer {
    pub fn new(source: impl Into<AssetSource>) -> LayerResult<Self> {
        Self::with_duration(source, DEFAULT_STILL_DURATION_SECS)
    }

    #[tracing::instrument(skip(source))]
    pub fn with_duration(source: impl Into<AssetSource>, duration: f64) -> LayerResult<Self> {
        if duration.is_nan() || duration < 0.0 {
            return Err(LayerError::validation(format!(
                "still image duration must be >= 0 (got {duration})"
            )));
        }
        Ok(Self {
            slot: AssetSlot::resolve(source.into())?,
            duration,
            codec: Arc::new(ImageCrateCodec),
        })
    }

    /// Replace the codec used for the deferred decode.
    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Pixel dimensions; decodes the image if that has not happened yet.
    pub fn size(&mut self) -> LayerResult<PixelSize> {
        Ok(self.image()?.size())
    }

    pub fn is_decoded(&self) -> bool {
        self.slot.is_decoded()
    }

    fn image(&mut self) -> LayerResult<&PixelBuffer> {
        self.slot.get_or_decode(self.codec.as_ref())
    }
}

impl Layer for StillImageLayer {
    type Key = bool;

    fn get_key(&self, time: f64) -> bool {
        0.0 <= time && time < self.duration
    }

    fn evaluate(&mut self, _time: f64) -> LayerResult<Option<PixelBuffer>> {
        self.image().map(|buf| Some(buf.clone()))
    }

    fn duration(&self) -> f64 {
        self.duration
    }
}

impl std::fmt::Debug for StillImageLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StillImageLayer")
            .field("path", &self.slot.path())
            .field("decoded", &self.slot.is_decoded())
            .field("duration", &self.duration)
            .finish()
    }
}
