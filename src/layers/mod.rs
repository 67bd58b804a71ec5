pub mod sequence;
pub mod still;
pub mod video;

use crate::{assets::pixels::PixelBuffer, foundation::error::LayerResult};

use self::{sequence::IntervalSequenceLayer, still::StillImageLayer, video::FrameRateVideoLayer};

/// Time-indexed source of visual content.
///
/// `get_key` never decodes, so compositors can use it for change detection.
/// `evaluate` takes `&mut self`: lazy caches and decoder handles require exclusive
/// access per layer.
pub trait Layer {
    type Key: Copy + PartialEq + std::fmt::Debug;

    fn get_key(&self, time: f64) -> Self::Key;

    fn evaluate(&mut self, time: f64) -> LayerResult<Option<PixelBuffer>>;

    fn duration(&self) -> f64;
}

/// Key of a [`MediaLayer`], comparable across frames of the same layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKey {
    Visible(bool),
    Index(Option<u64>),
}

#[derive(Debug)]
pub enum MediaLayer {
    Still(StillImageLayer),
    Sequence(IntervalSequenceLayer),
    Video(FrameRateVideoLayer),
}

impl Layer for MediaLayer {
    type Key = LayerKey;

    fn get_key(&self, time: f64) -> LayerKey {
        match self {
            Self::Still(l) => LayerKey::Visible(l.get_key(time)),
            Self::Sequence(l) => LayerKey::Index(l.get_key(time).map(|i| i as u64)),
            Self::Video(l) => LayerKey::Index(l.get_key(time)),
        }
    }

    fn evaluate(&mut self, time: f64) -> LayerResult<Option<PixelBuffer>> {
        match self {
            Self::Still(l) => l.evaluate(time),
            Self::Sequence(l) => l.evaluate(time),
            Self::Video(l) => l.evaluate(time),
        }
    }

    fn duration(&self) -> f64 {
        match self {
            Self::Still(l) => l.duration(),
            Self::Sequence(l) => l.duration(),
            Self::Video(l) => l.duration(),
        }
    }
}

impl From<StillImageLayer> for MediaLayer {
    fn from(l: StillImageLayer) -> Self {
        Self::Still(l)
    }
}

impl From<IntervalSequenceLayer> for MediaLayer {
    fn from(l: IntervalSequenceLayer) -> Self {
        Self::Sequence(l)
    }
}

impl From<FrameRateVideoLayer> for MediaLayer {
    fn from(l: FrameRateVideoLayer) -> Self {
        Self::Video(l)
    }
}
