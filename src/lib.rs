//! Time-indexed media layers for Wavyte compositions.
//!
//! A layer answers one question for a compositor: what is visible at time `t`?
//! Three kinds are provided:
//!
//! - [`StillImageLayer`]: one image, visible over `[0, duration)`.
//! - [`IntervalSequenceLayer`]: images bound to `[start, end)` intervals.
//! - [`FrameRateVideoLayer`]: a video clip quantized at its native frame rate.
//!
//! All of them implement [`Layer`]: `get_key(t)` returns a cheap discrete key for
//! change detection (never decodes), and `evaluate(t)` returns the straight RGBA8
//! [`PixelBuffer`] for `t`, or `None` when nothing is visible.
//!
//! Path assets are existence-checked at construction and decoded lazily on first
//! use. Image decoding goes through the `image` crate; video goes through the system
//! `ffprobe`/`ffmpeg` binaries when the `media-ffmpeg` feature is enabled.
#![forbid(unsafe_code)]

mod assets;
mod foundation;
mod layers;
mod model;

pub use assets::decode::{ImageCodec, ImageCrateCodec, decode_image, decode_image_file};
pub use assets::media::{
    FfmpegDecoder, VideoDecoder, VideoMetadata, decode_video_frame_rgba8, probe_video,
};
pub use assets::pixels::{PixelBuffer, RawPixels, RawSamples, image_to_rgba8, to_rgba8};
pub use assets::source::{AssetSlot, AssetSource};
pub use foundation::core::{Fps, Interval, PixelSize};
pub use foundation::error::{LayerError, LayerResult};
pub use foundation::interval::IntervalIndex;
pub use layers::sequence::{
    DEFAULT_EACH_DURATION_SECS, IntervalSequenceLayer, SEQUENCE_EXTENSIONS,
};
pub use layers::still::{DEFAULT_STILL_DURATION_SECS, StillImageLayer};
pub use layers::video::FrameRateVideoLayer;
pub use layers::{Layer, LayerKey, MediaLayer};
pub use model::{
    ImageDirSpec, ImageSequenceSpec, ImageSpec, LayerSpec, TimedSequenceSpec, TimedSource,
    VideoSpec,
};
