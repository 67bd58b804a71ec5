use std::path::{Path, PathBuf};

use crate::{
    assets::pixels::PixelBuffer,
    foundation::{
        core::{Fps, PixelSize},
        error::{LayerError, LayerResult},
    },
};

#[derive(Clone, Debug)]
pub struct VideoMetadata {
    pub source_path: PathBuf,
    pub size: PixelSize,
    pub fps: Fps,
    pub frame_count: u64,
    pub duration_sec: f64,
}

/// Random-access frame source for a single video stream.
///
/// A decoder is owned by exactly one layer; callers needing concurrent access open
/// one decoder per consumer.
pub trait VideoDecoder: Send {
    fn metadata(&self) -> &VideoMetadata;

    /// Decode frame `index` (0-based) as straight RGBA8.
    fn read_frame(&mut self, index: u64) -> LayerResult<PixelBuffer>;
}

/// [`VideoDecoder`] that shells out to the system `ffprobe`/`ffmpeg` binaries.
#[derive(Clone, Debug)]
pub struct FfmpegDecoder {
    info: VideoMetadata,
}

impl FfmpegDecoder {
    #[tracing::instrument]
    pub fn open(path: &Path) -> LayerResult<Self> {
        let info = probe_video(path)?;
        tracing::debug!(
            width = info.size.width,
            height = info.size.height,
            fps = info.fps.as_f64(),
            frame_count = info.frame_count,
            duration_sec = info.duration_sec,
            "probed video"
        );
        Ok(Self { info })
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn metadata(&self) -> &VideoMetadata {
        &self.info
    }

    fn read_frame(&mut self, index: u64) -> LayerResult<PixelBuffer> {
        decode_video_frame_rgba8(&self.info, index)
    }
}

#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> LayerResult<VideoMetadata> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        avg_frame_rate: Option<String>,
        nb_frames: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| LayerError::unreadable_media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(LayerError::unreadable_media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| LayerError::unreadable_media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| LayerError::unreadable_media("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| LayerError::unreadable_media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| LayerError::unreadable_media("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = video_stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_ff_ratio)
        .or_else(|| video_stream.avg_frame_rate.as_deref().and_then(parse_ff_ratio))
        .ok_or_else(|| LayerError::unreadable_media("invalid video frame rate"))?;
    let fps = Fps::new(fps_num, fps_den)
        .map_err(|e| LayerError::unreadable_media(format!("invalid video frame rate: {e}")))?;

    let duration_sec = video_stream
        .duration
        .as_deref()
        .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| LayerError::unreadable_media("missing video duration from ffprobe"))?;
    let frame_count = video_stream
        .nb_frames
        .as_deref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| (duration_sec * fps.as_f64()).round() as u64);

    Ok(VideoMetadata {
        source_path: source_path.to_path_buf(),
        size: PixelSize::new(width, height),
        fps,
        frame_count,
        duration_sec,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(source_path: &Path) -> LayerResult<VideoMetadata> {
    Err(LayerError::unreadable_media(format!(
        "'{}': video layers require the 'media-ffmpeg' feature",
        source_path.display()
    )))
}

#[cfg(feature = "media-ffmpeg")]
pub fn decode_video_frame_rgba8(source: &VideoMetadata, index: u64) -> LayerResult<PixelBuffer> {
    // Seek a quarter frame early so float error in the timestamp never skips `index`.
    let seek_sec = (index as f64 - 0.25).max(0.0) * source.fps.frame_duration_secs();

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{seek_sec:.9}")])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| LayerError::decode(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(LayerError::decode(format!(
            "ffmpeg video decode failed for '{}' frame {index}: {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = source.size.area() * 4;
    if expected_len == 0 {
        return Err(LayerError::decode(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if out.stdout.len() < expected_len {
        return Err(LayerError::decode(format!(
            "ffmpeg returned no frame {index} for '{}' ({} bytes)",
            source.source_path.display(),
            out.stdout.len()
        )));
    }

    let mut rgba = out.stdout;
    rgba.truncate(expected_len);
    PixelBuffer::from_rgba8(source.size.width, source.size.height, rgba)
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_video_frame_rgba8(source: &VideoMetadata, _index: u64) -> LayerResult<PixelBuffer> {
    Err(LayerError::decode(format!(
        "'{}': video layers require the 'media-ffmpeg' feature",
        source.source_path.display()
    )))
}

#[cfg(feature = "media-ffmpeg")]
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if a == 0 || b == 0 {
        return None;
    }
    Some((a, b))
}
