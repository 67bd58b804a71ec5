use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    assets::{
        decode::{ImageCodec, ImageCrateCodec},
        pixels::PixelBuffer,
        source::{AssetSlot, AssetSource},
    },
    foundation::{
        core::Interval,
        error::{LayerError, LayerResult},
        interval::IntervalIndex,
    },
    layers::Layer,
};

pub const DEFAULT_EACH_DURATION_SECS: f64 = 1.0;

/// File extensions picked up by [`IntervalSequenceLayer::from_dir`] (case-sensitive).
pub const SEQUENCE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

/// Images bound to `[start, end)` intervals on the timeline.
///
/// The key at time `t` is the index of the interval containing `t` (first match in
/// construction order), or `None` outside every interval. Path assets are decoded
/// the first time their interval is evaluated and kept for the layer's lifetime.
pub struct IntervalSequenceLayer {
    index: IntervalIndex,
    slots: Vec<AssetSlot>,
    codec: Arc<dyn ImageCodec>,
}

impl IntervalSequenceLayer {
    /// Build from parallel start/end/asset tables.
    #[tracing::instrument(skip_all, fields(len = sources.len()))]
    pub fn new(starts: &[f64], ends: &[f64], sources: Vec<AssetSource>) -> LayerResult<Self> {
        if starts.len() != sources.len() {
            return Err(LayerError::validation(format!(
                "{} intervals but {} assets",
                starts.len(),
                sources.len()
            )));
        }
        let index = IntervalIndex::from_bounds(starts, ends)?;
        let slots = sources
            .into_iter()
            .map(AssetSlot::resolve)
            .collect::<LayerResult<Vec<_>>>()?;
        tracing::debug!(
            deferred = slots.iter().filter(|s| !s.is_decoded()).count(),
            "image sequence ready"
        );
        Ok(Self {
            index,
            slots,
            codec: Arc::new(ImageCrateCodec),
        })
    }

    /// Back-to-back intervals of `each_duration` seconds starting at 0.
    pub fn from_files<I, S>(sources: I, each_duration: f64) -> LayerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<AssetSource>,
    {
        if !each_duration.is_finite() || each_duration <= 0.0 {
            return Err(LayerError::validation(format!(
                "each_duration must be finite and > 0 (got {each_duration})"
            )));
        }
        let sources: Vec<AssetSource> = sources.into_iter().map(Into::into).collect();
        let starts: Vec<f64> = (0..sources.len())
            .map(|i| i as f64 * each_duration)
            .collect();
        // Each end is the next start, so neighbours stay contiguous under rounding.
        let ends: Vec<f64> = (1..=sources.len())
            .map(|i| i as f64 * each_duration)
            .collect();
        Self::new(&starts, &ends, sources)
    }

    /// All files in `dir` with a [`SEQUENCE_EXTENSIONS`] extension, sorted by name.
    #[tracing::instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn from_dir(dir: impl AsRef<Path>, each_duration: f64) -> LayerResult<Self> {
        let files = list_sequence_files(dir.as_ref())?;
        tracing::debug!(count = files.len(), "listed image sequence");
        Self::from_files(files, each_duration)
    }

    /// Replace the codec used for deferred decodes.
    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn intervals(&self) -> &[Interval] {
        self.index.intervals()
    }

    pub fn is_decoded(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(AssetSlot::is_decoded)
    }
}

impl Layer for IntervalSequenceLayer {
    type Key = Option<usize>;

    fn get_key(&self, time: f64) -> Option<usize> {
        self.index.lookup(time)
    }

    fn evaluate(&mut self, time: f64) -> LayerResult<Option<PixelBuffer>> {
        let Some(idx) = self.index.lookup(time) else {
            return Ok(None);
        };
        let slot = self
            .slots
            .get_mut(idx)
            .ok_or_else(|| LayerError::decode(format!("no asset at sequence index {idx}")))?;
        let buf = slot.get_or_decode(self.codec.as_ref())?;
        Ok(Some(buf.clone()))
    }

    /// End of the latest interval.
    fn duration(&self) -> f64 {
        self.index.max_end()
    }
}

impl std::fmt::Debug for IntervalSequenceLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalSequenceLayer")
            .field("len", &self.slots.len())
            .field(
                "decoded",
                &self.slots.iter().filter(|s| s.is_decoded()).count(),
            )
            .field("duration", &self.index.max_end())
            .finish()
    }
}

fn list_sequence_files(dir: &Path) -> LayerResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LayerError::asset_not_found(dir));
    }
    let mut files = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read dir '{}'", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("read dir entry in '{}'", dir.display()))?
            .path();
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SEQUENCE_EXTENSIONS.contains(&e));
        if ext_ok && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::pixels::RawPixels;

    fn solid(v: u8) -> AssetSource {
        RawPixels::gray8(1, 1, vec![v]).into()
    }

    #[test]
    fn from_files_builds_contiguous_intervals() {
        let layer =
            IntervalSequenceLayer::from_files([solid(0), solid(1), solid(2)], 0.5).unwrap();
        assert_eq!(layer.len(), 3);
        assert_eq!(layer.intervals()[1], Interval::new(0.5, 1.0).unwrap());
        assert_eq!(layer.duration(), 1.5);
        assert_eq!(layer.get_key(0.0), Some(0));
        assert_eq!(layer.get_key(0.49), Some(0));
        assert_eq!(layer.get_key(0.5), Some(1));
        assert_eq!(layer.get_key(1.5), None);
        assert_eq!(layer.get_key(-0.1), None);
    }

    #[test]
    fn evaluate_returns_asset_for_active_interval() {
        let mut layer = IntervalSequenceLayer::new(
            &[0.0, 2.0],
            &[1.0, 3.0],
            vec![solid(10), solid(20)],
        )
        .unwrap();
        assert_eq!(
            layer.evaluate(0.5).unwrap().unwrap().pixel(0, 0),
            Some([10, 10, 10, 255])
        );
        assert_eq!(layer.evaluate(1.5).unwrap(), None);
        assert_eq!(
            layer.evaluate(2.0).unwrap().unwrap().pixel(0, 0),
            Some([20, 20, 20, 255])
        );
    }

    #[test]
    fn table_lengths_must_agree() {
        assert!(matches!(
            IntervalSequenceLayer::new(&[0.0], &[1.0], vec![solid(0), solid(1)]),
            Err(LayerError::Validation(_))
        ));
        assert!(matches!(
            IntervalSequenceLayer::new(&[0.0, 1.0], &[1.0], vec![solid(0), solid(1)]),
            Err(LayerError::Validation(_))
        ));
    }

    #[test]
    fn bad_each_duration_is_rejected() {
        assert!(IntervalSequenceLayer::from_files([solid(0)], 0.0).is_err());
        assert!(IntervalSequenceLayer::from_files([solid(0)], f64::NAN).is_err());
    }

    #[test]
    fn empty_sequence_is_never_visible() {
        let mut layer =
            IntervalSequenceLayer::from_files(Vec::<AssetSource>::new(), 1.0).unwrap();
        assert!(layer.is_empty());
        assert_eq!(layer.duration(), 0.0);
        assert_eq!(layer.get_key(0.0), None);
        assert_eq!(layer.evaluate(0.0).unwrap(), None);
    }

    #[test]
    fn missing_dir_is_not_found() {
        assert!(matches!(
            IntervalSequenceLayer::from_dir("no/such/dir", 1.0),
            Err(LayerError::AssetNotFound(_))
        ));
    }
}
