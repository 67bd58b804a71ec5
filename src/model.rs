use std::path::{Path, PathBuf};

use crate::{
    assets::source::AssetSource,
    foundation::error::{LayerError, LayerResult},
    layers::{
        MediaLayer,
        sequence::{DEFAULT_EACH_DURATION_SECS, IntervalSequenceLayer},
        still::{DEFAULT_STILL_DURATION_SECS, StillImageLayer},
        video::FrameRateVideoLayer,
    },
};

/// Declarative description of one layer, as stored in composition JSON.
///
/// Relative sources are resolved against the root passed to [`LayerSpec::build`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LayerSpec {
    Image(ImageSpec),
    ImageSequence(ImageSequenceSpec),
    ImageSequenceTimed(TimedSequenceSpec),
    ImageDir(ImageDirSpec),
    Video(VideoSpec),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageSpec {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>, // default DEFAULT_STILL_DURATION_SECS
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageSequenceSpec {
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub each_duration: Option<f64>, // default DEFAULT_EACH_DURATION_SECS
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimedSequenceSpec {
    pub items: Vec<TimedSource>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimedSource {
    pub source: String,
    pub start: f64,
    pub end: f64, // exclusive
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageDirSpec {
    pub dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub each_duration: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoSpec {
    pub source: String,
}

impl LayerSpec {
    pub fn from_json_str(s: &str) -> LayerResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| LayerError::validation(format!("layer spec json parse failed: {e}")))
    }

    pub fn from_json_reader(r: impl std::io::Read) -> LayerResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| LayerError::validation(format!("layer spec json parse failed: {e}")))
    }

    pub fn validate(&self) -> LayerResult<()> {
        match self {
            Self::Image(s) => {
                validate_source(&s.source)?;
                if let Some(d) = s.duration
                    && (d.is_nan() || d < 0.0)
                {
                    return Err(LayerError::validation(format!(
                        "image '{}' duration must be >= 0",
                        s.source
                    )));
                }
            }
            Self::ImageSequence(s) => {
                for src in &s.sources {
                    validate_source(src)?;
                }
                validate_each_duration(s.each_duration)?;
            }
            Self::ImageSequenceTimed(s) => {
                for item in &s.items {
                    validate_source(&item.source)?;
                    if !item.start.is_finite() || !item.end.is_finite() || item.start > item.end
                    {
                        return Err(LayerError::validation(format!(
                            "item '{}' has invalid range [{}, {})",
                            item.source, item.start, item.end
                        )));
                    }
                }
            }
            Self::ImageDir(s) => {
                validate_source(&s.dir)?;
                validate_each_duration(s.each_duration)?;
            }
            Self::Video(s) => validate_source(&s.source)?,
        }
        Ok(())
    }

    /// Validate and construct the layer, resolving relative paths against `root`.
    #[tracing::instrument(skip(self, root), fields(root = %root.as_ref().display()))]
    pub fn build(&self, root: impl AsRef<Path>) -> LayerResult<MediaLayer> {
        self.validate()?;
        let root = root.as_ref();
        let layer: MediaLayer = match self {
            Self::Image(s) => StillImageLayer::with_duration(
                resolve(root, &s.source),
                s.duration.unwrap_or(DEFAULT_STILL_DURATION_SECS),
            )?
            .into(),
            Self::ImageSequence(s) => IntervalSequenceLayer::from_files(
                s.sources.iter().map(|src| resolve(root, src)),
                s.each_duration.unwrap_or(DEFAULT_EACH_DURATION_SECS),
            )?
            .into(),
            Self::ImageSequenceTimed(s) => {
                let starts: Vec<f64> = s.items.iter().map(|i| i.start).collect();
                let ends: Vec<f64> = s.items.iter().map(|i| i.end).collect();
                let sources: Vec<AssetSource> = s
                    .items
                    .iter()
                    .map(|i| resolve(root, &i.source).into())
                    .collect();
                IntervalSequenceLayer::new(&starts, &ends, sources)?.into()
            }
            Self::ImageDir(s) => IntervalSequenceLayer::from_dir(
                resolve(root, &s.dir),
                s.each_duration.unwrap_or(DEFAULT_EACH_DURATION_SECS),
            )?
            .into(),
            Self::Video(s) => FrameRateVideoLayer::open(resolve(root, &s.source))?.into(),
        };
        Ok(layer)
    }
}

fn validate_source(source: &str) -> LayerResult<()> {
    if source.trim().is_empty() {
        return Err(LayerError::validation("source path must be non-empty"));
    }
    Ok(())
}

fn validate_each_duration(each_duration: Option<f64>) -> LayerResult<()> {
    match each_duration {
        Some(d) if !d.is_finite() || d <= 0.0 => Err(LayerError::validation(format!(
            "each_duration must be finite and > 0 (got {d})"
        ))),
        _ => Ok(()),
    }
}

fn resolve(root: &Path, source: &str) -> PathBuf {
    let p = Path::new(source);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_externally_tagged_json() {
        let spec = LayerSpec::from_json_str(r#"{"Image":{"source":"a.png","duration":2.5}}"#)
            .unwrap();
        assert_eq!(
            spec,
            LayerSpec::Image(ImageSpec {
                source: "a.png".to_string(),
                duration: Some(2.5),
            })
        );

        let spec =
            LayerSpec::from_json_str(r#"{"ImageSequence":{"sources":["a.png","b.png"]}}"#)
                .unwrap();
        let LayerSpec::ImageSequence(seq) = spec else {
            panic!("expected ImageSequence");
        };
        assert_eq!(seq.sources.len(), 2);
        assert_eq!(seq.each_duration, None);
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        assert!(matches!(
            LayerSpec::from_json_str(r#"{"Nope":{}}"#),
            Err(LayerError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad = [
            LayerSpec::Image(ImageSpec {
                source: " ".to_string(),
                duration: None,
            }),
            LayerSpec::Image(ImageSpec {
                source: "a.png".to_string(),
                duration: Some(-1.0),
            }),
            LayerSpec::ImageSequence(ImageSequenceSpec {
                sources: vec!["a.png".to_string()],
                each_duration: Some(0.0),
            }),
            LayerSpec::ImageSequenceTimed(TimedSequenceSpec {
                items: vec![TimedSource {
                    source: "a.png".to_string(),
                    start: 2.0,
                    end: 1.0,
                }],
            }),
            LayerSpec::ImageDir(ImageDirSpec {
                dir: "frames".to_string(),
                each_duration: Some(f64::INFINITY),
            }),
        ];
        for spec in bad {
            assert!(spec.validate().is_err(), "{spec:?} should be rejected");
        }
    }

    #[test]
    fn relative_sources_join_root() {
        assert_eq!(
            resolve(Path::new("/assets"), "a/b.png"),
            PathBuf::from("/assets/a/b.png")
        );
        let abs = std::env::temp_dir().join("x.png");
        let abs_str = abs.to_string_lossy().into_owned();
        assert_eq!(resolve(Path::new("/assets"), &abs_str), abs);
    }

    #[test]
    fn build_reports_missing_assets() {
        let spec = LayerSpec::Image(ImageSpec {
            source: "missing.png".to_string(),
            duration: None,
        });
        assert!(matches!(
            spec.build(std::env::temp_dir().join("wavyte_layers_no_such_root")),
            Err(LayerError::AssetNotFound(_))
        ));
    }
}
