use std::path::{Path, PathBuf};

use crate::{
    assets::{
        decode::ImageCodec,
        pixels::{PixelBuffer, RawPixels, image_to_rgba8, to_rgba8},
    },
    foundation::error::{LayerError, LayerResult},
};

/// Caller-supplied image asset reference.
#[derive(Clone, Debug)]
pub enum AssetSource {
    /// Encoded image on disk; must exist, decoded on first use.
    Path(PathBuf),
    /// Raw `(H, W)` or `(H, W, 4)` array.
    Pixels(RawPixels),
    /// Already decoded image object of any color type.
    Image(image::DynamicImage),
}

impl From<PathBuf> for AssetSource {
    fn from(p: PathBuf) -> Self {
        Self::Path(p)
    }
}

impl From<&Path> for AssetSource {
    fn from(p: &Path) -> Self {
        Self::Path(p.to_path_buf())
    }
}

impl From<&PathBuf> for AssetSource {
    fn from(p: &PathBuf) -> Self {
        Self::Path(p.clone())
    }
}

impl From<&str> for AssetSource {
    fn from(p: &str) -> Self {
        Self::Path(PathBuf::from(p))
    }
}

impl From<String> for AssetSource {
    fn from(p: String) -> Self {
        Self::Path(PathBuf::from(p))
    }
}

impl From<RawPixels> for AssetSource {
    fn from(raw: RawPixels) -> Self {
        Self::Pixels(raw)
    }
}

impl From<image::DynamicImage> for AssetSource {
    fn from(img: image::DynamicImage) -> Self {
        Self::Image(img)
    }
}

/// Fill-once memo cell holding either a decoded buffer or a path still waiting
/// to be decoded.
#[derive(Clone, Debug)]
pub enum AssetSlot {
    Deferred {
        path: PathBuf,
        decoded: Option<PixelBuffer>,
    },
    Ready(PixelBuffer),
}

impl AssetSlot {
    /// Validate `source` and bring it into canonical form.
    ///
    /// Paths are only checked for existence; arrays and image objects are normalized
    /// to RGBA8 right away.
    pub fn resolve(source: AssetSource) -> LayerResult<Self> {
        match source {
            AssetSource::Path(path) => {
                if !path.exists() {
                    return Err(LayerError::asset_not_found(path));
                }
                Ok(Self::Deferred {
                    path,
                    decoded: None,
                })
            }
            AssetSource::Pixels(raw) => Ok(Self::Ready(to_rgba8(raw)?)),
            AssetSource::Image(img) => Ok(Self::Ready(image_to_rgba8(&img))),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Deferred { path, .. } => Some(path),
            Self::Ready(_) => None,
        }
    }

    pub fn is_decoded(&self) -> bool {
        match self {
            Self::Deferred { decoded, .. } => decoded.is_some(),
            Self::Ready(_) => true,
        }
    }

    pub fn get(&self) -> Option<&PixelBuffer> {
        match self {
            Self::Deferred { decoded, .. } => decoded.as_ref(),
            Self::Ready(buf) => Some(buf),
        }
    }

    /// Return the buffer, decoding through `codec` the first time a deferred path
    /// is asked for. A failed decode leaves the slot empty.
    pub fn get_or_decode(&mut self, codec: &dyn ImageCodec) -> LayerResult<&PixelBuffer> {
        match self {
            Self::Ready(buf) => Ok(&*buf),
            Self::Deferred { path, decoded } => {
                if decoded.is_none() {
                    let buf = codec.decode_path(path)?;
                    tracing::debug!(
                        path = %path.display(),
                        width = buf.width(),
                        height = buf.height(),
                        "lazy decode"
                    );
                    *decoded = Some(buf);
                } else {
                    tracing::trace!(path = %path.display(), "decode cache hit");
                }
                decoded.as_ref().ok_or_else(|| {
                    LayerError::decode(format!("no buffer for '{}'", path.display()))
                })
            }
        }
    }
}
