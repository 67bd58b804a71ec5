use std::path::Path;

use anyhow::Context;

use crate::{
    assets::pixels::{PixelBuffer, image_to_rgba8},
    foundation::error::{LayerError, LayerResult},
};

/// Still-image decoder used by the image layers for deferred path assets.
pub trait ImageCodec: Send + Sync {
    fn decode_path(&self, path: &Path) -> LayerResult<PixelBuffer>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCrateCodec;

impl ImageCodec for ImageCrateCodec {
    fn decode_path(&self, path: &Path) -> LayerResult<PixelBuffer> {
        decode_image_file(path)
    }
}

pub fn decode_image(bytes: &[u8]) -> LayerResult<PixelBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(image_to_rgba8(&dyn_img))
}

#[tracing::instrument]
pub fn decode_image_file(path: &Path) -> LayerResult<PixelBuffer> {
    if !path.exists() {
        return Err(LayerError::asset_not_found(path));
    }
    let dyn_img =
        image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    let buf = image_to_rgba8(&dyn_img);
    tracing::debug!(width = buf.width(), height = buf.height(), "decoded image");
    Ok(buf)
}
