use std::sync::Arc;

use crate::foundation::{
    core::PixelSize,
    error::{LayerError, LayerResult},
};

/// Decoded frame: straight (non-premultiplied) RGBA8, row-major, tightly packed.
///
/// Logically a `(height, width, 4)` array. Every buffer handed out by a layer has
/// exactly four channels; see [`to_rgba8`] and [`image_to_rgba8`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    size: PixelSize,
    rgba8: Arc<Vec<u8>>,
}

impl PixelBuffer {
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> LayerResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                LayerError::invalid_shape(format!("RGBA8 buffer of {width}x{height} is too large"))
            })?;
        if rgba8.len() != expected {
            return Err(LayerError::invalid_shape(format!(
                "RGBA8 buffer of {width}x{height} needs {expected} bytes, got {}",
                rgba8.len()
            )));
        }
        Ok(Self {
            size: PixelSize::new(width, height),
            rgba8: Arc::new(rgba8),
        })
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// `(height, width, channels)`.
    pub fn shape(&self) -> [usize; 3] {
        [self.size.height as usize, self.size.width as usize, 4]
    }

    pub fn as_raw(&self) -> &[u8] {
        self.rgba8.as_slice()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let off = (y as usize * self.size.width as usize + x as usize) * 4;
        let px = &self.rgba8[off..off + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Whether both buffers share the same backing allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rgba8, &other.rgba8)
    }
}

/// Sample storage of a caller-supplied raw array.
#[derive(Clone, Debug, PartialEq)]
pub enum RawSamples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl RawSamples {
    fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    fn dtype(&self) -> &'static str {
        match self {
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::F32(_) => "f32",
        }
    }
}

/// Raw row-major array with an explicit shape: `(H, W)` grayscale or `(H, W, C)`.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPixels {
    pub shape: Vec<usize>,
    pub samples: RawSamples,
}

impl RawPixels {
    pub fn gray8(width: u32, height: u32, samples: Vec<u8>) -> Self {
        Self {
            shape: vec![height as usize, width as usize],
            samples: RawSamples::U8(samples),
        }
    }

    pub fn rgba8(width: u32, height: u32, samples: Vec<u8>) -> Self {
        Self {
            shape: vec![height as usize, width as usize, 4],
            samples: RawSamples::U8(samples),
        }
    }
}

/// Normalize a raw array into an RGBA8 [`PixelBuffer`].
///
/// Grayscale `(H, W)` input is replicated into R, G and B with alpha 255.
/// `(H, W, C)` input must already carry four channels.
pub fn to_rgba8(raw: RawPixels) -> LayerResult<PixelBuffer> {
    let (h, w) = match raw.shape.as_slice() {
        [h, w] => (*h, *w),
        [h, w, 4] => (*h, *w),
        [_, _, c] => {
            return Err(LayerError::invalid_shape(format!(
                "image must have 4 channels (RGBA), got {c}"
            )));
        }
        other => {
            return Err(LayerError::invalid_shape(format!(
                "expected a rank 2 or 3 array, got shape {other:?}"
            )));
        }
    };

    let expected = raw
        .shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| {
            LayerError::invalid_shape(format!("shape {:?} overflows the sample count", raw.shape))
        })?;
    if raw.samples.len() != expected {
        return Err(LayerError::invalid_shape(format!(
            "shape {:?} needs {expected} samples, got {}",
            raw.shape,
            raw.samples.len()
        )));
    }

    let (width, height) = match (u32::try_from(w), u32::try_from(h)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(LayerError::invalid_shape(format!(
                "shape {:?} exceeds u32 dimensions",
                raw.shape
            )));
        }
    };

    let samples = match raw.samples {
        RawSamples::U8(samples) => samples,
        other => {
            return Err(LayerError::invalid_input(format!(
                "raw arrays must be 8-bit, got {}",
                other.dtype()
            )));
        }
    };

    if raw.shape.len() == 3 {
        return PixelBuffer::from_rgba8(width, height, samples);
    }

    let mut rgba = Vec::with_capacity(samples.len() * 4);
    for g in samples {
        rgba.extend_from_slice(&[g, g, g, 255]);
    }
    PixelBuffer::from_rgba8(width, height, rgba)
}

/// Normalize a decoded image of any color type into an RGBA8 [`PixelBuffer`].
pub fn image_to_rgba8(img: &image::DynamicImage) -> PixelBuffer {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer {
        size: PixelSize::new(width, height),
        rgba8: Arc::new(rgba.into_raw()),
    }
}
