use crate::foundation::error::{LayerError, LayerResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> LayerResult<Self> {
        if den == 0 {
            return Err(LayerError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(LayerError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Truncating conversion; never rounds to the nearest frame.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

/// Pixel dimensions as `(width, height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl From<PixelSize> for (u32, u32) {
    fn from(s: PixelSize) -> Self {
        (s.width, s.height)
    }
}

/// Half-open time interval `[start, end)` in seconds.
///
/// Bounds may be infinite, so `[t, inf)` holds forever. An interval with
/// `start >= end` is empty and contains no time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64, // exclusive
}

impl Interval {
    pub fn new(start: f64, end: f64) -> LayerResult<Self> {
        if start.is_nan() || end.is_nan() {
            return Err(LayerError::validation(format!(
                "interval bounds must not be NaN (got [{start}, {end}))"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }
}
