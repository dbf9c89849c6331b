use std::fmt;
use std::time::Duration;

use crate::foundation::error::{PipelineError, PipelineResult};

pub use kurbo::{Point, Rect, Size};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> PipelineResult<Self> {
        let fps = Self { num, den };
        fps.validate()?;
        Ok(fps)
    }

    /// Validate a value that did not go through [`Fps::new`] (e.g. deserialized config).
    pub fn validate(self) -> PipelineResult<()> {
        if self.den == 0 {
            return Err(PipelineError::validation("Fps den must be > 0"));
        }
        if self.num == 0 {
            return Err(PipelineError::validation("Fps num must be > 0"));
        }
        Ok(())
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Wall-clock budget of one cycle at this rate.
    pub fn frame_interval(self) -> Duration {
        if self.num == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(self.den) * 1_000_000_000 / u128::from(self.num);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Picture dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// 4:2:0 layouts need non-zero, even dimensions.
    pub fn validate_even(self, what: &str) -> PipelineResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::validation(format!(
                "{what} dimensions must be non-zero (got {self})"
            )));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(PipelineError::validation(format!(
                "{what} dimensions must be even (got {self})"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel layouts understood by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Y plane followed by one interleaved UV plane at half resolution.
    Nv12,
    /// Y, U and V planes, chroma at half resolution.
    Yuv420p,
    /// Packed 4-byte RGBA.
    Rgba8,
}

impl PixelFormat {
    pub fn is_yuv420(self) -> bool {
        matches!(self, Self::Nv12 | Self::Yuv420p)
    }

    /// Bytes needed for one tightly packed picture.
    pub fn frame_bytes(self, dims: Dimensions, bit_depth: u8) -> usize {
        let sample_bytes = usize::from(bit_depth.div_ceil(8).max(1));
        let samples = match self {
            Self::Nv12 | Self::Yuv420p => dims.area().saturating_mul(3) / 2,
            Self::Rgba8 => dims.area().saturating_mul(4),
        };
        samples.saturating_mul(sample_bytes)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Nv12 => "nv12",
            Self::Yuv420p => "yuv420p",
            Self::Rgba8 => "rgba8",
        };
        f.write_str(s)
    }
}

/// Check that `rect` is a non-empty rectangle inside `[0,1]x[0,1]`.
pub fn validate_placement(rect: Rect) -> PipelineResult<()> {
    let coords = [rect.x0, rect.y0, rect.x1, rect.y1];
    if coords.iter().any(|c| !c.is_finite() || *c < 0.0 || *c > 1.0) {
        return Err(PipelineError::validation(format!(
            "placement {rect:?} must lie within [0,1]x[0,1]"
        )));
    }
    if rect.x1 <= rect.x0 || rect.y1 <= rect.y0 {
        return Err(PipelineError::validation(format!(
            "placement {rect:?} must have a positive extent"
        )));
    }
    Ok(())
}

/// Row-major grid cell for item `index` of `count`, with `ceil(sqrt(count))` columns.
pub fn grid_placement(index: usize, count: usize) -> Rect {
    let count = count.max(1);
    let mut cols = 1usize;
    while cols * cols < count {
        cols += 1;
    }
    let rows = count.div_ceil(cols);
    let (col, row) = (index % cols, index / cols);
    let (w, h) = (1.0 / cols as f64, 1.0 / rows as f64);
    Rect::new(
        col as f64 * w,
        row as f64 * h,
        ((col + 1) as f64 * w).min(1.0),
        ((row + 1) as f64 * h).min(1.0),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
