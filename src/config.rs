use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::codec::EncoderParams;
use crate::compose::scene::{CompositorParams, TextureFlags};
use crate::foundation::core::{
    Dimensions, Fps, PixelFormat, Rect, grid_placement, validate_placement,
};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::media::picture::{BufferBackend, PictureInfo};

/// Floor for every poll sleep in the pipeline.
///
/// Drain workers and the cycle fence poll non-blocking engine calls; this bounds their CPU cost
/// at the price of up to one quantum of added latency per poll.
pub const MIN_POLL_QUANTUM: Duration = Duration::from_micros(50);

/// Decoded pictures a lane's decoder may hold by default.
pub const DEFAULT_DECODER_QUEUE: usize = 4;

/// Full description of one pipeline run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub lanes: Vec<LaneConfig>,
    pub compositor: CompositorConfig,
    pub encoder: EncoderConfig,
    pub display: DisplayConfig,
    pub timing: TimingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lanes: vec![LaneConfig::default()],
            compositor: CompositorConfig::default(),
            encoder: EncoderConfig::default(),
            display: DisplayConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// One decode lane.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaneConfig {
    /// Codec tag resolved through the decoder registry.
    pub decoder: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub bit_depth: u8,
    pub buffer_backend: BufferBackend,
    /// Normalized output rectangle; grid cell by lane index when absent.
    pub placement: Option<Rect>,
    /// Decoded pictures the decoder may hold before the feed waits.
    pub decoder_queue: usize,
    /// Access units submitted but not yet drained before the feed worker waits. Unbounded when
    /// absent.
    pub max_in_flight: Option<usize>,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            decoder: "raw".to_owned(),
            width: 1920,
            height: 1080,
            format: PixelFormat::Nv12,
            bit_depth: 8,
            buffer_backend: BufferBackend::Shareable,
            placement: None,
            decoder_queue: DEFAULT_DECODER_QUEUE,
            max_in_flight: None,
        }
    }
}

impl LaneConfig {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn picture_info(&self) -> PictureInfo {
        PictureInfo::new(self.dimensions(), self.format, self.bit_depth)
    }

    /// Size of one raw access unit for this lane.
    pub fn frame_bytes(&self) -> usize {
        self.picture_info().frame_bytes()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorConfig {
    pub backend: String,
    pub width: u32,
    pub height: u32,
    pub buffer_count: usize,
    pub fps: Fps,
    pub buffer_backend: BufferBackend,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        let params = CompositorParams::default();
        Self {
            backend: "software".to_owned(),
            width: params.dimensions.width,
            height: params.dimensions.height,
            buffer_count: params.buffer_count,
            fps: Fps::default(),
            buffer_backend: BufferBackend::Shareable,
        }
    }
}

impl CompositorConfig {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn params(&self) -> CompositorParams {
        CompositorParams {
            dimensions: self.dimensions(),
            buffer_count: self.buffer_count,
            texture_format: PixelFormat::Nv12,
            flags: TextureFlags::default(),
        }
    }

    pub fn output_info(&self) -> PictureInfo {
        PictureInfo::nv12(self.dimensions())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Codec tag resolved through the encoder registry.
    pub codec: String,
    #[serde(flatten)]
    pub params: EncoderParams,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            codec: "raw".to_owned(),
            params: EncoderParams::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub enabled: bool,
    /// Backend tag; `None` or empty tries the registered backends in order.
    pub backend: Option<String>,
    pub snapshot_path: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: None,
            snapshot_path: None,
        }
    }
}

/// Poll and drain timings, all in wall-clock units.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Sleep between empty decoder/encoder polls.
    pub drain_poll_us: u64,
    /// Sleep between fence sweeps that found a lane unsatisfied.
    pub fence_poll_us: u64,
    /// How long stages may take to finish on their own after every lane hit end-of-stream.
    pub drain_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            drain_poll_us: 200,
            fence_poll_us: 1000,
            drain_timeout_ms: 5000,
        }
    }
}

impl TimingConfig {
    pub fn drain_poll(&self) -> Duration {
        Duration::from_micros(self.drain_poll_us).max(MIN_POLL_QUANTUM)
    }

    pub fn fence_poll(&self) -> Duration {
        Duration::from_micros(self.fence_poll_us).max(MIN_POLL_QUANTUM)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl PipelineConfig {
    /// Default configuration with `count` identical lanes.
    pub fn with_lanes(count: usize, lane: LaneConfig) -> Self {
        Self {
            lanes: vec![lane; count],
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> PipelineResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| PipelineError::serde(format!("pipeline config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::validation(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Placement of lane `index`: explicit, else its grid cell.
    pub fn placement_for(&self, index: usize) -> Rect {
        self.lanes
            .get(index)
            .and_then(|l| l.placement)
            .unwrap_or_else(|| grid_placement(index, self.lanes.len()))
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.lanes.is_empty() {
            return Err(PipelineError::validation("at least one lane is required"));
        }
        for (i, lane) in self.lanes.iter().enumerate() {
            let what = format!("lane {i}");
            if lane.decoder.trim().is_empty() {
                return Err(PipelineError::validation(format!(
                    "{what} decoder tag must be non-empty"
                )));
            }
            lane.picture_info().validate(&what)?;
            if lane.decoder_queue == 0 {
                return Err(PipelineError::validation(format!(
                    "{what} decoder_queue must be >= 1"
                )));
            }
            if lane.max_in_flight == Some(0) {
                return Err(PipelineError::validation(format!(
                    "{what} max_in_flight must be >= 1"
                )));
            }
            if let Some(rect) = lane.placement {
                validate_placement(rect)?;
            }
        }

        self.compositor.fps.validate()?;
        self.compositor.params().validate()?;
        if self.encoder.codec.trim().is_empty() {
            return Err(PipelineError::validation("encoder codec must be non-empty"));
        }
        self.encoder.params.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
