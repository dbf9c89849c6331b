use crate::foundation::error::{PipelineError, PipelineResult};

/// Encoder rate-control strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateControlMode {
    /// Variable bitrate.
    Vbr,
    /// Constant bitrate.
    #[default]
    Cbr,
    /// Fixed quantizer; the bitrate is ignored.
    FixQp,
    /// Adaptive variable bitrate.
    Avbr,
}

impl RateControlMode {
    pub const ALL: [Self; 4] = [Self::Vbr, Self::Cbr, Self::FixQp, Self::Avbr];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vbr => "vbr",
            Self::Cbr => "cbr",
            Self::FixQp => "fixqp",
            Self::Avbr => "avbr",
        }
    }
}

impl std::fmt::Display for RateControlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default target bitrate: 4 MiB/s.
pub const DEFAULT_BITRATE_BPS: u32 = 4 * 1024 * 1024;
/// Default keyframe interval in frames.
pub const DEFAULT_GOP: u32 = 60;

/// Encoder tuning, applied with `Encoder::set_params` before `init`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncoderParams {
    pub rc_mode: RateControlMode,
    /// Target bitrate in bits per second.
    pub bitrate_bps: u32,
    /// Keyframe interval in frames.
    pub gop: u32,
    /// Quantizer for [`RateControlMode::FixQp`].
    pub qp: u8,
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self {
            rc_mode: RateControlMode::default(),
            bitrate_bps: DEFAULT_BITRATE_BPS,
            gop: DEFAULT_GOP,
            qp: 26,
        }
    }
}

impl EncoderParams {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.gop == 0 {
            return Err(PipelineError::validation("encoder gop must be >= 1"));
        }
        if self.rc_mode != RateControlMode::FixQp && self.bitrate_bps == 0 {
            return Err(PipelineError::validation(format!(
                "encoder bitrate must be > 0 in {} mode",
                self.rc_mode
            )));
        }
        if self.qp > 51 {
            return Err(PipelineError::validation(format!(
                "encoder qp must be within 0..=51 (got {})",
                self.qp
            )));
        }
        Ok(())
    }
}
