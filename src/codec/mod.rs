//! Decoder and encoder engine contracts.
//!
//! Lifecycle calls (`init`, `start`, `stop`, `uninit`, `set_params`) take `&mut self` and are made
//! by the orchestrator while it has exclusive access. Data-plane calls (`push`, `pop`, `can_pop`)
//! take `&self`: a lane's feed worker and drain worker call them concurrently.

pub mod params;
pub mod raw;
pub mod registry;

use crate::foundation::error::PipelineResult;
use crate::media::access_unit::AccessUnit;
use crate::media::picture::{BufferBackend, Picture, PictureInfo};

pub use params::{EncoderParams, RateControlMode};

/// Codec tags the configuration layer understands. Only those with a registered factory can be
/// instantiated.
pub const KNOWN_CODECS: &[&str] = &["h264", "hevc", "vp8", "vp9", "av1", "raw"];

/// Engine lifecycle position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Idle,
    Initialized,
    Running,
    Stopped,
}

/// Construction input for a decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderSettings {
    pub lane: usize,
    pub codec: String,
    /// Geometry and layout of the pictures this decoder emits.
    pub output: PictureInfo,
    pub buffer_backend: BufferBackend,
    /// Decoded pictures the engine may hold before it stops accepting input.
    pub queue_depth: usize,
}

/// Construction input for an encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderSettings {
    pub codec: String,
    /// Geometry and layout of the pictures this encoder accepts.
    pub input: PictureInfo,
}

/// One encoded output unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub data: Vec<u8>,
    /// Sequence number of the picture it encodes.
    pub sequence: u64,
    pub keyframe: bool,
}

pub trait Decoder: Send + Sync {
    fn name(&self) -> &str;
    fn init(&mut self) -> PipelineResult<()>;
    fn start(&mut self) -> PipelineResult<()>;
    fn stop(&mut self) -> PipelineResult<()>;
    fn uninit(&mut self) -> PipelineResult<()>;

    /// `false` while the engine's queue is full; the feed waits before the next `push`.
    fn can_push(&self) -> bool {
        true
    }
    /// Submit one access unit. Ownership moves to the decoder.
    fn push(&self, unit: AccessUnit) -> PipelineResult<()>;
    /// Next decoded picture, or `None` when nothing is ready yet.
    fn pop(&self) -> Option<Picture>;
    fn can_pop(&self) -> bool;
}

pub trait Encoder: Send + Sync {
    fn name(&self) -> &str;
    /// Must be called before [`Encoder::init`].
    fn set_params(&mut self, params: EncoderParams) -> PipelineResult<()>;
    fn init(&mut self) -> PipelineResult<()>;
    fn start(&mut self) -> PipelineResult<()>;
    fn stop(&mut self) -> PipelineResult<()>;
    fn uninit(&mut self) -> PipelineResult<()>;

    fn push(&self, picture: Picture) -> PipelineResult<()>;
    fn pop(&self) -> Option<Packet>;
    fn can_pop(&self) -> bool;
}
