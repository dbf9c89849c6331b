//! Mosaic is a lockstep multi-lane video pipeline.
//!
//! N decode lanes each turn a stream of access units into pictures. A single compositor collects
//! exactly one picture per lane per cycle, places them on a scene graph, and produces one output
//! picture per cycle at a fixed target rate. Output fans out to a display and an encoder, and the
//! encoder's packets drain into a byte sink.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: `CodedSource -> Decoder -> Mailbox<Picture>` per lane (blocking handoff)
//! 2. **Fence + compose**: one picture from every lane, bound to items, drawn into a ring buffer
//! 3. **Fan out**: latest-wins handoff to display and encode, so a slow consumer never stalls
//!    composition
//! 4. **Encode + sink**: packets appended to a [`ByteSink`] in emission order
//!
//! Engines (decoders, encoders, compositors, displays) are looked up by tag in the registries of
//! a [`PipelineContext`]; the built-in software engines make the whole pipeline runnable without
//! hardware.
#![forbid(unsafe_code)]

pub mod codec;
pub mod compose;
pub mod config;
pub mod context;
pub mod display;
pub mod foundation;
pub mod media;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod sync;

pub use codec::registry::Registry;
pub use codec::{
    Decoder, DecoderSettings, Encoder, EncoderParams, EncoderSettings, EngineState, KNOWN_CODECS,
    Packet, RateControlMode,
};
pub use compose::{CompositorParams, CompositorSettings, SceneCompositor};
pub use config::{
    CompositorConfig, DisplayConfig, EncoderConfig, LaneConfig, MIN_POLL_QUANTUM, PipelineConfig,
    TimingConfig,
};
pub use context::PipelineContext;
pub use display::{DisplaySettings, DisplaySurface};
pub use foundation::core::{Dimensions, Fps, PixelFormat, Rect, grid_placement};
pub use foundation::error::{PipelineError, PipelineResult};
pub use media::access_unit::AccessUnit;
pub use media::picture::{BufferBackend, Picture, PictureInfo, PixelBuffer};
pub use pipeline::{LaneReport, Pipeline, RunReport};
pub use sink::{ByteSink, FileSink, MemorySink};
pub use source::{CodedSource, FrameChunkSource, VecSource};
pub use sync::{Mailbox, MailboxPolicy, ShutdownSignal};
