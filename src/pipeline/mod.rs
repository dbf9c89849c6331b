//! The fixed-topology pipeline: N decode lanes, a rate-paced compositor, display and encode.
//!
//! Thread layout per run, all scoped to [`Pipeline::run`]: a feed and a drain worker per decode
//! lane, one compositor, one display, and a feed and a drain worker around the encoder. Every
//! cross-stage handoff is a [`crate::sync::Mailbox`]; every blocking wait is released by the
//! run's shutdown signal.

pub mod compositor_stage;
pub mod decode_lane;
pub mod display_lane;
pub mod encode_lane;
pub mod fence;
pub mod monitor;
pub mod orchestrator;
pub mod pacer;
pub mod stats;

pub use orchestrator::Pipeline;
pub use stats::{LaneReport, RunReport};
