//! Software passthrough engines for uncompressed frames.
//!
//! `RawDecoder` treats every access unit as one tightly packed picture; `RawEncoder` emits each
//! picture's bytes as one packet. Together they make the pipeline runnable without codec
//! hardware, and a single-lane full-frame run reproduces its input byte for byte.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::codec::{
    Decoder, DecoderSettings, Encoder, EncoderParams, EncoderSettings, EngineState, Packet,
};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::media::access_unit::AccessUnit;
use crate::media::picture::Picture;

pub const RAW_CODEC: &str = "raw";

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct RawDecoder {
    name: String,
    settings: DecoderSettings,
    state: EngineState,
    ready: Mutex<VecDeque<Picture>>,
    decoded: AtomicU64,
}

impl RawDecoder {
    pub fn new(settings: &DecoderSettings) -> PipelineResult<Self> {
        settings
            .output
            .validate(&format!("decoder[{}] output", settings.lane))?;
        if settings.queue_depth == 0 {
            return Err(PipelineError::validation(format!(
                "decoder[{}] queue depth must be >= 1",
                settings.lane
            )));
        }
        Ok(Self {
            name: format!("raw-decoder[{}]", settings.lane),
            settings: settings.clone(),
            state: EngineState::Idle,
            ready: Mutex::new(VecDeque::with_capacity(settings.queue_depth)),
            decoded: AtomicU64::new(0),
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn decoded(&self) -> u64 {
        self.decoded.load(Ordering::Relaxed)
    }

    fn transition(&mut self, from: EngineState, to: EngineState) -> PipelineResult<()> {
        if self.state != from {
            return Err(PipelineError::engine(format!(
                "{}: cannot go {to:?} from {:?}",
                self.name, self.state
            )));
        }
        self.state = to;
        Ok(())
    }
}

impl Decoder for RawDecoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self) -> PipelineResult<()> {
        if self.settings.output.bit_depth != 8 {
            return Err(PipelineError::fatal_init(
                &self.name,
                format!(
                    "only 8-bit pictures are supported (got {}bit)",
                    self.settings.output.bit_depth
                ),
            ));
        }
        self.transition(EngineState::Idle, EngineState::Initialized)
    }

    fn start(&mut self) -> PipelineResult<()> {
        self.transition(EngineState::Initialized, EngineState::Running)
    }

    fn stop(&mut self) -> PipelineResult<()> {
        if self.state == EngineState::Running {
            self.state = EngineState::Stopped;
        }
        Ok(())
    }

    fn uninit(&mut self) -> PipelineResult<()> {
        lock(&self.ready).clear();
        self.state = EngineState::Idle;
        Ok(())
    }

    fn push(&self, unit: AccessUnit) -> PipelineResult<()> {
        if self.state != EngineState::Running {
            return Err(PipelineError::engine(format!(
                "{}: push while {:?}",
                self.name, self.state
            )));
        }
        let expected = self.settings.output.frame_bytes();
        if unit.len() != expected {
            return Err(PipelineError::engine(format!(
                "{}: access unit {} holds {} bytes, a {} frame needs {expected}",
                self.name,
                unit.index(),
                unit.len(),
                self.settings.output
            )));
        }
        let mut ready = lock(&self.ready);
        if ready.len() >= self.settings.queue_depth {
            return Err(PipelineError::engine(format!(
                "{}: queue full ({} pictures), access unit {} rejected",
                self.name,
                ready.len(),
                unit.index()
            )));
        }
        ready.push_back(Picture::from_bytes(
            self.settings.output,
            unit.index(),
            self.settings.buffer_backend,
            unit.data().to_vec(),
        )?);
        drop(ready);
        self.decoded.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn can_push(&self) -> bool {
        lock(&self.ready).len() < self.settings.queue_depth
    }

    fn pop(&self) -> Option<Picture> {
        lock(&self.ready).pop_front()
    }

    fn can_pop(&self) -> bool {
        !lock(&self.ready).is_empty()
    }
}

#[derive(Debug)]
pub struct RawEncoder {
    settings: EncoderSettings,
    params: Option<EncoderParams>,
    state: EngineState,
    out: Mutex<VecDeque<Packet>>,
    frames: AtomicU64,
}

impl RawEncoder {
    pub fn new(settings: &EncoderSettings) -> PipelineResult<Self> {
        settings.input.validate("encoder input")?;
        Ok(Self {
            settings: settings.clone(),
            params: None,
            state: EngineState::Idle,
            out: Mutex::new(VecDeque::new()),
            frames: AtomicU64::new(0),
        })
    }

    pub fn params(&self) -> Option<&EncoderParams> {
        self.params.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

impl Encoder for RawEncoder {
    fn name(&self) -> &str {
        "raw-encoder"
    }

    fn set_params(&mut self, params: EncoderParams) -> PipelineResult<()> {
        if self.state != EngineState::Idle {
            return Err(PipelineError::validation(
                "encoder parameters must be set before init",
            ));
        }
        params.validate()?;
        self.params = Some(params);
        Ok(())
    }

    fn init(&mut self) -> PipelineResult<()> {
        if self.params.is_none() {
            return Err(PipelineError::validation(
                "encoder parameters were never set",
            ));
        }
        if self.state != EngineState::Idle {
            return Err(PipelineError::engine("encoder is already initialized"));
        }
        self.state = EngineState::Initialized;
        Ok(())
    }

    fn start(&mut self) -> PipelineResult<()> {
        if self.state != EngineState::Initialized {
            return Err(PipelineError::engine(format!(
                "encoder cannot start from {:?}",
                self.state
            )));
        }
        self.state = EngineState::Running;
        Ok(())
    }

    fn stop(&mut self) -> PipelineResult<()> {
        if self.state == EngineState::Running {
            self.state = EngineState::Stopped;
        }
        Ok(())
    }

    fn uninit(&mut self) -> PipelineResult<()> {
        lock(&self.out).clear();
        self.state = EngineState::Idle;
        Ok(())
    }

    fn push(&self, picture: Picture) -> PipelineResult<()> {
        let Some(params) = self.params.filter(|_| self.state == EngineState::Running) else {
            return Err(PipelineError::engine(format!(
                "encoder push while {:?}",
                self.state
            )));
        };
        let input = self.settings.input;
        picture.ensure_format("encoder", input.format)?;
        if picture.dimensions() != input.dimensions {
            return Err(PipelineError::format_mismatch(
                "encoder",
                input.dimensions,
                picture.dimensions(),
            ));
        }
        let frame = self.frames.fetch_add(1, Ordering::Relaxed);
        let packet = Packet {
            data: picture.data().to_vec(),
            sequence: picture.sequence(),
            keyframe: frame % u64::from(params.gop) == 0,
        };
        lock(&self.out).push_back(packet);
        Ok(())
    }

    fn pop(&self) -> Option<Packet> {
        lock(&self.out).pop_front()
    }

    fn can_pop(&self) -> bool {
        !lock(&self.out).is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/raw.rs"]
mod tests;
