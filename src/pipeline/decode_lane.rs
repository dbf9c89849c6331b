use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::codec::Decoder;
use crate::media::picture::Picture;
use crate::pipeline::monitor::{Monitor, StageId};
use crate::pipeline::stats::LaneReport;
use crate::source::CodedSource;
use crate::sync::mailbox::{Mailbox, PutError};

/// Lane lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LaneStatus {
    #[default]
    Idle,
    Running,
    /// Feed reached end-of-stream; the drain is emptying the decoder.
    Draining,
    Stopped,
}

/// Bookkeeping shared by a lane's feed and drain workers.
#[derive(Debug, Default)]
pub struct LaneState {
    index: usize,
    status: Mutex<LaneStatus>,
    eos: AtomicBool,
    exhausted: AtomicBool,
    pushed: AtomicU64,
    decoded: AtomicU64,
}

impl LaneState {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn status(&self) -> LaneStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_status(&self, status: LaneStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    pub fn is_eos(&self) -> bool {
        self.eos.load(Ordering::Acquire)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }

    pub fn pushed(&self) -> u64 {
        self.pushed.load(Ordering::Relaxed)
    }

    pub fn decoded(&self) -> u64 {
        self.decoded.load(Ordering::Relaxed)
    }

    /// Units submitted to the decoder whose pictures have not been popped yet.
    pub fn in_flight(&self) -> u64 {
        self.pushed().saturating_sub(self.decoded())
    }

    pub fn report(&self) -> LaneReport {
        LaneReport {
            lane: self.index,
            units_pushed: self.pushed(),
            pictures_decoded: self.decoded(),
            exhausted: self.is_exhausted(),
        }
    }
}

/// Everything a lane's two workers share.
#[derive(Clone, Copy)]
pub struct DecodeLane<'a> {
    pub state: &'a LaneState,
    pub decoder: &'a dyn Decoder,
    pub mailbox: &'a Mailbox<Picture>,
    pub monitor: &'a Monitor,
    pub poll: Duration,
    /// Throttle the feed once this many units are in flight; unbounded when `None`.
    pub max_in_flight: Option<usize>,
}

impl DecodeLane<'_> {
    fn stopping(&self) -> bool {
        self.monitor.shutdown().is_triggered() || self.mailbox.is_abandoned()
    }

    /// Feed worker: submit every access unit in order, then mark end-of-stream.
    ///
    /// Waits while the decoder's queue is full, so a lane never reads further ahead of the
    /// compositor than its decoder queue and mailbox allow. Also stops early on shutdown, a source or push failure, or when the compositor stopped
    /// consuming this lane.
    pub fn run_feed(&self, source: &mut dyn CodedSource) {
        let lane = self.state.index;
        let stage = StageId::DecodeFeed(lane);
        tracing::info!(lane, source = %source.describe(), "decode feed started");

        loop {
            if self.stopping() {
                tracing::debug!(lane, "decode feed stopping early");
                break;
            }
            let throttled = self
                .max_in_flight
                .is_some_and(|limit| self.state.in_flight() >= limit as u64);
            if throttled || !self.decoder.can_push() {
                std::thread::sleep(self.poll);
                continue;
            }
            match source.next_unit() {
                Ok(Some(unit)) => {
                    if let Err(e) = self.decoder.push(unit) {
                        self.monitor.fail(stage, e);
                        break;
                    }
                    self.state.pushed.fetch_add(1, Ordering::Relaxed);
                }
                Ok(None) => break,
                Err(e) => {
                    self.monitor.fail(stage, e);
                    break;
                }
            }
        }

        self.state.eos.store(true, Ordering::Release);
        self.state.set_status(LaneStatus::Draining);
        self.monitor.lane_finished(lane);
        tracing::info!(lane, pushed = self.state.pushed(), "decode feed finished");
    }

    /// Drain worker: move decoded pictures into the lane mailbox until the lane is exhausted.
    pub fn run_drain(&self) {
        let lane = self.state.index;
        tracing::info!(lane, "decode drain started");

        loop {
            if self.monitor.shutdown().is_triggered() {
                break;
            }
            if let Some(picture) = self.decoder.pop() {
                self.state.decoded.fetch_add(1, Ordering::Relaxed);
                match self.mailbox.put(picture) {
                    Ok(_) => continue,
                    Err(PutError::Abandoned(_)) => {
                        tracing::debug!(lane, "compositor no longer consumes this lane");
                        break;
                    }
                    Err(PutError::Shutdown(_) | PutError::Finished(_)) => break,
                }
            }
            // eos first: once it is visible, every push it covers is visible to can_pop.
            if self.state.is_eos() && !self.decoder.can_pop() {
                self.state.exhausted.store(true, Ordering::Release);
                break;
            }
            std::thread::sleep(self.poll);
        }

        self.mailbox.finish();
        self.state.set_status(LaneStatus::Stopped);
        tracing::info!(
            lane,
            decoded = self.state.decoded(),
            exhausted = self.state.is_exhausted(),
            "decode drain finished"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/decode_lane.rs"]
mod tests;
