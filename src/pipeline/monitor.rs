use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::foundation::error::PipelineError;
use crate::sync::shutdown::ShutdownSignal;

/// Worker identity, also used as its thread name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageId {
    DecodeFeed(usize),
    DecodeDrain(usize),
    Compositor,
    Display,
    EncodeFeed,
    EncodeDrain,
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeFeed(i) => write!(f, "decode-feed[{i}]"),
            Self::DecodeDrain(i) => write!(f, "decode-drain[{i}]"),
            Self::Compositor => f.write_str("compositor"),
            Self::Display => f.write_str("display"),
            Self::EncodeFeed => f.write_str("encode-feed"),
            Self::EncodeDrain => f.write_str("encode-drain"),
        }
    }
}

#[derive(Default)]
struct State {
    live: usize,
    eos: usize,
    error: Option<PipelineError>,
}

/// Shared run bookkeeping: live workers, lanes at end-of-stream, and the first failure.
///
/// The orchestrator parks on it while the workers run; every change wakes it.
pub struct Monitor {
    shutdown: ShutdownSignal,
    lanes: usize,
    state: Mutex<State>,
    changed: Condvar,
}

impl Monitor {
    pub fn new(shutdown: ShutdownSignal, lanes: usize) -> Self {
        Self {
            shutdown,
            lanes,
            state: Mutex::new(State::default()),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Count a worker as live until the returned guard drops.
    pub fn enter(&self, stage: StageId) -> StageGuard<'_> {
        self.lock().live += 1;
        StageGuard {
            monitor: self,
            stage,
        }
    }

    /// Record that `lane` reached end-of-stream. Returns how many lanes have.
    pub fn lane_finished(&self, lane: usize) -> usize {
        let mut state = self.lock();
        state.eos += 1;
        let eos = state.eos;
        self.changed.notify_all();
        drop(state);
        tracing::debug!(lane, eos, lanes = self.lanes, "lane reached end of stream");
        if eos == self.lanes {
            tracing::info!("all lanes reached end of stream");
        }
        eos
    }

    pub fn all_lanes_finished(&self) -> bool {
        self.lock().eos >= self.lanes
    }

    /// Report a fatal stage failure and start shutting the pipeline down. Only the first failure
    /// is kept.
    pub fn fail(&self, stage: StageId, err: PipelineError) {
        tracing::error!(%stage, error = %err, "stage failed");
        {
            let mut state = self.lock();
            if state.error.is_none() {
                state.error = Some(err);
            }
            self.changed.notify_all();
        }
        self.shutdown.trigger();
    }

    pub fn has_failed(&self) -> bool {
        self.lock().error.is_some()
    }

    pub fn take_error(&self) -> Option<PipelineError> {
        self.lock().error.take()
    }

    pub fn live(&self) -> usize {
        self.lock().live
    }

    /// Block until every lane hit end-of-stream, a stage failed, shutdown fired, or no worker is
    /// left.
    pub fn wait_for_end_of_stream(&self) {
        let mut state = self.lock();
        while state.eos < self.lanes
            && state.error.is_none()
            && state.live > 0
            && !self.shutdown.is_triggered()
        {
            state = self
                .changed
                .wait_timeout(state, Duration::from_millis(50))
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Wait up to `timeout` for every worker to exit on its own. Returns `false` on timeout.
    pub fn wait_for_quiescence(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while state.live > 0 && state.error.is_none() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .changed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    fn stage_exited(&self, stage: StageId) {
        let mut state = self.lock();
        state.live = state.live.saturating_sub(1);
        self.changed.notify_all();
        tracing::debug!(%stage, live = state.live, "stage exited");
    }
}

/// Marks a worker as exited when dropped, recording a failure if it unwinds.
pub struct StageGuard<'m> {
    monitor: &'m Monitor,
    stage: StageId,
}

impl StageGuard<'_> {
    pub fn stage(&self) -> StageId {
        self.stage
    }

    pub fn monitor(&self) -> &Monitor {
        self.monitor
    }
}

impl Drop for StageGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.monitor.fail(
                self.stage,
                PipelineError::engine(format!("{} panicked", self.stage)),
            );
        }
        self.monitor.stage_exited(self.stage);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/monitor.rs"]
mod tests;
