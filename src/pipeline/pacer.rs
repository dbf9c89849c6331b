use std::time::{Duration, Instant};

use crate::foundation::core::Fps;
use crate::sync::shutdown::ShutdownSignal;

/// Longest uninterrupted sleep; shutdown is re-checked in between.
const SLEEP_SLICE: Duration = Duration::from_millis(5);

/// What pacing did at the end of a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pace {
    OnTime { slept: Duration },
    /// The cycle's work took longer than the interval; no sleep, no catch-up.
    Behind { overrun: Duration },
}

/// Fixed-rate cycle pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    pub fn new(fps: Fps) -> Self {
        Self {
            interval: fps.frame_interval(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Decide how to finish a cycle whose work took `elapsed`.
    pub fn plan(&self, elapsed: Duration) -> Pace {
        if elapsed > self.interval {
            Pace::Behind {
                overrun: elapsed - self.interval,
            }
        } else {
            Pace::OnTime {
                slept: self.interval - elapsed,
            }
        }
    }

    /// Sleep out the rest of the cycle that started at `cycle_start`, waking early on shutdown.
    pub fn pace(&self, cycle_start: Instant, shutdown: &ShutdownSignal) -> Pace {
        let pace = self.plan(cycle_start.elapsed());
        if let Pace::OnTime { .. } = pace {
            let until = cycle_start + self.interval;
            loop {
                let now = Instant::now();
                if now >= until || shutdown.is_triggered() {
                    break;
                }
                std::thread::sleep((until - now).min(SLEEP_SLICE));
            }
        }
        pace
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/pacer.rs"]
mod tests;
