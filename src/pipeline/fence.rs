use std::sync::Arc;
use std::time::Duration;

use crate::media::picture::Picture;
use crate::sync::mailbox::Mailbox;
use crate::sync::shutdown::ShutdownSignal;

/// Result of one fence pass.
#[derive(Debug)]
pub enum FenceOutcome {
    /// One picture per lane, in lane order.
    Complete(Vec<Picture>),
    Shutdown,
    /// `lane` finished with nothing left; no later cycle can complete. Pictures already claimed
    /// from other lanes were dropped.
    Exhausted { lane: usize },
}

/// Collects exactly one fresh picture from every lane per cycle.
pub struct CycleFence<'a> {
    lanes: &'a [Arc<Mailbox<Picture>>],
    poll: Duration,
    claimed: Vec<Option<Picture>>,
    sweeps: u64,
}

impl<'a> CycleFence<'a> {
    pub fn new(lanes: &'a [Arc<Mailbox<Picture>>], poll: Duration) -> Self {
        Self {
            lanes,
            poll,
            claimed: vec![None; lanes.len()],
            sweeps: 0,
        }
    }

    /// Total sweeps across all passes.
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Sweep the lanes until all are satisfied, shutdown fires, or a lane runs dry.
    pub fn collect(&mut self, shutdown: &ShutdownSignal) -> FenceOutcome {
        loop {
            if shutdown.is_triggered() {
                self.discard();
                return FenceOutcome::Shutdown;
            }
            self.sweeps += 1;

            let mut waiting = 0usize;
            for (lane, mailbox) in self.lanes.iter().enumerate() {
                if self.claimed[lane].is_some() {
                    continue;
                }
                match mailbox.try_take() {
                    Some(picture) => self.claimed[lane] = Some(picture),
                    None if mailbox.is_drained() => {
                        tracing::debug!(lane, "lane drained before the cycle could complete");
                        self.discard();
                        return FenceOutcome::Exhausted { lane };
                    }
                    None => waiting += 1,
                }
            }

            if waiting == 0 {
                let pictures = self.claimed.iter_mut().filter_map(Option::take).collect();
                return FenceOutcome::Complete(pictures);
            }
            std::thread::sleep(self.poll);
        }
    }

    fn discard(&mut self) {
        for slot in &mut self.claimed {
            *slot = None;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/fence.rs"]
mod tests;
