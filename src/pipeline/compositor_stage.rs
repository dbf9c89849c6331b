use std::sync::Arc;
use std::time::Instant;

use crate::compose::{ItemId, SceneCompositor};
use crate::foundation::error::PipelineResult;
use crate::media::picture::Picture;
use crate::pipeline::fence::{CycleFence, FenceOutcome};
use crate::pipeline::monitor::{Monitor, StageId};
use crate::pipeline::pacer::{Pace, Pacer};
use crate::pipeline::stats::PipelineStats;
use crate::sync::mailbox::{Mailbox, PutError};

/// The rate-paced compose loop: fence, bind, draw, publish, pace.
pub struct CompositorStage<'a> {
    pub compositor: &'a mut dyn SceneCompositor,
    /// Item `i` shows lane `i`.
    pub items: &'a [ItemId],
    pub lanes: &'a [Arc<Mailbox<Picture>>],
    pub display: Option<&'a Mailbox<Picture>>,
    pub encode: &'a Mailbox<Picture>,
    pub pacer: Pacer,
    pub fence_poll: std::time::Duration,
    pub stats: &'a PipelineStats,
    pub monitor: &'a Monitor,
}

enum Published {
    Continue,
    Stop,
}

impl CompositorStage<'_> {
    pub fn run(mut self) {
        let shutdown = self.monitor.shutdown().clone();
        let mut fence = CycleFence::new(self.lanes, self.fence_poll);
        tracing::info!(
            lanes = self.lanes.len(),
            interval_us = self.pacer.interval().as_micros() as u64,
            "compositor started"
        );

        loop {
            // The cycle budget covers the fence wait as well as compose and publish.
            let cycle_start = Instant::now();
            let pictures = match fence.collect(&shutdown) {
                FenceOutcome::Complete(pictures) => pictures,
                FenceOutcome::Shutdown => break,
                FenceOutcome::Exhausted { lane } => {
                    tracing::info!(lane, "lane exhausted, no further cycle can complete");
                    break;
                }
            };

            let output = match self.compose(pictures) {
                Ok(output) => output,
                Err(e) => {
                    self.monitor.fail(StageId::Compositor, e);
                    break;
                }
            };
            PipelineStats::bump(&self.stats.cycles);
            if let Published::Stop = self.publish(output) {
                break;
            }

            if let Pace::Behind { overrun } = self.pacer.pace(cycle_start, &shutdown) {
                PipelineStats::bump(&self.stats.falling_behind);
                tracing::warn!(
                    overrun_us = overrun.as_micros() as u64,
                    "compositor falling behind target rate"
                );
            }
        }

        PipelineStats::add(&self.stats.fence_sweeps, fence.sweeps());
        self.compositor.release_bindings();
        if let Some(display) = self.display {
            display.finish();
        }
        self.encode.finish();
        for lane in self.lanes {
            lane.abandon();
        }
        tracing::info!(
            cycles = PipelineStats::read(&self.stats.cycles),
            "compositor finished"
        );
    }

    fn compose(&mut self, pictures: Vec<Picture>) -> PipelineResult<Picture> {
        if let Some(first) = pictures.first()
            && pictures.iter().any(|p| p.sequence() != first.sequence())
        {
            tracing::warn!(
                sequences = ?pictures.iter().map(Picture::sequence).collect::<Vec<_>>(),
                "lanes delivered pictures from different source positions"
            );
        }
        for (&item, picture) in self.items.iter().zip(pictures) {
            self.compositor.update_image(item, picture)?;
        }
        self.compositor.draw()?;
        self.compositor.frame_buffer()
    }

    fn publish(&mut self, output: Picture) -> Published {
        if let Some(display) = self.display {
            match display.put(output.clone()) {
                Ok(_) => {}
                Err(PutError::Shutdown(_)) => return Published::Stop,
                Err(PutError::Abandoned(_) | PutError::Finished(_)) => {
                    tracing::debug!("display stopped consuming, publishing to encode only");
                    self.display = None;
                }
            }
        }
        match self.encode.put(output) {
            Ok(_) => Published::Continue,
            Err(_) => Published::Stop,
        }
    }
}
