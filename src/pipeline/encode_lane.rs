use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::codec::Encoder;
use crate::media::picture::Picture;
use crate::pipeline::monitor::{Monitor, StageId};
use crate::pipeline::stats::PipelineStats;
use crate::sink::ByteSink;
use crate::sync::mailbox::Mailbox;

/// The encoder's feed/drain pair and what they share.
#[derive(Clone, Copy)]
pub struct EncodeLane<'a> {
    pub encoder: &'a dyn Encoder,
    pub mailbox: &'a Mailbox<Picture>,
    pub feed_done: &'a AtomicBool,
    pub poll: Duration,
    pub stats: &'a PipelineStats,
    pub monitor: &'a Monitor,
}

impl EncodeLane<'_> {
    /// Push every composed picture received into the encoder.
    pub fn run_feed(&self) {
        tracing::info!(encoder = self.encoder.name(), "encode feed started");
        while let Some(picture) = self.mailbox.take_blocking() {
            if let Err(e) = self.encoder.push(picture) {
                self.monitor.fail(StageId::EncodeFeed, e);
                break;
            }
            PipelineStats::bump(&self.stats.pictures_encoded);
        }
        self.mailbox.abandon();
        self.feed_done.store(true, Ordering::Release);
        tracing::info!(
            encoded = PipelineStats::read(&self.stats.pictures_encoded),
            "encode feed finished"
        );
    }

    /// Append packets to `sink` in emission order, then flush and close it.
    pub fn run_drain(&self, sink: &mut dyn ByteSink) {
        tracing::info!("encode drain started");
        loop {
            if let Some(packet) = self.encoder.pop() {
                if let Err(e) = sink.append(&packet.data) {
                    self.monitor.fail(StageId::EncodeDrain, e);
                    break;
                }
                PipelineStats::bump(&self.stats.packets);
                PipelineStats::add(&self.stats.bytes_written, packet.data.len() as u64);
                continue;
            }
            if self.monitor.shutdown().is_triggered() {
                break;
            }
            if self.feed_done.load(Ordering::Acquire) && !self.encoder.can_pop() {
                break;
            }
            std::thread::sleep(self.poll);
        }

        if let Err(e) = sink.flush().and_then(|()| sink.close()) {
            self.monitor.fail(StageId::EncodeDrain, e);
        }
        tracing::info!(
            packets = PipelineStats::read(&self.stats.packets),
            bytes = PipelineStats::read(&self.stats.bytes_written),
            "encode drain finished"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/encode_lane.rs"]
mod tests;
