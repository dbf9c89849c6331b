use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Instant;

use crate::codec::{Decoder, DecoderSettings, Encoder, EncoderSettings};
use crate::compose::{CompositorSettings, ItemId, LayerParams, SceneCompositor};
use crate::config::PipelineConfig;
use crate::context::PipelineContext;
use crate::display::{DisplaySettings, DisplaySurface};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::media::picture::Picture;
use crate::pipeline::compositor_stage::CompositorStage;
use crate::pipeline::decode_lane::{DecodeLane, LaneState, LaneStatus};
use crate::pipeline::display_lane::run_display;
use crate::pipeline::encode_lane::EncodeLane;
use crate::pipeline::monitor::{Monitor, StageGuard, StageId};
use crate::pipeline::pacer::Pacer;
use crate::pipeline::stats::{PipelineStats, RunReport};
use crate::sink::ByteSink;
use crate::source::CodedSource;
use crate::sync::mailbox::{Mailbox, MailboxPolicy};
use crate::sync::shutdown::ShutdownSignal;

/// A configured N-lane decode, composite, display and encode pipeline.
///
/// Holds no global state: every run builds its engines from the pipeline's own
/// [`PipelineContext`], so any number of pipelines may run in one process.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    context: PipelineContext,
}

/// Engines brought up for one run, torn down in reverse.
struct Engines {
    decoders: Vec<Box<dyn Decoder>>,
    decoders_started: usize,
    encoder: Option<Box<dyn Encoder>>,
    encoder_started: bool,
    compositor: Option<Box<dyn SceneCompositor>>,
    items: Vec<ItemId>,
    display: Option<(String, Box<dyn DisplaySurface>)>,
}

impl Engines {
    fn empty() -> Self {
        Self {
            decoders: Vec::new(),
            decoders_started: 0,
            encoder: None,
            encoder_started: false,
            compositor: None,
            items: Vec::new(),
            display: None,
        }
    }

    fn bring_up(&mut self, config: &PipelineConfig, ctx: &PipelineContext) -> PipelineResult<()> {
        for (lane, lane_cfg) in config.lanes.iter().enumerate() {
            let stage = format!("decoder[{lane}]");
            let settings = DecoderSettings {
                lane,
                codec: lane_cfg.decoder.clone(),
                output: lane_cfg.picture_info(),
                buffer_backend: lane_cfg.buffer_backend,
                queue_depth: lane_cfg.decoder_queue,
            };
            let mut decoder = ctx.decoders.create(&lane_cfg.decoder, &settings)?;
            decoder.init().map_err(|e| e.into_fatal_init(&stage))?;
            self.decoders.push(decoder);
        }
        for decoder in &mut self.decoders {
            decoder
                .start()
                .map_err(|e| e.into_fatal_init(decoder.name().to_owned()))?;
            self.decoders_started += 1;
        }

        let output_info = config.compositor.output_info();
        let mut encoder = ctx.encoders.create(
            &config.encoder.codec,
            &EncoderSettings {
                codec: config.encoder.codec.clone(),
                input: output_info,
            },
        )?;
        encoder
            .set_params(config.encoder.params)
            .and_then(|()| encoder.init())
            .map_err(|e| e.into_fatal_init("encoder"))?;
        let encoder = self.encoder.insert(encoder);
        encoder.start().map_err(|e| e.into_fatal_init("encoder"))?;
        self.encoder_started = true;

        let mut compositor = ctx.compositors.create(
            &config.compositor.backend,
            &CompositorSettings {
                buffer_backend: config.compositor.buffer_backend,
            },
        )?;
        let compositor = {
            compositor
                .configure(config.compositor.params())
                .map_err(|e| e.into_fatal_init("compositor"))?;
            self.compositor.insert(compositor)
        };
        let layer = compositor
            .add_layer(LayerParams::default())
            .map_err(|e| e.into_fatal_init("compositor"))?;
        for lane in 0..config.lanes.len() {
            let item = compositor
                .add_item(layer, config.placement_for(lane))
                .map_err(|e| e.into_fatal_init("compositor"))?;
            self.items.push(item);
        }

        if config.display.enabled {
            let settings = DisplaySettings {
                snapshot_path: config.display.snapshot_path.clone(),
            };
            self.display = Some(
                ctx.displays
                    .create_preferred(config.display.backend.as_deref(), &settings)?,
            );
        }
        Ok(())
    }

    /// Release bindings, then the compositor, then stop and uninitialize the codecs.
    fn tear_down(&mut self) -> PipelineResult<()> {
        let mut first: Option<PipelineError> = None;
        let mut note = |what: &str, r: PipelineResult<()>| {
            if let Err(e) = r {
                tracing::warn!(what, error = %e, "teardown step failed");
                first.get_or_insert(e);
            }
        };

        if let Some(mut compositor) = self.compositor.take() {
            compositor.release_bindings();
            compositor.release();
        }
        self.items.clear();
        for (i, mut decoder) in self.decoders.drain(..).enumerate() {
            if i < self.decoders_started {
                note("decoder stop", decoder.stop());
            }
            note("decoder uninit", decoder.uninit());
        }
        self.decoders_started = 0;
        if let Some(mut encoder) = self.encoder.take() {
            if self.encoder_started {
                note("encoder stop", encoder.stop());
            }
            note("encoder uninit", encoder.uninit());
        }
        self.encoder_started = false;
        self.display = None;

        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig, context: PipelineContext) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config, context })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Run every lane to completion, one source per lane, writing encoded bytes to `sink`.
    ///
    /// Any engine that fails to come up aborts the run with `FatalInit` before a thread starts.
    /// A stage failure at run time shuts every other stage down and is returned.
    #[tracing::instrument(skip_all, fields(lanes = self.config.lanes.len()))]
    pub fn run(
        &self,
        sources: Vec<Box<dyn CodedSource>>,
        sink: &mut dyn ByteSink,
    ) -> PipelineResult<RunReport> {
        let config = &self.config;
        if sources.len() != config.lanes.len() {
            return Err(PipelineError::validation(format!(
                "{} lanes configured but {} sources given",
                config.lanes.len(),
                sources.len()
            )));
        }

        let started = Instant::now();
        let mut engines = Engines::empty();
        if let Err(e) = engines.bring_up(config, &self.context) {
            tracing::error!(error = %e, "pipeline startup failed");
            if let Err(t) = engines.tear_down() {
                tracing::warn!(error = %t, "teardown after failed startup also failed");
            }
            return Err(e.into_fatal_init("pipeline"));
        }
        tracing::info!(
            display = engines.display.as_ref().map(|(tag, _)| tag.as_str()),
            "pipeline engines ready"
        );

        let shutdown = ShutdownSignal::new();
        let monitor = Monitor::new(shutdown.clone(), config.lanes.len());
        let stats = PipelineStats::default();
        let lane_states: Vec<LaneState> = (0..config.lanes.len()).map(LaneState::new).collect();
        let lane_mailboxes: Vec<Arc<Mailbox<Picture>>> = (0..config.lanes.len())
            .map(|i| Mailbox::new(format!("lane[{i}]"), MailboxPolicy::Blocking, &shutdown))
            .collect();
        let display_mailbox = engines
            .display
            .is_some()
            .then(|| Mailbox::new("display", MailboxPolicy::LatestWins, &shutdown));
        let encode_mailbox: Arc<Mailbox<Picture>> =
            Mailbox::new("encode", MailboxPolicy::LatestWins, &shutdown);
        let feed_done = AtomicBool::new(false);
        let drain_poll = config.timing.drain_poll();
        let mut drain_timed_out = false;

        let Engines {
            decoders,
            encoder,
            compositor,
            items,
            display,
            ..
        } = &mut engines;
        let (Some(encoder), Some(compositor)) = (encoder.as_deref(), compositor.as_deref_mut())
        else {
            return Err(PipelineError::engine("engines missing after startup"));
        };

        thread::scope(|scope| {
            let mut handles: Vec<(StageId, ScopedJoinHandle<'_, ()>)> = Vec::new();

            for (lane, source) in sources.into_iter().enumerate() {
                let decode = DecodeLane {
                    state: &lane_states[lane],
                    decoder: &*decoders[lane],
                    mailbox: &lane_mailboxes[lane],
                    monitor: &monitor,
                    poll: drain_poll,
                    max_in_flight: config.lanes[lane].max_in_flight,
                };
                lane_states[lane].set_status(LaneStatus::Running);

                let mut source = source;
                spawn_stage(scope, &monitor, &mut handles, StageId::DecodeFeed(lane), move || {
                    decode.run_feed(&mut *source)
                });
                spawn_stage(scope, &monitor, &mut handles, StageId::DecodeDrain(lane), move || {
                    decode.run_drain()
                });
            }

            let stage = CompositorStage {
                compositor: &mut *compositor,
                items: items.as_slice(),
                lanes: &lane_mailboxes,
                display: display_mailbox.as_deref(),
                encode: &encode_mailbox,
                pacer: Pacer::new(config.compositor.fps),
                fence_poll: config.timing.fence_poll(),
                stats: &stats,
                monitor: &monitor,
            };
            spawn_stage(scope, &monitor, &mut handles, StageId::Compositor, move || {
                stage.run()
            });

            if let (Some((_, surface)), Some(mailbox)) = (display.as_mut(), display_mailbox.as_deref())
            {
                let surface: &mut dyn DisplaySurface = &mut **surface;
                let (stats, monitor) = (&stats, &monitor);
                spawn_stage(scope, monitor, &mut handles, StageId::Display, move || {
                    run_display(surface, mailbox, stats, monitor)
                });
            }

            let encode = EncodeLane {
                encoder,
                mailbox: &encode_mailbox,
                feed_done: &feed_done,
                poll: drain_poll,
                stats: &stats,
                monitor: &monitor,
            };
            spawn_stage(scope, &monitor, &mut handles, StageId::EncodeFeed, move || {
                encode.run_feed()
            });
            spawn_stage(scope, &monitor, &mut handles, StageId::EncodeDrain, move || {
                encode.run_drain(sink)
            });

            monitor.wait_for_end_of_stream();
            if !monitor.has_failed() && !shutdown.is_triggered() {
                let timeout = config.timing.drain_timeout();
                if !monitor.wait_for_quiescence(timeout) {
                    drain_timed_out = true;
                    tracing::warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        live = monitor.live(),
                        "stages still busy after drain timeout, forcing shutdown"
                    );
                }
            }

            shutdown.trigger();
            for (stage, handle) in handles {
                if handle.join().is_err() {
                    tracing::error!(%stage, "stage thread panicked");
                }
            }
        });

        let presented = display
            .as_ref()
            .map_or(0, |(_, surface)| surface.presented());
        let ring_overflows = compositor.stats().ring_overflows;
        let report = RunReport {
            cycles: PipelineStats::read(&stats.cycles),
            falling_behind: PipelineStats::read(&stats.falling_behind),
            fence_sweeps: PipelineStats::read(&stats.fence_sweeps),
            lanes: lane_states.iter().map(LaneState::report).collect(),
            display_backend: display.as_ref().map(|(tag, _)| tag.clone()),
            presented,
            display_overwrites: display_mailbox
                .as_ref()
                .map_or(0, |m| m.stats().overwritten),
            pictures_encoded: PipelineStats::read(&stats.pictures_encoded),
            encode_overwrites: encode_mailbox.stats().overwritten,
            packets: PipelineStats::read(&stats.packets),
            bytes_written: PipelineStats::read(&stats.bytes_written),
            ring_overflows,
            drain_timed_out,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        let teardown = engines.tear_down();
        if let Some(err) = monitor.take_error() {
            return Err(err);
        }
        teardown?;
        tracing::info!(
            cycles = report.cycles,
            packets = report.packets,
            elapsed_ms = report.elapsed_ms,
            "pipeline finished"
        );
        Ok(report)
    }
}

/// Spawn a named worker that counts as live until it returns.
///
/// If the thread cannot be spawned, the stage is reported as failed; the guard inside the
/// dropped closure marks it exited.
fn spawn_stage<'scope, 'env, F>(
    scope: &'scope Scope<'scope, 'env>,
    monitor: &'env Monitor,
    handles: &mut Vec<(StageId, ScopedJoinHandle<'scope, ()>)>,
    stage: StageId,
    work: F,
) where
    F: FnOnce() + Send + 'scope,
{
    let guard: StageGuard<'env> = monitor.enter(stage);
    let spawned = thread::Builder::new()
        .name(stage.to_string())
        .spawn_scoped(scope, move || {
            let _guard = guard;
            work();
        });
    match spawned {
        Ok(handle) => handles.push((stage, handle)),
        Err(e) => monitor.fail(
            stage,
            PipelineError::engine(format!("spawn {stage} thread: {e}")),
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
