use crate::display::DisplaySurface;
use crate::foundation::error::PipelineResult;
use crate::media::picture::Picture;
use crate::pipeline::monitor::{Monitor, StageId};
use crate::pipeline::stats::PipelineStats;
use crate::sync::mailbox::Mailbox;

/// Present composed pictures until the compositor finishes or shutdown fires.
///
/// The surface is initialized on this thread and opened with the geometry of the first picture.
pub fn run_display(
    surface: &mut dyn DisplaySurface,
    mailbox: &Mailbox<Picture>,
    stats: &PipelineStats,
    monitor: &Monitor,
) {
    tracing::info!(backend = surface.name(), "display started");
    let mut opened = false;
    let result = present_all(surface, mailbox, stats, &mut opened);

    if opened && let Err(e) = surface.close() {
        tracing::warn!(error = %e, "display close failed");
    }
    if let Err(e) = surface.uninit() {
        tracing::warn!(error = %e, "display uninit failed");
    }
    mailbox.abandon();
    if let Err(e) = result {
        monitor.fail(StageId::Display, e);
    }
    tracing::info!(presented = surface.presented(), "display finished");
}

fn present_all(
    surface: &mut dyn DisplaySurface,
    mailbox: &Mailbox<Picture>,
    stats: &PipelineStats,
    opened: &mut bool,
) -> PipelineResult<()> {
    surface.init()?;
    while let Some(picture) = mailbox.take_blocking() {
        if !*opened {
            surface.open(picture.info())?;
            *opened = true;
        }
        surface.update_window(&picture)?;
        PipelineStats::bump(&stats.presented);
    }
    Ok(())
}
