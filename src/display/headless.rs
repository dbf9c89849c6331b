use crate::display::{DisplaySettings, DisplaySurface};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::media::picture::{Picture, PictureInfo};

/// Surface that accepts pictures and only keeps counters.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    opened: Option<PictureInfo>,
    presented: u64,
    last_sequence: Option<u64>,
}

impl HeadlessDisplay {
    pub fn new(_settings: &DisplaySettings) -> PipelineResult<Self> {
        Ok(Self::default())
    }

    pub fn opened(&self) -> Option<&PictureInfo> {
        self.opened.as_ref()
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }
}

impl DisplaySurface for HeadlessDisplay {
    fn name(&self) -> &str {
        "headless"
    }

    fn init(&mut self) -> PipelineResult<()> {
        Ok(())
    }

    fn open(&mut self, info: &PictureInfo) -> PipelineResult<()> {
        tracing::debug!(%info, "headless surface opened");
        self.opened = Some(*info);
        Ok(())
    }

    fn update_window(&mut self, picture: &Picture) -> PipelineResult<()> {
        let Some(info) = self.opened else {
            return Err(PipelineError::engine("headless surface is not open"));
        };
        if picture.dimensions() != info.dimensions {
            return Err(PipelineError::format_mismatch(
                "display",
                info.dimensions,
                picture.dimensions(),
            ));
        }
        self.presented += 1;
        self.last_sequence = Some(picture.sequence());
        Ok(())
    }

    fn close(&mut self) -> PipelineResult<()> {
        self.opened = None;
        Ok(())
    }

    fn uninit(&mut self) -> PipelineResult<()> {
        Ok(())
    }

    fn presented(&self) -> u64 {
        self.presented
    }
}
