use std::path::PathBuf;

use crate::display::{DisplaySettings, DisplaySurface};
use crate::foundation::core::Dimensions;
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::media::picture::{Picture, PictureInfo};

/// Keeps the luma plane of the latest presented picture and writes it as a grayscale PNG on
/// `close`.
#[derive(Debug)]
pub struct SnapshotDisplay {
    path: PathBuf,
    dims: Option<Dimensions>,
    luma: Vec<u8>,
    presented: u64,
}

impl SnapshotDisplay {
    /// Fails unless `settings` names a snapshot path.
    pub fn new(settings: &DisplaySettings) -> PipelineResult<Self> {
        let path = settings
            .snapshot_path
            .clone()
            .ok_or_else(|| PipelineError::validation("snapshot display needs a snapshot path"))?;
        Ok(Self {
            path,
            dims: None,
            luma: Vec::new(),
            presented: 0,
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn write_png(&self, dims: Dimensions) -> PipelineResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        image::save_buffer_with_format(
            &self.path,
            &self.luma,
            dims.width,
            dims.height,
            image::ColorType::L8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            PipelineError::engine(format!("write snapshot '{}': {e}", self.path.display()))
        })
    }
}

impl DisplaySurface for SnapshotDisplay {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn init(&mut self) -> PipelineResult<()> {
        Ok(())
    }

    fn open(&mut self, info: &PictureInfo) -> PipelineResult<()> {
        if !info.format.is_yuv420() || info.bit_depth != 8 {
            return Err(PipelineError::format_mismatch(
                "snapshot display",
                "8-bit 4:2:0",
                info,
            ));
        }
        self.dims = Some(info.dimensions);
        self.luma = vec![0; info.dimensions.area()];
        Ok(())
    }

    fn update_window(&mut self, picture: &Picture) -> PipelineResult<()> {
        if self.dims != Some(picture.dimensions()) {
            return Err(PipelineError::engine(format!(
                "snapshot surface not open for {}",
                picture.dimensions()
            )));
        }
        let (y, _) = picture.planes().ok_or_else(|| {
            PipelineError::format_mismatch("snapshot display", "8-bit 4:2:0", picture.info())
        })?;
        self.luma.copy_from_slice(y);
        self.presented += 1;
        Ok(())
    }

    fn close(&mut self) -> PipelineResult<()> {
        let Some(dims) = self.dims.take() else {
            return Ok(());
        };
        if self.presented == 0 {
            return Ok(());
        }
        self.write_png(dims)?;
        tracing::info!(path = %self.path.display(), "snapshot written");
        Ok(())
    }

    fn uninit(&mut self) -> PipelineResult<()> {
        self.luma = Vec::new();
        Ok(())
    }

    fn presented(&self) -> u64 {
        self.presented
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display/snapshot.rs"]
mod tests;
