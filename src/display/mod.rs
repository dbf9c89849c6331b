//! Presentation surfaces.

pub mod headless;
pub mod snapshot;

use std::path::PathBuf;

use crate::foundation::error::PipelineResult;
use crate::media::picture::{Picture, PictureInfo};

pub use headless::HeadlessDisplay;
pub use snapshot::SnapshotDisplay;

/// Backend tags in fallback order, tried when no backend is named.
pub const DISPLAY_PREFERENCE: &[&str] = &["snapshot", "headless"];

/// Construction input for a display surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplaySettings {
    /// Where the snapshot backend writes its PNG.
    pub snapshot_path: Option<PathBuf>,
}

/// A window-like target for composed pictures.
///
/// `open` is called once, with the geometry of the first picture received.
pub trait DisplaySurface: Send {
    fn name(&self) -> &str;
    fn init(&mut self) -> PipelineResult<()>;
    fn open(&mut self, info: &PictureInfo) -> PipelineResult<()>;
    fn update_window(&mut self, picture: &Picture) -> PipelineResult<()>;
    fn close(&mut self) -> PipelineResult<()>;
    fn uninit(&mut self) -> PipelineResult<()>;
    fn presented(&self) -> u64;
}
