//! Scene composition: the compositor contract, its scene graph and output ring.

pub mod cpu;
pub mod ring;
pub mod scene;

use crate::foundation::core::Rect;
use crate::foundation::error::PipelineResult;
use crate::media::picture::{BufferBackend, Picture};

pub use scene::{CompositorParams, ItemId, LayerId, LayerParams, SceneGraph, TextureFlags};

/// Construction input for a compositor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositorSettings {
    pub buffer_backend: BufferBackend,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CompositorStats {
    pub draws: u64,
    pub ring_overflows: u64,
}

/// Places bound pictures into one output picture per `draw`.
///
/// Owned by the compositor worker for the whole run.
pub trait SceneCompositor: Send {
    fn name(&self) -> &str;
    fn configure(&mut self, params: CompositorParams) -> PipelineResult<()>;
    fn add_layer(&mut self, params: LayerParams) -> PipelineResult<LayerId>;
    fn add_item(&mut self, layer: LayerId, placement: Rect) -> PipelineResult<ItemId>;
    /// Bind `picture` to `item`. Fails with `FormatMismatch` if the texture format differs.
    fn update_image(&mut self, item: ItemId, picture: Picture) -> PipelineResult<()>;
    fn draw(&mut self) -> PipelineResult<()>;
    /// The picture produced by the latest `draw`.
    fn frame_buffer(&self) -> PipelineResult<Picture>;
    fn release_bindings(&mut self);
    /// Drop items, layers and output buffers.
    fn release(&mut self);
    fn stats(&self) -> CompositorStats;
}
