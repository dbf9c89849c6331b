use crate::foundation::core::{Dimensions, PixelFormat, Rect, validate_placement};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::media::picture::Picture;

/// Output texture usage flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextureFlags {
    pub render_target: bool,
    /// Backing memory is shared with engines outside the compositor.
    pub external: bool,
    pub yuv: bool,
}

impl Default for TextureFlags {
    fn default() -> Self {
        Self {
            render_target: true,
            external: true,
            yuv: true,
        }
    }
}

/// Compositor output configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompositorParams {
    pub dimensions: Dimensions,
    /// Output ring depth.
    pub buffer_count: usize,
    pub texture_format: PixelFormat,
    pub flags: TextureFlags,
}

impl Default for CompositorParams {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::new(1920, 1080),
            buffer_count: 3,
            texture_format: PixelFormat::Nv12,
            flags: TextureFlags::default(),
        }
    }
}

impl CompositorParams {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.texture_format.is_yuv420() {
            self.dimensions.validate_even("compositor output")?;
        }
        if self.buffer_count == 0 {
            return Err(PipelineError::validation(
                "compositor buffer_count must be >= 1",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerParams {
    /// Lower layers are drawn first.
    pub z_order: i32,
    pub visible: bool,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            z_order: 0,
            visible: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

#[derive(Debug)]
pub struct Item {
    pub layer: LayerId,
    /// Normalized placement in layer space.
    pub placement: Rect,
    bound: Option<Picture>,
}

impl Item {
    pub fn bound(&self) -> Option<&Picture> {
        self.bound.as_ref()
    }
}

/// Compositor, its layers and their items.
///
/// Items are created once and rebound every cycle; binding only swaps the picture reference.
#[derive(Debug)]
pub struct SceneGraph {
    params: CompositorParams,
    layers: Vec<LayerParams>,
    items: Vec<Item>,
}

impl SceneGraph {
    pub fn new(params: CompositorParams) -> PipelineResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            layers: Vec::new(),
            items: Vec::new(),
        })
    }

    pub fn params(&self) -> &CompositorParams {
        &self.params
    }

    pub fn add_layer(&mut self, params: LayerParams) -> LayerId {
        self.layers.push(params);
        LayerId(self.layers.len() - 1)
    }

    pub fn add_item(&mut self, layer: LayerId, placement: Rect) -> PipelineResult<ItemId> {
        if layer.0 >= self.layers.len() {
            return Err(PipelineError::validation(format!(
                "unknown layer {}",
                layer.0
            )));
        }
        validate_placement(placement)?;
        self.items.push(Item {
            layer,
            placement,
            bound: None,
        });
        Ok(ItemId(self.items.len() - 1))
    }

    /// Bind `picture` to `item`, replacing the previous binding.
    pub fn bind(&mut self, item: ItemId, picture: Picture) -> PipelineResult<()> {
        let format = self.params.texture_format;
        let slot = self
            .items
            .get_mut(item.0)
            .ok_or_else(|| PipelineError::validation(format!("unknown item {}", item.0)))?;
        picture.ensure_format(&format!("compositor item {}", item.0), format)?;
        slot.bound = Some(picture);
        Ok(())
    }

    pub fn item(&self, item: ItemId) -> Option<&Item> {
        self.items.get(item.0)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn bound_count(&self) -> usize {
        self.items.iter().filter(|i| i.bound.is_some()).count()
    }

    /// Drop every picture reference held by the items.
    pub fn release_bindings(&mut self) {
        for item in &mut self.items {
            item.bound = None;
        }
    }

    /// Tear down in dependency order: bindings, items, layers.
    pub fn clear(&mut self) {
        self.release_bindings();
        self.items.clear();
        self.layers.clear();
    }

    /// Bound items of visible layers, bottom layer first, insertion order within a layer.
    pub fn draw_order(&self) -> Vec<(Rect, &Picture)> {
        let mut layers: Vec<usize> = (0..self.layers.len())
            .filter(|&l| self.layers[l].visible)
            .collect();
        layers.sort_by_key(|&l| self.layers[l].z_order);

        layers
            .into_iter()
            .flat_map(|l| {
                self.items
                    .iter()
                    .filter(move |i| i.layer.0 == l)
                    .filter_map(|i| i.bound.as_ref().map(|p| (i.placement, p)))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/scene.rs"]
mod tests;
