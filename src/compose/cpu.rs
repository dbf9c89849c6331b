use crate::compose::ring::FrameRing;
use crate::compose::scene::{CompositorParams, ItemId, LayerId, LayerParams, SceneGraph};
use crate::compose::{CompositorSettings, CompositorStats, SceneCompositor};
use crate::foundation::core::{Dimensions, PixelFormat, Rect};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::media::picture::{Picture, PictureInfo};

/// Limited-range black.
const BLACK_Y: u8 = 16;
const NEUTRAL_UV: u8 = 128;

/// Nearest-neighbour NV12 compositor running on the CPU.
#[derive(Debug)]
pub struct SoftwareCompositor {
    settings: CompositorSettings,
    scene: Option<SceneGraph>,
    ring: Option<FrameRing>,
    current: Option<Picture>,
    draws: u64,
}

impl SoftwareCompositor {
    pub fn new(settings: &CompositorSettings) -> PipelineResult<Self> {
        Ok(Self {
            settings: *settings,
            scene: None,
            ring: None,
            current: None,
            draws: 0,
        })
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    fn scene_mut(&mut self) -> PipelineResult<&mut SceneGraph> {
        self.scene
            .as_mut()
            .ok_or_else(|| PipelineError::engine("software compositor is not configured"))
    }
}

impl SceneCompositor for SoftwareCompositor {
    fn name(&self) -> &str {
        "software"
    }

    fn configure(&mut self, params: CompositorParams) -> PipelineResult<()> {
        if params.texture_format != PixelFormat::Nv12 {
            return Err(PipelineError::fatal_init(
                "compositor",
                format!(
                    "software compositor renders nv12 only (got {})",
                    params.texture_format
                ),
            ));
        }
        let scene = SceneGraph::new(params)?;
        let ring = FrameRing::new(
            PictureInfo::nv12(params.dimensions),
            self.settings.buffer_backend,
            params.buffer_count,
        )?;
        tracing::debug!(
            dims = %params.dimensions,
            buffers = params.buffer_count,
            "software compositor configured"
        );
        self.scene = Some(scene);
        self.ring = Some(ring);
        self.current = None;
        self.draws = 0;
        Ok(())
    }

    fn add_layer(&mut self, params: LayerParams) -> PipelineResult<LayerId> {
        Ok(self.scene_mut()?.add_layer(params))
    }

    fn add_item(&mut self, layer: LayerId, placement: Rect) -> PipelineResult<ItemId> {
        self.scene_mut()?.add_item(layer, placement)
    }

    fn update_image(&mut self, item: ItemId, picture: Picture) -> PipelineResult<()> {
        self.scene_mut()?.bind(item, picture)
    }

    fn draw(&mut self) -> PipelineResult<()> {
        let (Some(scene), Some(ring)) = (self.scene.as_ref(), self.ring.as_mut()) else {
            return Err(PipelineError::engine(
                "software compositor is not configured",
            ));
        };
        let info = *ring.info();
        let dims = info.dimensions;
        let buffer = ring.write_next(|out| {
            let (luma, chroma) = out.split_at_mut(dims.area());
            luma.fill(BLACK_Y);
            chroma.fill(NEUTRAL_UV);
            for (placement, picture) in scene.draw_order() {
                blit_nv12(luma, chroma, dims, picture, placement);
            }
        });
        self.current = Some(Picture::new(info, self.draws, buffer)?);
        self.draws += 1;
        Ok(())
    }

    fn frame_buffer(&self) -> PipelineResult<Picture> {
        self.current
            .clone()
            .ok_or_else(|| PipelineError::engine("no frame has been drawn yet"))
    }

    fn release_bindings(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.release_bindings();
        }
    }

    fn release(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.clear();
        }
        self.current = None;
        self.scene = None;
        self.ring = None;
    }

    fn stats(&self) -> CompositorStats {
        CompositorStats {
            draws: self.draws,
            ring_overflows: self.ring.as_ref().map_or(0, FrameRing::overflows),
        }
    }
}

/// Snap a normalized coordinate to an even pixel index within `0..=extent`.
fn even_px(v: f64, extent: u32) -> usize {
    let px = (v * f64::from(extent)).round().clamp(0.0, f64::from(extent)) as usize;
    px & !1
}

/// Scale `src` into the pixel rectangle `placement` maps to, nearest neighbour.
fn blit_nv12(luma: &mut [u8], chroma: &mut [u8], dims: Dimensions, src: &Picture, placement: Rect) {
    let Some((src_y, src_uv)) = src.planes() else {
        return;
    };
    let stride = dims.width as usize;
    let (x0, x1) = (even_px(placement.x0, dims.width), even_px(placement.x1, dims.width));
    let (y0, y1) = (even_px(placement.y0, dims.height), even_px(placement.y1, dims.height));
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    let (w, h) = (x1 - x0, y1 - y0);
    let (sw, sh) = (src.width() as usize, src.height() as usize);

    for y in 0..h {
        let sy = y * sh / h;
        let dst_row = &mut luma[(y0 + y) * stride + x0..(y0 + y) * stride + x1];
        let src_row = &src_y[sy * sw..(sy + 1) * sw];
        for (x, px) in dst_row.iter_mut().enumerate() {
            *px = src_row[x * sw / w];
        }
    }

    let (cw, ch) = (w / 2, h / 2);
    let (scw, sch) = (sw / 2, sh / 2);
    for cy in 0..ch {
        let sy = cy * sch / ch;
        let dst = (y0 / 2 + cy) * stride + x0;
        let src_row = &src_uv[sy * sw..sy * sw + scw * 2];
        for cx in 0..cw {
            let sx = cx * scw / cw;
            chroma[dst + cx * 2] = src_row[sx * 2];
            chroma[dst + cx * 2 + 1] = src_row[sx * 2 + 1];
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/cpu.rs"]
mod tests;
