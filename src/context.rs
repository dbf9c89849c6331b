use crate::codec::raw::{RAW_CODEC, RawDecoder, RawEncoder};
use crate::codec::registry::Registry;
use crate::codec::{Decoder, DecoderSettings, Encoder, EncoderSettings};
use crate::compose::cpu::SoftwareCompositor;
use crate::compose::{CompositorSettings, SceneCompositor};
use crate::display::{DisplaySettings, DisplaySurface, HeadlessDisplay, SnapshotDisplay};

/// Engine registries handed to a [`crate::Pipeline`].
///
/// Each pipeline owns its own context, so several pipelines with different engine sets can live
/// in one process. `Default` registers the built-in software engines.
#[derive(Clone, Debug)]
pub struct PipelineContext {
    pub decoders: Registry<DecoderSettings, dyn Decoder>,
    pub encoders: Registry<EncoderSettings, dyn Encoder>,
    pub compositors: Registry<CompositorSettings, dyn SceneCompositor>,
    pub displays: Registry<DisplaySettings, dyn DisplaySurface>,
}

impl PipelineContext {
    /// Context with nothing registered.
    pub fn empty() -> Self {
        Self {
            decoders: Registry::new("decoder"),
            encoders: Registry::new("encoder"),
            compositors: Registry::new("compositor"),
            displays: Registry::new("display"),
        }
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        let mut ctx = Self::empty();
        ctx.decoders.register(RAW_CODEC, |s: &DecoderSettings| {
            Ok(Box::new(RawDecoder::new(s)?) as Box<dyn Decoder>)
        });
        ctx.encoders.register(RAW_CODEC, |s: &EncoderSettings| {
            Ok(Box::new(RawEncoder::new(s)?) as Box<dyn Encoder>)
        });
        ctx.compositors
            .register("software", |s: &CompositorSettings| {
                Ok(Box::new(SoftwareCompositor::new(s)?) as Box<dyn SceneCompositor>)
            });
        ctx.displays
            .register("snapshot", |s: &DisplaySettings| {
                Ok(Box::new(SnapshotDisplay::new(s)?) as Box<dyn DisplaySurface>)
            })
            .register("headless", |s: &DisplaySettings| {
                Ok(Box::new(HeadlessDisplay::new(s)?) as Box<dyn DisplaySurface>)
            });
        ctx
    }
}

#[cfg(test)]
#[path = "../tests/unit/context.rs"]
mod tests;
