use super::*;

use std::path::PathBuf;

use crate::display::DISPLAY_PREFERENCE;

#[test]
fn builtins_are_registered() {
    let ctx = PipelineContext::default();
    assert!(ctx.decoders.contains("raw"));
    assert!(!ctx.decoders.contains("h264"));
    assert!(ctx.encoders.contains("raw"));
    assert!(ctx.compositors.contains("software"));
    assert_eq!(ctx.displays.tags().collect::<Vec<_>>(), DISPLAY_PREFERENCE.to_vec());
}

#[test]
fn display_falls_back_to_headless_without_snapshot_path() {
    let ctx = PipelineContext::default();
    let (tag, surface) = ctx
        .displays
        .create_preferred(None, &DisplaySettings::default())
        .unwrap();
    assert_eq!(tag, "headless");
    assert_eq!(surface.name(), "headless");

    let settings = DisplaySettings {
        snapshot_path: Some(PathBuf::from("snap.png")),
    };
    let (tag, _) = ctx.displays.create_preferred(None, &settings).unwrap();
    assert_eq!(tag, "snapshot");
}

#[test]
fn empty_context_reports_fatal_init() {
    let ctx = PipelineContext::empty();
    let err = ctx
        .compositors
        .create("software", &CompositorSettings::default())
        .err()
        .unwrap();
    assert!(err.is_fatal_init());
}
