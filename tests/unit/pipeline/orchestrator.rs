use super::*;

use crate::config::LaneConfig;
use crate::sink::MemorySink;
use crate::source::VecSource;

fn tiny_config(lanes: usize) -> PipelineConfig {
    let mut cfg = PipelineConfig::with_lanes(
        lanes,
        LaneConfig {
            width: 4,
            height: 4,
            ..LaneConfig::default()
        },
    );
    cfg.compositor.width = 8;
    cfg.compositor.height = 8;
    cfg.compositor.fps = crate::foundation::core::Fps::new(1000, 1).unwrap();
    cfg.display.enabled = false;
    cfg
}

#[test]
fn source_count_must_match_lanes() {
    let pipeline = Pipeline::new(tiny_config(2), PipelineContext::default()).unwrap();
    let mut sink = MemorySink::new();
    let sources: Vec<Box<dyn CodedSource>> = vec![Box::new(VecSource::default())];
    let err = pipeline.run(sources, &mut sink).unwrap_err();
    assert!(err.to_string().contains("2 lanes configured but 1 sources"));
}

#[test]
fn failed_encoder_init_tears_down_started_decoders() {
    let mut cfg = tiny_config(1);
    cfg.encoder.codec = "hevc".to_owned();
    let pipeline = Pipeline::new(cfg, PipelineContext::default()).unwrap();
    let mut sink = MemorySink::new();
    let sources: Vec<Box<dyn CodedSource>> = vec![Box::new(VecSource::new([vec![0u8; 24]]))];
    let err = pipeline.run(sources, &mut sink).unwrap_err();
    assert!(err.is_fatal_init());
    assert!(err.to_string().contains("hevc"));
    assert!(!sink.is_closed());
}

#[test]
fn engines_teardown_is_safe_on_partial_startup() {
    let mut engines = Engines::empty();
    let mut cfg = tiny_config(2);
    cfg.lanes[1].decoder = "vp9".to_owned();
    assert!(engines.bring_up(&cfg, &PipelineContext::default()).is_err());
    assert_eq!(engines.decoders.len(), 1);
    assert_eq!(engines.decoders_started, 0);
    engines.tear_down().unwrap();
    assert!(engines.decoders.is_empty());
}
