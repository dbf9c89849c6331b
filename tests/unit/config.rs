use super::*;

#[test]
fn defaults_validate() {
    let cfg = PipelineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.compositor.dimensions(), Dimensions::new(1920, 1080));
    assert_eq!(cfg.compositor.buffer_count, 3);
    assert_eq!(cfg.compositor.fps, Fps::new(30, 1).unwrap());
    assert_eq!(cfg.encoder.params.bitrate_bps, 4 * 1024 * 1024);
    assert_eq!(cfg.encoder.params.gop, 60);
    assert_eq!(cfg.lanes[0].decoder_queue, DEFAULT_DECODER_QUEUE);
}

#[test]
fn json_overrides_and_grid_placement() {
    let cfg = PipelineConfig::from_json_str(
        r#"{
            "lanes": [
                {"width": 64, "height": 32},
                {"width": 64, "height": 32},
                {"width": 64, "height": 32, "placement": {"x0": 0.0, "y0": 0.0, "x1": 1.0, "y1": 1.0}},
                {"width": 64, "height": 32}
            ],
            "compositor": {"width": 128, "height": 64, "fps": {"num": 60, "den": 1}},
            "encoder": {"rc_mode": "fixqp", "gop": 10},
            "timing": {"drain_poll_us": 1}
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.lanes.len(), 4);
    assert_eq!(cfg.placement_for(1), Rect::new(0.5, 0.0, 1.0, 0.5));
    assert_eq!(cfg.placement_for(2), Rect::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(cfg.encoder.params.rc_mode, crate::codec::RateControlMode::FixQp);
    assert_eq!(cfg.encoder.params.gop, 10);
    assert_eq!(cfg.timing.drain_poll(), MIN_POLL_QUANTUM);
    assert_eq!(cfg.compositor.fps.frame_interval(), Duration::from_nanos(16_666_666));
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(PipelineConfig::from_json_str(r#"{"lanes": []}"#).is_err());
    assert!(PipelineConfig::from_json_str(r#"{"lanes": [{"width": 15}]}"#).is_err());
    assert!(PipelineConfig::from_json_str(r#"{"lanes": [{"decoder_queue": 0}]}"#).is_err());
    assert!(PipelineConfig::from_json_str(r#"{"compositor": {"buffer_count": 0}}"#).is_err());
    assert!(PipelineConfig::from_json_str(r#"{"encoder": {"gop": 0}}"#).is_err());
    assert!(PipelineConfig::from_json_str(r#"{"bogus": 1}"#).is_err());
    let err = PipelineConfig::from_json_str("{").unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
}

#[test]
fn lane_frame_bytes_follow_geometry() {
    let lane = LaneConfig {
        width: 16,
        height: 16,
        ..LaneConfig::default()
    };
    assert_eq!(lane.frame_bytes(), 384);
    let cfg = PipelineConfig::with_lanes(3, lane);
    assert_eq!(cfg.lanes.len(), 3);
    assert_eq!(cfg.placement_for(2), Rect::new(0.0, 0.5, 0.5, 1.0));
}
