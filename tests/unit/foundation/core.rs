use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::default(), Fps::new(30, 1).unwrap());
}

#[test]
fn frame_interval_matches_rate() {
    assert_eq!(
        Fps::new(25, 1).unwrap().frame_interval(),
        Duration::from_millis(40)
    );
    let ntsc = Fps::new(30000, 1001).unwrap().frame_interval();
    assert_eq!(ntsc, Duration::from_nanos(33_366_666));
}

#[test]
fn frame_bytes_per_format() {
    let d = Dimensions::new(16, 8);
    assert_eq!(PixelFormat::Nv12.frame_bytes(d, 8), 192);
    assert_eq!(PixelFormat::Yuv420p.frame_bytes(d, 10), 384);
    assert_eq!(PixelFormat::Rgba8.frame_bytes(d, 8), 512);
}

#[test]
fn odd_dimensions_are_rejected() {
    assert!(Dimensions::new(16, 16).validate_even("lane").is_ok());
    assert!(Dimensions::new(15, 16).validate_even("lane").is_err());
    assert!(Dimensions::new(0, 16).validate_even("lane").is_err());
}

#[test]
fn four_items_tile_quadrants() {
    assert_eq!(grid_placement(0, 4), Rect::new(0.0, 0.0, 0.5, 0.5));
    assert_eq!(grid_placement(1, 4), Rect::new(0.5, 0.0, 1.0, 0.5));
    assert_eq!(grid_placement(2, 4), Rect::new(0.0, 0.5, 0.5, 1.0));
    assert_eq!(grid_placement(3, 4), Rect::new(0.5, 0.5, 1.0, 1.0));
    assert_eq!(grid_placement(0, 1), Rect::new(0.0, 0.0, 1.0, 1.0));
}

#[test]
fn three_items_use_two_rows() {
    let r = grid_placement(2, 3);
    assert_eq!(r, Rect::new(0.0, 0.5, 0.5, 1.0));
}

#[test]
fn placement_must_stay_in_unit_square() {
    assert!(validate_placement(Rect::new(0.0, 0.0, 1.0, 1.0)).is_ok());
    assert!(validate_placement(Rect::new(0.5, 0.5, 1.5, 1.0)).is_err());
    assert!(validate_placement(Rect::new(0.5, 0.5, 0.5, 1.0)).is_err());
}
