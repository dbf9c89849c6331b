use super::*;

use crate::display::HeadlessDisplay;
use crate::media::picture::BufferBackend;

fn gradient(dims: Dimensions) -> Picture {
    let mut bytes: Vec<u8> = (0..dims.area()).map(|i| (i * 10) as u8).collect();
    bytes.extend(std::iter::repeat_n(128u8, dims.area() / 2));
    Picture::from_bytes(PictureInfo::nv12(dims), 0, BufferBackend::Heap, bytes).unwrap()
}

#[test]
fn missing_path_fails_construction() {
    assert!(SnapshotDisplay::new(&DisplaySettings::default()).is_err());
}

#[test]
fn close_writes_luma_png() {
    let path = std::env::temp_dir().join(format!("mosaic_snapshot_{}.png", std::process::id()));
    let mut display = SnapshotDisplay::new(&DisplaySettings {
        snapshot_path: Some(path.clone()),
    })
    .unwrap();
    let dims = Dimensions::new(4, 2);
    let pic = gradient(dims);
    display.init().unwrap();
    display.open(pic.info()).unwrap();
    display.update_window(&pic).unwrap();
    display.close().unwrap();
    display.uninit().unwrap();
    assert_eq!(display.presented(), 1);

    let img = image::open(&path).unwrap().into_luma8();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(3, 1).0, [70]);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn headless_requires_open_and_counts() {
    let mut display = HeadlessDisplay::new(&DisplaySettings::default()).unwrap();
    let pic = gradient(Dimensions::new(2, 2));
    assert!(display.update_window(&pic).is_err());
    display.open(pic.info()).unwrap();
    display.update_window(&pic).unwrap();
    display.update_window(&pic).unwrap();
    assert_eq!(display.presented(), 2);
    assert_eq!(display.last_sequence(), Some(0));
}
