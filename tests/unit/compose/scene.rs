use super::*;

use crate::media::picture::{BufferBackend, PictureInfo};

fn nv12(seq: u64) -> Picture {
    let info = PictureInfo::nv12(Dimensions::new(2, 2));
    Picture::from_bytes(info, seq, BufferBackend::Heap, vec![0; 6]).unwrap()
}

fn small_scene() -> SceneGraph {
    SceneGraph::new(CompositorParams {
        dimensions: Dimensions::new(8, 8),
        ..CompositorParams::default()
    })
    .unwrap()
}

#[test]
fn defaults_follow_reference_setup() {
    let p = CompositorParams::default();
    assert_eq!(p.dimensions, Dimensions::new(1920, 1080));
    assert_eq!(p.buffer_count, 3);
    assert_eq!(p.texture_format, PixelFormat::Nv12);
    assert!(p.flags.yuv && p.flags.external && p.flags.render_target);
}

#[test]
fn items_rebind_without_growing() {
    let mut scene = small_scene();
    let layer = scene.add_layer(LayerParams::default());
    let item = scene.add_item(layer, Rect::new(0.0, 0.0, 0.5, 0.5)).unwrap();
    scene.bind(item, nv12(0)).unwrap();
    scene.bind(item, nv12(1)).unwrap();
    assert_eq!(scene.item_count(), 1);
    assert_eq!(scene.item(item).unwrap().bound().unwrap().sequence(), 1);

    scene.release_bindings();
    assert_eq!(scene.bound_count(), 0);
    assert_eq!(scene.item_count(), 1);
    scene.clear();
    assert_eq!((scene.item_count(), scene.layer_count()), (0, 0));
}

#[test]
fn bind_rejects_foreign_formats_and_unknown_items() {
    let mut scene = small_scene();
    let layer = scene.add_layer(LayerParams::default());
    let item = scene.add_item(layer, Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    let rgba = PictureInfo::new(Dimensions::new(2, 2), PixelFormat::Rgba8, 8);
    let pic = Picture::from_bytes(rgba, 0, BufferBackend::Heap, vec![0; 16]).unwrap();
    assert!(scene.bind(item, pic).unwrap_err().is_format_mismatch());
    assert!(scene.bind(ItemId(7), nv12(0)).is_err());
    assert!(scene.add_item(LayerId(3), Rect::new(0.0, 0.0, 1.0, 1.0)).is_err());
    assert!(scene.add_item(layer, Rect::new(0.0, 0.0, 2.0, 1.0)).is_err());
}

#[test]
fn draw_order_sorts_layers_and_skips_hidden() {
    let mut scene = small_scene();
    let top = scene.add_layer(LayerParams {
        z_order: 5,
        visible: true,
    });
    let hidden = scene.add_layer(LayerParams {
        z_order: 0,
        visible: false,
    });
    let bottom = scene.add_layer(LayerParams {
        z_order: -1,
        visible: true,
    });
    let full = Rect::new(0.0, 0.0, 1.0, 1.0);
    let a = scene.add_item(top, full).unwrap();
    let b = scene.add_item(hidden, full).unwrap();
    let c = scene.add_item(bottom, full).unwrap();
    let unbound = scene.add_item(bottom, full).unwrap();
    scene.bind(a, nv12(10)).unwrap();
    scene.bind(b, nv12(20)).unwrap();
    scene.bind(c, nv12(30)).unwrap();
    let _ = unbound;

    let seqs: Vec<u64> = scene.draw_order().iter().map(|(_, p)| p.sequence()).collect();
    assert_eq!(seqs, vec![30, 10]);
}
