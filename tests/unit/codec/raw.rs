use super::*;

use crate::foundation::core::{Dimensions, PixelFormat};
use crate::media::picture::{BufferBackend, PictureInfo};

fn decoder_settings(info: PictureInfo) -> DecoderSettings {
    DecoderSettings {
        lane: 0,
        codec: RAW_CODEC.to_owned(),
        output: info,
        buffer_backend: BufferBackend::Shareable,
        queue_depth: 4,
    }
}

fn running_decoder(info: PictureInfo) -> RawDecoder {
    let mut dec = RawDecoder::new(&decoder_settings(info)).unwrap();
    dec.init().unwrap();
    dec.start().unwrap();
    dec
}

#[test]
fn decoder_emits_pictures_in_push_order() {
    let info = PictureInfo::nv12(Dimensions::new(4, 4));
    let dec = running_decoder(info);
    assert!(!dec.can_pop());
    dec.push(AccessUnit::new(0, vec![1u8; 24])).unwrap();
    dec.push(AccessUnit::new(1, vec![2u8; 24])).unwrap();
    assert!(dec.can_pop());

    let a = dec.pop().unwrap();
    let b = dec.pop().unwrap();
    assert_eq!((a.sequence(), a.data()[0]), (0, 1));
    assert_eq!((b.sequence(), b.data()[0]), (1, 2));
    assert_eq!(a.backend(), BufferBackend::Shareable);
    assert!(dec.pop().is_none());
    assert_eq!(dec.decoded(), 2);
}

#[test]
fn decoder_rejects_wrong_unit_size_and_push_before_start() {
    let info = PictureInfo::nv12(Dimensions::new(4, 4));
    let idle = RawDecoder::new(&decoder_settings(info)).unwrap();
    assert!(idle.push(AccessUnit::new(0, vec![0u8; 24])).is_err());

    let dec = running_decoder(info);
    assert!(dec.push(AccessUnit::new(0, vec![0u8; 23])).is_err());
}

#[test]
fn decoder_queue_is_bounded() {
    let info = PictureInfo::nv12(Dimensions::new(4, 4));
    let dec = running_decoder(info);
    for i in 0..4 {
        assert!(dec.can_push());
        dec.push(AccessUnit::new(i, vec![0u8; 24])).unwrap();
    }
    assert!(!dec.can_push());
    let err = dec.push(AccessUnit::new(4, vec![0u8; 24])).unwrap_err();
    assert!(err.to_string().contains("queue full"));
    assert_eq!(dec.decoded(), 4);

    assert_eq!(dec.pop().map(|p| p.sequence()), Some(0));
    assert!(dec.can_push());
    dec.push(AccessUnit::new(4, vec![0u8; 24])).unwrap();
}

#[test]
fn decoder_rejects_zero_queue_depth() {
    let mut settings = decoder_settings(PictureInfo::nv12(Dimensions::new(4, 4)));
    settings.queue_depth = 0;
    assert!(RawDecoder::new(&settings).is_err());
}

#[test]
fn decoder_init_rejects_deep_pictures() {
    let info = PictureInfo::new(Dimensions::new(4, 4), PixelFormat::Nv12, 10);
    let mut dec = RawDecoder::new(&decoder_settings(info)).unwrap();
    assert!(dec.init().unwrap_err().is_fatal_init());
}

fn encoder(info: PictureInfo) -> RawEncoder {
    RawEncoder::new(&EncoderSettings {
        codec: RAW_CODEC.to_owned(),
        input: info,
    })
    .unwrap()
}

#[test]
fn encoder_requires_params_before_init() {
    let mut enc = encoder(PictureInfo::nv12(Dimensions::new(2, 2)));
    assert!(enc.init().is_err());
    enc.set_params(EncoderParams::default()).unwrap();
    enc.init().unwrap();
    assert!(enc.set_params(EncoderParams::default()).is_err());
}

#[test]
fn encoder_marks_keyframes_per_gop() {
    let info = PictureInfo::nv12(Dimensions::new(2, 2));
    let mut enc = encoder(info);
    enc.set_params(EncoderParams {
        gop: 2,
        ..EncoderParams::default()
    })
    .unwrap();
    enc.init().unwrap();
    enc.start().unwrap();

    for seq in 0..3u64 {
        let pic = Picture::from_bytes(info, seq, BufferBackend::Heap, vec![seq as u8; 6]).unwrap();
        enc.push(pic).unwrap();
    }
    let packets: Vec<Packet> = std::iter::from_fn(|| enc.pop()).collect();
    let keys: Vec<bool> = packets.iter().map(|p| p.keyframe).collect();
    assert_eq!(keys, vec![true, false, true]);
    assert_eq!(packets[1].data, vec![1u8; 6]);
    assert_eq!(packets[2].sequence, 2);
    assert!(!enc.can_pop());
}

#[test]
fn encoder_reports_geometry_mismatch() {
    let mut enc = encoder(PictureInfo::nv12(Dimensions::new(4, 4)));
    enc.set_params(EncoderParams::default()).unwrap();
    enc.init().unwrap();
    enc.start().unwrap();
    let small = PictureInfo::nv12(Dimensions::new(2, 2));
    let pic = Picture::from_bytes(small, 0, BufferBackend::Heap, vec![0; 6]).unwrap();
    assert!(enc.push(pic).unwrap_err().is_format_mismatch());
}
