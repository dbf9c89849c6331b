use super::*;

use crate::codec::raw::{RAW_CODEC, RawEncoder};
use crate::codec::{EncoderParams, EncoderSettings};
use crate::foundation::core::Dimensions;
use crate::media::picture::{BufferBackend, PictureInfo};
use crate::sink::MemorySink;
use crate::sync::mailbox::MailboxPolicy;
use crate::sync::shutdown::ShutdownSignal;

fn encoder(info: PictureInfo) -> RawEncoder {
    let mut enc = RawEncoder::new(&EncoderSettings {
        codec: RAW_CODEC.to_owned(),
        input: info,
    })
    .unwrap();
    enc.set_params(EncoderParams::default()).unwrap();
    enc.init().unwrap();
    enc.start().unwrap();
    enc
}

#[test]
fn packets_reach_the_sink_in_order_and_sink_is_closed() {
    let info = PictureInfo::nv12(Dimensions::new(2, 2));
    let shutdown = ShutdownSignal::new();
    let monitor = Monitor::new(shutdown.clone(), 1);
    let stats = PipelineStats::default();
    let mailbox = Mailbox::new("encode", MailboxPolicy::Blocking, &shutdown);
    let feed_done = AtomicBool::new(false);
    let enc = encoder(info);
    let lane = EncodeLane {
        encoder: &enc,
        mailbox: &mailbox,
        feed_done: &feed_done,
        poll: Duration::from_micros(50),
        stats: &stats,
        monitor: &monitor,
    };
    let mut sink = MemorySink::new();
    let handle = sink.handle();

    std::thread::scope(|s| {
        s.spawn(|| lane.run_feed());
        s.spawn(|| lane.run_drain(&mut sink));
        for seq in 0..3u8 {
            let pic =
                Picture::from_bytes(info, u64::from(seq), BufferBackend::Heap, vec![seq; 6]).unwrap();
            mailbox.put(pic).unwrap();
        }
        mailbox.finish();
    });

    let mut expected = vec![0u8; 6];
    expected.extend([1u8; 6]);
    expected.extend([2u8; 6]);
    assert_eq!(*handle.lock().unwrap(), expected);
    assert!(sink.is_closed());
    assert_eq!(PipelineStats::read(&stats.packets), 3);
    assert_eq!(PipelineStats::read(&stats.bytes_written), 18);
    assert!(!monitor.has_failed());
}

#[test]
fn geometry_mismatch_fails_the_feed() {
    let shutdown = ShutdownSignal::new();
    let monitor = Monitor::new(shutdown.clone(), 1);
    let stats = PipelineStats::default();
    let mailbox = Mailbox::new("encode", MailboxPolicy::LatestWins, &shutdown);
    let feed_done = AtomicBool::new(false);
    let enc = encoder(PictureInfo::nv12(Dimensions::new(4, 4)));
    let lane = EncodeLane {
        encoder: &enc,
        mailbox: &mailbox,
        feed_done: &feed_done,
        poll: Duration::from_micros(50),
        stats: &stats,
        monitor: &monitor,
    };
    let small = PictureInfo::nv12(Dimensions::new(2, 2));
    mailbox
        .put(Picture::from_bytes(small, 0, BufferBackend::Heap, vec![0; 6]).unwrap())
        .unwrap();
    lane.run_feed();
    assert!(feed_done.load(Ordering::Acquire));
    assert!(monitor.take_error().unwrap().is_format_mismatch());
}
