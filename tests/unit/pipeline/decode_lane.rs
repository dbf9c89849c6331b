use super::*;

use crate::codec::raw::{RAW_CODEC, RawDecoder};
use crate::codec::{Decoder, DecoderSettings};
use crate::foundation::core::Dimensions;
use crate::media::picture::{BufferBackend, PictureInfo};
use crate::source::VecSource;
use crate::sync::mailbox::MailboxPolicy;
use crate::sync::shutdown::ShutdownSignal;

fn decoder() -> RawDecoder {
    decoder_with_queue(4)
}

fn decoder_with_queue(queue_depth: usize) -> RawDecoder {
    let mut dec = RawDecoder::new(&DecoderSettings {
        lane: 0,
        codec: RAW_CODEC.to_owned(),
        output: PictureInfo::nv12(Dimensions::new(2, 2)),
        buffer_backend: BufferBackend::Heap,
        queue_depth,
    })
    .unwrap();
    dec.init().unwrap();
    dec.start().unwrap();
    dec
}

#[test]
fn lane_delivers_every_picture_in_order_then_finishes() {
    let shutdown = ShutdownSignal::new();
    let monitor = Monitor::new(shutdown.clone(), 1);
    let mailbox = Mailbox::new("lane0", MailboxPolicy::Blocking, &shutdown);
    let state = LaneState::new(0);
    let dec = decoder();
    let lane = DecodeLane {
        state: &state,
        decoder: &dec,
        mailbox: &mailbox,
        monitor: &monitor,
        poll: Duration::from_micros(50),
        max_in_flight: Some(1),
    };
    let mut source = VecSource::new((0..5u8).map(|i| vec![i; 6]));

    let received = std::thread::scope(|s| {
        s.spawn(|| lane.run_feed(&mut source));
        s.spawn(|| lane.run_drain());
        std::iter::from_fn(|| mailbox.take_blocking())
            .map(|p| p.sequence())
            .collect::<Vec<_>>()
    });

    assert_eq!(received, vec![0, 1, 2, 3, 4]);
    assert!(state.is_eos());
    assert!(state.is_exhausted());
    assert_eq!(state.status(), LaneStatus::Stopped);
    assert!(monitor.all_lanes_finished());
    assert_eq!(state.report().pictures_decoded, 5);
}

#[test]
fn abandoned_mailbox_stops_both_workers() {
    let shutdown = ShutdownSignal::new();
    let monitor = Monitor::new(shutdown.clone(), 1);
    let mailbox = Mailbox::new("lane0", MailboxPolicy::Blocking, &shutdown);
    let state = LaneState::new(0);
    let dec = decoder();
    let lane = DecodeLane {
        state: &state,
        decoder: &dec,
        mailbox: &mailbox,
        monitor: &monitor,
        poll: Duration::from_micros(50),
        max_in_flight: Some(2),
    };
    let mut source = VecSource::new((0..100u8).map(|i| vec![i; 6]));

    std::thread::scope(|s| {
        s.spawn(|| lane.run_feed(&mut source));
        s.spawn(|| lane.run_drain());
        assert_eq!(mailbox.take_blocking().map(|p| p.sequence()), Some(0));
        mailbox.abandon();
    });

    assert!(state.pushed() < 100);
    assert!(!state.is_exhausted());
    assert!(!monitor.has_failed());
}

#[test]
fn full_decoder_queue_holds_the_feed_back() {
    let shutdown = ShutdownSignal::new();
    let monitor = Monitor::new(shutdown.clone(), 1);
    let mailbox = Mailbox::new("lane0", MailboxPolicy::Blocking, &shutdown);
    let state = LaneState::new(0);
    let dec = decoder_with_queue(2);
    let lane = DecodeLane {
        state: &state,
        decoder: &dec,
        mailbox: &mailbox,
        monitor: &monitor,
        poll: Duration::from_micros(50),
        max_in_flight: None,
    };
    let mut source = VecSource::new((0..50u8).map(|i| vec![i; 6]));

    std::thread::scope(|s| {
        s.spawn(|| lane.run_feed(&mut source));
        // Nobody drains: only the decoder queue can fill.
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(state.pushed(), 2);
        assert!(!state.is_eos());
        shutdown.trigger();
    });

    assert!(state.is_eos());
    assert_eq!(state.pushed(), 2);
    assert!(!monitor.has_failed());
}

#[test]
fn push_failure_is_reported() {
    let shutdown = ShutdownSignal::new();
    let monitor = Monitor::new(shutdown.clone(), 1);
    let mailbox = Mailbox::new("lane0", MailboxPolicy::Blocking, &shutdown);
    let state = LaneState::new(0);
    let dec = decoder();
    let lane = DecodeLane {
        state: &state,
        decoder: &dec,
        mailbox: &mailbox,
        monitor: &monitor,
        poll: Duration::from_micros(50),
        max_in_flight: None,
    };
    let mut source = VecSource::new([vec![0u8; 5]]);
    lane.run_feed(&mut source);
    assert!(shutdown.is_triggered());
    assert!(monitor.take_error().is_some());
    lane.run_drain();
    assert!(mailbox.is_finished());
}
