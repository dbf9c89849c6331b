use super::*;

use std::thread;

#[test]
fn stage_names_match_thread_names() {
    assert_eq!(StageId::DecodeFeed(2).to_string(), "decode-feed[2]");
    assert_eq!(StageId::EncodeDrain.to_string(), "encode-drain");
}

#[test]
fn first_failure_wins_and_triggers_shutdown() {
    let monitor = Monitor::new(ShutdownSignal::new(), 2);
    monitor.fail(StageId::Compositor, PipelineError::engine("first"));
    monitor.fail(StageId::Display, PipelineError::engine("second"));
    assert!(monitor.shutdown().is_triggered());
    assert!(monitor.take_error().unwrap().to_string().contains("first"));
}

#[test]
fn end_of_stream_wait_returns_once_every_lane_finished() {
    let monitor = Monitor::new(ShutdownSignal::new(), 2);
    thread::scope(|s| {
        let guard = monitor.enter(StageId::DecodeFeed(0));
        s.spawn(move || {
            let m = guard.monitor();
            m.lane_finished(0);
            thread::sleep(Duration::from_millis(10));
            m.lane_finished(1);
        });
        monitor.wait_for_end_of_stream();
        assert!(monitor.all_lanes_finished());
    });
    assert_eq!(monitor.live(), 0);
}

#[test]
fn quiescence_times_out_while_a_stage_lives() {
    let monitor = Monitor::new(ShutdownSignal::new(), 1);
    let guard = monitor.enter(StageId::Display);
    assert!(!monitor.wait_for_quiescence(Duration::from_millis(20)));
    drop(guard);
    assert!(monitor.wait_for_quiescence(Duration::from_millis(20)));
}

#[test]
fn panicking_stage_is_recorded() {
    let monitor = Monitor::new(ShutdownSignal::new(), 1);
    thread::scope(|s| {
        let guard = monitor.enter(StageId::EncodeFeed);
        let handle = s.spawn(move || {
            let _guard = guard;
            panic!("boom");
        });
        assert!(handle.join().is_err());
    });
    assert!(monitor.has_failed());
    assert_eq!(monitor.live(), 0);
}
