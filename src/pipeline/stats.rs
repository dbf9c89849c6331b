use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the workers while a run is in progress.
#[derive(Debug, Default)]
pub struct PipelineStats {
    pub cycles: AtomicU64,
    pub falling_behind: AtomicU64,
    pub fence_sweeps: AtomicU64,
    pub presented: AtomicU64,
    pub pictures_encoded: AtomicU64,
    pub packets: AtomicU64,
    pub bytes_written: AtomicU64,
}

impl PipelineStats {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn read(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Per-lane part of a [`RunReport`].
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct LaneReport {
    pub lane: usize,
    pub units_pushed: u64,
    pub pictures_decoded: u64,
    /// The lane delivered everything its decoder produced.
    pub exhausted: bool,
}

/// Summary of one pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RunReport {
    /// Composition cycles completed, equal to output pictures produced.
    pub cycles: u64,
    /// Cycles whose work overran the frame interval.
    pub falling_behind: u64,
    pub fence_sweeps: u64,
    pub lanes: Vec<LaneReport>,
    pub display_backend: Option<String>,
    pub presented: u64,
    pub display_overwrites: u64,
    pub pictures_encoded: u64,
    pub encode_overwrites: u64,
    pub packets: u64,
    pub bytes_written: u64,
    pub ring_overflows: u64,
    /// Stages were still busy when the drain timeout expired and were cut short.
    pub drain_timed_out: bool,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_owned())
    }
}
