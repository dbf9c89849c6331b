use std::sync::Arc;

use crate::foundation::error::{PipelineError, PipelineResult};
use crate::media::picture::{BufferBackend, PictureInfo, PixelBuffer};

/// Fixed set of reusable output buffers.
///
/// A slot is recycled only when the ring holds the sole reference to it. When every slot is
/// still held downstream, a transient buffer is allocated instead and counted as an overflow.
#[derive(Debug)]
pub struct FrameRing {
    info: PictureInfo,
    backend: BufferBackend,
    slots: Vec<Arc<PixelBuffer>>,
    next: usize,
    overflows: u64,
}

impl FrameRing {
    pub fn new(info: PictureInfo, backend: BufferBackend, count: usize) -> PipelineResult<Self> {
        if count == 0 {
            return Err(PipelineError::validation("frame ring needs at least one slot"));
        }
        let len = info.frame_bytes();
        Ok(Self {
            info,
            backend,
            slots: (0..count)
                .map(|_| Arc::new(PixelBuffer::allocate(backend, len)))
                .collect(),
            next: 0,
            overflows: 0,
        })
    }

    pub fn info(&self) -> &PictureInfo {
        &self.info
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots currently referenced outside the ring.
    pub fn in_flight(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| Arc::strong_count(s) > 1)
            .count()
    }

    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Fill the next free buffer with `fill` and hand out a shared reference to it.
    pub fn write_next(&mut self, fill: impl FnOnce(&mut [u8])) -> Arc<PixelBuffer> {
        let len = self.slots.len();
        let free = (0..len)
            .map(|step| (self.next + step) % len)
            .find(|&i| Arc::strong_count(&self.slots[i]) == 1 && Arc::weak_count(&self.slots[i]) == 0);

        if let Some(idx) = free
            && let Some(buf) = Arc::get_mut(&mut self.slots[idx])
        {
            fill(buf.as_mut_slice());
            self.next = (idx + 1) % len;
            return Arc::clone(&self.slots[idx]);
        }

        self.overflows += 1;
        tracing::debug!(
            capacity = len,
            overflows = self.overflows,
            "all output buffers in flight, allocating a transient one"
        );
        let mut buf = PixelBuffer::allocate(self.backend, self.info.frame_bytes());
        fill(buf.as_mut_slice());
        Arc::new(buf)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/ring.rs"]
mod tests;
