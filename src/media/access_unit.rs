use std::sync::Arc;

/// One coded frame's worth of bitstream, as sliced by an upstream framer.
///
/// Immutable once built; cloning shares the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessUnit {
    index: u64,
    data: Arc<[u8]>,
}

impl AccessUnit {
    /// `index` is the unit's position in its source (0-based).
    pub fn new(index: u64, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            index,
            data: data.into(),
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
