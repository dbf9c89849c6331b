use std::sync::Arc;

use crate::foundation::core::{Dimensions, PixelFormat};
use crate::foundation::error::{PipelineError, PipelineResult};

/// Where a pixel buffer lives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferBackend {
    /// Ordinary process heap.
    #[default]
    Heap,
    /// Memory mappable by decode/encode engines and the compositor alike, so a picture can move
    /// between them without a CPU copy.
    Shareable,
}

/// Backing storage of a [`Picture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    backend: BufferBackend,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    /// Zero-filled buffer of `len` bytes.
    pub fn allocate(backend: BufferBackend, len: usize) -> Self {
        Self {
            backend,
            bytes: vec![0; len],
        }
    }

    pub fn from_vec(backend: BufferBackend, bytes: Vec<u8>) -> Self {
        Self { backend, bytes }
    }

    pub fn backend(&self) -> BufferBackend {
        self.backend
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Geometry and layout of a picture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PictureInfo {
    pub dimensions: Dimensions,
    pub format: PixelFormat,
    pub bit_depth: u8,
}

impl PictureInfo {
    pub fn new(dimensions: Dimensions, format: PixelFormat, bit_depth: u8) -> Self {
        Self {
            dimensions,
            format,
            bit_depth,
        }
    }

    /// 8-bit NV12, the format every stage of the pipeline speaks by default.
    pub fn nv12(dimensions: Dimensions) -> Self {
        Self::new(dimensions, PixelFormat::Nv12, 8)
    }

    pub fn frame_bytes(&self) -> usize {
        self.format.frame_bytes(self.dimensions, self.bit_depth)
    }

    pub fn validate(&self, what: &str) -> PipelineResult<()> {
        if self.bit_depth == 0 || self.bit_depth > 16 {
            return Err(PipelineError::validation(format!(
                "{what} bit depth must be within 1..=16 (got {})",
                self.bit_depth
            )));
        }
        if self.format.is_yuv420() {
            self.dimensions.validate_even(what)
        } else if self.dimensions.area() == 0 {
            Err(PipelineError::validation(format!(
                "{what} dimensions must be non-zero (got {})",
                self.dimensions
            )))
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Display for PictureInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}/{}bit",
            self.dimensions, self.format, self.bit_depth
        )
    }
}

/// A decoded or composed picture.
///
/// Cloning shares the pixel buffer; a picture is never mutated once built, so any number of
/// consumers may read it concurrently.
#[derive(Clone, Debug)]
pub struct Picture {
    info: PictureInfo,
    sequence: u64,
    buffer: Arc<PixelBuffer>,
}

impl Picture {
    /// Wrap an existing buffer. The buffer must hold at least `info.frame_bytes()` bytes.
    pub fn new(info: PictureInfo, sequence: u64, buffer: Arc<PixelBuffer>) -> PipelineResult<Self> {
        let need = info.frame_bytes();
        if buffer.len() < need {
            return Err(PipelineError::validation(format!(
                "picture buffer holds {} bytes, {info} needs {need}",
                buffer.len()
            )));
        }
        Ok(Self {
            info,
            sequence,
            buffer,
        })
    }

    pub fn from_bytes(
        info: PictureInfo,
        sequence: u64,
        backend: BufferBackend,
        bytes: Vec<u8>,
    ) -> PipelineResult<Self> {
        Self::new(info, sequence, Arc::new(PixelBuffer::from_vec(backend, bytes)))
    }

    pub fn info(&self) -> &PictureInfo {
        &self.info
    }

    pub fn dimensions(&self) -> Dimensions {
        self.info.dimensions
    }

    pub fn width(&self) -> u32 {
        self.info.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.info.dimensions.height
    }

    pub fn format(&self) -> PixelFormat {
        self.info.format
    }

    pub fn bit_depth(&self) -> u8 {
        self.info.bit_depth
    }

    /// Production index: source unit index for decoded pictures, cycle index for composed ones.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn backend(&self) -> BufferBackend {
        self.buffer.backend()
    }

    /// Exactly `info.frame_bytes()` bytes of pixel data.
    pub fn data(&self) -> &[u8] {
        &self.buffer.as_slice()[..self.info.frame_bytes()]
    }

    /// `(luma, chroma)` planes of a 4:2:0 picture; `None` for packed formats.
    pub fn planes(&self) -> Option<(&[u8], &[u8])> {
        if !self.info.format.is_yuv420() {
            return None;
        }
        Some(self.data().split_at(self.info.dimensions.area()))
    }

    pub fn buffer(&self) -> &Arc<PixelBuffer> {
        &self.buffer
    }

    /// `true` when both pictures read the same backing buffer (zero-copy handoff).
    pub fn shares_buffer_with(&self, other: &Picture) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }

    /// Fail with `FormatMismatch` unless this is an 8-bit picture of `expected` format.
    pub fn ensure_format(&self, stage: &str, expected: PixelFormat) -> PipelineResult<()> {
        if self.info.format != expected || self.info.bit_depth != 8 {
            return Err(PipelineError::format_mismatch(
                stage,
                format!("{expected}/8bit"),
                format!("{}/{}bit", self.info.format, self.info.bit_depth),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/picture.rs"]
mod tests;
