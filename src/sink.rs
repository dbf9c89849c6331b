use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::foundation::error::{PipelineError, PipelineResult};

/// Append-only destination for encoded packets.
///
/// Bytes are appended in the order the encoder emits them. `close` is called exactly once at
/// shutdown, after the final `flush`.
pub trait ByteSink: Send {
    fn append(&mut self, bytes: &[u8]) -> PipelineResult<()>;
    fn flush(&mut self) -> PipelineResult<()>;
    fn close(&mut self) -> PipelineResult<()>;
}

/// Buffered file sink.
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl FileSink {
    /// Create (or truncate) `path`, creating missing parent directories.
    pub fn create(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    fn writer(&mut self) -> PipelineResult<&mut BufWriter<File>> {
        self.writer.as_mut().ok_or_else(|| {
            PipelineError::validation(format!("sink '{}' is already closed", self.path.display()))
        })
    }
}

impl ByteSink for FileSink {
    fn append(&mut self, bytes: &[u8]) -> PipelineResult<()> {
        self.writer()?.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> PipelineResult<()> {
        match self.writer.as_mut() {
            Some(w) => Ok(w.flush()?),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> PipelineResult<()> {
        if let Some(mut w) = self.writer.take() {
            w.flush()?;
            w.get_ref().sync_all()?;
        }
        Ok(())
    }
}

/// In-memory sink. Clones of [`MemorySink::handle`] observe the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    bytes: Arc<Mutex<Vec<u8>>>,
    appends: usize,
    closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the collected bytes, usable after the sink moved into a pipeline run.
    pub fn handle(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.bytes)
    }

    pub fn contents(&self) -> Vec<u8> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn appends(&self) -> usize {
        self.appends
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ByteSink for MemorySink {
    fn append(&mut self, bytes: &[u8]) -> PipelineResult<()> {
        if self.closed {
            return Err(PipelineError::validation("memory sink is already closed"));
        }
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
        self.appends += 1;
        Ok(())
    }

    fn flush(&mut self) -> PipelineResult<()> {
        Ok(())
    }

    fn close(&mut self) -> PipelineResult<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/sink.rs"]
mod tests;
