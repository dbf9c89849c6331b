use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::foundation::error::{PipelineError, PipelineResult};
use crate::media::access_unit::AccessUnit;

/// Ordered supply of access units for one decode lane.
///
/// `Ok(None)` means the stream is exhausted; once exhausted, every later call returns `Ok(None)`.
pub trait CodedSource: Send {
    fn next_unit(&mut self) -> PipelineResult<Option<AccessUnit>>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String {
        "source".to_owned()
    }
}

/// In-memory source, mainly for tests.
#[derive(Debug, Default)]
pub struct VecSource {
    units: VecDeque<Vec<u8>>,
    next_index: u64,
}

impl VecSource {
    pub fn new(units: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            units: units.into_iter().collect(),
            next_index: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.units.len()
    }
}

impl CodedSource for VecSource {
    fn next_unit(&mut self) -> PipelineResult<Option<AccessUnit>> {
        let Some(data) = self.units.pop_front() else {
            return Ok(None);
        };
        let unit = AccessUnit::new(self.next_index, data);
        self.next_index += 1;
        Ok(Some(unit))
    }

    fn describe(&self) -> String {
        format!("memory ({} units left)", self.units.len())
    }
}

/// Slices a file into fixed-size access units.
///
/// Fits raw frame dumps, where every coded unit has the same size. A short trailing chunk is
/// dropped with a warning and ends the stream.
pub struct FrameChunkSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    chunk_len: usize,
    next_index: u64,
}

impl FrameChunkSource {
    pub fn open(path: impl AsRef<Path>, chunk_len: usize) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        if chunk_len == 0 {
            return Err(PipelineError::validation(format!(
                "chunk length for '{}' must be > 0",
                path.display()
            )));
        }
        let file = File::open(&path).map_err(|e| {
            PipelineError::validation(format!("open input '{}': {e}", path.display()))
        })?;
        Ok(Self {
            path,
            reader: Some(BufReader::new(file)),
            chunk_len,
            next_index: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fill `buf` as far as the file allows; returns bytes read.
    fn read_chunk(reader: &mut BufReader<File>, buf: &mut [u8]) -> PipelineResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

impl CodedSource for FrameChunkSource {
    fn next_unit(&mut self) -> PipelineResult<Option<AccessUnit>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        let mut buf = vec![0u8; self.chunk_len];
        let filled = Self::read_chunk(reader, &mut buf)?;
        if filled < self.chunk_len {
            if filled > 0 {
                tracing::warn!(
                    path = %self.path.display(),
                    trailing = filled,
                    chunk = self.chunk_len,
                    "dropping short trailing chunk"
                );
            }
            self.reader = None;
            return Ok(None);
        }
        let unit = AccessUnit::new(self.next_index, buf);
        self.next_index += 1;
        Ok(Some(unit))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
#[path = "../tests/unit/source.rs"]
mod tests;
