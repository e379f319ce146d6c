use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;

use anchorage_chunk::ChunkError;

use crate::error::OrchestratorError;

/// A store request: exactly one byte source, plus optional chunking
/// overrides.
///
/// Built with the fluent setters and consumed by
/// [`Anchorage::store_and_anchor`](crate::Anchorage::store_and_anchor).
/// Supplying both a file path and an in-memory buffer, or neither, is
/// rejected when the request is resolved.
#[derive(Clone, Debug, Default)]
pub struct StoreRequest {
    file_path: Option<PathBuf>,
    bytes: Option<Vec<u8>>,
    max_block_size: Option<usize>,
}

impl StoreRequest {
    /// An empty request. At least one source must be set before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// A request sourcing bytes from a file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// A request sourcing bytes from an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
            ..Self::default()
        }
    }

    /// Set the file source.
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Set the in-memory source.
    pub fn bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.bytes = Some(bytes.into());
        self
    }

    /// Override the maximum data block size for this request.
    pub fn max_block_size(mut self, size: usize) -> Self {
        self.max_block_size = Some(size);
        self
    }

    /// Check the mutual-exclusion rule and produce the byte source.
    pub(crate) fn resolve(self) -> Result<(ByteSource, Option<usize>), OrchestratorError> {
        let source = match (self.file_path, self.bytes) {
            (Some(_), Some(_)) => {
                return Err(OrchestratorError::InvalidInput(
                    "file path and byte buffer cannot be provided simultaneously".into(),
                ))
            }
            (None, None) => {
                return Err(OrchestratorError::InvalidInput(
                    "provide either a file path or a byte buffer".into(),
                ))
            }
            (Some(path), None) => {
                if !path.exists() {
                    return Err(OrchestratorError::InvalidInput(format!(
                        "file {} does not exist",
                        path.display()
                    )));
                }
                ByteSource::FilePath(path)
            }
            (None, Some(bytes)) => ByteSource::Bytes(bytes),
        };
        Ok((source, self.max_block_size))
    }
}

/// A resolved byte source, ready to open.
#[derive(Debug)]
pub(crate) enum ByteSource {
    FilePath(PathBuf),
    Bytes(Vec<u8>),
}

impl ByteSource {
    pub(crate) fn open(self) -> Result<Box<dyn Read>, OrchestratorError> {
        match self {
            Self::FilePath(path) => {
                let file = File::open(&path)
                    .map_err(|e| OrchestratorError::Chunk(ChunkError::Read(e)))?;
                Ok(Box::new(file))
            }
            Self::Bytes(bytes) => Ok(Box::new(Cursor::new(bytes))),
        }
    }
}
