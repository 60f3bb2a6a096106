//! Holding area for a source body until it has fully arrived.
//!
//! A zip entry cannot be taken back once its local header is written, so the
//! streamer collects each body here first and opens the entry only after the
//! download completed. Small bodies stay in memory; anything past the limit
//! moves to an anonymous temporary file that disappears when dropped.

use std::io::SeekFrom;

use futures_util::io::{AsyncWrite as FuturesAsyncWrite, AsyncWriteExt as _};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::archive::error::StreamError;

const COPY_BUFFER: usize = 64 * 1024;

/// A downloaded body waiting to become an entry.
#[derive(Debug)]
pub struct Spool {
    memory: Vec<u8>,
    file: Option<File>,
    memory_limit: usize,
    len: u64,
}

impl Spool {
    pub fn new(memory_limit: usize) -> Self {
        Self {
            memory: Vec::new(),
            file: None,
            memory_limit,
            len: 0,
        }
    }

    /// Bytes collected so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the body outgrew memory and lives in a temporary file.
    pub fn is_spilled(&self) -> bool {
        self.file.is_some()
    }

    /// Append one chunk of the body.
    pub async fn push(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        if self.file.is_none() {
            if self.memory.len() + chunk.len() <= self.memory_limit {
                self.memory.extend_from_slice(chunk);
                self.len += chunk.len() as u64;
                return Ok(());
            }
            self.spill().await?;
        }

        if let Some(file) = self.file.as_mut() {
            file.write_all(chunk).await.map_err(StreamError::Spool)?;
        }
        self.len += chunk.len() as u64;
        Ok(())
    }

    async fn spill(&mut self) -> Result<(), StreamError> {
        let file = tempfile::tempfile().map_err(StreamError::Spool)?;
        let mut file = File::from_std(file);
        file.write_all(&self.memory)
            .await
            .map_err(StreamError::Spool)?;
        tracing::debug!(buffered = self.memory.len(), "Spilling source body to disk");
        self.memory = Vec::new();
        self.file = Some(file);
        Ok(())
    }

    /// Copy the whole body into `out`.
    pub async fn drain_into<W>(self, out: &mut W) -> Result<(), StreamError>
    where
        W: FuturesAsyncWrite + Unpin,
    {
        let Some(mut file) = self.file else {
            out.write_all(&self.memory).await?;
            return Ok(());
        };

        file.flush().await.map_err(StreamError::Spool)?;
        file.seek(SeekFrom::Start(0))
            .await
            .map_err(StreamError::Spool)?;

        let mut buf = vec![0u8; COPY_BUFFER];
        loop {
            let n = file.read(&mut buf).await.map_err(StreamError::Spool)?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n]).await?;
        }
        Ok(())
    }
}
