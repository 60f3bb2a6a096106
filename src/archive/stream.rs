//! Streaming archive writer.
//!
//! # Responsibilities
//! - Fetch each requested source in list order, one at a time
//! - Copy response bodies chunk by chunk into zip entries
//! - Apply the skip-on-failure policy to fetch failures
//! - Finalize the archive on every exit path
//!
//! # Design Decisions
//! - Entries carry data descriptors, so the sink never needs to seek
//! - Each body is spooled in full before its entry is opened, so a source
//!   that breaks off mid-body leaves no header or data in the output
//! - Spooling is bounded in memory; larger bodies spill to a temp file
//! - Sink and writer errors are fatal regardless of policy

use std::time::Instant;

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipEntryBuilder};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::archive::error::StreamError;
use crate::archive::request::FileRequest;
use crate::archive::spool::Spool;
use crate::config::CompressionMode;
use crate::fetch::{FetchError, Fetcher};
use crate::observability::metrics;

/// Summary of a completed stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamReport {
    /// Entries written to the archive.
    pub entries_written: usize,
    /// Requests dropped because their source could not be fetched.
    pub entries_skipped: usize,
    /// Source bytes copied into entries, before compression.
    pub bytes_copied: u64,
}

/// Downloads sources and writes them as a zip archive to a sink.
///
/// Holds only immutable state, so one streamer can serve every request.
#[derive(Debug, Clone)]
pub struct ArchiveStreamer {
    fetcher: Fetcher,
    compression: Compression,
    spool_memory_limit: usize,
}

const DEFAULT_SPOOL_MEMORY_LIMIT: usize = 8 * 1024 * 1024;

impl ArchiveStreamer {
    /// Create a streamer that downloads through `fetcher`.
    pub fn new(fetcher: Fetcher, compression: CompressionMode) -> Self {
        let compression = match compression {
            CompressionMode::Deflate => Compression::Deflate,
            CompressionMode::Stored => Compression::Stored,
        };
        Self {
            fetcher,
            compression,
            spool_memory_limit: DEFAULT_SPOOL_MEMORY_LIMIT,
        }
    }

    /// Bytes of each body kept in memory before spilling to disk.
    pub fn with_spool_limit(mut self, limit: usize) -> Self {
        self.spool_memory_limit = limit;
        self
    }

    /// Write `requests` as an archive into `sink`.
    ///
    /// With `skip_on_failure`, sources that fail to download are left out and
    /// streaming continues. Without it, the first fetch failure ends the
    /// archive early and is returned. Either way the archive is finalized
    /// before returning, so what reached the sink is a readable zip.
    pub async fn stream<W>(
        &self,
        requests: &[FileRequest],
        sink: W,
        skip_on_failure: bool,
    ) -> Result<StreamReport, StreamError>
    where
        W: AsyncWrite + Unpin,
    {
        let started = Instant::now();
        let mut writer = ZipFileWriter::with_tokio(sink);

        let outcome = self
            .write_entries(&mut writer, requests, skip_on_failure)
            .await;
        let finished = finish(writer).await;

        let result = match (outcome, finished) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(finish_err)) => {
                tracing::debug!(error = %finish_err, "Archive finalize failed after abort");
                Err(e)
            }
        };

        metrics::record_stream(started, result.is_ok());
        result
    }

    async fn write_entries<W>(
        &self,
        writer: &mut ZipFileWriter<W>,
        requests: &[FileRequest],
        skip_on_failure: bool,
    ) -> Result<StreamReport, StreamError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut report = StreamReport::default();

        for (index, request) in requests.iter().enumerate() {
            match self.write_entry(writer, index, request).await {
                Ok(bytes) => {
                    tracing::debug!(
                        index,
                        entry = %request.entry_name,
                        bytes,
                        "Entry written"
                    );
                    metrics::record_entry_written(bytes);
                    report.entries_written += 1;
                    report.bytes_copied += bytes;
                }
                Err(err) if skip_on_failure && err.is_skippable() => {
                    tracing::warn!(
                        index,
                        url = %request.source_url,
                        error = %err,
                        "Skipping source that could not be fetched"
                    );
                    metrics::record_entry_skipped();
                    report.entries_skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    /// Fetch one source in full, then write it as a new entry. Returns the bytes copied.
    async fn write_entry<W>(
        &self,
        writer: &mut ZipFileWriter<W>,
        index: usize,
        request: &FileRequest,
    ) -> Result<u64, StreamError>
    where
        W: AsyncWrite + Unpin,
    {
        let fetch_failed = |source| StreamError::Fetch {
            index,
            url: request.source_url.clone(),
            source,
        };

        let mut response = self
            .fetcher
            .get(&request.source_url)
            .await
            .map_err(fetch_failed)?;

        let mut spool = Spool::new(self.spool_memory_limit);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| fetch_failed(FetchError::Body(e)))?
        {
            spool.push(&chunk).await?;
        }
        let copied = spool.len();

        let entry = ZipEntryBuilder::new(request.entry_name.clone().into(), self.compression);
        let mut entry_writer = writer.write_entry_stream(entry).await?;
        spool.drain_into(&mut entry_writer).await?;
        entry_writer.close().await?;
        Ok(copied)
    }
}

/// Write the central directory and flush the sink.
async fn finish<W>(writer: ZipFileWriter<W>) -> Result<(), StreamError>
where
    W: AsyncWrite + Unpin,
{
    let mut sink = writer.close().await?.into_inner();
    sink.shutdown().await?;
    Ok(())
}
