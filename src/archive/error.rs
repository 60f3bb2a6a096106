//! Error definitions for validation and streaming.

use thiserror::Error;

use crate::fetch::FetchError;

/// Why a request was rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// The source URL is unparsable or lacks a scheme or host.
    InvalidUrl { url: String },
    /// The entry name is empty.
    EmptyName,
}

/// The first invalid request of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Zero-based position of the offending request.
    pub index: usize,
    pub reason: ValidationReason,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            ValidationReason::InvalidUrl { url } => write!(
                f,
                "invalid data at index {}: '{}' is not a valid url",
                self.index, url
            ),
            ValidationReason::EmptyName => write!(
                f,
                "invalid data at index {}: file name cannot be empty",
                self.index
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors that end an archive stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A source could not be downloaded and skipping was not allowed.
    #[error("failed to fetch '{url}' (index {index}): {source}")]
    Fetch {
        index: usize,
        url: String,
        #[source]
        source: FetchError,
    },

    /// The destination stopped accepting bytes.
    #[error("archive sink failed: {0}")]
    Sink(#[from] std::io::Error),

    /// A body could not be held while it downloaded.
    #[error("failed to spool source body: {0}")]
    Spool(#[source] std::io::Error),

    /// The zip writer failed, usually because the sink beneath it did.
    #[error("archive writer failed: {0}")]
    Archive(#[from] async_zip::error::ZipError),
}

impl StreamError {
    /// Only fetch failures may be skipped; everything else means the output is gone.
    pub fn is_skippable(&self) -> bool {
        matches!(self, StreamError::Fetch { .. })
    }
}
