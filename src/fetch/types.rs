//! Fetch error definitions.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while downloading one source file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connecting, sending, or receiving headers failed (includes timeouts).
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The source answered with something other than 200 OK.
    #[error("unexpected status {status}")]
    Status { status: StatusCode },

    /// The response body broke off before it was complete.
    #[error("body read failed: {0}")]
    Body(#[source] reqwest::Error),
}
