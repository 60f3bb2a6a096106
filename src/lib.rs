//! Streaming zip service library.

pub mod archive;
pub mod config;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use archive::{ArchiveStreamer, FileRequest, StreamError, StreamReport, ValidationError};
pub use config::ServiceConfig;
pub use fetch::Fetcher;
pub use http::{HttpServer, ServiceError};
pub use lifecycle::Shutdown;
