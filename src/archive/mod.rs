//! Fetch-compress-stream pipeline.
//!
//! # Data Flow
//! ```text
//! Vec<FileRequest> (decoded by the HTTP layer)
//!     → validate.rs (first offending index, no I/O)
//!     → stream.rs (for each request, in order:
//!           Fetcher GET → spool.rs (whole body) → open zip entry
//!           → copy spooled bytes → close entry)
//!     → finalize: central directory + end record
//!     → sink (response pipe)
//! ```
//!
//! # Design Decisions
//! - Strictly sequential: one source is fully written before the next starts
//! - Skip-on-failure is a per-call policy, not a config global
//! - Sink failures are always fatal; nobody is left to read the archive
//! - An entry is opened only once its body arrived in full, so a failed
//!   source leaves nothing behind in the stream
//! - The archive is finalized on every exit path

pub mod error;
pub mod request;
pub mod spool;
pub mod stream;
pub mod validate;

pub use error::{StreamError, ValidationError, ValidationReason};
pub use request::FileRequest;
pub use stream::{ArchiveStreamer, StreamReport};
pub use validate::validate;
