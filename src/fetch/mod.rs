//! Source file fetching.
//!
//! # Data Flow
//! ```text
//! FetchConfig (timeouts, user agent)
//!     → client.rs (Fetcher: one immutable reqwest client)
//!     → GET source URL, one attempt
//!     → 200 response handed to the archive streamer
//!     → anything else becomes a FetchError
//! ```
//!
//! # Design Decisions
//! - The client is built once from config and passed in, never a global
//! - Every fetch has a total deadline covering headers and body
//! - No retries; a failed fetch is reported once and the caller decides

pub mod client;
pub mod types;

pub use client::Fetcher;
pub use types::FetchError;
