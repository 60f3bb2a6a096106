//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id + trace middleware)
//!     → request.rs (decode file list from query string or body)
//!     → zip.rs (validate, spawn archive streamer, stream response)
//!     → response.rs (zip headers, JSON error bodies)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod zip;

pub use response::{ErrorMessage, ErrorResponseBody};
pub use server::{bind, AppState, HttpServer, ServiceError};
