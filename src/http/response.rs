//! Response construction.
//!
//! # Responsibilities
//! - Render errors as `{"error":{"message": ...}}`
//! - Set zip content type and attachment file name
//! - Wrap the archive pipe as a streaming body
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - No Content-Length on archives; the size is unknown until the end

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Error body returned for rejected requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    pub error: ErrorMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// JSON error response with the given status.
/// Example output: 400 { "error": { "message": "an error occurred" } }
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponseBody {
        error: ErrorMessage {
            message: message.into(),
        },
    };
    (status, Json(body)).into_response()
}

/// Download name for an archive produced at `now`, e.g. `Files 2024-03-01 at 14.05.09.zip`.
pub fn archive_file_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("Files {}.zip", now.format("%Y-%m-%d at %H.%M.%S"))
}

/// 200 response streaming `body` as a zip attachment named `file_name`.
pub fn zip_response(file_name: &str, body: Body) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
