//! `/zip` handlers.
//!
//! Both methods decode a file list, validate it, and answer with an archive
//! that is produced while the client reads it. Once the 200 and headers are
//! out, later failures can only cut the body short.

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, RawQuery, State},
    http::StatusCode,
    response::Response,
};
use chrono::Local;
use tokio_util::io::ReaderStream;
use tracing::Instrument;

use crate::archive::{validate, FileRequest};
use crate::http::request::{decode_files, files_param};
use crate::http::response::{archive_file_name, error_response, zip_response};
use crate::http::server::AppState;
use crate::observability::metrics;

/// `GET /zip?files=[...]`
pub async fn zip_from_query(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let files = files_param(query.as_deref());
    respond(state, decode_files(files.as_bytes()))
}

/// `POST /zip` with a JSON array body.
pub async fn zip_from_body(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => respond(state, decode_files(&body)),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejecting unreadable body");
            metrics::record_request("malformed");
            error_response(StatusCode::BAD_REQUEST, rejection.body_text())
        }
    }
}

fn respond(state: AppState, decoded: Result<Vec<FileRequest>, serde_json::Error>) -> Response {
    let files = match decoded {
        Ok(files) => files,
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting undecodable file list");
            metrics::record_request("malformed");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    if let Err(e) = validate(&files) {
        tracing::debug!(index = e.index, error = %e, "Rejecting invalid file list");
        metrics::record_request("invalid");
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    metrics::record_request("streamed");
    let file_name = archive_file_name(&Local::now());
    let (writer, reader) = tokio::io::duplex(state.archive.pipe_capacity);
    let streamer = state.streamer.clone();
    let skip_on_failure = state.archive.skip_on_failure;

    tracing::info!(files = files.len(), archive = %file_name, "Streaming archive");

    tokio::spawn(
        async move {
            match streamer.stream(&files, writer, skip_on_failure).await {
                Ok(report) => tracing::info!(
                    written = report.entries_written,
                    skipped = report.entries_skipped,
                    bytes = report.bytes_copied,
                    "Archive complete"
                ),
                Err(e) => tracing::warn!(error = %e, "Archive stream aborted"),
            }
        }
        .instrument(tracing::Span::current()),
    );

    zip_response(&file_name, Body::from_stream(ReaderStream::new(reader)))
}
