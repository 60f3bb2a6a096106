//! Request list validation.
//!
//! Runs before any network I/O. Stops at the first offending request so the
//! reported index always points at the earliest problem.

use url::Url;

use crate::archive::error::{ValidationError, ValidationReason};
use crate::archive::request::FileRequest;

/// Check every request in order, failing on the first invalid one.
pub fn validate(requests: &[FileRequest]) -> Result<(), ValidationError> {
    for (index, request) in requests.iter().enumerate() {
        if !is_absolute_url(&request.source_url) {
            return Err(ValidationError {
                index,
                reason: ValidationReason::InvalidUrl {
                    url: request.source_url.clone(),
                },
            });
        }
        if request.entry_name.is_empty() {
            return Err(ValidationError {
                index,
                reason: ValidationReason::EmptyName,
            });
        }
    }
    Ok(())
}

/// Scheme and host must both be present.
fn is_absolute_url(raw: &str) -> bool {
    // the parser strips these silently; the fetch would then use a different url
    if raw.trim() != raw || raw.chars().any(|c| c.is_ascii_control()) {
        return false;
    }
    match Url::parse(raw) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}
