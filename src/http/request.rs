//! Request decoding.
//!
//! # Responsibilities
//! - Read the file list from the `files` query parameter (GET)
//! - Read the file list from the JSON body (POST)
//! - Surface serde's message untouched so clients see what failed
//!
//! # Design Decisions
//! - The query string is parsed leniently; only the first `files` value counts
//! - A missing `files` parameter decodes like an empty body and fails
//! - JSON `null` decodes to an empty list

use url::form_urlencoded;

use crate::archive::FileRequest;

/// The first `files` value of a raw query string, or empty when absent.
pub fn files_param(query: Option<&str>) -> String {
    query
        .and_then(|query| {
            form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "files")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default()
}

/// Decode a JSON array of file requests.
pub fn decode_files(raw: &[u8]) -> Result<Vec<FileRequest>, serde_json::Error> {
    serde_json::from_slice::<Option<Vec<FileRequest>>>(raw).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_files_value_wins() {
        assert_eq!(files_param(Some("files=%5B%5D&files=null")), "[]");
        assert_eq!(files_param(Some("other=1&files=%5Bx")), "[x");
    }

    #[test]
    fn missing_files_is_empty() {
        assert_eq!(files_param(None), "");
        assert_eq!(files_param(Some("other=1")), "");
    }

    #[test]
    fn bad_escapes_pass_through_to_json() {
        assert_eq!(files_param(Some("files=%ZZ")), "%ZZ");
        assert!(decode_files(files_param(Some("files=%ZZ")).as_bytes()).is_err());
    }

    #[test]
    fn decodes_array() {
        let files = decode_files(br#"[{"url":"http://a/b","filename":"b"}]"#).unwrap();
        assert_eq!(files, vec![FileRequest::new("http://a/b", "b")]);
    }

    #[test]
    fn null_is_empty() {
        assert!(decode_files(b"null").unwrap().is_empty());
    }

    #[test]
    fn empty_input_fails() {
        let err = decode_files(b"").unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn wrong_shape_fails() {
        assert!(decode_files(br#"{"url":"http://a/b","filename":"b"}"#).is_err());
        assert!(decode_files(br#"[{"url":1,"filename":"b"}]"#).is_err());
    }
}
