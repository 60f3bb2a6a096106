//! Archive request types.

use serde::{Deserialize, Serialize};

/// One remote file to download and add to the archive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileRequest {
    /// Absolute URL of the source file.
    #[serde(rename = "url")]
    pub source_url: String,

    /// Name of the entry inside the archive. Duplicates are allowed.
    #[serde(rename = "filename")]
    pub entry_name: String,
}

impl FileRequest {
    pub fn new(source_url: impl Into<String>, entry_name: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            entry_name: entry_name.into(),
        }
    }
}
