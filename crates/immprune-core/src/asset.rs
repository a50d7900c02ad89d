use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

use crate::key;

/// An item in the local Photos library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    /// Opaque library identifier
    pub id: String,
    /// NFC-normalized, lowercased filename
    pub filename: String,
    /// File size in bytes (0 when the library does not report it)
    pub size: u64,
    /// Capture timestamp
    pub date: Option<DateTime<Utc>>,
    pub is_video: bool,
    /// Path of the original on disk, when known
    pub path: Option<String>,
}

impl LocalAsset {
    pub fn new(id: impl Into<String>, filename: &str, size: u64, date: Option<DateTime<Utc>>) -> Self {
        Self {
            id: id.into(),
            filename: key::normalize_name(filename),
            size,
            date,
            is_video: false,
            path: None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// Name shown in progress output.
    pub fn display_name(&self) -> &str {
        if !self.filename.is_empty() {
            return &self.filename;
        }
        self.path
            .as_deref()
            .and_then(|p| std::path::Path::new(p).file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("(unknown)")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExifInfo {
    #[serde(rename = "fileSizeInByte", default)]
    pub file_size_in_byte: Option<u64>,
}

/// An entry of the Immich catalog as returned by the metadata search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAsset {
    #[serde(default)]
    pub original_file_name: String,
    #[serde(default)]
    pub file_size_in_byte: Option<u64>,
    #[serde(default)]
    pub exif_info: Option<ExifInfo>,
    #[serde(default)]
    pub date_time_original: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
}

impl RemoteAsset {
    /// Primary size, or the exif size when the primary one is missing or zero.
    pub fn effective_size(&self) -> u64 {
        match self.file_size_in_byte {
            Some(size) if size > 0 => size,
            _ => self
                .exif_info
                .as_ref()
                .and_then(|e| e.file_size_in_byte)
                .unwrap_or(0),
        }
    }

    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref().filter(|c| !c.is_empty())
    }
}
