//! Media file identity and classification

use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

/// Kind of media, derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

/// A file discovered under the input root
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Source path
    pub path: PathBuf,
    /// Lower-cased extension without the dot
    pub extension: String,
    pub kind: MediaKind,
    /// Filesystem modification time, local wall clock
    pub modified: NaiveDateTime,
}

impl MediaFile {
    /// Build a media file, reading the modification time from disk
    pub fn from_path(path: &Path, kind: MediaKind) -> std::io::Result<Self> {
        let modified = fs::metadata(path)?.modified()?;
        let modified: DateTime<Local> = modified.into();
        Ok(Self::new(path, kind, modified.naive_local()))
    }

    pub fn new(path: &Path, kind: MediaKind, modified: NaiveDateTime) -> Self {
        Self {
            path: path.to_path_buf(),
            extension: extension_of(path),
            kind,
            modified,
        }
    }
}

/// Lower-cased extension of `path`, empty when there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}
