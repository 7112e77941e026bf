//! Capture time resolution
//!
//! Every media file gets a timestamp. Embedded metadata wins whenever it
//! parses; otherwise the filesystem modification time is used:
//! - photos: EXIF date tag, with a warning on every fallback
//! - videos: container `creation_time` via the prober; a missing tag falls
//!   back silently, unusable data or a failing prober with a warning

pub mod exif;
pub mod video;

use crate::media::{MediaFile, MediaKind};
use crate::probe::MediaProbe;
use self::exif::{PhotoMetadata, parse_exif_datetime};
use self::video::parse_video_datetime;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

/// Source of the resolved timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// Read from EXIF or container metadata
    EmbeddedMetadata,
    /// From file system modification time
    FileSystem,
}

/// Result of timestamp resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTimestamp {
    /// Wall-clock capture time
    pub timestamp: NaiveDateTime,
    /// Offset stated by the metadata, if any; never applied
    pub offset: Option<FixedOffset>,
    pub source: TimeSource,
}

impl ResolvedTimestamp {
    fn embedded(timestamp: NaiveDateTime, offset: Option<FixedOffset>) -> Self {
        Self {
            timestamp,
            offset,
            source: TimeSource::EmbeddedMetadata,
        }
    }

    fn fallback(file: &MediaFile) -> Self {
        Self {
            timestamp: file.modified,
            offset: None,
            source: TimeSource::FileSystem,
        }
    }

    /// Calendar date used for naming
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Resolves capture times against injected metadata collaborators
pub struct TimestampResolver<'a> {
    photo: &'a dyn PhotoMetadata,
    probe: &'a dyn MediaProbe,
}

impl<'a> TimestampResolver<'a> {
    pub fn new(photo: &'a dyn PhotoMetadata, probe: &'a dyn MediaProbe) -> Self {
        Self { photo, probe }
    }

    /// Resolve the capture time of `file`. Never fails; only the provenance
    /// degrades.
    pub fn resolve(&self, file: &MediaFile) -> ResolvedTimestamp {
        match file.kind {
            MediaKind::Photo => self.resolve_photo(file),
            MediaKind::Video => self.resolve_video(file),
        }
    }

    fn resolve_photo(&self, file: &MediaFile) -> ResolvedTimestamp {
        let path = &file.path;

        let raw = match self.photo.capture_time(path) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!(?path, "No EXIF date tag, falling back to mtime");
                return ResolvedTimestamp::fallback(file);
            }
            Err(e) => {
                warn!(?path, error = %e, "Unreadable EXIF data, falling back to mtime");
                return ResolvedTimestamp::fallback(file);
            }
        };

        match parse_exif_datetime(&raw) {
            Ok(timestamp) => {
                debug!(?path, %timestamp, "Resolved time from EXIF");
                ResolvedTimestamp::embedded(timestamp, None)
            }
            Err(e) => {
                warn!(?path, error = %e, "Malformed EXIF date, falling back to mtime");
                ResolvedTimestamp::fallback(file)
            }
        }
    }

    fn resolve_video(&self, file: &MediaFile) -> ResolvedTimestamp {
        let path = &file.path;

        let raw = match self.probe.creation_time(path) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => {
                debug!(?path, "No creation_time tag, using mtime");
                return ResolvedTimestamp::fallback(file);
            }
            Err(e) => {
                warn!(?path, error = %e, "Error probing video, falling back to mtime");
                return ResolvedTimestamp::fallback(file);
            }
        };

        match parse_video_datetime(&raw) {
            Some((timestamp, offset)) => {
                debug!(?path, %timestamp, "Resolved time from video metadata");
                ResolvedTimestamp::embedded(timestamp, offset)
            }
            None => {
                warn!(?path, value = %raw, "Could not parse video creation time, using mtime");
                ResolvedTimestamp::fallback(file)
            }
        }
    }
}
