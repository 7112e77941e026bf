//! EXIF capture time for photos

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// EXIF tags to try for date extraction, in priority order
const DATE_TAGS: &[Tag] = &[
    Tag::DateTimeOriginal,  // When the original image was taken
    Tag::DateTimeDigitized, // When the image was digitized
    Tag::DateTime,          // File modification date/time
];

/// The one format accepted for EXIF dates
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Source of embedded photo capture times.
///
/// `Ok(None)` means the file carries no date tag, `Err` that the metadata
/// block could not be read at all. Both degrade to the mtime fallback.
/// When only malformed values exist, one of them is returned as is so the
/// caller can report it.
pub trait PhotoMetadata {
    fn capture_time(&self, path: &Path) -> Result<Option<String>>;
}

/// Reads the raw EXIF date string with kamadak-exif
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifReader;

impl PhotoMetadata for ExifReader {
    fn capture_time(&self, path: &Path) -> Result<Option<String>> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let exif = Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| Error::ExifRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        // A blank or garbled tag must not hide a usable lower-priority one
        let mut malformed = None;
        for tag in DATE_TAGS {
            if let Some(field) = exif.get_field(*tag, In::PRIMARY)
                && let Value::Ascii(ref values) = field.value
                && let Some(raw) = values.first()
            {
                let value = String::from_utf8_lossy(raw).trim_end_matches('\0').to_string();
                if parse_exif_datetime(&value).is_ok() {
                    trace!(?path, ?tag, value = %value, "Found EXIF date");
                    return Ok(Some(value));
                }
                trace!(?path, ?tag, value = %value, "Skipping malformed EXIF date");
                malformed = Some(value);
            }
        }

        Ok(malformed)
    }
}

/// Parse an EXIF datetime, strictly `YYYY:MM:DD HH:MM:SS`
pub fn parse_exif_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), EXIF_DATETIME_FORMAT).map_err(|e| {
        Error::TimestampParse {
            source_info: format!("EXIF value '{}'", s),
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_exif_datetime() {
        let dt = parse_exif_datetime("2024:01:15 14:30:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
        assert_eq!(dt.second(), 0);
    }

    #[test]
    fn test_parse_exif_datetime_is_strict() {
        assert!(parse_exif_datetime("2024-01-15 14:30:00").is_err());
        assert!(parse_exif_datetime("2024:01:15").is_err());
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_err());
        assert!(parse_exif_datetime("    :  :     :  :  ").is_err());
        assert!(parse_exif_datetime("invalid").is_err());
    }

    /// JPEG whose IFD0 holds `DateTime` and whose Exif sub-IFD holds
    /// `DateTimeOriginal`
    fn jpeg_with_dates(datetime: &str, original: &str) -> Vec<u8> {
        fn ascii(s: &str) -> Vec<u8> {
            let mut v = s.as_bytes().to_vec();
            v.push(0);
            v
        }
        fn entry(tiff: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: u32) {
            tiff.extend_from_slice(&tag.to_le_bytes());
            tiff.extend_from_slice(&kind.to_le_bytes());
            tiff.extend_from_slice(&count.to_le_bytes());
            tiff.extend_from_slice(&value.to_le_bytes());
        }

        let datetime = ascii(datetime);
        let original = ascii(original);
        let datetime_at = 8 + 2 + 2 * 12 + 4;
        let exif_ifd_at = datetime_at + datetime.len() as u32;
        let original_at = exif_ifd_at + 2 + 12 + 4;

        let mut tiff = b"II*\0".to_vec();
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        entry(&mut tiff, 0x0132, 2, datetime.len() as u32, datetime_at);
        entry(&mut tiff, 0x8769, 4, 1, exif_ifd_at);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&datetime);
        tiff.extend_from_slice(&1u16.to_le_bytes());
        entry(&mut tiff, 0x9003, 2, original.len() as u32, original_at);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&original);

        let mut app1 = b"Exif\0\0".to_vec();
        app1.extend_from_slice(&tiff);

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        jpeg.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
        jpeg.extend_from_slice(&app1);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    fn read_dates(datetime: &str, original: &str) -> Option<String> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, jpeg_with_dates(datetime, original)).unwrap();
        ExifReader.capture_time(&path).unwrap()
    }

    #[test]
    fn test_exif_reader_prefers_date_time_original() {
        let value = read_dates("2021:06:15 08:00:00", "2020:02:29 23:59:59");
        assert_eq!(value.as_deref(), Some("2020:02:29 23:59:59"));
    }

    #[test]
    fn test_exif_reader_skips_blank_date_time_original() {
        let value = read_dates("2021:06:15 08:00:00", "    :  :     :  :  ");
        assert_eq!(value.as_deref(), Some("2021:06:15 08:00:00"));
    }

    #[test]
    fn test_exif_reader_returns_malformed_when_nothing_parses() {
        let value = read_dates("garbage", "    :  :     :  :  ").unwrap();
        assert!(parse_exif_datetime(&value).is_err());
    }

    #[test]
    fn test_exif_reader_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let err = ExifReader.capture_time(&path).unwrap_err();
        assert!(matches!(err, Error::ExifRead { .. }));
    }

    #[test]
    fn test_exif_reader_missing_file() {
        let err = ExifReader
            .capture_time(Path::new("/nonexistent/photo.jpg"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
