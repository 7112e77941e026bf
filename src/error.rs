//! Error types for the capture sorter

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for capture sorter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the capture sorter
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to parse timestamp from {source_info}: {message}")]
    TimestampParse { source_info: String, message: String },

    #[error("Failed to extract video metadata from {path}: {message}")]
    VideoMetadata { path: PathBuf, message: String },

    #[error("FFprobe not found. Please install FFmpeg and ensure ffprobe is in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg not found. Please install FFmpeg and ensure ffmpeg is in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg failed on {path} ({})", exit_label(.status))]
    Encode { path: PathBuf, status: Option<i32> },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True when an external encoder ran and reported failure
    pub fn is_encode_failure(&self) -> bool {
        matches!(self, Error::Encode { .. })
    }
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}
