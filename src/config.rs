//! Configuration types for the capture sorter

use crate::media::MediaKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which classified files a run acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Copy photos only
    #[default]
    Photo,
    /// Convert videos only
    Video,
    /// Photos and videos
    Both,
}

impl ProcessingMode {
    /// Whether files of `kind` are acted upon in this mode
    pub fn accepts(&self, kind: MediaKind) -> bool {
        matches!(
            (self, kind),
            (ProcessingMode::Both, _)
                | (ProcessingMode::Photo, MediaKind::Photo)
                | (ProcessingMode::Video, MediaKind::Video)
        )
    }
}

/// Configuration for the capture sorter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory of the camera dump
    pub input_dir: PathBuf,

    /// Directory receiving renamed files (created if missing)
    pub output_dir: PathBuf,

    /// Processing mode
    #[serde(default)]
    pub mode: ProcessingMode,

    /// Audio codec videos are normalized to
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Bitrate used when audio has to be re-encoded
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// ffprobe program (name on PATH or absolute path)
    #[serde(default = "default_ffprobe")]
    pub ffprobe: PathBuf,

    /// ffmpeg program (name on PATH or absolute path)
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Dry run mode - resolve and name files without writing anything
    #[serde(default)]
    pub dry_run: bool,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Photo extensions (lowercase, without dot)
    #[serde(default = "default_photo_extensions")]
    pub photo_extensions: Vec<String>,

    /// Video extensions (lowercase, without dot)
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

fn default_audio_codec() -> String {
    "aac".into()
}

fn default_audio_bitrate() -> String {
    "192k".into()
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_photo_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png"].iter().map(|e| e.to_string()).collect()
}

fn default_video_extensions() -> Vec<String> {
    [
        "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "mpg", "mpeg", "m4v", "3gp", "3g2",
        "ts", "mts", "m2ts", "vob",
    ]
    .iter()
    .map(|e| e.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            mode: ProcessingMode::default(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            ffprobe: default_ffprobe(),
            ffmpeg: default_ffmpeg(),
            dry_run: false,
            verbose: false,
            photo_extensions: default_photo_extensions(),
            video_extensions: default_video_extensions(),
        }
    }
}

impl Config {
    /// Check if a file extension is a supported photo format
    pub fn is_photo(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.photo_extensions.iter().any(|e| e == &ext_lower)
    }

    /// Check if a file extension is a supported video format
    pub fn is_video(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.video_extensions.iter().any(|e| e == &ext_lower)
    }

    /// Classify an extension; `None` for files the pipeline ignores
    pub fn classify(&self, ext: &str) -> Option<MediaKind> {
        if self.is_photo(ext) {
            Some(MediaKind::Photo)
        } else if self.is_video(ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Capture Sorter Configuration File
# This file uses TOML format (https://toml.io)

# Root of the camera dump (walked recursively)
input_dir = "/media/camera/DCIM"

# Output directory, created if missing
output_dir = "/home/me/Pictures/sorted"

# Mode: "photo", "video", or "both"
mode = "photo"

# Videos are remuxed to MP4 with the video stream copied.
# Audio already in this codec is copied, anything else is re-encoded.
audio_codec = "aac"
audio_bitrate = "192k"

# External tools
ffprobe = "ffprobe"
ffmpeg = "ffmpeg"

# Dry run mode - show what would be done without actually doing it
dry_run = false

# Verbose output - show detailed processing information
verbose = false

# Recognized extensions
photo_extensions = ["jpg", "jpeg", "png"]
video_extensions = ["mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "mpg", "mpeg", "m4v", "3gp", "3g2", "ts", "mts", "m2ts", "vob"]
"#
        .to_string()
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
        }
    }
}
