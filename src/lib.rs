//! Capture Sorter - normalize a camera dump into date-sequenced files
//!
//! This library provides:
//! - Capture time resolution from EXIF (photos) and container metadata
//!   (videos, via FFprobe), falling back to file modification time
//! - Collision-free `YYYY_MM_DD_NNN.ext` naming with per-day counters
//! - Photo copying and MP4 remuxing (via FFmpeg) into an output directory
//! - A manual tagging session for videos whose dates must be typed in

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod naming;
pub mod probe;
pub mod process;
pub mod tagger;
pub mod time;
pub mod transcode;

pub use cli::{Cli, Command, RunArgs};
pub use config::{Config, ConfigError, ProcessingMode};
pub use error::{Error, Result};
pub use media::{MediaFile, MediaKind};
pub use naming::DateCounterTable;
pub use process::{FileResult, ProcessingStats, ProcessingStatus, Processor, Toolchain};
pub use tagger::{ManualTagger, TagSummary};
pub use time::{ResolvedTimestamp, TimeSource, TimestampResolver};
