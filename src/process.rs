//! Main file processor
//!
//! Handles the core logic of:
//! - Walking the input tree
//! - Classifying files and gating them by mode
//! - Resolving capture times and allocating date-sequenced names
//! - Copying photos and remuxing videos into the output directory
//!
//! Processing is strictly sequential. A failure on one file is logged and
//! recorded in its [`FileResult`]; it never stops the run.

use crate::config::Config;
use crate::error::Result;
use crate::media::{MediaFile, MediaKind, extension_of};
use crate::naming::DateCounterTable;
use crate::probe::{Ffprobe, MediaProbe};
use crate::time::exif::{ExifReader, PhotoMetadata};
use crate::time::{ResolvedTimestamp, TimestampResolver};
use crate::transcode::{AudioPolicy, Ffmpeg, TranscodeRequest, Transcoder};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, warn};
use walkdir::WalkDir;

/// Extension every converted video receives
pub const VIDEO_EXTENSION: &str = ".mp4";

/// Audio codec reported when the source cannot be probed
pub const UNKNOWN_CODEC: &str = "unknown";

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Destination file path (if one was allocated)
    pub destination: Option<PathBuf>,
    /// Resolved capture time
    pub timestamp: Option<ResolvedTimestamp>,
    /// Processing status
    pub status: ProcessingStatus,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl FileResult {
    fn skipped(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: None,
            timestamp: None,
            status: ProcessingStatus::Skipped,
            error: None,
        }
    }
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    /// File was copied or converted
    Success,
    /// Not a recognized media file, or excluded by the mode
    Skipped,
    /// Processing failed
    Failed,
    /// Dry run - name allocated, nothing written
    DryRun,
}

/// Processing statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub photos: usize,
    pub videos: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Photos: {}, Videos: {}, Skipped: {}, Failed: {}",
            self.total_files, self.photos, self.videos, self.skipped, self.failed
        )
    }
}

/// External collaborators used by the processor
pub struct Toolchain {
    pub photo_metadata: Box<dyn PhotoMetadata>,
    pub probe: Box<dyn MediaProbe>,
    pub transcoder: Box<dyn Transcoder>,
}

impl Toolchain {
    /// kamadak-exif, ffprobe and ffmpeg as configured
    pub fn from_config(config: &Config) -> Self {
        Self {
            photo_metadata: Box::new(ExifReader),
            probe: Box::new(Ffprobe::new(&config.ffprobe)),
            transcoder: Box::new(Ffmpeg::new(&config.ffmpeg)),
        }
    }
}

/// Main processor for normalizing a camera dump
pub struct Processor {
    config: Config,
    tools: Toolchain,
    counters: DateCounterTable,
    stats: ProcessingStats,
}

impl Processor {
    /// Create a processor backed by the real media tools
    pub fn new(config: Config) -> Self {
        let tools = Toolchain::from_config(&config);
        Self::with_toolchain(config, tools)
    }

    /// Create a processor with explicit collaborators
    pub fn with_toolchain(config: Config, tools: Toolchain) -> Self {
        Self {
            config,
            tools,
            counters: DateCounterTable::new(),
            stats: ProcessingStats::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn counters(&self) -> &DateCounterTable {
        &self.counters
    }

    /// Walk the input tree and process every regular file in enumeration order
    pub fn run(&mut self) -> Result<Vec<FileResult>> {
        let _span = span!(Level::INFO, "processor_run").entered();

        if !self.config.dry_run {
            fs::create_dir_all(&self.config.output_dir)?;
        }

        let input_dir = self.config.input_dir.clone();
        if !input_dir.exists() {
            warn!(?input_dir, "Input directory does not exist, nothing to do");
            return Ok(Vec::new());
        }

        info!(?input_dir, mode = ?self.config.mode, "Starting processing");

        let mut results = Vec::new();
        for entry in WalkDir::new(&input_dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Failed to read directory entry, skipping");
                    continue;
                }
            };

            if entry.path().is_file() {
                results.push(self.process(entry.path()));
            }
        }

        info!(summary = %self.stats.summary(), "Processing complete");
        Ok(results)
    }

    /// Classify one file and route it to the photo copier or video converter.
    ///
    /// Errors are caught here: they are logged and reported as
    /// [`ProcessingStatus::Failed`].
    pub fn process(&mut self, path: &Path) -> FileResult {
        let _file_span = span!(Level::DEBUG, "process_file", ?path).entered();
        self.stats.total_files += 1;

        let kind = match self.config.classify(&extension_of(path)) {
            Some(kind) if self.config.mode.accepts(kind) => kind,
            _ => {
                debug!(?path, "Not selected by mode, skipping");
                self.stats.skipped += 1;
                return FileResult::skipped(path);
            }
        };

        let file = match MediaFile::from_path(path, kind) {
            Ok(file) => file,
            Err(e) => {
                error!(?path, error = %e, "Failed to read file metadata");
                return self.failed(path, None, e.to_string());
            }
        };

        let time_info = self.resolver().resolve(&file);

        let outcome = match kind {
            MediaKind::Photo => {
                info!(?path, "Copying photo");
                self.copy_photo(&file, &time_info)
            }
            MediaKind::Video => {
                info!(?path, "Processing video");
                self.convert_video(&file, &time_info)
            }
        };

        match outcome {
            Ok(destination) => {
                let status = if self.config.dry_run {
                    ProcessingStatus::DryRun
                } else {
                    ProcessingStatus::Success
                };
                match kind {
                    MediaKind::Photo => self.stats.photos += 1,
                    MediaKind::Video => self.stats.videos += 1,
                }
                FileResult {
                    source: path.to_path_buf(),
                    destination: Some(destination),
                    timestamp: Some(time_info),
                    status,
                    error: None,
                }
            }
            Err(e) => {
                match kind {
                    MediaKind::Photo => error!(?path, error = %e, "Error copying photo"),
                    MediaKind::Video if e.is_encode_failure() => {
                        error!(?path, error = %e, "Error converting video (FFmpeg failed)")
                    }
                    MediaKind::Video => error!(?path, error = %e, "Error converting video"),
                }
                self.failed(path, Some(time_info), e.to_string())
            }
        }
    }

    /// Copy a photo to its date-sequenced name, keeping the source's
    /// permissions and file times
    pub fn copy_photo(
        &mut self,
        file: &MediaFile,
        time_info: &ResolvedTimestamp,
    ) -> Result<PathBuf> {
        let name = self
            .counters
            .name_for(&time_info.timestamp, &format!(".{}", file.extension));
        let destination = self.config.output_dir.join(name);

        if self.config.dry_run {
            info!(source = ?file.path, ?destination, "Would copy");
            return Ok(destination);
        }

        copy_preserving_times(&file.path, &destination)?;
        info!(?destination, "Copied");

        Ok(destination)
    }

    /// Remux a video into `.mp4`, stream-copying video and normalizing audio
    pub fn convert_video(
        &mut self,
        file: &MediaFile,
        time_info: &ResolvedTimestamp,
    ) -> Result<PathBuf> {
        let name = self.counters.name_for(&time_info.timestamp, VIDEO_EXTENSION);
        let destination = self.config.output_dir.join(name);

        let source_codec = match self.tools.probe.audio_codec(&file.path) {
            Ok(Some(codec)) => codec,
            Ok(None) => UNKNOWN_CODEC.to_string(),
            Err(e) => {
                debug!(path = ?file.path, error = %e, "Audio probe failed");
                UNKNOWN_CODEC.to_string()
            }
        };

        let request = TranscodeRequest {
            source: file.path.clone(),
            destination: destination.clone(),
            audio: AudioPolicy::for_source(
                &source_codec,
                &self.config.audio_codec,
                &self.config.audio_bitrate,
            ),
            copy_metadata: true,
            faststart: true,
        };
        debug!(?request, source_codec = %source_codec, "Built transcode request");

        if self.config.dry_run {
            info!(source = ?file.path, ?destination, "Would convert");
            return Ok(destination);
        }

        self.tools.transcoder.transcode(&request)?;
        info!(?destination, "Converted");

        Ok(destination)
    }

    fn resolver(&self) -> TimestampResolver<'_> {
        TimestampResolver::new(self.tools.photo_metadata.as_ref(), self.tools.probe.as_ref())
    }

    fn failed(
        &mut self,
        path: &Path,
        timestamp: Option<ResolvedTimestamp>,
        error: String,
    ) -> FileResult {
        self.stats.failed += 1;
        FileResult {
            source: path.to_path_buf(),
            destination: None,
            timestamp,
            status: ProcessingStatus::Failed,
            error: Some(error),
        }
    }
}

/// Byte copy that carries over permissions and access/modification times
fn copy_preserving_times(source: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, dest)?;

    let metadata = fs::metadata(source)?;
    filetime::set_file_times(
        dest,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;

    Ok(())
}
