//! Container metadata probing via FFprobe

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::trace;

/// Metadata prober for audio/video containers.
///
/// Both lookups return `Ok(None)` when the tool ran but produced nothing
/// usable (non-zero exit, missing tag, empty output). `Err` is reserved for
/// failures to run the tool at all.
pub trait MediaProbe {
    /// Container-level `creation_time` tag
    fn creation_time(&self, path: &Path) -> Result<Option<String>>;

    /// Codec name of the first audio stream
    fn audio_codec(&self, path: &Path) -> Result<Option<String>>;
}

/// Subprocess-backed prober
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: PathBuf,
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl Ffprobe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the ffprobe invocation printing a single bare value
    pub fn build_command(&self, path: &Path, select_streams: &str, entries: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "-v",
            "error",
            "-select_streams",
            select_streams,
            "-show_entries",
            entries,
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ]);
        cmd.arg(path);
        cmd
    }

    fn query(&self, path: &Path, select_streams: &str, entries: &str) -> Result<Option<String>> {
        let output = self
            .build_command(path, select_streams, entries)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::FfprobeNotFound,
                _ => Error::VideoMetadata {
                    path: path.to_path_buf(),
                    message: format!("Failed to execute ffprobe: {}", e),
                },
            })?;

        if !output.status.success() {
            trace!(
                ?path,
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "FFprobe reported failure"
            );
            return Ok(None);
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        trace!(?path, entries, value = %value, "FFprobe output");

        Ok(first_line(&value))
    }
}

impl MediaProbe for Ffprobe {
    fn creation_time(&self, path: &Path) -> Result<Option<String>> {
        self.query(path, "v:0", "format_tags=creation_time")
    }

    fn audio_codec(&self, path: &Path) -> Result<Option<String>> {
        self.query(path, "a:0", "stream=codec_name")
    }
}

/// First non-empty line of tool output
fn first_line(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
