//! Video remuxing via FFmpeg

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// What happens to the audio stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPolicy {
    /// Stream-copy the source audio
    Copy,
    /// Re-encode to `codec` at `bitrate`
    Encode { codec: String, bitrate: String },
}

impl AudioPolicy {
    /// Copy when the source already uses `target_codec`, re-encode otherwise
    pub fn for_source(source_codec: &str, target_codec: &str, bitrate: &str) -> Self {
        if source_codec == target_codec {
            AudioPolicy::Copy
        } else {
            AudioPolicy::Encode {
                codec: target_codec.to_string(),
                bitrate: bitrate.to_string(),
            }
        }
    }
}

/// A single remux job. The video stream is always stream-copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub audio: AudioPolicy,
    /// Propagate container metadata from the source
    pub copy_metadata: bool,
    /// Move the index to the front of the file
    pub faststart: bool,
}

/// Transcoding executor. Blocks until the encode finishes.
pub trait Transcoder {
    /// Fails with [`Error::Encode`] when the encoder exits unsuccessfully
    fn transcode(&self, request: &TranscodeRequest) -> Result<()>;
}

/// Subprocess-backed executor
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn build_command(&self, request: &TranscodeRequest) -> Command {
        let mut cmd = Command::new(&self.program);

        // Destination names can repeat across runs; overwrite without prompting.
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"]);
        cmd.arg(&request.source);

        if request.copy_metadata {
            cmd.args(["-map_metadata", "0"]);
        }

        cmd.args(["-c:v", "copy"]);

        if request.faststart {
            cmd.args(["-movflags", "+faststart"]);
        }

        match &request.audio {
            AudioPolicy::Copy => {
                cmd.args(["-c:a", "copy"]);
            }
            AudioPolicy::Encode { codec, bitrate } => {
                cmd.args(["-c:a", codec.as_str(), "-b:a", bitrate.as_str()]);
            }
        }

        cmd.arg(&request.destination);
        cmd
    }
}

impl Transcoder for Ffmpeg {
    fn transcode(&self, request: &TranscodeRequest) -> Result<()> {
        let mut cmd = self.build_command(request);
        debug!(command = ?cmd, "Running ffmpeg");

        let status = cmd.status().map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::FfmpegNotFound,
            _ => Error::Io(e),
        })?;

        if !status.success() {
            return Err(Error::Encode {
                path: request.source.clone(),
                status: status.code(),
            });
        }

        Ok(())
    }
}
