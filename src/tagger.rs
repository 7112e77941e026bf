//! Manual date tagging for videos without usable metadata
//!
//! Walks the `.mp4` files of one directory in name order and asks for a
//! date per file. Each tagged file is renamed in place to
//! `YYYY_MM_DD_<n>.mp4` and its access/modification times are set to local
//! midnight of that date. `<n>` is a single counter for the whole session,
//! bumped only after a successful rename.
//!
//! This tool shares no state with the batch pipeline.

use crate::error::{Error, Result};
use crate::media::extension_of;
use chrono::{Local, NaiveDate, TimeZone};
use filetime::FileTime;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Format the user types dates in
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of a tagging session
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagSummary {
    /// (old path, new path) for each renamed file
    pub tagged: Vec<(PathBuf, PathBuf)>,
    pub skipped: usize,
    /// True when the user quit before the last file
    pub aborted: bool,
}

/// Interactive tagging session over one directory
pub struct ManualTagger {
    dir: PathBuf,
    counter: u32,
}

impl ManualTagger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: 0,
        }
    }

    /// `.mp4` files directly inside the directory, sorted by name
    pub fn candidates(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(Error::Config(format!(
                "Not a directory: {}",
                self.dir.display()
            )));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && extension_of(p) == "mp4")
            .collect();
        files.sort();
        Ok(files)
    }

    /// Run the prompt loop. An empty answer skips a file, `q` ends the session.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<TagSummary> {
        let files = self.candidates()?;
        let mut summary = TagSummary::default();

        if files.is_empty() {
            writeln!(output, "No .mp4 files in {}", self.dir.display())?;
            return Ok(summary);
        }

        for (index, file) in files.iter().enumerate() {
            loop {
                write!(
                    output,
                    "[{}/{}] {} - date (YYYY-MM-DD, empty to skip, q to quit): ",
                    index + 1,
                    files.len(),
                    file.display()
                )?;
                output.flush()?;

                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    summary.aborted = true;
                    return Ok(summary);
                }
                let answer = line.trim();

                if answer.is_empty() {
                    summary.skipped += 1;
                    break;
                }
                if answer.eq_ignore_ascii_case("q") {
                    summary.aborted = true;
                    return Ok(summary);
                }

                let date = match NaiveDate::parse_from_str(answer, INPUT_DATE_FORMAT) {
                    Ok(date) => date,
                    Err(_) => {
                        writeln!(output, "Invalid date format. Use YYYY-MM-DD.")?;
                        continue;
                    }
                };

                match self.tag(file, date) {
                    Ok(new_path) => {
                        writeln!(output, "-> {}", new_path.display())?;
                        summary.tagged.push((file.clone(), new_path));
                        break;
                    }
                    Err(e) => {
                        warn!(path = ?file, error = %e, "Failed to rename");
                        writeln!(output, "Failed to rename: {}", e)?;
                    }
                }
            }
        }

        info!(
            tagged = summary.tagged.len(),
            skipped = summary.skipped,
            "Tagging session complete"
        );
        Ok(summary)
    }

    /// Rename `file` for `date` and stamp its times. Advances the counter on success.
    ///
    /// An error means the file was left where it was. Once the rename has
    /// happened the file counts as tagged, even if its times could not be set.
    pub fn tag(&mut self, file: &Path, date: NaiveDate) -> Result<PathBuf> {
        let time = midnight_file_time(date)?;
        let new_path = self.dir.join(tagged_name(date, self.counter));
        fs::rename(file, &new_path)?;
        self.counter += 1;

        if let Err(e) = filetime::set_file_times(&new_path, time, time) {
            warn!(path = ?new_path, error = %e, "Renamed but failed to update time");
        }

        info!(from = ?file, to = ?new_path, "Tagged video");
        Ok(new_path)
    }
}

/// `YYYY_MM_DD_<n>.mp4`, counter not padded
pub fn tagged_name(date: NaiveDate, counter: u32) -> String {
    format!("{}_{}.mp4", date.format("%Y_%m_%d"), counter)
}

fn midnight_file_time(date: NaiveDate) -> Result<FileTime> {
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| Error::TimestampParse {
        source_info: date.to_string(),
        message: "invalid midnight".into(),
    })?;
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| Error::TimestampParse {
            source_info: date.to_string(),
            message: "midnight does not exist in the local time zone".into(),
        })?;
    Ok(FileTime::from_unix_time(local.timestamp(), 0))
}
