//! CLI argument parsing with clap

use crate::config::{Config, ProcessingMode};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Capture Sorter - normalize camera dumps
///
/// Copies photos and remuxes videos into one directory, naming every file
/// after its capture date with a per-day sequence number.
#[derive(Parser, Debug)]
#[command(name = "capture-sorter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory for log files (defaults to `Log/` next to the executable)
    #[arg(long, global = true, env = "CAPTURE_SORTER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output log file as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve capture dates, rename and copy/convert a camera dump
    Run(RunArgs),

    /// Prompt for a date per .mp4 in a directory and rename/stamp it
    Tag {
        /// Directory holding the videos
        dir: PathBuf,
    },

    /// Write a sample configuration file
    InitConfig {
        /// Where to write the file
        path: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Root directory to scan for media files
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory for renamed files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Which files to act on
    #[arg(short = 'M', long, value_enum)]
    pub mode: Option<ProcessingMode>,

    /// ffprobe program
    #[arg(long)]
    pub ffprobe: Option<PathBuf>,

    /// ffmpeg program
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Cli {
    /// Short label for log file naming
    pub fn command_label(&self) -> String {
        match &self.command {
            Command::Run(args) => args
                .config
                .as_ref()
                .and_then(|p| p.file_stem())
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| "Run".to_string()),
            Command::Tag { .. } => "Tag".to_string(),
            Command::InitConfig { .. } => "InitConfig".to_string(),
        }
    }
}

impl RunArgs {
    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config, verbose: bool) -> Config {
        if let Some(ref input) = self.input {
            config.input_dir = input.clone();
        }
        if let Some(ref output) = self.output {
            config.output_dir = output.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(ref ffprobe) = self.ffprobe {
            config.ffprobe = ffprobe.clone();
        }
        if let Some(ref ffmpeg) = self.ffmpeg {
            config.ffmpeg = ffmpeg.clone();
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self, verbose: bool) -> Config {
        self.merge_with_config(Config::default(), verbose)
    }

    /// True when both directories were given on the command line
    pub fn has_paths(&self) -> bool {
        self.input.is_some() && self.output.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "capture-sorter",
            "run",
            "-i",
            "/dcim",
            "-o",
            "/sorted",
            "--mode",
            "both",
            "-n",
        ])
        .unwrap();

        let Command::Run(args) = &cli.command else {
            panic!("expected run");
        };
        assert!(args.has_paths());
        let config = args.to_config(cli.verbose);
        assert_eq!(config.input_dir, PathBuf::from("/dcim"));
        assert_eq!(config.output_dir, PathBuf::from("/sorted"));
        assert_eq!(config.mode, ProcessingMode::Both);
        assert!(config.dry_run);
        assert!(!config.verbose);
        assert_eq!(cli.command_label(), "Run");
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let file_config = Config {
            input_dir: PathBuf::from("/from/file"),
            mode: ProcessingMode::Video,
            ffmpeg: PathBuf::from("/opt/ffmpeg"),
            ..Config::default()
        };
        let args = RunArgs {
            config: Some(PathBuf::from("camera.toml")),
            input: Some(PathBuf::from("/from/cli")),
            ..RunArgs::default()
        };

        let merged = args.merge_with_config(file_config, true);
        assert_eq!(merged.input_dir, PathBuf::from("/from/cli"));
        assert_eq!(merged.mode, ProcessingMode::Video);
        assert_eq!(merged.ffmpeg, PathBuf::from("/opt/ffmpeg"));
        assert!(merged.verbose);
    }

    #[test]
    fn test_command_label_uses_config_stem() {
        let cli =
            Cli::try_parse_from(["capture-sorter", "-v", "run", "-C", "conf/laurie.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.command_label(), "laurie");
    }

    #[test]
    fn test_parse_tag() {
        let cli = Cli::try_parse_from(["capture-sorter", "tag", "/videos"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Tag { ref dir } if dir == &PathBuf::from("/videos")
        ));
        assert_eq!(cli.command_label(), "Tag");
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(Cli::try_parse_from(["capture-sorter", "run", "--mode", "audio"]).is_err());
    }
}
