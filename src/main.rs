//! Capture Sorter - normalize camera dumps
//!
//! Resolves capture dates for photos and videos, names every file
//! `YYYY_MM_DD_NNN.ext` and copies or remuxes it into one output directory.

use anyhow::Result;
use capture_sorter::cli::{Cli, Command, RunArgs};
use capture_sorter::{Config, ManualTagger, ProcessingStatus, Processor};
use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli_output {
    //! Colored summary output for the terminal

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
        pub const ACCENT: Color = Color::Cyan;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_title(title: &str) {
        let padding = (60usize.saturating_sub(title.len())) / 2;
        let _ = stdout().execute(Print(format!(
            "{}{}\n\n",
            " ".repeat(padding),
            title.bold()
        )));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_stat(key: &str, value: &str, color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value).with(color).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_result(status_icon: &str, status_color: Color, source: &str, dest_or_msg: &str) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(status_icon).with(status_color).bold()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(source).italic()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(dest_or_msg).with(CliTheme::HINT)));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_log_path(path: &str) {
        let _ = stdout().execute(Print("\n"));
        let _ = stdout().execute(Print(style("  Log file: ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig { path } = &cli.command {
        std::fs::write(path, Config::sample_config())?;
        println!("Sample configuration written to {}", path.display());
        return Ok(());
    }

    let log_path = get_log_path(&cli)?;
    let _guard = setup_logging(&cli, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Capture Sorter starting");
    info!(log_file = %log_path.display(), "Log file location");

    match &cli.command {
        Command::Run(args) => run_batch(&cli, args, &log_path),
        Command::Tag { dir } => run_tagger(dir),
        Command::InitConfig { .. } => Ok(()),
    }
}

/// Run the batch pipeline and print a summary
fn run_batch(cli: &Cli, args: &RunArgs, log_path: &Path) -> Result<()> {
    let config = load_config(cli, args)?;

    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    validate_config(&config)?;

    let mut processor = Processor::new(config);

    let results = match processor.run() {
        Ok(results) => results,
        Err(e) => {
            error!(error = %e, "Processing failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    use cli_output::*;

    print_separator();
    print_title("Processing complete");
    print_separator();

    let stats = processor.stats();
    print_blank();
    print_stat("Photos copied", &stats.photos.to_string(), CliTheme::SUCCESS);
    print_stat("Videos converted", &stats.videos.to_string(), CliTheme::SUCCESS);
    print_stat("Skipped", &stats.skipped.to_string(), CliTheme::WARNING);
    print_stat("Failed", &stats.failed.to_string(), CliTheme::ERROR);
    print_blank();

    if cli.verbose {
        print_separator();
        for result in &results {
            let source = result.source.display().to_string();
            let dest = result
                .destination
                .as_ref()
                .map(|p| format!("→ {}", p.display()))
                .unwrap_or_default();
            match result.status {
                ProcessingStatus::Success => print_result("✓", CliTheme::SUCCESS, &source, &dest),
                ProcessingStatus::DryRun => print_result("~", CliTheme::ACCENT, &source, &dest),
                ProcessingStatus::Skipped => {
                    print_result("⊘", CliTheme::WARNING, &source, "skipped")
                }
                ProcessingStatus::Failed => print_result(
                    "✗",
                    CliTheme::ERROR,
                    &source,
                    result.error.as_deref().unwrap_or("unknown error"),
                ),
            }
        }
    }

    let failed: Vec<_> = results
        .iter()
        .filter(|r| r.status == ProcessingStatus::Failed)
        .collect();

    if !failed.is_empty() {
        print_separator();
        print_error(&format!("{} files failed", failed.len()));
        print_blank();
        for result in &failed {
            print_result(
                "✗",
                CliTheme::ERROR,
                &result.source.display().to_string(),
                result.error.as_deref().unwrap_or("unknown error"),
            );
        }
    }

    if processor.config().dry_run {
        print_separator();
        print_warning("Dry run: nothing was written");
    }

    print_separator();
    print_log_path(&log_path.display().to_string());

    info!(log_file = %log_path.display(), "Processing complete. Log saved to");
    Ok(())
}

/// Run the interactive tagging session on stdin/stdout
fn run_tagger(dir: &Path) -> Result<()> {
    let mut tagger = ManualTagger::new(dir);
    let stdin = std::io::stdin();
    let summary = tagger.run(stdin.lock(), std::io::stdout())?;

    println!(
        "Tagged {} file(s), skipped {}{}",
        summary.tagged.len(),
        summary.skipped,
        if summary.aborted { " (stopped early)" } else { "" }
    );
    Ok(())
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Log file path: `<log dir>/<label>_<timestamp>.log`
fn get_log_path(cli: &Cli) -> Result<PathBuf> {
    let log_dir = match &cli.log_dir {
        Some(dir) => dir.clone(),
        None => get_executable_dir()?.join("Log"),
    };
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    Ok(log_dir.join(format!("{}_{}.log", cli.command_label(), timestamp)))
}

/// Resolve config path - a bare name is looked up with a `.toml` extension
fn resolve_config_path(config_path: &Path) -> PathBuf {
    if config_path.exists() || config_path.extension().is_some() {
        return config_path.to_path_buf();
    }
    config_path.with_extension("toml")
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, args: &RunArgs) -> Result<Config> {
    let config = if let Some(ref config_path) = args.config {
        let resolved_path = resolve_config_path(config_path);
        info!(config_file = %resolved_path.display(), "Loading configuration from file");
        let file_config = Config::load_from_file(&resolved_path)?;
        args.merge_with_config(file_config, cli.verbose)
    } else {
        if !args.has_paths() {
            anyhow::bail!("Both --input and --output are required without --config");
        }
        args.to_config(cli.verbose)
    };

    Ok(config)
}

/// Setup logging (file + stderr)
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(fmt::layer().json().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(guard)
}

/// Validate configuration before processing
fn validate_config(config: &Config) -> Result<()> {
    if !config.input_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", config.input_dir.display());
    }

    let input = config.input_dir.canonicalize()?;
    let output = match config.output_dir.canonicalize() {
        Ok(path) => path,
        Err(_) => std::path::absolute(&config.output_dir)?,
    };
    if output.starts_with(&input) {
        anyhow::bail!(
            "Output directory {} is inside input directory {}",
            config.output_dir.display(),
            config.input_dir.display()
        );
    }

    Ok(())
}
