//! WAV to MP3 batch converter command line tool
//!
//! Converts every `.wav` file in a directory to an `.mp3` next to it,
//! using a fixed pool of worker threads.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use log::warn;

use wav2mp3::config::{parse_worker_count, DEFAULT_BITRATE, DEFAULT_QUALITY};
use wav2mp3::report::summary_lines;
use wav2mp3::{
    scan_wav_files, BatchConfig, Dispatcher, EncoderBackend, EncoderSettings, LameBackend,
    DEFAULT_WORKERS,
};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "wav2mp3", version, about = "Convert a directory of WAV files to MP3")]
struct Args {
    /// Directory to scan for .wav files
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Number of worker threads (-n8 or -n 8), default 4
    #[arg(short = 'n', long = "threads", value_name = "N")]
    threads: Option<String>,

    /// MP3 bitrate in kbps [8-320]
    #[arg(short = 'b', long = "bitrate", value_name = "KBPS", default_value_t = DEFAULT_BITRATE)]
    bitrate: u32,

    /// Encoder quality, 0 (best) to 9 (fastest)
    #[arg(long = "quality", value_name = "Q", default_value_t = DEFAULT_QUALITY)]
    quality: u8,

    /// Append a plain ID3v1 tag (no ID3v2) with the file name as title
    #[arg(long = "id3")]
    id3: bool,

    /// Only print errors and the final summary
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,

    /// Print per-chunk and per-thread diagnostics
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Write a JSON report of the run to FILE
    #[cfg(feature = "diagnostics")]
    #[arg(long = "report", value_name = "FILE")]
    report: Option<PathBuf>,
}

impl Args {
    /// Requested worker count, falling back to the default
    fn worker_count(&self) -> usize {
        match self.threads.as_deref() {
            None => DEFAULT_WORKERS,
            Some(raw) => parse_worker_count(raw).unwrap_or_else(|| {
                warn!(
                    "-n argument '{}' not valid. Defaulting to {} threads.",
                    raw, DEFAULT_WORKERS
                );
                DEFAULT_WORKERS
            }),
        }
    }

    fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Error
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = EncoderSettings::new()
        .bitrate(args.bitrate)
        .quality(args.quality)
        .id3v1_trailer(args.id3);
    let config = BatchConfig::new()
        .workers(args.worker_count())
        .encoder(settings);
    config.validate()?;

    let backend = Arc::new(LameBackend::new(config.encoder.clone()));
    if !args.quiet {
        println!("Encoder: {}", backend.describe());
        println!("Using {} threads.", config.workers);
    }

    let files = scan_wav_files(&args.path)?;
    if !args.quiet {
        println!("Found {} .wav file(s) in directory.", files.len());
    }

    let mut dispatcher = Dispatcher::new(config, backend);
    let report = dispatcher.run(files)?;

    let lines = summary_lines(&report);
    let (details, summary) = lines.split_at(lines.len() - 1);
    if !args.quiet {
        for line in details {
            println!("{}", line);
        }
    }
    for line in summary {
        println!("{}", line);
    }

    #[cfg(feature = "diagnostics")]
    if let Some(path) = &args.report {
        wav2mp3::report::write_json(&report, path)?;
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    // RUST_LOG still wins over the command line level
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
