//! # wav2mp3
//!
//! Batch conversion of PCM WAV files to MP3 on a fixed pool of worker
//! threads. The crate provides a byte-exact RIFF/WAVE parser, a shared
//! work registry with at-most-once claiming, the worker/dispatcher pair
//! that drives it, and an adapter trait in front of the MP3 encoder.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wav2mp3::{scan_wav_files, BatchConfig, Dispatcher, LameBackend};
//!
//! let config = BatchConfig::new().workers(8);
//! let backend = Arc::new(LameBackend::new(config.encoder.clone()));
//! let files = scan_wav_files("music").unwrap();
//! let report = Dispatcher::new(config, backend).run(files).unwrap();
//! println!("{} of {} converted", report.converted, report.files_found);
//! ```

pub mod config;
pub mod dispatcher;
pub mod encoder;
pub mod error;
pub mod pcm_utils;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod scan;
pub mod types;
pub mod wave;
pub mod worker;

#[cfg(test)]
mod tests;

pub use config::{BatchConfig, EncoderSettings, DEFAULT_WORKERS};
pub use dispatcher::{BatchReport, Dispatcher, DispatcherState};
pub use encoder::{EncodeSession, EncoderBackend, LameBackend};
pub use error::{BatchError, ConversionError, EncoderError, FormatViolation, ParseError};
pub use pipeline::{output_path_for, ConversionOutcome, Converter};
pub use registry::{FileIndex, WorkRegistry};
pub use scan::scan_wav_files;
pub use types::{DataExtent, FormatDescriptor, SampleBuffers};
pub use wave::{extract_channels, parse, read_wave, WaveFile};
pub use worker::{SkippedFile, Worker, WorkerState, WorkerStats};
