//! Error types for the batch converter
//!
//! This module defines all error types used throughout the converter,
//! one enum per subsystem with `From` conversions at each boundary.
//! Per-file errors end up in [`ConversionError`] and are downgraded to a
//! skipped outcome by the pipeline; only [`BatchError`] aborts a run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing a RIFF/WAVE container
#[derive(Debug, Error)]
pub enum ParseError {
    /// RIFF prologue magic or size is wrong
    #[error("Malformed RIFF container: {0}")]
    MalformedContainer(String),

    /// Stream ended before a `fmt ` chunk was found
    #[error("No 'fmt ' chunk found")]
    MissingFormatChunk,

    /// Stream ended before a `data` chunk was found
    #[error("No 'data' chunk found")]
    MissingDataChunk,

    /// The `fmt ` chunk describes audio this parser cannot handle
    #[error("Invalid format: {0}")]
    InvalidFormat(#[from] FormatViolation),

    /// Underlying read or seek failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Hard violations found while validating a `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatViolation {
    /// Only linear PCM (tag 0x0001) is supported
    #[error("unsupported format tag 0x{0:04X}, only linear PCM is supported")]
    UnsupportedFormatTag(u16),

    /// Only mono and stereo are supported
    #[error("unsupported channel count {0}, expected 1 or 2")]
    UnsupportedChannelCount(u16),

    /// Block align too small to hold one sample per channel
    #[error("block align {block_align} cannot hold {channels} channel(s)")]
    BlockAlignTooSmall { block_align: u16, channels: u16 },
}

/// Errors reported by the MP3 encoder adapter
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The encoder rejected the requested parameters
    #[error("Encoder configuration error: {0}")]
    Configuration(String),

    /// Encoding finished without producing any MP3 bytes
    #[error("Encoder produced no data ({produced} bytes)")]
    NoData { produced: usize },

    /// Encoding a PCM buffer failed
    #[error("Encoding error: {0}")]
    Encode(String),

    /// Draining the encoder lookahead failed
    #[error("Flush error: {0}")]
    Flush(String),

    /// Writing trailing tags failed
    #[error("Trailer tag error: {0}")]
    TrailerTags(String),
}

/// Errors that can occur while converting a single file
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Input could not be parsed
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// Encoder failed or produced nothing
    #[error("{0}")]
    Encoder(#[from] EncoderError),

    /// Output file could not be created or written
    #[error("Cannot write '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Worker pool must hold at least one thread
    #[error("Worker count must be at least 1")]
    NoWorkers,

    /// Unsupported CBR bitrate
    #[error("Unsupported bitrate: {0} kbps")]
    UnsupportedBitrate(u32),

    /// Quality outside the encoder's 0 (best) ..= 9 (worst) scale
    #[error("Unsupported quality: {0} (expected 0-9)")]
    UnsupportedQuality(u8),
}

/// Failures that abort a whole batch run
#[derive(Debug, Error)]
pub enum BatchError {
    /// Invalid batch configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The OS refused to start a worker thread
    #[error("Failed to spawn worker {worker}: {source}")]
    SpawnFailed {
        worker: usize,
        #[source]
        source: io::Error,
    },

    /// A worker thread terminated abnormally
    #[error("Worker {worker} terminated abnormally")]
    JoinFailed { worker: usize },
}

impl BatchError {
    /// Whether the failure came from the threading primitives themselves
    pub fn is_concurrency_failure(&self) -> bool {
        matches!(
            self,
            BatchError::SpawnFailed { .. } | BatchError::JoinFailed { .. }
        )
    }
}

/// Errors raised while listing the input directory
#[derive(Debug, Error)]
pub enum ScanError {
    /// Directory missing, not a directory, or not readable
    #[error("Unable to read directory '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Specialized result types for different modules
pub type ParseResult<T> = std::result::Result<T, ParseError>;
pub type EncoderResult<T> = std::result::Result<T, EncoderError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type ConversionResult<T> = std::result::Result<T, ConversionError>;
