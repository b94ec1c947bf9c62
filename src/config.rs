//! Configuration management for batch conversion
//!
//! This module provides the configuration structures for a batch run and
//! for the encoder sessions it creates, with builder-style setters and
//! validation.

use crate::error::{ConfigError, ConfigResult};

/// Worker threads used when none (or an invalid count) is requested
pub const DEFAULT_WORKERS: usize = 4;
/// Default CBR bitrate in kbps
pub const DEFAULT_BITRATE: u32 = 192;
/// Default encoder quality (0 best .. 9 worst)
pub const DEFAULT_QUALITY: u8 = 3;

/// Supported CBR bitrates (kbps)
pub const SUPPORTED_BITRATES: &[u32] = &[
    8, 16, 24, 32, 40, 48, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
];

/// Encoder parameters applied to every session of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Target bitrate in kbps
    pub bitrate_kbps: u32,
    /// Algorithm quality, 0 (best) ..= 9 (worst)
    pub quality: u8,
    /// Append an ID3v1 tag after the MP3 frames
    pub id3v1_trailer: bool,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            bitrate_kbps: DEFAULT_BITRATE,
            quality: DEFAULT_QUALITY,
            id3v1_trailer: false,
        }
    }
}

impl EncoderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bitrate(mut self, kbps: u32) -> Self {
        self.bitrate_kbps = kbps;
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn id3v1_trailer(mut self, enabled: bool) -> Self {
        self.id3v1_trailer = enabled;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !SUPPORTED_BITRATES.contains(&self.bitrate_kbps) {
            return Err(ConfigError::UnsupportedBitrate(self.bitrate_kbps));
        }
        if self.quality > 9 {
            return Err(ConfigError::UnsupportedQuality(self.quality));
        }
        Ok(())
    }
}

/// Configuration of one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Size of the worker pool
    pub workers: usize,
    /// Encoder parameters
    pub encoder: EncoderSettings,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            encoder: EncoderSettings::default(),
        }
    }
}

impl BatchConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker pool size
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the encoder parameters
    pub fn encoder(mut self, encoder: EncoderSettings) -> Self {
        self.encoder = encoder;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        self.encoder.validate()
    }
}

/// Interpret a user-supplied worker count
///
/// Anything that is not a positive integer yields `None`; callers fall
/// back to [`DEFAULT_WORKERS`].
pub fn parse_worker_count(value: &str) -> Option<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}
