//! Test fixtures for the WAV to MP3 converter
//!
//! This crate builds byte-exact RIFF/WAVE files in memory so tests and
//! benchmarks never depend on committed binary assets.

pub mod error;
pub mod riff;

// Re-export commonly used functions and types
pub use error::*;
pub use riff::*;
