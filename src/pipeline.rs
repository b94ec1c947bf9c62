//! Per-file conversion pipeline
//!
//! Composes parser, encoder session and file writer for one input file:
//! parse the WAV container, configure a session with the channel count and
//! sample count, encode, flush, write the MP3 bytes and any trailer tags,
//! then close the output. Every per-file error is caught here and turned
//! into a [`ConversionOutcome`]; nothing propagates to the worker.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::encoder::{mp3_buffer_capacity, EncoderBackend};
use crate::error::{ConversionError, ConversionResult, EncoderError};
use crate::wave::read_wave;

/// Result of converting one file
#[derive(Debug)]
pub enum ConversionOutcome {
    /// MP3 written
    Success { output: PathBuf, bytes_written: u64 },
    /// Input unusable or encoder failed; the run goes on
    Skipped(ConversionError),
    /// Output could not be written; the run still goes on
    Fatal(ConversionError),
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success { .. })
    }

    /// Why the file was not converted
    pub fn reason(&self) -> Option<&ConversionError> {
        match self {
            ConversionOutcome::Success { .. } => None,
            ConversionOutcome::Skipped(reason) | ConversionOutcome::Fatal(reason) => Some(reason),
        }
    }
}

/// Output path for an input path: the last three characters become `mp3`
///
/// `song.wav` becomes `song.mp3` in the same directory.
pub fn output_path_for(input: &Path) -> PathBuf {
    match input.to_str() {
        Some(s) if s.len() >= 3 && s.is_char_boundary(s.len() - 3) => {
            PathBuf::from(format!("{}mp3", &s[..s.len() - 3]))
        }
        _ => input.with_extension("mp3"),
    }
}

/// Converts single files with a shared encoder backend
#[derive(Clone)]
pub struct Converter {
    backend: Arc<dyn EncoderBackend>,
}

impl Converter {
    pub fn new(backend: Arc<dyn EncoderBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn EncoderBackend> {
        &self.backend
    }

    /// Convert `input` to an MP3 next to it
    pub fn convert(&self, input: &Path) -> ConversionOutcome {
        match self.try_convert(input) {
            Ok((output, bytes_written)) => ConversionOutcome::Success {
                output,
                bytes_written,
            },
            Err(err @ ConversionError::Output { .. }) => ConversionOutcome::Fatal(err),
            Err(err) => ConversionOutcome::Skipped(err),
        }
    }

    fn try_convert(&self, input: &Path) -> ConversionResult<(PathBuf, u64)> {
        let output = output_path_for(input);
        let wave = read_wave(input)?;
        let total_samples = wave.samples.frames();

        let mut session = self.backend.configure(&wave.format, total_samples)?;
        let mut mp3 = Vec::with_capacity(mp3_buffer_capacity(total_samples));

        let produced =
            session.encode_buffer(&wave.samples.left, wave.samples.right.as_deref(), &mut mp3)?;
        if produced == 0 {
            return Err(EncoderError::NoData { produced }.into());
        }
        drop(wave);

        let flushed = session.flush(&mut mp3)?;
        debug!(
            "{}: {} bytes encoded, {} bytes flushed",
            input.display(),
            produced,
            flushed
        );

        let title = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let written = write_output(&output, &mp3, |file| {
            if let Err(e) = session.write_trailer_tags(file, &title) {
                warn!("{}: {}", output.display(), e);
            }
        })?;

        Ok((output, written))
    }
}

/// Create `path`, write `mp3`, let `trailer` append tags, then close it
///
/// A partially written file is removed on failure.
fn write_output<F>(path: &Path, mp3: &[u8], trailer: F) -> ConversionResult<u64>
where
    F: FnOnce(&mut dyn Write),
{
    let output_error = |source| ConversionError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);

    let result = writer.write_all(mp3).and_then(|()| {
        trailer(&mut writer);
        writer.flush()
    });
    if let Err(e) = result {
        drop(writer);
        let _ = fs::remove_file(path);
        return Err(output_error(e));
    }

    let file = writer
        .into_inner()
        .map_err(|e| output_error(e.into_error()))?;
    let written = file.metadata().map(|m| m.len()).map_err(output_error)?;
    Ok(written)
}
