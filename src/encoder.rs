//! MP3 encoder adapter
//!
//! The conversion pipeline only talks to the encoder through the
//! [`EncoderBackend`] and [`EncodeSession`] traits. A backend is shared by
//! all workers and hands out one session per file; a session is configured
//! once, fed the whole file, flushed exactly once and released on drop.
//!
//! [`LameBackend`] is the production backend, built on LAME through the
//! `mp3lame-encoder` bindings.

use std::io::Write;

use log::debug;
use mp3lame_encoder::{Bitrate, Builder, DualPcm, Encoder, FlushGap, MonoPcm, Quality};

use crate::config::EncoderSettings;
use crate::error::{EncoderError, EncoderResult};
use crate::types::FormatDescriptor;

/// Fixed slack added to every MP3 output buffer
pub const MP3_BUFFER_PADDING: usize = 7200;

/// Size of an ID3v1 tag
pub const ID3V1_TAG_SIZE: usize = 128;

/// Worst-case MP3 output size for `samples` samples per channel
///
/// LAME's documented estimate: 1.25 bytes per sample plus 7200 bytes.
pub fn mp3_buffer_capacity(samples: usize) -> usize {
    samples * 5 / 4 + MP3_BUFFER_PADDING
}

/// Factory for per-file encoder sessions, shared by all workers
pub trait EncoderBackend: Send + Sync {
    /// Human readable backend description
    fn describe(&self) -> String;

    /// Configure a new session for one file
    ///
    /// `total_samples` is the number of samples per channel the session
    /// will receive. Sessions reject input beyond that count.
    fn configure(
        &self,
        format: &FormatDescriptor,
        total_samples: usize,
    ) -> EncoderResult<Box<dyn EncodeSession>>;
}

/// One configured encoder, owned by a single in-flight conversion
pub trait EncodeSession {
    /// Encode PCM samples, appending MP3 bytes to `out`
    ///
    /// Returns the number of bytes appended. `right` must be present for
    /// stereo sessions.
    fn encode_buffer(
        &mut self,
        left: &[i16],
        right: Option<&[i16]>,
        out: &mut Vec<u8>,
    ) -> EncoderResult<usize>;

    /// Drain buffered lookahead, appending MP3 bytes to `out`
    fn flush(&mut self, out: &mut Vec<u8>) -> EncoderResult<usize>;

    /// Write tags that belong after the MP3 frames
    ///
    /// Best effort; the default writes nothing.
    fn write_trailer_tags(&mut self, _out: &mut dyn Write, _title: &str) -> EncoderResult<()> {
        Ok(())
    }
}

/// LAME-backed encoder backend
#[derive(Debug, Clone)]
pub struct LameBackend {
    settings: EncoderSettings,
}

impl LameBackend {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }
}

impl Default for LameBackend {
    fn default() -> Self {
        Self::new(EncoderSettings::default())
    }
}

impl EncoderBackend for LameBackend {
    fn describe(&self) -> String {
        format!(
            "LAME, {} kbps CBR, quality {}",
            self.settings.bitrate_kbps, self.settings.quality
        )
    }

    fn configure(
        &self,
        format: &FormatDescriptor,
        total_samples: usize,
    ) -> EncoderResult<Box<dyn EncodeSession>> {
        let mut builder = Builder::new().ok_or_else(|| {
            EncoderError::Configuration("failed to allocate LAME encoder".to_string())
        })?;

        let channels = u8::try_from(format.channels)
            .map_err(|_| EncoderError::Configuration(format!("{} channels", format.channels)))?;
        builder
            .set_num_channels(channels)
            .map_err(|e| EncoderError::Configuration(format!("channel count: {:?}", e)))?;
        builder
            .set_sample_rate(format.sample_rate)
            .map_err(|e| EncoderError::Configuration(format!("sample rate: {:?}", e)))?;
        builder
            .set_brate(lame_bitrate(self.settings.bitrate_kbps)?)
            .map_err(|e| EncoderError::Configuration(format!("bitrate: {:?}", e)))?;
        builder
            .set_quality(lame_quality(self.settings.quality)?)
            .map_err(|e| EncoderError::Configuration(format!("quality: {:?}", e)))?;
        // Plain CBR stream, no Xing/Info header frame at the start
        builder
            .set_to_write_vbr_tag(false)
            .map_err(|e| EncoderError::Configuration(format!("vbr tag: {:?}", e)))?;

        let encoder = builder
            .build()
            .map_err(|e| EncoderError::Configuration(format!("{:?}", e)))?;

        debug!(
            "LAME session: {} ch @ {} Hz, {} samples per channel",
            channels, format.sample_rate, total_samples
        );

        Ok(Box::new(LameSession {
            encoder,
            channels,
            samples_left: total_samples,
            id3v1_trailer: self.settings.id3v1_trailer,
        }))
    }
}

/// One LAME encoder instance; `lame_close` runs when it is dropped
struct LameSession {
    encoder: Encoder,
    channels: u8,
    /// Samples per channel still allowed by `configure`
    samples_left: usize,
    id3v1_trailer: bool,
}

impl EncodeSession for LameSession {
    fn encode_buffer(
        &mut self,
        left: &[i16],
        right: Option<&[i16]>,
        out: &mut Vec<u8>,
    ) -> EncoderResult<usize> {
        if left.len() > self.samples_left {
            return Err(EncoderError::Encode(format!(
                "{} samples given, session configured for {} more",
                left.len(),
                self.samples_left
            )));
        }
        out.reserve(mp3_buffer_capacity(left.len()));

        let written = match (self.channels, right) {
            (1, _) => self.encoder.encode_to_vec(MonoPcm(left), out),
            (2, Some(right)) => self.encoder.encode_to_vec(DualPcm { left, right }, out),
            (_, None) => {
                return Err(EncoderError::Encode(
                    "stereo session needs a right channel".to_string(),
                ))
            }
            (channels, Some(_)) => {
                return Err(EncoderError::Encode(format!(
                    "unsupported channel count {}",
                    channels
                )))
            }
        };

        let written = written.map_err(|e| EncoderError::Encode(format!("{:?}", e)))?;
        self.samples_left -= left.len();
        Ok(written)
    }

    fn flush(&mut self, out: &mut Vec<u8>) -> EncoderResult<usize> {
        out.reserve(MP3_BUFFER_PADDING);
        self.encoder
            .flush_to_vec::<FlushGap>(out)
            .map_err(|e| EncoderError::Flush(format!("{:?}", e)))
    }

    fn write_trailer_tags(&mut self, out: &mut dyn Write, title: &str) -> EncoderResult<()> {
        if !self.id3v1_trailer {
            return Ok(());
        }
        out.write_all(&id3v1_tag(title))
            .map_err(|e| EncoderError::TrailerTags(e.to_string()))
    }
}

fn lame_bitrate(kbps: u32) -> EncoderResult<Bitrate> {
    let bitrate = match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        40 => Bitrate::Kbps40,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        other => {
            return Err(EncoderError::Configuration(format!(
                "unsupported bitrate {} kbps",
                other
            )))
        }
    };
    Ok(bitrate)
}

fn lame_quality(quality: u8) -> EncoderResult<Quality> {
    let quality = match quality {
        0 => Quality::Best,
        1 => Quality::SecondBest,
        2 => Quality::NearBest,
        3 => Quality::VeryNice,
        4 => Quality::Nice,
        5 => Quality::Good,
        6 => Quality::Decent,
        7 => Quality::Ok,
        8 => Quality::SecondWorst,
        9 => Quality::Worst,
        other => {
            return Err(EncoderError::Configuration(format!(
                "unsupported quality {}",
                other
            )))
        }
    };
    Ok(quality)
}

/// Build an ID3v1 tag carrying only a title
///
/// Written by hand rather than through LAME's id3tag support, which always
/// prepends an ID3v2 header and only emits v1 on a gapless flush.
///
/// Non-ASCII characters are replaced with `?`; the title is cut at 30 bytes.
pub fn id3v1_tag(title: &str) -> [u8; ID3V1_TAG_SIZE] {
    let mut tag = [0u8; ID3V1_TAG_SIZE];
    tag[..3].copy_from_slice(b"TAG");

    let title_bytes = title
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' })
        .take(30);
    for (slot, byte) in tag[3..33].iter_mut().zip(title_bytes) {
        *slot = byte;
    }

    // genre: none
    tag[ID3V1_TAG_SIZE - 1] = 0xFF;
    tag
}
