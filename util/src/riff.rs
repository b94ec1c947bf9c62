//! In-memory RIFF/WAVE builder
//!
//! Chunks are emitted in the order they are added, with their payload
//! written exactly as given (no pad byte after odd-sized chunks).

use std::fs;
use std::path::Path;

use crate::error::{UtilError, UtilResult};

/// Fields of a `fmt ` chunk payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmtFields {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FmtFields {
    /// Consistent 16-bit linear PCM fields
    pub fn pcm16(channels: u16, sample_rate: u32) -> Self {
        let block_align = channels * 2;
        Self {
            format_tag: 1,
            channels,
            sample_rate,
            byte_rate: sample_rate * u32::from(block_align),
            block_align,
            bits_per_sample: 16,
        }
    }

    /// The 16-byte payload
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(16);
        payload.extend_from_slice(&self.format_tag.to_le_bytes());
        payload.extend_from_slice(&self.channels.to_le_bytes());
        payload.extend_from_slice(&self.sample_rate.to_le_bytes());
        payload.extend_from_slice(&self.byte_rate.to_le_bytes());
        payload.extend_from_slice(&self.block_align.to_le_bytes());
        payload.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        payload
    }
}

#[derive(Debug, Clone)]
struct Chunk {
    id: [u8; 4],
    payload: Vec<u8>,
    declared_size: Option<u32>,
}

/// Builder for WAV byte streams, valid or deliberately broken
#[derive(Debug, Clone)]
pub struct WavBuilder {
    riff_id: [u8; 4],
    wave_id: [u8; 4],
    riff_size: Option<u32>,
    chunks: Vec<Chunk>,
}

impl Default for WavBuilder {
    fn default() -> Self {
        Self {
            riff_id: *b"RIFF",
            wave_id: *b"WAVE",
            riff_size: None,
            chunks: Vec::new(),
        }
    }
}

impl WavBuilder {
    /// Empty container: just the RIFF prologue
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical `fmt ` + `data` file holding interleaved `samples`
    pub fn pcm16(channels: u16, sample_rate: u32, samples: &[i16]) -> Self {
        Self::new()
            .fmt(FmtFields::pcm16(channels, sample_rate))
            .samples(samples)
    }

    pub fn riff_id(mut self, id: [u8; 4]) -> Self {
        self.riff_id = id;
        self
    }

    pub fn wave_id(mut self, id: [u8; 4]) -> Self {
        self.wave_id = id;
        self
    }

    /// Override the RIFF size field (default: total length - 8)
    pub fn riff_size(mut self, size: u32) -> Self {
        self.riff_size = Some(size);
        self
    }

    /// Append an arbitrary chunk
    pub fn chunk(mut self, id: [u8; 4], payload: Vec<u8>) -> Self {
        self.chunks.push(Chunk {
            id,
            payload,
            declared_size: None,
        });
        self
    }

    /// Append a chunk whose size field disagrees with its payload
    pub fn chunk_with_size(mut self, id: [u8; 4], payload: Vec<u8>, declared_size: u32) -> Self {
        self.chunks.push(Chunk {
            id,
            payload,
            declared_size: Some(declared_size),
        });
        self
    }

    /// Append a `JUNK` chunk of `len` filler bytes
    pub fn junk(self, len: usize) -> Self {
        self.chunk(*b"JUNK", vec![0xAA; len])
    }

    /// Append a 16-byte `fmt ` chunk
    pub fn fmt(self, fields: FmtFields) -> Self {
        self.chunk(*b"fmt ", fields.to_payload())
    }

    /// Append a `fmt ` chunk with extra bytes after the PCM fields
    pub fn fmt_with_extra(self, fields: FmtFields, extra: &[u8]) -> Self {
        let mut payload = fields.to_payload();
        payload.extend_from_slice(extra);
        self.chunk(*b"fmt ", payload)
    }

    /// Append a `data` chunk with raw payload bytes
    pub fn data(self, bytes: Vec<u8>) -> Self {
        self.chunk(*b"data", bytes)
    }

    /// Append a `data` chunk holding interleaved little-endian samples
    pub fn samples(self, samples: &[i16]) -> Self {
        self.data(interleave_le(samples))
    }

    /// Serialize the container
    pub fn build(&self) -> Vec<u8> {
        let body_len: usize = self
            .chunks
            .iter()
            .map(|chunk| 8 + chunk.payload.len())
            .sum();

        let mut bytes = Vec::with_capacity(12 + body_len);
        bytes.extend_from_slice(&self.riff_id);
        let riff_size = self.riff_size.unwrap_or((4 + body_len) as u32);
        bytes.extend_from_slice(&riff_size.to_le_bytes());
        bytes.extend_from_slice(&self.wave_id);

        for chunk in &self.chunks {
            let size = chunk.declared_size.unwrap_or(chunk.payload.len() as u32);
            bytes.extend_from_slice(&chunk.id);
            bytes.extend_from_slice(&size.to_le_bytes());
            bytes.extend_from_slice(&chunk.payload);
        }
        bytes
    }

    /// Serialize and write to `path`
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> UtilResult<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(UtilError::ValidationError("empty fixture path".to_string()));
        }
        fs::write(path, self.build())?;
        Ok(())
    }
}

/// Little-endian bytes of `samples`
pub fn interleave_le(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Interleaved sine tone, `frames` frames of `channels` channels
///
/// The right channel, if any, is an octave above the left.
pub fn sine_wave(frames: usize, channels: u16, sample_rate: u32, frequency: f32) -> Vec<i16> {
    let mut samples = Vec::with_capacity(frames * usize::from(channels));
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        for ch in 0..channels {
            let freq = frequency * (1 + u32::from(ch)) as f32;
            let theta = t * 2.0 * std::f32::consts::PI * freq;
            samples.push((theta.sin() * 0.5 * i16::MAX as f32) as i16);
        }
    }
    samples
}
