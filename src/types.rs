//! Type definitions for the RIFF/WAVE container
//!
//! These types mirror the on-disk layout of the structures the parser
//! reads: the 12-byte RIFF prologue, the 8-byte generic chunk header and
//! the 24-byte `fmt ` record (header included). All multi-byte fields are
//! little-endian on disk.

use std::fmt;

/// RIFF prologue magic
pub const RIFF_MAGIC: [u8; 4] = *b"RIFF";
/// RIFF form type for WAV files
pub const WAVE_MAGIC: [u8; 4] = *b"WAVE";
/// Size of the RIFF prologue in bytes
pub const RIFF_HEADER_SIZE: usize = 12;
/// Size of a generic chunk header in bytes
pub const CHUNK_HEADER_SIZE: usize = 8;
/// Size of the fixed `fmt ` record, counted from its chunk header
pub const FORMAT_RECORD_SIZE: usize = 24;
/// Recommended payload size of a PCM `fmt ` chunk
pub const PCM_FORMAT_CHUNK_SIZE: u32 = 16;
/// Format tag for linear PCM
pub const WAVE_FORMAT_PCM: u16 = 0x0001;
/// The only sample width the parser promises to decode correctly
pub const SUPPORTED_BITS_PER_SAMPLE: u16 = 16;
/// Maximum number of channels the pipeline accepts
pub const MAX_CHANNELS: usize = 2;

/// Four-character chunk identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    pub const FORMAT: ChunkId = ChunkId(*b"fmt ");
    pub const DATA: ChunkId = ChunkId(*b"data");
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// The 12-byte RIFF prologue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiffHeader {
    pub riff_id: [u8; 4],
    /// Total file length minus 8
    pub file_len: u32,
    pub wave_id: [u8; 4],
}

impl RiffHeader {
    /// Decode the prologue from its raw bytes
    pub fn from_bytes(bytes: &[u8; RIFF_HEADER_SIZE]) -> Self {
        Self {
            riff_id: [bytes[0], bytes[1], bytes[2], bytes[3]],
            file_len: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            wave_id: [bytes[8], bytes[9], bytes[10], bytes[11]],
        }
    }
}

/// Generic chunk header, any chunk type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: ChunkId,
    /// Payload length in bytes, header excluded
    pub size: u32,
}

impl ChunkHeader {
    pub fn from_bytes(bytes: &[u8; CHUNK_HEADER_SIZE]) -> Self {
        Self {
            id: ChunkId([bytes[0], bytes[1], bytes[2], bytes[3]]),
            size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }
}

/// Decoded `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Declared payload size of the `fmt ` chunk
    pub chunk_size: u32,
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    /// Bytes per multi-channel sample frame
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FormatDescriptor {
    /// Decode the record starting at the chunk header (`"fmt "` + size + fields)
    pub fn from_record(bytes: &[u8; FORMAT_RECORD_SIZE]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        Self {
            chunk_size: u32_at(4),
            format_tag: u16_at(8),
            channels: u16_at(10),
            sample_rate: u32_at(12),
            byte_rate: u32_at(16),
            block_align: u16_at(20),
            bits_per_sample: u16_at(22),
        }
    }

    /// Block align implied by bit depth and channel count
    pub fn expected_block_align(&self) -> u32 {
        u32::from(self.bits_per_sample) * u32::from(self.channels) / 8
    }

    /// Bytes read per channel for each frame
    pub fn bytes_per_channel_sample(&self) -> usize {
        usize::from(self.block_align) / usize::from(self.channels.max(1))
    }

    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }
}

/// Location of the `data` payload inside the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataExtent {
    /// Absolute byte offset of the first PCM byte
    pub offset: u64,
    /// Declared payload length in bytes
    pub length: u32,
}

impl DataExtent {
    /// Number of complete frames in the payload
    pub fn frame_count(&self, format: &FormatDescriptor) -> usize {
        match format.block_align {
            0 => 0,
            align => self.length as usize / usize::from(align),
        }
    }
}

/// Per-channel 16-bit sample arrays for one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleBuffers {
    pub left: Vec<i16>,
    /// Present for stereo input only
    pub right: Option<Vec<i16>>,
}

impl SampleBuffers {
    /// Zeroed buffers for `channels` channels of `frames` samples each
    pub fn with_frames(channels: u16, frames: usize) -> Self {
        Self {
            left: vec![0; frames],
            right: (channels > 1).then(|| vec![0; frames]),
        }
    }

    pub fn channel_count(&self) -> usize {
        if self.right.is_some() {
            2
        } else {
            1
        }
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}
