//! RIFF/WAVE container parser
//!
//! Walks the chunk sequence of a WAV file in any order, locating the
//! mandatory `fmt ` and `data` chunks and skipping everything else by its
//! declared length. Chunk payloads are skipped exactly as declared; no
//! word-alignment padding is applied.
//!
//! Format validation is tolerant: a non-PCM tag, an unsupported channel
//! count or an unusable block align are hard failures, everything else is
//! reported as a [`FormatWarning`] and logged.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, trace, warn};

use crate::error::{FormatViolation, ParseError, ParseResult};
use crate::pcm_utils::deinterleave_frames;
use crate::types::{
    ChunkHeader, ChunkId, DataExtent, FormatDescriptor, RiffHeader, SampleBuffers,
    CHUNK_HEADER_SIZE, FORMAT_RECORD_SIZE, MAX_CHANNELS, PCM_FORMAT_CHUNK_SIZE, RIFF_HEADER_SIZE,
    RIFF_MAGIC, SUPPORTED_BITS_PER_SAMPLE, WAVE_FORMAT_PCM, WAVE_MAGIC,
};

/// Soft problems found in a `fmt ` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatWarning {
    /// Payload size differs from the 16 bytes recommended for PCM
    UnexpectedChunkSize(u32),
    /// `block_align != bits_per_sample * channels / 8`
    BlockAlignMismatch { declared: u16, expected: u32 },
    /// `byte_rate != sample_rate * block_align`
    ByteRateMismatch { declared: u32, expected: u64 },
    /// Samples are not 16-bit and will be misinterpreted
    UnsupportedBitDepth(u16),
}

/// A fully parsed input file
#[derive(Debug, Clone)]
pub struct WaveFile {
    pub format: FormatDescriptor,
    pub extent: DataExtent,
    pub samples: SampleBuffers,
}

/// Open `path`, parse its container and extract the channel buffers
pub fn read_wave<P: AsRef<Path>>(path: P) -> ParseResult<WaveFile> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    let (format, extent) = parse(&mut reader)?;
    let samples = extract_channels(&mut reader, &format, &extent)?;

    Ok(WaveFile {
        format,
        extent,
        samples,
    })
}

/// Parse the container, returning the format and the location of the PCM data
///
/// The reader is left positioned at the first byte of the `data` payload.
pub fn parse<R: Read + Seek>(reader: &mut R) -> ParseResult<(FormatDescriptor, DataExtent)> {
    let riff = read_riff_header(reader)?;
    check_riff_header(&riff)?;

    let mut format: Option<(FormatDescriptor, Result<(), FormatViolation>)> = None;
    let mut extent = None;

    while let Some(header) = read_chunk_header(reader)? {
        let payload_start = reader.stream_position()?;
        trace!(
            "chunk {} ({} bytes) at offset {}",
            header.id,
            header.size,
            payload_start - CHUNK_HEADER_SIZE as u64
        );

        match header.id {
            ChunkId::FORMAT => {
                let descriptor = read_format_record(reader, payload_start)?;
                let verdict = validate_format(&descriptor).map(|warnings| {
                    for warning in warnings {
                        warn!("{}", describe_warning(&warning));
                    }
                });
                if format.is_some() {
                    debug!("Duplicate 'fmt ' chunk, using the later one");
                }
                format = Some((descriptor, verdict));

                let resume = payload_start + u64::from(header.size.max(PCM_FORMAT_CHUNK_SIZE));
                reader.seek(SeekFrom::Start(resume))?;
            }
            ChunkId::DATA => {
                extent = Some(DataExtent {
                    offset: payload_start,
                    length: header.size,
                });
                break;
            }
            _ => {
                reader.seek(SeekFrom::Current(i64::from(header.size)))?;
            }
        }
    }

    let (format, verdict) = format.ok_or(ParseError::MissingFormatChunk)?;
    let extent = extent.ok_or(ParseError::MissingDataChunk)?;
    verdict?;

    debug!(
        "PCM data: {} ch, {} Hz, {} bit, {} bytes at offset {}",
        format.channels, format.sample_rate, format.bits_per_sample, extent.length, extent.offset
    );
    Ok((format, extent))
}

/// Read the 12-byte RIFF prologue
pub fn read_riff_header<R: Read>(reader: &mut R) -> ParseResult<RiffHeader> {
    let mut bytes = [0u8; RIFF_HEADER_SIZE];
    reader.read_exact(&mut bytes).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            ParseError::MalformedContainer("file too short for a RIFF header".to_string())
        }
        _ => ParseError::Io(e),
    })?;
    Ok(RiffHeader::from_bytes(&bytes))
}

/// Check RIFF/WAVE magics and the declared size
pub fn check_riff_header(header: &RiffHeader) -> ParseResult<()> {
    if header.riff_id != RIFF_MAGIC {
        return Err(ParseError::MalformedContainer(format!(
            "expected 'RIFF' magic, found {:?}",
            String::from_utf8_lossy(&header.riff_id)
        )));
    }
    if header.wave_id != WAVE_MAGIC {
        return Err(ParseError::MalformedContainer(format!(
            "expected 'WAVE' form type, found {:?}",
            String::from_utf8_lossy(&header.wave_id)
        )));
    }
    if header.file_len == 0 {
        return Err(ParseError::MalformedContainer(
            "RIFF size is zero".to_string(),
        ));
    }
    Ok(())
}

/// Read the next chunk header, `None` once the stream is exhausted
fn read_chunk_header<R: Read>(reader: &mut R) -> ParseResult<Option<ChunkHeader>> {
    let mut bytes = [0u8; CHUNK_HEADER_SIZE];
    match reader.read_exact(&mut bytes) {
        Ok(()) => Ok(Some(ChunkHeader::from_bytes(&bytes))),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read the fixed `fmt ` record, which starts at the chunk header itself
fn read_format_record<R: Read + Seek>(
    reader: &mut R,
    payload_start: u64,
) -> ParseResult<FormatDescriptor> {
    reader.seek(SeekFrom::Start(payload_start - CHUNK_HEADER_SIZE as u64))?;

    let mut record = [0u8; FORMAT_RECORD_SIZE];
    reader.read_exact(&mut record).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            ParseError::MalformedContainer("truncated 'fmt ' chunk".to_string())
        }
        _ => ParseError::Io(e),
    })?;
    Ok(FormatDescriptor::from_record(&record))
}

/// Validate a decoded `fmt ` chunk
///
/// Returns the list of soft warnings, or the first hard violation.
pub fn validate_format(format: &FormatDescriptor) -> Result<Vec<FormatWarning>, FormatViolation> {
    if format.format_tag != WAVE_FORMAT_PCM {
        return Err(FormatViolation::UnsupportedFormatTag(format.format_tag));
    }
    if format.channels == 0 || usize::from(format.channels) > MAX_CHANNELS {
        return Err(FormatViolation::UnsupportedChannelCount(format.channels));
    }
    if format.block_align < format.channels {
        return Err(FormatViolation::BlockAlignTooSmall {
            block_align: format.block_align,
            channels: format.channels,
        });
    }

    let mut warnings = Vec::new();
    if format.chunk_size != PCM_FORMAT_CHUNK_SIZE {
        warnings.push(FormatWarning::UnexpectedChunkSize(format.chunk_size));
    }
    let expected_align = format.expected_block_align();
    if u32::from(format.block_align) != expected_align {
        warnings.push(FormatWarning::BlockAlignMismatch {
            declared: format.block_align,
            expected: expected_align,
        });
    }
    let expected_rate = u64::from(format.sample_rate) * u64::from(format.block_align);
    if u64::from(format.byte_rate) != expected_rate {
        warnings.push(FormatWarning::ByteRateMismatch {
            declared: format.byte_rate,
            expected: expected_rate,
        });
    }
    if format.bits_per_sample != SUPPORTED_BITS_PER_SAMPLE {
        warnings.push(FormatWarning::UnsupportedBitDepth(format.bits_per_sample));
    }
    Ok(warnings)
}

fn describe_warning(warning: &FormatWarning) -> String {
    match warning {
        FormatWarning::UnexpectedChunkSize(size) => {
            format!("'fmt ' chunk is {} bytes, expected {}", size, PCM_FORMAT_CHUNK_SIZE)
        }
        FormatWarning::BlockAlignMismatch { declared, expected } => {
            format!("block align is {}, bits and channels imply {}", declared, expected)
        }
        FormatWarning::ByteRateMismatch { declared, expected } => {
            format!("byte rate is {}, sample rate and block align imply {}", declared, expected)
        }
        FormatWarning::UnsupportedBitDepth(bits) => {
            format!("{}-bit samples will be read as 16-bit", bits)
        }
    }
}

/// Seek to the PCM payload and split it into per-channel buffers
///
/// A payload that is shorter on disk than declared is truncated to the
/// complete frames actually present.
pub fn extract_channels<R: Read + Seek>(
    reader: &mut R,
    format: &FormatDescriptor,
    extent: &DataExtent,
) -> ParseResult<SampleBuffers> {
    reader.seek(SeekFrom::Start(extent.offset))?;

    let block_align = usize::from(format.block_align);
    let mut frames = extent.frame_count(format);
    let wanted = frames * block_align;

    let mut raw = Vec::with_capacity(wanted);
    reader.by_ref().take(wanted as u64).read_to_end(&mut raw)?;
    if raw.len() < wanted {
        warn!(
            "'data' chunk declares {} bytes but only {} are present",
            extent.length,
            raw.len()
        );
        frames = raw.len() / block_align.max(1);
    }

    let mut buffers = SampleBuffers::with_frames(format.channels, frames);
    deinterleave_frames(&raw, format, &mut buffers);
    Ok(buffers)
}
