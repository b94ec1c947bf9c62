//! PCM audio data processing utilities
//!
//! Splits interleaved little-endian sample frames into per-channel
//! buffers. Each frame is `block_align` bytes; channel `c` occupies the
//! `c`-th slot of `block_align / channels` bytes inside it.

use crate::types::{FormatDescriptor, SampleBuffers};

/// Decode one channel slot into a 16-bit sample
///
/// Only 2-byte slots decode correctly. Narrower slots fill the low byte
/// and wider slots keep their two lowest bytes.
#[inline]
pub fn decode_sample(slot: &[u8]) -> i16 {
    match slot {
        [lo, hi, ..] => i16::from_le_bytes([*lo, *hi]),
        [lo] => i16::from(*lo),
        [] => 0,
    }
}

/// De-interleave raw frame bytes into `buffers`
///
/// Takes bytes in format [L0 R0 L1 R1 ... LN RN] and writes sample `i` of
/// each channel at index `i`. Frames past the end of `raw` or past the
/// buffer length are left untouched.
pub fn deinterleave_frames(raw: &[u8], format: &FormatDescriptor, buffers: &mut SampleBuffers) {
    let block_align = usize::from(format.block_align);
    let width = format.bytes_per_channel_sample();
    if block_align == 0 || width == 0 {
        return;
    }

    for (idx, frame) in raw.chunks_exact(block_align).enumerate() {
        if idx >= buffers.left.len() {
            break;
        }

        buffers.left[idx] = decode_sample(&frame[..width]);
        if let Some(right) = buffers.right.as_mut() {
            right[idx] = decode_sample(&frame[width..(2 * width).min(frame.len())]);
        }
    }
}
