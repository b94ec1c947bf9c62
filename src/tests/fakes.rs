//! Scripted encoder backend for pipeline and dispatcher tests
//!
//! The fake "encodes" one byte per sample frame, flushes a fixed marker
//! and records every call so tests can check the session protocol.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::encoder::{EncodeSession, EncoderBackend};
use crate::error::{EncoderError, EncoderResult};
use crate::types::FormatDescriptor;

pub const FLUSH_MARKER: &[u8] = b"FLUSH";
pub const TAG_MARKER: &[u8] = b"TAG!";

/// Call counters shared between a backend and its sessions
#[derive(Debug, Default)]
pub struct Calls {
    pub configured: AtomicUsize,
    pub encoded: AtomicUsize,
    pub flushed: AtomicUsize,
    pub tagged: AtomicUsize,
    pub closed: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// What the fake does when asked to encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// One byte per frame, tags written
    Normal,
    /// `configure` fails
    RejectConfig,
    /// `encode_buffer` reports zero bytes
    ProduceNothing,
    /// Tag writing fails
    FailTags,
    /// Panics on a file of exactly this many frames, other files encode slowly
    PanicOnFrames(usize),
}

pub struct FakeBackend {
    pub behaviour: Behaviour,
    pub calls: Arc<Calls>,
}

impl FakeBackend {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Calls::default()),
        }
    }
}

impl EncoderBackend for FakeBackend {
    fn describe(&self) -> String {
        format!("fake ({:?})", self.behaviour)
    }

    fn configure(
        &self,
        format: &FormatDescriptor,
        _total_samples: usize,
    ) -> EncoderResult<Box<dyn EncodeSession>> {
        if self.behaviour == Behaviour::RejectConfig {
            return Err(EncoderError::Configuration("rejected by fake".to_string()));
        }
        self.calls.configured.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            behaviour: self.behaviour,
            channels: format.channels,
            calls: Arc::clone(&self.calls),
        }))
    }
}

struct FakeSession {
    behaviour: Behaviour,
    channels: u16,
    calls: Arc<Calls>,
}

impl EncodeSession for FakeSession {
    fn encode_buffer(
        &mut self,
        left: &[i16],
        right: Option<&[i16]>,
        out: &mut Vec<u8>,
    ) -> EncoderResult<usize> {
        self.calls.encoded.fetch_add(1, Ordering::SeqCst);
        assert_eq!(right.is_some(), self.channels == 2);
        if let Some(right) = right {
            assert_eq!(left.len(), right.len());
        }

        match self.behaviour {
            Behaviour::ProduceNothing => return Ok(0),
            Behaviour::PanicOnFrames(frames) if frames == left.len() => {
                panic!("encoder blew up on {} frames", frames)
            }
            Behaviour::PanicOnFrames(_) => thread::sleep(Duration::from_millis(50)),
            _ => {}
        }
        out.extend(std::iter::repeat(0x55).take(left.len()));
        Ok(left.len())
    }

    fn flush(&mut self, out: &mut Vec<u8>) -> EncoderResult<usize> {
        self.calls.flushed.fetch_add(1, Ordering::SeqCst);
        out.extend_from_slice(FLUSH_MARKER);
        Ok(FLUSH_MARKER.len())
    }

    fn write_trailer_tags(&mut self, out: &mut dyn Write, _title: &str) -> EncoderResult<()> {
        self.calls.tagged.fetch_add(1, Ordering::SeqCst);
        if self.behaviour == Behaviour::FailTags {
            return Err(EncoderError::TrailerTags("tag writer broke".to_string()));
        }
        out.write_all(TAG_MARKER)
            .map_err(|e| EncoderError::TrailerTags(e.to_string()))
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.calls.closed.fetch_add(1, Ordering::SeqCst);
    }
}
