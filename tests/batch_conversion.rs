//! Integration tests for batch conversion with the LAME backend
//!
//! These tests run real WAV fixtures through the dispatcher, worker pool
//! and LAME, and check the MP3 files left next to the inputs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use util::{FmtFields, WavBuilder};
use wav2mp3::encoder::ID3V1_TAG_SIZE;
use wav2mp3::{
    output_path_for, scan_wav_files, BatchConfig, ConversionOutcome, Converter, Dispatcher,
    EncoderSettings, LameBackend,
};

/// One second of 44.1 kHz tone, long enough for LAME to emit frames
fn write_tone(dir: &Path, name: &str, channels: u16) -> PathBuf {
    let path = dir.join(name);
    let samples = util::sine_wave(44_100, channels, 44_100, 440.0);
    WavBuilder::pcm16(channels, 44_100, &samples)
        .write_to(&path)
        .unwrap();
    path
}

fn lame(settings: EncoderSettings) -> Arc<LameBackend> {
    Arc::new(LameBackend::new(settings))
}

/// Whether `bytes` holds an MP3 frame sync word
fn has_frame_sync(bytes: &[u8]) -> bool {
    bytes.windows(2).any(|w| w[0] == 0xFF && w[1] & 0xE0 == 0xE0)
}

#[test]
fn test_stereo_file_converts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tone(dir.path(), "stereo.wav", 2);

    let outcome = Converter::new(lame(EncoderSettings::new())).convert(&input);

    let ConversionOutcome::Success { output, bytes_written } = outcome else {
        panic!("stereo tone should convert");
    };
    assert_eq!(output, output_path_for(&input));
    let bytes = fs::read(&output).unwrap();
    assert_eq!(bytes.len() as u64, bytes_written);
    assert!(has_frame_sync(&bytes), "Output should contain MP3 frames");
}

#[test]
fn test_stream_starts_with_an_audio_frame() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tone(dir.path(), "lead.wav", 2);

    assert!(Converter::new(lame(EncoderSettings::new())).convert(&input).is_success());
    let bytes = fs::read(dir.path().join("lead.mp3")).unwrap();

    // MPEG-1 Layer III, no CRC, 192 kbps, 44.1 kHz
    assert_eq!(&bytes[..2], &[0xFF, 0xFB]);
    assert_eq!(bytes[2] & 0xFC, 0xB0);
    // 626-byte frame; an unfilled Xing/Info placeholder is all zeros after the header
    let first_frame = &bytes[4..626];
    assert!(
        first_frame.iter().any(|&b| b != 0),
        "First frame is a blank tag placeholder"
    );
    let ids: [&[u8]; 2] = [b"Xing", b"Info"];
    for id in ids {
        assert!(!first_frame.windows(4).any(|w| w == id), "Unexpected VBR header");
    }
}

#[test]
fn test_mono_file_converts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tone(dir.path(), "mono.wav", 1);

    let outcome = Converter::new(lame(EncoderSettings::new().bitrate(128))).convert(&input);

    assert!(outcome.is_success(), "{:?}", outcome.reason());
    assert!(fs::metadata(dir.path().join("mono.mp3")).unwrap().len() > 0);
}

#[test]
fn test_id3v1_trailer_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_tone(dir.path(), "titled.wav", 2);

    let outcome =
        Converter::new(lame(EncoderSettings::new().id3v1_trailer(true))).convert(&input);
    assert!(outcome.is_success());

    let bytes = fs::read(dir.path().join("titled.mp3")).unwrap();
    let tag = &bytes[bytes.len() - ID3V1_TAG_SIZE..];
    assert_eq!(&tag[..3], b"TAG");
    assert_eq!(&tag[3..9], b"titled");
}

#[test]
fn test_directory_batch() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5 {
        write_tone(dir.path(), &format!("tone_{}.wav", i), if i % 2 == 0 { 2 } else { 1 });
    }
    // Chunks in an unusual order with padding chunks in between
    WavBuilder::new()
        .junk(13)
        .fmt(FmtFields::pcm16(2, 44_100))
        .chunk(*b"LIST", b"INFOISFT\x05\x00\x00\x00test\x00".to_vec())
        .samples(&util::sine_wave(44_100, 2, 44_100, 330.0))
        .write_to(dir.path().join("odd_layout.wav"))
        .unwrap();
    fs::write(dir.path().join("broken.wav"), b"RIFF").unwrap();

    let files = scan_wav_files(dir.path()).unwrap();
    assert_eq!(files.len(), 7);

    let config = BatchConfig::new().workers(3);
    let backend = lame(config.encoder.clone());
    let report = Dispatcher::new(config, backend).run(files).unwrap();

    assert_eq!(report.files_found, 7);
    assert_eq!(report.converted, 6);
    assert_eq!(report.claimed(), 7);
    let skipped: Vec<_> = report.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].path.ends_with("broken.wav"));
    assert!(!skipped[0].fatal);

    for i in 0..5 {
        let mp3 = dir.path().join(format!("tone_{}.mp3", i));
        assert!(fs::metadata(&mp3).unwrap().len() > 0, "{} missing", mp3.display());
    }
    assert!(dir.path().join("odd_layout.mp3").exists());
    assert!(!dir.path().join("broken.mp3").exists());
}

#[test]
fn test_too_short_input_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("blip.wav");
    WavBuilder::pcm16(1, 44_100, &[0; 16]).write_to(&input).unwrap();

    let outcome = Converter::new(lame(EncoderSettings::new())).convert(&input);

    // LAME buffers its lookahead, so a handful of samples encodes to nothing
    assert!(matches!(outcome, ConversionOutcome::Skipped(_)));
    assert!(!dir.path().join("blip.mp3").exists());
}
