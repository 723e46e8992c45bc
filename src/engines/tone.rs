//! Deterministic offline synthesis engine.
//!
//! Renders each phrase as a short sine tone whose pitch is derived from a
//! stable hash of the text. Identical input yields identical output bytes,
//! which makes this the engine of choice for tests of the pipeline's
//! re-run behavior, and a stand-in for dry runs without network access.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::{AudioClip, AudioFormat, SpeechSynthesizer};

/// Output sample rate.
pub const SAMPLE_RATE: u32 = 22_050;

/// Clip length in milliseconds.
const CLIP_MS: u32 = 400;

/// Pitch range the text hash folds into, in Hz.
const MIN_FREQ: f64 = 220.0;
const FREQ_SPAN: f64 = 440.0;

/// Offline tone engine. 16-bit mono WAV output.
#[derive(Debug, Clone, Default)]
pub struct ToneEngine;

impl ToneEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SpeechSynthesizer for ToneEngine {
    fn engine_name(&self) -> &str {
        "tone"
    }

    fn voice_name(&self, lang: &str) -> String {
        format!("tone-{lang}")
    }

    fn synthesize(
        &mut self,
        text: &str,
        _lang: &str,
    ) -> Result<AudioClip, Box<dyn std::error::Error>> {
        let bytes = render(text)?;
        Ok(AudioClip {
            bytes,
            format: AudioFormat::Wav,
        })
    }
}

/// FNV-1a over the phrase bytes; stable across runs and platforms.
fn text_hash(text: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for byte in text.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100_0000_01b3);
    }
    hash
}

fn render(text: &str) -> Result<Vec<u8>, hound::Error> {
    let freq = MIN_FREQ + (text_hash(text) % 1000) as f64 / 1000.0 * FREQ_SPAN;
    let sample_count = SAMPLE_RATE * CLIP_MS / 1000;
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)?;
    let amplitude = f64::from(i16::MAX) * 0.3;
    for n in 0..sample_count {
        let t = f64::from(n) / f64::from(SAMPLE_RATE);
        let value = (t * freq * 2.0 * std::f64::consts::PI).sin() * amplitude;
        writer.write_sample(value as i16)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}
