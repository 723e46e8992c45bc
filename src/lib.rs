//! # lessonpack
//!
//! A Rust library for turning language-lesson spreadsheets into structured
//! lesson files and synthesized speech audio.
//!
//! ## Features
//!
//! - **Record normalization**: ragged spreadsheet rows become fixed-width
//!   text records, order preserved
//! - **Speech synthesis**: one audio clip per spoken phrase, through a
//!   pluggable engine (Google Translate TTS, or an offline tone engine)
//! - **Correlated artifacts**: a lesson file and an audio mapping file with
//!   stable, index-derived ids
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! lessonpack = { version = "0.1", features = ["gtts"] }
//! ```
//!
//! ```ignore
//! use std::path::PathBuf;
//! use lessonpack::engines::gtts::GttsEngine;
//! use lessonpack::job::{run_job, CancelToken, JobOptionsBuilder};
//!
//! let options = JobOptionsBuilder::default()
//!     .input(PathBuf::from("lessons/greetings.xlsx"))
//!     .output_root(PathBuf::from("out"))
//!     .build()?;
//!
//! let mut engine = GttsEngine::new();
//! let log = |line: &str| println!("{line}");
//! let done = || println!("done");
//! run_job(&options, &mut engine, &log, &CancelToken::new(), &done)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engines;
pub mod job;
pub mod lesson;
pub mod records;

use std::fs;
use std::io;
use std::path::Path;

/// Audio container format produced by a synthesis engine.
///
/// Determines the file extension of clips written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    /// File extension for this format, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }
}

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains fully encoded audio, ready to be written to disk as-is.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Encoded audio bytes.
    pub bytes: Vec<u8>,
    /// Container format of `bytes`.
    pub format: AudioFormat,
}

impl AudioClip {
    /// Write the encoded audio to a file.
    pub fn write(&self, path: &Path) -> io::Result<()> {
        fs::write(path, &self.bytes)
    }

    /// Size of the encoded audio in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Common interface for speech synthesis engines.
///
/// The lesson pipeline is generic over this trait: any engine that can turn
/// a phrase plus a language code into an encoded clip can drive a build.
/// Engines also label the clips they produce: the engine name doubles as
/// the clip filename prefix in the audio mapping.
pub trait SpeechSynthesizer {
    /// Engine label recorded in mapping entries (e.g. `"gTTS"`). Lowercased,
    /// it prefixes clip filenames (`gtts_a_0.mp3`).
    fn engine_name(&self) -> &str;

    /// Voice label for the given language (e.g. `"gTTS-ja"`).
    fn voice_name(&self, lang: &str) -> String;

    /// Synthesize speech for `text` in the given language.
    fn synthesize(
        &mut self,
        text: &str,
        lang: &str,
    ) -> Result<AudioClip, Box<dyn std::error::Error>>;

    /// Synthesize speech and write the clip to `path`.
    ///
    /// Default implementation calls `synthesize()` then [`AudioClip::write`].
    fn synthesize_to_file(
        &mut self,
        text: &str,
        lang: &str,
        path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let clip = self.synthesize(text, lang)?;
        clip.write(path)?;
        Ok(())
    }
}
