//! Google Translate text-to-speech engine implementation.
//!
//! Speaks text through the public Translate TTS endpoint
//! (`/translate_tts`, the same one the Translate web player uses) and
//! returns MP3 audio. Every synthesis call is one or more blocking network
//! round trips; there is no retry policy, callers decide what a failed
//! call means.
//!
//! Mapping entries produced with this engine carry the label `gTTS` and a
//! voice of the form `gTTS-<lang>`, and clips land in files named
//! `gtts_a_<row_index>.mp3`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lessonpack::{SpeechSynthesizer, engines::gtts::GttsEngine};
//! use std::path::PathBuf;
//!
//! let mut engine = GttsEngine::new();
//! engine.synthesize_to_file("こんにちは", "ja", &PathBuf::from("hello.mp3"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engine;

pub use engine::{GttsEngine, GttsError, GttsParams};
