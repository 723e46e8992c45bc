//! Speech synthesis engines.
//!
//! This module contains implementations of text-to-speech engines.
//!
//! # Available Engines
//!
//! - `tone` - deterministic offline sine-tone engine, always built
//! - `gtts` - Google Translate TTS (network-backed), enable via the
//!   `gtts` Cargo feature

#[cfg(feature = "gtts")]
pub mod gtts;
pub mod tone;
