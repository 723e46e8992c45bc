//! The audio mapping artifact: entries correlating spoken phrases to
//! generated clips.

use serde::{Deserialize, Serialize};

use crate::AudioFormat;

/// Entry-type tag for spoken-phrase clips.
pub const ENTRY_KIND_AUDIO: &str = "a";

/// One entry of the audio mapping.
///
/// An entry exists for every record whose trimmed phrase is non-empty and
/// whose clip was synthesized and written successfully. The JSON key for
/// [`kind`](Self::kind) is `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMappingEntry {
    /// Stable identifier, `a_<row_index>`.
    pub id: String,
    /// The trimmed spoken phrase.
    pub text: String,
    /// Clip path relative to the output root, `/`-separated.
    pub file: String,
    /// Language code the clip was synthesized in.
    pub lang: String,
    /// Entry-type tag; always [`ENTRY_KIND_AUDIO`] for spoken phrases.
    #[serde(rename = "type")]
    pub kind: String,
    /// Synthesis engine label.
    pub engine: String,
    /// Voice label.
    pub voice: String,
}

/// Mapping id for the record at `index`.
pub fn entry_id(index: usize) -> String {
    format!("{ENTRY_KIND_AUDIO}_{index}")
}

/// Decode the record index back out of a mapping id.
///
/// Inverse of [`entry_id`]. The id scheme is positional, and this keeps the
/// id-to-record correspondence an explicit contract rather than a naming
/// accident.
pub fn entry_index(id: &str) -> Option<usize> {
    id.strip_prefix(ENTRY_KIND_AUDIO)?
        .strip_prefix('_')?
        .parse()
        .ok()
}

/// Clip file name for the record at `index`: `<engine>_a_<index>.<ext>`,
/// with the engine label lowercased.
pub fn clip_file_name(engine: &str, index: usize, format: AudioFormat) -> String {
    format!(
        "{}_{}_{}.{}",
        engine.to_lowercase(),
        ENTRY_KIND_AUDIO,
        index,
        format.extension()
    )
}
