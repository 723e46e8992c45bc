//! Lesson construction: the per-file pipeline and its output artifacts.
//!
//! A lesson build takes normalized records, synthesizes one clip per spoken
//! phrase, and emits two correlated artifacts under the output root:
//!
//! ```text
//! <output_root>/
//! ├── <lesson_name>.json           # all records, 4 strings each
//! ├── mapping_<lesson_name>.json   # phrase-to-clip index
//! └── audio_<lesson_name>/
//!     └── gtts_a_<row_index>.mp3   # one clip per non-empty phrase
//! ```
//!
//! Ids and clip filenames are derived from the zero-based *source* row
//! index, so rows with empty phrases leave gaps in the mapping but never
//! shift later ids.

pub mod builder;
pub mod mapping;

pub use builder::{
    build_lesson, build_lesson_from_records, lesson_name, ArtifactWriteError, BuildError,
    BuildReport, LessonPaths,
};
pub use mapping::AudioMappingEntry;
