//! The lesson build pipeline: normalize records, synthesize clips, emit
//! artifacts.
//!
//! A build is a linear sequence: read records, then per row synthesize or
//! skip, then write the lesson artifact, then the mapping artifact. Failures
//! are scoped: a bad source aborts only this build, a failed row loses only
//! its mapping entry, a failed artifact write leaves the other artifact
//! untouched. Nothing escapes past this module except the file-scoped
//! [`BuildError`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::job::LogSink;
use crate::lesson::mapping::{self, AudioMappingEntry, ENTRY_KIND_AUDIO};
use crate::records::{read_records, Record, SourceReadError};
use crate::SpeechSynthesizer;

/// File-scoped failure: this one build is abandoned, the run continues.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Source(#[from] SourceReadError),
    #[error("failed to create output layout under {}: {source}", .root.display())]
    OutputLayout {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Artifact-scoped failure: the other artifact is still attempted.
#[derive(thiserror::Error, Debug)]
pub enum ArtifactWriteError {
    #[error("failed to serialize {artifact}: {source}")]
    Serialize {
        artifact: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Derive the lesson name from an input file: its base name with the
/// extension stripped.
pub fn lesson_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Resolved output locations for one lesson.
#[derive(Debug, Clone)]
pub struct LessonPaths {
    /// `<output_root>/<lesson_name>.json`
    pub lesson_file: PathBuf,
    /// `<output_root>/mapping_<lesson_name>.json`
    pub mapping_file: PathBuf,
    /// `<output_root>/audio_<lesson_name>/`
    pub audio_dir: PathBuf,
    /// Name of the audio subfolder; prefixes relative clip paths.
    pub audio_dir_name: String,
}

impl LessonPaths {
    /// Resolve the output layout for `lesson_name` under `output_root`,
    /// creating the root and the audio subfolder. Creation is idempotent.
    pub fn resolve(output_root: &Path, lesson_name: &str) -> io::Result<Self> {
        fs::create_dir_all(output_root)?;
        let audio_dir_name = format!("audio_{lesson_name}");
        let audio_dir = output_root.join(&audio_dir_name);
        fs::create_dir_all(&audio_dir)?;
        Ok(Self {
            lesson_file: output_root.join(format!("{lesson_name}.json")),
            mapping_file: output_root.join(format!("mapping_{lesson_name}.json")),
            audio_dir,
            audio_dir_name,
        })
    }
}

/// Outcome of one lesson build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub lesson_name: String,
    /// Number of source rows (equals the lesson length).
    pub rows: usize,
    /// Number of clips synthesized and mapped.
    pub clips: usize,
    /// Source indices of rows whose synthesis or clip write failed.
    pub failed_rows: Vec<usize>,
    pub lesson_written: bool,
    pub mapping_written: bool,
}

/// Build one lesson from a spreadsheet file.
///
/// Reads and normalizes `input`, synthesizes a clip for every record with a
/// non-empty trimmed phrase, and writes the lesson and mapping artifacts
/// under `output_root`. Row- and artifact-scoped failures are logged and
/// skipped; only an unreadable source or an uncreatable output layout
/// abandons the build.
pub fn build_lesson<S>(
    input: &Path,
    output_root: &Path,
    lang: &str,
    synth: &mut S,
    log: &dyn LogSink,
) -> Result<BuildReport, BuildError>
where
    S: SpeechSynthesizer + ?Sized,
{
    let records = read_records(input)?;
    build_lesson_from_records(records, &lesson_name(input), output_root, lang, synth, log)
}

/// Build one lesson from already-normalized records.
///
/// Entry point for callers (and tests) that produce records some other way
/// than reading a workbook; [`build_lesson`] is this plus [`read_records`].
pub fn build_lesson_from_records<S>(
    records: Vec<Record>,
    lesson_name: &str,
    output_root: &Path,
    lang: &str,
    synth: &mut S,
    log: &dyn LogSink,
) -> Result<BuildReport, BuildError>
where
    S: SpeechSynthesizer + ?Sized,
{
    let paths = LessonPaths::resolve(output_root, lesson_name).map_err(|source| {
        BuildError::OutputLayout {
            root: output_root.to_path_buf(),
            source,
        }
    })?;

    let mut lesson: Vec<Record> = Vec::with_capacity(records.len());
    let mut entries: Vec<AudioMappingEntry> = Vec::new();
    let mut failed_rows: Vec<usize> = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        // The record always joins the lesson; only the mapping entry is
        // conditional on the phrase and the synthesis outcome.
        let phrase = record.phrase().trim().to_string();
        lesson.push(record);

        if phrase.is_empty() {
            continue;
        }

        match synthesize_row(synth, &phrase, lang, index, &paths, log) {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                log::warn!("row {index} synthesis failed: {err}");
                log.line(&format!(
                    "Warning: failed to generate audio for row {index}: {err}"
                ));
                failed_rows.push(index);
            }
        }
    }

    let lesson_written = write_artifact(&paths.lesson_file, "lesson", &lesson, log);
    let mapping_written = write_artifact(&paths.mapping_file, "mapping", &entries, log);

    Ok(BuildReport {
        lesson_name: lesson_name.to_string(),
        rows: lesson.len(),
        clips: entries.len(),
        failed_rows,
        lesson_written,
        mapping_written,
    })
}

fn synthesize_row<S>(
    synth: &mut S,
    phrase: &str,
    lang: &str,
    index: usize,
    paths: &LessonPaths,
    log: &dyn LogSink,
) -> Result<AudioMappingEntry, Box<dyn std::error::Error>>
where
    S: SpeechSynthesizer + ?Sized,
{
    let clip = synth.synthesize(phrase, lang)?;
    let file_name = mapping::clip_file_name(synth.engine_name(), index, clip.format);
    let clip_path = paths.audio_dir.join(&file_name);
    clip.write(&clip_path)?;
    log::debug!("wrote clip {} ({} bytes)", clip_path.display(), clip.len());
    log.line(&format!("Saved audio: {}", clip_path.display()));

    Ok(AudioMappingEntry {
        id: mapping::entry_id(index),
        text: phrase.to_string(),
        file: format!("{}/{}", paths.audio_dir_name, file_name),
        lang: lang.to_string(),
        kind: ENTRY_KIND_AUDIO.to_string(),
        engine: synth.engine_name().to_string(),
        voice: synth.voice_name(lang),
    })
}

/// Write one artifact, logging the outcome. Returns whether the write
/// succeeded; a failure never propagates so the other artifact still gets
/// its attempt.
fn write_artifact<T: Serialize>(
    path: &Path,
    artifact: &'static str,
    value: &T,
    log: &dyn LogSink,
) -> bool {
    match try_write_artifact(path, artifact, value) {
        Ok(()) => {
            log.line(&format!("Wrote {artifact}: {}", path.display()));
            true
        }
        Err(err) => {
            log::warn!("{err}");
            log.line(&format!("Error writing {artifact} json: {err}"));
            false
        }
    }
}

fn try_write_artifact<T: Serialize>(
    path: &Path,
    artifact: &'static str,
    value: &T,
) -> Result<(), ArtifactWriteError> {
    // Pretty-printed UTF-8, two-space indentation; serde_json never escapes
    // non-ASCII, so phrases land in the file literally.
    let json = serde_json::to_string_pretty(value).map_err(|source| {
        ArtifactWriteError::Serialize { artifact, source }
    })?;
    fs::write(path, json).map_err(|source| ArtifactWriteError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_lesson_from_records, lesson_name, LessonPaths};
    use crate::engines::tone::ToneEngine;
    use crate::lesson::mapping::AudioMappingEntry;
    use crate::records::Record;
    use crate::{AudioClip, AudioFormat, SpeechSynthesizer};
    use std::path::Path;
    use std::sync::Mutex;

    /// Engine that fails for any phrase containing a marker substring.
    struct FlakyEngine {
        fail_on: &'static str,
    }

    impl SpeechSynthesizer for FlakyEngine {
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
            if text.contains(self.fail_on) {
                return Err("synthesis backend unavailable".into());
            }
            Ok(AudioClip {
                bytes: vec![1, 2, 3, 4],
                format: AudioFormat::Wav,
            })
        }
    }

    #[derive(Default)]
    struct CapturedLog(Mutex<Vec<String>>);

    impl crate::job::LogSink for CapturedLog {
        fn line(&self, message: &str) {
            self.0.lock().expect("log mutex").push(message.to_string());
        }
    }

    fn record(fields: [&str; 4]) -> Record {
        Record::from_cells(fields.iter().map(|f| f.to_string()))
    }

    fn read_lesson(path: &Path) -> Vec<Vec<String>> {
        serde_json::from_str(&std::fs::read_to_string(path).expect("read lesson"))
            .expect("parse lesson")
    }

    fn read_mapping(path: &Path) -> Vec<AudioMappingEntry> {
        serde_json::from_str(&std::fs::read_to_string(path).expect("read mapping"))
            .expect("parse mapping")
    }

    #[test]
    fn lesson_name_strips_the_extension() {
        assert_eq!(lesson_name(Path::new("/data/greetings.xlsx")), "greetings");
        assert_eq!(lesson_name(Path::new("nested.name.xlsx")), "nested.name");
    }

    #[test]
    fn resolve_creates_layout_and_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("out");
        let paths = LessonPaths::resolve(&root, "greetings").expect("resolve");
        assert!(paths.audio_dir.is_dir());
        assert_eq!(paths.audio_dir_name, "audio_greetings");
        assert_eq!(paths.lesson_file, root.join("greetings.json"));
        assert_eq!(paths.mapping_file, root.join("mapping_greetings.json"));
        // Resolving again over the existing layout must not fail.
        LessonPaths::resolve(&root, "greetings").expect("resolve again");
    }

    #[test]
    fn builds_lesson_and_mapping_with_index_gaps_for_empty_phrases() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = vec![
            record(["おはよう", "good morning", "", ""]),
            record(["", "note only", "", ""]),
            record(["こんにちは", "hello", "", ""]),
        ];
        let log = CapturedLog::default();
        let mut engine = ToneEngine::new();

        let report = build_lesson_from_records(
            records,
            "greetings",
            dir.path(),
            "ja",
            &mut engine,
            &log,
        )
        .expect("build");

        assert_eq!(report.rows, 3);
        assert_eq!(report.clips, 2);
        assert!(report.failed_rows.is_empty());
        assert!(report.lesson_written);
        assert!(report.mapping_written);

        let lesson = read_lesson(&dir.path().join("greetings.json"));
        assert_eq!(lesson.len(), 3);
        assert!(lesson.iter().all(|row| row.len() == 4));
        assert_eq!(lesson[1], vec!["", "note only", "", ""]);
        assert_eq!(lesson[2], vec!["こんにちは", "hello", "", ""]);

        let mapping = read_mapping(&dir.path().join("mapping_greetings.json"));
        assert_eq!(mapping.len(), 2);
        // Row 1 has no spoken phrase, so ids jump from a_0 to a_2.
        assert_eq!(mapping[0].id, "a_0");
        assert_eq!(mapping[1].id, "a_2");
        assert_eq!(mapping[1].text, "こんにちは");
        assert_eq!(mapping[1].file, "audio_greetings/tone_a_2.wav");
        assert_eq!(mapping[1].lang, "ja");
        assert_eq!(mapping[1].kind, "a");
        assert_eq!(mapping[1].engine, "tone");
        assert_eq!(mapping[1].voice, "tone-ja");

        for entry in &mapping {
            let clip = dir.path().join(&entry.file);
            let metadata = std::fs::metadata(&clip).expect("clip exists");
            assert!(metadata.len() > 0, "clip {} is empty", entry.file);

            // Every id decodes to a lesson index whose trimmed phrase is
            // the entry text.
            let index = crate::lesson::mapping::entry_index(&entry.id).expect("decodable id");
            assert_eq!(lesson[index][0].trim(), entry.text);
        }
    }

    #[test]
    fn mapping_text_is_trimmed_but_lesson_keeps_the_original() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = vec![record(["  こんにちは ", "hello", "", ""])];
        let log = CapturedLog::default();
        let mut engine = ToneEngine::new();

        build_lesson_from_records(records, "trim", dir.path(), "ja", &mut engine, &log)
            .expect("build");

        let lesson = read_lesson(&dir.path().join("trim.json"));
        assert_eq!(lesson[0][0], "  こんにちは ");
        let mapping = read_mapping(&dir.path().join("mapping_trim.json"));
        assert_eq!(mapping[0].text, "こんにちは");
    }

    #[test]
    fn whitespace_only_phrase_gets_no_mapping_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = vec![record(["   ", "spaces only", "", ""])];
        let log = CapturedLog::default();
        let mut engine = ToneEngine::new();

        let report =
            build_lesson_from_records(records, "blank", dir.path(), "ja", &mut engine, &log)
                .expect("build");

        assert_eq!(report.rows, 1);
        assert_eq!(report.clips, 0);
        assert!(read_mapping(&dir.path().join("mapping_blank.json")).is_empty());
    }

    #[test]
    fn row_failure_is_isolated_and_logged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = vec![
            record(["おはよう", "", "", ""]),
            record(["だめ", "this row fails", "", ""]),
            record(["こんばんは", "", "", ""]),
        ];
        let log = CapturedLog::default();
        let mut engine = FlakyEngine { fail_on: "だめ" };

        let report =
            build_lesson_from_records(records, "flaky", dir.path(), "ja", &mut engine, &log)
                .expect("build");

        assert_eq!(report.rows, 3);
        assert_eq!(report.clips, 2);
        assert_eq!(report.failed_rows, vec![1]);

        // The lesson keeps the failed row; the mapping omits it.
        let lesson = read_lesson(&dir.path().join("flaky.json"));
        assert_eq!(lesson.len(), 3);
        assert_eq!(lesson[1][0], "だめ");
        let mapping = read_mapping(&dir.path().join("mapping_flaky.json"));
        let ids: Vec<&str> = mapping.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a_0", "a_2"]);

        let lines = log.0.lock().expect("log mutex");
        assert!(
            lines.iter().any(|l| l.contains("row 1")),
            "expected a warning naming row 1, got: {lines:?}"
        );
    }

    #[test]
    fn rebuilding_unchanged_input_yields_identical_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = vec![
            record(["こんにちは", "hello", "", ""]),
            record(["", "gap", "", ""]),
            record(["さようなら", "goodbye", "", ""]),
        ];
        let log = CapturedLog::default();
        let mut engine = ToneEngine::new();

        for _ in 0..2 {
            build_lesson_from_records(
                records.clone(),
                "repeat",
                dir.path(),
                "ja",
                &mut engine,
                &log,
            )
            .expect("build");
        }

        let first_lesson = std::fs::read(dir.path().join("repeat.json")).expect("lesson");
        let first_mapping =
            std::fs::read(dir.path().join("mapping_repeat.json")).expect("mapping");

        build_lesson_from_records(records, "repeat", dir.path(), "ja", &mut engine, &log)
            .expect("build");

        assert_eq!(
            std::fs::read(dir.path().join("repeat.json")).expect("lesson"),
            first_lesson
        );
        assert_eq!(
            std::fs::read(dir.path().join("mapping_repeat.json")).expect("mapping"),
            first_mapping
        );
    }
}
