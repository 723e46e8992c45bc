use std::env;
use std::path::PathBuf;
use std::process;
use std::thread;

use lessonpack::engines::gtts::GttsEngine;
use lessonpack::engines::tone::ToneEngine;
use lessonpack::job::{run_job, CancelToken, JobOptionsBuilder};
use lessonpack::SpeechSynthesizer;

fn usage() {
    eprintln!("Usage: convert <input> <output_root> [--all] [--lang CODE] [--ext EXT] [--tone]");
    eprintln!();
    eprintln!("  <input>        spreadsheet file, or a directory with --all");
    eprintln!("  <output_root>  folder the lesson, mapping and audio files land under");
    eprintln!("  --all          process every matching spreadsheet in <input>");
    eprintln!("  --lang CODE    synthesis language code (default: ja)");
    eprintln!("  --ext EXT      extension for --all discovery (default: xlsx)");
    eprintln!("  --tone         use the offline tone engine instead of gTTS");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut all = false;
    let mut tone = false;
    let mut lang = "ja".to_string();
    let mut ext = "xlsx".to_string();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--all" => all = true,
            "--tone" => tone = true,
            "--lang" => lang = args.next().ok_or("--lang needs a value")?,
            "--ext" => ext = args.next().ok_or("--ext needs a value")?,
            "--help" | "-h" => {
                usage();
                return Ok(());
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unexpected flag: {flag}").into());
            }
            _ if input.is_none() => input = Some(PathBuf::from(arg)),
            _ if output.is_none() => output = Some(PathBuf::from(arg)),
            other => return Err(format!("unexpected argument: {other}").into()),
        }
    }

    let (Some(input), Some(output)) = (input, output) else {
        usage();
        process::exit(2);
    };

    let options = JobOptionsBuilder::default()
        .input(input)
        .output_root(output)
        .lang(lang)
        .process_directory(all)
        .extension(ext)
        .build()?;

    let cancel = CancelToken::new();
    let log = |line: &str| println!("{line}");
    let done = || println!("Processing finished.");

    // The pipeline runs on a worker thread; this caller only waits and
    // relays the summary.
    let summary = thread::scope(|scope| {
        scope
            .spawn(|| {
                let mut engine: Box<dyn SpeechSynthesizer> = if tone {
                    Box::new(ToneEngine::new())
                } else {
                    Box::new(GttsEngine::new())
                };
                run_job(&options, engine.as_mut(), &log, &cancel, &done)
            })
            .join()
            .map_err(|_| "worker thread panicked")
    })??;

    println!(
        "{} file(s) attempted, {} completed",
        summary.files_attempted, summary.files_completed
    );
    Ok(())
}
