//! Debug tool to inspect word and chord alignment for one song.
//!
//! Usage:
//!   `cargo run --bin align_dump -- <song.lrc> <timing.json>`
//!   `cargo run --bin align_dump -- <song.lrc> <timing.json> --json`
//!   `cargo run --bin align_dump -- <song.lrc> <timing.json> --transpose -2`
//!
//! `timing.json` holds the external source as
//! `{"words": [{"startMs", "text"}], "chords": [{"startMs", "durationMs", "chord"}]}`.
//! Set `RUST_LOG=chordsync=debug` to see per-stage counts.

use std::env;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chordsync::engine::ChordEnhancer;
use chordsync::lyrics::enhanced::render_enhanced_lrc;
use chordsync::lyrics::parse_lrc_file;
use chordsync::payload;
use chordsync::transpose::transpose_line_chords;
use chordsync::types::{ChordEvent, LyricLine, TrackInfo, WordTiming};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct TimingFile {
    #[serde(default)]
    words: Vec<WordTiming>,
    #[serde(default)]
    chords: Vec<ChordEvent>,
    #[serde(default)]
    track: Option<TrackInfo>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <song.lrc> <timing.json> [--json] [--transpose N]", args[0]);
        std::process::exit(1);
    }

    let lines = parse_lrc_file(Path::new(&args[1]))?;
    let timing_path = Path::new(&args[2]);
    let raw = fs_err::read_to_string(timing_path)?;
    let timing: TimingFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse timing file {}", timing_path.display()))?;

    let semitones = match args.iter().position(|a| a == "--transpose") {
        Some(i) => {
            let Some(value) = args.get(i + 1) else {
                bail!("--transpose needs a semitone count");
            };
            value.parse::<i32>().with_context(|| format!("Invalid semitone count {value:?}"))?
        }
        None => 0,
    };

    let enhancer = ChordEnhancer::from_env()?;
    let mut result = enhancer.enhance(&lines, &timing.words, &timing.chords, timing.track);
    if semitones != 0 {
        result.payload.lines = transpose_line_chords(&result.payload.lines, semitones);
    }

    if args.iter().any(|a| a == "--json") {
        println!("{}", payload::to_json_pretty(&result.payload)?);
        return Ok(());
    }

    print_report(&lines, &result);
    Ok(())
}

fn print_report(lines: &[LyricLine], result: &chordsync::engine::EnhancementResult) {
    let alignment = &result.word_alignment;
    println!(
        "Words matched: {}/{} ({:.1}%)",
        alignment.matched_words,
        alignment.total_words,
        alignment.coverage() * 100.0
    );
    println!("Lines with chords: {:.1}%", result.coverage * 100.0);
    match &result.payload.time_transform {
        Some(chordsync::types::TimeTransform::Offset { ms }) => println!("Transform: offset {ms:+.0}ms"),
        Some(chordsync::types::TimeTransform::Anchored { anchors }) => {
            println!("Transform: {} anchors", anchors.len());
        }
        None => println!("Transform: none"),
    }
    println!();

    for (idx, line) in lines.iter().enumerate() {
        let chords = result
            .payload
            .line(idx)
            .map(|l| {
                l.chords
                    .iter()
                    .map(|c| match c.word_idx {
                        Some(w) => format!("{}@{}(w{w})", c.chord, c.start),
                        None => format!("{}@{}", c.chord, c.start),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        println!("{idx:>3}  {:<48} {chords}", line.text);
    }

    println!();
    print!(
        "{}",
        render_enhanced_lrc(lines, &alignment.patches, result.payload.time_transform.as_ref())
    );
}
