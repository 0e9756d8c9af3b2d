use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

mod entities;

pub use entities::{BackupRun, History, TagMap, split_tag_line};

use crate::filter::IgnoreFilter;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*-StartingOperation\]").expect("valid marker regex"));
static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?) *-? *\[.*-StartingOperation\](.*)").expect("valid label regex")
});

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read log file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// How non-marker lines are folded into their run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngestMode {
    /// Retain raw lines; the tag index materializes on first query.
    #[default]
    Lazy,
    /// Extract `[tag]: value` pairs while streaming, applying suppression
    /// before a value enters the index.
    Eager,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Maximum retained runs; `None` or `Some(0)` keeps every run.
    pub max_runs: Option<usize>,
    pub mode: IngestMode,
}

/// Streams a log file once, top to bottom, grouping lines into backup runs.
///
/// Lines that are neither a starting-operation marker nor attributable to a
/// run are dropped silently; only an I/O failure is an error.
pub fn ingest_file(
    path: impl AsRef<Path>,
    options: IngestOptions,
    ignore: &IgnoreFilter,
) -> Result<History, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut history = History::new(options.max_runs);
    for line in reader.lines() {
        let line = line.map_err(|source| IngestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        ingest_line(&mut history, &line, options.mode, ignore);
    }
    Ok(history)
}

/// Ingests already-split lines, for callers that hold the log in memory.
pub fn ingest_lines<'a, I>(lines: I, options: IngestOptions, ignore: &IgnoreFilter) -> History
where
    I: IntoIterator<Item = &'a str>,
{
    let mut history = History::new(options.max_runs);
    for line in lines {
        ingest_line(&mut history, line, options.mode, ignore);
    }
    history
}

fn ingest_line(history: &mut History, line: &str, mode: IngestMode, ignore: &IgnoreFilter) {
    if MARKER_RE.is_match(line) {
        let label = run_label(line);
        let run = match mode {
            IngestMode::Lazy => BackupRun::new(label),
            IngestMode::Eager => BackupRun::with_tags(label),
        };
        history.push_run(run);
        return;
    }

    // Lines before the first marker have no run to own them.
    let Some(run) = history.current_mut() else {
        return;
    };

    match mode {
        IngestMode::Lazy => run.push_line(line),
        IngestMode::Eager => {
            if let Some((tag, value)) = split_tag_line(line)
                && !ignore.is_suppressed(value)
            {
                run.insert_tag(tag, value);
            }
        }
    }
}

/// Run label: free text before the marker, trimmed of the joining dash and
/// spaces, concatenated with whatever follows the marker bracket.
fn run_label(line: &str) -> String {
    match LABEL_RE.captures(line) {
        Some(caps) => format!("{}{}", &caps[1], &caps[2]),
        None => line.to_string(),
    }
}
