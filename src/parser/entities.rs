use crate::filter::IgnoreFilter;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::LazyLock;

/// Tag name to the sorted set of distinct values observed for it.
pub type TagMap = BTreeMap<String, BTreeSet<String>>;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*)\]: (.*)").expect("valid tag regex"));

/// Splits a log line into its bracketed tag and the value that follows.
/// Lines without the `[tag]: value` shape yield nothing.
pub fn split_tag_line(line: &str) -> Option<(&str, &str)> {
    let caps = TAG_RE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// A run's lines live in exactly one of two states: raw text waiting for the
/// first tag query, or the materialized tag index. The transition is one-way.
#[derive(Debug, Clone)]
enum RunBody {
    Raw(Vec<String>),
    Tags(TagMap),
}

/// One detected invocation of the backup tool, delimited by a
/// `[...-StartingOperation]` marker line.
#[derive(Debug, Clone)]
pub struct BackupRun {
    label: String,
    body: RunBody,
}

impl BackupRun {
    /// A run that retains its raw lines until tags are first queried.
    pub fn new(label: String) -> Self {
        Self {
            label,
            body: RunBody::Raw(Vec::new()),
        }
    }

    /// A run whose tags are filled in while streaming; it never holds raw lines.
    pub fn with_tags(label: String) -> Self {
        Self {
            label,
            body: RunBody::Tags(TagMap::new()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Appends a raw line. No-op once the run has been materialized.
    pub fn push_line(&mut self, line: &str) {
        if let RunBody::Raw(lines) = &mut self.body {
            lines.push(line.to_string());
        }
    }

    /// Records a `(tag, value)` pair, deduplicating by value. No-op while the
    /// run still holds raw lines.
    pub fn insert_tag(&mut self, tag: &str, value: &str) {
        if let RunBody::Tags(tags) = &mut self.body {
            tags.entry(tag.to_string())
                .or_default()
                .insert(value.to_string());
        }
    }

    /// Returns the tag index, materializing it from raw lines on first call.
    ///
    /// Materialization scans the retained lines once, drops suppressed values,
    /// and discards the lines themselves. Subsequent calls return the cached
    /// index without rescanning.
    pub fn tags(&mut self, ignore: &IgnoreFilter) -> &TagMap {
        if let RunBody::Raw(lines) = &self.body {
            let mut tags = TagMap::new();
            for line in lines {
                if let Some((tag, value)) = split_tag_line(line)
                    && !ignore.is_suppressed(value)
                {
                    tags.entry(tag.to_string())
                        .or_default()
                        .insert(value.to_string());
                }
            }
            self.body = RunBody::Tags(tags);
        }
        match &self.body {
            RunBody::Tags(tags) => tags,
            RunBody::Raw(_) => unreachable!("materialized above"),
        }
    }

    /// True once the raw lines have been traded for the tag index.
    pub fn is_materialized(&self) -> bool {
        matches!(self.body, RunBody::Tags(_))
    }
}

/// Ordered, bounded collection of backup runs. When at capacity the oldest
/// run is evicted first. A capacity of `None` or `Some(0)` keeps every run.
#[derive(Debug, Default)]
pub struct History {
    runs: VecDeque<BackupRun>,
    max_runs: usize,
}

impl History {
    pub fn new(max_runs: Option<usize>) -> Self {
        Self {
            runs: VecDeque::new(),
            max_runs: max_runs.unwrap_or(0),
        }
    }

    /// Appends a run, evicting the oldest one when at capacity.
    pub fn push_run(&mut self, run: BackupRun) {
        if self.max_runs != 0 && self.runs.len() >= self.max_runs {
            self.runs.pop_front();
        }
        self.runs.push_back(run);
    }

    /// The run currently receiving lines, if any marker has been seen yet.
    pub fn current_mut(&mut self) -> Option<&mut BackupRun> {
        self.runs.back_mut()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Runs in retention order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &BackupRun> {
        self.runs.iter()
    }

    /// Looks up a run by label. Duplicate labels resolve to the most recent
    /// insertion.
    pub fn find_mut(&mut self, label: &str) -> Option<&mut BackupRun> {
        self.runs.iter_mut().rev().find(|run| run.label() == label)
    }
}
