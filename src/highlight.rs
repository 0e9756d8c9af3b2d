use colored::Colorize;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

static FILTER_PHRASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Ex|In)cluding path due to filter: ").expect("valid phrase regex"));
static FILTER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*(?:Ex|In)cluding path due to filter: )(.*?)( => \()(.*)(\).*)$")
        .expect("valid filter line regex")
});
static BRACKETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*)\]$").expect("valid bracket regex"));
static REGEX_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\*(/|\\\\)").expect("valid regex prefix regex"));
static GLOB_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*(/|\\)").expect("valid glob prefix regex"));
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid class regex"));

const HIGHLIGHT_GROUP_MARKERS: [&str; 2] = ["(?<highlight>", "(?P<highlight>"];

/// One display piece of a log line. Concatenating the text of all segments of
/// a highlight result reproduces the original line exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }

    fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: true,
        }
    }
}

/// Reverses a logged filter pattern into a regex that can locate the matched
/// span inside the path.
///
/// A pattern fully wrapped in one bracket pair is already a regex: either its
/// `(?<highlight>...)` group body is extracted, or a leading
/// "anything-then-separator" prefix is stripped as structural. Anything else
/// is a glob whose wildcards are converted, except that a bracket character
/// class marks regex notation that lost its outer brackets in the log and is
/// kept as-is.
pub fn translate_pattern(raw: &str) -> String {
    if let Some(caps) = BRACKETED_RE.captures(raw) {
        let interior = caps.get(1).map_or("", |m| m.as_str());
        if let Some(body) = named_highlight_body(interior) {
            return body.to_string();
        }
        return REGEX_PREFIX_RE.replace(interior, "").into_owned();
    }

    let stripped = GLOB_PREFIX_RE.replace(raw, "");
    if CLASS_RE.is_match(&stripped) {
        return stripped.into_owned();
    }
    stripped
        .replace('\\', r"\\")
        .replace('*', ".*")
        .replace('?', ".")
}

/// Extracts the body of an explicit highlight group, if the regex has one.
fn named_highlight_body(regex: &str) -> Option<&str> {
    for marker in HIGHLIGHT_GROUP_MARKERS {
        if let Some(start) = regex.find(marker) {
            let body_start = start + marker.len();
            let (body, _end) = balanced_group_body(regex, body_start)?;
            return Some(body);
        }
    }
    None
}

/// Scans from `start` (just inside an already-open parenthesis) to the
/// parenthesis that closes it, tracking nesting depth and backslash escapes.
/// Returns the enclosed span and the offset one past the closing parenthesis,
/// or `None` when the nesting never closes.
pub fn balanced_group_body(s: &str, start: usize) -> Option<(&str, usize)> {
    let mut depth = 1usize;
    let mut escaped = false;
    for (i, c) in s[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&s[start..start + i], start + i + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits a log line into display segments, emphasizing the substring of the
/// path that the logged exclusion pattern actually matched.
///
/// Lines that are not filter messages, and filter messages whose pattern
/// cannot be reversed into a matching regex, come back as a single plain
/// segment carrying the whole line.
pub fn highlight(line: &str) -> Vec<Segment> {
    match try_highlight(line) {
        Some(segments) => segments,
        None => vec![Segment::plain(line)],
    }
}

fn try_highlight(line: &str) -> Option<Vec<Segment>> {
    if !FILTER_PHRASE_RE.is_match(line) {
        return None;
    }
    let caps = FILTER_LINE_RE.captures(line)?;
    let prefix = caps.get(1)?.as_str();
    let path = caps.get(2)?.as_str();
    let mid = caps.get(3)?.as_str();
    let pattern = caps.get(4)?.as_str();
    let suffix = caps.get(5)?.as_str();

    let effective = translate_pattern(pattern);
    let matcher = RegexBuilder::new(&effective)
        .case_insensitive(true)
        .build()
        .ok()?;
    let matched = matcher.find(path)?;

    Some(vec![
        Segment::plain(prefix),
        Segment::plain(&path[..matched.start()]),
        Segment::emphasized(matched.as_str()),
        Segment::plain(&path[matched.end()..]),
        Segment::plain(mid),
        Segment::plain(pattern),
        Segment::plain(suffix),
    ])
}

/// Renders segments for the terminal, painting the matched span the way the
/// log viewer marks it out.
pub fn render_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| {
            if segment.highlighted {
                segment.text.on_yellow().to_string()
            } else {
                segment.text.clone()
            }
        })
        .collect()
}
